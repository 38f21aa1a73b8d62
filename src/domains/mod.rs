// 领域模块 - 用于组织应用的业务逻辑
//
// 按业务领域分组,实现单一职责原则
// 包含4个领域:账户、步数、传感器、系统

pub mod account;
pub mod sensors;
pub mod steps;
pub mod system;

pub use account::AccountDomain;
pub use sensors::SensorDomain;
pub use steps::StepsDomain;
pub use system::SystemDomain;
