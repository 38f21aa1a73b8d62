//! 命令模块
//!
//! 界面层调用的所有命令接口，按功能分组：
//! - account: 登录、注册、重置密码、启动页
//! - steps: 首页、历史、设置、传感器事件
//! - config: 配置管理与状态页

pub mod account;
pub mod config;
pub mod steps;

// 重新导出所有命令
pub use account::*;
pub use config::*;
pub use steps::*;
