// Tree 计步应用 - 核心库
//
// 把每日步数可视化为一棵生长的树：本库负责账户偏好存储、
// 传感器计步对账和界面层调用的命令，不包含界面渲染。

// 声明模块
pub mod actors;
pub mod app;
pub mod commands;
pub mod domains;
pub mod driver;
pub mod event_bus;
pub mod logger;
pub mod models;
pub mod pedometer;
pub mod settings;
pub mod storage;
pub mod utils;

use std::sync::Arc;

use domains::{AccountDomain, SensorDomain, StepsDomain, SystemDomain};
use event_bus::EventBus;

pub use app::{initialize, run};

/// 应用状态（按领域分组）
///
/// - 账户领域：负责凭据、当前账户和登录状态
/// - 步数领域：负责今日步数、目标和历史记录
/// - 传感器领域：负责计步监听器的注册与事件分发
/// - 系统领域：负责设置、日志和监听器状态
/// - 事件总线：用于领域间解耦通信
#[derive(Clone)]
pub struct AppState {
    /// 账户领域管理器
    pub account_domain: Arc<AccountDomain>,
    /// 步数领域管理器
    pub steps_domain: Arc<StepsDomain>,
    /// 传感器领域管理器
    pub sensor_domain: Arc<SensorDomain>,
    /// 系统领域管理器
    pub system_domain: Arc<SystemDomain>,
    /// 事件总线
    pub event_bus: Arc<EventBus>,
}
