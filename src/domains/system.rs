// 系统领域管理器
//
// 负责设置、日志和监听器状态相关的功能
// 包含 SettingsManager、LogBroadcaster 和 ListenerStatusHandle 三个核心组件

use std::sync::Arc;

use crate::actors::ListenerStatusHandle;
use crate::logger::LogBroadcaster;
use crate::settings::SettingsManager;

/// 系统领域管理器 - 负责设置、日志和监听器状态
#[derive(Clone)]
pub struct SystemDomain {
    settings: Arc<SettingsManager>,
    log_broadcaster: Arc<LogBroadcaster>,
    listener_status: ListenerStatusHandle,
}

impl SystemDomain {
    /// 创建新的系统领域管理器
    pub fn new(
        settings: Arc<SettingsManager>,
        log_broadcaster: Arc<LogBroadcaster>,
        listener_status: ListenerStatusHandle,
    ) -> Self {
        Self {
            settings,
            log_broadcaster,
            listener_status,
        }
    }

    /// 获取设置管理器
    pub fn get_settings(&self) -> &Arc<SettingsManager> {
        &self.settings
    }

    /// 获取日志广播器
    pub fn get_logger(&self) -> &Arc<LogBroadcaster> {
        &self.log_broadcaster
    }

    /// 获取监听器状态
    pub fn get_listener_status(&self) -> &ListenerStatusHandle {
        &self.listener_status
    }
}
