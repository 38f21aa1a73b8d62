// 事件总线 - 用于模块间解耦通信
//
// 实现发布/订阅模式,消除模块间的直接依赖关系
// 使用 tokio::sync::broadcast 实现高效的事件分发

use tokio::sync::broadcast;

use crate::models::HistoryEntry;
use crate::pedometer::StepMethod;

/// 应用事件枚举 - 定义所有可能的系统事件
#[derive(Debug, Clone)]
pub enum AppEvent {
    // --- 账户事件 ---

    /// 注册完成（同时登录）
    AccountRegistered {
        email: String,
    },

    /// 登录成功
    LoggedIn {
        email: String,
    },

    /// 退出登录
    LoggedOut,

    /// 密码已重置
    PasswordReset {
        email: String,
    },

    // --- 步数事件 ---

    /// 今日步数已更新
    StepsUpdated {
        email: String,
        daily_steps: i32,
        added: i32,
    },

    /// 前一天已归档
    DayArchived {
        email: String,
        entry: HistoryEntry,
    },

    /// 目标已修改
    GoalChanged {
        email: String,
        goal: i32,
    },

    /// 树已重置
    TreeReset {
        email: String,
    },

    // --- 传感器事件 ---

    /// 计步监听器已注册
    ListenerRegistered {
        email: String,
        method: StepMethod,
    },

    /// 计步监听器已注销
    ListenerUnregistered,

    // --- 系统事件 ---

    /// 配置更新事件
    ConfigUpdated {
        config_type: String,
    },
}

/// 事件总线 - 用于模块间解耦通信
///
/// 使用 broadcast channel 实现发布/订阅模式
/// 支持多个订阅者同时接收事件
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// 创建新的事件总线
    ///
    /// # 参数
    /// - `capacity`: 事件缓冲区大小
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// 发布事件
    ///
    /// 如果没有订阅者,事件会被丢弃(这是正常的)
    pub fn publish(&self, event: AppEvent) {
        match self.sender.send(event) {
            Ok(receiver_count) => {
                tracing::trace!("事件已发布，订阅者数量: {}", receiver_count);
            }
            Err(_) => {
                tracing::trace!("事件已发布但无订阅者");
            }
        }
    }

    /// 订阅事件
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// 获取当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
