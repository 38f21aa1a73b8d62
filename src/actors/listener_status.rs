// Listener Status Actor - 使用Actor模式管理计步监听器状态
//
// 用消息传递替代Arc<RwLock<ListenerStatus>>，消除锁竞争

use chrono::Local;
use tokio::sync::{mpsc, oneshot};

use crate::models::ListenerStatus;
use crate::pedometer::StepMethod;

/// 监听器状态命令
pub enum ListenerStatusCommand {
    /// 监听器已启动
    Started {
        method: StepMethod,
        email: String,
    },

    /// 监听器已停止
    Stopped,

    /// 收到一个传感器事件
    EventReceived {
        steps_added: i32,
    },

    /// 设置错误信息
    SetError {
        error: Option<String>,
    },

    /// 获取状态
    Get {
        reply: oneshot::Sender<ListenerStatus>,
    },

    /// 健康检查
    HealthCheck {
        reply: oneshot::Sender<()>,
    },
}

/// 监听器状态Actor
pub struct ListenerStatusActor {
    receiver: mpsc::Receiver<ListenerStatusCommand>,
    status: ListenerStatus,
}

impl ListenerStatusActor {
    /// 创建新的Actor
    pub fn new() -> (Self, ListenerStatusHandle) {
        let (sender, receiver) = mpsc::channel(50);
        let actor = Self {
            receiver,
            status: ListenerStatus::default(),
        };
        let handle = ListenerStatusHandle { sender };
        (actor, handle)
    }

    /// 运行Actor
    pub async fn run(mut self) {
        tracing::info!("Listener Status Actor 已启动");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                // 新的监听器从零开始统计
                ListenerStatusCommand::Started { method, email } => {
                    self.status = ListenerStatus {
                        is_listening: true,
                        method: Some(method),
                        email: Some(email),
                        ..ListenerStatus::default()
                    };
                }

                ListenerStatusCommand::Stopped => {
                    self.status.is_listening = false;
                }

                ListenerStatusCommand::EventReceived { steps_added } => {
                    self.status.events_received += 1;
                    self.status.steps_recorded += u64::try_from(steps_added).unwrap_or(0);
                    self.status.last_event_time = Some(Local::now());
                }

                ListenerStatusCommand::SetError { error } => {
                    self.status.last_error = error;
                }

                ListenerStatusCommand::Get { reply } => {
                    let _ = reply.send(self.status.clone());
                }

                ListenerStatusCommand::HealthCheck { reply } => {
                    let _ = reply.send(());
                }
            }
        }

        tracing::info!("Listener Status Actor 已停止");
    }
}

/// 监听器状态Handle
#[derive(Clone)]
pub struct ListenerStatusHandle {
    sender: mpsc::Sender<ListenerStatusCommand>,
}

impl ListenerStatusHandle {
    /// 标记监听器已启动
    pub async fn set_started(&self, method: StepMethod, email: String) {
        let _ = self
            .sender
            .send(ListenerStatusCommand::Started { method, email })
            .await;
    }

    /// 标记监听器已停止
    pub async fn set_stopped(&self) {
        let _ = self.sender.send(ListenerStatusCommand::Stopped).await;
    }

    /// 记录一个传感器事件
    pub async fn record_event(&self, steps_added: i32) {
        let _ = self
            .sender
            .send(ListenerStatusCommand::EventReceived { steps_added })
            .await;
    }

    /// 设置错误信息
    pub async fn set_error(&self, error: Option<String>) {
        let _ = self.sender.send(ListenerStatusCommand::SetError { error }).await;
    }

    /// 获取状态
    pub async fn get(&self) -> ListenerStatus {
        let (reply, rx) = oneshot::channel();
        self.sender.send(ListenerStatusCommand::Get { reply }).await.ok();
        rx.await.unwrap_or_default()
    }

    /// 健康检查，超时1秒
    pub async fn health_check(&self) -> bool {
        let (reply, rx) = oneshot::channel();

        if self
            .sender
            .send(ListenerStatusCommand::HealthCheck { reply })
            .await
            .is_err()
        {
            tracing::warn!("Listener Status Actor 健康检查失败: 通道已关闭");
            return false;
        }

        matches!(
            tokio::time::timeout(std::time::Duration::from_secs(1), rx).await,
            Ok(Ok(()))
        )
    }
}
