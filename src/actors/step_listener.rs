// Step Listener Actor - 串行处理传感器事件
//
// 每次注册监听器启动一个Actor，绑定当时的账户和计步来源。
// 事件按到达顺序逐个对账写入，注销后（Handle全部drop）Actor退出。

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::ListenerStatusHandle;
use crate::domains::StepsDomain;
use crate::pedometer::{SensorEvent, SensorSource, StepInput};
use crate::storage;

/// 计步监听命令
pub enum StepListenerCommand {
    /// 传感器事件
    Sensor {
        event: SensorEvent,
    },

    /// 等待之前的事件处理完
    Flush {
        reply: oneshot::Sender<()>,
    },

    /// 健康检查
    HealthCheck {
        reply: oneshot::Sender<()>,
    },
}

/// 计步监听Actor
pub struct StepListenerActor {
    receiver: mpsc::Receiver<StepListenerCommand>,
    source: SensorSource,
    email: String,
    steps: Arc<StepsDomain>,
    status: ListenerStatusHandle,
}

impl StepListenerActor {
    /// 创建新的Actor
    pub fn new(
        source: SensorSource,
        email: String,
        steps: Arc<StepsDomain>,
        status: ListenerStatusHandle,
    ) -> (Self, StepListenerHandle) {
        let (sender, receiver) = mpsc::channel(64);
        let actor = Self {
            receiver,
            source,
            email,
            steps,
            status,
        };
        let handle = StepListenerHandle { sender };
        (actor, handle)
    }

    /// 运行Actor
    pub async fn run(mut self) {
        tracing::info!(
            "Step Listener Actor 已启动: {} ({:?})",
            self.email,
            self.source.method()
        );

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                StepListenerCommand::Sensor { event } => self.handle_event(&event).await,

                StepListenerCommand::Flush { reply } => {
                    let _ = reply.send(());
                }

                StepListenerCommand::HealthCheck { reply } => {
                    let _ = reply.send(());
                }
            }
        }

        tracing::info!("Step Listener Actor 已停止: {}", self.email);
    }

    async fn handle_event(&mut self, event: &SensorEvent) {
        let Some(input) = self.source.interpret(event) else {
            self.status.record_event(0).await;
            return;
        };

        let today = storage::local_today();
        let result = match input {
            StepInput::CounterTotal(total) => {
                self.steps
                    .record_counter_total(&self.email, total, &today)
                    .await
            }
            StepInput::SingleStep => self.steps.record_single_step(&self.email, &today).await,
        };

        match result {
            Ok(reconciliation) => {
                self.status.record_event(reconciliation.added).await;
            }
            Err(e) => {
                tracing::warn!("写入步数失败: {:#}", e);
                self.status.set_error(Some(e.to_string())).await;
            }
        }
    }
}

/// 计步监听Handle
#[derive(Clone)]
pub struct StepListenerHandle {
    sender: mpsc::Sender<StepListenerCommand>,
}

impl StepListenerHandle {
    /// 投递传感器事件，Actor已停止时返回false
    pub async fn dispatch(&self, event: SensorEvent) -> bool {
        self.sender
            .send(StepListenerCommand::Sensor { event })
            .await
            .is_ok()
    }

    /// 等待已投递的事件全部处理完
    pub async fn flush(&self) {
        let (reply, rx) = oneshot::channel();
        if self
            .sender
            .send(StepListenerCommand::Flush { reply })
            .await
            .is_ok()
        {
            let _ = rx.await;
        }
    }

    /// 健康检查，超时1秒
    pub async fn health_check(&self) -> bool {
        let (reply, rx) = oneshot::channel();

        if self
            .sender
            .send(StepListenerCommand::HealthCheck { reply })
            .await
            .is_err()
        {
            tracing::warn!("Step Listener Actor 健康检查失败: 通道已关闭");
            return false;
        }

        matches!(
            tokio::time::timeout(std::time::Duration::from_secs(1), rx).await,
            Ok(Ok(()))
        )
    }
}
