// 自定义日志层 - 支持将日志实时推送给应用内订阅者（状态页日志面板）

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// 日志消息
#[derive(Clone, Debug, serde::Serialize)]
pub struct LogMessage {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
    /// 结构化字段（message 以外的键值）
    pub fields: BTreeMap<String, String>,
}

/// 日志推送器
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogMessage>,
    enabled: Arc<RwLock<bool>>,
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self {
            sender,
            enabled: Arc::new(RwLock::new(true)),
        }
    }

    /// 设置日志推送开关
    pub fn set_enabled(&self, enabled: bool) {
        if let Ok(mut e) = self.enabled.write() {
            *e = enabled;
        }
    }

    /// 获取日志推送状态
    pub fn is_enabled(&self) -> bool {
        self.enabled.read().map(|e| *e).unwrap_or(false)
    }

    /// 订阅日志
    pub fn subscribe(&self) -> broadcast::Receiver<LogMessage> {
        self.sender.subscribe()
    }

    fn emit_log(&self, log: LogMessage) {
        if !self.is_enabled() {
            return;
        }
        // 没有订阅者时丢弃
        let _ = self.sender.send(log);
    }
}

/// 自定义日志层
pub struct BroadcastLogLayer {
    broadcaster: Arc<LogBroadcaster>,
}

impl BroadcastLogLayer {
    pub fn new(broadcaster: Arc<LogBroadcaster>) -> Self {
        Self { broadcaster }
    }
}

/// 收集事件的消息和其余字段
#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: BTreeMap<String, String>,
}

impl FieldVisitor {
    fn put(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }
}

impl<S: Subscriber> Layer<S> for BroadcastLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !self.broadcaster.is_enabled() {
            return;
        }

        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.broadcaster.emit_log(LogMessage {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            level: metadata.level().to_string(),
            target: metadata.target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// 初始化日志系统（带应用内推送功能）
///
/// 日志同时输出到 stderr 和 `log_dir` 下按天轮转的文件。stdout 留给命令输出。
/// 返回的 guard 需要在程序生命周期内保持存活，否则文件日志会丢失。
pub fn init_with_broadcaster(
    broadcaster: Arc<LogBroadcaster>,
    log_dir: &Path,
) -> Result<WorkerGuard, SetGlobalDefaultError> {
    use tracing_subscriber::fmt::time::LocalTime;
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all(log_dir).ok();

    // 每天轮转
    let file_appender = tracing_appender::rolling::daily(log_dir, "tree.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let writer = std::io::stderr.and(non_blocking);

    let timer = LocalTime::new(time::macros::format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let broadcast_layer = BroadcastLogLayer::new(broadcaster);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(writer)
        .with_timer(timer)
        .with_ansi(cfg!(debug_assertions))
        .finish()
        .with(broadcast_layer);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!("日志文件位置: {:?}", log_dir);
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_forwards_messages() {
        let broadcaster = Arc::new(LogBroadcaster::new());
        let mut receiver = broadcaster.subscribe();
        let subscriber =
            tracing_subscriber::registry().with(BroadcastLogLayer::new(broadcaster.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("步数已更新: {}", 42);
        });

        let log = receiver.try_recv().unwrap();
        assert_eq!(log.level, "WARN");
        assert_eq!(log.message, "步数已更新: 42");
        assert!(log.fields.is_empty());
    }

    #[test]
    fn test_layer_collects_structured_fields() {
        let broadcaster = Arc::new(LogBroadcaster::new());
        let mut receiver = broadcaster.subscribe();
        let subscriber =
            tracing_subscriber::registry().with(BroadcastLogLayer::new(broadcaster.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(email = "a@x.io", added = 12, "步数已更新");
        });

        let log = receiver.try_recv().unwrap();
        assert_eq!(log.message, "步数已更新");
        assert_eq!(log.fields.get("email").map(String::as_str), Some("a@x.io"));
        assert_eq!(log.fields.get("added").map(String::as_str), Some("12"));
    }

    #[test]
    fn test_disabled_broadcaster_drops_messages() {
        let broadcaster = Arc::new(LogBroadcaster::new());
        broadcaster.set_enabled(false);
        let mut receiver = broadcaster.subscribe();
        let subscriber =
            tracing_subscriber::registry().with(BroadcastLogLayer::new(broadcaster.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("不应推送");
        });

        assert!(receiver.try_recv().is_err());
        assert!(!broadcaster.is_enabled());
    }
}
