// Repository 抽象层 - 定义偏好数据的持久化接口

pub mod json_file;
pub mod memory;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::config::{BackendKind, StorageConfig};
use super::preferences::Preferences;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;

/// 偏好持久化接口 - 所有后端实现必须实现此 trait
#[async_trait]
pub trait PreferenceBackend: Send + Sync {
    /// 读取全部偏好数据
    async fn load(&self) -> Result<Preferences>;

    /// 整体写入偏好数据
    async fn persist(&self, prefs: &Preferences) -> Result<()>;

    /// 后端描述（用于日志）
    fn describe(&self) -> String;
}

/// 根据存储配置创建后端
pub fn create_backend(config: &StorageConfig, data_dir: &Path) -> Arc<dyn PreferenceBackend> {
    match config.backend {
        BackendKind::JsonFile => Arc::new(JsonFileBackend::new(config.prefs_path(data_dir))),
        BackendKind::Memory => Arc::new(MemoryBackend::new()),
    }
}
