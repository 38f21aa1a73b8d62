// 存储模块 - 账户偏好数据的持久化与观察

// 子模块
pub mod config;
pub mod data_store;
pub mod keys;
pub mod preferences;
pub mod repository;
pub mod views;

// 重新导出主要类型
pub use config::{BackendKind, StorageConfig};
pub use data_store::PreferenceStore;
pub use preferences::{Key, PrefType, PrefValue, Preferences};
pub use repository::{create_backend, JsonFileBackend, MemoryBackend, PreferenceBackend};

/// 日期格式 (yyyy-MM-dd)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 本地时区的今天
pub fn local_today() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}
