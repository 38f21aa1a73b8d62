// 存储配置定义

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// 偏好存储后端类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BackendKind {
    /// JSON 文件（默认）
    #[serde(rename = "json_file")]
    JsonFile,
    /// 仅内存，不落盘
    #[serde(rename = "memory")]
    Memory,
}

impl Default for BackendKind {
    fn default() -> Self {
        BackendKind::JsonFile
    }
}

/// 存储配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 偏好文件名（相对数据目录）
    pub prefs_file: String,
    /// 后端类型
    pub backend: BackendKind,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefs_file: "tree_prefs.json".to_string(),
            backend: BackendKind::default(),
        }
    }
}

impl StorageConfig {
    /// 偏好文件的完整路径
    pub fn prefs_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.prefs_file)
    }
}
