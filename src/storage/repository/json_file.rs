// JSON 文件后端

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::PreferenceBackend;
use crate::storage::preferences::Preferences;
use crate::utils::write_atomic;

/// 把偏好数据整体写入一个 JSON 文件
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PreferenceBackend for JsonFileBackend {
    async fn load(&self) -> Result<Preferences> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Preferences::default()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("解析偏好文件失败: {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("偏好文件不存在，使用空数据: {}", self.path.display());
                Ok(Preferences::default())
            }
            Err(e) => Err(e).with_context(|| format!("读取偏好文件失败: {}", self.path.display())),
        }
    }

    async fn persist(&self, prefs: &Preferences) -> Result<()> {
        let json = serde_json::to_vec_pretty(prefs)?;
        write_atomic(&self.path, &json).await
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}
