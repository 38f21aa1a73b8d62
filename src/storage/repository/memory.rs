// 内存后端 - 不落盘

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::PreferenceBackend;
use crate::storage::preferences::Preferences;

#[derive(Default)]
pub struct MemoryBackend {
    data: Mutex<Preferences>,
    persist_count: Mutex<u64>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最近一次写入的数据
    pub async fn snapshot(&self) -> Preferences {
        self.data.lock().await.clone()
    }

    /// 写入次数
    pub async fn persist_count(&self) -> u64 {
        *self.persist_count.lock().await
    }
}

#[async_trait]
impl PreferenceBackend for MemoryBackend {
    async fn load(&self) -> Result<Preferences> {
        Ok(self.data.lock().await.clone())
    }

    async fn persist(&self, prefs: &Preferences) -> Result<()> {
        *self.data.lock().await = prefs.clone();
        *self.persist_count.lock().await += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
