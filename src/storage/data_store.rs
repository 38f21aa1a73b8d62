// 偏好存储 - 可观察的持久化键值映射

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

use super::preferences::{Key, PrefType, Preferences};
use super::repository::PreferenceBackend;

/// 偏好存储
///
/// 每次 `edit` 都是对整个映射的一次原子事务：在写锁内复制、修改、持久化，
/// 成功后提交并通知订阅者。持久化失败时内存数据保持不变。
pub struct PreferenceStore {
    backend: Arc<dyn PreferenceBackend>,
    data: RwLock<Preferences>,
    notifier: watch::Sender<Preferences>,
}

impl PreferenceStore {
    /// 打开存储
    ///
    /// 数据无法读取时从空映射开始
    pub async fn open(backend: Arc<dyn PreferenceBackend>) -> Self {
        let initial = match backend.load().await {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("读取偏好数据失败，使用空数据: {:#}", e);
                Preferences::default()
            }
        };
        info!("偏好存储已打开: {} ({} 个键)", backend.describe(), initial.len());

        let (notifier, _) = watch::channel(initial.clone());
        Self {
            backend,
            data: RwLock::new(initial),
            notifier,
        }
    }

    /// 当前数据快照
    pub async fn data(&self) -> Preferences {
        self.data.read().await.clone()
    }

    pub async fn get<T: PrefType>(&self, key: &Key<T>) -> Option<T> {
        self.data.read().await.get(key)
    }

    /// 原子编辑
    ///
    /// 闭包的返回值原样返回；数据没有变化时不写盘也不通知
    pub async fn edit<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Preferences) -> R + Send,
        R: Send,
    {
        let mut current = self.data.write().await;
        let mut next = current.clone();
        let output = f(&mut next);

        if next != *current {
            self.backend.persist(&next).await?;
            *current = next.clone();
            self.notifier.send_replace(next);
        }

        Ok(output)
    }

    /// 订阅数据变化
    pub fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::keys;
    use crate::storage::repository::{JsonFileBackend, MemoryBackend};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use tempfile::tempdir;

    struct FailingBackend;

    #[async_trait]
    impl PreferenceBackend for FailingBackend {
        async fn load(&self) -> Result<Preferences> {
            Err(anyhow!("磁盘不可用"))
        }

        async fn persist(&self, _prefs: &Preferences) -> Result<()> {
            Err(anyhow!("磁盘不可用"))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[tokio::test]
    async fn test_edit_returns_closure_value_and_persists() {
        let backend = Arc::new(MemoryBackend::new());
        let store = PreferenceStore::open(backend.clone()).await;

        let previous = store
            .edit(|prefs| {
                let old = prefs.get(&keys::daily_steps("a@x.io")).unwrap_or(0);
                prefs.set(&keys::daily_steps("a@x.io"), old + 5);
                old
            })
            .await
            .unwrap();

        assert_eq!(previous, 0);
        assert_eq!(store.get(&keys::daily_steps("a@x.io")).await, Some(5));
        assert_eq!(backend.snapshot().await, store.data().await);
    }

    #[tokio::test]
    async fn test_unchanged_edit_skips_persist() {
        let backend = Arc::new(MemoryBackend::new());
        let store = PreferenceStore::open(backend.clone()).await;

        store.edit(|_| ()).await.unwrap();
        assert_eq!(backend.persist_count().await, 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_committed_changes() {
        let store = PreferenceStore::open(Arc::new(MemoryBackend::new())).await;
        let mut receiver = store.subscribe();

        store
            .edit(|prefs| prefs.set(&keys::is_logged_in(), true))
            .await
            .unwrap();

        receiver.changed().await.unwrap();
        assert_eq!(receiver.borrow().get(&keys::is_logged_in()), Some(true));
    }

    #[tokio::test]
    async fn test_failed_persist_leaves_data_untouched() {
        let store = PreferenceStore::open(Arc::new(FailingBackend)).await;

        let result = store
            .edit(|prefs| prefs.set(&keys::is_logged_in(), true))
            .await;

        assert!(result.is_err());
        assert_eq!(store.get(&keys::is_logged_in()).await, None);
    }

    #[tokio::test]
    async fn test_reopen_from_json_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("tree_prefs.json");

        let store = PreferenceStore::open(Arc::new(JsonFileBackend::new(path.clone()))).await;
        store
            .edit(|prefs| prefs.set(&keys::current_email(), "a@x.io".to_string()))
            .await
            .unwrap();
        drop(store);

        let reopened = PreferenceStore::open(Arc::new(JsonFileBackend::new(path))).await;
        assert_eq!(
            reopened.get(&keys::current_email()).await.as_deref(),
            Some("a@x.io")
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_opens_empty() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("tree_prefs.json");
        tokio::fs::write(&path, b"[1, 2").await.unwrap();

        let store = PreferenceStore::open(Arc::new(JsonFileBackend::new(path))).await;
        assert!(store.data().await.is_empty());
    }
}
