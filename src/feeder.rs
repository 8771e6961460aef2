use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::cache::{CacheStore, Item};
use crate::error::AppResult;

/// 从抓取通道读取结果写入缓存，可选地把最新结果落盘
pub struct CacheFeeder {
    store: Arc<CacheStore>,
    persist_to: Option<PathBuf>,
}

impl CacheFeeder {
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self {
            store,
            persist_to: None,
        }
    }

    pub fn with_persistence(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_to = Some(path.into());
        self
    }

    /// 通道关闭后返回写入的条数；落盘失败直接返回错误
    pub async fn run(self, mut rx: mpsc::Receiver<Item>) -> AppResult<u64> {
        let mut fed = 0u64;
        while let Some(item) = rx.recv().await {
            let item = Arc::new(item);
            self.store.add(item.clone()).await;
            fed += 1;
            tracing::debug!(
                "Cached {} bytes fetched at {}",
                item.payload.len(),
                item.timestamp
            );

            if let Some(path) = &self.persist_to {
                item.write_file(path).await?;
                tracing::info!("Saved cache to {}", path.display());
            }
        }

        tracing::info!("Item channel closed after {} items", fed);
        Ok(fed)
    }
}
