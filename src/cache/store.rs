use std::sync::Arc;

use tokio::sync::RwLock;

use super::item::Item;
use crate::error::{AppError, AppResult};

pub const DEFAULT_CAPACITY: usize = 5;

struct Ring {
    slots: Vec<Option<Arc<Item>>>,
    current: usize,
}

/// 固定容量的环形缓存，只保留最近几次抓取结果
pub struct CacheStore {
    ring: RwLock<Ring>,
    capacity: usize,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl CacheStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: RwLock::new(Ring {
                slots: vec![None; capacity],
                // 第一次写入落在 0 号槽位
                current: capacity.saturating_sub(1),
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn add(&self, item: impl Into<Arc<Item>>) {
        if self.capacity == 0 {
            return;
        }
        let mut ring = self.ring.write().await;
        let next = (ring.current + 1) % self.capacity;
        ring.slots[next] = Some(item.into());
        ring.current = next;
    }

    pub async fn get(&self) -> AppResult<Arc<Item>> {
        let ring = self.ring.read().await;
        ring.slots
            .get(ring.current)
            .and_then(Option::clone)
            .ok_or(AppError::EmptyStore)
    }

    pub async fn len(&self) -> usize {
        self.ring.read().await.slots.iter().flatten().count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 按槽位顺序返回全部内容，未写入的槽位为 None
    pub async fn snapshot(&self) -> Vec<Option<Arc<Item>>> {
        self.ring.read().await.slots.clone()
    }
}
