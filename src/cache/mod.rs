// 缓存模块
// 抓取结果的数据结构和环形存储

pub mod item;
pub mod store;

pub use item::Item;
pub use store::{CacheStore, DEFAULT_CAPACITY};
