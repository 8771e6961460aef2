use std::sync::Arc;

use cache::CacheStore;

pub mod cache;
pub mod collector;
pub mod config;
pub mod error;
pub mod feeder;
pub mod logging;
pub mod middleware;
pub mod rate;
pub mod routes;
pub mod service;

pub use service::Service;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CacheStore>,
}

impl AppState {
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store }
    }
}
