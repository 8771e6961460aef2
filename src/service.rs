use std::future::Future;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinError;

use crate::{
    AppState,
    cache::{CacheStore, Item},
    collector::{Collector, Fetch, HttpFetcher},
    config::Config,
    error::{AppError, AppResult},
    feeder::CacheFeeder,
    middleware::log_access,
    rate::RateConfig,
    routes,
};

/// 一个进程只跟踪一个 URL，持有唯一的缓存
pub struct Service {
    config: Config,
    rate: RateConfig,
    store: Arc<CacheStore>,
}

impl Service {
    pub fn new(config: Config) -> Self {
        let rate = config.rate();
        let store = Arc::new(CacheStore::new(config.capacity));
        Self {
            config,
            rate,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rate(&self) -> RateConfig {
        self.rate
    }

    pub fn store(&self) -> Arc<CacheStore> {
        self.store.clone()
    }

    pub fn router(&self) -> Router {
        let router = routes::router().layer(axum::middleware::from_fn(log_access));

        #[cfg(debug_assertions)]
        let router = {
            tracing::debug!("Adding CORS layer for development mode");
            router.layer(tower_http::cors::CorsLayer::permissive())
        };

        router.with_state(AppState::new(self.store.clone()))
    }

    /// 用上次落盘的结果预热缓存，文件不存在或损坏时冷启动
    pub async fn warm_start(&self) -> bool {
        let path = &self.config.cache_file;
        match Item::read_file(path).await {
            Ok(item) => {
                tracing::info!(
                    "Loaded cache from {} fetched at {}",
                    path.display(),
                    item.timestamp
                );
                self.store.add(item).await;
                true
            }
            Err(AppError::Persistence { source, .. }) if source.kind() == ErrorKind::NotFound => {
                tracing::info!("No cache at {}, starting cold", path.display());
                false
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache {}: {}", path.display(), e);
                false
            }
        }
    }

    pub async fn run(self) -> AppResult<()> {
        let fetcher = HttpFetcher::new(self.config.url.clone(), self.config.timeout())?;
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", addr);

        self.serve(listener, fetcher, shutdown_signal()).await
    }

    /// 启动抓取和写缓存两个任务，在 listener 上提供 HTTP 服务直到 shutdown 完成。
    /// 落盘失败时返回错误。
    pub async fn serve<F, S>(self, listener: TcpListener, fetcher: F, shutdown: S) -> AppResult<()>
    where
        F: Fetch,
        S: Future<Output = ()> + Send + 'static,
    {
        self.warm_start().await;

        tracing::info!(
            "Collecting {} at {} requests per hour (every {:?})",
            self.config.url,
            self.rate.limit(),
            self.rate.period()
        );
        let (collector, rx) = Collector::new(fetcher, self.rate.period()).spawn();
        let mut feeder = tokio::spawn(
            CacheFeeder::new(self.store.clone())
                .with_persistence(self.config.cache_file.clone())
                .run(rx),
        );

        let app = self.router();
        let server = async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(shutdown)
            .await
        };
        tokio::pin!(server);

        tokio::select! {
            served = &mut server => {
                tracing::info!("Server stopped, stopping collector");
                collector.stop().await;
                served?;
                let fed = join_feeder(feeder.await)?;
                tracing::info!("Cache feeder drained after {} items", fed);
                Ok(())
            }
            fed = &mut feeder => {
                collector.stop().await;
                match join_feeder(fed) {
                    Ok(fed) => {
                        tracing::warn!("Cache feeder finished after {} items, serving cached data only", fed);
                        server.await?;
                        Ok(())
                    }
                    Err(e) => {
                        tracing::error!("Cache feeder failed: {}", e);
                        Err(e)
                    }
                }
            }
        }
    }
}

fn join_feeder(joined: Result<AppResult<u64>, JoinError>) -> AppResult<u64> {
    joined.map_err(|e| AppError::Io(std::io::Error::other(e)))?
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
