use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// 一次抓取操作，返回响应体原始字节
pub trait Fetch: Send + Sync + 'static {
    /// 抓取目标，用于日志
    fn target(&self) -> &str;

    fn fetch(&self) -> impl Future<Output = AppResult<Vec<u8>>> + Send;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("crisp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Fetch for HttpFetcher {
    fn target(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> AppResult<Vec<u8>> {
        let to_fetch_error = |source: reqwest::Error| AppError::Fetch {
            url: self.url.clone(),
            source,
        };

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(to_fetch_error)?;

        // 非 2xx 的响应体同样缓存
        let status = response.status();
        if !status.is_success() {
            tracing::debug!("GET {} returned {}", self.url, status);
        }

        let body = response.bytes().await.map_err(to_fetch_error)?;
        Ok(body.to_vec())
    }
}

/// 日志里用来标识上游的主机名
pub fn host_label(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| "?".to_string())
}
