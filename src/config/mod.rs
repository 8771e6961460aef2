use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, AppResult};
use crate::rate::RateConfig;

mod args;

pub use args::Args;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LIMIT: u32 = 60;
pub const DEFAULT_CACHE_FILE: &str = "cache.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub url: String,
    #[serde(default = "default_port", deserialize_with = "port_from_string_or_number")]
    pub port: u16,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_cache_file() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_FILE)
}

fn default_capacity() -> usize {
    crate::cache::DEFAULT_CAPACITY
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

// 旧版配置文件里端口是字符串，例如 "8080"
fn port_from_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl Config {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            port: DEFAULT_PORT,
            limit: DEFAULT_LIMIT,
            cache_file: default_cache_file(),
            capacity: default_capacity(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn from_json(blob: &[u8]) -> AppResult<Self> {
        let config: Config = serde_json::from_slice(blob)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let blob = tokio::fs::read(path).await.map_err(|e| {
            AppError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&blob)
    }

    pub fn to_json(&self) -> AppResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> AppResult<()> {
        tokio::fs::write(path, self.to_json()?).await?;
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.url.trim().is_empty() {
            return Err(AppError::Config("url must not be empty".into()));
        }
        reqwest::Url::parse(&self.url)
            .map_err(|e| AppError::Config(format!("invalid url {}: {}", self.url, e)))?;
        // 容量为 0 时缓存永远为空
        if self.capacity == 0 {
            return Err(AppError::Config("capacity must be at least 1".into()));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::Config("timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn rate(&self) -> RateConfig {
        RateConfig::from_limit(self.limit)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
