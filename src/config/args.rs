use std::path::PathBuf;

use clap::Parser;

use super::{Config, DEFAULT_CACHE_FILE, DEFAULT_LIMIT, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS};
use crate::cache::DEFAULT_CAPACITY;
use crate::error::AppResult;

/// Caches a remote resource and serves the latest copy over HTTP
#[derive(Debug, Parser)]
#[command(name = "crisp", version)]
pub struct Args {
    /// URL of the resource to collect
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub url: Option<String>,

    /// Port number of the crisp service
    #[arg(short, long, env = "CRISP_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Limit of requests per hour
    #[arg(short, long, env = "CRISP_LIMIT", default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,

    /// Path to a JSON configuration file, replaces the URL argument
    #[arg(short = 'f', long = "file", env = "CRISP_CONFIG")]
    pub file: Option<PathBuf>,

    /// Where the latest item is persisted and warm-started from
    #[arg(long, env = "CRISP_CACHE_FILE", default_value = DEFAULT_CACHE_FILE)]
    pub cache_file: PathBuf,

    /// Number of items kept in memory
    #[arg(long, env = "CRISP_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Upstream request timeout in seconds
    #[arg(long, env = "CRISP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Write the effective configuration to this path before starting
    #[arg(long)]
    pub save_config: Option<PathBuf>,
}

impl Args {
    /// 读取 .env 后解析命令行
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::parse()
    }

    /// 指定了配置文件时以文件为准，否则由命令行参数组装
    pub async fn into_config(self) -> AppResult<Config> {
        if let Some(file) = &self.file {
            tracing::info!("Loading configuration from {}", file.display());
            return Config::from_file(file).await;
        }

        let config = Config {
            url: self.url.unwrap_or_default(),
            port: self.port,
            limit: self.limit,
            cache_file: self.cache_file,
            capacity: self.capacity,
            timeout_secs: self.timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }
}
