use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// 一次成功抓取的结果，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "Timestamp", alias = "timestamp", with = "rfc3339_nanos")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "Payload", alias = "payload", with = "base64_bytes")]
    pub payload: Vec<u8>,
}

impl Item {
    pub fn new(timestamp: DateTime<Utc>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp,
            payload: payload.into(),
        }
    }

    pub fn now(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(Utc::now(), payload)
    }

    pub fn from_json(blob: &[u8]) -> AppResult<Self> {
        Ok(serde_json::from_slice(blob)?)
    }

    pub fn to_json(&self) -> AppResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub async fn write_file(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        let blob = self.to_json()?;
        tokio::fs::write(path, blob)
            .await
            .map_err(|source| AppError::Persistence {
                path: path.display().to_string(),
                source,
            })
    }

    pub async fn read_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let blob = tokio::fs::read(path)
            .await
            .map_err(|source| AppError::Persistence {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json(&blob)
    }
}

mod rfc3339_nanos {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }

    // 接受任意时区偏移，统一转换为 UTC
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    // 空的响应体可能被写成 null
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => STANDARD.decode(raw.as_bytes()).map_err(D::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
