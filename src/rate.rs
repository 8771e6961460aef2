use std::time::Duration;

use crate::error::{AppError, AppResult};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// 低于一秒的周期会让抓取循环空转
const MIN_PERIOD: Duration = Duration::from_secs(1);

/// 把每小时请求上限换算成抓取周期（整秒）
pub fn period_from_limit(limit: u32) -> AppResult<Duration> {
    if limit == 0 {
        return Err(AppError::InvalidRate(limit));
    }

    let period = SECONDS_PER_HOUR / f64::from(limit);
    Ok(Duration::from_secs(period as u64))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateConfig {
    limit: u32,
    period: Duration,
}

impl RateConfig {
    pub fn try_from_limit(limit: u32) -> AppResult<Self> {
        let period = period_from_limit(limit)?;
        let period = if period < MIN_PERIOD {
            tracing::warn!(
                "Limit {} per hour is below the one second resolution, clamping period to {:?}",
                limit,
                MIN_PERIOD
            );
            MIN_PERIOD
        } else {
            period
        };
        Ok(Self { limit, period })
    }

    /// 上限为 0 时退回到每小时 1 次
    pub fn from_limit(limit: u32) -> Self {
        match Self::try_from_limit(limit) {
            Ok(rate) => rate,
            Err(e) => {
                tracing::warn!("{}, falling back to limit 1", e);
                Self {
                    limit: 1,
                    period: Duration::from_secs(SECONDS_PER_HOUR as u64),
                }
            }
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
