//! 집계 구간 결정.
//!
//! 명시적 구간이 없으면 직전에 끝난 1시간 (UTC 정시 기준).

use callstat_core::error::CoreError;
use callstat_core::models::time_range::TimeRange;
use chrono::{DateTime, Duration, DurationRound, Utc};
use tracing::debug;

/// 집계 구간 결정
///
/// - 명시적 구간이 유효하면 그대로 반환
/// - 명시적 구간의 `end <= start`이면 `InvalidTimeRange`
/// - 없으면 `[now를 정시로 내림 - 1h, now를 정시로 내림)`
pub fn resolve(now: DateTime<Utc>, explicit: Option<&TimeRange>) -> Result<TimeRange, CoreError> {
    if let Some(range) = explicit {
        range.validate()?;
        debug!("명시적 집계 구간 사용: {} ~ {}", range.start, range.end);
        return Ok(*range);
    }

    let end = truncate_to_hour(now);
    let range = TimeRange::new(end - Duration::hours(1), end)?;
    debug!("기본 집계 구간: {} ~ {}", range.start, range.end);
    Ok(range)
}

/// 분/초/서브초 버림
fn truncate_to_hour(now: DateTime<Utc>) -> DateTime<Utc> {
    now.duration_trunc(Duration::hours(1)).unwrap_or(now)
}
