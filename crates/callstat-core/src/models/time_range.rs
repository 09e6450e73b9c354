//! 집계 구간 모델.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 리포트 집계 구간 `[start, end)` (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// 구간 시작 (포함)
    pub start: DateTime<Utc>,
    /// 구간 종료 (미포함)
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// 검증된 구간 생성. `end <= start`이면 `InvalidTimeRange`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, CoreError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// 구간 불변식 검사
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.end <= self.start {
            return Err(CoreError::InvalidTimeRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// 구간 길이
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_rejects_empty_and_reversed() {
        let t = Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap();
        assert!(matches!(
            TimeRange::new(t, t),
            Err(CoreError::InvalidTimeRange { .. })
        ));
        assert!(matches!(
            TimeRange::new(t, t - chrono::Duration::minutes(1)),
            Err(CoreError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn deserializes_offsets_into_utc() {
        let range: TimeRange = serde_json::from_str(
            r#"{"start":"2026-10-19T22:00:00+09:00","end":"2026-10-19T14:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(
            range.start,
            Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap()
        );
        assert_eq!(range.duration(), chrono::Duration::hours(1));
    }
}
