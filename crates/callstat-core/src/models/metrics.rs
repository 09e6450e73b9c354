//! 큐 메트릭 모델.
//!
//! 분석 API에서 받은 큐별 원시 샘플과 큐 전체 합계.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// 큐 1개, 구간 1개의 원시 메트릭
///
/// 응답 대기 합계는 정수 밀리초로 보관한다 (합산 순서와 무관하게 정확).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMetricSample {
    /// 인입(offered) 건수
    pub offered: u64,
    /// 상담원 연결(handled) 건수
    pub handled: u64,
    /// 임계값 이내 응답 건수
    pub answered_within_threshold: u64,
    /// 응답 대기 시간 합계 (밀리초)
    pub total_answer_wait_ms: u64,
    /// 응답 전 포기 건수
    pub abandoned: u64,
}

impl QueueMetricSample {
    /// 활동이 전혀 없는 샘플인지
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// 큐 식별자가 붙은 샘플 (fetch 결과의 한 원소)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSample {
    /// 큐 ID
    pub queue_id: String,
    /// 큐 표시 이름 (조회된 경우)
    #[serde(default)]
    pub queue_name: Option<String>,
    /// 원시 메트릭
    pub sample: QueueMetricSample,
}

impl QueueSample {
    pub fn new(queue_id: impl Into<String>, sample: QueueMetricSample) -> Self {
        Self {
            queue_id: queue_id.into(),
            queue_name: None,
            sample,
        }
    }

    /// 표시 이름 지정
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.queue_name = Some(name.into());
        self
    }

    /// 로그/메시지용 라벨 (이름 우선)
    pub fn label(&self) -> &str {
        self.queue_name.as_deref().unwrap_or(&self.queue_id)
    }
}

/// 요청된 전체 큐의 합계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    /// 합산된 큐 샘플 수
    pub queue_count: usize,
    pub offered: u64,
    pub handled: u64,
    pub answered_within_threshold: u64,
    /// 응답 대기 시간 합계 (밀리초)
    pub total_answer_wait_ms: u64,
    pub abandoned: u64,
}

impl AggregateMetrics {
    /// 단일 샘플을 합계로 변환
    pub fn from_sample(sample: &QueueMetricSample) -> Self {
        Self {
            queue_count: 1,
            offered: sample.offered,
            handled: sample.handled,
            answered_within_threshold: sample.answered_within_threshold,
            total_answer_wait_ms: sample.total_answer_wait_ms,
            abandoned: sample.abandoned,
        }
    }

    /// 응답 대기 시간 합계 (초)
    pub fn total_answer_wait_secs(&self) -> f64 {
        self.total_answer_wait_ms as f64 / 1000.0
    }
}

impl Add for AggregateMetrics {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            queue_count: self.queue_count + rhs.queue_count,
            offered: self.offered + rhs.offered,
            handled: self.handled + rhs.handled,
            answered_within_threshold: self.answered_within_threshold
                + rhs.answered_within_threshold,
            total_answer_wait_ms: self.total_answer_wait_ms + rhs.total_answer_wait_ms,
            abandoned: self.abandoned + rhs.abandoned,
        }
    }
}

impl AddAssign for AggregateMetrics {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for AggregateMetrics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a QueueMetricSample> for AggregateMetrics {
    fn sum<I: Iterator<Item = &'a QueueMetricSample>>(iter: I) -> Self {
        iter.map(Self::from_sample).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_label_prefers_name() {
        let sample = QueueSample::new("q-1", QueueMetricSample::default());
        assert_eq!(sample.label(), "q-1");
        assert_eq!(sample.with_name("Support").label(), "Support");
    }

    #[test]
    fn empty_sum_is_zero() {
        let samples: Vec<QueueMetricSample> = Vec::new();
        let total: AggregateMetrics = samples.iter().sum();
        assert_eq!(total, AggregateMetrics::default());
        assert!(QueueMetricSample::default().is_empty());
    }

    #[test]
    fn wait_seconds_conversion() {
        let agg = AggregateMetrics {
            total_answer_wait_ms: 81_500,
            ..Default::default()
        };
        assert!((agg.total_answer_wait_secs() - 81.5).abs() < f64::EPSILON);
    }
}
