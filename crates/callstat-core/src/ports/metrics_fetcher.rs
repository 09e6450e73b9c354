//! 메트릭 수집 포트.
//!
//! 순차/병렬 여부는 구현이 결정한다.
//! 구현: `callstat-network` crate (`ConcurrentMetricsFetcher`)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::invocation::ConnectInstance;
use crate::models::kpi::ServiceLevelThreshold;
use crate::models::metrics::QueueSample;
use crate::models::time_range::TimeRange;

/// 큐 목록 전체의 메트릭 수집기
#[async_trait]
pub trait MetricsFetcher: Send + Sync {
    /// 큐별 샘플 수집
    ///
    /// 결과는 `queue_ids`와 같은 순서·같은 길이다.
    /// 한 큐라도 최종 실패하면 전체가 실패한다 (부분 결과 없음).
    async fn fetch(
        &self,
        instance: &ConnectInstance,
        queue_ids: &[String],
        range: &TimeRange,
        threshold: ServiceLevelThreshold,
    ) -> Result<Vec<QueueSample>, CoreError>;
}
