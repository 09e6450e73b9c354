//! 분석 API 포트 (큐 단위 단일 호출).
//!
//! 구현: `callstat-network` crate (aws-sdk-connect)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::invocation::ConnectInstance;
use crate::models::kpi::ServiceLevelThreshold;
use crate::models::metrics::QueueMetricSample;
use crate::models::time_range::TimeRange;

/// 큐 기본 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueInfo {
    pub queue_id: String,
    /// 표시 이름 (없을 수 있음)
    pub name: Option<String>,
}

/// 분석 API 클라이언트
///
/// 재시도는 하지 않는다. 호출자가 `CoreError::is_transient`로 판별해 재시도한다.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// 큐 존재 확인 및 이름 조회
    ///
    /// 존재하지 않으면 `CoreError::UnknownQueue`.
    async fn describe_queue(
        &self,
        instance: &ConnectInstance,
        queue_id: &str,
    ) -> Result<QueueInfo, CoreError>;

    /// 구간 내 큐 메트릭 조회
    ///
    /// 활동이 없는 큐는 모든 필드가 0인 샘플을 반환한다.
    async fn query_queue(
        &self,
        instance: &ConnectInstance,
        queue_id: &str,
        range: &TimeRange,
        threshold: ServiceLevelThreshold,
    ) -> Result<QueueMetricSample, CoreError>;
}
