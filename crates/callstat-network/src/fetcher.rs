//! 큐 메트릭 병렬 수집기.
//!
//! `MetricsFetcher` 포트 구현. 큐마다 존재 확인 → 메트릭 조회를 재시도 정책으로 감싸고,
//! 최대 `max_concurrency`개까지 동시에 진행한다.
//! 한 큐가 최종 실패하면 진행 중인 나머지 조회를 버리고 즉시 실패한다.

use async_trait::async_trait;
use callstat_core::config::AppConfig;
use callstat_core::error::CoreError;
use callstat_core::models::invocation::ConnectInstance;
use callstat_core::models::kpi::ServiceLevelThreshold;
use callstat_core::models::metrics::QueueSample;
use callstat_core::models::time_range::TimeRange;
use callstat_core::ports::metrics_fetcher::MetricsFetcher;
use callstat_core::ports::metrics_source::MetricsSource;
use futures::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::retry::{RetryFailure, RetryPolicy};

/// 기본 동시 조회 수
const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// 병렬 수집기
pub struct ConcurrentMetricsFetcher {
    source: Arc<dyn MetricsSource>,
    retry: RetryPolicy,
    max_concurrency: usize,
}

impl ConcurrentMetricsFetcher {
    pub fn new(source: Arc<dyn MetricsSource>, retry: RetryPolicy) -> Self {
        Self {
            source,
            retry,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// 설정에서 생성 (재시도 정책 + 동시성)
    pub fn from_config(source: Arc<dyn MetricsSource>, config: &AppConfig) -> Self {
        Self::new(source, RetryPolicy::for_fetch(config))
            .with_max_concurrency(config.fetch.max_concurrency)
    }

    /// 동시 조회 수 설정 (0은 1로 취급)
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// 큐 1개 수집
    async fn fetch_one(
        &self,
        instance: &ConnectInstance,
        queue_id: &str,
        range: &TimeRange,
        threshold: ServiceLevelThreshold,
    ) -> Result<QueueSample, CoreError> {
        let source = self.source.as_ref();

        let (info, _) = self
            .retry
            .run("큐 정보 조회", move |_| source.describe_queue(instance, queue_id))
            .await
            .map_err(|f| upstream_error(queue_id, f))?;

        let (sample, attempts) = self
            .retry
            .run("큐 메트릭 조회", move |_| {
                source.query_queue(instance, queue_id, range, threshold)
            })
            .await
            .map_err(|f| upstream_error(queue_id, f))?;

        debug!(queue_id, attempts, empty = sample.is_empty(), "큐 수집 완료");
        let result = QueueSample::new(queue_id, sample);
        Ok(match info.name {
            Some(name) => result.with_name(name),
            None => result,
        })
    }
}

/// 재시도 실패 → 호출자에게 올릴 에러
///
/// 존재하지 않는 큐는 그대로, 나머지는 큐 ID와 시도 횟수를 붙여 감싼다.
fn upstream_error(queue_id: &str, failure: RetryFailure) -> CoreError {
    let RetryFailure { error, attempts } = failure;
    match error {
        CoreError::UnknownQueue { .. } => error,
        cause => CoreError::UpstreamApi {
            queue_id: queue_id.to_string(),
            attempts,
            cause: Box::new(cause),
        },
    }
}

#[async_trait]
impl MetricsFetcher for ConcurrentMetricsFetcher {
    async fn fetch(
        &self,
        instance: &ConnectInstance,
        queue_ids: &[String],
        range: &TimeRange,
        threshold: ServiceLevelThreshold,
    ) -> Result<Vec<QueueSample>, CoreError> {
        debug!(
            queues = queue_ids.len(),
            concurrency = self.max_concurrency,
            "큐 메트릭 수집 시작"
        );

        let mut indexed: Vec<(usize, QueueSample)> = stream::iter(queue_ids.iter().enumerate())
            .map(move |(index, queue_id)| async move {
                self.fetch_one(instance, queue_id, range, threshold)
                    .await
                    .map(|sample| (index, sample))
            })
            .boxed()
            .buffer_unordered(self.max_concurrency)
            .try_collect()
            .await
            .inspect_err(|e| error!("큐 메트릭 수집 실패: {e}"))?;

        // 완료 순서 → 요청 순서
        indexed.sort_by_key(|(index, _)| *index);
        let samples: Vec<QueueSample> = indexed.into_iter().map(|(_, s)| s).collect();

        info!(queues = samples.len(), "큐 메트릭 수집 완료");
        Ok(samples)
    }
}
