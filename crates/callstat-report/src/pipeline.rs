//! 리포트 파이프라인.
//!
//! 구간 결정 → 수집 → 합산 → KPI → 포맷 → 전송. 단계별로 엄격히 순차 실행하며
//! 앞 단계가 실패하면 뒤 단계는 실행하지 않는다.

use callstat_core::error::CoreError;
use callstat_core::models::invocation::MetricRequest;
use callstat_core::models::kpi::{KpiSet, ServiceLevelThreshold};
use callstat_core::models::metrics::AggregateMetrics;
use callstat_core::models::notification::DeliveryReceipt;
use callstat_core::models::time_range::TimeRange;
use callstat_core::ports::delivery::NotificationDelivery;
use callstat_core::ports::metrics_fetcher::MetricsFetcher;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::formatter::NotificationFormatter;
use crate::{aggregator, kpi, time_range};

/// 호출 1회의 결과
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub range: TimeRange,
    pub aggregate: AggregateMetrics,
    pub kpis: KpiSet,
    pub receipt: DeliveryReceipt,
}

/// 리포트 파이프라인: 수집기/전송기 포트 + 순수 단계
pub struct ReportPipeline {
    fetcher: Arc<dyn MetricsFetcher>,
    delivery: Arc<dyn NotificationDelivery>,
    formatter: NotificationFormatter,
    threshold: ServiceLevelThreshold,
}

impl ReportPipeline {
    pub fn new(
        fetcher: Arc<dyn MetricsFetcher>,
        delivery: Arc<dyn NotificationDelivery>,
        formatter: NotificationFormatter,
        threshold: ServiceLevelThreshold,
    ) -> Self {
        Self {
            fetcher,
            delivery,
            formatter,
            threshold,
        }
    }

    /// 파이프라인 실행
    ///
    /// `now`는 기본 집계 구간 계산에만 쓴다.
    pub async fn run(
        &self,
        request: &MetricRequest,
        now: DateTime<Utc>,
    ) -> Result<ReportOutcome, CoreError> {
        let range = time_range::resolve(now, request.time_range.as_ref())?;
        info!(
            instance = request.instance.instance_id(),
            queues = request.queue_ids.len(),
            threshold_secs = self.threshold.seconds(),
            window_mins = range.duration().num_minutes(),
            "리포트 시작: {} ~ {}",
            range.start,
            range.end
        );

        let samples = self
            .fetcher
            .fetch(&request.instance, &request.queue_ids, &range, self.threshold)
            .await?;
        for sample in &samples {
            debug!(
                queue = sample.label(),
                offered = sample.sample.offered,
                handled = sample.sample.handled,
                "큐 샘플"
            );
        }

        let aggregate = aggregator::aggregate(&samples);
        let kpis = kpi::compute(&aggregate, self.threshold);
        let payload = self.formatter.format(&aggregate, &kpis, &range);
        debug!("알림 메시지:\n{}", payload.text);

        let receipt = match self.delivery.deliver(&request.webhook, &payload).await {
            Ok(receipt) => receipt,
            Err(e) => {
                // 전송 실패 시에도 계산 결과는 로그로 남긴다
                error!(
                    offered = aggregate.offered,
                    handled = aggregate.handled,
                    answered_within_threshold = aggregate.answered_within_threshold,
                    abandoned = aggregate.abandoned,
                    answer_rate = ?kpis.answer_rate,
                    service_level = ?kpis.service_level,
                    asa_secs = ?kpis.asa_secs,
                    "알림 전송 실패: {e}"
                );
                return Err(e);
            }
        };

        info!(
            status = receipt.status,
            attempts = receipt.attempts,
            "리포트 전송 완료"
        );

        Ok(ReportOutcome {
            range,
            aggregate,
            kpis,
            receipt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use callstat_core::models::invocation::{ConnectInstance, InvocationEvent};
    use callstat_core::models::metrics::{QueueMetricSample, QueueSample};
    use callstat_core::models::notification::NotificationPayload;
    use chrono::TimeZone;
    use parking_lot::Mutex;
    use url::Url;

    #[derive(Default)]
    struct FixedFetcher {
        samples: Vec<QueueSample>,
        fail: bool,
        seen_ranges: Mutex<Vec<TimeRange>>,
    }

    #[async_trait]
    impl MetricsFetcher for FixedFetcher {
        async fn fetch(
            &self,
            _instance: &ConnectInstance,
            _queue_ids: &[String],
            range: &TimeRange,
            _threshold: ServiceLevelThreshold,
        ) -> Result<Vec<QueueSample>, CoreError> {
            self.seen_ranges.lock().push(*range);
            if self.fail {
                return Err(CoreError::UpstreamApi {
                    queue_id: "q-bad".to_string(),
                    attempts: 3,
                    cause: Box::new(CoreError::ServiceUnavailable("503".to_string())),
                });
            }
            Ok(self.samples.clone())
        }
    }

    #[derive(Default)]
    struct RecordingDelivery {
        fail: bool,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationDelivery for RecordingDelivery {
        async fn deliver(
            &self,
            _endpoint: &Url,
            payload: &NotificationPayload,
        ) -> Result<DeliveryReceipt, CoreError> {
            self.sent.lock().push(payload.text.clone());
            if self.fail {
                Err(CoreError::Delivery {
                    status: Some(400),
                    attempts: 1,
                    message: "invalid_payload".to_string(),
                })
            } else {
                Ok(DeliveryReceipt {
                    status: 200,
                    attempts: 1,
                })
            }
        }
    }

    fn request(time_range: Option<TimeRange>) -> MetricRequest {
        MetricRequest::from_event(InvocationEvent {
            connect_arn: Some(
                "arn:aws:connect:ap-northeast-1:123456789012:instance/inst-1".to_string(),
            ),
            queues: Some(vec!["q1".to_string(), "q2".to_string()]),
            webhook: Some("https://hooks.example.com/services/T/B/X".to_string()),
            time_range,
        })
        .unwrap()
    }

    fn two_queues() -> Vec<QueueSample> {
        vec![
            QueueSample::new(
                "q1",
                QueueMetricSample {
                    offered: 10,
                    handled: 8,
                    answered_within_threshold: 7,
                    total_answer_wait_ms: 56_000,
                    abandoned: 2,
                },
            ),
            QueueSample::new(
                "q2",
                QueueMetricSample {
                    offered: 5,
                    handled: 5,
                    answered_within_threshold: 5,
                    total_answer_wait_ms: 25_000,
                    abandoned: 0,
                },
            ),
        ]
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 14, 7, 0).unwrap()
    }

    fn pipeline(
        fetcher: Arc<FixedFetcher>,
        delivery: Arc<RecordingDelivery>,
    ) -> ReportPipeline {
        ReportPipeline::new(
            fetcher,
            delivery,
            NotificationFormatter::default(),
            ServiceLevelThreshold::default(),
        )
    }

    #[tokio::test]
    async fn end_to_end_two_queues() {
        let fetcher = Arc::new(FixedFetcher {
            samples: two_queues(),
            ..Default::default()
        });
        let delivery = Arc::new(RecordingDelivery::default());
        let outcome = pipeline(fetcher.clone(), delivery.clone())
            .run(&request(None), now())
            .await
            .unwrap();

        assert_eq!(outcome.aggregate.offered, 15);
        assert_eq!(outcome.aggregate.handled, 13);
        assert_eq!(outcome.aggregate.answered_within_threshold, 12);
        assert_eq!(outcome.aggregate.total_answer_wait_ms, 81_000);
        assert_eq!(outcome.aggregate.abandoned, 2);
        assert_eq!(outcome.receipt.status, 200);

        let expected_start = Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap();
        assert_eq!(outcome.range.start, expected_start);
        assert_eq!(fetcher.seen_ranges.lock()[0], outcome.range);

        let sent = delivery.sent.lock();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("(86.7%)"));
        assert!(sent[0].contains("(80.0%)"));
        assert!(sent[0].contains("6.2초"));
    }

    #[tokio::test]
    async fn fetch_failure_skips_delivery() {
        let fetcher = Arc::new(FixedFetcher {
            fail: true,
            ..Default::default()
        });
        let delivery = Arc::new(RecordingDelivery::default());
        let err = pipeline(fetcher, delivery.clone())
            .run(&request(None), now())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::UpstreamApi { .. }));
        assert!(delivery.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn invalid_range_stops_before_fetch() {
        let fetcher = Arc::new(FixedFetcher {
            samples: two_queues(),
            ..Default::default()
        });
        let delivery = Arc::new(RecordingDelivery::default());
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let reversed = TimeRange {
            start,
            end: start - chrono::Duration::minutes(30),
        };

        let err = pipeline(fetcher.clone(), delivery.clone())
            .run(&request(Some(reversed)), now())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::InvalidTimeRange { .. }));
        assert!(fetcher.seen_ranges.lock().is_empty());
        assert!(delivery.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_reported() {
        let fetcher = Arc::new(FixedFetcher {
            samples: two_queues(),
            ..Default::default()
        });
        let delivery = Arc::new(RecordingDelivery {
            fail: true,
            ..Default::default()
        });
        let err = pipeline(fetcher, delivery.clone())
            .run(&request(None), now())
            .await
            .unwrap_err();

        assert_eq!(err.http_status(), Some(400));
        assert_eq!(delivery.sent.lock().len(), 1);
    }
}
