//! 호출 핸들러.
//!
//! 이벤트 검증 → 어댑터 와이어링 → 파이프라인 실행 → 호출 응답 변환.

use callstat_core::config::AppConfig;
use callstat_core::error::CoreError;
use callstat_core::models::invocation::{InvocationResponse, MetricRequest};
use callstat_core::ports::metrics_source::MetricsSource;
use callstat_network::connect_source::ConnectMetricsSource;
use callstat_network::fetcher::ConcurrentMetricsFetcher;
use callstat_network::webhook::WebhookNotifier;
use callstat_report::formatter::NotificationFormatter;
use callstat_report::pipeline::{ReportOutcome, ReportPipeline};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info};

/// 성공 응답 본문
pub const SUCCESS_BODY: &str = "메트릭 조회와 알림 전송이 완료되었습니다";

/// 이벤트 원문 1건 처리
///
/// 모든 실패는 `statusCode: 500` 응답으로 변환된다.
pub async fn handle(input: &str, config: &AppConfig, now: DateTime<Utc>) -> InvocationResponse {
    let request = match MetricRequest::from_json(input) {
        Ok(request) => request,
        Err(e) => return respond(Err(e)),
    };

    // 리전: 설정 우선, 없으면 인스턴스 ARN의 리전
    let region = config
        .fetch
        .aws_region
        .clone()
        .or_else(|| request.instance.region().map(str::to_string));
    let source = Arc::new(ConnectMetricsSource::from_region(region).await);

    respond(execute(&request, source, config, now).await)
}

/// 주어진 메트릭 소스로 파이프라인 1회 실행
pub async fn execute(
    request: &MetricRequest,
    source: Arc<dyn MetricsSource>,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> Result<ReportOutcome, CoreError> {
    build_pipeline(source, config)?.run(request, now).await
}

/// DI: 설정 → 파이프라인
pub fn build_pipeline(
    source: Arc<dyn MetricsSource>,
    config: &AppConfig,
) -> Result<ReportPipeline, CoreError> {
    let fetcher = Arc::new(ConcurrentMetricsFetcher::from_config(source, config));
    let delivery = Arc::new(WebhookNotifier::from_config(config)?);

    Ok(ReportPipeline::new(
        fetcher,
        delivery,
        NotificationFormatter::from_config(&config.report),
        config.service_level.threshold,
    ))
}

/// 실행 결과 → 호출 응답
fn respond(result: Result<ReportOutcome, CoreError>) -> InvocationResponse {
    match result {
        Ok(outcome) => {
            info!(
                queues = outcome.aggregate.queue_count,
                offered = outcome.aggregate.offered,
                attempts = outcome.receipt.attempts,
                "호출 완료"
            );
            InvocationResponse::success(SUCCESS_BODY)
        }
        Err(e) => {
            error!("호출 실패: {e}");
            InvocationResponse::failure(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use callstat_core::models::invocation::ConnectInstance;
    use callstat_core::models::kpi::ServiceLevelThreshold;
    use callstat_core::models::metrics::QueueMetricSample;
    use callstat_core::models::time_range::TimeRange;
    use callstat_core::ports::metrics_source::QueueInfo;
    use chrono::TimeZone;

    struct StaticSource;

    #[async_trait]
    impl MetricsSource for StaticSource {
        async fn describe_queue(
            &self,
            _instance: &ConnectInstance,
            queue_id: &str,
        ) -> Result<QueueInfo, CoreError> {
            Ok(QueueInfo {
                queue_id: queue_id.to_string(),
                name: None,
            })
        }

        async fn query_queue(
            &self,
            _instance: &ConnectInstance,
            _queue_id: &str,
            _range: &TimeRange,
            _threshold: ServiceLevelThreshold,
        ) -> Result<QueueMetricSample, CoreError> {
            Ok(QueueMetricSample {
                offered: 4,
                handled: 4,
                answered_within_threshold: 3,
                total_answer_wait_ms: 20_000,
                abandoned: 0,
            })
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 14, 7, 0).unwrap()
    }

    #[tokio::test]
    async fn invalid_event_reports_failure() {
        let response = handle(r#"{"queues": ["q1"]}"#, &AppConfig::default_config(), now()).await;
        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("connect_arn"));

        let response = handle("not json", &AppConfig::default_config(), now()).await;
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn execute_delivers_to_webhook() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .with_status(200)
            .create_async()
            .await;

        let event = serde_json::json!({
            "connect_arn": "arn:aws:connect:ap-northeast-1:123456789012:instance/inst-1",
            "queues": ["q1", "q2"],
            "webhook": format!("{}/hook", server.url()),
        });
        let request = MetricRequest::from_json(&event.to_string()).unwrap();

        let outcome = execute(
            &request,
            Arc::new(StaticSource),
            &AppConfig::default_config(),
            now(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.aggregate.offered, 8);
        assert_eq!(outcome.receipt.status, 200);
        assert_eq!(respond(Ok(outcome)).body, SUCCESS_BODY);
        mock.assert_async().await;
    }
}
