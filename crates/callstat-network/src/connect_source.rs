//! Amazon Connect 분석 API 어댑터.
//!
//! `MetricsSource` 포트 구현. 큐 1개당 `DescribeQueue`로 존재/이름을 확인하고
//! `GetMetricDataV2`(Interval=TOTAL)로 구간 합계를 조회한다.
//! 재시도는 하지 않는다 (호출자 `ConcurrentMetricsFetcher` 담당).

use async_trait::async_trait;
use aws_sdk_connect::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_connect::primitives::DateTime as AwsDateTime;
use aws_sdk_connect::types::{
    FilterV2, IntervalDetails, IntervalPeriod, MetricFilterV2, MetricResultV2, MetricV2,
    ThresholdV2,
};
use aws_sdk_connect::Client;
use callstat_core::error::CoreError;
use callstat_core::models::invocation::ConnectInstance;
use callstat_core::models::kpi::ServiceLevelThreshold;
use callstat_core::models::metrics::QueueMetricSample;
use callstat_core::models::time_range::TimeRange;
use callstat_core::ports::metrics_source::{MetricsSource, QueueInfo};
use tracing::{debug, warn};

/// 필터/그룹 키
const QUEUE_KEY: &str = "QUEUE";
const INITIATION_METHOD_KEY: &str = "INITIATION_METHOD";
const INBOUND: &str = "INBOUND";

/// 조회 메트릭 이름
pub const CONTACTS_CREATED: &str = "CONTACTS_CREATED";
pub const CONTACTS_HANDLED: &str = "CONTACTS_HANDLED";
pub const SUM_CONTACTS_ANSWERED_IN_X: &str = "SUM_CONTACTS_ANSWERED_IN_X";
pub const AVG_QUEUE_ANSWER_TIME: &str = "AVG_QUEUE_ANSWER_TIME";
pub const CONTACTS_ABANDONED: &str = "CONTACTS_ABANDONED";

/// Amazon Connect 메트릭 소스
#[derive(Debug, Clone)]
pub struct ConnectMetricsSource {
    client: Client,
}

impl ConnectMetricsSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 기본 자격 증명 체인으로 클라이언트 생성
    ///
    /// `region`이 없으면 SDK 기본 해석(환경변수/프로필)을 따른다.
    pub async fn from_region(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_sdk_connect::config::Region::new(region));
        }
        let config = loader.load().await;
        debug!(region = ?config.region(), "Amazon Connect 클라이언트 초기화");
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl MetricsSource for ConnectMetricsSource {
    async fn describe_queue(
        &self,
        instance: &ConnectInstance,
        queue_id: &str,
    ) -> Result<QueueInfo, CoreError> {
        let output = self
            .client
            .describe_queue()
            .instance_id(instance.instance_id())
            .queue_id(queue_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(instance, queue_id, e))?;

        let name = output.queue().and_then(|q| q.name()).map(str::to_string);
        debug!(queue_id, name = ?name, "큐 정보 조회");
        Ok(QueueInfo {
            queue_id: queue_id.to_string(),
            name,
        })
    }

    async fn query_queue(
        &self,
        instance: &ConnectInstance,
        queue_id: &str,
        range: &TimeRange,
        threshold: ServiceLevelThreshold,
    ) -> Result<QueueMetricSample, CoreError> {
        let mut results: Vec<MetricResultV2> = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .get_metric_data_v2()
                .resource_arn(instance.arn())
                .start_time(AwsDateTime::from_secs(range.start.timestamp()))
                .end_time(AwsDateTime::from_secs(range.end.timestamp()))
                .interval(
                    IntervalDetails::builder()
                        .interval_period(IntervalPeriod::Total)
                        .build(),
                )
                .filters(
                    FilterV2::builder()
                        .filter_key(QUEUE_KEY)
                        .filter_values(queue_id)
                        .build(),
                )
                .groupings(QUEUE_KEY)
                .set_metrics(Some(metric_definitions(threshold)));
            if let Some(token) = next_token {
                req = req.next_token(token);
            }

            let output = req
                .send()
                .await
                .map_err(|e| map_sdk_error(instance, queue_id, e))?;
            results.extend(output.metric_results().iter().cloned());

            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        let sample = sample_from_results(queue_id, &results);
        debug!(
            queue_id,
            rows = results.len(),
            offered = sample.offered,
            handled = sample.handled,
            "큐 메트릭 조회 완료"
        );
        Ok(sample)
    }
}

/// 요청 메트릭 정의
///
/// 인입/연결 건수는 INBOUND 컨택트만 센다.
/// 임계값 이내 응답 건수, 평균 응답 대기, 포기 건수에는 INBOUND 필터를 걸지 않는다.
/// 이 세 값은 큐 대기를 거친 모든 컨택트(콜백/전환 포함)가 대상이므로
/// 서비스 레벨의 분자와 분모(INBOUND 인입)가 다른 집합을 셀 수 있다.
/// 임계값 이내 응답 건수는 `LTE`(경계 포함)로 요청한다.
pub fn metric_definitions(threshold: ServiceLevelThreshold) -> Vec<MetricV2> {
    let inbound = || {
        MetricFilterV2::builder()
            .metric_filter_key(INITIATION_METHOD_KEY)
            .metric_filter_values(INBOUND)
            .negate(false)
            .build()
    };

    vec![
        MetricV2::builder()
            .name(CONTACTS_CREATED)
            .metric_filters(inbound())
            .build(),
        MetricV2::builder()
            .name(CONTACTS_HANDLED)
            .metric_filters(inbound())
            .build(),
        MetricV2::builder()
            .name(SUM_CONTACTS_ANSWERED_IN_X)
            .threshold(
                ThresholdV2::builder()
                    .comparison(threshold.api_comparison())
                    .threshold_value(f64::from(threshold.seconds()))
                    .build(),
            )
            .build(),
        MetricV2::builder().name(AVG_QUEUE_ANSWER_TIME).build(),
        MetricV2::builder().name(CONTACTS_ABANDONED).build(),
    ]
}

/// 결과 행 → 큐 샘플
///
/// 다른 큐 차원의 행은 무시한다. 행이 여러 개면 행 단위로 변환해 더한다.
/// 응답 대기 합계 = 평균 대기(초) × 연결 건수, 밀리초로 반올림.
pub fn sample_from_results(queue_id: &str, results: &[MetricResultV2]) -> QueueMetricSample {
    let mut sample = QueueMetricSample::default();

    for row in results {
        let row_queue = row.dimensions().and_then(|d| d.get(QUEUE_KEY));
        if let Some(other) = row_queue.filter(|q| q.as_str() != queue_id) {
            debug!(queue_id, other = %other, "다른 큐 결과 행 무시");
            continue;
        }

        let mut handled = 0u64;
        let mut avg_wait_secs = 0.0f64;
        for data in row.collections() {
            let Some(name) = data.metric().and_then(|m| m.name()) else {
                continue;
            };
            let value = sanitize(queue_id, name, data.value());
            match name {
                CONTACTS_CREATED => sample.offered += value.round() as u64,
                CONTACTS_HANDLED => handled = value.round() as u64,
                SUM_CONTACTS_ANSWERED_IN_X => {
                    sample.answered_within_threshold += value.round() as u64
                }
                AVG_QUEUE_ANSWER_TIME => avg_wait_secs = value,
                CONTACTS_ABANDONED => sample.abandoned += value.round() as u64,
                other => debug!(queue_id, metric = other, "알 수 없는 메트릭 무시"),
            }
        }

        sample.handled += handled;
        sample.total_answer_wait_ms += (avg_wait_secs * handled as f64 * 1000.0).round() as u64;
    }

    sample
}

/// 음수/비유한 값은 0으로 보정
fn sanitize(queue_id: &str, metric: &str, value: Option<f64>) -> f64 {
    match value {
        None => 0.0,
        Some(v) if v.is_finite() && v >= 0.0 => v,
        Some(v) => {
            warn!(queue_id, metric, value = v, "비정상 메트릭 값, 0으로 보정");
            0.0
        }
    }
}

/// SDK 에러 → `CoreError`
fn map_sdk_error<E, R>(
    instance: &ConnectInstance,
    queue_id: &str,
    err: SdkError<E, R>,
) -> CoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::TimeoutError(_) => CoreError::Network(format!("요청 타임아웃: {message}")),
        SdkError::DispatchFailure(_) => CoreError::Network(format!("요청 전송 실패: {message}")),
        SdkError::ResponseError(_) => {
            CoreError::ServiceUnavailable(format!("응답 해석 실패: {message}"))
        }
        SdkError::ServiceError(_) => {
            classify_service_error(instance.instance_id(), queue_id, err.code(), message)
        }
        _ => CoreError::Internal(format!("요청 생성 실패: {message}")),
    }
}

/// 서비스 에러 코드 분류
///
/// 스로틀링/내부 오류/권한 오류는 일시 에러로, 파라미터 오류는 영구 에러로 본다.
/// `ResourceNotFoundException`은 큐가 아닌 인스턴스를 가리키면 설정 에러로 올린다.
pub fn classify_service_error(
    instance_id: &str,
    queue_id: &str,
    code: Option<&str>,
    message: String,
) -> CoreError {
    match code.unwrap_or_default() {
        "ThrottlingException" | "TooManyRequestsException" | "LimitExceededException" => {
            CoreError::RateLimit(message)
        }
        "InternalServiceException" | "ServiceUnavailableException" => {
            CoreError::ServiceUnavailable(message)
        }
        "AccessDeniedException" | "UnauthorizedException" | "ExpiredTokenException" => {
            CoreError::Auth(message)
        }
        "ResourceNotFoundException" if names_missing_instance(queue_id, &message) => {
            CoreError::configuration(
                "connect_arn",
                format!("인스턴스를 찾을 수 없습니다 ({instance_id}): {message}"),
            )
        }
        "ResourceNotFoundException" => CoreError::UnknownQueue {
            queue_id: queue_id.to_string(),
        },
        _ => CoreError::Internal(format!("분석 API 요청 거부: {message}")),
    }
}

/// 리소스 없음 메시지가 큐가 아닌 인스턴스를 지목하는지
fn names_missing_instance(queue_id: &str, message: &str) -> bool {
    !message.contains(queue_id) && message.to_ascii_lowercase().contains("instance")
}
