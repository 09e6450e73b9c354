//! 호출 요청/응답 모델.
//!
//! 트리거가 넘겨주는 원시 이벤트(`InvocationEvent`)를 검증해
//! 불변 요청(`MetricRequest`)으로 변환한다.

use serde::{Deserialize, Serialize};
use url::Url;

use super::time_range::TimeRange;
use crate::error::CoreError;

/// 트리거 이벤트 원문: 모든 필드가 선택적
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationEvent {
    /// Amazon Connect 인스턴스 ARN
    #[serde(default)]
    pub connect_arn: Option<String>,
    /// 집계 대상 큐 ID 목록
    #[serde(default)]
    pub queues: Option<Vec<String>>,
    /// 알림 웹훅 URL
    #[serde(default)]
    pub webhook: Option<String>,
    /// 명시적 집계 구간
    #[serde(default)]
    pub time_range: Option<TimeRange>,
}

/// Amazon Connect 인스턴스 식별자
///
/// `arn:aws:connect:<region>:<account>:instance/<instance-id>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectInstance {
    arn: String,
    region: String,
    instance_id: String,
}

impl ConnectInstance {
    /// ARN 파싱
    pub fn parse(arn: &str) -> Result<Self, CoreError> {
        let arn = arn.trim();
        let parts: Vec<&str> = arn.splitn(6, ':').collect();
        if parts.len() != 6 || parts[0] != "arn" || parts[2] != "connect" {
            return Err(CoreError::configuration(
                "connect_arn",
                format!("Amazon Connect 인스턴스 ARN 형식이 아닙니다: {arn}"),
            ));
        }

        let instance_id = parts[5]
            .strip_prefix("instance/")
            .and_then(|rest| rest.split('/').next())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                CoreError::configuration(
                    "connect_arn",
                    format!("ARN에 instance/<id> 리소스가 없습니다: {arn}"),
                )
            })?;

        Ok(Self {
            arn: arn.to_string(),
            region: parts[3].to_string(),
            instance_id: instance_id.to_string(),
        })
    }

    /// 전체 ARN (GetMetricDataV2 `ResourceArn`)
    pub fn arn(&self) -> &str {
        &self.arn
    }

    /// ARN의 리전 (비어 있을 수 있음)
    pub fn region(&self) -> Option<&str> {
        Some(self.region.as_str()).filter(|r| !r.is_empty())
    }

    /// 인스턴스 ID (DescribeQueue `InstanceId`)
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }
}

/// 검증된 메트릭 리포트 요청 (호출 1회 동안만 유지, 불변)
#[derive(Debug, Clone)]
pub struct MetricRequest {
    /// 대상 인스턴스
    pub instance: ConnectInstance,
    /// 큐 ID 목록 (요청 순서 유지, 중복은 별개 대상으로 취급)
    pub queue_ids: Vec<String>,
    /// 알림 웹훅
    pub webhook: Url,
    /// 명시적 집계 구간 (없으면 직전 1시간)
    pub time_range: Option<TimeRange>,
}

impl MetricRequest {
    /// 원시 이벤트 검증 및 변환
    ///
    /// 필수 필드 누락/형식 오류는 `CoreError::Configuration`.
    /// 시간 범위 자체의 검증은 집계 구간 결정 단계에서 한다.
    pub fn from_event(event: InvocationEvent) -> Result<Self, CoreError> {
        let arn = event
            .connect_arn
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CoreError::configuration("connect_arn", "필수 파라미터가 없습니다"))?;
        let instance = ConnectInstance::parse(&arn)?;

        let queue_ids: Vec<String> = event
            .queues
            .ok_or_else(|| CoreError::configuration("queues", "필수 파라미터가 없습니다"))?
            .into_iter()
            .map(|q| q.trim().to_string())
            .collect();
        if queue_ids.is_empty() {
            return Err(CoreError::configuration("queues", "큐 목록이 비어 있습니다"));
        }
        if queue_ids.iter().any(|q| q.is_empty()) {
            return Err(CoreError::configuration("queues", "빈 큐 ID가 포함되어 있습니다"));
        }

        let webhook_raw = event
            .webhook
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CoreError::configuration("webhook", "필수 파라미터가 없습니다"))?;
        let webhook = Url::parse(webhook_raw.trim())
            .map_err(|e| CoreError::configuration("webhook", format!("URL 파싱 실패: {e}")))?;
        if !matches!(webhook.scheme(), "http" | "https") {
            return Err(CoreError::configuration(
                "webhook",
                format!("지원하지 않는 스킴: {}", webhook.scheme()),
            ));
        }

        Ok(Self {
            instance,
            queue_ids,
            webhook,
            time_range: event.time_range,
        })
    }

    /// JSON 이벤트 문자열에서 바로 생성
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let event: InvocationEvent = serde_json::from_str(json)
            .map_err(|e| CoreError::configuration("event", e.to_string()))?;
        Self::from_event(event)
    }
}

/// 호출 결과: 트리거에 돌려주는 응답
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    /// 성공 응답
    pub fn success(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }

    /// 실패 응답
    pub fn failure(error: &CoreError) -> Self {
        Self {
            status_code: 500,
            body: format!("에러가 발생했습니다: {error}"),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}
