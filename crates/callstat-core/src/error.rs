//! callstat 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 이 타입을 그대로 반환한다.
//! `Network`/`RateLimit`/`ServiceUnavailable`/`Auth`/`HttpStatus`는 재시도 루프 내부에서만
//! 쓰이는 일시 에러이고, 재시도 소진 후에는 `UpstreamApi` 또는 `Delivery`로 감싸서 올라간다.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 요청 필드 누락 또는 형식 오류
    #[error("설정 에러 ({field}): {message}")]
    Configuration {
        /// 문제가 된 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 명시적 시간 범위의 end가 start 이하
    #[error("잘못된 시간 범위: start={start}, end={end}")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// 플랫폼에 존재하지 않는 큐
    #[error("큐 미발견: {queue_id}")]
    UnknownQueue { queue_id: String },

    /// 분석 API 호출 실패 (재시도 소진)
    #[error("큐 {queue_id} 메트릭 조회 실패 ({attempts}회 시도): {cause}")]
    UpstreamApi {
        /// 실패한 큐 식별자
        queue_id: String,
        /// 시도 횟수
        attempts: u32,
        /// 마지막 원인
        #[source]
        cause: Box<CoreError>,
    },

    /// 웹훅 전송 실패 (재시도 소진 또는 4xx)
    #[error("알림 전송 실패 ({attempts}회 시도, status={status:?}): {message}")]
    Delivery {
        /// 마지막 HTTP 상태 코드 (네트워크 에러면 None)
        status: Option<u16>,
        /// 시도 횟수
        attempts: u32,
        /// 실패 사유
        message: String,
    },

    /// 인증/권한 실패
    #[error("인증 에러: {0}")]
    Auth(String),

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// Rate Limit 초과
    #[error("요청 한도 초과: {0}")]
    RateLimit(String),

    /// 서비스 일시 불가
    #[error("서비스 일시 불가: {0}")]
    ServiceUnavailable(String),

    /// 2xx가 아닌 HTTP 응답
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 필드 단위 설정 에러 생성 헬퍼
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 재시도로 회복될 수 있는 일시 에러인지 판별
    pub fn is_transient(&self) -> bool {
        match self {
            CoreError::Network(_)
            | CoreError::RateLimit(_)
            | CoreError::ServiceUnavailable(_)
            | CoreError::Auth(_) => true,
            CoreError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// 마지막 HTTP 상태 코드 (있으면)
    pub fn http_status(&self) -> Option<u16> {
        match self {
            CoreError::HttpStatus { status, .. } => Some(*status),
            CoreError::Delivery { status, .. } => *status,
            _ => None,
        }
    }
}
