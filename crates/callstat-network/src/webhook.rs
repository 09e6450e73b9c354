//! 웹훅 알림 전송 클라이언트.
//!
//! `NotificationDelivery` 포트 구현. JSON POST + 재시도.
//! 5xx와 네트워크 에러만 재시도하고, 4xx(429 포함)는 즉시 실패로 처리한다.

use async_trait::async_trait;
use callstat_core::config::AppConfig;
use callstat_core::error::CoreError;
use callstat_core::models::notification::{DeliveryReceipt, NotificationPayload};
use callstat_core::ports::delivery::NotificationDelivery;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::retry::RetryPolicy;

/// 에러 메시지에 남길 응답 본문 최대 길이
const MAX_BODY_IN_ERROR: usize = 512;

/// 웹훅 클라이언트
pub struct WebhookNotifier {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl WebhookNotifier {
    /// 새 웹훅 클라이언트 생성
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self { client, retry })
    }

    /// 설정에서 생성 (타임아웃 + 전송 재시도 정책)
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        Self::new(config.request_timeout(), RetryPolicy::for_delivery(config))
    }

    /// 1회 POST
    async fn post_once(&self, endpoint: &Url, payload: &NotificationPayload) -> Result<u16, CoreError> {
        let resp = self
            .client
            .post(endpoint.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("웹훅 요청 실패: {e}")))?;

        check_response(resp).await
    }
}

/// 응답 상태 코드 확인
///
/// 2xx 외에는 `HttpStatus`로 매핑한다. 재시도 여부는 상태 코드로 판별된다.
async fn check_response(resp: reqwest::Response) -> Result<u16, CoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(status.as_u16());
    }

    let mut body = resp.text().await.unwrap_or_else(|e| {
        tracing::warn!("응답 본문 읽기 실패: {e}");
        String::new()
    });
    if body.len() > MAX_BODY_IN_ERROR {
        let cut = (0..=MAX_BODY_IN_ERROR)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        body.truncate(cut);
    }

    Err(CoreError::HttpStatus {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl NotificationDelivery for WebhookNotifier {
    async fn deliver(
        &self,
        endpoint: &Url,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReceipt, CoreError> {
        debug!(
            host = endpoint.host_str().unwrap_or_default(),
            blocks = payload.blocks.len(),
            "웹훅 전송 요청"
        );

        match self
            .retry
            .run("웹훅 전송", move |_| self.post_once(endpoint, payload))
            .await
        {
            Ok((status, attempts)) => {
                info!(status, attempts, "웹훅 전송 성공");
                Ok(DeliveryReceipt { status, attempts })
            }
            Err(failure) => Err(CoreError::Delivery {
                status: failure.error.http_status(),
                attempts: failure.attempts,
                message: failure.error.to_string(),
            }),
        }
    }
}
