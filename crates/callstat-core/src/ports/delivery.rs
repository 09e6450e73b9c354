//! 알림 전송 포트.
//!
//! 구현: `callstat-network` crate (reqwest)

use async_trait::async_trait;
use url::Url;

use crate::error::CoreError;
use crate::models::notification::{DeliveryReceipt, NotificationPayload};

/// 웹훅 알림 전송
#[async_trait]
pub trait NotificationDelivery: Send + Sync {
    /// 페이로드를 엔드포인트로 POST
    ///
    /// 최종 실패는 `CoreError::Delivery`.
    async fn deliver(
        &self,
        endpoint: &Url,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReceipt, CoreError>;
}
