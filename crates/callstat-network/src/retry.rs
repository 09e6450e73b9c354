//! 지수 백오프 재시도 정책.
//!
//! 분석 API 조회와 웹훅 전송이 같은 정책 타입을 쓴다.
//! `CoreError::is_transient()`가 false인 에러는 즉시 반환한다.

use callstat_core::config::AppConfig;
use callstat_core::error::CoreError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// 재시도 소진 또는 영구 에러: 마지막 에러와 시도 횟수
#[derive(Debug)]
pub struct RetryFailure {
    pub error: CoreError,
    pub attempts: u32,
}

/// 재시도 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// 최소 1회는 시도한다.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// 분석 API 조회용 (기본 3회, 200ms → 최대 5s)
    pub fn for_fetch(config: &AppConfig) -> Self {
        Self::new(
            config.fetch.max_attempts,
            config.fetch_base_delay(),
            config.fetch_max_delay(),
        )
    }

    /// 웹훅 전송용 (기본 3회, 1s → 최대 30s)
    pub fn for_delivery(config: &AppConfig) -> Self {
        Self::new(
            config.delivery.max_attempts,
            config.delivery_base_delay(),
            config.delivery_max_delay(),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// `attempt`번째(1부터) 실패 후 대기 시간
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// 재시도 실행
    ///
    /// 성공 시 `(결과, 시도 횟수)`.
    pub async fn run<F, Fut, T>(&self, label: &str, mut operation: F) -> Result<(T, u32), RetryFailure>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match operation(attempt).await {
                Ok(value) => return Ok((value, attempt)),
                Err(error) => {
                    if !error.is_transient() || attempt >= self.max_attempts {
                        return Err(RetryFailure {
                            error,
                            attempts: attempt,
                        });
                    }

                    let delay = self.delay_after(attempt);
                    warn!(
                        error = %error,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "{label} 실패 (시도 {attempt}/{}), {delay:?} 후 재시도",
                        self.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
