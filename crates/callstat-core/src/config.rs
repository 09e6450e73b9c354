//! 실행 설정 구조체.
//!
//! 서비스 레벨 임계값, 수집/전송 재시도 정책, 리포트 표시 설정을 정의한다.
//! 호출 시작 시 환경변수에서 한 번 읽고 이후에는 값으로 전달한다.
//! 잘못된 값은 에러 대신 기본값으로 대체한다 (리포트 조정 파라미터이므로).

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::models::kpi::ServiceLevelThreshold;

/// 서비스 레벨 임계값 환경변수
pub const ENV_SERVICE_LEVEL_THRESHOLD: &str = "SERVICE_LEVEL_THRESHOLD";
const ENV_FETCH_MAX_ATTEMPTS: &str = "CALLSTAT_FETCH_MAX_ATTEMPTS";
const ENV_FETCH_CONCURRENCY: &str = "CALLSTAT_FETCH_CONCURRENCY";
const ENV_DELIVERY_MAX_ATTEMPTS: &str = "CALLSTAT_DELIVERY_MAX_ATTEMPTS";
const ENV_REQUEST_TIMEOUT_MS: &str = "CALLSTAT_REQUEST_TIMEOUT_MS";
const ENV_REPORT_UTC_OFFSET_MINUTES: &str = "CALLSTAT_REPORT_UTC_OFFSET_MINUTES";
const ENV_MENTION: &str = "CALLSTAT_MENTION";
const ENV_AWS_REGION: &str = "CALLSTAT_AWS_REGION";

/// 최상위 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 서비스 레벨 설정
    pub service_level: ServiceLevelConfig,
    /// 메트릭 수집 설정
    pub fetch: FetchConfig,
    /// 알림 전송 설정
    pub delivery: DeliveryConfig,
    /// 리포트 표시 설정
    #[serde(default)]
    pub report: ReportConfig,
}

/// 서비스 레벨 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceLevelConfig {
    /// 임계값 (기본 20초)
    #[serde(default)]
    pub threshold: ServiceLevelThreshold,
}

/// 메트릭 수집 설정: 큐별 재시도 + 동시 요청 수
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// 큐당 최대 시도 횟수
    #[serde(default = "default_fetch_max_attempts")]
    pub max_attempts: u32,
    /// 첫 재시도 대기 (밀리초), 이후 2배씩 증가
    #[serde(default = "default_fetch_base_delay_ms")]
    pub base_delay_ms: u64,
    /// 재시도 대기 상한 (밀리초)
    #[serde(default = "default_fetch_max_delay_ms")]
    pub max_delay_ms: u64,
    /// 동시에 조회할 큐 수
    #[serde(default = "default_fetch_concurrency")]
    pub max_concurrency: usize,
    /// AWS 리전 오버라이드 (없으면 ARN의 리전)
    #[serde(default)]
    pub aws_region: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_fetch_max_attempts(),
            base_delay_ms: default_fetch_base_delay_ms(),
            max_delay_ms: default_fetch_max_delay_ms(),
            max_concurrency: default_fetch_concurrency(),
            aws_region: None,
        }
    }
}

/// 알림 전송 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// 최대 시도 횟수
    #[serde(default = "default_delivery_max_attempts")]
    pub max_attempts: u32,
    /// 첫 재시도 대기 (밀리초), 이후 2배씩 증가
    #[serde(default = "default_delivery_base_delay_ms")]
    pub base_delay_ms: u64,
    /// 재시도 대기 상한 (밀리초)
    #[serde(default = "default_delivery_max_delay_ms")]
    pub max_delay_ms: u64,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_delivery_max_attempts(),
            base_delay_ms: default_delivery_base_delay_ms(),
            max_delay_ms: default_delivery_max_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// 리포트 표시 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// 집계 구간 표시용 UTC 오프셋 (분)
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// 메시지 앞에 붙일 멘션 (None이면 생략)
    #[serde(default = "default_mention")]
    pub mention: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            mention: default_mention(),
        }
    }
}

impl ReportConfig {
    /// 표시용 오프셋. 범위를 벗어나면 UTC.
    pub fn display_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

impl AppConfig {
    /// 기본 설정
    pub fn default_config() -> Self {
        Self {
            service_level: ServiceLevelConfig::default(),
            fetch: FetchConfig::default(),
            delivery: DeliveryConfig::default(),
            report: ReportConfig::default(),
        }
    }

    /// 프로세스 환경변수에서 로드
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 키 조회 함수로 로드 (테스트에서 환경변수 대신 사용)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default_config();

        let raw_threshold = lookup(ENV_SERVICE_LEVEL_THRESHOLD);
        let threshold = ServiceLevelThreshold::from_setting(raw_threshold.as_deref());
        if threshold.is_defaulted() {
            if let Some(raw) = raw_threshold {
                warn!(
                    "{ENV_SERVICE_LEVEL_THRESHOLD}={raw:?} 는 양의 정수가 아님, 기본값 {}초 사용",
                    threshold.seconds()
                );
            }
        }
        config.service_level.threshold = threshold;

        config.fetch.max_attempts =
            positive_or(&lookup, ENV_FETCH_MAX_ATTEMPTS, config.fetch.max_attempts);
        config.fetch.max_concurrency =
            positive_or(&lookup, ENV_FETCH_CONCURRENCY, config.fetch.max_concurrency);
        config.fetch.aws_region = lookup(ENV_AWS_REGION).filter(|r| !r.trim().is_empty());

        config.delivery.max_attempts = positive_or(
            &lookup,
            ENV_DELIVERY_MAX_ATTEMPTS,
            config.delivery.max_attempts,
        );
        config.delivery.request_timeout_ms = positive_or(
            &lookup,
            ENV_REQUEST_TIMEOUT_MS,
            config.delivery.request_timeout_ms,
        );

        config.report.utc_offset_minutes = lookup(ENV_REPORT_UTC_OFFSET_MINUTES)
            .and_then(|raw| match raw.trim().parse::<i32>() {
                Ok(minutes) if (-(24 * 60 - 1)..24 * 60).contains(&minutes) => Some(minutes),
                _ => {
                    warn!("{ENV_REPORT_UTC_OFFSET_MINUTES}={raw:?} 무시, UTC 사용");
                    None
                }
            })
            .unwrap_or(0);
        if let Some(mention) = lookup(ENV_MENTION) {
            config.report.mention = Some(mention).filter(|m| !m.trim().is_empty());
        }

        config
    }

    /// 수집 재시도 첫 대기 시간
    pub fn fetch_base_delay(&self) -> Duration {
        Duration::from_millis(self.fetch.base_delay_ms)
    }

    /// 수집 재시도 대기 상한
    pub fn fetch_max_delay(&self) -> Duration {
        Duration::from_millis(self.fetch.max_delay_ms)
    }

    /// 전송 재시도 첫 대기 시간
    pub fn delivery_base_delay(&self) -> Duration {
        Duration::from_millis(self.delivery.base_delay_ms)
    }

    /// 전송 재시도 대기 상한
    pub fn delivery_max_delay(&self) -> Duration {
        Duration::from_millis(self.delivery.max_delay_ms)
    }

    /// 웹훅 요청 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery.request_timeout_ms)
    }
}

/// 양수로 파싱되면 그 값, 아니면 기본값 (경고 로그)
fn positive_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default + Copy,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => value,
        _ => {
            warn!("{key}={raw:?} 는 양수가 아님, 기본값 사용");
            default
        }
    }
}

fn default_fetch_max_attempts() -> u32 {
    3
}
fn default_fetch_base_delay_ms() -> u64 {
    200
}
fn default_fetch_max_delay_ms() -> u64 {
    5_000
}
fn default_fetch_concurrency() -> usize {
    4
}
fn default_delivery_max_attempts() -> u32 {
    3
}
fn default_delivery_base_delay_ms() -> u64 {
    1_000
}
fn default_delivery_max_delay_ms() -> u64 {
    30_000
}
fn default_request_timeout_ms() -> u64 {
    10_000
}
fn default_mention() -> Option<String> {
    Some("<!here>".to_string())
}
