//! KPI 모델.
//!
//! 분모가 0인 KPI는 `None`으로 표현한다 (0% 또는 NaN과 구분).

use serde::{Deserialize, Serialize};

/// 서비스 레벨 임계값 (초)
///
/// 경계 포함: 대기 시간이 임계값과 같으면 "임계값 이내"로 센다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLevelThreshold {
    seconds: u32,
    /// 설정값이 없거나 잘못되어 기본값을 쓴 경우 true
    defaulted: bool,
}

impl ServiceLevelThreshold {
    /// 기본 임계값 (초)
    pub const DEFAULT_SECS: u32 = 20;

    /// 명시적 임계값. 0은 허용하지 않는다.
    pub fn new(seconds: u32) -> Option<Self> {
        (seconds > 0).then_some(Self {
            seconds,
            defaulted: false,
        })
    }

    /// 설정 원문 해석. 없거나 양의 정수가 아니면 기본값 (fail closed).
    pub fn from_setting(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<u32>().ok())
            .and_then(Self::new)
            .unwrap_or_default()
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn is_defaulted(&self) -> bool {
        self.defaulted
    }

    /// 분석 API 임계값 비교 연산자 (경계 포함)
    pub fn api_comparison(&self) -> &'static str {
        "LTE"
    }
}

impl Default for ServiceLevelThreshold {
    fn default() -> Self {
        Self {
            seconds: Self::DEFAULT_SECS,
            defaulted: true,
        }
    }
}

/// 파생 KPI 세트
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    /// 응답률 handled / offered
    pub answer_rate: Option<f64>,
    /// 서비스 레벨 answered_within_threshold / offered
    pub service_level: Option<f64>,
    /// 평균 응답 속도 (초) total_answer_wait / handled
    pub asa_secs: Option<f64>,
    /// 계산에 쓴 임계값
    pub threshold: ServiceLevelThreshold,
}

impl KpiSet {
    /// 세 KPI가 모두 정의되지 않았는지
    pub fn is_undefined(&self) -> bool {
        self.answer_rate.is_none() && self.service_level.is_none() && self.asa_secs.is_none()
    }
}
