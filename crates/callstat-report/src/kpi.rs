//! KPI 계산.
//!
//! 분모가 0인 KPI는 `None`. 세 KPI는 서로 독립적으로 정의된다.
//! 범위를 벗어난 비율(>1)은 보정하지 않고 경고만 남긴다.

use callstat_core::models::kpi::{KpiSet, ServiceLevelThreshold};
use callstat_core::models::metrics::AggregateMetrics;
use tracing::warn;

/// 합계 → KPI 세트
///
/// 임계값 판정은 수집 단계에서 이미 끝났으므로 여기서는 다시 계산하지 않는다.
pub fn compute(agg: &AggregateMetrics, threshold: ServiceLevelThreshold) -> KpiSet {
    let answer_rate = ratio(agg.handled, agg.offered);
    let service_level = ratio(agg.answered_within_threshold, agg.offered);
    let asa_secs = (agg.handled > 0).then(|| agg.total_answer_wait_secs() / agg.handled as f64);

    if let Some(rate) = answer_rate.filter(|r| *r > 1.0) {
        warn!(
            handled = agg.handled,
            offered = agg.offered,
            "응답률이 100%를 초과함: {:.3}",
            rate
        );
    }
    if let Some(level) = service_level.filter(|r| *r > 1.0) {
        warn!(
            answered = agg.answered_within_threshold,
            offered = agg.offered,
            "서비스 레벨이 100%를 초과함: {:.3}",
            level
        );
    }

    KpiSet {
        answer_rate,
        service_level,
        asa_secs,
        threshold,
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(offered: u64, handled: u64, within: u64, wait_ms: u64) -> AggregateMetrics {
        AggregateMetrics {
            queue_count: 1,
            offered,
            handled,
            answered_within_threshold: within,
            total_answer_wait_ms: wait_ms,
            abandoned: 0,
        }
    }

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("KPI가 정의되어야 함");
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn two_queue_scenario() {
        let kpis = compute(&agg(15, 13, 12, 81_000), ServiceLevelThreshold::default());
        approx(kpis.answer_rate, 13.0 / 15.0);
        approx(kpis.service_level, 0.8);
        approx(kpis.asa_secs, 81.0 / 13.0);
        assert_eq!(kpis.threshold.seconds(), 20);
    }

    #[test]
    fn zero_offered_leaves_ratios_undefined() {
        let kpis = compute(&agg(0, 0, 0, 0), ServiceLevelThreshold::default());
        assert!(kpis.is_undefined());
    }

    #[test]
    fn kpis_are_independent() {
        // 인입은 있으나 연결 0건: 비율은 정의, ASA는 미정의
        let kpis = compute(&agg(4, 0, 0, 0), ServiceLevelThreshold::default());
        approx(kpis.answer_rate, 0.0);
        approx(kpis.service_level, 0.0);
        assert!(kpis.asa_secs.is_none());

        // 구간 경계로 인입 0, 연결 2건
        let kpis = compute(&agg(0, 2, 0, 9_000), ServiceLevelThreshold::default());
        assert!(kpis.answer_rate.is_none());
        assert!(kpis.service_level.is_none());
        approx(kpis.asa_secs, 4.5);
    }

    #[test]
    fn inclusive_boundary_full_service_level() {
        let threshold = ServiceLevelThreshold::new(20).unwrap();
        // 대기 20초 통화 1건: 수집 단계에서 LTE로 집계됨
        let kpis = compute(&agg(1, 1, 1, 20_000), threshold);
        approx(kpis.service_level, 1.0);
        approx(kpis.asa_secs, 20.0);
    }

    #[test]
    fn out_of_range_ratio_not_clamped() {
        let kpis = compute(&agg(2, 3, 3, 3_000), ServiceLevelThreshold::default());
        approx(kpis.answer_rate, 1.5);
        approx(kpis.service_level, 1.5);
    }
}
