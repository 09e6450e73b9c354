//! # callstat-report
//!
//! 리포트 파이프라인.
//! 집계 구간 결정 → 큐 메트릭 수집 → 합산 → KPI 계산 → 메시지 포맷 → 전송 순서로
//! 각 단계를 엄격히 순차 실행한다. 수집/전송 외 단계는 I/O 없는 순수 함수다.

pub mod aggregator;
pub mod formatter;
pub mod kpi;
pub mod pipeline;
pub mod time_range;
