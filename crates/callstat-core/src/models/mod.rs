//! callstat 도메인 모델.
//!
//! 호출 요청, 큐 메트릭 샘플, KPI, 알림 페이로드 등 파이프라인 단계 간에
//! 주고받는 데이터 구조체를 정의한다.

pub mod invocation;
pub mod kpi;
pub mod metrics;
pub mod notification;
pub mod time_range;
