//! 큐 메트릭 합산.
//!
//! 요청된 모든 큐의 샘플을 하나의 합계로 접는다. 순서 무관, 가산적.

use callstat_core::models::metrics::{AggregateMetrics, QueueSample};
use tracing::debug;

/// 큐 샘플 → 전체 합계
///
/// 빈 입력이면 모든 값이 0인 합계. 같은 큐 ID가 두 번 들어오면 두 번 센다.
pub fn aggregate(samples: &[QueueSample]) -> AggregateMetrics {
    let total: AggregateMetrics = samples.iter().map(|s| &s.sample).sum();
    debug!(
        queues = total.queue_count,
        offered = total.offered,
        handled = total.handled,
        "큐 메트릭 합산 완료"
    );
    total
}
