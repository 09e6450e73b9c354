//! 알림 메시지 포맷.
//!
//! 합계 + KPI + 구간 → 웹훅 페이로드 변환. I/O 없음.

use callstat_core::config::ReportConfig;
use callstat_core::models::kpi::KpiSet;
use callstat_core::models::metrics::AggregateMetrics;
use callstat_core::models::notification::{Block, NotificationPayload, ReportValues, TextObject};
use callstat_core::models::time_range::TimeRange;
use chrono::{FixedOffset, Offset, Utc};

/// 미정의 KPI 표시
pub const UNDEFINED_MARKER: &str = "N/A";

const HEADER_TITLE: &str = "콜센터 수신 리포트";

/// 리포트 메시지 포맷터
#[derive(Debug, Clone)]
pub struct NotificationFormatter {
    /// 구간 표시용 UTC 오프셋
    offset: FixedOffset,
    /// 메시지 앞에 붙일 멘션 (예: `<!here>`)
    mention: Option<String>,
}

impl NotificationFormatter {
    pub fn new(offset: FixedOffset, mention: Option<String>) -> Self {
        Self {
            offset,
            mention: mention.filter(|m| !m.is_empty()),
        }
    }

    /// 리포트 설정에서 생성
    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.display_offset(), config.mention.clone())
    }

    /// 페이로드 생성
    pub fn format(
        &self,
        agg: &AggregateMetrics,
        kpis: &KpiSet,
        range: &TimeRange,
    ) -> NotificationPayload {
        let window = self.format_range(range);
        let headline = if agg.offered == 0 {
            format!("{window} 인입 호가 0건이었습니다.")
        } else {
            format!("{window} 수신 현황입니다.")
        };

        let threshold_label = if kpis.threshold.is_defaulted() {
            format!("{}초 이내, 기본값", kpis.threshold.seconds())
        } else {
            format!("{}초 이내", kpis.threshold.seconds())
        };

        let answer_rate = percent(kpis.answer_rate);
        let service_level = percent(kpis.service_level);
        let asa = seconds(kpis.asa_secs);

        let mut lines = Vec::with_capacity(6);
        if let Some(mention) = &self.mention {
            lines.push(mention.clone());
        }
        lines.push(headline.clone());
        lines.push(format!(
            "・응답률: {}건/{}건 ({answer_rate})",
            agg.handled, agg.offered
        ));
        lines.push(format!(
            "・서비스 레벨({threshold_label}): {}건/{}건 ({service_level})",
            agg.answered_within_threshold, agg.offered
        ));
        lines.push(format!("・평균 응답 속도(ASA): {asa}"));
        lines.push(format!("・포기 호: {}건", agg.abandoned));
        let text = lines.join("\n");

        let mut summary = headline;
        if let Some(mention) = &self.mention {
            summary = format!("{mention} {summary}");
        }

        let blocks = vec![
            Block::Header {
                text: TextObject::plain(HEADER_TITLE),
            },
            Block::Section {
                text: Some(TextObject::mrkdwn(summary)),
                fields: vec![
                    TextObject::mrkdwn(format!(
                        "*응답률*\n{answer_rate} ({}/{})",
                        agg.handled, agg.offered
                    )),
                    TextObject::mrkdwn(format!(
                        "*서비스 레벨 ({threshold_label})*\n{service_level} ({}/{})",
                        agg.answered_within_threshold, agg.offered
                    )),
                    TextObject::mrkdwn(format!("*ASA*\n{asa}")),
                    TextObject::mrkdwn(format!("*포기 호*\n{}건", agg.abandoned)),
                ],
            },
            Block::Context {
                elements: vec![TextObject::mrkdwn(format!(
                    "집계 구간: {window} · 큐 {}개",
                    agg.queue_count
                ))],
            },
        ];

        NotificationPayload {
            text,
            blocks,
            values: ReportValues {
                range: *range,
                aggregate: *agg,
                kpis: *kpis,
            },
        }
    }

    /// 구간 표시 문자열
    ///
    /// 같은 날이면 `2026-10-19 13:00 ~ 14:00 (UTC)`,
    /// 날짜가 바뀌면 종료 쪽에도 날짜를 붙인다.
    pub fn format_range(&self, range: &TimeRange) -> String {
        let start = range.start.with_timezone(&self.offset);
        let end = range.end.with_timezone(&self.offset);
        let label = offset_label(&self.offset);

        if start.date_naive() == end.date_naive() {
            format!(
                "{} ~ {} ({label})",
                start.format("%Y-%m-%d %H:%M"),
                end.format("%H:%M")
            )
        } else {
            format!(
                "{} ~ {} ({label})",
                start.format("%Y-%m-%d %H:%M"),
                end.format("%Y-%m-%d %H:%M")
            )
        }
    }
}

impl Default for NotificationFormatter {
    fn default() -> Self {
        Self::new(Utc.fix(), None)
    }
}

fn offset_label(offset: &FixedOffset) -> String {
    if offset.local_minus_utc() == 0 {
        "UTC".to_string()
    } else {
        format!("UTC{offset}")
    }
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}%", v * 100.0))
        .unwrap_or_else(|| UNDEFINED_MARKER.to_string())
}

fn seconds(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1}초"))
        .unwrap_or_else(|| UNDEFINED_MARKER.to_string())
}
