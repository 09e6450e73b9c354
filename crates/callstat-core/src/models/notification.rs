//! 알림 페이로드 모델 (Slack incoming webhook 형식).

use serde::{Deserialize, Serialize};

use super::kpi::KpiSet;
use super::metrics::AggregateMetrics;
use super::time_range::TimeRange;

/// Slack 텍스트 객체
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

/// Slack Block Kit 블록 (사용하는 종류만)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: TextObject,
    },
    Section {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<TextObject>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fields: Vec<TextObject>,
    },
    Context {
        elements: Vec<TextObject>,
    },
}

/// 알림 본문에 실린 수치 (직렬화 대상 아님)
#[derive(Debug, Clone, PartialEq)]
pub struct ReportValues {
    pub range: TimeRange,
    pub aggregate: AggregateMetrics,
    pub kpis: KpiSet,
}

/// 전송 직전의 알림 메시지
///
/// 웹훅에는 `text`와 `blocks`만 JSON으로 나간다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    /// 사람이 읽는 요약 텍스트 (블록 미지원 클라이언트용 fallback 겸용)
    pub text: String,
    /// 구조화 블록
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
    /// 렌더링에 쓴 수치
    #[serde(skip)]
    pub values: ReportValues,
}

/// 웹훅 전송 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// 응답 HTTP 상태 코드
    pub status: u16,
    /// 성공까지 걸린 시도 횟수
    pub attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::kpi::ServiceLevelThreshold;
    use chrono::{TimeZone, Utc};

    #[test]
    fn payload_wire_format_omits_values() {
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap();
        let payload = NotificationPayload {
            text: "요약".to_string(),
            blocks: vec![
                Block::Header {
                    text: TextObject::plain("제목"),
                },
                Block::Section {
                    text: None,
                    fields: vec![TextObject::mrkdwn("*응답률*\n86.7%")],
                },
            ],
            values: ReportValues {
                range: TimeRange::new(start, start + chrono::Duration::hours(1)).unwrap(),
                aggregate: AggregateMetrics::default(),
                kpis: KpiSet {
                    answer_rate: None,
                    service_level: None,
                    asa_secs: None,
                    threshold: ServiceLevelThreshold::default(),
                },
            },
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "text": "요약",
                "blocks": [
                    {"type": "header", "text": {"type": "plain_text", "text": "제목"}},
                    {"type": "section", "fields": [{"type": "mrkdwn", "text": "*응답률*\n86.7%"}]}
                ]
            })
        );
    }
}
