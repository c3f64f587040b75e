//! Chart suggestion
//!
//! The model is asked for a chart JSON after the answer is final. Anything
//! malformed degrades to "no chart"; it never fails the answer.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

/// Question words that make a chart worth asking for.
pub const CHART_KEYWORDS: &[&str] = &[
    "กราฟ",
    "chart",
    "แผนภูมิ",
    "เปรียบเทียบ",
    "แยกตาม",
    "สรุป",
    "top",
    "อันดับ",
    "มากที่สุด",
    "น้อยที่สุด",
    "แสดง",
    "แนวโน้ม",
    "ย้อนหลัง",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
    pub data: Vec<ChartPoint>,
}

pub fn wants_chart(question: &str) -> bool {
    let lower = question.to_lowercase();
    CHART_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn json_object_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{[\s\S]*\}").expect("valid chart JSON pattern"))
}

fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"```(?:json)?\s*").expect("valid fence pattern"))
}

/// Parse a model completion into a chart. `None` for an explicit `null`,
/// missing or malformed JSON, unknown chart types, or empty data.
pub fn parse_chart_config(raw: &str) -> Option<ChartConfig> {
    let text = fence_pattern().replace_all(raw, "");
    let text = text.trim();
    if text.eq_ignore_ascii_case("null") {
        return None;
    }

    let object = json_object_pattern().find(text)?;
    match serde_json::from_str::<ChartConfig>(object.as_str()) {
        Ok(config) if !config.data.is_empty() => Some(config),
        Ok(_) => None,
        Err(e) => {
            warn!("Could not parse chart config: {}", e);
            None
        }
    }
}
