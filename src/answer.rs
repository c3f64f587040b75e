//! Answer Post-processor
//!
//! Best-effort redaction of implementation details (table names, the status
//! flag column, "calculated from ..." boilerplate) from a model-written
//! summary. Sentences are dropped whole, so a legitimate sentence that
//! happens to mention a blacklisted token is lost too.

/// Everything from the first of these markers onward is discarded. Matched
/// case-sensitively, so prose mentioning "mysql: ..." is not cut.
pub const DEFAULT_TRUNCATE_MARKERS: &[&str] = &[
    "SQL:",
    "```",
    "โดยคำนวณจาก",
    "จากข้อมูลในตาราง",
    "calculated from",
];

/// Sentences containing any of these (case-insensitive) are dropped.
pub const DEFAULT_BLACKLIST: &[&str] = &[
    "status",
    "sewing_",
    "qc_",
    "จากตาราง",
    "ใช้ตาราง",
    "ในตาราง",
    "ตาราง sewing",
    "ตาราง qc",
];

const SENTENCE_DELIMITERS: [char; 4] = ['.', '!', '?', '\n'];

#[derive(Debug, Clone)]
pub struct AnswerCleaner {
    truncate_markers: Vec<String>,
    blacklist: Vec<String>,
}

impl Default for AnswerCleaner {
    fn default() -> Self {
        Self::new(DEFAULT_TRUNCATE_MARKERS, DEFAULT_BLACKLIST)
    }
}

impl AnswerCleaner {
    pub fn new<M, B>(truncate_markers: M, blacklist: B) -> Self
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        Self {
            truncate_markers: truncate_markers
                .into_iter()
                .map(|m| m.as_ref().to_string())
                .collect(),
            blacklist: blacklist
                .into_iter()
                .map(|b| b.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn clean(&self, raw: &str) -> String {
        let truncated = self.truncate(raw.trim());
        truncated
            .split_inclusive(SENTENCE_DELIMITERS)
            .filter(|sentence| !self.is_blacklisted(sentence))
            .collect::<String>()
            .trim()
            .to_string()
    }

    fn truncate<'a>(&self, text: &'a str) -> &'a str {
        let cut = self
            .truncate_markers
            .iter()
            .filter_map(|marker| text.find(marker.as_str()))
            .min();
        match cut {
            Some(idx) => &text[..idx],
            None => text,
        }
    }

    fn is_blacklisted(&self, sentence: &str) -> bool {
        let lower = sentence.to_lowercase();
        self.blacklist.iter().any(|token| lower.contains(token.as_str()))
    }
}

/// Clean with the default blacklist.
pub fn clean_answer(raw: &str) -> String {
    AnswerCleaner::default().clean(raw)
}
