//! Relevance Selector
//!
//! Maps a question to the smallest useful set of tables so the SQL
//! generation prompt only carries the schema it needs. Matching is plain
//! case-insensitive substring search over fixed keyword lists, so it
//! over-matches: "พนักงาน" contains "งาน" and "แผนก" contains
//! "แผน", and such questions also pull in the production or target groups.

use crate::catalog::TableCatalog;
use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableGroup {
    Ng,
    Production,
    QcOk,
    Manpower,
    Target,
    Lot,
    Master,
}

impl TableGroup {
    /// Groups tried during keyword matching, in this order.
    pub const MATCHABLE: [TableGroup; 6] = [
        TableGroup::Ng,
        TableGroup::Production,
        TableGroup::QcOk,
        TableGroup::Manpower,
        TableGroup::Target,
        TableGroup::Lot,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TableGroup::Ng => "ng",
            TableGroup::Production => "production",
            TableGroup::QcOk => "qc_ok",
            TableGroup::Manpower => "manpower",
            TableGroup::Target => "target",
            TableGroup::Lot => "lot",
            TableGroup::Master => "master",
        }
    }

    pub fn tables(&self) -> &'static [&'static str] {
        match self {
            TableGroup::Ng => &["qc_ng"],
            TableGroup::Production => &[
                "sewing_fb",
                "sewing_fc",
                "sewing_rb",
                "sewing_rc",
                "sewing_3rd",
                "sewing_sub",
            ],
            TableGroup::QcOk => &["qc_fb", "qc_fc", "qc_rb", "qc_rc", "qc_3rd", "qc_sub"],
            TableGroup::Manpower => &["sewing_man_act", "sewing_man_plan"],
            TableGroup::Target => &["sewing_target", "sewing_productivity_plan"],
            TableGroup::Lot => &["sewing_lot"],
            TableGroup::Master => &["qc_issue"],
        }
    }

    /// Keywords that select this group. `Master` is only reachable through
    /// the priority rules.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            TableGroup::Ng => &["ng", " ng ", "ของเสีย", "ของ เสีย", "ปัญหา", "บกพร่อง", "defect"],
            TableGroup::Production => &[
                "ผลิต",
                "เย็บ",
                "ทำ",
                "output",
                "production",
                "งาน",
                "ชิ้น",
                "qty",
                "จำนวน",
                "แผนก",
                "department",
            ],
            TableGroup::QcOk => &["qc ", " qc", "ผ่าน", "ok", "ดี", "qualify"],
            TableGroup::Manpower => &["พนักงาน", "คน", "manpower", "แรงงาน", "จำนวนคน"],
            TableGroup::Target => &["เป้า", "target", "แผน", "plan", "productivity"],
            TableGroup::Lot => &["lot", "ล็อต", "ล็อค", "batch"],
            TableGroup::Master => &[],
        }
    }

    pub fn matches(&self, question_lower: &str) -> bool {
        self.keywords().iter().any(|kw| question_lower.contains(kw))
    }
}

pub const NG_TERMS: &[&str] = &[" ng ", "ng ", " ng", "ของเสีย", "ไม่ผ่าน", "defect", "ปัญหา"];
pub const STATISTIC_TERMS: &[&str] = &[
    "บ่อย",
    "จำนวน",
    "นับ",
    "กี่",
    "count",
    "มาก",
    "น้อย",
    "สถิติ",
    "ประเภทปัญหา",
    "ประเภท ng",
];
pub const ENUMERATE_TERMS: &[&str] = &["มีอะไร", "รายชื่อ", "ชนิด", "types"];
pub const ISSUE_TERMS: &[&str] = &["issue", "ลักษณะ"];
pub const LIST_TABLES_TERMS: &[&str] = &["ตารางอะไร", "ตารางไหน", "table", "มีอะไรบ้าง"];
pub const GOOD_QUALITY_TERMS: &[&str] = &["ok", "งานดี", "ผ่าน", "คุณภาพดี"];

const NG_TABLE: &str = "qc_ng";
const ISSUE_TABLE: &str = "qc_issue";
const LIST_TABLES_LIMIT: usize = 3;
const GOOD_QUALITY_LIMIT: usize = 4;

fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| haystack.contains(term))
}

/// Pick the tables relevant to `question`. Always returns at least one
/// table.
pub fn select_relevant_tables(question: &str, catalog: &TableCatalog) -> Vec<String> {
    let question_lower = question.to_lowercase();

    if let Some(tables) = priority_selection(&question_lower, catalog) {
        return tables;
    }

    let matched: Vec<TableGroup> = TableGroup::MATCHABLE
        .iter()
        .copied()
        .filter(|group| group.matches(&question_lower))
        .collect();
    let matched = if matched.is_empty() {
        vec![TableGroup::Production]
    } else {
        matched
    };
    debug!(
        "Matched table groups: {}",
        matched.iter().map(TableGroup::name).join(", ")
    );

    let candidates: Vec<&'static str> = matched
        .iter()
        .flat_map(|group| group.tables().iter().copied())
        .unique()
        .collect();

    let in_catalog: Vec<&str> = candidates
        .iter()
        .copied()
        .filter(|table| catalog.contains(table))
        .collect();
    let mut selected = if in_catalog.is_empty() {
        candidates
    } else {
        in_catalog
    };

    selected.sort_by_key(|table| priority_rank(table));
    selected.into_iter().map(str::to_string).collect()
}

/// The short-circuit rules evaluated before keyword-group matching.
fn priority_selection(question_lower: &str, catalog: &TableCatalog) -> Option<Vec<String>> {
    if contains_any(question_lower, NG_TERMS) {
        if contains_any(question_lower, STATISTIC_TERMS) {
            debug!("NG + statistics question, selecting qc_ng");
            return Some(vec![NG_TABLE.to_string()]);
        }
        if contains_any(question_lower, ENUMERATE_TERMS) {
            debug!("NG issue-type listing question, selecting qc_issue");
            return Some(vec![ISSUE_TABLE.to_string()]);
        }
        debug!("NG question, selecting qc_ng");
        return Some(vec![NG_TABLE.to_string()]);
    }

    if contains_any(question_lower, ISSUE_TERMS) && catalog.contains(ISSUE_TABLE) {
        return Some(vec![ISSUE_TABLE.to_string()]);
    }

    // Returns an arbitrary slice of the catalog; kept for compatibility.
    if contains_any(question_lower, LIST_TABLES_TERMS) && !catalog.is_empty() {
        return Some(catalog.tables().iter().take(LIST_TABLES_LIMIT).cloned().collect());
    }

    if contains_any(question_lower, GOOD_QUALITY_TERMS) {
        let passed: Vec<String> = catalog
            .tables()
            .iter()
            .filter(|t| t.starts_with("qc_") && *t != NG_TABLE && *t != ISSUE_TABLE)
            .take(GOOD_QUALITY_LIMIT)
            .cloned()
            .collect();
        if !passed.is_empty() {
            return Some(passed);
        }
    }

    None
}

/// Position in the fixed ordering: qc_ng, production tables, qc_ok tables,
/// then everything else.
fn priority_rank(table: &str) -> usize {
    std::iter::once(NG_TABLE)
        .chain(TableGroup::Production.tables().iter().copied())
        .chain(TableGroup::QcOk.tables().iter().copied())
        .position(|t| t == table)
        .unwrap_or(usize::MAX)
}
