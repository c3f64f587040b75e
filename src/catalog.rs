//! Table Catalog
//!
//! The set of tables the assistant may query. Loaded once from schema
//! introspection and frozen; when the database cannot be reached a static
//! list is used instead so the assistant stays available.

use crate::db::Database;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Only tables carrying one of these prefixes are ever exposed.
pub const ALLOWED_PREFIXES: [&str; 2] = ["sewing_", "qc_"];

/// Placeholder for catalog tables that have no entry in `table_descriptions`.
pub const MISSING_DESCRIPTION: &str = "ไม่มีคำอธิบาย";

const DEFAULT_ALLOWED_TABLES: [&str; 18] = [
    "sewing_3rd",
    "sewing_fb",
    "sewing_fc",
    "sewing_man_act",
    "sewing_man_plan",
    "sewing_productivity_plan",
    "sewing_rb",
    "sewing_rc",
    "sewing_sub",
    "sewing_target",
    "qc_3rd",
    "qc_fb",
    "qc_fc",
    "qc_issue",
    "qc_ng",
    "qc_rb",
    "qc_rc",
    "qc_sub",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    Live,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCatalog {
    tables: Vec<String>,
    source: CatalogSource,
}

pub fn is_allowed_table(name: &str) -> bool {
    ALLOWED_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

impl TableCatalog {
    /// Introspect the schema. Never fails: connectivity errors and empty
    /// schemas both yield the static fallback catalog.
    pub async fn discover(db: &dyn Database) -> Self {
        match db.list_tables().await {
            Ok(names) => {
                let catalog = Self::from_names(names);
                if catalog.is_empty() {
                    warn!("No sewing_/qc_ tables found, using default table list");
                    return Self::fallback();
                }
                info!("Discovered {} allowed tables", catalog.len());
                catalog
            }
            Err(e) => {
                warn!("Table discovery failed, using default table list: {}", e);
                Self::fallback()
            }
        }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tables: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|name| is_allowed_table(name))
            .collect();
        tables.sort();
        tables.dedup();
        Self {
            tables,
            source: CatalogSource::Live,
        }
    }

    pub fn fallback() -> Self {
        let mut catalog = Self::from_names(DEFAULT_ALLOWED_TABLES);
        catalog.source = CatalogSource::Fallback;
        catalog
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.binary_search_by(|t| t.as_str().cmp(table)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    pub fn is_fallback(&self) -> bool {
        self.source == CatalogSource::Fallback
    }

    /// Descriptions for exactly the catalog's tables, in catalog order.
    pub fn describe(&self) -> Vec<(String, String)> {
        let descriptions = table_descriptions();
        self.tables
            .iter()
            .map(|table| {
                let description = descriptions
                    .get(table.as_str())
                    .copied()
                    .unwrap_or(MISSING_DESCRIPTION);
                (table.clone(), description.to_string())
            })
            .collect()
    }
}

/// Static human-readable descriptions. May list tables the live schema no
/// longer has (e.g. `sewing_lot`); intersect through `TableCatalog::describe`.
pub fn table_descriptions() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("sewing_man_act", "ข้อมูลพนักงานจริง (actual manpower) - จำนวนพนักงานที่ทำงานจริง"),
        ("sewing_man_plan", "วางแผนพนักงาน (planned manpower) - แผนการใช้พนักงาน"),
        ("sewing_productivity_plan", "กำหนด productivity - เป้าหมายประสิทธิภาพการผลิต"),
        ("sewing_target", "เป้าหมายการผลิต - เป้าหมายปริมาณการผลิต"),
        ("sewing_lot", "ข้อมูล lot การผลิต - การจัดกลุ่มงานผลิต"),
        ("sewing_3rd", "ข้อมูลงานเย็บ third party - งานจ้างเหมาภายนอก"),
        ("sewing_fb", "ข้อมูลงานเย็บ FB - งานแผนก FB"),
        ("sewing_fc", "ข้อมูลงานเย็บ FC - งานแผนก FC"),
        ("sewing_rb", "ข้อมูลงานเย็บ RB - งานแผนก RB"),
        ("sewing_rc", "ข้อมูลงานเย็บ RC - งานแผนก RC"),
        ("sewing_sub", "ข้อมูลงานเย็บ subcontract - งานจ้างเหมาช่วง"),
        ("qc_ng", "เก็บข้อมูลงาน NG - บันทึกสินค้าไม่ผ่านมาตรฐาน"),
        ("qc_issue", "เก็บชื่อลักษณะงาน NG - ประเภทและลักษณะของปัญหา"),
        ("qc_3rd", "ข้อมูล QC third party - ควบคุมคุณภาพงานจ้างเหมาภายนอก"),
        ("qc_fb", "ข้อมูล QC FB - ควบคุมคุณภาพแผนก FB"),
        ("qc_fc", "ข้อมูล QC FC - ควบคุมคุณภาพแผนก FC"),
        ("qc_rb", "ข้อมูล QC RB - ควบคุมคุณภาพแผนก RB"),
        ("qc_rc", "ข้อมูล QC RC - ควบคุมคุณภาพแผนก RC"),
        ("qc_sub", "ข้อมูล QC subcontract - ควบคุมคุณภาพงานจ้างเหมาช่วง"),
    ])
}
