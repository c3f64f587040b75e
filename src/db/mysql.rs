use super::connection::{self, DbPool};
use super::Database;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use itertools::Itertools;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row};
use tracing::debug;

pub struct MySqlDatabase {
    pool: DbPool,
}

impl MySqlDatabase {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Database for MySqlDatabase {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = DATABASE()
              AND (table_name LIKE 'sewing\_%' OR table_name LIKE 'qc\_%')
            ORDER BY table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        // information_schema columns come back as binary strings on some
        // server versions, so skip the strict type check.
        let names = rows
            .iter()
            .map(|row| row.try_get_unchecked::<String, _>(0))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    async fn table_info(&self, tables: &[String]) -> Result<String> {
        if tables.is_empty() {
            return Ok(String::new());
        }

        let placeholders = vec!["?"; tables.len()].join(", ");
        let sql = format!(
            "SELECT table_name, column_name, column_type \
             FROM information_schema.columns \
             WHERE table_schema = DATABASE() AND table_name IN ({}) \
             ORDER BY table_name, ordinal_position",
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for table in tables {
            query = query.bind(table.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            columns.push((
                row.try_get_unchecked::<String, _>(0)?,
                row.try_get_unchecked::<String, _>(1)?,
                row.try_get_unchecked::<String, _>(2)?,
            ));
        }

        let mut info = String::new();
        for (table, cols) in &columns.into_iter().group_by(|(table, _, _)| table.clone()) {
            info.push_str(&format!("\nTable: {}\nColumns:\n", table));
            for (_, name, data_type) in cols {
                info.push_str(&format!("  - {} ({})\n", name, data_type));
            }
        }
        Ok(info)
    }

    async fn run(&self, sql: &str) -> Result<String> {
        debug!("Executing SQL: {}", sql);
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        Ok(render_rows(&rows))
    }

    async fn ping(&self) -> Result<()> {
        connection::ping(&self.pool).await?;
        Ok(())
    }
}

fn render_rows(rows: &[MySqlRow]) -> String {
    let Some(first) = rows.first() else {
        return "[]".to_string();
    };

    let header = first.columns().iter().map(|c| c.name()).join(", ");
    let body = rows
        .iter()
        .map(|row| format!("({})", (0..row.len()).map(|idx| render_value(row, idx)).join(", ")))
        .join("\n");
    format!("columns: ({})\n{}", header, body)
}

fn render_value(row: &MySqlRow, idx: usize) -> String {
    fn show<T: ToString>(value: Option<T>) -> String {
        value.map(|v| v.to_string()).unwrap_or_else(|| "NULL".to_string())
    }

    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return show(v);
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(idx) {
        return show(v);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return show(v);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return show(v);
    }
    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
        return show(v);
    }
    if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(idx) {
        return show(v);
    }
    // DECIMAL (e.g. SUM(qty)) is sent as text by the server.
    if let Ok(v) = row.try_get_unchecked::<Option<String>, _>(idx) {
        return show(v);
    }
    "?".to_string()
}
