//! SQL Safety Gate
//!
//! A syntactic allow-list: only text that starts with `select`, `with` or
//! `explain` (after removing a Markdown code fence) may run. This is not a
//! parser. Statements smuggled after a `;`, DML nested in a CTE or DDL behind
//! a comment are not detected; the database account is expected to be
//! read-only as well.

const FENCE: &str = "```";
const ALLOWED_PREFIXES: [&str; 3] = ["select", "with", "explain"];

/// Prose the model tends to append after the SQL, each introduced by a blank
/// line.
const TRAILING_PROSE_MARKERS: [&str; 3] = ["\n\nคำอธิบาย", "\n\nคำถาม", "\n\nหรือ"];

/// Remove a surrounding Markdown fence: the opening line when it starts with
/// a fence, and the last line when it is exactly a fence.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with(FENCE) {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.split('\n').collect();
    if lines.first().is_some_and(|line| line.starts_with(FENCE)) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|line| line.trim() == FENCE) {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

/// Whether `candidate` is a read-only statement the pipeline may execute.
/// Accepts `&str` or `Option<&str>`; `None` and blank text are unsafe.
pub fn is_safe_query<'a>(candidate: impl Into<Option<&'a str>>) -> bool {
    let Some(candidate) = candidate.into() else {
        return false;
    };
    let cleaned = strip_code_fence(candidate).to_lowercase();
    !cleaned.is_empty() && ALLOWED_PREFIXES.iter().any(|prefix| cleaned.starts_with(prefix))
}

/// The exact text handed to the database: fence removed, trailing
/// semicolons dropped.
pub fn prepare_for_execution(sql: &str) -> String {
    strip_code_fence(sql).trim_end_matches(';').trim().to_string()
}

/// Pull the SQL out of a raw model completion that may be wrapped in
/// commentary.
pub fn extract_sql(raw: &str) -> String {
    let mut sql = raw.trim().to_string();

    if !starts_like_sql(&sql) {
        let from_first_statement: Vec<&str> = sql
            .split('\n')
            .skip_while(|line| !starts_like_sql(line.trim()))
            .collect();
        if !from_first_statement.is_empty() {
            sql = from_first_statement.join("\n").trim().to_string();
        }
    }

    if let Some(marker) = TRAILING_PROSE_MARKERS.iter().find(|m| sql.contains(*m)) {
        if let Some((head, _)) = sql.split_once(marker) {
            sql = head.trim().to_string();
        }
    }

    // Several fenced alternatives: keep the first block only.
    let parts: Vec<&str> = sql.split(FENCE).collect();
    if parts.len() >= 3 {
        sql = format!("{}{}{}{}", parts[0], FENCE, parts[1], FENCE).trim().to_string();
    }

    sql
}

fn starts_like_sql(text: &str) -> bool {
    let lower = text.to_lowercase();
    text.starts_with(FENCE) || ALLOWED_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_read_only_statements() {
        assert!(is_safe_query("SELECT 1"));
        assert!(is_safe_query("with x AS (SELECT 1) SELECT * FROM x"));
        assert!(is_safe_query("EXPLAIN SELECT 1"));
        assert!(is_safe_query("  select * from qc_ng  "));
    }

    #[test]
    fn test_rejects_everything_else() {
        assert!(!is_safe_query("DELETE FROM t"));
        assert!(!is_safe_query("DROP TABLE qc_ng"));
        assert!(!is_safe_query(""));
        assert!(!is_safe_query("   "));
        assert!(!is_safe_query(None));
        assert!(!is_safe_query("```sql\n```"));
    }

    #[test]
    fn test_fenced_statements() {
        assert!(is_safe_query("```sql\nSELECT 1\n```"));
        assert!(is_safe_query("```\nWITH x AS (SELECT 1) SELECT * FROM x\n```"));
        assert!(is_safe_query("```sql\nEXPLAIN SELECT 1"));
        assert!(!is_safe_query("```sql\nUPDATE qc_ng SET qty = 0\n```"));
    }

    #[test]
    fn test_fence_stripping_preserves_verdict() {
        for sql in [
            "SELECT 1",
            "WITH x AS (SELECT 1) SELECT * FROM x",
            "EXPLAIN SELECT 1",
            "DELETE FROM t",
            "INSERT INTO qc_ng VALUES (1)",
        ] {
            let fenced = format!("```sql\n{}\n```", sql);
            assert_eq!(is_safe_query(fenced.as_str()), is_safe_query(sql));
            assert_eq!(strip_code_fence(&fenced), sql);
        }
    }

    #[test]
    fn test_prepare_for_execution() {
        assert_eq!(prepare_for_execution("```sql\nSELECT * FROM qc_ng\n```"), "SELECT * FROM qc_ng");
        assert_eq!(prepare_for_execution("SELECT 1;"), "SELECT 1");
        assert_eq!(prepare_for_execution("  SELECT 1 ;;  "), "SELECT 1");
    }

    #[test]
    fn test_extract_sql_skips_leading_prose() {
        let raw = "นี่คือคำสั่ง SQL:\nSELECT SUM(qty) FROM sewing_fb\nWHERE status = 10";
        assert_eq!(extract_sql(raw), "SELECT SUM(qty) FROM sewing_fb\nWHERE status = 10");
    }

    #[test]
    fn test_extract_sql_cuts_trailing_explanation() {
        let raw = "SELECT COUNT(*) FROM qc_ng\n\nคำอธิบาย: นับจำนวนของเสีย";
        assert_eq!(extract_sql(raw), "SELECT COUNT(*) FROM qc_ng");
    }

    #[test]
    fn test_extract_sql_keeps_first_fenced_block() {
        let raw = "```sql\nSELECT 1\n```\nแบบอื่น\n```sql\nSELECT 2\n```";
        let sql = extract_sql(raw);
        assert_eq!(sql, "```sql\nSELECT 1\n```");
        assert_eq!(prepare_for_execution(&sql), "SELECT 1");
    }

    #[test]
    fn test_extract_sql_leaves_plain_text_alone() {
        assert_eq!(extract_sql("ไม่สามารถตอบได้"), "ไม่สามารถตอบได้");
        assert!(!is_safe_query(extract_sql("ไม่สามารถตอบได้").as_str()));
    }
}
