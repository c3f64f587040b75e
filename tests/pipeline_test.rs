use async_trait::async_trait;
use automotive_chat::answer::AnswerCleaner;
use automotive_chat::agent::{AgentHandle, ChatAgent, QuestionKind, ResponseType};
use automotive_chat::catalog::{CatalogSource, TableCatalog};
use automotive_chat::config::{AgentSettings, LlmProvider};
use automotive_chat::db::Database;
use automotive_chat::error::{
    AssistantError, Result, EMPTY_ANSWER_MESSAGE, EMPTY_QUESTION_MESSAGE, TIMEOUT_MESSAGE,
    UNSAFE_QUERY_MESSAGE,
};
use automotive_chat::llm::LanguageModel;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Model that answers each kind of prompt with a fixed reply.
#[derive(Default)]
struct ScriptedModel {
    classify: String,
    general: String,
    sql: String,
    summary: String,
    chart: String,
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn database(sql: &str, summary: &str) -> Self {
        Self {
            classify: "database".to_string(),
            sql: sql.to_string(),
            summary: summary.to_string(),
            chart: "null".to_string(),
            ..Default::default()
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn prompt_containing(&self, marker: &str) -> Option<String> {
        self.prompts().into_iter().find(|p| p.contains(marker))
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str, _temperature: f32) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(AssistantError::Connectivity("connection refused".to_string()));
        }
        let reply = if prompt.contains("JSON Config:") {
            &self.chart
        } else if prompt.contains("ช่วยจำแนกประเภทคำถาม") {
            &self.classify
        } else if prompt.contains("ผู้ช่วยที่เป็นมิตร") {
            &self.general
        } else if prompt.contains("Dialect:") {
            &self.sql
        } else if prompt.contains("SQL Result:") {
            &self.summary
        } else {
            return Err(AssistantError::Llm("unexpected prompt".to_string()));
        };
        Ok(reply.clone())
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Ollama
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

struct FakeDatabase {
    tables: Mutex<Vec<String>>,
    result: std::result::Result<String, String>,
    run_delay: Duration,
    online: AtomicBool,
    executed: Mutex<Vec<String>>,
}

impl FakeDatabase {
    fn with_result(result: &str) -> Self {
        Self {
            tables: Mutex::new(
                ["qc_ng", "qc_issue", "qc_fb", "sewing_fb", "sewing_fc", "sewing_rb"]
                    .iter()
                    .map(|t| t.to_string())
                    .collect(),
            ),
            result: Ok(result.to_string()),
            run_delay: Duration::ZERO,
            online: AtomicBool::new(true),
            executed: Mutex::new(Vec::new()),
        }
    }

    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Database for FakeDatabase {
    async fn list_tables(&self) -> Result<Vec<String>> {
        if !self.is_online() {
            return Err(AssistantError::Connectivity("db down".to_string()));
        }
        Ok(self.tables.lock().unwrap().clone())
    }

    async fn table_info(&self, tables: &[String]) -> Result<String> {
        Ok(tables
            .iter()
            .map(|t| format!("\nTable: {}\nColumns:\n  - qty (int)\n", t))
            .collect())
    }

    async fn run(&self, sql: &str) -> Result<String> {
        self.executed.lock().unwrap().push(sql.to_string());
        if !self.run_delay.is_zero() {
            tokio::time::sleep(self.run_delay).await;
        }
        self.result.clone().map_err(AssistantError::Database)
    }

    async fn ping(&self) -> Result<()> {
        if self.is_online() {
            Ok(())
        } else {
            Err(AssistantError::Connectivity("db down".to_string()))
        }
    }
}

async fn agent_with(
    model: Arc<ScriptedModel>,
    db: Arc<FakeDatabase>,
    settings: AgentSettings,
) -> ChatAgent {
    let catalog = TableCatalog::discover(db.as_ref()).await;
    ChatAgent::new(model, db, catalog, settings)
}

#[tokio::test]
async fn test_general_question_skips_database() {
    let model = Arc::new(ScriptedModel {
        classify: "general".to_string(),
        general: "  วันนี้วันพุธครับ  ".to_string(),
        ..Default::default()
    });
    let db = Arc::new(FakeDatabase::with_result("[]"));
    let agent = agent_with(model.clone(), db.clone(), AgentSettings::default()).await;

    let response = agent.ask("วันนี้วันอะไร").await;

    assert_eq!(response.response_type, ResponseType::Answer);
    assert_eq!(response.answer, "วันนี้วันพุธครับ");
    assert!(response.sql.is_none());
    assert!(db.executed().is_empty());
    assert!(model.prompt_containing("Dialect:").is_none());
}

#[tokio::test]
async fn test_database_question_is_answered_and_cleaned() {
    let model = Arc::new(ScriptedModel::database(
        "```sql\nSELECT SUM(qty) FROM qc_ng WHERE DATE(created_at) = CURDATE();\n```",
        "วันนี้มีของเสีย 12 ชิ้น. ข้อมูลจากตาราง qc_ng.",
    ));
    let db = Arc::new(FakeDatabase::with_result("columns: (total)\n(12)"));
    let agent = agent_with(model.clone(), db.clone(), AgentSettings::default()).await;

    let response = agent.ask("วันนี้มีของเสียกี่ชิ้น").await;

    assert_eq!(response.response_type, ResponseType::QueryResult);
    assert_eq!(response.answer, "วันนี้มีของเสีย 12 ชิ้น.");
    assert_eq!(response.tables, vec!["qc_ng"]);
    let executed = "SELECT SUM(qty) FROM qc_ng WHERE DATE(created_at) = CURDATE()";
    assert_eq!(response.sql.as_deref(), Some(executed));
    assert_eq!(db.executed(), vec![executed]);

    let sql_prompt = model.prompt_containing("Dialect:").unwrap();
    assert!(sql_prompt.contains("Table: qc_ng"));
    assert!(!sql_prompt.contains("Table: sewing_fb"));
    assert!(sql_prompt.contains("Dialect: MySQL, Limit: 5"));

    let summary_prompt = model.prompt_containing("SQL Result:").unwrap();
    assert!(summary_prompt.contains("(12)"));
}

#[tokio::test]
async fn test_unsafe_sql_is_refused_and_never_run() {
    let model = Arc::new(ScriptedModel::database("DELETE FROM qc_ng", "unused"));
    let db = Arc::new(FakeDatabase::with_result("[]"));
    let agent = agent_with(model.clone(), db.clone(), AgentSettings::default()).await;

    let response = agent.ask("ลบของเสียทั้งหมด").await;

    assert_eq!(response.response_type, ResponseType::Refused);
    assert_eq!(response.answer, UNSAFE_QUERY_MESSAGE);
    assert!(response.sql.is_none());
    assert!(db.executed().is_empty());
    assert!(model.prompt_containing("SQL Result:").is_none());

    let json = serde_json::to_string(&response).unwrap();
    assert!(!json.contains("DELETE"));
}

#[tokio::test(start_paused = true)]
async fn test_slow_database_times_out() {
    let model = Arc::new(ScriptedModel::database("SELECT 1", "unused"));
    let mut db = FakeDatabase::with_result("[(1)]");
    db.run_delay = Duration::from_secs(300);
    let db = Arc::new(db);
    let settings = AgentSettings {
        timeout: Duration::from_secs(2),
        ..AgentSettings::default()
    };
    let agent = agent_with(model.clone(), db.clone(), settings).await;

    let response = agent.ask("วันนี้ผลิตได้กี่ชิ้น").await;

    assert_eq!(response.response_type, ResponseType::Timeout);
    assert_eq!(response.answer, TIMEOUT_MESSAGE);
    assert!(model.prompt_containing("SQL Result:").is_none());
}

#[tokio::test]
async fn test_database_error_hides_details() {
    let model = Arc::new(ScriptedModel::database("SELECT foo FROM qc_ng", "unused"));
    let mut db = FakeDatabase::with_result("");
    db.result = Err("Unknown column 'foo' in 'field list'".to_string());
    let agent = agent_with(model, Arc::new(db), AgentSettings::default()).await;

    let response = agent.ask("ของเสียเมื่อวาน").await;

    assert_eq!(response.response_type, ResponseType::Error);
    assert!(!response.answer.contains("foo"));
    assert!(!response.answer.contains("qc_ng"));
}

#[tokio::test]
async fn test_unreachable_model_yields_error_response() {
    let model = Arc::new(ScriptedModel {
        fail: true,
        ..Default::default()
    });
    let db = Arc::new(FakeDatabase::with_result("[]"));
    let agent = agent_with(model.clone(), db.clone(), AgentSettings::default()).await;

    assert_eq!(agent.classify_question("สวัสดี").await, QuestionKind::Database);

    let response = agent.ask("วันนี้ผลิตได้กี่ชิ้น").await;
    assert_eq!(response.response_type, ResponseType::Error);
    assert_eq!(
        response.answer,
        AssistantError::Connectivity(String::new()).user_message()
    );
    assert!(db.executed().is_empty());
}

#[tokio::test]
async fn test_unclear_classification_routes_to_database() {
    let model = Arc::new(ScriptedModel {
        classify: "ไม่แน่ใจ".to_string(),
        ..ScriptedModel::database("SELECT 1", "ผลิตได้ 10 ชิ้น")
    });
    let db = Arc::new(FakeDatabase::with_result("[(10)]"));
    let agent = agent_with(model, db, AgentSettings::default()).await;

    let response = agent.ask("ยอดรวม").await;
    assert_eq!(response.response_type, ResponseType::QueryResult);
    assert_eq!(response.answer, "ผลิตได้ 10 ชิ้น");
}

#[tokio::test]
async fn test_empty_question_is_rejected() {
    let model = Arc::new(ScriptedModel::default());
    let db = Arc::new(FakeDatabase::with_result("[]"));
    let agent = agent_with(model.clone(), db, AgentSettings::default()).await;

    let response = agent.ask("   \n ").await;

    assert_eq!(response.response_type, ResponseType::Error);
    assert_eq!(response.answer, EMPTY_QUESTION_MESSAGE);
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_fully_redacted_summary_gets_placeholder() {
    let model = Arc::new(ScriptedModel::database("SELECT 1", "ใช้ตาราง qc_ng. status = 10."));
    let db = Arc::new(FakeDatabase::with_result("[(1)]"));
    let agent = agent_with(model, db, AgentSettings::default()).await;

    let response = agent.ask("ของเสียวันนี้").await;
    assert_eq!(response.response_type, ResponseType::QueryResult);
    assert_eq!(response.answer, EMPTY_ANSWER_MESSAGE);
}

#[tokio::test]
async fn test_result_preview_is_truncated() {
    let model = Arc::new(ScriptedModel::database("SELECT 1", "ok"));
    let db = Arc::new(FakeDatabase::with_result(&"x".repeat(50)));
    let settings = AgentSettings {
        result_preview_chars: 10,
        ..AgentSettings::default()
    };
    let agent = agent_with(model.clone(), db, settings).await;

    agent.ask("วันนี้ผลิตได้กี่ชิ้น").await;

    let summary_prompt = model.prompt_containing("SQL Result:").unwrap();
    assert!(summary_prompt.contains(&format!("SQL Result: {}...\n", "x".repeat(10))));
    assert!(!summary_prompt.contains(&"x".repeat(11)));
}

#[tokio::test]
async fn test_department_comparison_routes_to_sewing_tables() {
    let model = Arc::new(ScriptedModel::database(
        "SELECT 'FB', SUM(qty) FROM sewing_fb UNION ALL SELECT 'FC', SUM(qty) FROM sewing_fc",
        "FB ผลิตได้ 120 ชิ้น FC ผลิตได้ 98 ชิ้น",
    ));
    let db = Arc::new(FakeDatabase::with_result("[('FB', 120), ('FC', 98)]"));
    let agent = agent_with(model, db, AgentSettings::default()).await;

    let response = agent.ask("เปรียบเทียบแผนก FB กับ FC").await;

    let fb = response.tables.iter().position(|t| t == "sewing_fb").unwrap();
    let fc = response.tables.iter().position(|t| t == "sewing_fc").unwrap();
    assert!(fb < fc);
    assert!(response
        .tables
        .iter()
        .all(|t| agent.catalog().contains(t)));
}

#[tokio::test]
async fn test_ask_with_chart() {
    let model = Arc::new(ScriptedModel {
        chart: r#"```json
{"type": "bar", "title": "ของเสียตามแผนก", "data": [{"label": "R/C", "value": 914}, {"label": "F/C", "value": 589}]}
```"#
            .to_string(),
        ..ScriptedModel::database("SELECT process, SUM(qty) FROM qc_ng GROUP BY process", "R/C 914 ชิ้น")
    });
    let db = Arc::new(FakeDatabase::with_result("[('R/C', 914), ('F/C', 589)]"));
    let agent = agent_with(model.clone(), db, AgentSettings::default()).await;

    let response = agent.ask_with_chart("แสดงกราฟของเสียแยกตามแผนก").await;
    let chart = response.chart.expect("chart");
    assert_eq!(chart.title, "ของเสียตามแผนก");
    assert_eq!(chart.data.len(), 2);

    let plain = agent.ask_with_chart("ของเสียเมื่อวาน").await;
    assert!(plain.chart.is_none());
    assert_eq!(
        model
            .prompts()
            .iter()
            .filter(|p| p.contains("JSON Config:"))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_no_chart_for_refusals() {
    let model = Arc::new(ScriptedModel::database("DROP TABLE qc_ng", "unused"));
    let db = Arc::new(FakeDatabase::with_result("[]"));
    let agent = agent_with(model.clone(), db, AgentSettings::default()).await;

    let response = agent.ask_with_chart("แสดงกราฟของเสีย").await;
    assert_eq!(response.response_type, ResponseType::Refused);
    assert!(response.chart.is_none());
    assert!(model.prompt_containing("JSON Config:").is_none());
}

#[tokio::test]
async fn test_status_reports_fallback_catalog() {
    let model = Arc::new(ScriptedModel::default());
    let db = FakeDatabase::with_result("[]");
    db.set_online(false);
    let agent = agent_with(model, Arc::new(db), AgentSettings::default()).await;

    let status = agent.status().await;
    assert_eq!(status.catalog_source, CatalogSource::Fallback);
    assert_eq!(status.table_count, 18);
    assert!(status.agent_ready);
    assert!(!status.database_ready);
    assert_eq!(status.llm_model, "scripted");
}

#[tokio::test]
async fn test_reload_swaps_whole_agent() {
    let model = Arc::new(ScriptedModel::default());
    let db = Arc::new(FakeDatabase::with_result("[]"));
    let handle = AgentHandle::new(agent_with(model, db.clone(), AgentSettings::default()).await);

    let before = handle.current().await;
    assert_eq!(before.catalog().len(), 6);

    db.tables.lock().unwrap().push("qc_rc".to_string());
    let reloaded = handle.reload().await.unwrap();

    assert_eq!(reloaded.catalog().len(), 7);
    assert_eq!(handle.current().await.catalog().len(), 7);
    assert_eq!(before.catalog().len(), 6);
    assert!(!Arc::ptr_eq(&before, &handle.current().await));
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_agent() {
    let model = Arc::new(ScriptedModel::default());
    let db = Arc::new(FakeDatabase::with_result("[]"));
    let handle = AgentHandle::new(agent_with(model, db.clone(), AgentSettings::default()).await);
    let before = handle.current().await;

    db.set_online(false);
    let err = handle.reload().await.err().expect("reload should fail");
    assert!(matches!(err, AssistantError::Connectivity(_)));

    let after = handle.current().await;
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.catalog().source(), CatalogSource::Live);
    assert_eq!(after.catalog().len(), 6);

    db.set_online(true);
    handle.reload().await.unwrap();
    assert!(!Arc::ptr_eq(&before, &handle.current().await));
}

#[tokio::test]
async fn test_custom_cleaner_blacklist() {
    let model = Arc::new(ScriptedModel::database(
        "SELECT SUM(qty) FROM qc_ng",
        "มีของเสีย 7 ชิ้น. ข้อมูลภายในไลน์ A. ตรวจสอบแล้ว",
    ));
    let db = Arc::new(FakeDatabase::with_result("[(7)]"));
    let agent = agent_with(model, db, AgentSettings::default())
        .await
        .with_cleaner(AnswerCleaner::new(Vec::<String>::new(), ["ภายใน"]));

    let response = agent.ask("ของเสียวันนี้").await;
    assert_eq!(response.response_type, ResponseType::QueryResult);
    assert_eq!(response.answer, "มีของเสีย 7 ชิ้น. ตรวจสอบแล้ว");
}
