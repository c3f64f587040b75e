//! Chat Agent - Thai question answering over the production database
//!
//! A question is classified first. General questions are answered by the
//! model directly. Database questions go through table selection, SQL
//! generation, the safety gate, execution, summarisation and answer
//! cleaning, all under one `Deadline`. Every failure becomes a response with
//! a fixed Thai message; `ask` never returns an error.

use crate::answer::AnswerCleaner;
use crate::catalog::{CatalogSource, TableCatalog};
use crate::chart::{parse_chart_config, wants_chart, ChartConfig};
use crate::config::{AgentSettings, AppConfig, LlmProvider};
use crate::dates::DateContext;
use crate::db::{init_pool, Database, MySqlDatabase};
use crate::deadline::Deadline;
use crate::error::{AssistantError, Result, EMPTY_ANSWER_MESSAGE, UNSAFE_QUERY_MESSAGE};
use crate::llm::{LanguageModel, LlmClient};
use crate::prompts::{
    build_chart_prompt, build_classify_prompt, build_general_prompt, build_sql_prompt,
    build_summary_prompt, CLASSIFY_DATABASE, CLASSIFY_GENERAL, CLASSIFY_TEMPERATURE,
    GENERAL_TEMPERATURE,
};
use crate::safety::{extract_sql, is_safe_query, prepare_for_execution};
use crate::selector::select_relevant_tables;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Database,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// General question answered without the database
    Answer,
    /// Answer summarised from an executed query
    QueryResult,
    /// Generated SQL failed the safety gate
    Refused,
    Timeout,
    Error,
}

/// Response to a single question
#[derive(Debug, Clone, Serialize)]
pub struct AssistantResponse {
    pub response_type: ResponseType,

    /// Text shown to the user
    pub answer: String,

    /// Tables the question was routed to
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<String>,

    /// Executed statement. Never set for refusals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartConfig>,
}

impl AssistantResponse {
    fn general(answer: String) -> Self {
        Self {
            response_type: ResponseType::Answer,
            answer,
            tables: Vec::new(),
            sql: None,
            chart: None,
        }
    }

    fn answered(answer: String, tables: Vec<String>, sql: String) -> Self {
        Self {
            response_type: ResponseType::QueryResult,
            answer,
            tables,
            sql: Some(sql),
            chart: None,
        }
    }

    fn refused(tables: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Refused,
            answer: UNSAFE_QUERY_MESSAGE.to_string(),
            tables,
            sql: None,
            chart: None,
        }
    }

    fn failed(error: &AssistantError) -> Self {
        let response_type = match error {
            AssistantError::Timeout => ResponseType::Timeout,
            _ => ResponseType::Error,
        };
        Self {
            response_type,
            answer: error.user_message().to_string(),
            tables: Vec::new(),
            sql: None,
            chart: None,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(
            self.response_type,
            ResponseType::Answer | ResponseType::QueryResult
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub llm_provider: LlmProvider,
    pub llm_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_host: Option<String>,
    pub temperature: f32,
    pub table_count: usize,
    pub catalog_source: CatalogSource,
    pub agent_ready: bool,
    pub database_ready: bool,
}

pub struct ChatAgent {
    llm: Arc<dyn LanguageModel>,
    db: Arc<dyn Database>,
    catalog: TableCatalog,
    settings: AgentSettings,
    cleaner: AnswerCleaner,
    temperature: f32,
    config: Option<AppConfig>,
}

impl ChatAgent {
    /// Wire the HTTP model client and the MySQL pool from `config` and load
    /// the table catalog.
    pub async fn initialize(config: AppConfig) -> Result<Self> {
        info!(
            provider = ?config.llm.provider,
            model = %config.llm.model(),
            "Initializing chat agent"
        );

        let llm = LlmClient::new(&config.llm)?;
        let pool = init_pool(&config.database)?;
        let db: Arc<dyn Database> = Arc::new(MySqlDatabase::new(pool));
        let catalog = TableCatalog::discover(db.as_ref()).await;

        let mut agent = Self::new(Arc::new(llm), db, catalog, config.agent.clone())
            .with_temperature(config.llm.temperature());
        agent.config = Some(config);

        info!(
            tables = agent.catalog.len(),
            source = ?agent.catalog.source(),
            "Chat agent ready"
        );
        Ok(agent)
    }

    pub fn new(
        llm: Arc<dyn LanguageModel>,
        db: Arc<dyn Database>,
        catalog: TableCatalog,
        settings: AgentSettings,
    ) -> Self {
        Self {
            llm,
            db,
            catalog,
            settings,
            cleaner: AnswerCleaner::default(),
            temperature: 0.0,
            config: None,
        }
    }

    /// Temperature for SQL generation, summaries and charts.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_cleaner(mut self, cleaner: AnswerCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn catalog(&self) -> &TableCatalog {
        &self.catalog
    }

    /// Anything the model says other than "general" is routed to the
    /// database, including model failures.
    pub async fn classify_question(&self, question: &str) -> QuestionKind {
        self.classify(&DateContext::now(), question).await
    }

    async fn classify(&self, date: &DateContext, question: &str) -> QuestionKind {
        let prompt = build_classify_prompt(date, question);
        match self.llm.complete(&prompt, CLASSIFY_TEMPERATURE).await {
            Ok(reply) => parse_classification(&reply),
            Err(e) => {
                warn!("Could not classify question, assuming database: {}", e);
                QuestionKind::Database
            }
        }
    }

    pub async fn ask(&self, question: &str) -> AssistantResponse {
        let span = info_span!("ask", request_id = %Uuid::new_v4());
        self.ask_inner(question).instrument(span).await
    }

    async fn ask_inner(&self, question: &str) -> AssistantResponse {
        let question = question.trim();
        if question.is_empty() {
            return AssistantResponse::failed(&AssistantError::EmptyQuestion);
        }
        info!(question = %question, "Received question");

        let deadline = Deadline::after(self.settings.timeout);
        let date = DateContext::now();

        let kind = match deadline.run(async { Ok(self.classify(&date, question).await) }).await {
            Ok(kind) => kind,
            Err(e) => return self.finish(Err(e)),
        };
        info!(kind = ?kind, "Classified question");

        let outcome = match kind {
            QuestionKind::General => self
                .answer_general(&deadline, &date, question)
                .await
                .map(AssistantResponse::general),
            QuestionKind::Database => self.answer_from_database(&deadline, &date, question).await,
        };
        self.finish(outcome)
    }

    fn finish(&self, outcome: Result<AssistantResponse>) -> AssistantResponse {
        match outcome {
            Ok(response) => {
                info!(response_type = ?response.response_type, "Answered");
                response
            }
            Err(e) => {
                warn!("Question failed: {}", e);
                AssistantResponse::failed(&e)
            }
        }
    }

    async fn answer_general(
        &self,
        deadline: &Deadline,
        date: &DateContext,
        question: &str,
    ) -> Result<String> {
        let prompt = build_general_prompt(date, question);
        let reply = deadline
            .run(self.llm.complete(&prompt, GENERAL_TEMPERATURE))
            .await?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Ok(EMPTY_ANSWER_MESSAGE.to_string());
        }
        Ok(reply.to_string())
    }

    async fn answer_from_database(
        &self,
        deadline: &Deadline,
        date: &DateContext,
        question: &str,
    ) -> Result<AssistantResponse> {
        let tables = select_relevant_tables(question, &self.catalog);
        info!(tables = %tables.join(", "), "Selected tables");

        let table_info = deadline.run(self.db.table_info(&tables)).await?;
        let prompt = build_sql_prompt(
            date,
            &table_info,
            self.db.dialect(),
            self.settings.top_k,
            question,
        );
        debug!(prompt = %prompt, "SQL prompt");

        let raw = deadline.run(self.llm.complete(&prompt, self.temperature)).await?;
        let candidate = extract_sql(&raw);
        if candidate.is_empty() {
            return Err(AssistantError::Generation("Model returned no SQL".to_string()));
        }
        debug!(sql = %candidate, "Generated SQL");

        if !is_safe_query(candidate.as_str()) {
            warn!("Generated SQL rejected by safety gate");
            return Ok(AssistantResponse::refused(tables));
        }
        let sql = prepare_for_execution(&candidate);

        let result = deadline.run(self.db.run(&sql)).await?;
        let preview = truncate_preview(&result, self.settings.result_preview_chars);
        info!(result_chars = result.chars().count(), "Executed SQL");

        let summary_prompt = build_summary_prompt(question, &preview);
        let summary = deadline
            .run(self.llm.complete(&summary_prompt, self.temperature))
            .await?;

        let answer = self.cleaner.clean(&summary);
        let answer = if answer.is_empty() {
            EMPTY_ANSWER_MESSAGE.to_string()
        } else {
            answer
        };
        Ok(AssistantResponse::answered(answer, tables, sql))
    }

    /// `ask`, plus a chart when the question asks for one and an answer was
    /// produced.
    pub async fn ask_with_chart(&self, question: &str) -> AssistantResponse {
        let mut response = self.ask(question).await;
        if response.is_answered() && wants_chart(question) {
            response.chart = self.suggest_chart(question, &response.answer).await;
        }
        response
    }

    pub async fn suggest_chart(&self, question: &str, answer: &str) -> Option<ChartConfig> {
        let deadline = Deadline::after(self.settings.timeout);
        let prompt = build_chart_prompt(question, answer);
        match deadline.run(self.llm.complete(&prompt, self.temperature)).await {
            Ok(raw) => {
                let chart = parse_chart_config(&raw);
                if let Some(chart) = &chart {
                    info!(title = %chart.title, points = chart.data.len(), "Built chart");
                }
                chart
            }
            Err(e) => {
                warn!("Chart suggestion failed: {}", e);
                None
            }
        }
    }

    pub async fn status(&self) -> AgentStatus {
        let database_ready = Deadline::after(PING_TIMEOUT)
            .run(self.db.ping())
            .await
            .is_ok();
        let llm_host = self.config.as_ref().and_then(|c| match c.llm.provider {
            LlmProvider::Ollama => Some(c.llm.ollama_host.clone()),
            LlmProvider::Gemini => None,
        });

        AgentStatus {
            llm_provider: self.llm.provider(),
            llm_model: self.llm.model().to_string(),
            llm_host,
            temperature: self.temperature,
            table_count: self.catalog.len(),
            catalog_source: self.catalog.source(),
            agent_ready: !self.catalog.is_empty(),
            database_ready,
        }
    }

    /// Build a fresh agent. From configuration when this agent was created
    /// by `initialize`, otherwise from the same adapters with a rediscovered
    /// catalog. The latter fails when the database is unreachable rather than
    /// trading a live catalog for the fallback list. `self` is left untouched.
    pub async fn reload(&self) -> Result<ChatAgent> {
        info!("Reloading chat agent");
        match &self.config {
            Some(config) => ChatAgent::initialize(config.clone()).await,
            None => {
                self.db.ping().await?;
                let catalog = TableCatalog::discover(self.db.as_ref()).await;
                Ok(Self {
                    llm: Arc::clone(&self.llm),
                    db: Arc::clone(&self.db),
                    catalog,
                    settings: self.settings.clone(),
                    cleaner: self.cleaner.clone(),
                    temperature: self.temperature,
                    config: None,
                })
            }
        }
    }
}

fn parse_classification(reply: &str) -> QuestionKind {
    let reply = reply.trim().to_lowercase();
    if reply.contains(CLASSIFY_DATABASE) {
        QuestionKind::Database
    } else if reply.contains(CLASSIFY_GENERAL) {
        QuestionKind::General
    } else {
        QuestionKind::Database
    }
}

fn truncate_preview(result: &str, max_chars: usize) -> String {
    if result.chars().count() <= max_chars {
        return result.to_string();
    }
    let mut preview: String = result.chars().take(max_chars).collect();
    preview.push_str("...");
    preview
}

/// Process-owned holder of the current agent. Readers get an `Arc` to the
/// instance that was current when they asked; `reload` swaps only after the
/// replacement is fully built.
pub struct AgentHandle {
    inner: RwLock<Arc<ChatAgent>>,
}

impl AgentHandle {
    pub fn new(agent: ChatAgent) -> Self {
        Self {
            inner: RwLock::new(Arc::new(agent)),
        }
    }

    pub async fn current(&self) -> Arc<ChatAgent> {
        Arc::clone(&*self.inner.read().await)
    }

    /// On failure the previous agent stays in place.
    pub async fn reload(&self) -> Result<Arc<ChatAgent>> {
        let current = self.current().await;
        let fresh = Arc::new(current.reload().await?);
        *self.inner.write().await = Arc::clone(&fresh);
        info!("Chat agent reloaded");
        Ok(fresh)
    }
}
