use thiserror::Error;

/// Refusal shown when generated SQL fails the safety gate.
pub const UNSAFE_QUERY_MESSAGE: &str = "⚠️ ระบบสร้างคำสั่ง SQL ที่ไม่ปลอดภัย กรุณาลองถามใหม่";
pub const TIMEOUT_MESSAGE: &str = "⏰ ระบบใช้เวลานานเกินไป กรุณาลองใหม่อีกครั้ง";
pub const EMPTY_QUESTION_MESSAGE: &str = "กรุณาใส่คำถาม";
pub const EMPTY_ANSWER_MESSAGE: &str = "❌ ไม่ได้รับคำตอบจากระบบ";

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Unsafe query rejected")]
    UnsafeQuery,

    #[error("Pipeline timed out")]
    Timeout,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Question is empty")]
    EmptyQuestion,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AssistantError {
    /// Fixed Thai message for the end user. Never carries the underlying
    /// error text, SQL or identifiers.
    pub fn user_message(&self) -> &'static str {
        match self {
            AssistantError::Connectivity(_) | AssistantError::Http(_) => {
                "❌ ไม่สามารถเชื่อมต่อบริการได้ กรุณาตรวจสอบว่า LLM และฐานข้อมูลทำงานอยู่"
            }
            AssistantError::Database(_) => "❌ ไม่สามารถดึงข้อมูลจากฐานข้อมูลได้ กรุณาลองใหม่อีกครั้ง",
            AssistantError::Llm(_) | AssistantError::Generation(_) => {
                "❌ ไม่สามารถสร้างคำตอบได้ในขณะนี้ กรุณาลองใหม่อีกครั้ง"
            }
            AssistantError::UnsafeQuery => UNSAFE_QUERY_MESSAGE,
            AssistantError::Timeout => TIMEOUT_MESSAGE,
            AssistantError::Config(_) => "❌ Agent ยังไม่พร้อมใช้งาน",
            AssistantError::EmptyQuestion => EMPTY_QUESTION_MESSAGE,
            AssistantError::Io(_) | AssistantError::Json(_) => {
                "❌ เกิดข้อผิดพลาดในการประมวลผล กรุณาลองใหม่อีกครั้ง"
            }
        }
    }
}

impl From<sqlx::Error> for AssistantError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => AssistantError::Connectivity(err.to_string()),
            other => AssistantError::Database(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;
