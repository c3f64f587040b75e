pub mod agent;
pub mod answer;
pub mod catalog;
pub mod chart;
pub mod config;
pub mod dates;
pub mod db;
pub mod deadline;
pub mod error;
pub mod llm;
pub mod prompts;
pub mod safety;
pub mod selector;

pub use agent::{AgentHandle, AgentStatus, AssistantResponse, ChatAgent, QuestionKind, ResponseType};
pub use catalog::TableCatalog;
pub use config::AppConfig;
pub use error::{AssistantError, Result};
