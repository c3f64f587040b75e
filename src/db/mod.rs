//! Database module for the MySQL production schema
//!
//! The pipeline only talks to the `Database` trait; `MySqlDatabase` is the
//! sqlx-backed implementation wired up by `ChatAgent::initialize`.

pub mod connection;
pub mod mysql;

pub use connection::{init_pool, DbPool};
pub use mysql::MySqlDatabase;

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Database: Send + Sync {
    /// Names of the base tables in the connected schema.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Column listing for `tables`, formatted for an LLM prompt.
    async fn table_info(&self, tables: &[String]) -> Result<String>;

    /// Execute a statement that already passed the safety gate and render
    /// the rows as text.
    async fn run(&self, sql: &str) -> Result<String>;

    async fn ping(&self) -> Result<()>;

    fn dialect(&self) -> &'static str {
        "MySQL"
    }
}
