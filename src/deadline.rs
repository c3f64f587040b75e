//! A single wall-clock budget shared by every suspend point of one question.

use crate::error::{AssistantError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Await `fut` unless the deadline passes first. On expiry the future is
    /// dropped and `AssistantError::Timeout` is returned; work already sent to
    /// a remote service is not cancelled there.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_expired() {
            return Err(AssistantError::Timeout);
        }
        match timeout_at(self.at, fut).await {
            Ok(result) => result,
            Err(_) => Err(AssistantError::Timeout),
        }
    }
}
