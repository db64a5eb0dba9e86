//! LLM-backed advisory
//!
//! `LlmAdvisor` turns an oracle snapshot into a chat prompt and returns the
//! model's raw reply. Parsing and validation happen in the oracle, so a
//! chatty or broken reply only ever costs a fallback.

pub mod client;
pub mod context;
pub mod parser;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::oracle::{AdvisoryFunction, OracleSnapshot};

pub use client::{ApiFormat, LlmClient};
pub use context::{PromptContext, ORACLE_SYSTEM_PROMPT};
pub use parser::{extract_json, AdvisoryReply};

/// Advisory function backed by a chat completion API
pub struct LlmAdvisor {
    client: LlmClient,
}

impl LlmAdvisor {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Configure from LLM_API_KEY, LLM_API_URL and LLM_MODEL
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(LlmClient::from_env()?))
    }
}

#[async_trait]
impl AdvisoryFunction for LlmAdvisor {
    async fn advise(&self, snapshot: &OracleSnapshot<'_>) -> Result<String> {
        let prompt = PromptContext::from_snapshot(snapshot).user_prompt()?;
        tracing::debug!("Requesting day {} plan from {}", snapshot.day, self.client.model());
        self.client.complete(ORACLE_SYSTEM_PROMPT, &prompt).await
    }
}
