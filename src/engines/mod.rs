//! Collaborator engine interfaces.
//!
//! The orchestrator only ever talks to the three capability traits below;
//! the LLM- and search-backed implementations live in the submodules and
//! are swappable for in-memory doubles in tests. Each session gets its own
//! engine instances so dialogue state is never shared across sessions.

pub mod conversation;
pub mod llm;
pub mod search;
pub mod vision;

use crate::config::Settings;
use crate::core::Error;
use crate::session::SessionConfig;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use conversation::IntentConversationEngine;
pub use llm::{ChatMessage, LlmClient};
pub use search::TavilySearchEngine;
pub use vision::VisionInterpreter;

/// Turns an image (plus the user's caption as a hint) into a textual
/// shopping request.
#[async_trait]
pub trait ImageInterpreter: Send + Sync {
    async fn interpret(&self, image: &[u8], hint: &str) -> Result<String>;
}

/// Verdict produced by the conversation engine for one turn.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub continue_conversation: bool,
    pub reply: String,
    /// Extracted shopping intent; present iff `continue_conversation` is false.
    pub intent: Option<Value>,
}

/// Stateful dialogue manager. Owns the requirements-gathering state for one
/// session and decides when enough is known to hand off to product search.
#[async_trait]
pub trait ConversationEngine: Send {
    async fn evaluate(&mut self, text: &str) -> Result<Evaluation>;

    /// Return the dialogue to its initial state.
    fn reset(&mut self);
}

/// Runs a product search over the extracted intent and renders the result
/// payload for the client.
#[async_trait]
pub trait ProductSearchEngine: Send + Sync {
    async fn search(&self, intent: &Value) -> Result<String>;
}

/// The per-session collaborator bundle.
pub struct EngineSet {
    pub interpreter: Box<dyn ImageInterpreter>,
    pub conversation: Box<dyn ConversationEngine>,
    pub search: Box<dyn ProductSearchEngine>,
}

/// Builds an engine bundle from session credentials. Injected into the
/// registry so tests can substitute in-memory engines.
pub trait EngineFactory: Send + Sync {
    fn build(&self, config: &SessionConfig) -> Result<EngineSet, Error>;
}

/// Factory for the production engines: vision interpreter, LLM-backed
/// conversation engine, and Tavily-backed product search.
pub struct LiveEngineFactory {
    settings: Settings,
}

impl LiveEngineFactory {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl EngineFactory for LiveEngineFactory {
    fn build(&self, config: &SessionConfig) -> Result<EngineSet, Error> {
        if !config.llm_mode.eq_ignore_ascii_case("openai") {
            return Err(Error::Configuration(format!(
                "unsupported llm_mode: {}",
                config.llm_mode
            )));
        }
        if !config.web_search_mode.eq_ignore_ascii_case("tavily") {
            return Err(Error::Configuration(format!(
                "unsupported web_search_mode: {}",
                config.web_search_mode
            )));
        }

        let client = LlmClient::new(&config.api_key_llm, self.settings.llm.clone());

        Ok(EngineSet {
            interpreter: Box::new(VisionInterpreter::new(client.clone())),
            conversation: Box::new(IntentConversationEngine::new(client)),
            search: Box::new(TavilySearchEngine::new(
                &config.api_key_search_tool,
                &config.api_key_firecrawl,
                self.settings.search.clone(),
            )),
        })
    }
}
