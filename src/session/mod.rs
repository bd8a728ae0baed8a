//! Per-session state: the collaborator bundle, its message log, and the
//! registry that owns every live session.

mod registry;

pub use registry::SessionRegistry;

use crate::core::{Error, MessageLog};
use crate::engines::EngineSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

fn default_web_search_mode() -> String {
    "Tavily".to_string()
}

fn default_llm_mode() -> String {
    "OpenAI".to_string()
}

/// Credentials and mode selectors supplied at session creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub api_key_llm: String,
    pub api_key_search_tool: String,
    pub api_key_firecrawl: String,
    #[serde(default = "default_web_search_mode")]
    pub web_search_mode: String,
    #[serde(default = "default_llm_mode")]
    pub llm_mode: String,
}

impl SessionConfig {
    /// All three credentials are required; mode selectors are checked by
    /// the engine factory.
    pub fn validate(&self) -> Result<(), Error> {
        let required = [
            ("api_key_llm", &self.api_key_llm),
            ("api_key_search_tool", &self.api_key_search_tool),
            ("api_key_firecrawl", &self.api_key_firecrawl),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Configuration(format!(
                    "missing required credential: {}",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Mutable state of one session. Guarded by the session mutex so
/// concurrent turns on the same session are serialized; the log therefore
/// always reads as a prefix of completed appends.
pub struct SessionState {
    pub engines: EngineSet,
    pub log: MessageLog,
}

/// One user's isolated bundle of engine instances plus message history.
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    state: Mutex<SessionState>,
}

impl Session {
    pub(crate) fn new(id: String, engines: EngineSet) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            state: Mutex::new(SessionState {
                engines,
                log: MessageLog::new(),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Listing entry returned by `SessionRegistry::list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
}
