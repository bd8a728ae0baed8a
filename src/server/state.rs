//! Application state shared across all route handlers.

use std::sync::Arc;

use crate::chat::ChatOrchestrator;
use crate::config::Settings;
use crate::engines::EngineFactory;
use crate::session::SessionRegistry;

/// Shared application state. All fields are `Arc`s so handler tasks clone
/// it cheaply.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: Arc<SessionRegistry>,
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl AppState {
    pub fn new(settings: Settings, factory: Arc<dyn EngineFactory>) -> Self {
        let registry = Arc::new(SessionRegistry::new(factory));
        let orchestrator = Arc::new(ChatOrchestrator::new(Arc::clone(&registry)));
        Self {
            settings: Arc::new(settings),
            registry,
            orchestrator,
        }
    }
}
