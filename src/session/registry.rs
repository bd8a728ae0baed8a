//! Session registry: the process-wide map from session id to session.
//!
//! The map is the only cross-session shared state. Insert/lookup/remove go
//! through an RwLock so readers never observe a half-constructed session;
//! everything inside a session is guarded by that session's own mutex.

use super::{Session, SessionConfig, SessionSummary};
use crate::core::Error;
use crate::engines::EngineFactory;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct SessionRegistry {
    factory: Arc<dyn EngineFactory>,
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Validate credentials, build the engine bundle, and store it under a
    /// freshly generated id. Ids are never reused or user-chosen.
    pub async fn create(&self, config: &SessionConfig) -> Result<String, Error> {
        config.validate()?;
        let engines = self.factory.build(config)?;

        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Session::new(id.clone(), engines));

        self.sessions.write().await.insert(id.clone(), session);
        tracing::info!("[Registry] Created session '{}'", id);
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<Arc<Session>, Error> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Empty the message log and reset the dialogue state. Engine
    /// instances are kept, so the configured credentials survive.
    pub async fn clear(&self, id: &str) -> Result<(), Error> {
        let session = self.get(id).await?;
        let mut state = session.state().await;
        state.log.clear();
        state.engines.conversation.reset();
        tracing::info!("[Registry] Cleared session '{}'", id);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.sessions
            .write()
            .await
            .remove(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        tracing::info!("[Registry] Deleted session '{}'", id);
        Ok(())
    }

    /// Snapshot of all live sessions. Ordering is unspecified.
    pub async fn list(&self) -> Vec<SessionSummary> {
        let sessions: Vec<Arc<Session>> =
            self.sessions.read().await.values().cloned().collect();

        let summaries = sessions.iter().map(|session| async move {
            let message_count = session.state().await.log.len();
            SessionSummary {
                session_id: session.id().to_string(),
                created_at: session.created_at(),
                message_count,
            }
        });

        futures::future::join_all(summaries).await
    }
}
