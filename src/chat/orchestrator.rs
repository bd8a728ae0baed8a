//! Per-turn orchestration pipeline.
//!
//! Each turn runs image interpretation (if an image came along), then the
//! conversation engine, then conditionally product search, appending to the
//! session log as stages complete. A failing stage aborts the turn without
//! appending its own message; messages from earlier stages of the same turn
//! stay in the log. Holding the session mutex for the whole turn serializes
//! concurrent turns on one session.

use super::{decode_image_payload, ChatTurnResult};
use crate::core::{Error, Message};
use crate::session::SessionRegistry;
use std::sync::Arc;

pub struct ChatOrchestrator {
    registry: Arc<SessionRegistry>,
}

impl ChatOrchestrator {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub async fn process_turn(
        &self,
        session_id: &str,
        text: &str,
        image_data: Option<&str>,
    ) -> Result<ChatTurnResult, Error> {
        let session = self.registry.get(session_id).await?;

        // Decode before touching the session so a bad payload leaves the
        // log untouched.
        let image = image_data.map(decode_image_payload).transpose()?;

        let mut state = session.state().await;
        let mut text = text.to_string();

        if let Some(bytes) = image {
            // The interpreter folds the caption into its output, so the
            // derived text replaces the original for the rest of the turn.
            text = state.engines.interpreter.interpret(&bytes, &text).await?;
            tracing::debug!("[Orchestrator] Image interpreted for session '{}'", session_id);
        }

        state.log.append(Message::user(text.clone()));

        let verdict = state.engines.conversation.evaluate(&text).await?;
        state.log.append(Message::assistant(verdict.reply.clone()));

        if verdict.continue_conversation {
            tracing::debug!("[Orchestrator] Continuing conversation for '{}'", session_id);
            return Ok(ChatTurnResult::conversation(verdict.reply));
        }

        let intent = verdict.intent.ok_or_else(|| {
            Error::Processing(anyhow::anyhow!(
                "conversation engine handed off without an extracted intent"
            ))
        })?;

        tracing::info!("[Orchestrator] Handing off to product search for '{}'", session_id);
        let rendered = state.engines.search.search(&intent).await?;
        state.log.append(Message::product_results(rendered.clone()));

        Ok(ChatTurnResult::product_search(verdict.reply, rendered))
    }
}
