//! LLM-backed dialogue manager.
//!
//! Owns the requirements-gathering conversation for one session. The model
//! is prompted to answer with a strict JSON verdict; parsing is defensive
//! because models occasionally wrap the JSON in prose or drop the format
//! entirely.

use super::{ConversationEngine, Evaluation};
use crate::engines::llm::{ChatMessage, LlmClient};
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

const SYSTEM_PROMPT: &str = "You are a shopping assistant that helps users pin down \
     what they want to buy.\n\
     Ask follow-up questions until you know the product and the constraints that \
     matter (size, budget, brand, color).\n\n\
     You MUST respond with JSON only, in this EXACT shape:\n\
     {\n  \
       \"continue_conversation\": true,\n  \
       \"message\": \"your reply to the user\",\n  \
       \"data\": null\n\
     }\n\n\
     Once you have enough detail to search, set \"continue_conversation\" to false \
     and put the extracted shopping intent in \"data\", for example:\n\
     {\"continue_conversation\": false, \"message\": \"Great, searching now.\", \
     \"data\": {\"item\": \"running shoes\", \"size\": 10, \"max_price\": 100}}\n\n\
     Always respond with valid JSON only. No extra text.";

pub struct IntentConversationEngine {
    client: LlmClient,
    history: Vec<ChatMessage>,
}

impl IntentConversationEngine {
    pub fn new(client: LlmClient) -> Self {
        Self {
            client,
            history: vec![ChatMessage::system(SYSTEM_PROMPT)],
        }
    }
}

#[async_trait]
impl ConversationEngine for IntentConversationEngine {
    async fn evaluate(&mut self, text: &str) -> Result<Evaluation> {
        self.history.push(ChatMessage::user(text));

        let raw = self.client.chat(self.history.clone()).await?;
        let verdict = parse_verdict(&raw);

        // The raw model output goes back into the history so the model sees
        // its own verdicts on later turns.
        self.history.push(ChatMessage::assistant(raw));

        Ok(verdict)
    }

    fn reset(&mut self) {
        self.history.truncate(1);
    }
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    continue_conversation: bool,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl From<RawVerdict> for Evaluation {
    fn from(raw: RawVerdict) -> Self {
        Evaluation {
            continue_conversation: raw.continue_conversation,
            reply: raw.message,
            intent: raw.data,
        }
    }
}

/// Parse the model output into a verdict: strict JSON first, then the
/// outermost brace span, and as a last resort treat the whole text as a
/// plain conversational reply.
fn parse_verdict(raw: &str) -> Evaluation {
    if let Ok(verdict) = serde_json::from_str::<RawVerdict>(raw) {
        return verdict.into();
    }

    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            if let Ok(verdict) = serde_json::from_str::<RawVerdict>(&raw[start..=end]) {
                return verdict.into();
            }
        }
    }

    tracing::debug!("[Conversation] Treating non-JSON model output as a plain reply");
    Evaluation {
        continue_conversation: true,
        reply: raw.to_string(),
        intent: None,
    }
}
