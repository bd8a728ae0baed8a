//! Vision-based image interpreter.
//!
//! Sends the image to a vision-capable chat model as a base64 data URI and
//! returns the model's textual shopping request. The caption travels along
//! as a hint; the model is told to fold it into its output, which is why
//! the orchestrator can discard the original text afterwards.

use super::ImageInterpreter;
use crate::engines::llm::{ChatMessage, LlmClient};
use anyhow::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::json;

const SYSTEM_PROMPT: &str = "Identify the product shown in the image and restate it as a \
     single shopping request. Fold the user's caption into the request when one is given. \
     Reply with the request text only.";

pub struct VisionInterpreter {
    client: LlmClient,
}

impl VisionInterpreter {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageInterpreter for VisionInterpreter {
    async fn interpret(&self, image: &[u8], hint: &str) -> Result<String> {
        let mime = image::guess_format(image)
            .map(|format| format.to_mime_type())
            .unwrap_or("image/png");
        let data_uri = format!("data:{};base64,{}", mime, STANDARD.encode(image));

        let caption = if hint.trim().is_empty() {
            "What product is shown?"
        } else {
            hint
        };

        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user_parts(json!([
                {"type": "text", "text": caption},
                {"type": "image_url", "image_url": {"url": data_uri}},
            ])),
        ];

        let description = self.client.chat(messages).await?;
        tracing::debug!("[Vision] Interpreted image as: {}", description);
        Ok(description)
    }
}
