//! Chat turn types and the image payload decoder.

mod orchestrator;

pub use orchestrator::ChatOrchestrator;

use crate::core::Error;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    Conversation,
    ProductSearch,
}

/// Structured result of one turn through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurnResult {
    #[serde(rename = "type")]
    pub kind: TurnKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_html: Option<String>,
    pub continue_conversation: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurnResult {
    fn conversation(message: String) -> Self {
        Self {
            kind: TurnKind::Conversation,
            message,
            products_html: None,
            continue_conversation: true,
            timestamp: Utc::now(),
        }
    }

    fn product_search(message: String, products_html: String) -> Self {
        Self {
            kind: TurnKind::ProductSearch,
            message,
            products_html: Some(products_html),
            continue_conversation: false,
            timestamp: Utc::now(),
        }
    }
}

/// Decode a data-URI-style image payload: the prefix before the first
/// comma (if any) is discarded, the remainder is standard base64. The
/// decoded bytes must sniff as a known image format.
pub fn decode_image_payload(data: &str) -> Result<Vec<u8>, Error> {
    let encoded = data
        .split_once(',')
        .map(|(_, rest)| rest)
        .unwrap_or(data)
        .trim();

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| Error::InvalidImage(format!("base64 decode failed: {}", e)))?;

    image::guess_format(&bytes)
        .map_err(|_| Error::InvalidImage("payload is not a recognized image format".to_string()))?;

    Ok(bytes)
}
