//! Error taxonomy for the assistant service.
//!
//! Each variant maps to one class of user-visible failure; the HTTP layer
//! translates them to status codes. Collaborator failures are wrapped in
//! `Processing` with the underlying cause attached.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid credentials / mode selectors at session creation.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unknown session id.
    #[error("session not found: {0}")]
    NotFound(String),

    /// Image payload that cannot be decoded or is not an image.
    #[error("invalid image payload: {0}")]
    InvalidImage(String),

    /// Any failure inside the orchestration pipeline or a collaborator call.
    #[error("processing error: {0}")]
    Processing(#[from] anyhow::Error),
}
