//! Shopmate - conversational shopping assistant service
//!
//! A user chats (optionally with an image) and the service either keeps the
//! conversation going or hands off to product search once the dialogue
//! engine has extracted a complete shopping intent. Each session owns its
//! own collaborator engines and message history.

pub mod chat;
pub mod config;
pub mod core;
pub mod engines;
pub mod server;
pub mod session;
pub mod utils;

pub use chat::{ChatOrchestrator, ChatTurnResult, TurnKind};
pub use config::Settings;
pub use crate::core::{Error, Message, MessageKind, MessageLog, Role};
pub use server::{create_router, start_server, AppState};
pub use session::{SessionConfig, SessionRegistry};
