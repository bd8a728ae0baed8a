pub mod error;
pub mod message;

pub use error::Error;
pub use message::{Message, MessageKind, MessageLog, Role};
