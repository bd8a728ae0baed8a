mod settings;

pub use settings::{LlmConfig, LoggingConfig, SearchConfig, ServerConfig, Settings};
