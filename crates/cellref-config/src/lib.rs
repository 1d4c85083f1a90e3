//! Configuration for the content engine.
//!
//! [`EngineConfig`] is process-wide and loaded from TOML. [`PropertyStore`]
//! holds per-document settings such as the webhook URL, which take
//! precedence over the config file.

pub mod engine;
pub mod error;
pub mod properties;

pub use engine::EngineConfig;
pub use error::{ConfigError, ConfigResult};
pub use properties::{InMemoryPropertyStore, PropertyStore, CONTENT_ID, PROJECT_NAME, WEBHOOK_URL};
