//! Ambient infrastructure shared by every toolbridge binary.
//!
//! - [`tracing`](mod@tracing): subscriber configuration ([`TracingConfig`])
//! - [`settings`]: environment-driven [`Settings`] with validation

pub mod settings;
pub mod tracing;

pub use settings::{ConfigError, Settings};
pub use tracing::{TracingConfig, TracingFormat};
