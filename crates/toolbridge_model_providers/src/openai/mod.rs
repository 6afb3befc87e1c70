//! `OpenAI` provider backend.
//!
//! Uses the `OpenAI` Responses API.

mod backend;
mod provider;

pub use backend::OpenAiBackend;
pub use provider::OpenAiProvider;
