//! Completion provider adapters.
//!
//! Each provider implements the backend trait for its specific API.

mod chat_completions;

pub use chat_completions::{ChatCompletionsBackend, ChatCompletionsBackendBuilder};
