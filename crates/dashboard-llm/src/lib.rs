//! Chat-completion abstraction layer for the stock dashboard
//!
//! This crate provides provider-agnostic types for talking to a
//! chat-completion model. It includes:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - Provider trait for LLM implementations
//! - An OpenAI-compatible provider (behind the `openai` feature)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
