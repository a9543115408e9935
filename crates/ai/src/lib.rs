//! LLM report generation with multi-provider fallback.
//!
//! Backends are tried in a fixed order (Gemini, OpenAI, Anthropic); the first
//! configured backend that returns a completion wins, and a total failure
//! carries the per-backend reasons.

pub mod engine;
pub mod error;
pub mod prompts;
pub mod providers;

pub use engine::{GeneratedReport, ReportEngine};
pub use error::AiError;
pub use providers::{GenerationRequest, LlmConfig, LlmProvider, LlmRegistry};
