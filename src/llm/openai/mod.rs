//! OpenAI-compatible provider implementation
//!
//! Works against any endpoint implementing streaming `/chat/completions`
//! (OpenAI, DashScope compatible mode, vLLM, Ollama, LiteLLM, ...).

pub mod client;
pub mod mapper;
pub mod sse;
pub mod types;

pub use client::OpenAiClient;
