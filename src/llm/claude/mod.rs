//! Claude provider implementation
//!
//! This module provides a client for Anthropic Claude models through the
//! Anthropic Messages API.

pub mod client;
pub mod mapper;
pub mod sse;
pub mod types;

// Re-export commonly used types
pub use client::ClaudeClient;
