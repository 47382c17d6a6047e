// HTTP server modules
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sse;
pub mod state;

// Accounts, tokens and license checks
pub mod auth;

// Persistence
pub mod store;
pub mod uploads;

// Prompt templates and the LLM abstraction layer
pub mod llm;
pub mod prompts;
