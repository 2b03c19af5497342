//! OpenAI integration for RAGKB
//!
//! This crate provides an OpenAI-compatible HTTP client implementing both the
//! `EmbeddingProvider` and the `GenerationProvider` traits.

mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::OpenAiClient;
pub use config::OpenAiConfig;

// Re-export core types for convenience
pub use ragkb_core::{
    ChatMessage, EmbeddingProvider, Error, GenerationProvider, GenerationRequest, Result,
};
