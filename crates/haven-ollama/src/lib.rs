//! Ollama integration for Haven
//!
//! This crate provides the Ollama implementation of the LLMProvider and
//! EmbeddingProvider traits.

mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::OllamaClient;
pub use config::OllamaConfig;

// Re-export core types for convenience
pub use haven_core::{
    EmbeddingProvider, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
};
