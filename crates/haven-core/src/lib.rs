//! Core traits and types for Haven
//!
//! This crate defines the location record model shared by every other crate and
//! the capability-facing interfaces for the external collaborators: text
//! generation, embeddings, similarity storage and retrieval.

pub mod error;
pub mod llm;
pub mod rag;
pub mod types;
pub mod vector_store;


pub use error::{Error, Result};
pub use llm::{EmbeddingProvider, GenerationConfig, GenerationResult, LLMProvider};
pub use rag::{RAGEngine, RAGQuery, RAGResult};
pub use types::*;
pub use vector_store::{SearchConfig, SearchResult, VectorDocument, VectorStore};
