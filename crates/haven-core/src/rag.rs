//! RAG (Retrieval-Augmented Generation) engine trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{LocationRecord, Result, VectorDocument};

/// Query for RAG retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGQuery {
    pub query: String,
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl RAGQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

impl Default for RAGQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            top_k: 5,
            score_threshold: Some(0.1),
        }
    }
}

/// Result from RAG retrieval
///
/// Every document's metadata carries `kind`, `city`, `lat`, `lon` and
/// `category`, and for threat records `intensity` and `threat_level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGResult {
    pub documents: Vec<VectorDocument>,
    pub context: String,
    pub metadata: Option<serde_json::Value>,
}

/// Trait for RAG engines over location records
#[async_trait]
pub trait RAGEngine: Send + Sync {
    /// Initialize the RAG engine
    async fn initialize(&mut self) -> Result<()>;

    /// Replace the indexed documents with one document per record
    async fn index(&self, records: &[LocationRecord]) -> Result<usize>;

    /// Retrieve relevant documents for a query
    async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult>;

    /// Build context from retrieved documents
    fn build_context(&self, documents: &[VectorDocument]) -> String;

    /// Enhance a prompt with RAG context
    async fn enhance_prompt(&self, prompt: &str, query: &RAGQuery) -> Result<String>;

    /// Get statistics about the RAG engine
    async fn stats(&self) -> Result<serde_json::Value>;

    /// Check if the RAG engine is ready
    fn is_ready(&self) -> bool;
}
