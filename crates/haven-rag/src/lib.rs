//! Retrieval-augmented generation over location records
//!
//! This crate provides the in-memory similarity store, the conversion of
//! location records into retrievable documents, and the safety RAG engine.

mod documents;
mod engine;
mod vector_store;

#[cfg(test)]
mod tests;

pub use documents::{record_document, record_documents};
pub use engine::{RetrievalMode, SafetyRAGEngine};
pub use vector_store::LocalVectorStore;

// Re-export core types for convenience
pub use haven_core::{
    EmbeddingProvider, Error, RAGEngine, RAGQuery, RAGResult, Result, SearchConfig,
    SearchResult, VectorDocument, VectorStore,
};
