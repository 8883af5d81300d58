//! Safety RAG engine implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use haven_core::{
    EmbeddingProvider, Error, LocationRecord, RAGEngine, RAGQuery, RAGResult, Result,
    SearchConfig, VectorDocument, VectorStore,
};

use crate::documents::record_documents;

/// How documents are matched against a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// Cosine similarity over embeddings
    Semantic,
    /// Word overlap with the document text
    Lexical,
}

/// RAG engine over the location table
///
/// With an embedding provider the engine retrieves semantically. If embedding
/// fails while indexing it keeps serving lexical results until the next
/// successful index.
pub struct SafetyRAGEngine<V: VectorStore> {
    vector_store: Arc<V>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    semantic: AtomicBool,
    initialized: bool,
}

impl<V: VectorStore> SafetyRAGEngine<V> {
    /// Create an engine that matches lexically
    pub fn new(vector_store: Arc<V>) -> Self {
        Self {
            vector_store,
            embedder: None,
            semantic: AtomicBool::new(false),
            initialized: false,
        }
    }

    /// Use `embedder` for documents and queries
    pub fn with_embeddings(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self.semantic.store(true, Ordering::SeqCst);
        self
    }

    pub fn mode(&self) -> RetrievalMode {
        if self.embedder.is_some() && self.semantic.load(Ordering::SeqCst) {
            RetrievalMode::Semantic
        } else {
            RetrievalMode::Lexical
        }
    }

    async fn embed_documents(&self, documents: &mut [VectorDocument]) {
        let Some(embedder) = &self.embedder else {
            return;
        };

        let texts: Vec<String> = documents.iter().map(|doc| doc.content.clone()).collect();
        match embedder.embed_batch(&texts).await {
            Ok(embeddings) if embeddings.len() == documents.len() => {
                for (doc, embedding) in documents.iter_mut().zip(embeddings) {
                    doc.embedding = Some(embedding);
                }
                self.semantic.store(true, Ordering::SeqCst);
            }
            Ok(embeddings) => {
                warn!(
                    expected = documents.len(),
                    got = embeddings.len(),
                    "embedding count mismatch, falling back to lexical search"
                );
                self.semantic.store(false, Ordering::SeqCst);
            }
            Err(e) => {
                warn!(error = %e, "embedding failed, falling back to lexical search");
                self.semantic.store(false, Ordering::SeqCst);
            }
        }
    }

    async fn search(&self, query: &RAGQuery) -> Result<Vec<VectorDocument>> {
        let search_config = SearchConfig {
            top_k: query.top_k,
            score_threshold: query.score_threshold,
        };

        if let (RetrievalMode::Semantic, Some(embedder)) = (self.mode(), &self.embedder) {
            match embedder.embed(&query.query).await {
                Ok(vector) => {
                    let result = self.vector_store.search_by_vector(vector, &search_config).await?;
                    return Ok(result.documents);
                }
                Err(e) => {
                    debug!(error = %e, "query embedding failed, using lexical search");
                }
            }
        }

        let result = self.vector_store.search(&query.query, &search_config).await?;
        Ok(result.documents)
    }
}

#[async_trait]
impl<V: VectorStore + 'static> RAGEngine for SafetyRAGEngine<V> {
    async fn initialize(&mut self) -> Result<()> {
        if !self.vector_store.is_connected() {
            return Err(Error::Retrieval("Vector store not connected".to_string()));
        }

        self.initialized = true;
        Ok(())
    }

    async fn index(&self, records: &[LocationRecord]) -> Result<usize> {
        if !self.initialized {
            return Err(Error::Retrieval("RAG engine not initialized".to_string()));
        }

        let mut documents = record_documents(records);
        self.embed_documents(&mut documents).await;

        // previous documents stay searchable until the new batch is ready
        let ids = self.vector_store.replace_all(documents).await?;
        info!(documents = ids.len(), mode = ?self.mode(), "indexed location documents");

        Ok(ids.len())
    }

    async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult> {
        if !self.initialized {
            return Err(Error::Retrieval("RAG engine not initialized".to_string()));
        }

        let documents = self.search(query).await?;
        let context = self.build_context(&documents);

        Ok(RAGResult {
            metadata: Some(json!({
                "query": query.query,
                "top_k": query.top_k,
                "results_count": documents.len(),
                "mode": self.mode(),
            })),
            documents,
            context,
        })
    }

    fn build_context(&self, documents: &[VectorDocument]) -> String {
        if documents.is_empty() {
            return String::new();
        }

        let mut context = String::from("Relevant safety locations:\n\n");

        for (i, doc) in documents.iter().enumerate() {
            context.push_str(&format!("{}. ", i + 1));
            context.push_str(doc.content.trim());
            context.push_str("\n\n");
        }

        context
    }

    async fn enhance_prompt(&self, prompt: &str, query: &RAGQuery) -> Result<String> {
        let rag_result = self.retrieve(query).await?;

        let mut enhanced = String::new();
        enhanced.push_str(&rag_result.context);
        enhanced.push_str("\n---\n\n");
        enhanced.push_str("Based on the above locations, ");
        enhanced.push_str(prompt);

        Ok(enhanced)
    }

    async fn stats(&self) -> Result<serde_json::Value> {
        let document_count = self.vector_store.count().await?;

        Ok(json!({
            "initialized": self.initialized,
            "documents": document_count,
            "mode": self.mode(),
            "embedding_model": self.embedder.as_ref().map(|e| e.embedding_model().to_string()),
        }))
    }

    fn is_ready(&self) -> bool {
        self.initialized && self.vector_store.is_connected()
    }
}
