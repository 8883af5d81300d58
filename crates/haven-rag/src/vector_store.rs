//! In-memory similarity store

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use haven_core::{Error, Result, SearchConfig, SearchResult, VectorDocument, VectorStore};

/// Local in-memory vector store
///
/// Documents keep insertion order, so equal scores rank in the order the
/// documents were stored. Storing an existing id replaces that document.
pub struct LocalVectorStore {
    documents: Arc<RwLock<Vec<VectorDocument>>>,
    connected: bool,
}

impl LocalVectorStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
            connected: false,
        }
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }

    /// Fraction of query words found in the content
    fn text_similarity(query: &str, content: &str) -> f32 {
        let query_lower = query.to_lowercase();
        let content_lower = content.to_lowercase();

        let query_words: Vec<&str> = query_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| word.len() > 2)
            .collect();

        if query_words.is_empty() {
            return 0.0;
        }

        let matches = query_words
            .iter()
            .filter(|word| content_lower.contains(*word))
            .count();

        matches as f32 / query_words.len() as f32
    }

    fn lock_error<E: std::fmt::Display>(e: E) -> Error {
        Error::Retrieval(format!("Lock error: {}", e))
    }

    fn rank(mut results: Vec<VectorDocument>, config: &SearchConfig) -> SearchResult {
        if let Some(threshold) = config.score_threshold {
            results.retain(|doc| doc.score.unwrap_or(0.0) >= threshold);
        }

        results.sort_by(|a, b| b.score.unwrap_or(0.0).total_cmp(&a.score.unwrap_or(0.0)));
        results.truncate(config.top_k);

        let total = results.len();
        SearchResult {
            documents: results,
            total,
        }
    }

    fn upsert(docs: &mut Vec<VectorDocument>, document: VectorDocument) -> String {
        let id = document.id.clone();
        match docs.iter_mut().find(|existing| existing.id == id) {
            Some(existing) => *existing = document,
            None => docs.push(document),
        }
        id
    }
}

impl Default for LocalVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn connect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    async fn store(&self, document: VectorDocument) -> Result<String> {
        let mut docs = self.documents.write().map_err(Self::lock_error)?;
        Ok(Self::upsert(&mut docs, document))
    }

    async fn store_batch(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        let mut docs = self.documents.write().map_err(Self::lock_error)?;

        Ok(documents
            .into_iter()
            .map(|document| Self::upsert(&mut docs, document))
            .collect())
    }

    async fn search(&self, query: &str, config: &SearchConfig) -> Result<SearchResult> {
        let docs = self.documents.read().map_err(Self::lock_error)?;

        let results = docs
            .iter()
            .map(|doc| {
                let mut scored = doc.clone();
                scored.score = Some(Self::text_similarity(query, &doc.content));
                scored
            })
            .collect();

        Ok(Self::rank(results, config))
    }

    async fn search_by_vector(&self, vector: Vec<f32>, config: &SearchConfig) -> Result<SearchResult> {
        let docs = self.documents.read().map_err(Self::lock_error)?;

        let results = docs
            .iter()
            .filter_map(|doc| {
                let embedding = doc.embedding.as_ref()?;
                let mut scored = doc.clone();
                scored.score = Some(Self::cosine_similarity(&vector, embedding));
                Some(scored)
            })
            .collect();

        Ok(Self::rank(results, config))
    }

    async fn get(&self, id: &str) -> Result<Option<VectorDocument>> {
        let docs = self.documents.read().map_err(Self::lock_error)?;
        Ok(docs.iter().find(|doc| doc.id == id).cloned())
    }

    async fn clear(&self) -> Result<()> {
        let mut docs = self.documents.write().map_err(Self::lock_error)?;
        docs.clear();
        Ok(())
    }

    async fn replace_all(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        let mut fresh = Vec::with_capacity(documents.len());
        let ids = documents
            .into_iter()
            .map(|document| Self::upsert(&mut fresh, document))
            .collect();

        let mut docs = self.documents.write().map_err(Self::lock_error)?;
        *docs = fresh;
        Ok(ids)
    }

    async fn count(&self) -> Result<usize> {
        let docs = self.documents.read().map_err(Self::lock_error)?;
        Ok(docs.len())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
