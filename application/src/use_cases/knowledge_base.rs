//! Knowledge base use case
//!
//! Owns the document and chunk collections, keeps them persisted in a
//! [`KeyValueStore`], and answers hybrid retrieval queries. All mutation goes
//! through `&mut self`, so it can never interleave with a retrieval read.

use crate::ports::agent_gateway::{Embedder, GatewayError};
use crate::ports::knowledge_source::{KnowledgeError, KnowledgeSource, RetrievalQuery};
use crate::ports::kv_store::{
    CHUNKS_KEY, DOCS_KEY, EMBEDDING_CONFIG_KEY, KeyValueStore, RETRIEVAL_CONFIG_KEY,
};
use async_trait::async_trait;
use consilium_domain::knowledge::chunker::{DEFAULT_MAX_CHUNK_CHARS, chunk_text};
use consilium_domain::knowledge::config::{bound_top_k, bound_weight};
use consilium_domain::knowledge::entities::generate_id;
use consilium_domain::knowledge::ranking::{document_fallback, rank_chunks};
use consilium_domain::{
    Chunk, DocumentPatch, EmbeddingConfig, KnowledgeDocument, RawDocument, RetrievalConfig,
    RetrievedEntry,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bound on a single embedding call unless the caller sets one
pub const DEFAULT_EMBED_TIMEOUT: Duration = Duration::from_secs(60);

/// Input for [`KnowledgeBase::ingest`]
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub collection_id: String,
    pub auto_vectorize: bool,
}

impl IngestRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            collection_id: String::new(),
            auto_vectorize: true,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = collection_id.into();
        self
    }

    pub fn without_vectorize(mut self) -> Self {
        self.auto_vectorize = false;
        self
    }
}

/// Result of [`KnowledgeBase::import_data`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Documents found in the payload
    pub imported: usize,
    /// Documents in the knowledge base after merging
    pub merged: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImportPayload {
    Wrapped { docs: Vec<RawDocument> },
    Bare(Vec<RawDocument>),
}

#[derive(Serialize)]
struct ExportPayload<'a> {
    docs: &'a [KnowledgeDocument],
}

/// Document store with hybrid retrieval
pub struct KnowledgeBase<E: Embedder + 'static, S: KeyValueStore + 'static> {
    embedder: Arc<E>,
    store: Arc<S>,
    docs: Vec<KnowledgeDocument>,
    chunks: Vec<Chunk>,
    pinned: Vec<String>,
    embedding_config: EmbeddingConfig,
    retrieval_config: RetrievalConfig,
    embed_timeout: Duration,
}

impl<E: Embedder + 'static, S: KeyValueStore + 'static> KnowledgeBase<E, S> {
    /// Load all collections from the store.
    ///
    /// Missing or malformed values load as empty collections or defaults.
    pub fn load(embedder: Arc<E>, store: Arc<S>) -> Self {
        let read = |key: &str| match store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {} from store: {}", key, e);
                None
            }
        };

        let docs = read(DOCS_KEY)
            .and_then(|raw| serde_json::from_str::<Vec<RawDocument>>(&raw).ok())
            .unwrap_or_default()
            .into_iter()
            .map(RawDocument::normalize)
            .collect::<Vec<_>>();
        let chunks = read(CHUNKS_KEY)
            .and_then(|raw| serde_json::from_str::<Vec<Chunk>>(&raw).ok())
            .unwrap_or_default();
        let embedding_config = EmbeddingConfig::from_stored(read(EMBEDDING_CONFIG_KEY).as_deref());
        let retrieval_config = RetrievalConfig::from_stored(read(RETRIEVAL_CONFIG_KEY).as_deref());

        debug!("Loaded knowledge base: {} documents, {} chunks", docs.len(), chunks.len());

        Self {
            embedder,
            store,
            docs,
            chunks,
            pinned: Vec::new(),
            embedding_config,
            retrieval_config,
            embed_timeout: DEFAULT_EMBED_TIMEOUT,
        }
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    // ==================== Accessors ====================

    /// Documents, newest first
    pub fn docs(&self) -> &[KnowledgeDocument] {
        &self.docs
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn doc(&self, id: &str) -> Option<&KnowledgeDocument> {
        self.docs.iter().find(|d| d.id == id)
    }

    pub fn pinned(&self) -> &[String] {
        &self.pinned
    }

    pub fn embedding_config(&self) -> &EmbeddingConfig {
        &self.embedding_config
    }

    pub fn retrieval_config(&self) -> RetrievalConfig {
        self.retrieval_config
    }

    // ==================== Persistence ====================

    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), KnowledgeError> {
        let json = serde_json::to_string(value).map_err(|e| KnowledgeError::Serialization(e.to_string()))?;
        self.store.set(key, &json)?;
        Ok(())
    }

    fn save_docs(&self) -> Result<(), KnowledgeError> {
        self.save_json(DOCS_KEY, &self.docs)
    }

    fn save_chunks(&self) -> Result<(), KnowledgeError> {
        self.save_json(CHUNKS_KEY, &self.chunks)
    }

    // ==================== Documents ====================

    /// Store a document at the front of the list and return its id
    pub fn add_doc(&mut self, raw: RawDocument) -> Result<String, KnowledgeError> {
        let mut doc = raw.normalize();
        doc.updated_at = chrono::Utc::now();
        let id = doc.id.clone();
        self.docs.insert(0, doc);
        self.save_docs()?;
        Ok(id)
    }

    /// Apply a patch, keeping the creation time
    pub fn update_doc(&mut self, id: &str, patch: DocumentPatch) -> Result<(), KnowledgeError> {
        let doc = self
            .docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| KnowledgeError::NotFound(id.to_string()))?;
        doc.apply(patch);
        self.save_docs()
    }

    /// Remove a document together with its chunks and pin
    pub fn remove_doc(&mut self, id: &str) -> Result<(), KnowledgeError> {
        if self.doc(id).is_none() {
            return Err(KnowledgeError::NotFound(id.to_string()));
        }
        self.docs.retain(|d| d.id != id);
        self.pinned.retain(|p| p != id);
        self.chunks.retain(|c| c.doc_id != id);
        self.save_docs()?;
        self.save_chunks()?;
        info!("Removed document {}", id);
        Ok(())
    }

    pub fn set_pinned(&mut self, ids: Vec<String>) {
        self.pinned = ids.into_iter().filter(|id| !id.is_empty()).collect();
    }

    /// Documents carrying every tag and matching the query
    pub fn search(&self, query: &str, tags: &[String]) -> Vec<&KnowledgeDocument> {
        let tags: Vec<String> = tags.iter().filter(|t| !t.is_empty()).cloned().collect();
        self.docs.iter().filter(|d| d.matches(query, &tags)).collect()
    }

    /// Documents grouped by collection, in order of first appearance
    pub fn by_collection(&self) -> Vec<(String, Vec<&KnowledgeDocument>)> {
        let mut groups: Vec<(String, Vec<&KnowledgeDocument>)> = Vec::new();
        for doc in &self.docs {
            let key = doc.collection_key();
            match groups.iter_mut().find(|(k, _)| k == key) {
                Some((_, list)) => list.push(doc),
                None => groups.push((key.to_string(), vec![doc])),
            }
        }
        groups
    }

    /// Merge documents from a JSON export.
    ///
    /// Accepts `{"docs": [...]}` or a bare array. Documents whose
    /// `title::content` already exists are skipped; the rest get fresh ids.
    /// A malformed payload leaves the knowledge base untouched.
    pub fn import_data(&mut self, json: &str) -> Result<ImportSummary, KnowledgeError> {
        let payload: ImportPayload =
            serde_json::from_str(json).map_err(|e| KnowledgeError::Import(e.to_string()))?;
        let incoming: Vec<KnowledgeDocument> = match payload {
            ImportPayload::Wrapped { docs } | ImportPayload::Bare(docs) => {
                docs.into_iter().map(RawDocument::normalize).collect()
            }
        };

        let existing: HashSet<String> = self.docs.iter().map(KnowledgeDocument::dedupe_key).collect();
        let mut merged = self.docs.clone();
        for mut doc in incoming.iter().cloned() {
            if existing.contains(&doc.dedupe_key()) {
                continue;
            }
            doc.id = generate_id("kb");
            merged.push(doc);
        }

        let summary = ImportSummary {
            imported: incoming.len(),
            merged: merged.len(),
        };
        self.save_json(DOCS_KEY, &merged)?;
        self.docs = merged;
        info!("Imported {} documents ({} total)", summary.imported, summary.merged);
        Ok(summary)
    }

    /// Pretty-printed `{"docs": [...]}`
    pub fn export_data(&self) -> Result<String, KnowledgeError> {
        serde_json::to_string_pretty(&ExportPayload { docs: &self.docs })
            .map_err(|e| KnowledgeError::Serialization(e.to_string()))
    }

    // ==================== Configuration ====================

    pub fn set_embedding_config(&mut self, config: EmbeddingConfig) -> Result<(), KnowledgeError> {
        self.embedding_config = config.normalized();
        self.save_json(EMBEDDING_CONFIG_KEY, &self.embedding_config)
    }

    pub fn set_retrieval_config(&mut self, top_k: f64, keyword_weight: f64) -> Result<(), KnowledgeError> {
        self.retrieval_config = RetrievalConfig::bounded(top_k, keyword_weight);
        self.save_json(RETRIEVAL_CONFIG_KEY, &self.retrieval_config)
    }

    // ==================== Embedding ====================

    /// Add a document and, when requested, embed it.
    ///
    /// The document stays stored even if embedding fails.
    pub async fn ingest(&mut self, request: IngestRequest) -> Result<String, KnowledgeError> {
        let raw = RawDocument::new(request.title, request.content)
            .with_tags(request.tags)
            .with_collection(request.collection_id);
        let id = self.add_doc(raw)?;
        if request.auto_vectorize {
            self.reembed(&id).await?;
        }
        Ok(id)
    }

    /// Re-chunk and re-embed a document, replacing its previous chunks.
    ///
    /// Returns the number of chunks stored.
    pub async fn reembed(&mut self, doc_id: &str) -> Result<usize, KnowledgeError> {
        let doc = self
            .doc(doc_id)
            .ok_or_else(|| KnowledgeError::NotFound(doc_id.to_string()))?;

        let pieces = chunk_text(&doc.content, DEFAULT_MAX_CHUNK_CHARS);
        let mut fresh = Vec::with_capacity(pieces.len());
        for piece in pieces {
            let embedding = self.embed(&piece).await?;
            fresh.push(Chunk::new(doc_id, piece, embedding));
        }

        let count = fresh.len();
        self.chunks.retain(|c| c.doc_id != doc_id);
        self.chunks.extend(fresh);
        self.save_chunks()?;
        info!("Embedded document {} into {} chunks", doc_id, count);
        Ok(count)
    }

    // ==================== Retrieval ====================

    /// Rank chunks against a query with the hybrid score.
    ///
    /// A failing query embedding degrades to lexical-only scoring. When no
    /// chunk can be scored, document excerpts stand in.
    pub async fn retrieve(&self, query: RetrievalQuery) -> Vec<RetrievedEntry> {
        let selected: Option<HashSet<&str>> = (!query.selected_doc_ids.is_empty())
            .then(|| query.selected_doc_ids.iter().map(String::as_str).collect());
        let in_scope = |doc_id: &str| selected.as_ref().is_none_or(|ids| ids.contains(doc_id));

        let candidates: Vec<&Chunk> = self.chunks.iter().filter(|c| in_scope(&c.doc_id)).collect();
        if candidates.is_empty() {
            return Vec::new();
        }

        let top_k = bound_top_k(query.top_k.unwrap_or(self.retrieval_config.top_k as f64));
        let weight = bound_weight(
            query
                .keyword_weight
                .unwrap_or(self.retrieval_config.keyword_weight as f64),
        );

        let query_embedding = self.embed_query(&query.text).await;
        let ranked = rank_chunks(&query.text, &query_embedding, candidates, &self.docs, top_k, weight);
        if !ranked.is_empty() {
            return ranked;
        }
        document_fallback(self.docs.iter().filter(|d| in_scope(&d.id)), top_k)
    }

    async fn embed_query(&self, text: &str) -> Vec<f32> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        match self.embed(text.trim()).await {
            Ok(vector) => vector,
            Err(e) => {
                debug!("Query embedding unavailable, using lexical scoring only: {}", e);
                Vec::new()
            }
        }
    }

    /// One embedding call, abandoned with [`GatewayError::Timeout`] on expiry
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        tokio::time::timeout(self.embed_timeout, self.embedder.embed(&self.embedding_config, text))
            .await
            .unwrap_or(Err(GatewayError::Timeout))
    }
}

#[async_trait]
impl<E: Embedder + 'static, S: KeyValueStore + 'static> KnowledgeSource for KnowledgeBase<E, S> {
    async fn retrieve_context(&self, query: RetrievalQuery) -> Result<Vec<RetrievedEntry>, KnowledgeError> {
        Ok(self.retrieve(query).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::kv_store::InMemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text as `[len("chest"), len("fever")]` occurrence counts
    struct KeywordEmbedder {
        calls: AtomicUsize,
        fail: bool,
    }

    impl KeywordEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, _config: &EmbeddingConfig, text: &str) -> Result<Vec<f32>, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GatewayError::InvalidRequest("missing api key".into()));
            }
            let lower = text.to_lowercase();
            Ok(vec![
                lower.matches("chest").count() as f32,
                lower.matches("fever").count() as f32,
            ])
        }
    }

    fn kb(embedder: KeywordEmbedder) -> KnowledgeBase<KeywordEmbedder, InMemoryStore> {
        KnowledgeBase::load(Arc::new(embedder), Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn test_ingest_embeds_chunks() {
        let mut kb = kb(KeywordEmbedder::new());
        let id = kb
            .ingest(IngestRequest::new("ACS", "Chest pain workup. Troponin twice."))
            .await
            .unwrap();
        assert_eq!(kb.docs().len(), 1);
        assert_eq!(kb.chunks().len(), 1);
        assert_eq!(kb.chunks()[0].doc_id, id);
        assert_eq!(kb.chunks()[0].embedding, vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_ingest_without_vectorize() {
        let embedder = KeywordEmbedder::new();
        let mut kb = kb(embedder);
        kb.ingest(IngestRequest::new("a", "b").without_vectorize()).await.unwrap();
        assert!(kb.chunks().is_empty());
        assert_eq!(kb.embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reembed_replaces_chunks() {
        let mut kb = kb(KeywordEmbedder::new());
        let id = kb.ingest(IngestRequest::new("t", "One. Two.")).await.unwrap();
        let before: Vec<String> = kb.chunks().iter().map(|c| c.id.clone()).collect();
        let count = kb.reembed(&id).await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(kb.chunks().len(), 1);
        assert_ne!(kb.chunks()[0].id, before[0]);
    }

    #[tokio::test]
    async fn test_reembed_unknown_doc() {
        let mut kb = kb(KeywordEmbedder::new());
        assert!(matches!(kb.reembed("nope").await, Err(KnowledgeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_ingest_keeps_doc_when_embedding_fails() {
        let mut kb = kb(KeywordEmbedder::failing());
        let result = kb.ingest(IngestRequest::new("t", "text")).await;
        assert!(matches!(result, Err(KnowledgeError::Embedding(_))));
        assert_eq!(kb.docs().len(), 1);
        assert!(kb.chunks().is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_hybrid_ranking() {
        let mut kb = kb(KeywordEmbedder::new());
        kb.ingest(IngestRequest::new("Fever", "Fever management in adults.")).await.unwrap();
        kb.ingest(IngestRequest::new("Chest", "Chest pain triage.")).await.unwrap();

        let entries = kb.retrieve(RetrievalQuery::new("chest pain").with_keyword_weight(0.5)).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Chest");
        assert!(entries[0].score.unwrap() > entries[1].score.unwrap());
    }

    #[tokio::test]
    async fn test_retrieve_respects_selection_and_top_k() {
        let mut kb = kb(KeywordEmbedder::new());
        let a = kb.ingest(IngestRequest::new("A", "chest one.")).await.unwrap();
        kb.ingest(IngestRequest::new("B", "chest two.")).await.unwrap();

        let entries = kb
            .retrieve(RetrievalQuery::new("chest").with_selected(vec![a.clone()]))
            .await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].doc_id, a);

        let entries = kb.retrieve(RetrievalQuery::new("chest").with_top_k(0.0)).await;
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_retrieve_without_chunks_is_empty() {
        let mut kb = kb(KeywordEmbedder::new());
        kb.ingest(IngestRequest::new("a", "b").without_vectorize()).await.unwrap();
        assert!(kb.retrieve(RetrievalQuery::new("b")).await.is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_degrades_when_query_embedding_fails() {
        let store = Arc::new(InMemoryStore::new());
        {
            let mut seed = KnowledgeBase::load(Arc::new(KeywordEmbedder::new()), Arc::clone(&store));
            seed.ingest(IngestRequest::new("Chest", "Chest pain triage.")).await.unwrap();
        }
        let kb = KnowledgeBase::load(Arc::new(KeywordEmbedder::failing()), store);
        let entries = kb.retrieve(RetrievalQuery::new("chest pain").with_keyword_weight(0.5)).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, Some(0.5));
    }

    /// Never answers within a test's lifetime
    struct StalledEmbedder;

    #[async_trait]
    impl Embedder for StalledEmbedder {
        async fn embed(&self, _config: &EmbeddingConfig, _text: &str) -> Result<Vec<f32>, GatewayError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec![1.0, 0.0])
        }
    }

    #[tokio::test]
    async fn test_slow_query_embedding_times_out_to_lexical() {
        let store = Arc::new(InMemoryStore::new());
        {
            let mut seed = KnowledgeBase::load(Arc::new(KeywordEmbedder::new()), Arc::clone(&store));
            seed.ingest(IngestRequest::new("Chest", "Chest pain triage.")).await.unwrap();
        }
        let kb = KnowledgeBase::load(Arc::new(StalledEmbedder), store)
            .with_embed_timeout(Duration::from_millis(20));

        let started = std::time::Instant::now();
        let entries = kb.retrieve(RetrievalQuery::new("chest pain").with_keyword_weight(0.5)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, Some(0.5));
    }

    #[tokio::test]
    async fn test_slow_reembed_times_out() {
        let mut kb = KnowledgeBase::load(Arc::new(StalledEmbedder), Arc::new(InMemoryStore::new()))
            .with_embed_timeout(Duration::from_millis(20));
        let result = kb.ingest(IngestRequest::new("t", "text")).await;
        assert!(matches!(result, Err(KnowledgeError::Embedding(GatewayError::Timeout))));
        assert_eq!(kb.docs().len(), 1);
        assert!(kb.chunks().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_round_trip() {
        let store = Arc::new(InMemoryStore::new());
        let id = {
            let mut kb = KnowledgeBase::load(Arc::new(KeywordEmbedder::new()), Arc::clone(&store));
            kb.set_retrieval_config(7.0, 0.3).unwrap();
            kb.ingest(IngestRequest::new("t", "chest.")).await.unwrap()
        };
        let kb = KnowledgeBase::load(Arc::new(KeywordEmbedder::new()), store);
        assert_eq!(kb.docs()[0].id, id);
        assert_eq!(kb.chunks().len(), 1);
        assert_eq!(kb.retrieval_config().top_k, 7);
    }

    #[test]
    fn test_malformed_store_loads_empty() {
        let store = Arc::new(InMemoryStore::new());
        store.set(DOCS_KEY, "{not json").unwrap();
        store.set(CHUNKS_KEY, "42").unwrap();
        let kb = KnowledgeBase::load(Arc::new(KeywordEmbedder::new()), store);
        assert!(kb.docs().is_empty());
        assert!(kb.chunks().is_empty());
        assert_eq!(kb.retrieval_config(), RetrievalConfig::default());
    }

    #[tokio::test]
    async fn test_remove_cascades() {
        let mut kb = kb(KeywordEmbedder::new());
        let id = kb.ingest(IngestRequest::new("t", "chest.")).await.unwrap();
        kb.set_pinned(vec![id.clone(), String::new()]);
        assert_eq!(kb.pinned(), &[id.clone()]);
        kb.remove_doc(&id).unwrap();
        assert!(kb.docs().is_empty());
        assert!(kb.chunks().is_empty());
        assert!(kb.pinned().is_empty());
        assert!(matches!(kb.remove_doc(&id), Err(KnowledgeError::NotFound(_))));
    }

    #[test]
    fn test_import_dedupes_and_assigns_ids() {
        let mut kb = kb(KeywordEmbedder::new());
        kb.add_doc(RawDocument::new("A", "alpha")).unwrap();
        let payload = r#"{"docs": [{"id": "x", "title": "A", "content": "alpha"}, {"id": "y", "title": "B", "content": "beta"}]}"#;
        let summary = kb.import_data(payload).unwrap();
        assert_eq!(summary, ImportSummary { imported: 2, merged: 2 });
        let imported = kb.docs().iter().find(|d| d.title == "B").unwrap();
        assert_ne!(imported.id, "y");

        let summary = kb.import_data(r#"[{"title": "C", "content": "gamma"}]"#).unwrap();
        assert_eq!(summary, ImportSummary { imported: 1, merged: 3 });
    }

    #[test]
    fn test_import_malformed_leaves_state() {
        let mut kb = kb(KeywordEmbedder::new());
        kb.add_doc(RawDocument::new("A", "alpha")).unwrap();
        assert!(matches!(kb.import_data("{\"docs\": 3}"), Err(KnowledgeError::Import(_))));
        assert!(matches!(kb.import_data("garbage"), Err(KnowledgeError::Import(_))));
        assert_eq!(kb.docs().len(), 1);
    }

    #[test]
    fn test_export_round_trips_through_import() {
        let mut source = kb(KeywordEmbedder::new());
        source.add_doc(RawDocument::new("A", "alpha")).unwrap();
        let exported = source.export_data().unwrap();
        assert!(exported.contains("\"docs\""));

        let mut target = kb(KeywordEmbedder::new());
        let summary = target.import_data(&exported).unwrap();
        assert_eq!(summary.merged, 1);
        assert_eq!(target.docs()[0].title, "A");
    }

    #[test]
    fn test_search_and_collections() {
        let mut kb = kb(KeywordEmbedder::new());
        kb.add_doc(RawDocument::new("Heart", "x").with_collection("cardio").with_tags(vec!["acs".into()]))
            .unwrap();
        kb.add_doc(RawDocument::new("Lung", "y")).unwrap();
        kb.add_doc(RawDocument::new("Valve", "z").with_collection("cardio")).unwrap();

        assert_eq!(kb.search("heart", &[]).len(), 1);
        assert_eq!(kb.search("", &["acs".into()]).len(), 1);
        assert_eq!(kb.search("", &[]).len(), 3);

        let groups = kb.by_collection();
        assert_eq!(groups[0].0, "cardio");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "default");
    }

    #[test]
    fn test_update_doc() {
        let mut kb = kb(KeywordEmbedder::new());
        let id = kb.add_doc(RawDocument::new("A", "alpha")).unwrap();
        kb.update_doc(
            &id,
            DocumentPatch {
                content: Some("beta".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(kb.doc(&id).unwrap().content, "beta");
        assert!(kb.update_doc("nope", DocumentPatch::default()).is_err());
    }

    #[test]
    fn test_set_embedding_config_normalizes_model() {
        let mut kb = kb(KeywordEmbedder::new());
        kb.set_embedding_config(EmbeddingConfig {
            model: " ".into(),
            api_key: "ms-1".into(),
            base_url: String::new(),
        })
        .unwrap();
        assert_eq!(kb.embedding_config().model, "text-embedding-v3");
    }
}
