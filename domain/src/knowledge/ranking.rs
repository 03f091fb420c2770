//! Hybrid ranking of chunks against a query

use super::entities::{Chunk, KnowledgeDocument, RetrievedEntry, UNTITLED_DOCUMENT};
use super::similarity::{cosine_similarity, hybrid_score, keyword_similarity};

/// Score chunks and keep the best `top_k`.
///
/// The vector channel contributes only when `query_embedding` is non-empty.
/// Non-finite scores are dropped; equal scores keep their stored order.
pub fn rank_chunks<'a>(
    query: &str,
    query_embedding: &[f32],
    chunks: impl IntoIterator<Item = &'a Chunk>,
    docs: &[KnowledgeDocument],
    top_k: u32,
    keyword_weight: f32,
) -> Vec<RetrievedEntry> {
    let use_vectors = !query_embedding.is_empty();

    let mut scored: Vec<(&Chunk, f32)> = chunks
        .into_iter()
        .map(|chunk| {
            let lexical = keyword_similarity(query, &chunk.text);
            let vector = if use_vectors {
                cosine_similarity(query_embedding, &chunk.embedding)
            } else {
                0.0
            };
            (chunk, hybrid_score(keyword_weight, lexical, vector))
        })
        .filter(|(_, score)| score.is_finite())
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(top_k as usize)
        .map(|(chunk, score)| RetrievedEntry {
            id: chunk.id.clone(),
            doc_id: chunk.doc_id.clone(),
            title: docs
                .iter()
                .find(|d| d.id == chunk.doc_id)
                .map(|d| d.title.clone())
                .unwrap_or_else(|| UNTITLED_DOCUMENT.to_string()),
            content: chunk.text.clone(),
            score: Some(score),
        })
        .collect()
}

/// Whole-document context used when no chunk could be scored
pub fn document_fallback<'a>(
    docs: impl IntoIterator<Item = &'a KnowledgeDocument>,
    top_k: u32,
) -> Vec<RetrievedEntry> {
    docs.into_iter()
        .take(top_k as usize)
        .map(|doc| RetrievedEntry {
            id: doc.id.clone(),
            doc_id: doc.id.clone(),
            title: doc.title.clone(),
            content: doc.excerpt_or_content().to_string(),
            score: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::entities::RawDocument;

    fn doc(id: &str, title: &str) -> KnowledgeDocument {
        RawDocument {
            id: Some(id.into()),
            ..RawDocument::new(title, "content")
        }
        .normalize()
    }

    fn chunk(doc_id: &str, text: &str, embedding: Vec<f32>) -> Chunk {
        Chunk::new(doc_id, text, embedding)
    }

    #[test]
    fn test_lexical_only_when_no_query_embedding() {
        let docs = vec![doc("d1", "Cardio")];
        let chunks = vec![
            chunk("d1", "aspirin dosing", vec![1.0, 0.0]),
            chunk("d1", "chest pain workup", vec![0.0, 1.0]),
        ];
        let ranked = rank_chunks("chest pain", &[], &chunks, &docs, 5, 0.5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].content, "chest pain workup");
        assert_eq!(ranked[0].score, Some(0.5));
        assert_eq!(ranked[0].title, "Cardio");
    }

    #[test]
    fn test_vector_weight_dominates_at_zero() {
        let docs = vec![doc("d1", "Cardio")];
        let chunks = vec![
            chunk("d1", "chest pain", vec![0.0, 1.0]),
            chunk("d1", "unrelated", vec![1.0, 0.0]),
        ];
        let ranked = rank_chunks("chest pain", &[1.0, 0.0], &chunks, &docs, 5, 0.0);
        assert_eq!(ranked[0].content, "unrelated");
        assert_eq!(ranked[0].score, Some(1.0));
    }

    #[test]
    fn test_top_k_and_stable_ties() {
        let docs = vec![doc("d1", "A")];
        let chunks: Vec<Chunk> = (0..4).map(|i| chunk("d1", &format!("same {}", i), vec![])).collect();
        let ranked = rank_chunks("same", &[], &chunks, &docs, 2, 1.0);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].content, "same 0");
        assert_eq!(ranked[1].content, "same 1");
    }

    #[test]
    fn test_unknown_doc_gets_untitled() {
        let chunks = vec![chunk("ghost", "text", vec![])];
        let ranked = rank_chunks("text", &[], &chunks, &[], 5, 0.5);
        assert_eq!(ranked[0].title, UNTITLED_DOCUMENT);
    }

    #[test]
    fn test_document_fallback() {
        let mut first = doc("d1", "First");
        first.excerpt = "summary".into();
        let docs = vec![first, doc("d2", "Second"), doc("d3", "Third")];
        let entries = document_fallback(&docs, 2);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content, "summary");
        assert_eq!(entries[1].content, "content");
        assert_eq!(entries[1].score, None);
    }
}
