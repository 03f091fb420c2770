//! Lexical and vector similarity scoring

use regex::Regex;
use std::sync::LazyLock;

static TOKEN_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,，。；;]+").expect("valid regex"));

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for empty, mismatched-length, or zero-norm vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// Lower-cased query tokens
pub fn tokenize(query: &str) -> Vec<String> {
    TOKEN_SEPARATORS
        .split(&query.to_lowercase())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fraction of query tokens found as substrings of the text
pub fn keyword_similarity(query: &str, text: &str) -> f32 {
    let tokens = tokenize(query);
    let haystack = text.to_lowercase();
    if tokens.is_empty() || haystack.is_empty() {
        return 0.0;
    }
    let hits = tokens.iter().filter(|t| haystack.contains(t.as_str())).count();
    hits as f32 / tokens.len() as f32
}

/// Weighted combination: `w * lexical + (1 - w) * vector`
pub fn hybrid_score(keyword_weight: f32, lexical: f32, vector: f32) -> f32 {
    let w = keyword_weight.clamp(0.0, 1.0);
    w * lexical + (1.0 - w) * vector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Chest pain, fever；咳嗽。dyspnea"), vec!["chest", "pain", "fever", "咳嗽", "dyspnea"]);
        assert!(tokenize(" ,; ").is_empty());
    }

    #[test]
    fn test_keyword_similarity() {
        let text = "Patient reports chest pain radiating to the left arm";
        assert_eq!(keyword_similarity("chest pain", text), 1.0);
        assert_eq!(keyword_similarity("chest fever", text), 0.5);
        assert_eq!(keyword_similarity("", text), 0.0);
        assert_eq!(keyword_similarity("chest", ""), 0.0);
    }

    #[test]
    fn test_hybrid_weight_extremes() {
        assert_eq!(hybrid_score(1.0, 0.3, 0.9), 0.3);
        assert_eq!(hybrid_score(0.0, 0.3, 0.9), 0.9);
        assert_eq!(hybrid_score(2.0, 0.3, 0.9), 0.3);
        assert!((hybrid_score(0.5, 0.4, 0.8) - 0.6).abs() < 1e-6);
    }
}
