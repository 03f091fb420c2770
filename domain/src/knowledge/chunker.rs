//! Sentence-aligned text chunking

/// Maximum characters per chunk
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 800;

const SENTENCE_ENDINGS: [char; 7] = ['。', '！', '？', '!', '?', '.', '\n'];

/// Split text into sentences, each keeping its terminator
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        if SENTENCE_ENDINGS.contains(&ch) {
            let end = idx + ch.len_utf8();
            out.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

/// Chunk text into pieces of at most `max_chars` characters.
///
/// Sentences are accumulated greedily; a chunk is closed when the next
/// sentence would overflow it. A single sentence longer than `max_chars`
/// becomes its own oversized chunk rather than being cut mid-sentence.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut buffer = String::new();
    let mut buffer_chars = 0;
    for sentence in sentences(trimmed) {
        let len = sentence.chars().count();
        if buffer_chars + len > max_chars && !buffer.is_empty() {
            parts.push(std::mem::take(&mut buffer));
            buffer_chars = 0;
        }
        buffer.push_str(sentence);
        buffer_chars += len;
    }
    if !buffer.is_empty() {
        parts.push(buffer);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content() {
        assert!(chunk_text("", 800).is_empty());
        assert!(chunk_text("  \n\t ", 800).is_empty());
    }

    #[test]
    fn test_short_content_is_single_trimmed_chunk() {
        let chunks = chunk_text("  Fever for three days. Cough.  ", 800);
        assert_eq!(chunks, vec!["Fever for three days. Cough.".to_string()]);
    }

    #[test]
    fn test_splits_on_sentence_boundaries() {
        let chunks = chunk_text("aaaa. bbbb. cccc.", 8);
        assert_eq!(chunks, vec!["aaaa.", " bbbb.", " cccc."]);
        for c in &chunks {
            assert!(c.chars().count() <= 8);
        }
    }

    #[test]
    fn test_accumulates_until_limit() {
        let chunks = chunk_text("ab. cd. ef.", 7);
        assert_eq!(chunks, vec!["ab. cd.", " ef."]);
    }

    #[test]
    fn test_cjk_terminators_and_char_counting() {
        let chunks = chunk_text("发热三天。咳嗽！无胸痛？", 7);
        assert_eq!(chunks, vec!["发热三天。", "咳嗽！无胸痛？"]);
    }

    #[test]
    fn test_oversized_sentence_kept_whole() {
        let long = "x".repeat(20);
        let chunks = chunk_text(&format!("{}. y.", long), 10);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 21);
    }

    #[test]
    fn test_concatenation_preserves_text() {
        let text = "One. Two!\nThree? Four";
        assert_eq!(chunk_text(text, 6).concat(), text);
    }
}
