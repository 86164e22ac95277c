use crate::types::{Article, Chunk};

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Fixed-window text splitter. Windows are measured in characters so
/// multi-byte content never splits mid-codepoint.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl TextSplitter {
    /// An overlap as large as the window would never advance; clamp it to a
    /// quarter of the window in that case.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_overlap = if chunk_overlap >= chunk_size {
            chunk_size / 4
        } else {
            chunk_overlap
        };
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        if self.chunk_size == 0 {
            return vec![text.to_string()];
        }

        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < len {
            let end = (start + self.chunk_size).min(len);
            let piece: String = chars[start..end].iter().collect();
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }
            if end == len {
                break;
            }
            start = end.saturating_sub(self.chunk_overlap);
        }

        chunks
    }

    /// Derives the chunk records for an article. Deterministic: the same
    /// article always yields the same chunks in the same positions.
    pub fn chunk_article(&self, article: &Article) -> Vec<Chunk> {
        let pieces = self.split(&article.content);
        let total = pieces.len();
        pieces
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk {
                url: article.url.clone(),
                title: article.title.clone(),
                source: article.source.clone(),
                text,
                index,
                total,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article(content: &str) -> Article {
        Article {
            url: "https://example.com/a".to_string(),
            title: "Test".to_string(),
            content: content.to_string(),
            source: "test".to_string(),
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn test_chunks_respect_max_length() {
        let splitter = TextSplitter::default();
        let text = "word ".repeat(1000);
        for chunk in splitter.split(&text) {
            assert!(chunk.chars().count() <= DEFAULT_CHUNK_SIZE);
        }
    }

    #[test]
    fn test_neighbors_overlap() {
        let splitter = TextSplitter::new(10, 4);
        let text: String = ('a'..='z').collect();
        let chunks = splitter.split(&text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().rev().take(4).collect::<Vec<_>>()
                .into_iter().rev().collect();
            assert!(pair[1].starts_with(&tail));
        }
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = TextSplitter::default();
        let chunks = splitter.split("short text");
        assert_eq!(chunks, vec!["short text".to_string()]);
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        let splitter = TextSplitter::default();
        assert!(splitter.split("   \n\n  ").is_empty());
    }

    #[test]
    fn test_overlap_clamped_when_too_large() {
        let splitter = TextSplitter::new(8, 8);
        assert_eq!(splitter.chunk_overlap(), 2);
        // Must terminate even with a degenerate overlap request.
        let chunks = splitter.split(&"x".repeat(100));
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_chunk_article_positions() {
        let splitter = TextSplitter::new(10, 2);
        let chunks = splitter.chunk_article(&article(&"abcdefghij".repeat(3)));
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.total, chunks.len());
            assert_eq!(chunk.url, "https://example.com/a");
        }
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let splitter = TextSplitter::default();
        let a = article(&"insurance coverage details. ".repeat(50));
        assert_eq!(
            splitter.chunk_article(&a).len(),
            splitter.chunk_article(&a).len()
        );
        let first = splitter.chunk_article(&a);
        let second = splitter.chunk_article(&a);
        for (x, y) in first.iter().zip(second.iter()) {
            assert_eq!(x.text, y.text);
        }
    }
}
