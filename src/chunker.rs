//! División de texto en ventanas solapadas de tamaño fijo para embeddings.
//!
//! Los límites se calculan sobre caracteres (no bytes, ni palabras, ni
//! frases). Cada ventana avanza `size - overlap` caracteres salvo la última,
//! que puede ser más corta.

use thiserror::Error;

/// Tamaño de ventana por defecto usado por la ingesta.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Solape por defecto entre ventanas consecutivas.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    /// Con `overlap >= size` la ventana nunca avanzaría.
    #[error("configuración de chunking inválida: size={size}, overlap={overlap} (se requiere overlap < size)")]
    InvalidWindow { size: usize, overlap: usize },
}

/// Parámetros de la ventana deslizante, validados en la construcción.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    size: usize,
    overlap: usize,
}

impl ChunkConfig {
    pub fn new(size: usize, overlap: usize) -> Result<Self, ChunkingError> {
        if size == 0 || overlap >= size {
            return Err(ChunkingError::InvalidWindow { size, overlap });
        }
        Ok(Self { size, overlap })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Divide `text` con esta configuración.
    pub fn split(&self, text: &str) -> Vec<String> {
        sliding_window(text, self.size, self.overlap)
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Divide `text` en ventanas de `size` caracteres que se solapan `overlap`
/// caracteres. Cada ventana se recorta y las vacías se descartan.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Result<Vec<String>, ChunkingError> {
    Ok(ChunkConfig::new(size, overlap)?.split(text))
}

fn sliding_window(text: &str, size: usize, overlap: usize) -> Vec<String> {
    // Offsets en bytes de cada carácter, más el final del texto.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let n = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < n {
        let end = (start + size).min(n);
        let window = text[bounds[start]..bounds[end]].trim();
        if !window.is_empty() {
            chunks.push(window.to_string());
        }
        if end == n {
            break;
        }
        start = end - overlap;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_count(n: usize, size: usize, overlap: usize) -> usize {
        match n {
            0 => 0,
            n if n <= size => 1,
            n => (n - overlap).div_ceil(size - overlap),
        }
    }

    #[test]
    fn splits_with_overlap() {
        let chunks = chunk_text("ABCDEFGHIJ", 4, 2).unwrap();
        assert_eq!(chunks, vec!["ABCD", "CDEF", "EFGH", "GHIJ"]);
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert!(chunk_text("   ", 10, 2).unwrap().is_empty());
        assert!(chunk_text("", 10, 2).unwrap().is_empty());
    }

    #[test]
    fn short_text_is_single_trimmed_chunk() {
        assert_eq!(chunk_text("hello", 10, 2).unwrap(), vec!["hello"]);
        assert_eq!(chunk_text("  hello \n", 10, 2).unwrap(), vec!["hello"]);
    }

    #[test]
    fn rejects_non_advancing_window() {
        assert_eq!(
            chunk_text("abc", 4, 4),
            Err(ChunkingError::InvalidWindow { size: 4, overlap: 4 })
        );
        assert!(chunk_text("abc", 3, 7).is_err());
        assert!(ChunkConfig::new(0, 0).is_err());
    }

    #[test]
    fn count_and_length_follow_the_window_formula() {
        let text: String = ('a'..='z').cycle().take(1234).collect();
        for (size, overlap) in [(500, 100), (10, 3), (7, 0), (100, 99)] {
            let chunks = chunk_text(&text, size, overlap).unwrap();
            assert_eq!(chunks.len(), expected_count(1234, size, overlap), "size={size} overlap={overlap}");
            assert!(chunks.iter().all(|c| c.chars().count() <= size));
        }
    }

    #[test]
    fn consecutive_chunks_share_the_overlap() {
        let text: String = ('a'..='z').cycle().take(300).collect();
        let chunks = chunk_text(&text, 50, 10).unwrap();
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(40).collect();
            let head: String = pair[1].chars().take(10).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn offsets_are_characters_not_bytes() {
        let chunks = chunk_text("ЖЖЖЖЖЖ", 4, 2).unwrap();
        assert_eq!(chunks, vec!["ЖЖЖЖ", "ЖЖЖЖ"]);
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = "Deep Learning with Python ".repeat(80);
        let config = ChunkConfig::default();
        assert_eq!(config.split(&text), config.split(&text));
        assert_eq!(config.size(), 500);
        assert_eq!(config.overlap(), 100);
    }
}
