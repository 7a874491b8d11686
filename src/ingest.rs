//! Ingesta de una carpeta de PDFs en la colección vectorial: extracción de
//! texto, chunking con solape, embeddings y persistencia con metadatos
//! `{source, chunk}`.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::{
    chunker::ChunkConfig,
    models::{ChunkMetadata, ChunkNode, StoredChunk},
    vector_store::{EmbeddingFunction, VectorStore},
};

/// Máximo de textos por llamada de embeddings.
pub const EMBED_BATCH_SIZE: usize = 64;

/// Extrae el texto completo de un documento.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Extractor de producción basado en `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        pdf_extract::extract_text(path)
            .map_err(|e| anyhow!("No se pudo extraer texto del PDF {}: {}", path.display(), e))
    }
}

/// Resumen de los resultados de una operación de ingesta.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestionSummary {
    pub files_scanned: u32,
    pub files_ingested: u32,
    pub files_skipped: u32,
    pub chunks_created: usize,
}

impl IngestionSummary {
    /// Mensaje final para el usuario del binario.
    pub fn report(&self, root: &Path) -> String {
        if self.chunks_created == 0 {
            format!("⚠️ No PDFs found in the '{}' folder.", root.display())
        } else {
            format!(
                "✅ Ingested {} chunks from {} PDFs.",
                self.chunks_created, self.files_ingested
            )
        }
    }
}

impl std::fmt::Display for IngestionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Resumen: {} PDFs escaneados, {} ingeridos, {} omitidos. {} chunks creados.",
            self.files_scanned, self.files_ingested, self.files_skipped, self.chunks_created
        )
    }
}

/// Lista los ficheros `.pdf` (sin distinguir mayúsculas) directamente dentro
/// de `root`, ordenados por nombre.
pub fn list_pdfs(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(anyhow!("La ruta no es un directorio: {}", root.display()));
    }

    let pdfs = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_pdf(e.path()))
        .map(|e| e.into_path())
        .collect();
    Ok(pdfs)
}

/// Coincide por nombre: `.pdf` (sin base) también cuenta.
fn is_pdf(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().to_lowercase().ends_with(".pdf"))
}

/// Divide el texto de un documento en chunks con id nuevo y su índice.
pub fn build_chunks(source: &str, text: &str, config: &ChunkConfig) -> Vec<ChunkNode> {
    config
        .split(text)
        .into_iter()
        .enumerate()
        .map(|(index, text)| ChunkNode {
            id: Uuid::new_v4().to_string(),
            text,
            metadata: ChunkMetadata {
                source: source.to_string(),
                chunk: index,
            },
        })
        .collect()
}

/// Recorre la carpeta, trocea cada PDF y añade todos los chunks a la
/// colección. No escribe nada si no se generó ningún chunk.
pub async fn ingest_folder(
    root: &Path,
    extractor: &dyn TextExtractor,
    embedder: &dyn EmbeddingFunction,
    store: &dyn VectorStore,
    config: &ChunkConfig,
) -> Result<IngestionSummary> {
    let mut summary = IngestionSummary::default();
    let mut chunks: Vec<ChunkNode> = Vec::new();

    let pdfs = list_pdfs(root)?;
    let total = pdfs.len();

    for (index, path) in pdfs.iter().enumerate() {
        summary.files_scanned += 1;
        let filename = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        info!("[{}/{}] Procesando: {}...", index + 1, total, filename);

        let text = match extractor.extract(path) {
            Ok(text) => text,
            Err(err) => {
                summary.files_skipped += 1;
                error!("Error ingiriendo {}: {err}", path.display());
                continue;
            }
        };

        let doc_chunks = build_chunks(&filename, &text, config);
        if doc_chunks.is_empty() {
            summary.files_skipped += 1;
            warn!("Fichero vacío o sin texto útil: {}", path.display());
            continue;
        }

        summary.files_ingested += 1;
        chunks.extend(doc_chunks);
    }

    if chunks.is_empty() {
        return Ok(summary);
    }

    let ingested_at = Utc::now().to_rfc3339();
    let mut records = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed(texts).await?;
        if vectors.len() != batch.len() {
            return Err(anyhow!(
                "Número de embeddings ({}) distinto al número de chunks ({})",
                vectors.len(),
                batch.len()
            ));
        }
        records.extend(batch.iter().zip(vectors).map(|(chunk, embedding)| StoredChunk {
            id: chunk.id.clone(),
            document: chunk.text.clone(),
            metadata: chunk.metadata.clone(),
            embedding,
            ingested_at: ingested_at.clone(),
        }));
    }

    summary.chunks_created = records.len();
    store.add(records).await?;

    info!("{}", summary);
    Ok(summary)
}
