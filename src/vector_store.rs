//! Colección vectorial persistente en SQLite para los chunks ingeridos.
//!
//! Cada colección es una base de datos `<dir>/<nombre>.sqlite` con una tabla
//! `chunks` a la que sólo se añaden registros; nunca se modifican ni se
//! borran.
//!
//! API pública:
//!   - `EmbeddingFunction` / `VectorStore` (traits usados por la ingesta)
//!   - `LocalCollection::open(&Path, &str)`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use tracing::info;

use crate::models::{ChunkMetadata, StoredChunk};

/// Convierte textos en vectores. La salida conserva el orden de entrada.
#[async_trait]
pub trait EmbeddingFunction: Send + Sync {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>>;
}

/// Destino de los chunks con su embedding.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn add(&self, records: Vec<StoredChunk>) -> Result<()>;
}

pub struct LocalCollection {
    name: String,
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for LocalCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCollection")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

impl LocalCollection {
    /// Abre (o crea) la colección `name` dentro de `dir`.
    pub fn open(dir: &Path, name: &str) -> Result<Self> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(anyhow!("Nombre de colección inválido: '{name}'"));
        }
        std::fs::create_dir_all(dir)
            .with_context(|| format!("No se pudo crear el directorio {}", dir.display()))?;
        let path = dir.join(format!("{name}.sqlite"));

        let conn = Connection::open(&path)
            .with_context(|| format!("No se pudo abrir {}", path.display()))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                document TEXT NOT NULL,
                source TEXT NOT NULL,
                chunk INTEGER NOT NULL,
                embedding BLOB NOT NULL,
                dimensions INTEGER NOT NULL,
                ingested_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source, chunk);
            "#,
        )?;

        info!("Colección '{}' en {}", name, path.display());
        Ok(Self {
            name: name.to_string(),
            path,
            conn: Mutex::new(conn),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lee todos los registros guardados, en orden de inserción.
    pub fn read_all(&self) -> Result<Vec<StoredChunk>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Conexión SQLite envenenada"))?;
        let mut stmt = conn.prepare(
            "SELECT id, document, source, chunk, embedding, ingested_at FROM chunks ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            let chunk: i64 = row.get(3)?;
            let blob: Vec<u8> = row.get(4)?;
            Ok(StoredChunk {
                id: row.get(0)?,
                document: row.get(1)?,
                metadata: ChunkMetadata {
                    source: row.get(2)?,
                    chunk: chunk as usize,
                },
                embedding: decode_embedding(&blob),
                ingested_at: row.get(5)?,
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("Error leyendo {}", self.path.display()))
    }
}

fn encode_embedding(vector: &[f64]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Vec<f64> {
    blob.chunks_exact(8)
        .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
        .collect()
}

#[async_trait]
impl VectorStore for LocalCollection {
    async fn add(&self, records: Vec<StoredChunk>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Conexión SQLite envenenada"))?;
        let tx = conn.transaction()?;
        for record in &records {
            tx.execute(
                "INSERT INTO chunks (id, document, source, chunk, embedding, dimensions, ingested_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id,
                    record.document,
                    record.metadata.source,
                    record.metadata.chunk as i64,
                    encode_embedding(&record.embedding),
                    record.embedding.len() as i64,
                    record.ingested_at,
                ],
            )?;
        }
        tx.commit()?;

        info!("{} registros añadidos a la colección '{}'", records.len(), self.name);
        Ok(())
    }
}
