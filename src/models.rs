//! Modelos de dominio: chunks persistidos, perfil del usuario y portadas.

use serde::{Deserialize, Deserializer, Serialize};

/// Metadatos guardados junto a cada chunk en la colección.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Nombre del fichero PDF de origen.
    pub source: String,
    /// Índice (desde 0) del chunk dentro de su documento.
    pub chunk: usize,
}

/// Trozo de texto listo para embeddings. Inmutable una vez creado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkNode {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Registro tal y como se escribe en la colección (una fila SQLite).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub id: String,
    pub document: String,
    pub metadata: ChunkMetadata,
    pub embedding: Vec<f64>,
    pub ingested_at: String,
}

/// Curso académico del usuario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudyYear {
    #[default]
    Freshman,
    Sophomore,
    Junior,
    Senior,
    Graduate,
}

impl StudyYear {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Freshman => "Freshman",
            Self::Sophomore => "Sophomore",
            Self::Junior => "Junior",
            Self::Senior => "Senior",
            Self::Graduate => "Graduate",
        }
    }
}

pub const MIN_AGE: u8 = 10;
pub const MAX_AGE: u8 = 80;
const DEFAULT_AGE: u8 = 19;

/// Acepta cualquier número (o `null`) y lo acota a `MIN_AGE..=MAX_AGE`.
fn lenient_age<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(match raw {
        Some(age) if age.is_finite() => age.round().clamp(MIN_AGE as f64, MAX_AGE as f64) as u8,
        _ => DEFAULT_AGE,
    })
}

/// Perfil efímero del usuario, sólo vive durante una petición.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub goal: String,
    #[serde(deserialize_with = "lenient_age")]
    pub age: u8,
    pub school: String,
    pub year: StudyYear,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            goal: String::new(),
            age: DEFAULT_AGE,
            school: String::new(),
            year: StudyYear::default(),
        }
    }
}

impl UserProfile {
    /// Devuelve el perfil con la edad acotada al rango del formulario.
    pub fn normalized(mut self) -> Self {
        self.age = self.age.clamp(MIN_AGE, MAX_AGE);
        self
    }
}

/// Imagen de portada subida por el usuario.
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}
