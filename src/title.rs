//! Detección del título de un libro a partir de la foto de su portada.
//!
//! Cadena explícita de dos pasos: primero el modelo de visión; si declara un
//! fallo, el OCR local (opcional); si éste también falla, `NotFound`.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::llm::LlmManager;
use crate::models::CoverImage;

const VISION_INSTRUCTION: &str =
    "Read the book cover and return ONLY the most likely title and author as plain text.";
const OCR_MAX_CHARS: usize = 120;

/// Extensiones de imagen aceptadas por el formulario.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum TitleError {
    #[error("fallo del modelo de visión: {0}")]
    Vision(String),
    #[error("respuesta sin contenido")]
    Empty,
    #[error("fallo ejecutando OCR: {0}")]
    Ocr(String),
}

/// Una fuente capaz de leer el título de una portada.
#[async_trait]
pub trait TitleSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn read_title(&self, image: &CoverImage) -> Result<String, TitleError>;
}

/// Resultado de la cadena de detección.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "title", rename_all = "snake_case")]
pub enum TitleOutcome {
    Vision(String),
    Ocr(String),
    NotFound,
}

impl TitleOutcome {
    /// Título detectado, o cadena vacía si no se encontró.
    pub fn title(&self) -> &str {
        match self {
            Self::Vision(t) | Self::Ocr(t) => t,
            Self::NotFound => "",
        }
    }
}

pub struct TitleDetector {
    primary: Box<dyn TitleSource>,
    fallback: Option<Box<dyn TitleSource>>,
}

impl TitleDetector {
    pub fn new(primary: Box<dyn TitleSource>, fallback: Option<Box<dyn TitleSource>>) -> Self {
        Self { primary, fallback }
    }

    pub async fn detect(&self, image: &CoverImage) -> TitleOutcome {
        match self.primary.read_title(image).await {
            Ok(title) => {
                info!("Título detectado por {}: {}", self.primary.name(), title);
                return TitleOutcome::Vision(title);
            }
            Err(e) => warn!("{} no pudo leer la portada: {}", self.primary.name(), e),
        }

        let Some(fallback) = &self.fallback else {
            return TitleOutcome::NotFound;
        };

        match fallback.read_title(image).await {
            Ok(title) => {
                info!("Título detectado por {}: {}", fallback.name(), title);
                TitleOutcome::Ocr(title)
            }
            Err(e) => {
                warn!("{} no pudo leer la portada: {}", fallback.name(), e);
                TitleOutcome::NotFound
            }
        }
    }
}

// ---------------------------------------------------------------------
// VISIÓN (modelo multimodal vía Rig)
// ---------------------------------------------------------------------

/// Lee el título pidiéndoselo al modelo de visión del `LlmManager`.
pub struct VisionTitleReader {
    llm: Arc<LlmManager>,
}

impl VisionTitleReader {
    pub fn new(llm: Arc<LlmManager>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl TitleSource for VisionTitleReader {
    fn name(&self) -> &'static str {
        "visión"
    }

    async fn read_title(&self, image: &CoverImage) -> Result<String, TitleError> {
        let answer = self
            .llm
            .describe_image(VISION_INSTRUCTION, image)
            .await
            .map_err(|e| TitleError::Vision(format!("{e:#}")))?;

        let title = answer.trim();
        if title.is_empty() {
            return Err(TitleError::Empty);
        }
        Ok(title.to_string())
    }
}

// ---------------------------------------------------------------------
// OCR LOCAL (tesseract)
// ---------------------------------------------------------------------

/// Ejecuta `tesseract stdin stdout` sobre los bytes de la imagen.
pub struct TesseractTitleReader {
    program: String,
    args: Vec<String>,
}

impl TesseractTitleReader {
    pub fn new() -> Self {
        Self::with_program("tesseract")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self::with_command(program, ["stdin", "stdout"])
    }

    /// Programa y argumentos arbitrarios; la imagen llega siempre por stdin.
    pub fn with_command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for TesseractTitleReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Elige la línea no vacía más larga, recortada a 120 caracteres.
pub fn pick_title_line(ocr_text: &str) -> Option<String> {
    ocr_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .fold(None::<&str>, |best, line| match best {
            Some(b) if b.chars().count() >= line.chars().count() => Some(b),
            _ => Some(line),
        })
        .map(|line| line.chars().take(OCR_MAX_CHARS).collect())
}

#[async_trait]
impl TitleSource for TesseractTitleReader {
    fn name(&self) -> &'static str {
        "ocr"
    }

    async fn read_title(&self, image: &CoverImage) -> Result<String, TitleError> {
        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| TitleError::Ocr(format!("no se pudo lanzar {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&image.bytes)
                .await
                .map_err(|e| TitleError::Ocr(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| TitleError::Ocr(e.to_string()))?;
        if !output.status.success() {
            return Err(TitleError::Ocr(format!("{} terminó con {}", self.program, output.status)));
        }

        pick_title_line(&String::from_utf8_lossy(&output.stdout)).ok_or(TitleError::Empty)
    }
}
