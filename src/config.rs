//! Carga y gestión de configuración de la aplicación (servidor web + ingesta).

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

/// Configuración del servidor web y del flujo de asesoramiento.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,
    pub open_browser: bool,

    pub openai_api_key: String,
    pub openai_base_url: Url,
    pub llm_chat_model: String,
    pub llm_vision_model: String,

    /// Activa el respaldo OCR local (tesseract) cuando falla la visión.
    pub ocr_enabled: bool,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        let openai_api_key = require_api_key()?;
        let openai_base_url = base_url_from_env()?;

        let server_addr =
            env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8501".to_string());
        let open_browser = flag_from_env("OPEN_BROWSER", true);

        let llm_chat_model =
            env::var("LLM_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let llm_vision_model =
            env::var("LLM_VISION_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let ocr_enabled = flag_from_env("OCR_ENABLED", false);

        Ok(Self {
            server_addr,
            open_browser,
            openai_api_key,
            openai_base_url,
            llm_chat_model,
            llm_vision_model,
            ocr_enabled,
        })
    }
}

/// Configuración del binario de ingesta de PDFs.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub data_dir: PathBuf,
    pub chroma_dir: PathBuf,
    pub collection: String,

    pub openai_api_key: String,
    pub openai_base_url: Url,
    pub llm_embedding_model: String,
}

impl IngestConfig {
    pub fn from_env() -> Result<Self> {
        let openai_api_key = require_api_key()?;
        let openai_base_url = base_url_from_env()?;

        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let chroma_dir = env::var("CHROMA_DIR").unwrap_or_else(|_| "chroma".to_string());
        let collection = env::var("COLLECTION").unwrap_or_else(|_| "bibuuk_books".to_string());
        let llm_embedding_model = env::var("LLM_EMBEDDING_MODEL")
            .unwrap_or_else(|_| "text-embedding-3-small".to_string());

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            chroma_dir: PathBuf::from(chroma_dir),
            collection,
            openai_api_key,
            openai_base_url,
            llm_embedding_model,
        })
    }
}

fn require_api_key() -> Result<String> {
    let key = env::var("OPENAI_API_KEY")
        .map_err(|_| anyhow!("Falta OPENAI_API_KEY en el entorno"))?;
    if key.trim().is_empty() {
        return Err(anyhow!("OPENAI_API_KEY está vacía"));
    }
    Ok(key)
}

fn base_url_from_env() -> Result<Url> {
    let raw = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    parse_base_url(&raw)
}

/// Valida y normaliza la URL base con barra final, sin perder el último
/// segmento (p.ej. `/v1`).
pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| anyhow!("OPENAI_BASE_URL inválida ({raw}): {e}"))
}

fn flag_from_env(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| parse_flag(&v, default))
        .unwrap_or(default)
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
