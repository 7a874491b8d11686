//! Abstracción sobre Rig para el proveedor OpenAI: embeddings para la
//! ingesta, visión para leer portadas y generación de texto para el asesor.
//!
//! Un único cliente, construido a partir de la configuración (clave y URL
//! base), atiende todas las llamadas.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rig::completion::Prompt;
use rig::embeddings::EmbeddingModel; // <- para .embed_texts
use rig::message::{ImageMediaType, Message, MimeType as _, UserContent};
use rig::providers::openai;
use rig::OneOrMany;
use url::Url;

use crate::advisor::TextGenerator;
use crate::config::{AppConfig, IngestConfig};
use crate::models::CoverImage;
use crate::vector_store::EmbeddingFunction;

const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const ADVICE_TEMPERATURE: f64 = 0.7;
const VISION_TEMPERATURE: f64 = 0.2;

/// Cliente OpenAI de Rig apuntando a `base_url`.
pub fn openai_client(api_key: &str, base_url: &Url) -> openai::Client {
    // Rig concatena `{base_url}/{ruta}`: sin barra final.
    openai::Client::builder(api_key)
        .base_url(base_url.as_str().trim_end_matches('/'))
        .build()
}

/// Tipo de imagen para Rig a partir del MIME; PNG si no se reconoce.
pub fn image_media_type(mime_type: &str) -> ImageMediaType {
    ImageMediaType::from_mime_type(mime_type).unwrap_or(ImageMediaType::PNG)
}

/// Gestor de LLMs y embeddings.
#[derive(Debug, Clone)]
pub struct LlmManager {
    client: openai::Client,
    pub embedding_model: String,
    pub chat_model: String,
    pub vision_model: String,
}

impl LlmManager {
    /// Construye el manager para el servidor web.
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            client: openai_client(&cfg.openai_api_key, &cfg.openai_base_url),
            embedding_model: String::new(),
            chat_model: cfg.llm_chat_model.clone(),
            vision_model: cfg.llm_vision_model.clone(),
        }
    }

    /// Construye el manager para el binario de ingesta.
    pub fn for_ingestion(cfg: &IngestConfig) -> Self {
        Self {
            client: openai_client(&cfg.openai_api_key, &cfg.openai_base_url),
            embedding_model: cfg.llm_embedding_model.clone(),
            chat_model: String::new(),
            vision_model: String::new(),
        }
    }

    fn model_or_default<'a>(model: &'a str) -> &'a str {
        if model.is_empty() {
            DEFAULT_CHAT_MODEL
        } else {
            model
        }
    }

    // ---------------------------------------------------------------------
    // EMBEDDINGS
    // ---------------------------------------------------------------------

    /// Calcula embeddings para una lista de textos, en el mismo orden.
    pub async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>> {
        use rig::providers::openai::TEXT_EMBEDDING_3_SMALL;
        // Trait para client.embedding_model(...)
        use rig::client::EmbeddingsClient as _;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Modelo de embeddings: config o default
        let model_name = if self.embedding_model.is_empty() {
            TEXT_EMBEDDING_3_SMALL
        } else {
            self.embedding_model.as_str()
        };
        let embedding_model = self.client.embedding_model(model_name);

        let expected = texts.len();
        let embeddings = embedding_model.embed_texts(texts).await?;

        if embeddings.len() != expected {
            return Err(anyhow!(
                "Número de embeddings ({}) distinto al número de textos ({})",
                embeddings.len(),
                expected
            ));
        }

        Ok(embeddings.into_iter().map(|e| e.vec).collect())
    }

    // ---------------------------------------------------------------------
    // CHAT / COMPLETION
    // ---------------------------------------------------------------------

    /// Envía un único prompt de usuario y devuelve el texto tal cual.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        // Trait para client.agent(...)
        use rig::client::CompletionClient as _;

        let agent = self
            .client
            .agent(Self::model_or_default(&self.chat_model))
            .temperature(ADVICE_TEMPERATURE)
            .build();

        let answer = agent.prompt(prompt).await?;
        Ok(answer)
    }

    /// Envía una instrucción junto a una imagen (en base64) al modelo de visión.
    pub async fn describe_image(&self, instruction: &str, image: &CoverImage) -> Result<String> {
        use rig::client::CompletionClient as _;

        let content = OneOrMany::many(vec![
            UserContent::text(instruction),
            UserContent::image_base64(
                STANDARD.encode(&image.bytes),
                Some(image_media_type(&image.mime_type)),
                None,
            ),
        ])
        .map_err(|e| anyhow!("Mensaje de visión vacío: {e}"))?;

        let agent = self
            .client
            .agent(Self::model_or_default(&self.vision_model))
            .temperature(VISION_TEMPERATURE)
            .build();

        let answer = agent.prompt(Message::User { content }).await?;
        Ok(answer)
    }
}

#[async_trait]
impl EmbeddingFunction for LlmManager {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>> {
        self.embed_texts(texts).await
    }
}

#[async_trait]
impl TextGenerator for LlmManager {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_cover_mime_types() {
        assert!(matches!(image_media_type("image/jpeg"), ImageMediaType::JPEG));
        assert!(matches!(image_media_type("image/png"), ImageMediaType::PNG));
        assert!(matches!(image_media_type("application/octet-stream"), ImageMediaType::PNG));
    }

    #[test]
    fn one_client_uses_the_configured_base_url() {
        let cfg = AppConfig {
            server_addr: "127.0.0.1:0".into(),
            open_browser: false,
            openai_api_key: "sk-secreta".into(),
            openai_base_url: crate::config::parse_base_url("http://localhost:11434/v1").unwrap(),
            llm_chat_model: "llama3".into(),
            llm_vision_model: "llava".into(),
            ocr_enabled: false,
        };
        let llm = LlmManager::from_config(&cfg);
        let debug = format!("{llm:?}");
        assert!(debug.contains("\"http://localhost:11434/v1\""));
        assert!(!debug.contains("sk-secreta"));
        assert_eq!(llm.chat_model, "llama3");
        assert_eq!(llm.vision_model, "llava");
    }

    #[test]
    fn chat_model_falls_back_to_default() {
        assert_eq!(LlmManager::model_or_default(""), "gpt-4o-mini");
        assert_eq!(LlmManager::model_or_default("gpt-4o"), "gpt-4o");
    }
}
