//! Orquestación del asesor: valida la entrada, construye el prompt, llama al
//! modelo de texto y prepara la salida para la página.

use async_trait::async_trait;
use pulldown_cmark::{html, Event, Options, Parser};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::i18n::Language;
use crate::models::UserProfile;
use crate::prompt::build_advisory_prompt;

/// Generación de texto a partir de un único prompt de usuario.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Error)]
pub enum AdviceError {
    /// Ni portada ni título: no se llama al modelo.
    #[error("{0}")]
    MissingInput(&'static str),
    #[error("fallo generando el análisis: {0}")]
    Generation(#[source] anyhow::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub title: String,
    /// El usuario subió una portada (aunque no se detectase título).
    #[serde(default)]
    pub has_image: bool,
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub lang: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResponse {
    pub detected_line: String,
    pub markdown: String,
    pub html: String,
}

/// Frase de la sección "libro detectado".
pub fn detected_line(title: &str) -> String {
    match title.trim() {
        "" => "A book was detected but title was not recognized. Please enter it manually next time."
            .to_string(),
        t => format!("The visible book is titled **\"{t}\"**."),
    }
}

/// Convierte el markdown devuelto por el modelo a HTML para la página.
///
/// El HTML crudo del modelo se emite como texto escapado: la página inserta
/// el resultado con `innerHTML`.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

pub async fn analyze(
    generator: &dyn TextGenerator,
    request: &AnalysisRequest,
) -> Result<AnalysisResponse, AdviceError> {
    let title = request.title.trim();
    if title.is_empty() && !request.has_image {
        return Err(AdviceError::MissingInput(request.lang.strings().missing_input));
    }

    let profile = request.profile.clone().normalized();
    let prompt = build_advisory_prompt(title, &profile, request.lang);
    info!("Analizando '{}' ({:?})", title, request.lang);

    let markdown = generator
        .generate(&prompt)
        .await
        .map_err(AdviceError::Generation)?;

    Ok(AnalysisResponse {
        detected_line: detected_line(title),
        html: render_markdown(&markdown),
        markdown,
    })
}
