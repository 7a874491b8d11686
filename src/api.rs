use axum::{
    extract::{DefaultBodyLimit, Json, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::{
    advisor::{self, AdviceError, AnalysisRequest, AnalysisResponse},
    app_state::AppState,
    i18n::{Language, UiStrings},
    models::CoverImage,
    title::{TitleOutcome, ACCEPTED_EXTENSIONS},
};

/// Tamaño máximo de la imagen decodificada.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

type ApiError = (StatusCode, Json<serde_json::Value>);

// --- Payloads de la API ---

#[derive(Deserialize)]
pub struct DetectTitlePayload {
    filename: String,
    /// Contenido de la imagen en base64 (sin prefijo `data:`).
    image_base64: String,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/strings/:lang", get(strings_handler))
        .route("/api/detect-title", post(detect_title_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/status", get(status_handler))
        // base64 ocupa ~4/3 del binario
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES / 3 * 4 + 64 * 1024))
        .with_state(app_state)
}

// --- Handlers ---

fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message.into() })))
}

#[axum::debug_handler]
async fn strings_handler(Path(lang): Path<String>) -> Result<Json<&'static UiStrings>, ApiError> {
    let lang = Language::from_str(&lang).map_err(|e| bad_request(e.to_string()))?;
    Ok(Json(lang.strings()))
}

/// Valida el nombre y decodifica la imagen subida.
pub fn cover_from_payload(filename: &str, image_base64: &str) -> Result<CoverImage, String> {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(format!(
            "Formato de imagen no soportado ('{filename}'). Use jpg, jpeg o png."
        ));
    }

    let bytes = STANDARD
        .decode(image_base64.trim())
        .map_err(|e| format!("Imagen en base64 inválida: {e}"))?;
    if bytes.is_empty() {
        return Err("La imagen está vacía.".to_string());
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err("La imagen supera el tamaño máximo de 10 MiB.".to_string());
    }

    let mime_type = mime_guess::from_path(filename)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "image/png".to_string());

    Ok(CoverImage {
        filename: filename.to_string(),
        mime_type,
        bytes,
    })
}

#[axum::debug_handler]
async fn detect_title_handler(
    State(state): State<AppState>,
    Json(payload): Json<DetectTitlePayload>,
) -> Result<Json<TitleOutcome>, ApiError> {
    let cover = cover_from_payload(&payload.filename, &payload.image_base64).map_err(bad_request)?;
    Ok(Json(state.title_detector.detect(&cover).await))
}

#[axum::debug_handler]
async fn analyze_handler(
    State(state): State<AppState>,
    Json(payload): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    match advisor::analyze(state.generator.as_ref(), &payload).await {
        Ok(response) => Ok(Json(response)),
        Err(AdviceError::MissingInput(warning)) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "warning": warning })),
        )),
        Err(e @ AdviceError::Generation(_)) => {
            error!("Error en el análisis: {:#}", anyhow::Error::from(e));
            Err((
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "Error al generar el análisis. Inténtelo de nuevo." })),
            ))
        }
    }
}

#[axum::debug_handler]
async fn status_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "chat_model": state.config.llm_chat_model,
        "ocr_enabled": state.config.ocr_enabled,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::advisor::TextGenerator;
    use crate::config::{parse_base_url, AppConfig};
    use crate::title::{TitleDetector, TitleError, TitleSource};

    struct StubGenerator {
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            if self.fail {
                anyhow::bail!("proveedor caído");
            }
            Ok("Rating: Good fit.".to_string())
        }
    }

    struct StubTitle;

    #[async_trait]
    impl TitleSource for StubTitle {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn read_title(&self, _image: &CoverImage) -> Result<String, TitleError> {
            Ok("Dune".to_string())
        }
    }

    fn router(fail: bool) -> Router {
        let config = AppConfig {
            server_addr: "127.0.0.1:0".into(),
            open_browser: false,
            openai_api_key: "sk-test".into(),
            openai_base_url: parse_base_url("http://localhost:9/v1").unwrap(),
            llm_chat_model: "gpt-4o-mini".into(),
            llm_vision_model: "gpt-4o-mini".into(),
            ocr_enabled: false,
        };
        create_router(AppState {
            config,
            generator: Arc::new(StubGenerator { fail }),
            title_detector: Arc::new(TitleDetector::new(Box::new(StubTitle), None)),
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn analyze_without_input_is_a_warning() {
        let (status, body) = send(router(false), post_json("/api/analyze", json!({"title": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["warning"], "Please upload a cover or enter a book title.");
    }

    #[tokio::test]
    async fn analyze_generation_failure_is_bad_gateway() {
        let (status, body) = send(router(true), post_json("/api/analyze", json!({"title": "Dune"}))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn analyze_returns_markdown_and_html() {
        let request = post_json(
            "/api/analyze",
            json!({"title": "Dune", "profile": {"age": 300}, "lang": "EN"}),
        );
        let (status, body) = send(router(false), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["markdown"], "Rating: Good fit.");
        assert_eq!(body["html"], "<p>Rating: Good fit.</p>\n");
        assert_eq!(body["detected_line"], "The visible book is titled **\"Dune\"**.");
    }

    #[tokio::test]
    async fn detect_title_rejects_gif() {
        let request = post_json(
            "/api/detect-title",
            json!({"filename": "cover.gif", "image_base64": "AQID"}),
        );
        let (status, body) = send(router(false), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("cover.gif"));
    }

    #[tokio::test]
    async fn detect_title_uses_the_detector() {
        let request = post_json(
            "/api/detect-title",
            json!({"filename": "cover.png", "image_base64": "AQID"}),
        );
        let (status, body) = send(router(false), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"source": "vision", "title": "Dune"}));
    }

    #[tokio::test]
    async fn unknown_language_is_rejected() {
        let request = Request::get("/api/strings/xx").body(Body::empty()).unwrap();
        let (status, body) = send(router(false), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let request = Request::get("/api/strings/ru").body(Body::empty()).unwrap();
        let (status, _) = send(router(false), request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn accepts_supported_covers() {
        let cover = cover_from_payload("Portada.JPG", "AQID").unwrap();
        assert_eq!(cover.mime_type, "image/jpeg");
        assert_eq!(cover.bytes, vec![1, 2, 3]);

        let cover = cover_from_payload("cover.png", "AQID").unwrap();
        assert_eq!(cover.mime_type, "image/png");
    }

    #[test]
    fn rejects_other_formats_and_bad_payloads() {
        assert!(cover_from_payload("cover.gif", "AQID").is_err());
        assert!(cover_from_payload("cover", "AQID").is_err());
        assert!(cover_from_payload("cover.png", "***").is_err());
        assert!(cover_from_payload("cover.png", "").is_err());
    }
}
