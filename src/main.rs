use std::process::ExitCode;
use std::sync::Arc;

use axum::Router;
use shelf_scanner::{
    api,
    app_state::AppState,
    config::AppConfig,
    llm::LlmManager,
    title::{TesseractTitleReader, TitleDetector, TitleSource, VisionTitleReader},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    shelf_scanner::init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    // 2. Cargar configuración
    let cfg = AppConfig::from_env()?;

    // 3. Cliente LLM único y cadena de detección: visión y, opcionalmente, OCR
    let llm = Arc::new(LlmManager::from_config(&cfg));
    let vision = VisionTitleReader::new(llm.clone());
    let fallback: Option<Box<dyn TitleSource>> = if cfg.ocr_enabled {
        info!("Respaldo OCR (tesseract) activado.");
        Some(Box::new(TesseractTitleReader::new()))
    } else {
        None
    };

    // 4. Estado compartido de la aplicación
    let app_state = AppState {
        config: cfg.clone(),
        generator: llm,
        title_detector: Arc::new(TitleDetector::new(Box::new(vision), fallback)),
    };

    // 5. Router de la API y servicio de ficheros estáticos
    let app = Router::new()
        .merge(api::create_router(app_state))
        .fallback_service(ServeDir::new("frontend"))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // 6. Iniciar el servidor
    let listener = tokio::net::TcpListener::bind(&cfg.server_addr).await?;
    let server_url = format!("http://{}", cfg.server_addr);
    info!("🚀 Servidor escuchando en {}", &server_url);

    if cfg.open_browser && webbrowser::open(&server_url).is_err() {
        info!("No se pudo abrir el navegador. Por favor, accede a {} manualmente.", server_url);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Señal de apagado recibida, iniciando cierre del servidor.");
        })
        .await?;

    info!("✅ Servidor cerrado correctamente.");
    Ok(())
}
