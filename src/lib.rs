//! Shelf Scanner (Bibuuk AI): asesor de libros y objetivos.
//!
//! Dos flujos independientes que no comparten datos:
//!
//! - **Asesor** (`shelf_scanner`): servidor web que lee el título de una
//!   portada con un modelo de visión (con OCR local opcional de respaldo) y
//!   pide al modelo de texto un ensayo en markdown sobre si el libro encaja
//!   con los objetivos del usuario.
//! - **Ingesta** (`ingest`): trocea PDFs en ventanas solapadas y los guarda
//!   con su embedding en una colección vectorial en disco. El asesor nunca
//!   consulta esta colección.

pub mod advisor;
pub mod api;
pub mod app_state;
pub mod chunker;
pub mod config;
pub mod i18n;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod title;
pub mod vector_store;

/// Inicializa el logging con `RUST_LOG` (por defecto `info`).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
