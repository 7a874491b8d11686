//! Ingesta de una carpeta de PDFs en la colección vectorial local.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use shelf_scanner::{
    chunker::ChunkConfig,
    config::IngestConfig,
    ingest::{self, PdfTextExtractor},
    llm::LlmManager,
    vector_store::LocalCollection,
};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "ingest", about = "Ingiere PDFs en la colección vectorial", version)]
struct Cli {
    /// Carpeta con los PDFs (por defecto DATA_DIR o `data`)
    folder: Option<PathBuf>,

    /// Directorio de la colección (por defecto CHROMA_DIR o `chroma`)
    #[arg(long)]
    chroma_dir: Option<PathBuf>,

    /// Nombre de la colección (por defecto COLLECTION o `bibuuk_books`)
    #[arg(long)]
    collection: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    shelf_scanner::init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error en la ingesta: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut cfg = IngestConfig::from_env()?;
    if let Some(folder) = cli.folder {
        cfg.data_dir = folder;
    }
    if let Some(dir) = cli.chroma_dir {
        cfg.chroma_dir = dir;
    }
    if let Some(name) = cli.collection {
        cfg.collection = name;
    }

    let collection = LocalCollection::open(&cfg.chroma_dir, &cfg.collection)?;
    let llm = LlmManager::for_ingestion(&cfg);

    info!("Iniciando ingesta de {}...", cfg.data_dir.display());
    let summary = ingest::ingest_folder(
        &cfg.data_dir,
        &PdfTextExtractor,
        &llm,
        &collection,
        &ChunkConfig::default(),
    )
    .await?;

    let report = summary.report(&cfg.data_dir);
    if summary.chunks_created == 0 {
        warn!("{}", summary);
    } else {
        info!("{}", summary);
    }
    println!("{report}");
    Ok(())
}
