/// Loopcast Server - looping ICY audio stream
use clap::{Parser, Subcommand};
use loopcast_metadata::{LibraryScanner, LoftyTagReader};
use loopcast_server::{config::ServerConfig, create_router, state::AppState};
use loopcast_stream::{framer, StreamEngine, StreamError, TrackCatalog};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "loopcast-server")]
#[command(about = "Looping ICY audio streaming server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Configuration file path
        #[arg(short, long, env = "LOOPCAST_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the catalog that would be streamed from a directory
    Scan {
        /// Directory path to scan
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "loopcast_server=info,loopcast_stream=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            serve(config.as_deref()).await?;
        }
        Commands::Scan { path } => {
            scan_directory(&path)?;
        }
    }

    Ok(())
}

async fn serve(config_path: Option<&Path>) -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load(config_path)?;
    config.validate()?;

    tracing::info!("Starting Loopcast Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let audio_dir = &config.stream.audio_dir;
    if !audio_dir.exists() {
        tokio::fs::create_dir_all(audio_dir).await?;
        tracing::info!("Created audio directory {}", audio_dir.display());
    }

    let shutdown = CancellationToken::new();

    let engine = match load_catalog(audio_dir) {
        Ok(catalog) => {
            tracing::info!(
                "Catalog loaded: {} tracks, streaming {} at {}kbps",
                catalog.len(),
                config.stream.output_format,
                config.stream.bitrate_kbps
            );
            Some(
                StreamEngine::new(catalog, config.stream_settings(), config.encoder())
                    .with_shutdown(shutdown.child_token()),
            )
        }
        Err(StreamError::EmptyCatalog) => {
            tracing::warn!(
                "No audio files found in {}; /stream will answer 503",
                audio_dir.display()
            );
            None
        }
        Err(e) => return Err(e.into()),
    };

    // Build router
    let app = create_router(AppState::new(engine, &config));

    // Create server address
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Stream URL: http://{}/stream", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Scan a directory and read tags for every candidate
fn load_catalog(dir: &Path) -> Result<TrackCatalog, StreamError> {
    let candidates = match LibraryScanner::default().scan(dir) {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to scan {}: {}", dir.display(), e);
            Vec::new()
        }
    };
    TrackCatalog::build(candidates, &LoftyTagReader::new())
}

/// Resolve on Ctrl+C and stop every running session
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown requested, closing client sessions");
    shutdown.cancel();
}

fn scan_directory(path: &Path) -> anyhow::Result<()> {
    let candidates = LibraryScanner::default().scan(path)?;
    let catalog = match TrackCatalog::build(candidates, &LoftyTagReader::new()) {
        Ok(catalog) => catalog,
        Err(StreamError::EmptyCatalog) => {
            println!("No playable audio files in {}", path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{} tracks in {}:", catalog.len(), path.display());
    for (index, track) in catalog.tracks().iter().enumerate() {
        let display = framer::display_string(&track.title, track.artist.as_deref());
        let block = framer::frame(&track.title, track.artist.as_deref());
        let preview = framer::parse_block(&block).unwrap_or_default();

        println!(
            "  {:>3}  {:<5} {}",
            index,
            track.source_format.extension(),
            display
        );
        println!("         [{} bytes] {}", block.len(), preview);
    }

    Ok(())
}
