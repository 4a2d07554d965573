use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod detection;
mod engine;
mod engines;
mod error;
mod extractor;
mod preprocessing;
mod rasterizer;
mod server;
mod text;
mod upload;

#[derive(Parser, Debug)]
#[command(name = "resume-text-extractor")]
#[command(about = "Extracts normalized text from uploaded resumes")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "RESUME_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "RESUME_PORT", default_value = "5000")]
    pub port: u16,

    /// Scratch directory for uploaded files and rendered PDF pages
    #[arg(long, env = "RESUME_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: String,

    /// Maximum upload size in bytes (default: 50MB)
    #[arg(long, env = "RESUME_MAX_FILE_SIZE", default_value = "52428800")]
    pub max_file_size: usize,

    /// Roboflow API key for the hosted text-region detection model
    #[arg(long, env = "ROBOFLOW_API_KEY", hide_env_values = true)]
    pub roboflow_api_key: Option<String>,

    /// Roboflow project hosting the detection model
    #[arg(long, env = "ROBOFLOW_PROJECT", default_value = "resume-parse")]
    pub roboflow_project: String,

    /// Version of the detection model
    #[arg(long, env = "ROBOFLOW_VERSION", default_value = "13")]
    pub roboflow_version: u32,

    /// Base URL of the hosted detection API
    #[arg(long, env = "ROBOFLOW_API_URL", default_value = "https://detect.roboflow.com")]
    pub roboflow_api_url: String,

    /// Language for OCR (e.g., "eng", "deu", "fra")
    #[arg(long, env = "OCR_LANGUAGE", default_value = "eng")]
    pub language: String,

    /// Path to tessdata directory (uses TESSDATA_PREFIX env var if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<String>,

    /// Resolution used when rendering PDF pages
    #[arg(long, env = "RESUME_PDF_DPI", default_value = "72")]
    pub pdf_dpi: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from(args);

    tracing::info!(
        "Starting resume-text-extractor v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Binding to {}:{}", config.host, config.port);

    server::run(config).await
}
