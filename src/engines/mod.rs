//! OCR engine implementations
//!
//! This module contains implementations of the OcrEngine trait for different
//! OCR backends. Engines are conditionally compiled based on feature flags.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::PipelineError;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on one model or tessdata download. Startup waits for engine
/// initialization, so a stalled network must not keep the listener unbound.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Initialize the OCR engine selected at build time.
///
/// Failure is not fatal: the error is logged and the server keeps running
/// without OCR, which makes every extraction come back empty.
pub fn init(config: &Config) -> Option<Arc<dyn OcrEngine>> {
    match build(config) {
        Ok(engine) => {
            tracing::info!("OCR engine '{}' initialized successfully", engine.name());
            Some(engine)
        }
        Err(e) => {
            tracing::error!("Error initializing OCR engine: {}", e);
            None
        }
    }
}

#[allow(unused_variables, unreachable_code)]
fn build(config: &Config) -> Result<Arc<dyn OcrEngine>, PipelineError> {
    #[cfg(feature = "engine-leptess")]
    {
        tracing::info!("Initializing leptess engine...");
        return Ok(Arc::new(leptess::LeptessEngine::new(config)?));
    }

    #[cfg(feature = "engine-ocrs")]
    {
        tracing::info!("Initializing ocrs engine...");
        return Ok(Arc::new(ocrs::OcrsEngine::new(config)?));
    }

    Err(PipelineError::Initialization {
        component: "OCR engine",
        reason: "No OCR engines available. Build with --features engine-ocrs or --features engine-leptess".to_string(),
    })
}

/// Cache directory shared by downloaded models and tessdata
#[allow(dead_code)]
pub(crate) fn cache_dir(subdir: &str) -> Result<PathBuf, PipelineError> {
    let dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("resume-text-extractor")
        .join(subdir);

    std::fs::create_dir_all(&dir).map_err(|e| PipelineError::Initialization {
        component: "OCR engine",
        reason: format!("Failed to create cache directory {:?}: {}", dir, e),
    })?;

    Ok(dir)
}

/// Download a file from URL to path using ureq, unless it is already cached
#[allow(dead_code)]
pub(crate) fn ensure_downloaded(url: &str, path: &Path) -> Result<(), PipelineError> {
    download_with_timeout(url, path, DOWNLOAD_TIMEOUT)
}

#[allow(dead_code)]
fn download_with_timeout(url: &str, path: &Path, timeout: Duration) -> Result<(), PipelineError> {
    if path.exists() {
        tracing::info!("Using cached {:?}", path);
        return Ok(());
    }

    tracing::info!("Downloading {} (this may take a moment)...", url);

    let init_err = |reason: String| PipelineError::Initialization {
        component: "OCR engine",
        reason,
    };

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_connect(Some(CONNECT_TIMEOUT.min(timeout)))
        .timeout_global(Some(timeout))
        .build()
        .into();

    let response = agent
        .get(url)
        .call()
        .map_err(|e| init_err(format!("Failed to download {}: {}", url, e)))?;

    let buffer = response
        .into_body()
        .read_to_vec()
        .map_err(|e| init_err(format!("Failed to read download body: {}", e)))?;

    // Write to a sibling file first so an interrupted download is never
    // mistaken for a cached one
    let partial = path.with_extension(format!("part.{}", std::process::id()));
    let mut file = File::create(&partial)
        .map_err(|e| init_err(format!("Failed to create {:?}: {}", partial, e)))?;
    file.write_all(&buffer)
        .map_err(|e| init_err(format!("Failed to write {:?}: {}", partial, e)))?;
    std::fs::rename(&partial, path)
        .map_err(|e| init_err(format!("Failed to move {:?} into place: {}", partial, e)))?;

    tracing::info!("Downloaded {} bytes to {:?}", buffer.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Instant;
    use tempfile::TempDir;

    #[test]
    fn test_stalled_download_times_out() {
        // Accepts connections into the backlog but never answers
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/text-detection.rten", listener.local_addr().unwrap());
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("text-detection.rten");

        let started = Instant::now();
        let result = download_with_timeout(&url, &path, Duration::from_secs(1));

        assert!(matches!(result, Err(PipelineError::Initialization { .. })));
        assert!(started.elapsed() < Duration::from_secs(30));
        assert!(!path.exists());
        drop(listener);
    }

    #[test]
    fn test_cached_file_is_not_downloaded_again() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eng.traineddata");
        std::fs::write(&path, b"cached").unwrap();

        // Nothing listens on port 9; a network attempt would fail
        download_with_timeout("http://127.0.0.1:9/eng.traineddata", &path, Duration::from_secs(1))
            .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"cached");
    }
}
