//! Leptess/Tesseract engine implementation
//!
//! Tesseract-based OCR engine, statically linked through tesseract-static.
//! Downloads tessdata (training data) automatically on first use unless a
//! tessdata directory is configured.

use super::{cache_dir, ensure_downloaded};
use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::PipelineError;
use image::GrayImage;
use tesseract_static::tesseract::Tesseract;

/// Tesseract OCR Engine
pub struct LeptessEngine {
    /// Path to tessdata directory
    tessdata_path: String,
    language: String,
}

impl LeptessEngine {
    /// Create a new Tesseract-based OCR engine
    pub fn new(config: &Config) -> Result<Self, PipelineError> {
        let language = config.language.clone();

        let tessdata_path = match &config.tessdata_path {
            Some(path) => path.clone(),
            None => ensure_tessdata_available(&language)?,
        };

        // Validate that tessdata is accessible by doing a test initialization
        let test_tess = Tesseract::new(Some(&tessdata_path), Some(&language)).map_err(|e| {
            PipelineError::Initialization {
                component: "leptess engine",
                reason: format!("Failed to initialize Tesseract: {}", e),
            }
        })?;
        drop(test_tess);

        tracing::info!(
            "Leptess engine initialized (tessdata: {}, language: {})",
            tessdata_path,
            language
        );

        Ok(Self {
            tessdata_path,
            language,
        })
    }
}

impl OcrEngine for LeptessEngine {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn recognize(&self, region: &GrayImage) -> Result<String, PipelineError> {
        let (width, height) = region.dimensions();

        // BMP is always supported by leptonica
        let mut bmp_data = Vec::new();
        region
            .write_to(
                &mut std::io::Cursor::new(&mut bmp_data),
                image::ImageFormat::Bmp,
            )
            .map_err(|e| PipelineError::Ocr(format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Recognizing region: {}x{}, BMP size: {} bytes",
            width,
            height,
            bmp_data.len()
        );

        let mut tess = Tesseract::new(Some(&self.tessdata_path), Some(&self.language))
            .map_err(|e| PipelineError::Ocr(format!("Failed to create Tesseract: {}", e)))?;

        tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            PipelineError::Ocr(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        tess = tess
            .recognize()
            .map_err(|e| PipelineError::Ocr(format!("Failed to recognize text: {}", e)))?;

        tess.get_text()
            .map_err(|e| PipelineError::Ocr(format!("Failed to get text: {}", e)))
    }
}

/// Ensure tessdata is available, downloading if needed.
/// Returns the directory, which is what Tesseract expects.
fn ensure_tessdata_available(language: &str) -> Result<String, PipelineError> {
    let dir = cache_dir("tessdata")?;
    let traineddata_path = dir.join(format!("{}.traineddata", language));

    // tessdata_fast keeps downloads small
    let url = format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    );
    ensure_downloaded(&url, &traineddata_path)?;

    dir.to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| PipelineError::Initialization {
            component: "leptess engine",
            reason: "Invalid tessdata path".to_string(),
        })
}
