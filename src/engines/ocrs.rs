//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library. No system dependencies required.
//! Downloads neural network models automatically on first use.

use super::{cache_dir, ensure_downloaded};
use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::PipelineError;
use image::{DynamicImage, GrayImage};
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;
use std::path::PathBuf;

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// OCR Engine wrapping the ocrs library
pub struct OcrsEngine {
    engine: OcrsOcrEngine,
}

impl OcrsEngine {
    /// Create a new ocrs engine, downloading models if needed
    pub fn new(config: &Config) -> Result<Self, PipelineError> {
        if config.language != "eng" {
            tracing::warn!(
                "ocrs only recognizes Latin script; ignoring language '{}'",
                config.language
            );
        }

        let detection_model_path = model_path(DETECTION_MODEL_URL, "text-detection.rten")?;
        let recognition_model_path = model_path(RECOGNITION_MODEL_URL, "text-recognition.rten")?;

        let detection_model = Model::load_file(&detection_model_path)
            .map_err(|e| init_error(format!("Failed to load detection model: {}", e)))?;
        let recognition_model = Model::load_file(&recognition_model_path)
            .map_err(|e| init_error(format!("Failed to load recognition model: {}", e)))?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| init_error(format!("Failed to create OCR engine: {}", e)))?;

        Ok(Self { engine })
    }
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn recognize(&self, region: &GrayImage) -> Result<String, PipelineError> {
        // ImageSource::from_bytes expects RGB8 in HWC order
        let rgb_img = DynamicImage::ImageLuma8(region.clone()).into_rgb8();
        let dimensions = rgb_img.dimensions();

        let img_source = ImageSource::from_bytes(rgb_img.as_raw(), dimensions)
            .map_err(|e| PipelineError::Ocr(format!("Failed to create image source: {}", e)))?;

        let ocr_input = self
            .engine
            .prepare_input(img_source)
            .map_err(|e| PipelineError::Ocr(format!("Failed to prepare input: {}", e)))?;

        let word_rects = self
            .engine
            .detect_words(&ocr_input)
            .map_err(|e| PipelineError::Ocr(format!("Failed to detect words: {}", e)))?;

        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| PipelineError::Ocr(format!("Failed to recognize text: {}", e)))?;

        let text = line_texts
            .iter()
            .filter_map(|line| line.as_ref())
            .map(|line| {
                line.words()
                    .map(|word| word.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }
}

fn model_path(url: &str, filename: &str) -> Result<PathBuf, PipelineError> {
    let path = cache_dir("models")?.join(filename);
    ensure_downloaded(url, &path)?;
    Ok(path)
}

fn init_error(reason: String) -> PipelineError {
    PipelineError::Initialization {
        component: "ocrs engine",
        reason,
    }
}
