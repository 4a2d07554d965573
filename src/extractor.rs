//! Region-by-region text extraction for a single uploaded resume.

use crate::detection::TextDetector;
use crate::engine::OcrEngine;
use crate::error::PipelineError;
use crate::preprocessing::Pipeline;
use crate::rasterizer::{convert_pdf_to_images, PageRasterizer};
use crate::text::normalize;
use crate::upload::FileKind;
use std::path::Path;
use std::sync::Arc;

/// Detects text regions on an image and OCRs each one.
///
/// Both collaborators are optional: startup keeps going when either fails
/// to initialize, and every extraction then reports the missing piece and
/// yields empty text.
#[derive(Clone)]
pub struct RegionExtractor {
    detector: Option<Arc<dyn TextDetector>>,
    ocr: Option<Arc<dyn OcrEngine>>,
    pipeline: Pipeline,
}

impl RegionExtractor {
    pub fn new(detector: Option<Arc<dyn TextDetector>>, ocr: Option<Arc<dyn OcrEngine>>) -> Self {
        Self {
            detector,
            ocr,
            pipeline: Pipeline::new(),
        }
    }

    pub fn detector_available(&self) -> bool {
        self.detector.is_some()
    }

    pub fn ocr_engine_name(&self) -> Option<&'static str> {
        self.ocr.as_ref().map(|engine| engine.name())
    }

    /// Normalized text of one image. Never fails: errors are logged and
    /// produce an empty string.
    pub fn extract(&self, image_path: &Path) -> String {
        match self.try_extract(image_path) {
            Ok(text) => normalize(&text),
            Err(e) => {
                tracing::error!(
                    "Error extracting text from resume {:?}: {}",
                    image_path.file_name().unwrap_or_default(),
                    e
                );
                String::new()
            }
        }
    }

    fn try_extract(&self, image_path: &Path) -> Result<String, PipelineError> {
        let detector = self.detector.as_ref().ok_or_else(|| unavailable("detection model"))?;
        let ocr = self.ocr.as_ref().ok_or_else(|| unavailable("OCR engine"))?;

        let predictions = detector.detect(image_path)?;
        // Uploads are often mislabelled, so the format comes from the bytes
        let image = image::ImageReader::open(image_path)?
            .with_guessed_format()?
            .decode()?;

        let mut region_texts = Vec::with_capacity(predictions.len());
        for (index, prediction) in predictions.iter().enumerate() {
            let bounds = prediction.bounds();
            let Some(region) = self.pipeline.process(&image, bounds) else {
                tracing::warn!("Skipping region {} outside the image: {:?}", index, bounds);
                continue;
            };

            tracing::debug!(
                "Region {} ({}, confidence {:.2}) prepared in {}",
                index,
                prediction.label.as_deref().unwrap_or("unlabeled"),
                prediction.confidence,
                region
                    .steps
                    .iter()
                    .map(|step| format!("{}={}us", step.name, step.time_us))
                    .collect::<Vec<_>>()
                    .join(" ")
            );

            region_texts.push(ocr.recognize(&region.image)?);
        }

        // Newlines keep words from neighbouring regions apart
        Ok(region_texts.join("\n"))
    }

    /// Text of a whole upload. PDFs are rasterized first and their pages
    /// joined with `\n` in page order.
    pub fn extract_document(
        &self,
        rasterizer: &dyn PageRasterizer,
        path: &Path,
        kind: FileKind,
        scratch_dir: &Path,
    ) -> String {
        match kind {
            FileKind::Pdf => convert_pdf_to_images(rasterizer, path, scratch_dir)
                .iter()
                .map(|page| self.extract(page))
                .collect::<Vec<_>>()
                .join("\n"),
            FileKind::Image => self.extract(path),
        }
    }
}

fn unavailable(component: &'static str) -> PipelineError {
    PipelineError::Initialization {
        component,
        reason: "not available".to_string(),
    }
}
