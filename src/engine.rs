use crate::error::PipelineError;
use image::GrayImage;

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "leptess")
    fn name(&self) -> &'static str;

    /// Recognize the text in a single binarized region
    fn recognize(&self, region: &GrayImage) -> Result<String, PipelineError>;
}
