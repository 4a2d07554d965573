//! Text-region detection backed by a hosted object-detection model.

use crate::config::DetectionConfig;
use crate::error::PipelineError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use std::path::Path;

/// A single detected text region, as reported by the model.
/// Coordinates are in source-image pixels, `x`/`y` being the box center.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, rename = "class")]
    pub label: Option<String>,
}

/// Integer pixel bounds of a region, `x2`/`y2` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl Prediction {
    /// Pixel bounds centered on the reported point, truncated toward zero
    pub fn bounds(&self) -> Bounds {
        Bounds {
            x1: (self.x - self.width / 2.0) as i64,
            y1: (self.y - self.height / 2.0) as i64,
            x2: (self.x + self.width / 2.0) as i64,
            y2: (self.y + self.height / 2.0) as i64,
        }
    }
}

/// Locates text regions in an image
pub trait TextDetector: Send + Sync {
    /// Returns regions in the order the model reported them
    fn detect(&self, image_path: &Path) -> Result<Vec<Prediction>, PipelineError>;
}

#[derive(Deserialize)]
struct DetectionResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

/// Client for a Roboflow-hosted detection model
pub struct RoboflowDetector {
    endpoint: String,
    api_key: String,
    confidence: u32,
    overlap: u32,
}

impl RoboflowDetector {
    /// Build the client. Fails when no API key is configured.
    pub fn new(config: &DetectionConfig) -> Result<Self, PipelineError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| PipelineError::Initialization {
                component: "detection model",
                reason: "no API key configured (set ROBOFLOW_API_KEY)".to_string(),
            })?;

        let endpoint = format!("{}/{}/{}", config.api_url, config.project, config.version);

        tracing::info!(
            "Detection model client ready ({}/{}, confidence {}%, overlap {}%)",
            config.project,
            config.version,
            config.confidence,
            config.overlap
        );

        Ok(Self {
            endpoint,
            api_key,
            confidence: config.confidence,
            overlap: config.overlap,
        })
    }
}

impl TextDetector for RoboflowDetector {
    fn detect(&self, image_path: &Path) -> Result<Vec<Prediction>, PipelineError> {
        let bytes = std::fs::read(image_path)?;
        let encoded = BASE64.encode(&bytes);

        let mut response = ureq::post(&self.endpoint)
            .query("api_key", &self.api_key)
            .query("confidence", self.confidence.to_string())
            .query("overlap", self.overlap.to_string())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .send(encoded)
            .map_err(|e| PipelineError::Detection(e.to_string()))?;

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| PipelineError::Detection(format!("Failed to read response: {}", e)))?;

        let predictions = parse_predictions(&body)?;
        tracing::debug!(
            "Detection model returned {} regions for {:?}",
            predictions.len(),
            image_path.file_name().unwrap_or_default()
        );
        Ok(predictions)
    }
}

/// Parse a detection response body. A missing `predictions` list means no
/// regions; a prediction missing a coordinate makes the whole body malformed.
pub fn parse_predictions(body: &str) -> Result<Vec<Prediction>, PipelineError> {
    serde_json::from_str::<DetectionResponse>(body)
        .map(|r| r.predictions)
        .map_err(|e| PipelineError::MalformedPrediction(e.to_string()))
}
