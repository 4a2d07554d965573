use crate::Args;
use std::path::PathBuf;

/// Confidence threshold (percent) sent to the detection model
pub const DETECTION_CONFIDENCE: u32 = 40;

/// Overlap threshold (percent) sent to the detection model
pub const DETECTION_OVERLAP: u32 = 30;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_file_size: usize,
    pub detection: DetectionConfig,
    pub language: String,
    #[cfg_attr(not(feature = "engine-leptess"), allow(dead_code))]
    pub tessdata_path: Option<String>,
    pub pdf_dpi: u32,
}

/// Settings for the hosted detection model
#[derive(Clone)]
pub struct DetectionConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub project: String,
    pub version: u32,
    pub confidence: u32,
    pub overlap: u32,
}

// Keeps the API key out of logs.
impl std::fmt::Debug for DetectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("api_url", &self.api_url)
            .field("project", &self.project)
            .field("version", &self.version)
            .field("confidence", &self.confidence)
            .field("overlap", &self.overlap)
            .finish()
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            upload_dir: PathBuf::from(args.upload_dir),
            max_file_size: args.max_file_size,
            detection: DetectionConfig {
                api_key: args.roboflow_api_key.filter(|key| !key.trim().is_empty()),
                api_url: args.roboflow_api_url.trim_end_matches('/').to_string(),
                project: args.roboflow_project,
                version: args.roboflow_version,
                confidence: DETECTION_CONFIDENCE,
                overlap: DETECTION_OVERLAP,
            },
            language: args.language,
            tessdata_path: args.tessdata_path,
            pdf_dpi: args.pdf_dpi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_match_hosted_model() {
        let args = Args::parse_from(["resume-text-extractor"]);
        let config = Config::from(args);

        assert_eq!(config.port, 5000);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.detection.project, "resume-parse");
        assert_eq!(config.detection.version, 13);
        assert_eq!(config.detection.confidence, 40);
        assert_eq!(config.detection.overlap, 30);
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        let args = Args::parse_from(["resume-text-extractor", "--roboflow-api-key", "  "]);
        let config = Config::from(args);
        assert!(config.detection.api_key.is_none());
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let args = Args::parse_from(["resume-text-extractor", "--roboflow-api-key", "secret"]);
        let config = Config::from(args);
        let rendered = format!("{:?}", config.detection);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("****"));
    }

    #[test]
    fn test_trailing_slash_stripped_from_api_url() {
        let args = Args::parse_from([
            "resume-text-extractor",
            "--roboflow-api-url",
            "http://localhost:9001/",
        ]);
        let config = Config::from(args);
        assert_eq!(config.detection.api_url, "http://localhost:9001");
    }
}
