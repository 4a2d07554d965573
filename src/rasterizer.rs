//! PDF page rasterization.
//!
//! Pages are counted with lopdf and rendered one at a time with `pdftoppm`
//! (poppler-utils). Each page lands in the scratch directory as
//! `page_{n}.png`, `n` counting from zero.

use crate::error::PipelineError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Renders every page of a PDF to an image file
pub trait PageRasterizer: Send + Sync {
    /// Returns image paths in page order
    fn rasterize(&self, pdf_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, PipelineError>;
}

/// Rasterizer backed by the `pdftoppm` command
pub struct PdftoppmRasterizer {
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
        let pages = page_count(pdf_path)?;
        let mut images = Vec::with_capacity(pages);

        for index in 0..pages {
            let output = page_image_path(out_dir, index);
            render_page(pdf_path, index, self.dpi, &output)?;
            images.push(output);
        }

        Ok(images)
    }
}

/// Convert a PDF to page images, treating any failure as "no pages".
pub fn convert_pdf_to_images(
    rasterizer: &dyn PageRasterizer,
    pdf_path: &Path,
    out_dir: &Path,
) -> Vec<PathBuf> {
    match rasterizer.rasterize(pdf_path, out_dir) {
        Ok(images) => {
            tracing::info!("Successfully converted PDF to {} images", images.len());
            images
        }
        Err(e) => {
            tracing::error!("Error converting PDF to images: {}", e);
            Vec::new()
        }
    }
}

/// Scratch location for the rendered image of a zero-based page index
pub fn page_image_path(out_dir: &Path, index: usize) -> PathBuf {
    out_dir.join(format!("page_{}.png", index))
}

fn page_count(pdf_path: &Path) -> Result<usize, PipelineError> {
    let doc = lopdf::Document::load(pdf_path)
        .map_err(|e| PipelineError::Pdf(format!("Failed to load PDF: {}", e)))?;
    Ok(doc.get_pages().len())
}

fn render_page(pdf_path: &Path, index: usize, dpi: u32, output: &Path) -> Result<(), PipelineError> {
    // pdftoppm appends the extension itself
    let prefix = output.with_extension("");
    let page = (index + 1).to_string();

    let result = Command::new("pdftoppm")
        .arg("-png")
        .arg("-singlefile")
        .args(["-r", &dpi.to_string()])
        .args(["-f", &page, "-l", &page])
        .arg(pdf_path)
        .arg(&prefix)
        .output()
        .map_err(|e| {
            PipelineError::Pdf(format!(
                "Failed to run pdftoppm: {}. Make sure poppler-utils is installed.",
                e
            ))
        })?;

    if !result.status.success() {
        return Err(PipelineError::Pdf(format!(
            "pdftoppm failed on page {}: {}",
            index,
            String::from_utf8_lossy(&result.stderr).trim()
        )));
    }

    if !output.exists() {
        return Err(PipelineError::Pdf(format!(
            "pdftoppm produced no image for page {}",
            index
        )));
    }

    Ok(())
}
