use crate::detection::Bounds;
use image::{DynamicImage, GrayImage};
use std::time::Instant;

use super::steps;

/// Timing information for a single preprocessing step
#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: &'static str,
    pub time_us: u64,
}

/// A region ready for OCR, with timings for each step
#[derive(Debug, Clone)]
pub struct PreparedRegion {
    pub image: GrayImage,
    pub steps: Vec<StepTiming>,
}

/// Turns a detected region of a page into a binarized crop:
/// crop, grayscale, then Otsu threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pipeline;

impl Pipeline {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` when the region lies entirely outside the source image
    pub fn process(&self, source: &DynamicImage, bounds: Bounds) -> Option<PreparedRegion> {
        let mut timings = Vec::with_capacity(3);

        let cropped = run_step("crop", &mut timings, || steps::crop::apply(source, bounds))?;
        let gray = run_step("grayscale", &mut timings, || steps::grayscale::apply(&cropped));
        let binary = run_step("threshold", &mut timings, || steps::threshold::apply(&gray));

        Some(PreparedRegion {
            image: binary,
            steps: timings,
        })
    }
}

fn run_step<T, F>(name: &'static str, timings: &mut Vec<StepTiming>, step_fn: F) -> T
where
    F: FnOnce() -> T,
{
    let step_start = Instant::now();
    let result = step_fn();
    timings.push(StepTiming {
        name,
        time_us: step_start.elapsed().as_micros() as u64,
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_pipeline_produces_binary_crop() {
        let mut img = RgbImage::from_pixel(200, 100, Rgb([250, 250, 245]));
        for x in 60..140 {
            for y in 45..55 {
                img.put_pixel(x, y, Rgb([10, 10, 30]));
            }
        }

        let bounds = Bounds {
            x1: 50,
            y1: 40,
            x2: 150,
            y2: 60,
        };
        let region = Pipeline::new()
            .process(&DynamicImage::ImageRgb8(img), bounds)
            .unwrap();

        assert_eq!(region.image.dimensions(), (100, 20));
        assert!(region.image.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert_eq!(region.image.get_pixel(50, 10).0[0], 0);
        assert_eq!(region.image.get_pixel(2, 2).0[0], 255);

        let names: Vec<_> = region.steps.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["crop", "grayscale", "threshold"]);
    }

    #[test]
    fn test_pipeline_skips_region_outside_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(20, 20));
        let bounds = Bounds {
            x1: 30,
            y1: 30,
            x2: 40,
            y2: 40,
        };
        assert!(Pipeline::new().process(&img, bounds).is_none());
    }
}
