use image::GrayImage;
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

/// Binarize with a global Otsu threshold.
/// Pixels brighter than the level become 255, the rest 0.
pub fn apply(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    threshold(gray, level, ThresholdType::Binary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_threshold_binarizes_image() {
        let img = GrayImage::from_fn(50, 50, |x, _| Luma([(x as u8 * 5).min(255)]));

        let result = apply(&img);

        for pixel in result.pixels() {
            assert!(
                pixel.0[0] == 0 || pixel.0[0] == 255,
                "Expected binary pixel, got {}",
                pixel.0[0]
            );
        }
    }

    #[test]
    fn test_threshold_separates_text_from_background() {
        // Dark text on light background
        let mut img = GrayImage::from_pixel(50, 20, Luma([240]));
        for x in 10..40 {
            img.put_pixel(x, 10, Luma([20]));
            img.put_pixel(x, 11, Luma([35]));
        }

        let result = apply(&img);

        assert_eq!(result.get_pixel(25, 10).0[0], 0);
        assert_eq!(result.get_pixel(25, 11).0[0], 0);
        assert_eq!(result.get_pixel(25, 5).0[0], 255);
    }
}
