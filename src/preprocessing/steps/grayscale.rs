use image::{DynamicImage, GrayImage, Luma};

/// Convert a cropped region to 8-bit grayscale with BT.601 luma weights
/// (0.299 R + 0.587 G + 0.114 B), rounded to the nearest level.
///
/// `DynamicImage::to_luma8` weights channels per Rec. 709, which shifts
/// colored backgrounds enough to move the Otsu threshold.
pub fn apply(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
        Luma([((weighted + 500) / 1000) as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_grayscale_converts_color() {
        let mut img = RgbImage::new(10, 10);
        img.put_pixel(0, 0, Rgb([255, 0, 0])); // Red
        img.put_pixel(1, 0, Rgb([0, 255, 0])); // Green
        img.put_pixel(2, 0, Rgb([0, 0, 255])); // Blue

        let gray = apply(&DynamicImage::ImageRgb8(img));

        assert!(gray.get_pixel(0, 0).0[0] > 0);
        assert!(gray.get_pixel(1, 0).0[0] > 0);
        assert!(gray.get_pixel(2, 0).0[0] > 0);
        assert_eq!(gray.get_pixel(3, 0).0[0], 0);
    }

    #[test]
    fn test_grayscale_uses_bt601_weights() {
        let mut img = RgbImage::new(5, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));
        img.put_pixel(2, 0, Rgb([0, 0, 255]));
        img.put_pixel(3, 0, Rgb([255, 255, 255]));
        img.put_pixel(4, 0, Rgb([200, 120, 40]));

        let gray = apply(&DynamicImage::ImageRgb8(img));
        let levels: Vec<u8> = gray.pixels().map(|p| p.0[0]).collect();

        // 0.299*200 + 0.587*120 + 0.114*40 = 134.8
        assert_eq!(levels, vec![76, 150, 29, 255, 135]);
    }

    #[test]
    fn test_grayscale_preserves_dimensions() {
        let gray = apply(&DynamicImage::ImageRgb8(RgbImage::new(100, 50)));
        assert_eq!(gray.dimensions(), (100, 50));
    }
}
