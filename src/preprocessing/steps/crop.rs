use crate::detection::Bounds;
use image::DynamicImage;

/// Crop a detected region out of the source image.
///
/// Bounds are clamped to the image; returns `None` when nothing of the
/// region lies inside it.
pub fn apply(image: &DynamicImage, bounds: Bounds) -> Option<DynamicImage> {
    let (width, height) = (image.width() as i64, image.height() as i64);

    let x1 = bounds.x1.clamp(0, width);
    let y1 = bounds.y1.clamp(0, height);
    let x2 = bounds.x2.clamp(0, width);
    let y2 = bounds.y2.clamp(0, height);

    if x2 <= x1 || y2 <= y1 {
        return None;
    }

    Some(image.crop_imm(
        x1 as u32,
        y1 as u32,
        (x2 - x1) as u32,
        (y2 - y1) as u32,
    ))
}
