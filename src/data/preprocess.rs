//! Image preprocessing for single-digit inference.
//!
//! Decodes image bytes (PNG/JPEG/BMP/GIF), converts to grayscale, crops to
//! the ink, and frames the digit the way MNIST does: scaled into a 22x22 box
//! that sits inside a black 28x28 canvas. The drawing page served by the
//! `serve` binary performs the same steps in the browser.

use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::error::Result;

pub const SIDE: u32 = 28;

/// Side of the box the cropped digit is scaled into.
pub const DIGIT_BOX: u32 = 22;

/// Position of the digit box's top-left corner inside the 28x28 frame.
pub const BOX_OFFSET: u32 = 4;

/// Normalized intensity above which a pixel counts as ink.
pub const INK_THRESHOLD: f32 = 0.15;

/// Returns a flat `Vec<f32>` of length 784 with values in [0, 1].
///
/// MNIST digits are light strokes on a dark background; pass `invert = true`
/// for the usual dark-ink-on-white drawings.
pub fn image_bytes_to_input(bytes: &[u8], invert: bool) -> Result<Vec<f32>> {
    let mut gray = image::load_from_memory(bytes)?.to_luma8();
    if invert {
        imageops::invert(&mut gray);
    }
    let framed = center_digit(&gray);
    Ok(framed.pixels().map(|p| p.0[0] as f32 / 255.0).collect())
}

/// Crops `gray` to the bounding box of its ink plus a margin of a tenth of
/// the longer side, scales the crop into a [`DIGIT_BOX`] square keeping its
/// aspect ratio, and places that square at ([`BOX_OFFSET`], [`BOX_OFFSET`])
/// in a black 28x28 frame. An image without ink yields an all-black frame.
pub fn center_digit(gray: &GrayImage) -> GrayImage {
    let mut frame = GrayImage::new(SIDE, SIDE);
    let (min_x, min_y, max_x, max_y) = match ink_bounds(gray) {
        Some(bounds) => bounds,
        None => return frame,
    };

    let (width, height) = gray.dimensions();
    let pad = width.max(height) / 10;
    let x0 = min_x.saturating_sub(pad);
    let y0 = min_y.saturating_sub(pad);
    let x1 = (max_x + pad).min(width - 1);
    let y1 = (max_y + pad).min(height - 1);
    let (crop_w, crop_h) = (x1 - x0 + 1, y1 - y0 + 1);
    let crop = imageops::crop_imm(gray, x0, y0, crop_w, crop_h).to_image();

    let scale = (DIGIT_BOX as f32 / crop_w as f32).min(DIGIT_BOX as f32 / crop_h as f32);
    let new_w = ((crop_w as f32 * scale).round() as u32).clamp(1, DIGIT_BOX);
    let new_h = ((crop_h as f32 * scale).round() as u32).clamp(1, DIGIT_BOX);
    let scaled = imageops::resize(&crop, new_w, new_h, FilterType::Triangle);

    let dx = BOX_OFFSET + (DIGIT_BOX - new_w) / 2;
    let dy = BOX_OFFSET + (DIGIT_BOX - new_h) / 2;
    imageops::overlay(&mut frame, &scaled, dx as i64, dy as i64);
    frame
}

/// Inclusive `(min_x, min_y, max_x, max_y)` of pixels brighter than
/// [`INK_THRESHOLD`], or `None` when there are none.
fn ink_bounds(gray: &GrayImage) -> Option<(u32, u32, u32, u32)> {
    let threshold = INK_THRESHOLD * 255.0;
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in gray.enumerate_pixels() {
        if (p.0[0] as f32) <= threshold {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Luma};
    use std::io::Cursor;

    fn png(img: &GrayImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageOutputFormat::Png).unwrap();
        bytes.into_inner()
    }

    /// Black `side`x`side` canvas with a white rectangle.
    fn canvas_with_block(side: u32, x: std::ops::Range<u32>, y: std::ops::Range<u32>) -> GrayImage {
        GrayImage::from_fn(side, side, |px, py| {
            if x.contains(&px) && y.contains(&py) { Luma([255]) } else { Luma([0]) }
        })
    }

    fn at(input: &[f32], x: u32, y: u32) -> f32 {
        input[(y * SIDE + x) as usize]
    }

    #[test]
    fn blank_canvas_is_all_zero() {
        let input = image_bytes_to_input(&png(&GrayImage::new(280, 280)), false).unwrap();
        assert_eq!(input.len(), 784);
        assert!(input.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn full_ink_fills_the_digit_box_only() {
        let white = GrayImage::from_pixel(56, 56, Luma([255]));
        let input = image_bytes_to_input(&png(&white), false).unwrap();
        assert_eq!(at(&input, 0, 0), 0.0);
        assert_eq!(at(&input, 3, 10), 0.0);
        assert_eq!(at(&input, 26, 26), 0.0);
        assert!(at(&input, 4, 4) > 0.99);
        assert!(at(&input, 25, 25) > 0.99);
        let lit = input.iter().filter(|&&v| v > 0.5).count();
        assert_eq!(lit, (DIGIT_BOX * DIGIT_BOX) as usize);
    }

    #[test]
    fn invert_turns_a_white_page_blank() {
        let white = GrayImage::from_pixel(28, 28, Luma([255]));
        let input = image_bytes_to_input(&png(&white), true).unwrap();
        assert!(input.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn digit_position_on_the_canvas_does_not_matter() {
        let near_origin = center_digit(&canvas_with_block(200, 30..50, 40..80));
        let far_corner = center_digit(&canvas_with_block(200, 140..160, 110..150));
        assert_eq!(near_origin, far_corner);
        assert!(near_origin.pixels().any(|p| p.0[0] > 0));
    }

    #[test]
    fn tall_strokes_keep_their_aspect_ratio() {
        // 10x100 bar plus 20px margins: a 50x140 crop scaled to 8x22.
        let framed = center_digit(&canvas_with_block(200, 95..105, 50..150));
        for (x, _, p) in framed.enumerate_pixels() {
            if !(11..19).contains(&x) {
                assert_eq!(p.0[0], 0, "ink outside the scaled column at x={}", x);
            }
        }
        assert!(framed.pixels().map(|p| p.0[0] as u32).sum::<u32>() > 0);
    }

    #[test]
    fn garbage_bytes_are_an_image_error() {
        assert!(image_bytes_to_input(b"not an image", false).is_err());
    }
}
