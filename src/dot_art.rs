//! Dot-art rendering: snap an image to a palette, then shrink and re-enlarge it
//! so every output "dot" is a solid block.

use image::{RgbaImage, imageops::FilterType};
use palette::Srgb;
use tracing::debug;

use crate::PaletteError;
use crate::color::{is_opaque, luminance};

/// Index of the palette entry closest to `color` (squared RGB distance).
/// The first entry wins ties. `palette` must not be empty.
pub fn nearest_color(color: Srgb<u8>, palette: &[Srgb<u8>]) -> usize {
    let (r, g, b) = (color.red as i32, color.green as i32, color.blue as i32);
    let mut best = 0;
    let mut best_dist = i32::MAX;
    for (idx, c) in palette.iter().enumerate() {
        let dr = r - c.red as i32;
        let dg = g - c.green as i32;
        let db = b - c.blue as i32;
        let dist = dr * dr + dg * dg + db * db;
        if dist < best_dist {
            best_dist = dist;
            best = idx;
        }
    }
    best
}

/// Replace every opaque pixel with its nearest palette entry, keeping alpha.
pub fn recolor(image: &mut RgbaImage, palette: &[Srgb<u8>]) -> Result<(), PaletteError> {
    if palette.is_empty() {
        return Err(PaletteError::EmptyPalette);
    }
    for px in image.pixels_mut() {
        let [r, g, b, a] = px.0;
        if !is_opaque(a) {
            continue;
        }
        let c = palette[nearest_color(Srgb::new(r, g, b), palette)];
        px.0 = [c.red, c.green, c.blue, a];
    }
    Ok(())
}

/// Most frequent pixel in `block`, ties going to the darker one.
fn block_mode(block: impl Iterator<Item = [u8; 4]>) -> [u8; 4] {
    let mut counts: Vec<([u8; 4], u32)> = Vec::new();
    for pix in block {
        match counts.iter_mut().find(|(c, _)| *c == pix) {
            Some((_, n)) => *n += 1,
            None => counts.push((pix, 1)),
        }
    }

    let mut best = [0u8; 4];
    let mut best_count = 0u32;
    let mut best_lum = f32::INFINITY;
    for (pix, count) in counts {
        let lum = luminance(pix[0], pix[1], pix[2]);
        if count > best_count || (count == best_count && lum < best_lum) {
            best = pix;
            best_count = count;
            best_lum = lum;
        }
    }
    best
}

/// Source span `[start, end)` covered by output index `i` when `input`
/// cells are reduced to `output` cells. Never empty.
fn block_span(i: u32, input: u32, output: u32) -> (u32, u32) {
    let scale = input as f32 / output as f32;
    let start = ((i as f32 * scale).floor() as u32).min(input - 1);
    let end = (((i as f32 + 1.0) * scale).ceil() as u32).clamp(start + 1, input);
    (start, end)
}

/// Shrink `image` to `out_w`×`out_h` by taking the modal color of each block.
///
/// Separable: columns are reduced first, then rows of the intermediate image.
pub fn downscale_mode(image: &RgbaImage, out_w: u32, out_h: u32) -> RgbaImage {
    let (in_w, in_h) = image.dimensions();
    if (out_w, out_h) == (in_w, in_h) || in_w == 0 || in_h == 0 || out_w == 0 || out_h == 0 {
        return image.clone();
    }

    let vertical = RgbaImage::from_fn(in_w, out_h, |x, y_out| {
        let (start, end) = block_span(y_out, in_h, out_h);
        image::Rgba(block_mode((start..end).map(|y| image.get_pixel(x, y).0)))
    });

    RgbaImage::from_fn(out_w, out_h, |x_out, y| {
        let (start, end) = block_span(x_out, in_w, out_w);
        image::Rgba(block_mode((start..end).map(|x| vertical.get_pixel(x, y).0)))
    })
}

/// Size with the longest side equal to `longest`, aspect ratio kept, each side at least 1.
pub fn fit_longest_side(width: u32, height: u32, longest: u32) -> (u32, u32) {
    let max_side = width.max(height).max(1) as f32;
    let ratio = longest as f32 / max_side;
    (
        ((width as f32) * ratio).round().max(1.0) as u32,
        ((height as f32) * ratio).round().max(1.0) as u32,
    )
}

/// Turn `image` into dot art drawn only with `palette`.
///
/// 1. Re-color every opaque pixel with its closest palette entry.
/// 2. Down-scale so the longest side equals `scale` (modal color per block).
/// 3. Up-scale with nearest neighbour, back to the original size or so the
///    longest side equals `output_size`.
pub fn render_dot_art(
    image: &RgbaImage,
    palette: &[Srgb<u8>],
    scale: u32,
    output_size: Option<u32>,
) -> Result<RgbaImage, PaletteError> {
    if scale == 0 || output_size == Some(0) {
        return Err(PaletteError::InvalidScale);
    }
    let mut recolored = image.clone();
    recolor(&mut recolored, palette)?;

    let (w, h) = image.dimensions();
    let (down_w, down_h) = fit_longest_side(w, h, scale);
    let (final_w, final_h) = match output_size {
        Some(size) => fit_longest_side(w, h, size),
        None => (w, h),
    };
    debug!(down_w, down_h, final_w, final_h, colors = palette.len(), "rendering dot art");

    let downscaled = downscale_mode(&recolored, down_w, down_h);
    Ok(image::imageops::resize(&downscaled, final_w, final_h, FilterType::Nearest))
}
