//! Entry points working on encoded image bytes, for native callers and the CLI.

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage, imageops::FilterType};
use palette::Srgb;
use tracing::{debug, info};

use crate::PaletteMethod;
use crate::color::parse_hex;
use crate::dot_art::{fit_longest_side, render_dot_art};

/// Decode `input` and optionally shrink it (nearest neighbour) so its longest
/// side equals `downscale`.
pub fn decode_rgba(input: &[u8], downscale: Option<u32>) -> Result<RgbaImage> {
    let img = image::load_from_memory(input).context("Unable to decode image")?;
    let (w, h) = img.dimensions();
    debug!(width = w, height = h, "decoded image");

    let working: DynamicImage = match downscale {
        Some(0) => anyhow::bail!("downscale size must be greater than zero"),
        Some(size) if size < w.max(h) => {
            let (dw, dh) = fit_longest_side(w, h, size);
            debug!(width = dw, height = dh, "downscaling before extraction");
            DynamicImage::ImageRgba8(image::imageops::resize(&img, dw, dh, FilterType::Nearest))
        }
        _ => img,
    };
    Ok(working.to_rgba8())
}

/// Extract a palette from an encoded image.
pub fn extract_palette_bytes(
    input: &[u8],
    n_colors: usize,
    method: PaletteMethod,
    downscale: Option<u32>,
) -> Result<Vec<String>> {
    let rgba = decode_rgba(input, downscale)?;
    let palette = method
        .extract(rgba.as_raw(), n_colors)
        .with_context(|| format!("{method:?} palette extraction failed"))?;
    info!(?method, colors = palette.len(), "extracted palette");
    Ok(palette)
}

/// Render dot art from an encoded image.
///
/// Uses `palette_hex` when given, otherwise a median-cut palette of
/// `n_colors` entries. Returns the PNG bytes and the palette used.
pub fn dot_art_bytes(
    input: &[u8],
    n_colors: usize,
    scale: u32,
    output_size: Option<u32>,
    palette_hex: Option<&[String]>,
) -> Result<(Vec<u8>, Vec<String>)> {
    let rgba = decode_rgba(input, None)?;

    let hex = match palette_hex {
        Some(list) => list.to_vec(),
        None => PaletteMethod::MedianCut.extract(rgba.as_raw(), n_colors)?,
    };
    let colors: Vec<Srgb<u8>> = hex
        .iter()
        .map(|s| parse_hex(s))
        .collect::<Result<_, _>>()
        .context("invalid palette")?;

    let art = render_dot_art(&rgba, &colors, scale, output_size)?;

    let mut buf = Vec::new();
    art.write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
        .context("PNG encode error")?;
    info!(bytes = buf.len(), colors = colors.len(), "rendered dot art");

    let normalized = colors.into_iter().map(crate::color::to_hex).collect();
    Ok((buf, normalized))
}
