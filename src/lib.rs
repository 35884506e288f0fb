use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

pub mod color;
pub mod dot_art;
mod error;
pub mod kmeans;
pub mod median_cut;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;

pub use error::PaletteError;
pub use kmeans::{PaletteMethod, kmeans_palette};
pub use median_cut::{Channel, collect_samples, extract_palette, median_cut, widest_channel};
#[cfg(not(target_arch = "wasm32"))]
pub use native::{dot_art_bytes, extract_palette_bytes};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js_array(hex: &[String]) -> Array {
    let arr = Array::new();
    for h in hex {
        arr.push(&JsValue::from_str(h));
    }
    arr
}

/// Median-cut palette from canvas pixel data (`ImageData.data`).
///
/// Returns an array of `#RRGGBB` strings; throws on a buffer whose length is
/// not a multiple of 4 or a non-positive count.
#[wasm_bindgen(js_name = extractPalette)]
pub fn extract_palette_js(pixels: &[u8], desired_count: i32) -> Result<Array, JsValue> {
    if pixels.len() % 4 != 0 {
        return Err(js_err(PaletteError::InvalidBufferLength { len: pixels.len() }));
    }
    let count = PaletteError::check_count(desired_count.into()).map_err(js_err)?;
    let palette = extract_palette(pixels, count).map_err(js_err)?;
    Ok(to_js_array(&palette))
}

fn decode(input: &[u8], downscale: Option<u32>) -> Result<image::RgbaImage, JsValue> {
    let img = image::load_from_memory(input)
        .map_err(|e| JsValue::from_str(&format!("Unable to decode image: {e}")))?;
    Ok(match downscale {
        Some(0) => return Err(js_err(PaletteError::InvalidScale)),
        Some(size) => {
            let (w, h) = (img.width(), img.height());
            if size < w.max(h) {
                let (dw, dh) = dot_art::fit_longest_side(w, h, size);
                image::imageops::resize(&img, dw, dh, image::imageops::FilterType::Nearest)
            } else {
                img.to_rgba8()
            }
        }
        None => img.to_rgba8(),
    })
}

/// Median-cut palette from an encoded image (PNG, JPEG, ...), optionally
/// shrunk first so its longest side equals `downscale`.
#[wasm_bindgen(js_name = extractImagePalette)]
pub fn extract_image_palette_js(
    input: Vec<u8>,
    desired_count: i32,
    downscale: Option<u32>,
) -> Result<Array, JsValue> {
    let count = PaletteError::check_count(desired_count.into()).map_err(js_err)?;
    let rgba = decode(&input, downscale)?;
    let palette = extract_palette(rgba.as_raw(), count).map_err(js_err)?;
    Ok(to_js_array(&palette))
}

/// Render dot art from an encoded image.
///
/// With no `palette`, a median-cut palette of `desired_count` colors is
/// extracted first. The result is `{ image: Uint8Array (PNG), palette: string[] }`.
#[wasm_bindgen(js_name = dotArt)]
pub fn dot_art_js(
    input: Vec<u8>,
    desired_count: i32,
    scale: u32,
    output_size: Option<u32>,
    palette: Option<Array>,
) -> Result<Object, JsValue> {
    let count = PaletteError::check_count(desired_count.into()).map_err(js_err)?;
    let rgba = decode(&input, None)?;

    let colors = match palette {
        Some(list) => list
            .iter()
            .map(|val| {
                let s = val
                    .as_string()
                    .ok_or_else(|| JsValue::from_str("Palette values must be strings"))?;
                color::parse_hex(&s).map_err(js_err)
            })
            .collect::<Result<Vec<_>, JsValue>>()?,
        None => extract_palette(rgba.as_raw(), count)
            .map_err(js_err)?
            .iter()
            .map(|h| color::parse_hex(h).map_err(js_err))
            .collect::<Result<Vec<_>, JsValue>>()?,
    };

    let art = dot_art::render_dot_art(&rgba, &colors, scale, output_size).map_err(js_err)?;
    let mut buf = Vec::new();
    art.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| JsValue::from_str(&format!("PNG encode error: {e}")))?;

    let hex: Vec<String> = colors.into_iter().map(color::to_hex).collect();
    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("image"), &Uint8Array::from(buf.as_slice()))?;
    Reflect::set(&result, &JsValue::from_str("palette"), &to_js_array(&hex))?;
    Ok(result)
}
