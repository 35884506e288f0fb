use std::io::Cursor;

use dot_palette_wasm::{PaletteMethod, dot_art_bytes, extract_palette, extract_palette_bytes};
use image::{ImageFormat, Rgba, RgbaImage};

fn png(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

fn gradient(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        let alpha = if x == 0 { 0 } else { 255 };
        Rgba([(x * 255 / w) as u8, (y * 255 / h) as u8, ((x + y) * 4) as u8, alpha])
    })
}

#[test]
fn decoded_png_matches_raw_extraction() {
    let img = gradient(32, 24);
    let from_bytes = extract_palette_bytes(&png(&img), 8, PaletteMethod::MedianCut, None).unwrap();
    let from_raw = extract_palette(img.as_raw(), 8).unwrap();
    assert_eq!(from_bytes, from_raw);
    assert_eq!(from_bytes.len(), 8);
}

#[test]
fn downscale_bounds_the_palette_source() {
    let img = gradient(64, 64);
    let palette = extract_palette_bytes(&png(&img), 16, PaletteMethod::MedianCut, Some(8)).unwrap();
    assert!(!palette.is_empty() && palette.len() <= 16);
    assert!(extract_palette_bytes(&png(&img), 16, PaletteMethod::MedianCut, Some(0)).is_err());
}

#[test]
fn kmeans_method_through_bytes() {
    let img = gradient(16, 16);
    let palette = extract_palette_bytes(&png(&img), 4, PaletteMethod::KMeans, None).unwrap();
    assert!(!palette.is_empty() && palette.len() <= 4);
}

#[test]
fn garbage_input_fails_to_decode() {
    assert!(extract_palette_bytes(b"not an image", 8, PaletteMethod::MedianCut, None).is_err());
}

#[test]
fn dot_art_with_custom_palette() {
    let img = gradient(40, 20);
    let palette = vec!["#000000".to_string(), "ffffff".to_string()];
    let (bytes, used) = dot_art_bytes(&png(&img), 8, 10, Some(80), Some(&palette)).unwrap();
    assert_eq!(used, vec!["#000000", "#FFFFFF"]);

    let out = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(out.dimensions(), (80, 40));
    for px in out.pixels() {
        let [r, g, b, _] = px.0;
        assert!((r, g, b) == (0, 0, 0) || (r, g, b) == (255, 255, 255) || px.0[3] < 128);
    }
}

#[test]
fn dot_art_extracts_palette_when_missing() {
    let img = gradient(24, 24);
    let (bytes, used) = dot_art_bytes(&png(&img), 6, 8, None, None).unwrap();
    assert!(!used.is_empty() && used.len() <= 6);
    let out = image::load_from_memory(&bytes).unwrap();
    assert_eq!((out.width(), out.height()), (24, 24));
}

#[test]
fn dot_art_rejects_bad_hex() {
    let img = gradient(4, 4);
    let palette = vec!["#12".to_string()];
    assert!(dot_art_bytes(&png(&img), 8, 2, None, Some(&palette)).is_err());
}
