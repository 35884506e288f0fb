//! Pixel samples and `#RRGGBB` helpers shared by the palette methods.

use palette::Srgb;

use crate::PaletteError;

/// Pixels with an alpha byte below this value are ignored.
pub const ALPHA_THRESHOLD: u8 = 128;

/// Bits kept per channel before deduplication.
const QUANT_MASK: u8 = 0b1111_1000;

#[inline(always)]
pub fn is_opaque(alpha: u8) -> bool {
    alpha >= ALPHA_THRESHOLD
}

/// Drop the low 3 bits of a channel so near-identical colors collapse together.
#[inline(always)]
pub fn quantize(channel: u8) -> u8 {
    channel & QUANT_MASK
}

/// Pack a sample into a single 24-bit key (`R<<16 | G<<8 | B`).
#[inline(always)]
pub fn sample_key(sample: Srgb<u8>) -> u32 {
    (u32::from(sample.red) << 16) | (u32::from(sample.green) << 8) | u32::from(sample.blue)
}

pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

/// Parse `RRGGBB` or `#RRGGBB` (any case, surrounding whitespace ignored).
pub fn parse_hex(text: &str) -> Result<Srgb<u8>, PaletteError> {
    let invalid = || PaletteError::InvalidHex(text.to_string());
    let trimmed = text.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| invalid());
    Ok(Srgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Per-channel mean, rounded half up.
///
/// Integer arithmetic keeps the result exact: `floor(sum / n + 0.5)` is
/// `(2 * sum + n) / (2 * n)`. The slice must not be empty.
pub fn mean_color(samples: &[Srgb<u8>]) -> Srgb<u8> {
    debug_assert!(!samples.is_empty());
    let n = samples.len() as u64;
    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for s in samples {
        r += u64::from(s.red);
        g += u64::from(s.green);
        b += u64::from(s.blue);
    }
    let round = |sum: u64| ((2 * sum + n) / (2 * n)) as u8;
    Srgb::new(round(r), round(g), round(b))
}

/// Rec. 709 luma on the 0..=255 scale.
#[inline(always)]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32
}
