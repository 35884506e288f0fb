use thiserror::Error;

/// Errors raised at the boundary of the palette and dot-art entry points.
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Pixel buffer length {len} is not a multiple of 4 (expected interleaved RGBA)")]
    InvalidBufferLength { len: usize },
    #[error("Color count must be a positive integer, got {0}")]
    InvalidCount(i64),
    #[error("Invalid hex color: {0:?}")]
    InvalidHex(String),
    #[error("Palette must contain at least one color")]
    EmptyPalette,
    #[error("Downscale size must be greater than zero")]
    InvalidScale,
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl PaletteError {
    /// Check a requested color count, accepting anything a caller might hand us.
    pub fn check_count(count: i64) -> Result<usize, Self> {
        match usize::try_from(count) {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(Self::InvalidCount(count)),
        }
    }
}
