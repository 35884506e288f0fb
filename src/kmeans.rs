use kmeans_colors::get_kmeans;
use palette::{IntoColor, Lab, LinSrgb, Srgb};
use tracing::debug;

use crate::PaletteError;
use crate::color::{is_opaque, to_hex};
use crate::median_cut::{FALLBACK_COLOR, extract_palette};

const MAX_ITERATIONS: usize = 20;
const CONVERGENCE: f32 = 1e-4;

/// Algorithm used to build a palette from an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaletteMethod {
    /// Median cut over unique quantized colors.
    #[default]
    MedianCut,
    /// K-means clustering of every opaque pixel in CIE Lab.
    KMeans,
}

impl PaletteMethod {
    pub fn extract(self, pixels: &[u8], desired_count: usize) -> Result<Vec<String>, PaletteError> {
        match self {
            PaletteMethod::MedianCut => extract_palette(pixels, desired_count),
            PaletteMethod::KMeans => kmeans_palette(pixels, desired_count, 0),
        }
    }
}

/// Cluster opaque pixels in Lab space and return the centroids as `#RRGGBB`.
///
/// Unlike median cut, every pixel counts, so large flat areas pull the
/// palette toward themselves.
pub fn kmeans_palette(pixels: &[u8], desired_count: usize, seed: u64) -> Result<Vec<String>, PaletteError> {
    if pixels.len() % 4 != 0 {
        return Err(PaletteError::InvalidBufferLength { len: pixels.len() });
    }
    if desired_count == 0 {
        return Err(PaletteError::InvalidCount(0));
    }

    let lab_pixels: Vec<Lab> = pixels
        .chunks_exact(4)
        .filter(|px| is_opaque(px[3]))
        .map(|px| {
            let linear: LinSrgb = Srgb::new(px[0], px[1], px[2]).into_linear();
            linear.into_color()
        })
        .collect();
    if lab_pixels.is_empty() {
        return Ok(vec![FALLBACK_COLOR.to_string()]);
    }

    let k = desired_count.min(lab_pixels.len());
    debug!(pixels = lab_pixels.len(), k, seed, "running k-means");
    let kmeans = get_kmeans(k, MAX_ITERATIONS, CONVERGENCE, false, &lab_pixels, seed);

    Ok(kmeans
        .centroids
        .iter()
        .map(|&lab| {
            let linear: LinSrgb = lab.into_color();
            let rgb: Srgb = Srgb::from_linear(linear);
            to_hex(rgb.into_format::<u8>())
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kmeans_validates_like_median_cut() {
        assert!(matches!(
            kmeans_palette(&[0; 6], 4, 0),
            Err(PaletteError::InvalidBufferLength { len: 6 })
        ));
        assert!(matches!(kmeans_palette(&[0; 8], 0, 0), Err(PaletteError::InvalidCount(0))));
    }

    #[test]
    fn kmeans_transparent_image_falls_back() {
        let px = [255, 255, 255, 0, 10, 10, 10, 50];
        assert_eq!(kmeans_palette(&px, 4, 0).unwrap(), vec!["#000000"]);
    }

    #[test]
    fn kmeans_is_seed_deterministic_and_bounded() {
        let px: Vec<u8> = (0..64u8)
            .flat_map(|i| [i.wrapping_mul(4), 255 - i * 2, i.wrapping_mul(7), 255])
            .collect();
        let a = kmeans_palette(&px, 4, 7).unwrap();
        let b = kmeans_palette(&px, 4, 7).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty() && a.len() <= 4);
        assert!(a.iter().all(|h| h.len() == 7 && h.starts_with('#')));
    }

    #[test]
    fn default_method_is_median_cut() {
        let px = [200, 16, 8, 255];
        assert_eq!(PaletteMethod::default().extract(&px, 3).unwrap(), vec!["#C81008"]);
    }
}
