//! Median-cut palette extraction over deduplicated, 5-bit quantized samples.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::ops::Range;

use palette::Srgb;
use tracing::debug;

use crate::PaletteError;
use crate::color::{is_opaque, mean_color, quantize, sample_key, to_hex};

/// Palette returned when no pixel survives the opacity test.
pub const FALLBACK_COLOR: &str = "#000000";

/// Channel a bucket is sorted and split along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    #[inline(always)]
    fn value(self, s: &Srgb<u8>) -> u8 {
        match self {
            Channel::Red => s.red,
            Channel::Green => s.green,
            Channel::Blue => s.blue,
        }
    }
}

/// Validate an interleaved RGBA buffer and return its unique quantized samples,
/// in first-seen order.
///
/// Each distinct quantized color contributes exactly one sample no matter how
/// many pixels share it.
pub fn collect_samples(pixels: &[u8]) -> Result<Vec<Srgb<u8>>, PaletteError> {
    if pixels.len() % 4 != 0 {
        return Err(PaletteError::InvalidBufferLength { len: pixels.len() });
    }

    let mut seen = HashSet::new();
    let mut samples = Vec::new();
    for px in pixels.chunks_exact(4) {
        if !is_opaque(px[3]) {
            continue;
        }
        let sample = Srgb::new(quantize(px[0]), quantize(px[1]), quantize(px[2]));
        if seen.insert(sample_key(sample)) {
            samples.push(sample);
        }
    }
    Ok(samples)
}

/// Channel with the largest `max - min` spread.
///
/// Ties resolve green first, then red, then blue. An empty slice yields green.
pub fn widest_channel(samples: &[Srgb<u8>]) -> Channel {
    let range = |ch: Channel| {
        let (lo, hi) = samples.iter().fold((u8::MAX, u8::MIN), |(lo, hi), s| {
            let v = ch.value(s);
            (lo.min(v), hi.max(v))
        });
        hi.saturating_sub(lo)
    };
    let (r, g, b) = (range(Channel::Red), range(Channel::Green), range(Channel::Blue));

    if g >= r && g >= b {
        Channel::Green
    } else if r >= b {
        Channel::Red
    } else {
        Channel::Blue
    }
}

/// Split `samples` into at most `desired_count` buckets and return them in
/// bucket order.
///
/// The buckets live in one arena: `samples` is reordered in place and each
/// bucket is a range into it. Splitting replaces a range with its two halves
/// at the same position, so the other buckets keep their relative order.
pub fn median_cut(mut samples: Vec<Srgb<u8>>, desired_count: usize) -> Vec<Vec<Srgb<u8>>> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut buckets: Vec<Range<usize>> = Vec::with_capacity(desired_count.min(samples.len()));
    buckets.push(0..samples.len());

    while buckets.len() < desired_count {
        // min_by_key keeps the first of equal keys, so ties go to the lowest index.
        let Some((idx, largest)) = buckets
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| Reverse(r.len()))
            .map(|(i, r)| (i, r.clone()))
        else {
            break;
        };
        if largest.len() <= 1 {
            debug!(buckets = buckets.len(), "no bucket left to split");
            break;
        }

        let bucket = &mut samples[largest.clone()];
        let channel = widest_channel(bucket);
        bucket.sort_by_key(|s| channel.value(s));

        let mid = largest.start + largest.len() / 2;
        buckets.splice(idx..=idx, [largest.start..mid, mid..largest.end]);
    }

    buckets.into_iter().map(|r| samples[r].to_vec()).collect()
}

/// Extract a palette of at most `desired_count` colors from interleaved RGBA
/// pixels, formatted as uppercase `#RRGGBB`.
///
/// Always returns at least one entry: an image with no opaque pixels yields
/// `["#000000"]`.
pub fn extract_palette(pixels: &[u8], desired_count: usize) -> Result<Vec<String>, PaletteError> {
    if pixels.len() % 4 != 0 {
        return Err(PaletteError::InvalidBufferLength { len: pixels.len() });
    }
    if desired_count == 0 {
        return Err(PaletteError::InvalidCount(0));
    }
    let samples = collect_samples(pixels)?;
    debug!(pixels = pixels.len() / 4, samples = samples.len(), desired_count, "extracting palette");

    if samples.is_empty() {
        return Ok(vec![FALLBACK_COLOR.to_string()]);
    }
    if samples.len() <= desired_count {
        return Ok(samples.iter().map(|&s| to_hex(mean_color(&[s]))).collect());
    }

    let buckets = median_cut(samples, desired_count);
    debug!(buckets = buckets.len(), "median cut finished");
    Ok(buckets.iter().map(|b| to_hex(mean_color(b))).collect())
}
