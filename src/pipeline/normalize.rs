//! Size normalizer: fit an image payload under the transport byte budget.
//!
//! The layout-analysis transport rejects payloads above a hard 6 MiB
//! ceiling; the default budget sits at 4.5 MiB to leave margin for base64
//! expansion and the JSON envelope. Oversized images are decoded once and
//! re-encoded as lossy JPEG at decreasing quality until one fits.
//!
//! The loop prefers forward progress over strict success: if even the
//! lowest quality step is still over budget, the smallest attempt is
//! returned rather than an error. An oversized-but-best-effort payload may
//! still be accepted downstream; a hard failure here definitely would not.
//!
//! PDFs are never normalized — there is no meaningful lossy re-encode for
//! them, so they pass through the pipeline unmodified.

use crate::error::ExtractError;
use image::codecs::jpeg::JpegEncoder;
use std::io::Cursor;
use tracing::debug;

/// Starting JPEG quality for the re-encode loop.
const QUALITY_START: u8 = 100;
/// Quality decrement per attempt.
const QUALITY_STEP: u8 = 5;
/// Lowest quality bound; the loop stops once quality would reach it.
const QUALITY_FLOOR: u8 = 10;

/// Re-encode `bytes` until the result fits in `max_size` bytes.
///
/// Already-small inputs are returned unchanged, which also makes the
/// function idempotent: a normalized output always fits the budget (or is
/// the floor-quality encoding) and therefore passes straight through a
/// second call.
///
/// # Errors
/// Only when the oversized input cannot be decoded as an image at all.
pub fn normalize_image_size(bytes: &[u8], max_size: usize) -> Result<Vec<u8>, ExtractError> {
    if bytes.len() <= max_size {
        return Ok(bytes.to_vec());
    }

    // JPEG has no alpha channel; flatten to RGB once before the loop.
    let img = image::DynamicImage::ImageRgb8(image::load_from_memory(bytes)?.to_rgb8());
    debug!(
        "Image is {} bytes (budget {}), re-encoding as JPEG",
        bytes.len(),
        max_size
    );

    let mut smallest: Option<Vec<u8>> = None;
    let mut quality = QUALITY_START;
    while quality > QUALITY_FLOOR {
        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality);
        img.write_with_encoder(encoder)?;

        debug!("JPEG quality {} → {} bytes", quality, buf.len());
        if buf.len() <= max_size {
            return Ok(buf);
        }
        smallest = Some(buf);
        quality -= QUALITY_STEP;
    }

    // No quality step satisfied the budget; hand back the last (smallest)
    // attempt so the caller can still make the service call.
    debug!("No quality step fit the budget; returning floor-quality encoding");
    Ok(smallest.unwrap_or_else(|| bytes.to_vec()))
}
