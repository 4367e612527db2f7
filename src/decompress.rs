//! Optional raw-deflate wrapper
//!
//! Capture files are either stored as-is or wrapped in a raw deflate stream
//! (no zlib header, no checksum trailer). There is no flag telling the two
//! apart, so the payload is inflated optimistically and kept untouched when
//! that fails.
use std::borrow::Cow;

use flate2::{Decompress, FlushDecompress, Status};
use tracing::debug;

const MIN_OUTPUT_CAPACITY: usize = 4096;

/// Inflate `bytes` if they hold a complete raw deflate stream.
///
/// Never fails: a corrupt, truncated or empty stream means the input was
/// already plaintext, and it is returned borrowed.
pub fn decompress(bytes: &[u8]) -> Cow<'_, [u8]> {
    match inflate_raw(bytes) {
        Ok(inflated) => {
            debug!(
                compressed = bytes.len(),
                inflated = inflated.len(),
                "inflated raw deflate payload"
            );
            Cow::Owned(inflated)
        }
        Err(reason) => {
            debug!(%reason, "payload is not raw deflate, using bytes as-is");
            Cow::Borrowed(bytes)
        }
    }
}

/// Starting output buffer; the inflate loop doubles it while output keeps coming
fn initial_capacity(compressed_len: usize) -> usize {
    compressed_len.max(MIN_OUTPUT_CAPACITY)
}

fn inflate_raw(bytes: &[u8]) -> Result<Vec<u8>, String> {
    let mut inflater = Decompress::new(false);
    let mut out = Vec::with_capacity(initial_capacity(bytes.len()));

    loop {
        if out.len() == out.capacity() {
            out.reserve(out.capacity());
        }
        let consumed = inflater.total_in();
        let produced = inflater.total_out();
        let input = &bytes[consumed as usize..];

        let status = inflater
            .decompress_vec(input, &mut out, FlushDecompress::Finish)
            .map_err(|e| e.to_string())?;

        match status {
            Status::StreamEnd => return Ok(out),
            Status::Ok | Status::BufError => {
                // no progress with spare output room: the stream is truncated
                if inflater.total_in() == consumed && inflater.total_out() == produced {
                    return Err("truncated deflate stream".to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::DeflateEncoder;
    use std::io::Write;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_inflates_raw_deflate() {
        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let compressed = deflate(&payload);
        let out = decompress(&compressed);
        assert!(matches!(out, Cow::Owned(_)));
        assert_eq!(out.as_ref(), payload.as_slice());
    }

    #[test]
    fn test_plaintext_passthrough() {
        // 0xff selects the reserved block type and cannot start a deflate stream
        let plain = vec![0xffu8, 0x01, 0x02, 0x03];
        let out = decompress(&plain);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out.as_ref(), plain.as_slice());
    }

    #[test]
    fn test_truncated_stream_passthrough() {
        let payload = vec![7u8; 5000];
        let compressed = deflate(&payload);
        let truncated = &compressed[..compressed.len() / 2];
        let out = decompress(truncated);
        assert_eq!(out.as_ref(), truncated);
    }

    #[test]
    fn test_empty_input() {
        let out = decompress(&[]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_highly_compressible_payload_grows_buffer() {
        let payload = vec![0u8; 1 << 20];
        let compressed = deflate(&payload);
        assert!(compressed.len() * 4 < payload.len());
        assert_eq!(decompress(&compressed).len(), payload.len());
    }

    #[test]
    fn test_initial_capacity_tracks_input() {
        assert_eq!(initial_capacity(10), MIN_OUTPUT_CAPACITY);
        assert_eq!(initial_capacity(1 << 20), 1 << 20);
    }
}
