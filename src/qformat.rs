//! Q-format sample decoding
//!
//! PSD magnitudes are stored as signed 16-bit fixed-point numbers with 7
//! fractional bits (dB × 128). The most negative value is reserved to mean
//! "no reading".

/// Stored value reserved for "no reading"
pub const NAN_SENTINEL: i16 = i16::MIN;

/// Number of fractional bits of the stored fixed-point values
pub const FRACTIONAL_BITS: u32 = 7;

const SCALE: f64 = (1u32 << FRACTIONAL_BITS) as f64;

/// Decode a single fixed-point sample to decibels
#[inline]
pub fn decode_sample(sample: i16) -> f64 {
    if sample == NAN_SENTINEL {
        f64::NAN
    } else {
        sample as f64 / SCALE
    }
}

/// Decode a block of fixed-point samples, one output per input, same order
pub fn decode(samples: &[i16]) -> Vec<f64> {
    samples.iter().copied().map(decode_sample).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_exact() {
        for s in [-32767i16, -6400, -1, 0, 1, 127, 128, 6400, 32767] {
            assert_eq!(decode_sample(s), s as f64 / 128.0);
        }
        assert_eq!(decode_sample(-6400), -50.0);
        assert_eq!(decode_sample(128), 1.0);
    }

    #[test]
    fn test_sentinel_is_nan() {
        assert!(decode_sample(NAN_SENTINEL).is_nan());
        assert!(decode_sample(-32768).is_nan());
    }

    #[test]
    fn test_decode_keeps_length_and_last_sample() {
        let decoded = decode(&[-6400, -32768, 0, 256]);
        assert_eq!(decoded.len(), 4);
        assert_eq!(decoded[0], -50.0);
        assert!(decoded[1].is_nan());
        assert_eq!(decoded[2], 0.0);
        assert_eq!(decoded[3], 2.0);
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode(&[]).is_empty());
    }

    #[test]
    fn test_decode_every_non_sentinel_value() {
        for s in (i16::MIN + 1)..=i16::MAX {
            let v = decode_sample(s);
            assert!(v.is_finite());
            assert_eq!(v * 128.0, s as f64);
        }
    }
}
