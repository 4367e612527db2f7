//! Typed measurement blocks
//!
//! Wire messages are turned into [`PsdBlock`] / [`IqBlock`] before they reach
//! the aggregation engine: timestamp scale codes are resolved, reading kinds
//! classified, and sample values narrowed to 16 bits.
use num_complex::Complex;

use crate::proto;
use crate::reading::ReadingKind;
use crate::timestamp::{TimeScale, Timestamp};
use crate::{Error, Result};

/// One PSD measurement block
#[derive(Debug, Clone, PartialEq)]
pub struct PsdBlock {
    pub start_freq_hz: f64,
    pub stop_freq_hz: f64,
    pub reading_kind: ReadingKind,
    pub timestamp: Timestamp,
    /// Q-format magnitudes, one per bin
    pub samples: Vec<i16>,
    pub location: String,
}

/// One raw IQ snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct IqBlock {
    pub start_freq_hz: f64,
    pub stop_freq_hz: f64,
    pub center_freq_hz: Option<f64>,
    pub timestamp: Timestamp,
    /// Interleaved I,Q
    pub samples: Vec<i16>,
    pub location: String,
}

impl PsdBlock {
    /// Build from a wire message. `index` is the 1-based block position,
    /// used in error reports.
    pub fn from_wire(index: usize, data: &proto::SpectralPsdData) -> Result<Self> {
        Ok(Self {
            start_freq_hz: data.start_frequency_hz,
            stop_freq_hz: data.stop_frequency_hz,
            reading_kind: ReadingKind::from_code(data.reading_kind),
            timestamp: timestamp_from_wire(data.time_stamp)?,
            samples: narrow_samples(index, &data.output_data_points)?,
            location: data.nmea_gpgga_location.clone(),
        })
    }

    pub fn start_mhz(&self) -> f64 {
        self.start_freq_hz / 1e6
    }

    pub fn stop_mhz(&self) -> f64 {
        self.stop_freq_hz / 1e6
    }

    pub fn bin_count(&self) -> usize {
        self.samples.len()
    }
}

impl IqBlock {
    /// Build from a wire message. `index` is the 1-based block position.
    pub fn from_wire(index: usize, data: &proto::SpectralIqData) -> Result<Self> {
        Ok(Self {
            start_freq_hz: data.start_frequency_hz,
            stop_freq_hz: data.stop_frequency_hz,
            center_freq_hz: data.center_frequency_hz,
            timestamp: timestamp_from_wire(data.time_stamp)?,
            samples: narrow_samples(index, &data.data_points)?,
            location: data.nmea_gpgga_location.clone(),
        })
    }

    /// Number of complete I,Q pairs (a trailing unpaired value is ignored)
    pub fn pair_count(&self) -> usize {
        self.samples.len() / 2
    }

    /// Whether the snapshot ends with a lone I value
    pub fn has_unpaired_sample(&self) -> bool {
        self.samples.len() % 2 == 1
    }

    /// Iterate over `(i, q)` pairs
    pub fn pairs(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        self.samples.chunks_exact(2).map(|c| (c[0], c[1]))
    }

    /// Samples as complex values, unscaled
    pub fn to_complex(&self) -> Vec<Complex<f32>> {
        self.pairs()
            .map(|(i, q)| Complex::new(i as f32, q as f32))
            .collect()
    }

    /// Center frequency, falling back to the middle of the span
    pub fn center_freq_or_mid(&self) -> f64 {
        self.center_freq_hz
            .unwrap_or((self.start_freq_hz + self.stop_freq_hz) / 2.0)
    }
}

fn timestamp_from_wire(ts: Option<proto::DateTime>) -> Result<Timestamp> {
    let ts = ts.unwrap_or_default();
    Ok(Timestamp::new(ts.value, TimeScale::from_code(ts.scale)?))
}

fn narrow_samples(block: usize, values: &[i32]) -> Result<Vec<i16>> {
    values
        .iter()
        .map(|&value| i16::try_from(value).map_err(|_| Error::SampleOutOfRange { block, value }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn psd_wire() -> proto::SpectralPsdData {
        proto::SpectralPsdData {
            time_stamp: Some(proto::DateTime { value: 10, scale: 1 }),
            start_frequency_hz: 100e6,
            stop_frequency_hz: 101e6,
            reading_kind: 2,
            nmea_gpgga_location: "$GPGGA,".to_string(),
            output_data_points: vec![-32768, 0, 32767],
        }
    }

    #[test]
    fn test_psd_from_wire() {
        let block = PsdBlock::from_wire(1, &psd_wire()).unwrap();
        assert_eq!(block.reading_kind, ReadingKind::Maximum);
        assert_eq!(block.timestamp, Timestamp::new(10, TimeScale::Hours));
        assert_eq!(block.samples, vec![i16::MIN, 0, i16::MAX]);
        assert_eq!(block.start_mhz(), 100.0);
        assert_eq!(block.stop_mhz(), 101.0);
        assert_eq!(block.bin_count(), 3);
    }

    #[test]
    fn test_missing_timestamp_defaults_to_epoch_days() {
        let mut wire = psd_wire();
        wire.time_stamp = None;
        let block = PsdBlock::from_wire(1, &wire).unwrap();
        assert_eq!(block.timestamp, Timestamp::new(0, TimeScale::Days));
    }

    #[test]
    fn test_unsupported_scale() {
        let mut wire = psd_wire();
        wire.time_stamp = Some(proto::DateTime { value: 1, scale: 15 });
        let err = PsdBlock::from_wire(1, &wire).unwrap_err();
        assert!(matches!(err, Error::UnsupportedTimestampUnit(15)));
    }

    #[test]
    fn test_sample_out_of_range() {
        let mut wire = psd_wire();
        wire.output_data_points.push(40_000);
        let err = PsdBlock::from_wire(4, &wire).unwrap_err();
        assert!(matches!(
            err,
            Error::SampleOutOfRange {
                block: 4,
                value: 40_000
            }
        ));
    }

    #[test]
    fn test_iq_pairs() {
        let wire = proto::SpectralIqData {
            time_stamp: Some(proto::DateTime { value: 0, scale: 5 }),
            start_frequency_hz: 90e6,
            stop_frequency_hz: 110e6,
            center_frequency_hz: None,
            nmea_gpgga_location: String::new(),
            data_points: vec![1, -1, 2, -2, 3],
        };
        let block = IqBlock::from_wire(1, &wire).unwrap();
        assert_eq!(block.pair_count(), 2);
        assert_eq!(block.pairs().collect::<Vec<_>>(), vec![(1, -1), (2, -2)]);
        let complex = block.to_complex();
        assert_eq!(complex[1], Complex::new(2.0, -2.0));
        assert_eq!(block.center_freq_or_mid(), 100e6);
    }

    #[test]
    fn test_unpaired_trailing_sample() {
        let mut block = IqBlock {
            start_freq_hz: 0.0,
            stop_freq_hz: 1e6,
            center_freq_hz: None,
            timestamp: Timestamp::default(),
            samples: vec![1, 2, 3],
            location: String::new(),
        };
        assert!(block.has_unpaired_sample());
        assert_eq!(block.pair_count(), 1);
        block.samples.push(4);
        assert!(!block.has_unpaired_sample());
    }
}
