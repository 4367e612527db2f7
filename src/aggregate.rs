//! Per-bin aggregation of PSD blocks
//!
//! A PSD scan file interleaves blocks of several reading kinds over the same
//! frequency axis. [`AggregateState`] folds them, in file order, into:
//! - a running sum of `Average` blocks (divided on demand),
//! - a running minimum of `Minimum` blocks,
//! - a running maximum of `Maximum` blocks,
//!
//! plus scan-wide scalar extents kept in a [`ScanSummary`], which is also the
//! whole summary of a raw IQ file.
//!
//! NaN policy: a NaN bin poisons the average of that bin, but never updates
//! the running minimum or maximum (`f64::min` / `f64::max` ignore NaN).
//! Bins no `Minimum` (`Maximum`) block touched stay at `+∞` (`-∞`) and mean
//! "no data".
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::block::{IqBlock, PsdBlock};
use crate::reading::ReadingKind;
use crate::{Error, Result};

/// Linear frequency axis shared by every block of a PSD file
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyAxis {
    pub start_mhz: f64,
    pub end_mhz: f64,
    pub bin_count: usize,
}

impl FrequencyAxis {
    pub fn new(start_mhz: f64, end_mhz: f64, bin_count: usize) -> Self {
        Self {
            start_mhz,
            end_mhz,
            bin_count,
        }
    }

    /// Axis of a block: its Hz bounds in MHz, one bin per sample
    pub fn from_block(block: &PsdBlock) -> Self {
        Self::new(block.start_mhz(), block.stop_mhz(), block.bin_count())
    }

    pub fn span_mhz(&self) -> f64 {
        self.end_mhz - self.start_mhz
    }

    /// Frequency of bin `index` (MHz)
    pub fn frequency_at(&self, index: usize) -> f64 {
        if self.bin_count <= 1 {
            return self.start_mhz;
        }
        if index + 1 == self.bin_count {
            return self.end_mhz;
        }
        let step = self.span_mhz() / (self.bin_count - 1) as f64;
        self.start_mhz + index as f64 * step
    }

    /// All bin frequencies, endpoints included (`linspace`)
    pub fn frequencies(&self) -> Vec<f64> {
        (0..self.bin_count).map(|i| self.frequency_at(i)).collect()
    }

    /// Whether `block` lies on this axis
    pub fn matches(&self, block: &PsdBlock) -> bool {
        self.start_mhz == block.start_mhz()
            && self.end_mhz == block.stop_mhz()
            && self.bin_count == block.bin_count()
    }
}

/// Scan-wide scalar extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScanSummary {
    pub block_count: usize,
    /// Earliest block time, seconds since the Unix epoch
    pub min_time: Option<f64>,
    pub max_time: Option<f64>,
    pub min_freq_hz: Option<f64>,
    pub max_freq_hz: Option<f64>,
    /// PSD: bins; IQ: I/Q pairs
    pub total_sample_count: u64,
}

impl Default for ScanSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSummary {
    pub fn new() -> Self {
        Self {
            block_count: 0,
            min_time: None,
            max_time: None,
            min_freq_hz: None,
            max_freq_hz: None,
            total_sample_count: 0,
        }
    }

    /// Fold one block's extents in
    pub fn observe(&mut self, start_hz: f64, stop_hz: f64, epoch_seconds: f64, samples: usize) {
        self.block_count += 1;
        self.min_time = Some(self.min_time.map_or(epoch_seconds, |t| t.min(epoch_seconds)));
        self.max_time = Some(self.max_time.map_or(epoch_seconds, |t| t.max(epoch_seconds)));
        self.min_freq_hz = Some(self.min_freq_hz.map_or(start_hz, |f| f.min(start_hz)));
        self.max_freq_hz = Some(self.max_freq_hz.map_or(stop_hz, |f| f.max(stop_hz)));
        self.total_sample_count += samples as u64;
    }

    pub fn observe_iq(&mut self, block: &IqBlock) {
        self.observe(
            block.start_freq_hz,
            block.stop_freq_hz,
            block.timestamp.epoch_seconds(),
            block.pair_count(),
        );
    }
}

/// Running per-bin statistics of one PSD file
#[derive(Debug, Clone)]
pub struct AggregateState {
    axis: FrequencyAxis,
    frequencies: Vec<f64>,
    sum_avg: Vec<f64>,
    avg_contributor_count: u64,
    running_min: Vec<f64>,
    running_max: Vec<f64>,
    kind_counts: BTreeMap<ReadingKind, u64>,
    summary: ScanSummary,
}

impl AggregateState {
    pub fn new(axis: FrequencyAxis) -> Self {
        let n = axis.bin_count;
        Self {
            axis,
            frequencies: axis.frequencies(),
            sum_avg: vec![0.0; n],
            avg_contributor_count: 0,
            running_min: vec![f64::INFINITY; n],
            running_max: vec![f64::NEG_INFINITY; n],
            kind_counts: BTreeMap::new(),
            summary: ScanSummary::new(),
        }
    }

    /// State whose axis comes from the first block of a file
    pub fn from_first_block(block: &PsdBlock) -> Self {
        Self::new(FrequencyAxis::from_block(block))
    }

    /// Fold one block in. `decoded` holds the block's samples in dB.
    ///
    /// Fails with [`Error::AxisMismatch`] when the block is not on the
    /// state's axis; the state is left untouched in that case.
    pub fn update(&mut self, block: &PsdBlock, decoded: &[f64]) -> Result<()> {
        let position = self.summary.block_count + 1;
        if !self.axis.matches(block) || decoded.len() != self.axis.bin_count {
            return Err(Error::AxisMismatch {
                block: position,
                expected_start_mhz: self.axis.start_mhz,
                expected_end_mhz: self.axis.end_mhz,
                expected_bins: self.axis.bin_count,
                start_mhz: block.start_mhz(),
                end_mhz: block.stop_mhz(),
                bins: decoded.len(),
            });
        }

        match block.reading_kind {
            ReadingKind::Average => {
                for (sum, v) in self.sum_avg.iter_mut().zip(decoded) {
                    *sum += v;
                }
                self.avg_contributor_count += 1;
            }
            ReadingKind::Minimum => {
                for (m, &v) in self.running_min.iter_mut().zip(decoded) {
                    *m = m.min(v);
                }
            }
            ReadingKind::Maximum => {
                for (m, &v) in self.running_max.iter_mut().zip(decoded) {
                    *m = m.max(v);
                }
            }
            ReadingKind::StdDevOfAverage
            | ReadingKind::StdDevOfMinimum
            | ReadingKind::StdDevOfMaximum
            | ReadingKind::AverageOfMinimum
            | ReadingKind::AverageOfMaximum => {}
            ReadingKind::Unknown(code) => {
                warn!(block = position, code, "unclassified reading kind, not aggregated");
            }
        }

        *self.kind_counts.entry(block.reading_kind).or_insert(0) += 1;
        self.summary.observe(
            block.start_freq_hz,
            block.stop_freq_hz,
            block.timestamp.epoch_seconds(),
            block.bin_count(),
        );
        Ok(())
    }

    pub fn axis(&self) -> &FrequencyAxis {
        &self.axis
    }

    /// Bin frequencies in MHz
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Per-bin sum of all `Average` blocks
    pub fn sum_avg(&self) -> &[f64] {
        &self.sum_avg
    }

    pub fn avg_contributor_count(&self) -> u64 {
        self.avg_contributor_count
    }

    /// Per-bin average; all NaN when no `Average` block was seen
    pub fn average(&self) -> Vec<f64> {
        self.average_range(0, self.axis.bin_count)
    }

    pub(crate) fn average_range(&self, start: usize, end: usize) -> Vec<f64> {
        let bins = &self.sum_avg[start..end];
        if self.avg_contributor_count == 0 {
            return vec![f64::NAN; bins.len()];
        }
        let n = self.avg_contributor_count as f64;
        bins.iter().map(|s| s / n).collect()
    }

    pub fn running_min(&self) -> &[f64] {
        &self.running_min
    }

    pub fn running_max(&self) -> &[f64] {
        &self.running_max
    }

    /// Block count per reading kind, unknown codes included
    pub fn kind_counts(&self) -> &BTreeMap<ReadingKind, u64> {
        &self.kind_counts
    }

    pub fn count_of(&self, kind: ReadingKind) -> u64 {
        self.kind_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Blocks whose reading kind was not recognized
    pub fn unclassified_count(&self) -> u64 {
        self.kind_counts
            .iter()
            .filter(|(kind, _)| !kind.is_classified())
            .map(|(_, n)| n)
            .sum()
    }

    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }
}
