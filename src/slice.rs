//! Frequency-range slicing of an aggregate
//!
//! A requested `[start, end]` MHz window is mapped onto an inclusive bin
//! range by linear interpolation over the axis:
//!
//! ```text
//! index = floor((f - axis.start) / (axis.end - axis.start) * bin_count)
//! ```
//!
//! clamped to the last bin. Errors here are local to the request and never
//! touch the aggregate.
use std::ops::RangeInclusive;

use crate::aggregate::{AggregateState, FrequencyAxis};
use crate::{Error, Result};

/// Which aggregate series a caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSelection {
    pub min: bool,
    pub avg: bool,
    pub max: bool,
}

impl Default for SeriesSelection {
    fn default() -> Self {
        Self {
            min: false,
            avg: true,
            max: true,
        }
    }
}

impl SeriesSelection {
    pub fn all() -> Self {
        Self {
            min: true,
            avg: true,
            max: true,
        }
    }
}

/// A plot/export request over part of the axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeRequest {
    pub start_mhz: f64,
    pub end_mhz: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub series: SeriesSelection,
}

impl RangeRequest {
    /// Request covering the whole axis with the default y window
    pub fn full(axis: &FrequencyAxis) -> Self {
        Self {
            start_mhz: axis.start_mhz,
            end_mhz: axis.end_mhz,
            y_min: -140.0,
            y_max: 0.0,
            series: SeriesSelection::default(),
        }
    }

    pub fn validate_y_bounds(&self) -> Result<()> {
        if self.y_min.is_finite() && self.y_max.is_finite() && self.y_min < self.y_max {
            Ok(())
        } else {
            Err(Error::InvalidYBounds {
                y_min: self.y_min,
                y_max: self.y_max,
            })
        }
    }

    /// Validate the whole request and slice `state`
    pub fn apply<'a>(&self, state: &'a AggregateState) -> Result<SpectrumSlice<'a>> {
        self.validate_y_bounds()?;
        state.slice(self.start_mhz, self.end_mhz)
    }
}

/// Sub-range of an aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumSlice<'a> {
    /// Inclusive bin indices into the full axis
    pub bins: RangeInclusive<usize>,
    pub freq: &'a [f64],
    pub avg: Vec<f64>,
    pub min: &'a [f64],
    pub max: &'a [f64],
}

impl SpectrumSlice<'_> {
    pub fn len(&self) -> usize {
        self.freq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }

    /// Finite values of the selected series lying outside `[y_min, y_max]`
    pub fn count_outside(&self, y_min: f64, y_max: f64, series: SeriesSelection) -> usize {
        let outside = |values: &[f64]| {
            values
                .iter()
                .filter(|v| v.is_finite() && (**v < y_min || **v > y_max))
                .count()
        };
        let mut n = 0;
        if series.avg {
            n += outside(&self.avg);
        }
        if series.min {
            n += outside(self.min);
        }
        if series.max {
            n += outside(self.max);
        }
        n
    }
}

/// Inclusive bin range covering `[start_mhz, end_mhz]`
pub fn bin_range(
    axis: &FrequencyAxis,
    start_mhz: f64,
    end_mhz: f64,
) -> Result<RangeInclusive<usize>> {
    let in_bounds = |f: f64| f.is_finite() && axis.start_mhz <= f && f <= axis.end_mhz;
    if !in_bounds(start_mhz) || !in_bounds(end_mhz) {
        return Err(Error::RangeOutOfBounds {
            start_mhz,
            end_mhz,
            lower_mhz: axis.start_mhz,
            upper_mhz: axis.end_mhz,
        });
    }
    if start_mhz > end_mhz {
        return Err(Error::RangeInverted { start_mhz, end_mhz });
    }
    Ok(bin_index(axis, start_mhz)..=bin_index(axis, end_mhz))
}

fn bin_index(axis: &FrequencyAxis, freq_mhz: f64) -> usize {
    let span = axis.span_mhz();
    if axis.bin_count == 0 || span <= 0.0 {
        return 0;
    }
    let position = ((freq_mhz - axis.start_mhz) / span * axis.bin_count as f64).floor();
    (position as usize).min(axis.bin_count - 1)
}

impl AggregateState {
    /// Slice the aggregate to `[start_mhz, end_mhz]`
    pub fn slice(&self, start_mhz: f64, end_mhz: f64) -> Result<SpectrumSlice<'_>> {
        let bins = bin_range(self.axis(), start_mhz, end_mhz)?;
        if self.axis().bin_count == 0 {
            return Ok(SpectrumSlice {
                bins,
                freq: &[],
                avg: Vec::new(),
                min: &[],
                max: &[],
            });
        }
        let (lo, hi) = (*bins.start(), *bins.end() + 1);
        Ok(SpectrumSlice {
            freq: &self.frequencies()[lo..hi],
            avg: self.average_range(lo, hi),
            min: &self.running_min()[lo..hi],
            max: &self.running_max()[lo..hi],
            bins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_state() -> AggregateState {
        AggregateState::new(FrequencyAxis::new(100.0, 200.0, 101))
    }

    #[test]
    fn test_single_point_slice() {
        let state = wide_state();
        let slice = state.slice(150.0, 150.0).unwrap();
        assert_eq!(slice.len(), 1);
        assert_eq!(slice.bins, 50..=50);
        assert_eq!(slice.freq, &[150.0]);
    }

    #[test]
    fn test_full_slice_includes_last_bin() {
        let state = wide_state();
        let slice = state.slice(100.0, 200.0).unwrap();
        assert_eq!(slice.len(), 101);
        assert_eq!(slice.bins, 0..=100);
        assert_eq!(slice.avg.len(), 101);
        assert_eq!(slice.min.len(), 101);
        assert_eq!(slice.max.len(), 101);
    }

    #[test]
    fn test_out_of_bounds() {
        let state = wide_state();
        for (start, end) in [(50.0, 60.0), (90.0, 150.0), (150.0, 201.0), (f64::NAN, 150.0)] {
            let err = state.slice(start, end).unwrap_err();
            assert!(matches!(err, Error::RangeOutOfBounds { .. }), "{start}-{end}");
            assert!(err.is_recoverable());
        }
    }

    #[test]
    fn test_inverted() {
        let state = wide_state();
        let err = state.slice(160.0, 150.0).unwrap_err();
        assert!(matches!(
            err,
            Error::RangeInverted { start_mhz, end_mhz } if start_mhz == 160.0 && end_mhz == 150.0
        ));
    }

    #[test]
    fn test_zero_span_axis() {
        let axis = FrequencyAxis::new(100.0, 100.0, 4);
        assert_eq!(bin_range(&axis, 100.0, 100.0).unwrap(), 0..=0);
    }

    #[test]
    fn test_empty_axis() {
        let state = AggregateState::new(FrequencyAxis::new(100.0, 101.0, 0));
        let slice = state.slice(100.0, 101.0).unwrap();
        assert!(slice.is_empty());
    }

    #[test]
    fn test_range_request_y_bounds() {
        let state = wide_state();
        let mut request = RangeRequest::full(state.axis());
        assert!(request.apply(&state).is_ok());

        request.y_min = 0.0;
        request.y_max = -140.0;
        let err = request.apply(&state).unwrap_err();
        assert!(matches!(err, Error::InvalidYBounds { .. }));
    }

    #[test]
    fn test_count_outside() {
        let slice = SpectrumSlice {
            bins: 0..=2,
            freq: &[1.0, 2.0, 3.0],
            avg: vec![-150.0, -50.0, f64::NAN],
            min: &[f64::INFINITY, -200.0, -10.0],
            max: &[5.0, f64::NEG_INFINITY, -1.0],
        };
        assert_eq!(slice.count_outside(-140.0, 0.0, SeriesSelection::default()), 2);
        assert_eq!(slice.count_outside(-140.0, 0.0, SeriesSelection::all()), 3);
    }
}
