//! Reading-kind classification of PSD blocks
use std::fmt;

use serde::Serialize;

/// What a PSD block measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ReadingKind {
    Average,
    Minimum,
    Maximum,
    StdDevOfAverage,
    StdDevOfMinimum,
    StdDevOfMaximum,
    AverageOfMinimum,
    AverageOfMaximum,
    /// Code outside the known table, carried for reporting
    Unknown(i32),
}

impl ReadingKind {
    /// Classify a wire code. Total: unrecognized codes become `Unknown`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ReadingKind::Average,
            1 => ReadingKind::Minimum,
            2 => ReadingKind::Maximum,
            3 => ReadingKind::StdDevOfAverage,
            4 => ReadingKind::StdDevOfMinimum,
            5 => ReadingKind::StdDevOfMaximum,
            6 => ReadingKind::AverageOfMinimum,
            7 => ReadingKind::AverageOfMaximum,
            other => ReadingKind::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ReadingKind::Average => 0,
            ReadingKind::Minimum => 1,
            ReadingKind::Maximum => 2,
            ReadingKind::StdDevOfAverage => 3,
            ReadingKind::StdDevOfMinimum => 4,
            ReadingKind::StdDevOfMaximum => 5,
            ReadingKind::AverageOfMinimum => 6,
            ReadingKind::AverageOfMaximum => 7,
            ReadingKind::Unknown(code) => code,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReadingKind::Average => "Average",
            ReadingKind::Minimum => "Minimum",
            ReadingKind::Maximum => "Maximum",
            ReadingKind::StdDevOfAverage => "StdDev of Average",
            ReadingKind::StdDevOfMinimum => "StdDev of Minimum",
            ReadingKind::StdDevOfMaximum => "StdDev of Maximum",
            ReadingKind::AverageOfMinimum => "Avg of Minimum",
            ReadingKind::AverageOfMaximum => "Avg of Maximum",
            ReadingKind::Unknown(_) => "Unknown",
        }
    }

    pub fn is_classified(self) -> bool {
        !matches!(self, ReadingKind::Unknown(_))
    }
}

impl fmt::Display for ReadingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingKind::Unknown(code) => write!(f, "Unknown ({code})"),
            kind => f.write_str(kind.label()),
        }
    }
}
