//! Text and JSON summaries of a traversal
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::aggregate::{AggregateState, FrequencyAxis, ScanSummary};
use crate::block::{IqBlock, PsdBlock};
use crate::capture::render_config;
use crate::export::ExportOutputs;
use crate::proto::Config;
use crate::timestamp::format_epoch_seconds;

/// One line of per-block metadata for a PSD block
pub fn psd_block_line(index: usize, block: &PsdBlock) -> String {
    format!(
        "Block {index}: {} | {:.3}-{:.3} MHz | {} | {} bins | NmeaGpggaLocation: {}",
        block.timestamp.format_ctime(),
        block.start_mhz(),
        block.stop_mhz(),
        block.reading_kind,
        block.bin_count(),
        block.location
    )
}

/// One line of per-block metadata for an IQ snapshot
pub fn iq_block_line(index: usize, block: &IqBlock) -> String {
    format!(
        "Block {index}: {} | {:.3}-{:.3} MHz | center {:.3} MHz | {} I/Q pairs | \
         NmeaGpggaLocation: {}",
        block.timestamp.format_ctime(),
        block.start_freq_hz / 1e6,
        block.stop_freq_hz / 1e6,
        block.center_freq_or_mid() / 1e6,
        block.pair_count(),
        block.location
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindCount {
    pub kind: String,
    pub code: i32,
    pub blocks: u64,
}

/// Scan-wide extents in display units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extents {
    pub blocks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_freq_mhz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_freq_mhz: Option<f64>,
    pub samples: u64,
    /// Size of the samples as stored, 16 bits per value
    pub stored_i16_bytes: u64,
}

impl Extents {
    fn from_summary(summary: &ScanSummary, bytes_per_sample: u64) -> Self {
        Self {
            blocks: summary.block_count,
            first_time: summary.min_time.map(format_epoch_seconds),
            last_time: summary.max_time.map(format_epoch_seconds),
            min_freq_mhz: summary.min_freq_hz.map(|f| f / 1e6),
            max_freq_mhz: summary.max_freq_hz.map(|f| f / 1e6),
            samples: summary.total_sample_count,
            stored_i16_bytes: summary.total_sample_count * bytes_per_sample,
        }
    }

    fn render(&self, out: &mut String, unit: &str) {
        let _ = writeln!(out, "Blocks: {}", self.blocks);
        if let (Some(first), Some(last)) = (&self.first_time, &self.last_time) {
            let _ = writeln!(out, "Time span: {first} .. {last}");
        }
        if let (Some(lo), Some(hi)) = (self.min_freq_mhz, self.max_freq_mhz) {
            let _ = writeln!(out, "Frequency span: {lo:.3} .. {hi:.3} MHz");
        }
        let _ = writeln!(out, "Total {unit}: {}", self.samples);
        let _ = writeln!(out, "Stored size (16-bit samples): {} bytes", self.stored_i16_bytes);
    }
}

/// Written export files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportList {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
}

impl From<ExportOutputs> for ExportList {
    fn from(outputs: ExportOutputs) -> Self {
        let files = outputs
            .csv
            .into_iter()
            .chain(outputs.cfile)
            .chain(outputs.mat)
            .collect();
        Self { files }
    }
}

impl ExportList {
    fn render(&self, out: &mut String) {
        for file in &self.files {
            let _ = writeln!(out, "Wrote {}", file.display());
        }
    }
}

/// Summary of a PSD scan file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PsdReport {
    pub path: PathBuf,
    pub station_name: Option<String>,
    #[serde(skip)]
    pub config_text: String,
    pub axis: FrequencyAxis,
    pub extents: Extents,
    pub kinds: Vec<KindCount>,
    pub averaged_blocks: u64,
    pub unclassified_blocks: u64,
    #[serde(flatten)]
    pub exports: ExportList,
}

impl PsdReport {
    pub fn new(
        path: &Path,
        config: Option<&Config>,
        state: &AggregateState,
        exports: ExportOutputs,
    ) -> Self {
        let kinds = state
            .kind_counts()
            .iter()
            .map(|(kind, blocks)| KindCount {
                kind: kind.to_string(),
                code: kind.code(),
                blocks: *blocks,
            })
            .collect();
        Self {
            path: path.to_path_buf(),
            station_name: config.map(|c| c.station_name.clone()),
            config_text: render_config(config),
            axis: *state.axis(),
            extents: Extents::from_summary(state.summary(), 2),
            kinds,
            averaged_blocks: state.avg_contributor_count(),
            unclassified_blocks: state.unclassified_count(),
            exports: exports.into(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "File: {}", self.path.display());
        out.push_str(&self.config_text);
        self.extents.render(&mut out, "bins");
        let _ = writeln!(
            out,
            "Axis: {:.3} .. {:.3} MHz, {} bins",
            self.axis.start_mhz, self.axis.end_mhz, self.axis.bin_count
        );
        for kind in &self.kinds {
            let _ = writeln!(out, "  {}: {} blocks", kind.kind, kind.blocks);
        }
        let _ = writeln!(out, "Averaged blocks: {}", self.averaged_blocks);
        if self.unclassified_blocks > 0 {
            let _ = writeln!(out, "Unclassified blocks: {}", self.unclassified_blocks);
        }
        self.exports.render(&mut out);
        out
    }
}

/// Summary of a raw IQ file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IqReport {
    pub path: PathBuf,
    pub station_name: Option<String>,
    #[serde(skip)]
    pub config_text: String,
    pub extents: Extents,
    #[serde(flatten)]
    pub exports: ExportList,
}

impl IqReport {
    pub fn new(
        path: &Path,
        config: Option<&Config>,
        summary: &ScanSummary,
        exports: ExportOutputs,
    ) -> Self {
        Self {
            path: path.to_path_buf(),
            station_name: config.map(|c| c.station_name.clone()),
            config_text: render_config(config),
            // one I/Q pair is two 16-bit values
            extents: Extents::from_summary(summary, 4),
            exports: exports.into(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "File: {}", self.path.display());
        out.push_str(&self.config_text);
        self.extents.render(&mut out, "I/Q pairs");
        self.exports.render(&mut out);
        out
    }
}
