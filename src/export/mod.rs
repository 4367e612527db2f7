//! Per-block and range exports
//!
//! Exporters own their output files for the length of one traversal. Which
//! blocks reach which format is chosen with a [`Selector`] per format.
//! Dropping an exporter closes its files; [`PsdExporter::finish`] and
//! [`IqExporter::finish`] flush them and report what was written.
use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::Result;
use crate::block::{IqBlock, PsdBlock};

pub mod cfile;
pub mod csv;
pub mod mat;

use self::cfile::CfileWriter;
use self::csv::CsvWriter;

/// Which blocks a format receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selector {
    #[default]
    Disabled,
    Every,
    /// One block, 1-based
    Block(usize),
}

impl Selector {
    /// `None` or negative: disabled, `0`: every block, `k`: block `k` only
    pub fn from_arg(arg: Option<i64>) -> Self {
        match arg {
            None => Selector::Disabled,
            Some(n) if n < 0 => Selector::Disabled,
            Some(0) => Selector::Every,
            Some(n) => Selector::Block(n as usize),
        }
    }

    pub fn matches(&self, index: usize) -> bool {
        match self {
            Selector::Disabled => false,
            Selector::Every => true,
            Selector::Block(k) => *k == index,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Selector::Disabled)
    }
}

/// `input` with `.ext` appended (`scan.bin` → `scan.bin.csv`)
pub fn sibling_path(input: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    debug!(path = %path.display(), "creating export file");
    Ok(BufWriter::new(File::create(path)?))
}

/// Files produced by an exporter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOutputs {
    pub csv: Option<PathBuf>,
    pub cfile: Option<PathBuf>,
    pub mat: Vec<PathBuf>,
}

/// CSV + MAT export of PSD blocks
pub struct PsdExporter {
    input: PathBuf,
    csv_selector: Selector,
    mat_selector: Selector,
    csv: Option<CsvWriter<BufWriter<File>>>,
    outputs: ExportOutputs,
}

impl PsdExporter {
    /// Prepare exports next to `input`. The CSV file is created up front
    /// when enabled, MAT files one per selected block.
    pub fn open(input: &Path, csv: Selector, mat: Selector) -> Result<Self> {
        let mut outputs = ExportOutputs::default();
        let writer = if csv.is_enabled() {
            let path = sibling_path(input, "csv");
            let writer = CsvWriter::new(create(&path)?);
            outputs.csv = Some(path);
            Some(writer)
        } else {
            None
        };
        Ok(Self {
            input: input.to_path_buf(),
            csv_selector: csv,
            mat_selector: mat,
            csv: writer,
            outputs,
        })
    }

    pub fn on_block(&mut self, index: usize, block: &PsdBlock, decoded: &[f64]) -> Result<()> {
        if self.csv_selector.matches(index)
            && let Some(csv) = self.csv.as_mut()
        {
            csv.write_psd_block(index, block, decoded)?;
        }
        if self.mat_selector.matches(index) {
            let path = sibling_path(&self.input, &format!("{index}.mat"));
            mat::write_psd_block_mat(create(&path)?, index, block, decoded)?;
            self.outputs.mat.push(path);
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<ExportOutputs> {
        if let Some(csv) = self.csv.as_mut() {
            csv.flush()?;
        }
        info!(
            csv = self.outputs.csv.is_some(),
            mat = self.outputs.mat.len(),
            "PSD exports written"
        );
        Ok(self.outputs)
    }
}

/// CSV + MAT + cfile export of IQ snapshots
pub struct IqExporter {
    input: PathBuf,
    csv_selector: Selector,
    mat_selector: Selector,
    cfile_selector: Selector,
    csv: Option<CsvWriter<BufWriter<File>>>,
    cfile: Option<CfileWriter<BufWriter<File>>>,
    outputs: ExportOutputs,
}

impl IqExporter {
    pub fn open(input: &Path, csv: Selector, mat: Selector, cfile: Selector) -> Result<Self> {
        let mut outputs = ExportOutputs::default();
        let csv_writer = if csv.is_enabled() {
            let path = sibling_path(input, "csv");
            let writer = CsvWriter::new(create(&path)?);
            outputs.csv = Some(path);
            Some(writer)
        } else {
            None
        };
        let cfile_writer = if cfile.is_enabled() {
            let path = sibling_path(input, "cfile");
            let writer = CfileWriter::new(create(&path)?);
            outputs.cfile = Some(path);
            Some(writer)
        } else {
            None
        };
        Ok(Self {
            input: input.to_path_buf(),
            csv_selector: csv,
            mat_selector: mat,
            cfile_selector: cfile,
            csv: csv_writer,
            cfile: cfile_writer,
            outputs,
        })
    }

    pub fn on_block(&mut self, index: usize, block: &IqBlock) -> Result<()> {
        if self.csv_selector.matches(index)
            && let Some(csv) = self.csv.as_mut()
        {
            csv.write_iq_block(index, block)?;
        }
        if self.cfile_selector.matches(index)
            && let Some(cfile) = self.cfile.as_mut()
        {
            cfile.write_iq_block(block)?;
        }
        if self.mat_selector.matches(index) {
            let path = sibling_path(&self.input, &format!("{index}.mat"));
            mat::write_iq_block_mat(create(&path)?, index, block)?;
            self.outputs.mat.push(path);
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<ExportOutputs> {
        if let Some(csv) = self.csv.as_mut() {
            csv.flush()?;
        }
        if let Some(cfile) = self.cfile.as_mut() {
            cfile.flush()?;
        }
        info!(
            csv = self.outputs.csv.is_some(),
            cfile = self.outputs.cfile.is_some(),
            mat = self.outputs.mat.len(),
            "IQ exports written"
        );
        Ok(self.outputs)
    }
}
