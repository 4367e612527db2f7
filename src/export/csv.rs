//! Tabular text export
//!
//! Per-block dumps are appended to one growing stream: a few `Key,value`
//! metadata records, a marker record, then one value (PSD) or one `I,Q` pair
//! (IQ) per record. Records have varying field counts, so the writer is
//! flexible; fields holding commas (NMEA sentences) are quoted.
use std::io::{self, Write};

use csv::WriterBuilder;

use crate::block::{IqBlock, PsdBlock};
use crate::slice::{SeriesSelection, SpectrumSlice};
use crate::{Error, Result};

const DATA_MARKER: &str = "------DATA STARTS HERE------";

/// CSV sink over any writer
pub struct CsvWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: WriterBuilder::new().flexible(true).from_writer(writer),
        }
    }

    fn write_pair(&mut self, key: &str, value: &str) -> Result<()> {
        self.writer.write_record([key, value])?;
        Ok(())
    }

    fn write_single(&mut self, value: &str) -> Result<()> {
        self.writer.write_record([value])?;
        Ok(())
    }

    /// Append one PSD block with its decoded values
    pub fn write_psd_block(
        &mut self,
        index: usize,
        block: &PsdBlock,
        decoded: &[f64],
    ) -> Result<()> {
        self.write_pair("Block", &index.to_string())?;
        self.write_pair("timestamp", &block.timestamp.format_ctime())?;
        self.write_pair("Start Freq", &format!("{}MHz", fmt_value(block.start_mhz())))?;
        self.write_pair("Stop Freq", &format!("{}MHz", fmt_value(block.stop_mhz())))?;
        self.write_pair("Data Type", &block.reading_kind.to_string())?;
        self.write_pair("NmeaGpggaLocation", &block.location)?;
        self.write_pair("Data count", &decoded.len().to_string())?;
        self.write_single(DATA_MARKER)?;
        for v in decoded {
            self.write_single(&fmt_value(*v))?;
        }
        Ok(())
    }

    /// Append one IQ snapshot as `I,Q` rows
    pub fn write_iq_block(&mut self, index: usize, block: &IqBlock) -> Result<()> {
        let center = block
            .center_freq_hz
            .map(|hz| format!("{}MHz", fmt_value(hz / 1e6)))
            .unwrap_or_default();
        self.write_pair("Block", &index.to_string())?;
        self.write_pair("timestamp", &block.timestamp.format_ctime())?;
        self.write_pair("Start Freq", &format!("{}MHz", fmt_value(block.start_freq_hz / 1e6)))?;
        self.write_pair("Stop Freq", &format!("{}MHz", fmt_value(block.stop_freq_hz / 1e6)))?;
        self.write_pair("Center Freq", &center)?;
        self.write_pair("NmeaGpggaLocation", &block.location)?;
        self.write_pair("Data count", &block.pair_count().to_string())?;
        self.write_pair("I", "Q")?;
        for (i, q) in block.pairs() {
            self.write_pair(&i.to_string(), &q.to_string())?;
        }
        Ok(())
    }

    /// Write a sliced aggregate: a header record, then one record per bin
    pub fn write_slice(
        &mut self,
        slice: &SpectrumSlice<'_>,
        series: SeriesSelection,
    ) -> Result<()> {
        let mut header = vec!["Freq (MHz)"];
        if series.avg {
            header.push("Average");
        }
        if series.max {
            header.push("Max Hold");
        }
        if series.min {
            header.push("Min Hold");
        }
        self.writer.write_record(&header)?;

        for i in 0..slice.len() {
            let mut row = vec![fmt_value(slice.freq[i])];
            if series.avg {
                row.push(fmt_value(slice.avg[i]));
            }
            if series.max {
                row.push(fmt_value(slice.max[i]));
            }
            if series.min {
                row.push(fmt_value(slice.min[i]));
            }
            self.writer.write_record(&row)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| Error::Io(io::Error::new(err.error().kind(), err.to_string())))
    }
}

/// Shortest round-trip rendering, always with a decimal point (`-50.0`,
/// `NaN`, `inf`)
pub fn fmt_value(v: f64) -> String {
    format!("{v:?}")
}
