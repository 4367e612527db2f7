//! GNU Radio `cfile` export
//!
//! Interleaved little-endian `f32` I,Q values, unscaled, every snapshot
//! appended to the same stream.
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::warn;

use crate::Result;
use crate::block::IqBlock;

pub struct CfileWriter<W: Write> {
    writer: W,
    pairs_written: u64,
}

impl<W: Write> CfileWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pairs_written: 0,
        }
    }

    /// Append the complete I,Q pairs of one snapshot. A trailing lone I
    /// value has no Q to pair with and is left out.
    pub fn write_iq_block(&mut self, block: &IqBlock) -> Result<()> {
        if block.has_unpaired_sample() {
            warn!(
                values = block.samples.len(),
                "odd number of I/Q values, dropping the trailing one from the cfile"
            );
        }
        for sample in block.to_complex() {
            self.writer.write_f32::<LittleEndian>(sample.re)?;
            self.writer.write_f32::<LittleEndian>(sample.im)?;
        }
        self.pairs_written += block.pair_count() as u64;
        Ok(())
    }

    pub fn pairs_written(&self) -> u64 {
        self.pairs_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
