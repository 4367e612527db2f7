//! MAT-file (Level 5) named-array export
//!
//! Writes the subset of the Level 5 container needed here: uncompressed
//! `double` matrices (real or complex) and `char` arrays, each stored as a
//! named `miMATRIX` element. Files load with MATLAB `load` and
//! `scipy.io.loadmat`. One-dimensional data is written as a `1 × N` row.
//!
//! ```text
//! header (128 bytes): text[116] | subsys offset[8] | version u16 | "IM"
//! element:  type u32 | size u32 | payload (padded to 8 bytes)
//! miMATRIX: flags | dimensions | name | real part [| imaginary part]
//! ```
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use num_complex::Complex;

use crate::Result;
use crate::block::{IqBlock, PsdBlock};
use crate::slice::SpectrumSlice;

const HEADER_TEXT_LEN: usize = 116;
const MAT_VERSION: u16 = 0x0100;

const MI_INT8: u32 = 1;
const MI_UINT16: u32 = 4;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_DOUBLE: u32 = 9;
const MI_MATRIX: u32 = 14;

const MX_CHAR_CLASS: u32 = 4;
const MX_DOUBLE_CLASS: u32 = 6;
const COMPLEX_FLAG: u32 = 0x0800;

/// Level 5 MAT-file sink
pub struct MatWriter<W: Write> {
    writer: W,
}

impl<W: Write> MatWriter<W> {
    /// Start a file, writing the 128-byte header
    pub fn new(mut writer: W, description: &str) -> Result<Self> {
        let mut text = format!("MATLAB 5.0 MAT-file, {description}").into_bytes();
        text.truncate(HEADER_TEXT_LEN);
        text.resize(HEADER_TEXT_LEN, b' ');
        writer.write_all(&text)?;
        writer.write_all(&[0u8; 8])?;
        writer.write_u16::<LittleEndian>(MAT_VERSION)?;
        writer.write_all(b"IM")?;
        Ok(Self { writer })
    }

    /// Real `1 × N` double row
    pub fn write_row(&mut self, name: &str, values: &[f64]) -> Result<()> {
        let mut body = Vec::with_capacity(64 + values.len() * 8);
        matrix_prelude(&mut body, MX_DOUBLE_CLASS, 1, values.len(), name)?;
        write_doubles(&mut body, values.iter().copied())?;
        self.write_element(MI_MATRIX, &body)
    }

    /// Real `1 × 1` double
    pub fn write_scalar(&mut self, name: &str, value: f64) -> Result<()> {
        self.write_row(name, &[value])
    }

    /// Complex `1 × N` double row
    pub fn write_complex_row(&mut self, name: &str, values: &[Complex<f64>]) -> Result<()> {
        let mut body = Vec::with_capacity(64 + values.len() * 16);
        matrix_prelude(&mut body, MX_DOUBLE_CLASS | COMPLEX_FLAG, 1, values.len(), name)?;
        write_doubles(&mut body, values.iter().map(|c| c.re))?;
        write_doubles(&mut body, values.iter().map(|c| c.im))?;
        self.write_element(MI_MATRIX, &body)
    }

    /// `1 × N` char array
    pub fn write_str(&mut self, name: &str, value: &str) -> Result<()> {
        let units: Vec<u16> = value.encode_utf16().collect();
        let mut body = Vec::with_capacity(64 + units.len() * 2);
        matrix_prelude(&mut body, MX_CHAR_CLASS, 1, units.len(), name)?;
        let mut data = Vec::with_capacity(units.len() * 2);
        for u in units {
            data.write_u16::<LittleEndian>(u)?;
        }
        write_subelement(&mut body, MI_UINT16, &data)?;
        self.write_element(MI_MATRIX, &body)
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_element(&mut self, data_type: u32, payload: &[u8]) -> Result<()> {
        write_subelement(&mut self.writer, data_type, payload)
    }
}

/// Array flags, dimensions and name of a matrix element
fn matrix_prelude(
    body: &mut Vec<u8>,
    flags: u32,
    rows: usize,
    cols: usize,
    name: &str,
) -> Result<()> {
    let mut flag_words = Vec::with_capacity(8);
    flag_words.write_u32::<LittleEndian>(flags)?;
    flag_words.write_u32::<LittleEndian>(0)?;
    write_subelement(body, MI_UINT32, &flag_words)?;

    let mut dims = Vec::with_capacity(8);
    dims.write_i32::<LittleEndian>(rows as i32)?;
    dims.write_i32::<LittleEndian>(cols as i32)?;
    write_subelement(body, MI_INT32, &dims)?;

    write_subelement(body, MI_INT8, name.as_bytes())
}

fn write_doubles(body: &mut Vec<u8>, values: impl Iterator<Item = f64>) -> Result<()> {
    let mut data = Vec::new();
    for v in values {
        data.write_f64::<LittleEndian>(v)?;
    }
    write_subelement(body, MI_DOUBLE, &data)
}

/// Tag + payload, zero-padded to an 8-byte boundary
fn write_subelement<W: Write>(w: &mut W, data_type: u32, payload: &[u8]) -> Result<()> {
    w.write_u32::<LittleEndian>(data_type)?;
    w.write_u32::<LittleEndian>(payload.len() as u32)?;
    w.write_all(payload)?;
    let padding = (8 - payload.len() % 8) % 8;
    w.write_all(&[0u8; 8][..padding])?;
    Ok(())
}

/// One PSD block: `cnt`, `timestamp`, `start_freq`, `end_freq`, `data_type`, `data`
pub fn write_psd_block_mat<W: Write>(
    w: W,
    index: usize,
    block: &PsdBlock,
    decoded: &[f64],
) -> Result<W> {
    let mut mat = MatWriter::new(w, "PSD block export")?;
    mat.write_scalar("cnt", index as f64)?;
    mat.write_scalar("timestamp", block.timestamp.epoch_seconds())?;
    mat.write_scalar("start_freq", block.start_freq_hz)?;
    mat.write_scalar("end_freq", block.stop_freq_hz)?;
    mat.write_str("data_type", block.reading_kind.label())?;
    mat.write_row("data", decoded)?;
    mat.finish()
}

/// One IQ snapshot: `cnt`, `timestamp`, `freq` (center), `data` (complex)
pub fn write_iq_block_mat<W: Write>(w: W, index: usize, block: &IqBlock) -> Result<W> {
    let data: Vec<Complex<f64>> = block
        .pairs()
        .map(|(i, q)| Complex::new(i as f64, q as f64))
        .collect();
    let mut mat = MatWriter::new(w, "raw IQ snapshot export")?;
    mat.write_scalar("cnt", index as f64)?;
    mat.write_scalar("timestamp", block.timestamp.epoch_seconds())?;
    mat.write_scalar("freq", block.center_freq_or_mid())?;
    mat.write_complex_row("data", &data)?;
    mat.finish()
}

/// A sliced aggregate: `Freq`, `Avg`, `Max_Hold`, `Min_Hold`
pub fn write_slice_mat<W: Write>(w: W, slice: &SpectrumSlice<'_>) -> Result<W> {
    let mut mat = MatWriter::new(w, "PSD range export")?;
    mat.write_row("Freq", slice.freq)?;
    mat.write_row("Avg", &slice.avg)?;
    mat.write_row("Max_Hold", slice.max)?;
    mat.write_row("Min_Hold", slice.min)?;
    mat.finish()
}
