#![doc = include_str!("../readme.md")]

pub mod aggregate;
pub mod block;
pub mod capture;
pub mod decompress;
pub mod error;
pub mod export;
pub mod proto;
pub mod qformat;
pub mod reading;
pub mod report;
pub mod slice;
pub mod timestamp;
pub mod traverse;

pub use aggregate::{AggregateState, FrequencyAxis, ScanSummary};
pub use block::{IqBlock, PsdBlock};
pub use capture::{
    CaptureKind, decode_raw_iq_file, decode_scan_file, read_raw_iq_file, read_raw_iq_file_async,
    read_scan_file, read_scan_file_async,
};
pub use decompress::decompress;
pub use error::{Error, Result};
pub use export::{IqExporter, PsdExporter, Selector};
pub use qformat::decode;
pub use reading::ReadingKind;
pub use slice::{RangeRequest, SeriesSelection, SpectrumSlice};
pub use timestamp::{TimeScale, Timestamp, resolve_scale};
pub use traverse::{aggregate_psd, summarize_iq};
