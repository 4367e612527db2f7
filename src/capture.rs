//! Capture file loading
//!
//! This module reads PSD scan files and raw IQ files from disk (or from an
//! in-memory buffer), reverses the optional raw-deflate wrapper and decodes
//! the message container. Both synchronous and asynchronous entry points are
//! provided.
use std::path::{Path, PathBuf};

use prost::Message;
use tracing::debug;

use crate::Result;
use crate::decompress::decompress;
use crate::proto::{Config, RawIqFile, ScanFile};

/// Record family of a capture file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    /// Power spectral density scans (`ScanFile`)
    Psd,
    /// Raw I/Q snapshots (`RawIqFile`)
    Iq,
}

/// Decode a PSD scan file from its stored bytes
pub fn decode_scan_file(bytes: &[u8]) -> Result<ScanFile> {
    let payload = decompress(bytes);
    let file = ScanFile::decode(payload.as_ref())?;
    debug!(blocks = file.spectral_psd_data.len(), "decoded PSD scan file");
    Ok(file)
}

/// Decode a raw IQ file from its stored bytes
pub fn decode_raw_iq_file(bytes: &[u8]) -> Result<RawIqFile> {
    let payload = decompress(bytes);
    let file = RawIqFile::decode(payload.as_ref())?;
    debug!(blocks = file.spectral_iq_data.len(), "decoded raw IQ file");
    Ok(file)
}

/// Read and decode a PSD scan file
pub fn read_scan_file<P: AsRef<Path>>(path: P) -> Result<ScanFile> {
    let path = expanduser(path.as_ref().to_path_buf());
    let bytes = std::fs::read(&path)?;
    decode_scan_file(&bytes)
}

/// Read and decode a raw IQ file
pub fn read_raw_iq_file<P: AsRef<Path>>(path: P) -> Result<RawIqFile> {
    let path = expanduser(path.as_ref().to_path_buf());
    let bytes = std::fs::read(&path)?;
    decode_raw_iq_file(&bytes)
}

/// Read and decode a PSD scan file without blocking the runtime
pub async fn read_scan_file_async<P: AsRef<Path>>(path: P) -> Result<ScanFile> {
    let path = expanduser(path.as_ref().to_path_buf());
    let bytes = tokio::fs::read(&path).await?;
    decode_scan_file(&bytes)
}

/// Read and decode a raw IQ file without blocking the runtime
pub async fn read_raw_iq_file_async<P: AsRef<Path>>(path: P) -> Result<RawIqFile> {
    let path = expanduser(path.as_ref().to_path_buf());
    let bytes = tokio::fs::read(&path).await?;
    decode_raw_iq_file(&bytes)
}

/// Render the station configuration as indented text.
///
/// The hardware configuration is stored with literal `\n`, `\r` and `\t`
/// escapes; they are turned back into line breaks (continued with a tab) and
/// tabs, and `\r` is dropped.
pub fn render_config(config: Option<&Config>) -> String {
    let Some(config) = config else {
        return String::from("(no station configuration)\n");
    };

    let mut output = String::new();
    output.push_str(&format!("StationName: {}\n", config.station_name));
    output.push_str(&format!(
        "HardwareConfiguration: {}\n",
        unescape_config_text(&config.hardware_configuration)
    ));

    if let Some(end_to_end) = &config.end_to_end_configuration {
        for (n, sensor) in end_to_end.rf_sensor_configurations.iter().enumerate() {
            output.push_str(&format!("Sensor #{}\n", n + 1));
            output.push_str(&format!("\tGain: {}\n", sensor.gain));
            output.push_str(&format!("\tAntenna Port: {}\n", sensor.antenna_port));
            output.push_str(&format!("\tScan Pattern: {}\n", sensor.scan_pattern));
            output.push_str(&format!(
                "\tEffective Samp Rate: {}\n",
                sensor.effective_sampling_rate_hz
            ));
            output.push_str(&format!(
                "\tSamples Per Snapshot: {}\n",
                sensor.samples_per_snapshot
            ));
            output.push_str(&format!(
                "\tAdditional Tune Delay: {}\n",
                sensor.additional_tune_delay
            ));
        }
    }

    output
}

fn unescape_config_text(text: &str) -> String {
    text.replace("\\n", "\n\t")
        .replace("\\r", "")
        .replace("\\t", "\t")
}

/// Replace a leading `~` with the user's home directory
pub fn expanduser(path: PathBuf) -> PathBuf {
    if let Some(stripped) = path.to_str().and_then(|p| p.strip_prefix("~"))
        && let Some(home_dir) = dirs::home_dir()
    {
        return home_dir.join(stripped.trim_start_matches('/'));
    }
    path
}
