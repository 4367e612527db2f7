//! Test helper utilities for building synthetic capture files
#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::DeflateEncoder;
use prost::Message;
use specobs::proto::{
    Config, DateTime, EndToEndConfiguration, RawIqFile, RfSensorConfiguration, ScanFile,
    SpectralIqData, SpectralPsdData,
};

/// Build one PSD block over `[start_hz, stop_hz]`
///
/// # Arguments
/// * `kind` - Reading kind code (0 = Average, 1 = Minimum, 2 = Maximum, ...)
/// * `minutes` - Timestamp in minutes since the Unix epoch
/// * `points` - Q-format magnitudes, one per bin
pub fn psd_block(
    kind: i32,
    start_hz: f64,
    stop_hz: f64,
    minutes: i64,
    points: &[i32],
) -> SpectralPsdData {
    SpectralPsdData {
        time_stamp: Some(DateTime {
            value: minutes,
            scale: 2,
        }),
        start_frequency_hz: start_hz,
        stop_frequency_hz: stop_hz,
        reading_kind: kind,
        nmea_gpgga_location: "$GPGGA,000000.00,4740.0000,N,12207.0000,W".to_string(),
        output_data_points: points.to_vec(),
    }
}

/// Build one IQ snapshot timestamped in ticks (100 ns)
pub fn iq_block(ticks: i64, center_hz: f64, points: &[i32]) -> SpectralIqData {
    SpectralIqData {
        time_stamp: Some(DateTime { value: ticks, scale: 5 }),
        start_frequency_hz: center_hz - 1e6,
        stop_frequency_hz: center_hz + 1e6,
        center_frequency_hz: Some(center_hz),
        nmea_gpgga_location: String::new(),
        data_points: points.to_vec(),
    }
}

/// A station configuration with one RF sensor
pub fn station_config() -> Config {
    Config {
        station_name: "Test Station".to_string(),
        hardware_configuration: "Radio: USRP\\r\\nAntenna:\\tDiscone".to_string(),
        end_to_end_configuration: Some(EndToEndConfiguration {
            rf_sensor_configurations: vec![RfSensorConfiguration {
                gain: 30.0,
                antenna_port: "RX2".to_string(),
                scan_pattern: "Full".to_string(),
                effective_sampling_rate_hz: 20e6,
                samples_per_snapshot: 1024,
                additional_tune_delay: 0,
            }],
        }),
    }
}

/// The reference scan: Average `[-6400, -32768, 0]`, Minimum `[-6400; 3]`,
/// Maximum `[0; 3]`, all over 100-101 MHz
pub fn reference_scan() -> ScanFile {
    ScanFile {
        config: Some(station_config()),
        spectral_psd_data: vec![
            psd_block(0, 100e6, 101e6, 24_846_120, &[-6400, -32768, 0]),
            psd_block(1, 100e6, 101e6, 24_846_121, &[-6400, -6400, -6400]),
            psd_block(2, 100e6, 101e6, 24_846_122, &[0, 0, 0]),
        ],
    }
}

pub fn encode_scan(file: &ScanFile) -> Vec<u8> {
    file.encode_to_vec()
}

pub fn encode_raw_iq(file: &RawIqFile) -> Vec<u8> {
    file.encode_to_vec()
}

/// Raw deflate (no zlib header), as stations store compressed captures
pub fn deflate(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).expect("Failed to deflate");
    encoder.finish().expect("Failed to finish deflate stream")
}

/// Write `bytes` to a fresh file under the system temp directory
///
/// # Arguments
/// * `name` - File name, made unique per process
pub fn write_temp(name: &str, bytes: &[u8]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("specobs-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("Failed to create temp dir");
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write test file");
    path
}
