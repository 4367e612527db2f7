//! Wire schema of Spectrum Observatory capture files
//!
//! Messages are defined with prost derive macros. Timestamps use the
//! protobuf-net `bcl.DateTime` layout (zig-zag value + scale code), and
//! sample arrays are packed `sint32`.
//!
//! ```text
//! ScanFile                     RawIqFile
//!   ├── config: Config           ├── config: Config
//!   └── spectral_psd_data[]      └── spectral_iq_data[]
//!         ├── time_stamp               ├── time_stamp
//!         ├── start/stop Hz            ├── start/stop/center Hz
//!         ├── reading_kind             ├── nmea_gpgga_location
//!         ├── nmea_gpgga_location      └── data_points (I,Q,I,Q,...)
//!         └── output_data_points
//! ```

use prost::Message;

/// protobuf-net `DateTime`: `value` units of `scale` since the Unix epoch
#[derive(Clone, Copy, PartialEq, Message)]
pub struct DateTime {
    #[prost(sint64, tag = "1")]
    pub value: i64,

    /// `TimeSpanScale` code (0 = days .. 5 = ticks, 15 = min/max marker)
    #[prost(int32, tag = "2")]
    pub scale: i32,
}

/// Per-sensor acquisition settings
#[derive(Clone, PartialEq, Message)]
pub struct RfSensorConfiguration {
    #[prost(double, tag = "1")]
    pub gain: f64,

    #[prost(string, tag = "2")]
    pub antenna_port: String,

    #[prost(string, tag = "3")]
    pub scan_pattern: String,

    #[prost(double, tag = "4")]
    pub effective_sampling_rate_hz: f64,

    #[prost(int32, tag = "5")]
    pub samples_per_snapshot: i32,

    #[prost(int32, tag = "6")]
    pub additional_tune_delay: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct EndToEndConfiguration {
    #[prost(message, repeated, tag = "1")]
    pub rf_sensor_configurations: Vec<RfSensorConfiguration>,
}

/// Station configuration stored at the head of every capture
#[derive(Clone, PartialEq, Message)]
pub struct Config {
    #[prost(string, tag = "1")]
    pub station_name: String,

    /// Free text, with line breaks stored as literal `\r\n` / `\t` escapes
    #[prost(string, tag = "2")]
    pub hardware_configuration: String,

    #[prost(message, optional, tag = "3")]
    pub end_to_end_configuration: Option<EndToEndConfiguration>,
}

/// One PSD measurement block
#[derive(Clone, PartialEq, Message)]
pub struct SpectralPsdData {
    #[prost(message, optional, tag = "1")]
    pub time_stamp: Option<DateTime>,

    #[prost(double, tag = "2")]
    pub start_frequency_hz: f64,

    #[prost(double, tag = "3")]
    pub stop_frequency_hz: f64,

    #[prost(int32, tag = "4")]
    pub reading_kind: i32,

    #[prost(string, tag = "5")]
    pub nmea_gpgga_location: String,

    /// Q-format magnitudes, one per bin
    #[prost(sint32, repeated, tag = "6")]
    pub output_data_points: Vec<i32>,
}

/// One raw IQ snapshot
#[derive(Clone, PartialEq, Message)]
pub struct SpectralIqData {
    #[prost(message, optional, tag = "1")]
    pub time_stamp: Option<DateTime>,

    #[prost(double, tag = "2")]
    pub start_frequency_hz: f64,

    #[prost(double, tag = "3")]
    pub stop_frequency_hz: f64,

    #[prost(double, optional, tag = "4")]
    pub center_frequency_hz: Option<f64>,

    #[prost(string, tag = "5")]
    pub nmea_gpgga_location: String,

    /// Interleaved I,Q integer samples
    #[prost(sint32, repeated, tag = "6")]
    pub data_points: Vec<i32>,
}

/// PSD scan capture
#[derive(Clone, PartialEq, Message)]
pub struct ScanFile {
    #[prost(message, optional, tag = "1")]
    pub config: Option<Config>,

    #[prost(message, repeated, tag = "2")]
    pub spectral_psd_data: Vec<SpectralPsdData>,
}

/// Raw IQ capture
#[derive(Clone, PartialEq, Message)]
pub struct RawIqFile {
    #[prost(message, optional, tag = "1")]
    pub config: Option<Config>,

    #[prost(message, repeated, tag = "2")]
    pub spectral_iq_data: Vec<SpectralIqData>,
}
