//! # bitrate-graph
//!
//! Plot the video bitrate of media files over time.
//!
//! `bitrate-graph` runs `ffprobe` against a media file, reads the per-packet
//! (or per-frame) sizes and timestamps of one video stream, sums them into
//! fixed time windows and renders the resulting megabits-per-second series
//! as a PNG chart. Several files can be overlaid on one comparison chart.
//!
//! ## Quick Start
//!
//! ### Chart One File
//!
//! ```no_run
//! use bitrate_graph::{AnalysisOptions, ChartOptions, analyze_bitrate, plot_results};
//!
//! let result = analyze_bitrate("input.mp4", &AnalysisOptions::new()).unwrap();
//! plot_results(&result, "input.mp4", "input", &ChartOptions::new()).unwrap();
//! ```
//!
//! ### Compare Several Files
//!
//! ```no_run
//! use bitrate_graph::{AnalysisOptions, ChartOptions, analyze_many, plot_comparison};
//!
//! let series = analyze_many(&["a.mp4", "b.mkv"], &AnalysisOptions::new()).unwrap();
//! plot_comparison(&series, "a vs b", "comparison", &ChartOptions::new()).unwrap();
//! ```
//!
//! ### Aggregate Records Directly
//!
//! ```
//! use bitrate_graph::{BitrateAggregator, PacketRecord};
//!
//! let records = [
//!     PacketRecord::new(0.0, 1_000_000, true),
//!     PacketRecord::new(0.5, 500_000, false),
//!     PacketRecord::new(1.2, 2_000_000, false),
//! ];
//! let result = BitrateAggregator::aggregate(records, "h264").unwrap();
//! assert_eq!(result.seconds(), &[0.0, 1.0]);
//! assert_eq!(result.bitrates(), &[12.0, 16.0]);
//! assert_eq!(result.keyframes(), &[0.0]);
//! ```
//!
//! ## Pipeline
//!
//! - **Probe** ([`MediaProbe`]) runs `ffprobe` and returns its XML or JSON
//!   output, optionally saved as a sidecar file.
//! - **Parse** ([`parser`]) turns that output into [`PacketRecord`]s plus the
//!   stream's codec identifier.
//! - **Aggregate** ([`BitrateAggregator`]) buckets records into windows and
//!   produces an [`AnalysisResult`].
//! - **Render** ([`plot_results`], [`plot_comparison`]) draws the chart.
//!
//! Every failure surfaces as a [`BitrateError`].

pub mod aggregate;
pub mod analysis;
mod canvas;
pub mod chart;
pub mod codec;
pub mod configuration;
pub mod error;
mod font;
pub mod format;
pub mod parser;
pub mod probe;
pub mod progress;
pub mod record;
pub mod statistics;
pub mod validation;

pub use aggregate::BitrateAggregator;
pub use analysis::{
    AnalysisResult, ComparisonSeries, analyze_bitrate, analyze_many, analyze_probe_output,
};
pub use chart::{
    ChartOptions, plot_comparison, plot_results, render_comparison, render_results,
};
pub use codec::pretty_codec_name;
pub use configuration::AnalysisOptions;
pub use error::BitrateError;
pub use format::{ProbeFormat, ProbeMode};
pub use parser::{JsonRecordParser, ParsedProbe, RecordParser, XmlRecordParser};
pub use probe::MediaProbe;
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use record::PacketRecord;
pub use statistics::{BitrateStatistics, mbit_label};
