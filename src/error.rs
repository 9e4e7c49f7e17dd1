//! Error types for the `bitrate-graph` crate.
//!
//! This module defines [`BitrateError`], the unified error type returned by
//! every fallible operation in the crate. Variants carry enough context (file
//! paths, record indices, probe stderr) to diagnose a failed run from the
//! message alone.

use std::{io::Error as IoError, path::PathBuf};

use image::ImageError;
use thiserror::Error;

use crate::format::ProbeFormat;

/// The unified error type for all `bitrate-graph` operations.
///
/// Every error is fatal for the file being analyzed. Batch analysis stops at
/// the first error and reports it wrapped in [`BitrateError::Analysis`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BitrateError {
    /// The probe output could not be parsed.
    #[error("Failed to parse {format} probe output: {reason}")]
    Parse {
        /// Format the text was expected to be in.
        format: ProbeFormat,
        /// What was wrong with it.
        reason: String,
    },

    /// The probe reported no records for the selected stream.
    #[error("Stream contains no records to aggregate")]
    EmptyStream,

    /// A record carried a negative, non-finite, or out-of-order timestamp.
    #[error(
        "Invalid record {index}: timestamp {timestamp} (previous {})",
        .previous.map_or_else(|| "none".to_string(), |value| value.to_string())
    )]
    InvalidRecord {
        /// Position of the record in the input sequence.
        index: usize,
        /// The offending timestamp in seconds.
        timestamp: f64,
        /// Timestamp of the preceding record, if any.
        previous: Option<f64>,
    },

    /// The byte total of one window does not fit in a `u64`.
    #[error("Invalid record {index}: window byte total overflows")]
    SizeOverflow {
        /// Position of the record whose size overflowed the total.
        index: usize,
    },

    /// A record lies further from the first one than the window limit allows.
    #[error("Invalid record {index}: timestamp {timestamp} lies beyond the {limit}-window limit")]
    TooManyWindows {
        /// Position of the record in the input sequence.
        index: usize,
        /// The offending timestamp in seconds.
        timestamp: f64,
        /// Maximum number of windows one stream may produce.
        limit: u64,
    },

    /// One or more input files do not exist.
    #[error("The following input files could not be found: {}", format_paths(.paths))]
    MissingInput {
        /// Every path that was missing.
        paths: Vec<PathBuf>,
    },

    /// The aggregation window width is not a positive, finite number.
    #[error("Window width must be a positive number of seconds, got {0}")]
    InvalidWindow(f64),

    /// A format tag other than `xml` or `json` was requested.
    #[error("Unsupported probe format: {0} (expected xml or json)")]
    UnsupportedFormat(String),

    /// The probe executable could not be started.
    #[error("Failed to run {program}: {source}")]
    ProbeSpawn {
        /// Program that was invoked.
        program: PathBuf,
        /// Underlying spawn error.
        source: IoError,
    },

    /// The probe exited with a failure status.
    #[error("ffprobe failed on {path} (exit code {status:?}): {stderr}")]
    ProbeFailed {
        /// Media file being probed.
        path: PathBuf,
        /// Exit code, if the process was not killed by a signal.
        status: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// A comparison chart was requested without any series.
    #[error("No results provided to plot a comparison")]
    EmptyComparison,

    /// Analysis of a specific file failed.
    #[error("{path}: {source}")]
    Analysis {
        /// File whose analysis failed.
        path: PathBuf,
        /// The underlying failure.
        source: Box<BitrateError>,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while saving a chart.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl BitrateError {
    /// Attach the path of the file being analyzed to this error.
    pub(crate) fn for_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            already @ BitrateError::Analysis { .. } => already,
            other => BitrateError::Analysis {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    pub(crate) fn parse(format: ProbeFormat, reason: impl Into<String>) -> Self {
        BitrateError::Parse {
            format,
            reason: reason.into(),
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
