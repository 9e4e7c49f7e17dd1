//! Bitrate analysis results and the per-file pipeline.
//!
//! [`analyze_bitrate`] runs the probe, writes the sidecar, parses the output
//! and aggregates it into an [`AnalysisResult`]. [`analyze_many`] does the
//! same for several files, strictly in order, stopping at the first failure.
//!
//! # Example
//!
//! ```no_run
//! use bitrate_graph::{AnalysisOptions, ProbeFormat, analyze_bitrate};
//!
//! let options = AnalysisOptions::new().with_format(ProbeFormat::Json);
//! let result = analyze_bitrate("input.mp4", &options)?;
//! let stats = result.statistics();
//! println!("{} windows, mean {:.2} Mbps", result.len(), stats.mean);
//! # Ok::<(), bitrate_graph::BitrateError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::aggregate::BitrateAggregator;
use crate::configuration::AnalysisOptions;
use crate::error::BitrateError;
use crate::format::ProbeFormat;
use crate::parser;
use crate::probe::{MediaProbe, write_sidecar};
use crate::progress::{OperationType, ProgressTracker};
use crate::statistics::BitrateStatistics;
use crate::validation::ensure_inputs_exist;

/// Per-window bitrate series of one stream.
///
/// `seconds` and `bitrates` have the same non-zero length, `seconds` is
/// strictly increasing, and every entry of `keyframes` is also an entry of
/// `seconds`. Results are never modified after construction.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct AnalysisResult {
    seconds: Vec<f64>,
    bitrates: Vec<f64>,
    keyframes: Vec<f64>,
    encoder: String,
}

impl AnalysisResult {
    pub(crate) fn from_parts(
        seconds: Vec<f64>,
        bitrates: Vec<f64>,
        keyframes: Vec<f64>,
        encoder: String,
    ) -> Self {
        debug_assert_eq!(seconds.len(), bitrates.len());
        Self {
            seconds,
            bitrates,
            keyframes,
            encoder,
        }
    }

    /// Window start times in seconds.
    pub fn seconds(&self) -> &[f64] {
        &self.seconds
    }

    /// Bitrate of each window in megabits per second.
    pub fn bitrates(&self) -> &[f64] {
        &self.bitrates
    }

    /// Start times of the windows containing at least one keyframe.
    pub fn keyframes(&self) -> &[f64] {
        &self.keyframes
    }

    /// Raw codec identifier reported by the probe.
    pub fn encoder(&self) -> &str {
        &self.encoder
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.seconds.len()
    }

    /// Always `false`; an empty stream fails aggregation instead.
    pub fn is_empty(&self) -> bool {
        self.seconds.is_empty()
    }

    /// Iterate over `(second, bitrate)` samples.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.seconds.iter().copied().zip(self.bitrates.iter().copied())
    }

    /// Mean, min, max and standard deviation of the bitrates.
    pub fn statistics(&self) -> BitrateStatistics {
        BitrateStatistics::from_samples(&self.bitrates).unwrap_or_default()
    }

    /// Split into `(seconds, bitrates, keyframes, encoder)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>, Vec<f64>, String) {
        (self.seconds, self.bitrates, self.keyframes, self.encoder)
    }
}

/// One labelled series of a comparison chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSeries {
    /// The analyzed stream.
    pub result: AnalysisResult,
    /// Legend label, usually the input file name.
    pub label: String,
}

impl ComparisonSeries {
    /// Pair a result with its label.
    pub fn new(result: AnalysisResult, label: impl Into<String>) -> Self {
        Self {
            result,
            label: label.into(),
        }
    }
}

/// Parse and aggregate probe output that is already in memory.
///
/// # Errors
///
/// Returns [`BitrateError::Parse`], [`BitrateError::EmptyStream`],
/// [`BitrateError::InvalidRecord`] or [`BitrateError::InvalidWindow`].
pub fn analyze_probe_output(
    raw: &str,
    format: ProbeFormat,
    options: &AnalysisOptions,
) -> Result<AnalysisResult, BitrateError> {
    let parsed = parser::parse(raw, format, &options.codec_field)?;
    let mut aggregator = BitrateAggregator::with_window(options.window_seconds)?;
    aggregator.extend(parsed.records)?;
    aggregator.finish(parsed.codec)
}

/// Probe a media file and compute its bitrate series.
///
/// The raw probe output is written to a sidecar file named
/// `<input-stem>.<format>` unless sidecars are disabled in `options`.
///
/// # Errors
///
/// Any failure is returned wrapped in [`BitrateError::Analysis`] naming the
/// file.
pub fn analyze_bitrate<P: AsRef<Path>>(
    path: P,
    options: &AnalysisOptions,
) -> Result<AnalysisResult, BitrateError> {
    let path = path.as_ref();
    analyze_file(path, options).map_err(|error| error.for_file(path))
}

fn analyze_file(path: &Path, options: &AnalysisOptions) -> Result<AnalysisResult, BitrateError> {
    log::debug!("Analyzing bitrate of {}", path.display());
    let raw = MediaProbe::run(path, options)?;

    if options.write_sidecar {
        let sidecar = write_sidecar(path, options.format, &raw, options.sidecar_dir.as_deref())?;
        log::debug!("Wrote probe output to {}", sidecar.display());
    }

    analyze_probe_output(&raw, options.format, options)
}

/// Analyze several files in order and label each result with its file name.
///
/// Every input is checked for existence before the first one is probed.
/// Processing stops at the first failing file; no partial list is returned.
///
/// # Errors
///
/// [`BitrateError::MissingInput`] listing every absent path, before any
/// file is probed. Otherwise the first per-file error, wrapped in
/// [`BitrateError::Analysis`].
pub fn analyze_many<P: AsRef<Path>>(
    paths: &[P],
    options: &AnalysisOptions,
) -> Result<Vec<ComparisonSeries>, BitrateError> {
    ensure_inputs_exist(paths)?;

    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::Analysis,
        Some(paths.len() as u64),
    );

    let mut series = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let result = analyze_bitrate(path, options)?;
        series.push(ComparisonSeries::new(result, file_label(path)));
        tracker.advance(Some(path.to_path_buf()));
    }
    tracker.finish();

    Ok(series)
}

/// The final path component, or the whole path if there is none.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// The file name without its extension, used for derived output names.
pub fn file_stem(path: &Path) -> PathBuf {
    path.file_stem()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(file_label(path)))
}
