//! Analysis configuration.
//!
//! [`AnalysisOptions`] is a builder that threads the probe settings, the
//! sidecar policy, the aggregation window and an optional progress callback
//! through the analysis functions without growing every signature.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bitrate_graph::{AnalysisOptions, ProbeFormat, ProbeMode, ProgressCallback, ProgressInfo};
//!
//! struct LogProgress;
//! impl ProgressCallback for LogProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{:?}: {} done", info.operation, info.current);
//!     }
//! }
//!
//! let options = AnalysisOptions::new()
//!     .with_format(ProbeFormat::Json)
//!     .with_mode(ProbeMode::Packets)
//!     .with_sidecar_dir("probes")
//!     .with_progress(Arc::new(LogProgress));
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::sync::Arc;

use crate::aggregate::DEFAULT_WINDOW_SECONDS;
use crate::format::{ProbeFormat, ProbeMode};
use crate::parser::DEFAULT_CODEC_FIELD;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Stream selected when none is configured: the first video stream.
pub const DEFAULT_STREAM_SELECTOR: &str = "v:0";

/// Configuration for bitrate analysis.
///
/// All fields have defaults matching the command-line tool: XML output,
/// frame mode, first video stream, one-second windows, sidecars written to
/// the current directory.
#[derive(Clone)]
pub struct AnalysisOptions {
    /// Probe output format. Also the sidecar extension.
    pub(crate) format: ProbeFormat,
    /// Which stream units to request.
    pub(crate) mode: ProbeMode,
    /// Probe executable. Defaults to `ffprobe` on `PATH`.
    pub(crate) ffprobe_path: PathBuf,
    /// `-select_streams` argument.
    pub(crate) stream_selector: String,
    /// Stream field carrying the codec identifier.
    pub(crate) codec_field: String,
    /// Aggregation window width in seconds.
    pub(crate) window_seconds: f64,
    /// Whether to persist the raw probe output.
    pub(crate) write_sidecar: bool,
    /// Directory for sidecar files. `None` means the current directory.
    pub(crate) sidecar_dir: Option<PathBuf>,
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for AnalysisOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AnalysisOptions")
            .field("format", &self.format)
            .field("mode", &self.mode)
            .field("ffprobe_path", &self.ffprobe_path)
            .field("stream_selector", &self.stream_selector)
            .field("codec_field", &self.codec_field)
            .field("window_seconds", &self.window_seconds)
            .field("write_sidecar", &self.write_sidecar)
            .field("sidecar_dir", &self.sidecar_dir)
            .finish()
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            format: ProbeFormat::default(),
            mode: ProbeMode::default(),
            ffprobe_path: PathBuf::from("ffprobe"),
            stream_selector: DEFAULT_STREAM_SELECTOR.to_string(),
            codec_field: DEFAULT_CODEC_FIELD.to_string(),
            window_seconds: DEFAULT_WINDOW_SECONDS,
            write_sidecar: true,
            sidecar_dir: None,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Set the probe output format.
    #[must_use]
    pub fn with_format(mut self, format: ProbeFormat) -> Self {
        self.format = format;
        self
    }

    /// Request frames or packets from the probe.
    #[must_use]
    pub fn with_mode(mut self, mode: ProbeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Use a specific probe executable instead of `ffprobe` on `PATH`.
    #[must_use]
    pub fn with_ffprobe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffprobe_path = path.into();
        self
    }

    /// Set the `-select_streams` specifier (e.g. `v:1`).
    #[must_use]
    pub fn with_stream_selector(mut self, selector: impl Into<String>) -> Self {
        self.stream_selector = selector.into();
        self
    }

    /// Read the codec identifier from a different stream field.
    #[must_use]
    pub fn with_codec_field(mut self, field: impl Into<String>) -> Self {
        self.codec_field = field.into();
        self
    }

    /// Set the aggregation window width in seconds.
    ///
    /// Validated when the analysis runs; non-positive or non-finite values
    /// fail with [`BitrateError::InvalidWindow`](crate::BitrateError::InvalidWindow).
    #[must_use]
    pub fn with_window_seconds(mut self, seconds: f64) -> Self {
        self.window_seconds = seconds;
        self
    }

    /// Enable or disable writing the sidecar file. Enabled by default.
    #[must_use]
    pub fn with_sidecar(mut self, enabled: bool) -> Self {
        self.write_sidecar = enabled;
        self
    }

    /// Write sidecar files into `dir` instead of the current directory.
    #[must_use]
    pub fn with_sidecar_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sidecar_dir = Some(dir.into());
        self
    }

    /// Attach a progress callback, fired once per analyzed file.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Probe output format.
    pub fn format(&self) -> ProbeFormat {
        self.format
    }

    /// Probe mode.
    pub fn mode(&self) -> ProbeMode {
        self.mode
    }

    /// Aggregation window width in seconds.
    pub fn window_seconds(&self) -> f64 {
        self.window_seconds
    }
}
