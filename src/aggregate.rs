//! Bitrate aggregation.
//!
//! [`BitrateAggregator`] bins an ordered stream of [`PacketRecord`]s into
//! fixed-width windows anchored at the first record's timestamp and turns
//! each window into a bitrate sample in megabits per second.
//!
//! Window `i` covers `[t0 + i·w, t0 + (i + 1)·w)`. Its start time is the
//! sample's timestamp. Windows without any record are kept with a bitrate of
//! exactly `0.0` so the time axis stays uniformly spaced. Nothing is emitted
//! past the window holding the last record.
//!
//! A record within [`BOUNDARY_TOLERANCE`] of a window width below a boundary
//! belongs to the later window, so `0.3` with `w = 0.1` starts window 3 even
//! though `0.3 / 0.1` is slightly less than 3 in binary floating point.
//! A stream may span at most [`MAX_WINDOWS`] windows.
//!
//! Records are pushed one at a time and only the current window's running
//! totals are kept, so the record list does not need to outlive the pass.
//!
//! # Example
//!
//! ```
//! use bitrate_graph::{BitrateAggregator, PacketRecord};
//!
//! let records = [
//!     PacketRecord::new(0.0, 1_000_000, true),
//!     PacketRecord::new(0.5, 500_000, false),
//!     PacketRecord::new(1.2, 2_000_000, true),
//! ];
//! let result = BitrateAggregator::aggregate(records, "h264")?;
//! assert_eq!(result.seconds(), &[0.0, 1.0]);
//! assert_eq!(result.bitrates(), &[12.0, 16.0]);
//! assert_eq!(result.keyframes(), &[0.0, 1.0]);
//! # Ok::<(), bitrate_graph::BitrateError>(())
//! ```

use crate::analysis::AnalysisResult;
use crate::error::BitrateError;
use crate::record::PacketRecord;

/// Default window width in seconds.
pub const DEFAULT_WINDOW_SECONDS: f64 = 1.0;

/// Fraction of a window width by which a timestamp may fall short of a
/// boundary and still be placed in the later window.
pub const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Largest number of windows one stream may span, about 115 days at the
/// default width.
pub const MAX_WINDOWS: u64 = 10_000_000;

const BITS_PER_BYTE: f64 = 8.0;
const BITS_PER_MEGABIT: f64 = 1_000_000.0;

/// Streaming accumulator turning records into per-window bitrates.
#[derive(Debug, Clone)]
pub struct BitrateAggregator {
    window_seconds: f64,
    origin: Option<f64>,
    previous: Option<f64>,
    records_seen: usize,
    current_window: u64,
    current_bytes: u64,
    current_has_keyframe: bool,
    seconds: Vec<f64>,
    bitrates: Vec<f64>,
    keyframes: Vec<f64>,
}

impl BitrateAggregator {
    /// Create an aggregator with the default one-second window.
    pub fn new() -> Self {
        Self {
            window_seconds: DEFAULT_WINDOW_SECONDS,
            origin: None,
            previous: None,
            records_seen: 0,
            current_window: 0,
            current_bytes: 0,
            current_has_keyframe: false,
            seconds: Vec::new(),
            bitrates: Vec::new(),
            keyframes: Vec::new(),
        }
    }

    /// Create an aggregator with a custom window width.
    ///
    /// # Errors
    ///
    /// Returns [`BitrateError::InvalidWindow`] unless `window_seconds` is
    /// finite and strictly positive.
    pub fn with_window(window_seconds: f64) -> Result<Self, BitrateError> {
        if !window_seconds.is_finite() || window_seconds <= 0.0 {
            return Err(BitrateError::InvalidWindow(window_seconds));
        }
        Ok(Self {
            window_seconds,
            ..Self::new()
        })
    }

    /// Aggregate a whole record sequence with the default window.
    ///
    /// # Errors
    ///
    /// See [`push`](BitrateAggregator::push) and
    /// [`finish`](BitrateAggregator::finish).
    pub fn aggregate<I>(records: I, encoder: impl Into<String>) -> Result<AnalysisResult, BitrateError>
    where
        I: IntoIterator,
        I::Item: Into<PacketRecord>,
    {
        let mut aggregator = Self::new();
        aggregator.extend(records)?;
        aggregator.finish(encoder)
    }

    /// Window width in seconds.
    pub fn window_seconds(&self) -> f64 {
        self.window_seconds
    }

    /// Number of records pushed so far.
    pub fn records_seen(&self) -> usize {
        self.records_seen
    }

    /// Feed one record.
    ///
    /// # Errors
    ///
    /// Returns [`BitrateError::InvalidRecord`] if the timestamp is negative,
    /// not finite, or smaller than the previous record's timestamp. The
    /// aggregator does not re-sort its input.
    ///
    /// Returns [`BitrateError::TooManyWindows`] if the record would open a
    /// window past [`MAX_WINDOWS`], and [`BitrateError::SizeOverflow`] if the
    /// current window's byte total no longer fits in a `u64`.
    pub fn push(&mut self, record: PacketRecord) -> Result<(), BitrateError> {
        let index = self.records_seen;
        let timestamp = record.timestamp_seconds;
        let out_of_order = self.previous.is_some_and(|previous| timestamp < previous);
        if !timestamp.is_finite() || timestamp < 0.0 || out_of_order {
            return Err(BitrateError::InvalidRecord {
                index,
                timestamp,
                previous: self.previous,
            });
        }

        let origin = *self.origin.get_or_insert(timestamp);
        let position = ((timestamp - origin) / self.window_seconds + BOUNDARY_TOLERANCE).floor();
        if position >= MAX_WINDOWS as f64 {
            return Err(BitrateError::TooManyWindows {
                index,
                timestamp,
                limit: MAX_WINDOWS,
            });
        }
        let window = position as u64;

        let bytes = if window > self.current_window {
            record.size_bytes
        } else {
            self.current_bytes
                .checked_add(record.size_bytes)
                .ok_or(BitrateError::SizeOverflow { index })?
        };

        while self.current_window < window {
            self.close_window();
            self.current_window += 1;
        }

        self.current_bytes = bytes;
        self.current_has_keyframe |= record.is_keyframe;
        self.previous = Some(timestamp);
        self.records_seen += 1;
        Ok(())
    }

    /// Feed every record of an iterator, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Same as [`push`](BitrateAggregator::push).
    pub fn extend<I>(&mut self, records: I) -> Result<(), BitrateError>
    where
        I: IntoIterator,
        I::Item: Into<PacketRecord>,
    {
        records
            .into_iter()
            .try_for_each(|record| self.push(record.into()))
    }

    /// Close the last window and build the result.
    ///
    /// # Errors
    ///
    /// Returns [`BitrateError::EmptyStream`] if no record was pushed.
    pub fn finish(mut self, encoder: impl Into<String>) -> Result<AnalysisResult, BitrateError> {
        if self.origin.is_none() {
            return Err(BitrateError::EmptyStream);
        }
        self.close_window();

        log::debug!(
            "Aggregated {} records into {} windows of {}s ({} with keyframes)",
            self.records_seen,
            self.seconds.len(),
            self.window_seconds,
            self.keyframes.len()
        );

        Ok(AnalysisResult::from_parts(
            self.seconds,
            self.bitrates,
            self.keyframes,
            encoder.into(),
        ))
    }

    fn close_window(&mut self) {
        let origin = self.origin.unwrap_or_default();
        let start = origin + self.current_window as f64 * self.window_seconds;
        let megabits = self.current_bytes as f64 * BITS_PER_BYTE / BITS_PER_MEGABIT;

        self.seconds.push(start);
        self.bitrates.push(megabits / self.window_seconds);
        if self.current_has_keyframe {
            self.keyframes.push(start);
        }

        self.current_bytes = 0;
        self.current_has_keyframe = false;
    }
}

impl Default for BitrateAggregator {
    fn default() -> Self {
        Self::new()
    }
}
