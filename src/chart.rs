//! Bitrate chart rendering.
//!
//! [`plot_results`] draws one stream's bitrate over time with its keyframe
//! windows marked by dashed red lines and the summary statistics in the
//! title. [`plot_comparison`] overlays several streams, each in its own
//! color, without keyframe markers. Series in a comparison may differ in
//! length and time range; they share axes scaled to cover all of them.
//!
//! # Example
//!
//! ```no_run
//! use bitrate_graph::{AnalysisOptions, ChartOptions, analyze_bitrate, plot_results};
//!
//! let result = analyze_bitrate("input.mp4", &AnalysisOptions::new())?;
//! let image = plot_results(&result, "input.mp4", "input", &ChartOptions::new())?;
//! println!("wrote {}", image.display());
//! # Ok::<(), bitrate_graph::BitrateError>(())
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use crate::analysis::{AnalysisResult, ComparisonSeries};
use crate::canvas::{BLACK, Canvas, GRID, KEYFRAME_RED, WHITE, text_size};
use crate::codec::pretty_codec_name;
use crate::error::BitrateError;
use crate::statistics::mbit_label;

/// Keyframe count above which markers are dropped from single-file charts.
pub const DEFAULT_MAX_KEYFRAME_MARKERS: usize = 75;

/// Line colors cycled through by comparison charts.
const PALETTE: [Rgb<u8>; 10] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
    Rgb([227, 119, 194]),
    Rgb([127, 127, 127]),
    Rgb([188, 189, 34]),
    Rgb([23, 190, 207]),
];

const TITLE_SCALE: u32 = 3;
const LABEL_SCALE: u32 = 2;
const MARGIN_LEFT: u32 = 140;
const MARGIN_RIGHT: u32 = 60;
const MARGIN_TOP: u32 = 130;
const MARGIN_BOTTOM: u32 = 100;
const TICK_TARGET: f64 = 10.0;
const LINE_THICKNESS: u32 = 2;
const DASH: u32 = 6;

/// Options for chart rendering.
#[derive(Debug, Clone)]
#[must_use]
pub struct ChartOptions {
    /// Image width in pixels. Default: 1920.
    pub width: u32,
    /// Image height in pixels. Default: 1080.
    pub height: u32,
    /// Single-file charts with more keyframes than this draw none.
    /// Default: 75.
    pub max_keyframe_markers: usize,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            max_keyframe_markers: DEFAULT_MAX_KEYFRAME_MARKERS,
        }
    }
}

impl ChartOptions {
    /// Create chart options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image size. Clamped to at least 480×320.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(480);
        self.height = height.max(320);
        self
    }

    /// Set the keyframe marker limit.
    pub fn with_max_keyframe_markers(mut self, limit: usize) -> Self {
        self.max_keyframe_markers = limit;
        self
    }
}

/// `<output>.png`, unless `output` already ends in `.png`.
pub fn png_path(output: impl AsRef<Path>) -> PathBuf {
    let output = output.as_ref();
    let has_png = output
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("png"));
    if has_png {
        return output.to_path_buf();
    }
    let mut name = OsString::from(output.as_os_str());
    name.push(".png");
    PathBuf::from(name)
}

/// Render a single-file chart and save it as `<output>.png`.
///
/// Returns the path written.
///
/// # Errors
///
/// Returns [`BitrateError::ImageError`] if the image cannot be saved.
pub fn plot_results(
    result: &AnalysisResult,
    title: &str,
    output: impl AsRef<Path>,
    options: &ChartOptions,
) -> Result<PathBuf, BitrateError> {
    let path = png_path(output);
    render_results(result, title, options).save(&path)?;
    log::debug!("Saved bitrate chart to {}", path.display());
    Ok(path)
}

/// Render a comparison chart and save it as `<output>.png`.
///
/// Returns the path written.
///
/// # Errors
///
/// Returns [`BitrateError::EmptyComparison`] if `series` is empty and
/// [`BitrateError::ImageError`] if the image cannot be saved.
pub fn plot_comparison(
    series: &[ComparisonSeries],
    title: &str,
    output: impl AsRef<Path>,
    options: &ChartOptions,
) -> Result<PathBuf, BitrateError> {
    let image = render_comparison(series, title, options)?;
    let path = png_path(output);
    image.save(&path)?;
    log::debug!("Saved comparison chart to {}", path.display());
    Ok(path)
}

/// Render a single-file chart in memory.
pub fn render_results(result: &AnalysisResult, title: &str, options: &ChartOptions) -> RgbImage {
    let keyframe_count = result.keyframes().len();
    let too_many_keyframes = keyframe_count > options.max_keyframe_markers;
    if too_many_keyframes {
        log::warn!(
            "{keyframe_count} I-Frames detected. I-Frames are not shown on the graph for a video \
             with more than {} I-Frames as this results in a cluttered graph.",
            options.max_keyframe_markers
        );
    }

    let stats = result.statistics();
    let heading = [
        format!("{title} | Codec: {}", pretty_codec_name(result.encoder())),
        format!(
            "Min: {} | Max: {} | Standard Deviation: {}",
            mbit_label(stats.min),
            mbit_label(stats.max),
            mbit_label(stats.std_dev)
        ),
    ];

    let mut plot = Plot::new(options, &heading, std::iter::once(result));

    if !too_many_keyframes {
        for &second in result.keyframes() {
            plot.keyframe_marker(second);
        }
    }
    plot.series(result, PALETTE[0]);

    let keyframe_label = if too_many_keyframes {
        "Too many I-Frames"
    } else {
        "I-Frames"
    };
    plot.legend(&[
        LegendEntry::solid(format!("Bitrate (Average: {})", mbit_label(stats.mean)), PALETTE[0]),
        LegendEntry::dashed(keyframe_label.to_string(), KEYFRAME_RED),
    ]);

    plot.into_image()
}

/// Render a comparison chart in memory.
///
/// # Errors
///
/// Returns [`BitrateError::EmptyComparison`] if `series` is empty.
pub fn render_comparison(
    series: &[ComparisonSeries],
    title: &str,
    options: &ChartOptions,
) -> Result<RgbImage, BitrateError> {
    if series.is_empty() {
        return Err(BitrateError::EmptyComparison);
    }

    let heading = [title.to_string()];
    let mut plot = Plot::new(options, &heading, series.iter().map(|entry| &entry.result));

    let mut legend = Vec::with_capacity(series.len());
    for (index, entry) in series.iter().enumerate() {
        let color = PALETTE[index % PALETTE.len()];
        plot.series(&entry.result, color);

        let stats = entry.result.statistics();
        let label = if entry.label.is_empty() {
            format!("Series {}", index + 1)
        } else {
            entry.label.clone()
        };
        legend.push(LegendEntry::solid(
            format!(
                "{label} ({}, Avg: {})",
                pretty_codec_name(entry.result.encoder()),
                mbit_label(stats.mean)
            ),
            color,
        ));
    }
    plot.legend(&legend);

    Ok(plot.into_image())
}

struct LegendEntry {
    label: String,
    color: Rgb<u8>,
    dashed: bool,
}

impl LegendEntry {
    fn solid(label: String, color: Rgb<u8>) -> Self {
        Self {
            label,
            color,
            dashed: false,
        }
    }

    fn dashed(label: String, color: Rgb<u8>) -> Self {
        Self {
            label,
            color,
            dashed: true,
        }
    }
}

/// Closed interval of data values mapped onto one axis.
#[derive(Debug, Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// A canvas with the frame, grid and labels drawn, ready for series.
struct Plot {
    canvas: Canvas,
    left: i64,
    top: i64,
    width: u32,
    height: u32,
    x: Range,
    y: Range,
}

impl Plot {
    fn new<'a>(
        options: &ChartOptions,
        heading: &[String],
        results: impl Iterator<Item = &'a AnalysisResult> + Clone,
    ) -> Self {
        let width = options.width.max(480);
        let height = options.height.max(320);
        let x = data_range(results.clone().flat_map(|r| r.seconds().iter().copied()), false);
        let y = data_range(results.flat_map(|r| r.bitrates().iter().copied()), true);

        let mut plot = Self {
            canvas: Canvas::new(width, height),
            left: MARGIN_LEFT as i64,
            top: MARGIN_TOP as i64,
            width: width - MARGIN_LEFT - MARGIN_RIGHT,
            height: height - MARGIN_TOP - MARGIN_BOTTOM,
            x,
            y,
        };
        plot.heading(heading);
        plot.axes();
        plot
    }

    fn right(&self) -> i64 {
        self.left + self.width as i64 - 1
    }

    fn bottom(&self) -> i64 {
        self.top + self.height as i64 - 1
    }

    fn map_x(&self, value: f64) -> i64 {
        let fraction = (value - self.x.min) / self.x.span();
        self.left + (fraction * (self.width - 1) as f64).round() as i64
    }

    fn map_y(&self, value: f64) -> i64 {
        let fraction = (value - self.y.min) / self.y.span();
        self.bottom() - (fraction * (self.height - 1) as f64).round() as i64
    }

    fn heading(&mut self, lines: &[String]) {
        let center = self.canvas.width() as i64 / 2;
        let line_height = (text_size("X", TITLE_SCALE).1 + 12) as i64;
        let block = line_height * lines.len() as i64;
        let start = (self.top - block).max(0) / 2;
        for (index, line) in lines.iter().enumerate() {
            self.canvas
                .text_centered(center, start + index as i64 * line_height, line, TITLE_SCALE, BLACK);
        }
    }

    fn axes(&mut self) {
        let (left, top, right, bottom) = (self.left, self.top, self.right(), self.bottom());
        let (_, label_height) = text_size("0", LABEL_SCALE);

        for (value, label) in &ticks(self.x) {
            let px = self.map_x(*value);
            self.canvas.line(px, top, px, bottom, 1, GRID);
            self.canvas.line(px, bottom, px, bottom + 6, 1, BLACK);
            self.canvas.text_centered(px, bottom + 12, label, LABEL_SCALE, BLACK);
        }

        for (value, label) in &ticks(self.y) {
            let py = self.map_y(*value);
            self.canvas.line(left, py, right, py, 1, GRID);
            self.canvas.line(left - 6, py, left, py, 1, BLACK);
            let (label_width, _) = text_size(label, LABEL_SCALE);
            self.canvas.text(
                left - 12 - label_width as i64,
                py - label_height as i64 / 2,
                label,
                LABEL_SCALE,
                BLACK,
            );
        }

        self.canvas.stroke_rect(left, top, self.width, self.height, BLACK);

        let x_label = "Seconds";
        self.canvas.text_centered(
            (left + right) / 2,
            bottom + 24 + label_height as i64 * 2,
            x_label,
            LABEL_SCALE,
            BLACK,
        );

        let y_label = "Video Bitrate (Mbps)";
        let (y_label_length, _) = text_size(y_label, LABEL_SCALE);
        self.canvas.text_vertical(
            24,
            (top + bottom) / 2 + y_label_length as i64 / 2,
            y_label,
            LABEL_SCALE,
            BLACK,
        );
    }

    fn keyframe_marker(&mut self, second: f64) {
        let px = self.map_x(second);
        self.canvas
            .dashed_vline(px, self.top + 1, self.bottom() - 1, DASH, KEYFRAME_RED);
    }

    fn series(&mut self, result: &AnalysisResult, color: Rgb<u8>) {
        let points: Vec<(i64, i64)> = result
            .samples()
            .map(|(second, bitrate)| (self.map_x(second), self.map_y(bitrate)))
            .collect();

        match points.as_slice() {
            [] => {}
            [(x, y)] => self.canvas.fill_rect(x - 3, y - 3, 7, 7, color),
            _ => {
                for pair in points.windows(2) {
                    let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
                    self.canvas.line(x0, y0, x1, y1, LINE_THICKNESS, color);
                }
            }
        }
    }

    /// Legend box anchored in the lower right of the plot area.
    fn legend(&mut self, entries: &[LegendEntry]) {
        const SAMPLE: u32 = 40;
        const PADDING: u32 = 12;
        const GAP: u32 = 10;

        let (_, text_height) = text_size("X", LABEL_SCALE);
        let row_height = text_height + GAP;
        let label_width = entries
            .iter()
            .map(|entry| text_size(&entry.label, LABEL_SCALE).0)
            .max()
            .unwrap_or(0);

        let box_width = PADDING * 2 + SAMPLE + GAP + label_width;
        let box_height = PADDING * 2 + row_height * entries.len() as u32 - GAP;
        let box_left = self.right() - 12 - box_width as i64;
        let box_top = self.bottom() - 12 - box_height as i64;

        self.canvas.fill_rect(box_left, box_top, box_width, box_height, WHITE);
        self.canvas.stroke_rect(box_left, box_top, box_width, box_height, GRID);

        for (index, entry) in entries.iter().enumerate() {
            let row_top = box_top + (PADDING + index as u32 * row_height) as i64;
            let middle = row_top + text_height as i64 / 2;
            let sample_left = box_left + PADDING as i64;
            let sample_right = sample_left + SAMPLE as i64;

            if entry.dashed {
                self.canvas
                    .dashed_hline(sample_left, sample_right, middle, DASH, entry.color);
            } else {
                self.canvas
                    .line(sample_left, middle, sample_right, middle, LINE_THICKNESS, entry.color);
            }
            self.canvas.text(
                sample_right + GAP as i64,
                row_top,
                &entry.label,
                LABEL_SCALE,
                BLACK,
            );
        }
    }

    fn into_image(self) -> RgbImage {
        self.canvas.into_image()
    }
}

/// Range covering `values`. Degenerate ranges are widened so the axis has a
/// non-zero span; `from_zero` anchors the lower bound at zero and adds 5%
/// headroom above the maximum.
fn data_range(values: impl Iterator<Item = f64>, from_zero: bool) -> Range {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), value| {
        (lo.min(value), hi.max(value))
    });
    if !min.is_finite() || !max.is_finite() {
        return Range { min: 0.0, max: 1.0 };
    }

    if from_zero {
        let max = if max > 0.0 { max * 1.05 } else { 1.0 };
        return Range { min: 0.0, max };
    }

    if max > min {
        Range { min, max }
    } else {
        Range {
            min: min - 0.5,
            max: max + 0.5,
        }
    }
}

/// Evenly spaced "nice" tick positions (1, 2 or 5 times a power of ten)
/// inside `range`, with labels.
fn ticks(range: Range) -> Vec<(f64, String)> {
    let step = nice_step(range.span() / TICK_TARGET);
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10() - 1e-9).ceil() as usize
    };

    let first = (range.min / step).ceil() as i64;
    let last = (range.max / step).floor() as i64;
    (first..=last)
        .map(|index| {
            let value = index as f64 * step;
            (value, format!("{value:.decimals$}"))
        })
        .collect()
}

fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}
