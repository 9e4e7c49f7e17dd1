//! Summary statistics over a bitrate series.
//!
//! Mean and standard deviation are accumulated in one pass with Welford's
//! update. The standard deviation is the population one (divided by `N`).

/// Mean, min, max and population standard deviation of a bitrate series, in
/// megabits per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BitrateStatistics {
    /// Arithmetic mean.
    pub mean: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Number of samples.
    pub count: usize,
}

impl BitrateStatistics {
    /// Compute statistics over `samples`. Returns `None` for an empty slice.
    ///
    /// # Example
    ///
    /// ```
    /// use bitrate_graph::BitrateStatistics;
    ///
    /// let stats = BitrateStatistics::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
    /// assert!((stats.mean - 5.0).abs() < 1e-12);
    /// assert!((stats.std_dev - 2.0).abs() < 1e-12);
    /// ```
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let (&first, rest) = samples.split_first()?;

        let mut count = 1usize;
        let mut mean = first;
        let mut squared_deviation = 0.0;
        let mut min = first;
        let mut max = first;

        for &sample in rest {
            count += 1;
            let delta = sample - mean;
            mean += delta / count as f64;
            squared_deviation += delta * (sample - mean);
            min = min.min(sample);
            max = max.max(sample);
        }

        Some(Self {
            mean,
            min,
            max,
            std_dev: (squared_deviation / count as f64).sqrt(),
            count,
        })
    }
}

/// Format a bitrate for display, rounded to two decimals.
///
/// # Example
///
/// ```
/// assert_eq!(bitrate_graph::mbit_label(12.346), "12.35 Mbps");
/// ```
pub fn mbit_label(mbps: f64) -> String {
    format!("{mbps:.2} Mbps")
}
