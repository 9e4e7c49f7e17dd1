//! Per-unit records reported by the probe.

/// One stream unit (frame or packet) as reported by the probe.
///
/// Records are produced by the [`parser`](crate::parser) in the order the
/// probe reported them and consumed by the
/// [`BitrateAggregator`](crate::BitrateAggregator).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketRecord {
    /// Timestamp in seconds.
    pub timestamp_seconds: f64,
    /// Payload size in bytes.
    pub size_bytes: u64,
    /// Whether the probe flagged this unit as a keyframe.
    pub is_keyframe: bool,
}

impl PacketRecord {
    /// Create a new record.
    pub fn new(timestamp_seconds: f64, size_bytes: u64, is_keyframe: bool) -> Self {
        Self {
            timestamp_seconds,
            size_bytes,
            is_keyframe,
        }
    }
}

impl From<(f64, u64, bool)> for PacketRecord {
    fn from((timestamp_seconds, size_bytes, is_keyframe): (f64, u64, bool)) -> Self {
        Self::new(timestamp_seconds, size_bytes, is_keyframe)
    }
}
