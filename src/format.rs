//! Probe output formats and probing modes.
//!
//! [`ProbeFormat`] is the closed set of structured text encodings the probe
//! can emit and the parser understands. [`ProbeMode`] selects which kind of
//! stream unit the probe reports.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::BitrateError;

/// Structured text encoding of the probe output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProbeFormat {
    /// `ffprobe -of xml`. This is the default.
    #[default]
    Xml,
    /// `ffprobe -of json`.
    Json,
}

impl ProbeFormat {
    /// File extension (and `-of` writer name) for this format.
    pub fn extension(self) -> &'static str {
        match self {
            ProbeFormat::Xml => "xml",
            ProbeFormat::Json => "json",
        }
    }
}

impl Display for ProbeFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

impl FromStr for ProbeFormat {
    type Err = BitrateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(ProbeFormat::Xml),
            "json" => Ok(ProbeFormat::Json),
            _ => Err(BitrateError::UnsupportedFormat(value.to_string())),
        }
    }
}

/// Which stream units the probe reports.
///
/// Frames come out of the probe in presentation order, so their timestamps
/// are monotonic. Packets are cheaper to produce but arrive in decode order,
/// so their decode timestamps are used instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProbeMode {
    /// `-show_entries frame=...`. This is the default.
    #[default]
    Frames,
    /// `-show_entries packet=...`.
    Packets,
}

impl ProbeMode {
    /// Section name used in `-show_entries`.
    pub(crate) fn section(self) -> &'static str {
        match self {
            ProbeMode::Frames => "frame",
            ProbeMode::Packets => "packet",
        }
    }

    /// Fields requested from the probe for this mode.
    pub(crate) fn fields(self) -> &'static str {
        match self {
            ProbeMode::Frames => {
                "best_effort_timestamp_time,pts_time,pkt_pts_time,pkt_dts_time,pkt_size,key_frame"
            }
            ProbeMode::Packets => "pts_time,dts_time,size,flags",
        }
    }
}

impl FromStr for ProbeMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "frames" | "frame" => Ok(ProbeMode::Frames),
            "packets" | "packet" => Ok(ProbeMode::Packets),
            other => Err(format!("unsupported probe mode: {other} (expected frames or packets)")),
        }
    }
}
