//! Probe output parsing.
//!
//! Turns the raw text written by `ffprobe` into an ordered list of
//! [`PacketRecord`]s and the codec name of the probed stream. One parser
//! exists per [`ProbeFormat`]; both implement [`RecordParser`] and share the
//! same field resolution rules:
//!
//! | Unit      | Timestamp (first present wins)                                          | Size       | Keyframe            |
//! |-----------|-------------------------------------------------------------------------|------------|---------------------|
//! | `packet`  | `dts_time`, `pts_time`                                                  | `size`     | `flags` contains `K`|
//! | `frame`   | `best_effort_timestamp_time`, `pts_time`, `pkt_pts_time`, `pkt_dts_time` | `pkt_size` | `key_frame` is `1`  |
//!
//! Records are returned in the order the probe reported them. A record with
//! a missing or unparseable timestamp or size fails the whole parse.
//!
//! # Example
//!
//! ```
//! use bitrate_graph::{ProbeFormat, parser};
//!
//! let raw = r#"<ffprobe>
//!   <frames>
//!     <frame key_frame="1" best_effort_timestamp_time="0.000000" pkt_size="4096"/>
//!     <frame key_frame="0" best_effort_timestamp_time="0.040000" pkt_size="512"/>
//!   </frames>
//!   <streams><stream codec_name="h264"/></streams>
//! </ffprobe>"#;
//!
//! let parsed = parser::parse(raw, ProbeFormat::Xml, "codec_name")?;
//! assert_eq!(parsed.codec, "h264");
//! assert_eq!(parsed.records.len(), 2);
//! assert!(parsed.records[0].is_keyframe);
//! # Ok::<(), bitrate_graph::BitrateError>(())
//! ```

use std::borrow::Cow;

use serde_json::Value;

use crate::error::BitrateError;
use crate::format::ProbeFormat;
use crate::record::PacketRecord;

/// Codec field requested from the probe by default.
pub const DEFAULT_CODEC_FIELD: &str = "codec_name";

/// The outcome of parsing one probe output.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedProbe {
    /// Records in reported order.
    pub records: Vec<PacketRecord>,
    /// Raw codec identifier (e.g. `"h264"`).
    pub codec: String,
}

/// Shared capability of the per-format parsers.
pub trait RecordParser {
    /// Parse raw probe text into records and a codec name.
    fn parse(&self, raw: &str) -> Result<ParsedProbe, BitrateError>;
}

/// Parser for `ffprobe -of xml` output.
#[derive(Debug, Clone)]
pub struct XmlRecordParser {
    codec_field: String,
}

/// Parser for `ffprobe -of json` output.
#[derive(Debug, Clone)]
pub struct JsonRecordParser {
    codec_field: String,
}

/// Parse raw probe text in the given format.
pub fn parse(
    raw: &str,
    format: ProbeFormat,
    codec_field: &str,
) -> Result<ParsedProbe, BitrateError> {
    log::debug!(
        "Parsing {} bytes of {} probe output (codec field={})",
        raw.len(),
        format,
        codec_field
    );
    match format {
        ProbeFormat::Xml => XmlRecordParser::new(codec_field).parse(raw),
        ProbeFormat::Json => JsonRecordParser::new(codec_field).parse(raw),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitKind {
    Packet,
    Frame,
}

impl UnitKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "packet" => Some(UnitKind::Packet),
            "frame" => Some(UnitKind::Frame),
            _ => None,
        }
    }

    fn timestamp_fields(self) -> &'static [&'static str] {
        match self {
            UnitKind::Packet => &["dts_time", "pts_time"],
            UnitKind::Frame => &[
                "best_effort_timestamp_time",
                "pts_time",
                "pkt_pts_time",
                "pkt_dts_time",
            ],
        }
    }

    fn size_field(self) -> &'static str {
        match self {
            UnitKind::Packet => "size",
            UnitKind::Frame => "pkt_size",
        }
    }

    fn is_keyframe<'v>(self, field: &dyn Fn(&str) -> Option<Cow<'v, str>>) -> bool {
        match self {
            UnitKind::Packet => field("flags").is_some_and(|flags| flags.contains('K')),
            UnitKind::Frame => {
                field("key_frame").is_some_and(|flag| matches!(flag.trim(), "1" | "true"))
            }
        }
    }
}

/// Build a record from one unit entry, looking fields up through `field`.
fn build_record<'v>(
    format: ProbeFormat,
    kind: UnitKind,
    index: usize,
    field: &dyn Fn(&str) -> Option<Cow<'v, str>>,
) -> Result<PacketRecord, BitrateError> {
    let (name, raw_timestamp) = kind
        .timestamp_fields()
        .iter()
        .find_map(|name| {
            field(name)
                .filter(|value| value.trim() != "N/A")
                .map(|value| (*name, value))
        })
        .ok_or_else(|| {
            BitrateError::parse(
                format,
                format!(
                    "entry {index}: no timestamp (looked for {})",
                    kind.timestamp_fields().join(", ")
                ),
            )
        })?;
    let timestamp_seconds = raw_timestamp.trim().parse::<f64>().map_err(|_| {
        BitrateError::parse(
            format,
            format!("entry {index}: invalid {name} value {raw_timestamp:?}"),
        )
    })?;

    let size_name = kind.size_field();
    let raw_size = field(size_name).ok_or_else(|| {
        BitrateError::parse(format, format!("entry {index}: missing {size_name}"))
    })?;
    let size_bytes = raw_size.trim().parse::<u64>().map_err(|_| {
        BitrateError::parse(
            format,
            format!("entry {index}: invalid {size_name} value {raw_size:?}"),
        )
    })?;

    Ok(PacketRecord {
        timestamp_seconds,
        size_bytes,
        is_keyframe: kind.is_keyframe(field),
    })
}

/// Tracks which unit kind the output carries. Probes asked for a single
/// section never mix kinds, but `packets_and_frames` output does; only the
/// first kind seen is kept.
#[derive(Default)]
struct UnitFilter {
    kind: Option<UnitKind>,
    skipped: usize,
}

impl UnitFilter {
    fn accept(&mut self, kind: UnitKind) -> bool {
        match self.kind {
            None => {
                self.kind = Some(kind);
                true
            }
            Some(current) if current == kind => true,
            Some(_) => {
                self.skipped += 1;
                false
            }
        }
    }

    fn finish(&self) {
        if self.skipped > 0 {
            log::debug!(
                "Skipped {} entries not of kind {:?}",
                self.skipped,
                self.kind
            );
        }
    }
}

fn missing_codec(format: ProbeFormat, codec_field: &str) -> BitrateError {
    BitrateError::parse(format, format!("no entry declares {codec_field}"))
}

impl XmlRecordParser {
    /// Create a parser reading the codec name from `codec_field`.
    pub fn new(codec_field: impl Into<String>) -> Self {
        Self {
            codec_field: codec_field.into(),
        }
    }
}

impl Default for XmlRecordParser {
    fn default() -> Self {
        Self::new(DEFAULT_CODEC_FIELD)
    }
}

impl RecordParser for XmlRecordParser {
    fn parse(&self, raw: &str) -> Result<ParsedProbe, BitrateError> {
        let format = ProbeFormat::Xml;
        let document = roxmltree::Document::parse(raw)
            .map_err(|e| BitrateError::parse(format, format!("XML parse error: {e}")))?;

        let mut records = Vec::new();
        let mut codec: Option<String> = None;
        let mut filter = UnitFilter::default();

        for node in document.descendants().filter(|n| n.is_element()) {
            if codec.is_none() {
                codec = node.attribute(self.codec_field.as_str()).map(str::to_string);
            }

            let Some(kind) = UnitKind::from_name(node.tag_name().name()) else {
                continue;
            };
            if !filter.accept(kind) {
                continue;
            }

            let lookup = |name: &str| node.attribute(name).map(Cow::Borrowed);
            records.push(build_record(format, kind, records.len(), &lookup)?);
        }
        filter.finish();

        let codec = codec.ok_or_else(|| missing_codec(format, &self.codec_field))?;
        log::debug!("Parsed {} XML records (codec={})", records.len(), codec);
        Ok(ParsedProbe { records, codec })
    }
}

impl JsonRecordParser {
    /// Create a parser reading the codec name from `codec_field`.
    pub fn new(codec_field: impl Into<String>) -> Self {
        Self {
            codec_field: codec_field.into(),
        }
    }

    fn codec_of(&self, entry: &Value) -> Option<String> {
        entry
            .get(self.codec_field.as_str())
            .and_then(json_text)
            .map(Cow::into_owned)
    }
}

impl Default for JsonRecordParser {
    fn default() -> Self {
        Self::new(DEFAULT_CODEC_FIELD)
    }
}

impl RecordParser for JsonRecordParser {
    fn parse(&self, raw: &str) -> Result<ParsedProbe, BitrateError> {
        let format = ProbeFormat::Json;
        let root: Value = serde_json::from_str(raw)
            .map_err(|e| BitrateError::parse(format, format!("JSON parse error: {e}")))?;
        if !root.is_object() {
            return Err(BitrateError::parse(
                format,
                "top-level value must be an object",
            ));
        }

        let mut records = Vec::new();
        let mut codec: Option<String> = None;
        let mut filter = UnitFilter::default();

        for (section, default_kind) in [
            ("packets", Some(UnitKind::Packet)),
            ("frames", Some(UnitKind::Frame)),
            ("packets_and_frames", None),
        ] {
            let Some(entries) = root.get(section) else {
                continue;
            };
            let entries = entries.as_array().ok_or_else(|| {
                BitrateError::parse(format, format!("\"{section}\" must be an array"))
            })?;

            for entry in entries {
                if !entry.is_object() {
                    return Err(BitrateError::parse(
                        format,
                        format!("entry {}: expected an object", records.len()),
                    ));
                }
                if codec.is_none() {
                    codec = self.codec_of(entry);
                }

                let kind = entry
                    .get("type")
                    .and_then(Value::as_str)
                    .and_then(UnitKind::from_name)
                    .or(default_kind);
                let Some(kind) = kind else {
                    continue;
                };
                if !filter.accept(kind) {
                    continue;
                }

                let lookup = |name: &str| entry.get(name).and_then(json_text);
                records.push(build_record(format, kind, records.len(), &lookup)?);
            }
        }
        filter.finish();

        if codec.is_none() {
            codec = root
                .get("streams")
                .and_then(Value::as_array)
                .and_then(|streams| streams.iter().find_map(|stream| self.codec_of(stream)));
        }

        let codec = codec.ok_or_else(|| missing_codec(format, &self.codec_field))?;
        log::debug!("Parsed {} JSON records (codec={})", records.len(), codec);
        Ok(ParsedProbe { records, codec })
    }
}

/// Render a scalar JSON value as text. ffprobe writes most numbers as
/// strings but some (`key_frame`, `stream_index`) as integers.
fn json_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("1")),
        Value::Bool(false) => Some(Cow::Borrowed("0")),
        _ => None,
    }
}
