//! Probe output parsing integration tests.
//!
//! Inputs mirror what `ffprobe -show_entries ... -of xml|json` writes for
//! both frame and packet sections.

use bitrate_graph::{
    AnalysisOptions, BitrateError, JsonRecordParser, PacketRecord, ProbeFormat, RecordParser,
    XmlRecordParser, analyze_probe_output, parser,
};

const XML_FRAMES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ffprobe>
    <frames>
        <frame key_frame="1" best_effort_timestamp_time="0.000000" pkt_size="1000000"/>
        <frame key_frame="0" best_effort_timestamp_time="0.500000" pkt_size="500000"/>
        <frame key_frame="1" best_effort_timestamp_time="1.200000" pkt_size="2000000"/>
    </frames>
    <streams>
        <stream codec_name="h264"/>
    </streams>
</ffprobe>"#;

const XML_PACKETS: &str = r#"<ffprobe>
    <packets>
        <packet pts_time="0.080000" dts_time="0.000000" size="3000" flags="K__"/>
        <packet pts_time="0.160000" dts_time="0.040000" size="700" flags="___"/>
        <packet pts_time="0.120000" dts_time="0.080000" size="400" flags="___"/>
    </packets>
    <streams>
        <stream codec_name="hevc"/>
    </streams>
</ffprobe>"#;

const JSON_FRAMES: &str = r#"{
    "frames": [
        { "key_frame": 1, "best_effort_timestamp_time": "0.000000", "pkt_size": "1000000" },
        { "key_frame": 0, "best_effort_timestamp_time": "0.500000", "pkt_size": "500000" },
        { "key_frame": 1, "best_effort_timestamp_time": "1.200000", "pkt_size": "2000000" }
    ],
    "streams": [
        { "codec_name": "h264" }
    ]
}"#;

const JSON_PACKETS: &str = r#"{
    "packets": [
        { "pts_time": "0.080000", "dts_time": "0.000000", "size": "3000", "flags": "K__" },
        { "pts_time": "0.160000", "dts_time": "0.040000", "size": "700", "flags": "___" }
    ],
    "streams": [
        { "codec_name": "vp9" }
    ]
}"#;

fn expected_frames() -> Vec<PacketRecord> {
    vec![
        PacketRecord::new(0.0, 1_000_000, true),
        PacketRecord::new(0.5, 500_000, false),
        PacketRecord::new(1.2, 2_000_000, true),
    ]
}

// ── XML ────────────────────────────────────────────────────────────

#[test]
fn xml_frames() {
    let parsed = XmlRecordParser::default().parse(XML_FRAMES).unwrap();
    assert_eq!(parsed.codec, "h264");
    assert_eq!(parsed.records, expected_frames());
}

#[test]
fn xml_packets_use_decode_timestamps() {
    let parsed = parser::parse(XML_PACKETS, ProbeFormat::Xml, "codec_name").unwrap();
    assert_eq!(parsed.codec, "hevc");
    let timestamps: Vec<f64> = parsed.records.iter().map(|r| r.timestamp_seconds).collect();
    assert_eq!(timestamps, vec![0.0, 0.04, 0.08]);
    assert!(parsed.records[0].is_keyframe);
    assert!(!parsed.records[1].is_keyframe);
    assert_eq!(parsed.records[2].size_bytes, 400);
}

#[test]
fn xml_unavailable_timestamp_falls_back() {
    let raw = r#"<ffprobe>
        <frames>
            <frame key_frame="1" best_effort_timestamp_time="N/A" pkt_pts_time="2.500000" pkt_size="10"/>
        </frames>
        <streams><stream codec_name="mpeg2video"/></streams>
    </ffprobe>"#;

    let parsed = parser::parse(raw, ProbeFormat::Xml, "codec_name").unwrap();
    assert_eq!(parsed.records, vec![PacketRecord::new(2.5, 10, true)]);
}

#[test]
fn xml_malformed_document() {
    let result = parser::parse("<ffprobe><frames>", ProbeFormat::Xml, "codec_name");
    assert!(matches!(
        result,
        Err(BitrateError::Parse {
            format: ProbeFormat::Xml,
            ..
        })
    ));
}

#[test]
fn xml_missing_size_is_an_error() {
    let raw = r#"<ffprobe>
        <frames><frame key_frame="0" best_effort_timestamp_time="0.1"/></frames>
        <streams><stream codec_name="h264"/></streams>
    </ffprobe>"#;

    let error = parser::parse(raw, ProbeFormat::Xml, "codec_name").unwrap_err();
    assert!(
        error.to_string().contains("pkt_size"),
        "Error message should name the missing field: {error}",
    );
}

#[test]
fn xml_missing_codec_is_an_error() {
    let raw = r#"<ffprobe>
        <frames><frame key_frame="1" best_effort_timestamp_time="0.0" pkt_size="1"/></frames>
    </ffprobe>"#;

    let result = parser::parse(raw, ProbeFormat::Xml, "codec_name");
    assert!(matches!(result, Err(BitrateError::Parse { .. })));
}

#[test]
fn xml_custom_codec_field() {
    let raw = r#"<ffprobe>
        <frames><frame key_frame="1" best_effort_timestamp_time="0.0" pkt_size="1"/></frames>
        <streams><stream codec_name="h264" codec_tag_string="avc1"/></streams>
    </ffprobe>"#;

    let parsed = XmlRecordParser::new("codec_tag_string").parse(raw).unwrap();
    assert_eq!(parsed.codec, "avc1");
}

// ── JSON ───────────────────────────────────────────────────────────

#[test]
fn json_frames() {
    let parsed = JsonRecordParser::default().parse(JSON_FRAMES).unwrap();
    assert_eq!(parsed.codec, "h264");
    assert_eq!(parsed.records, expected_frames());
}

#[test]
fn json_packets() {
    let parsed = parser::parse(JSON_PACKETS, ProbeFormat::Json, "codec_name").unwrap();
    assert_eq!(parsed.codec, "vp9");
    assert_eq!(
        parsed.records,
        vec![
            PacketRecord::new(0.0, 3000, true),
            PacketRecord::new(0.04, 700, false),
        ]
    );
}

#[test]
fn json_malformed_document() {
    for raw in ["{\"frames\": [", "[1, 2, 3]", "{\"frames\": 5, \"streams\": []}"] {
        let result = parser::parse(raw, ProbeFormat::Json, "codec_name");
        assert!(
            matches!(
                result,
                Err(BitrateError::Parse {
                    format: ProbeFormat::Json,
                    ..
                })
            ),
            "{raw:?} should fail to parse",
        );
    }
}

#[test]
fn json_invalid_timestamp() {
    let raw = r#"{
        "frames": [{ "key_frame": 0, "best_effort_timestamp_time": "soon", "pkt_size": "1" }],
        "streams": [{ "codec_name": "h264" }]
    }"#;

    let error = parser::parse(raw, ProbeFormat::Json, "codec_name").unwrap_err();
    assert!(error.to_string().contains("best_effort_timestamp_time"));
}

#[test]
fn json_without_records_parses_empty() {
    let raw = r#"{ "frames": [], "streams": [{ "codec_name": "av1" }] }"#;

    let parsed = parser::parse(raw, ProbeFormat::Json, "codec_name").unwrap();
    assert!(parsed.records.is_empty());
    assert_eq!(parsed.codec, "av1");
}

// ── Parse and aggregate ────────────────────────────────────────────

#[test]
fn both_formats_agree() {
    let options = AnalysisOptions::new();
    let from_xml = analyze_probe_output(XML_FRAMES, ProbeFormat::Xml, &options).unwrap();
    let from_json = analyze_probe_output(JSON_FRAMES, ProbeFormat::Json, &options).unwrap();

    assert_eq!(from_xml, from_json);
    assert_eq!(from_xml.bitrates(), &[12.0, 16.0]);
}

#[test]
fn empty_probe_output_is_an_empty_stream() {
    let raw = r#"<ffprobe><frames/><streams><stream codec_name="h264"/></streams></ffprobe>"#;

    let result = analyze_probe_output(raw, ProbeFormat::Xml, &AnalysisOptions::new());
    assert!(matches!(result, Err(BitrateError::EmptyStream)));
}

#[test]
fn custom_window_applies_to_probe_output() {
    let options = AnalysisOptions::new().with_window_seconds(2.0);
    let result = analyze_probe_output(XML_FRAMES, ProbeFormat::Xml, &options).unwrap();

    assert_eq!(result.seconds(), &[0.0]);
    assert_eq!(result.bitrates(), &[14.0]);
}

#[test]
fn format_tags() {
    assert_eq!("xml".parse::<ProbeFormat>().unwrap(), ProbeFormat::Xml);
    assert_eq!("JSON".parse::<ProbeFormat>().unwrap(), ProbeFormat::Json);
    assert!(matches!(
        "yaml".parse::<ProbeFormat>(),
        Err(BitrateError::UnsupportedFormat(_))
    ));
    assert_eq!(ProbeFormat::default(), ProbeFormat::Xml);
    assert_eq!(ProbeFormat::Json.extension(), "json");
}
