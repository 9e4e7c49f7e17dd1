//! Probe invocation and sidecar tests.
//!
//! The end-to-end test uses a stub probe script on Unix and the real
//! `ffprobe` only when `tests/fixtures/sample_video.mp4` exists.

use std::ffi::OsString;
use std::path::Path;

use bitrate_graph::{
    AnalysisOptions, MediaProbe, ProbeFormat, ProbeMode, analyze_bitrate,
    probe::{sidecar_path, write_sidecar},
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn argument_strings(arguments: Vec<OsString>) -> Vec<String> {
    arguments
        .into_iter()
        .map(|argument| argument.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn default_arguments_request_frames_as_xml() {
    let arguments = MediaProbe::arguments(Path::new("clip.mp4"), &AnalysisOptions::new());
    assert_eq!(
        argument_strings(arguments),
        vec![
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "frame=best_effort_timestamp_time,pts_time,pkt_pts_time,pkt_dts_time,pkt_size,key_frame:stream=codec_name",
            "-of",
            "xml",
            "clip.mp4",
        ]
    );
}

#[test]
fn packet_mode_arguments() {
    let options = AnalysisOptions::new()
        .with_format(ProbeFormat::Json)
        .with_mode(ProbeMode::Packets)
        .with_stream_selector("v:1")
        .with_codec_field("codec_tag_string");

    let arguments = argument_strings(MediaProbe::arguments(Path::new("clip.mkv"), &options));
    assert_eq!(arguments[3], "v:1");
    assert_eq!(
        arguments[5],
        "packet=pts_time,dts_time,size,flags:stream=codec_tag_string"
    );
    assert_eq!(arguments[7], "json");
    assert_eq!(arguments[8], "clip.mkv");
}

#[test]
fn probe_modes_parse() {
    assert_eq!("frames".parse::<ProbeMode>().unwrap(), ProbeMode::Frames);
    assert_eq!("Packets".parse::<ProbeMode>().unwrap(), ProbeMode::Packets);
    assert!("samples".parse::<ProbeMode>().is_err());
}

#[test]
fn sidecar_paths() {
    let input = Path::new("videos/my.clip.mp4");
    assert_eq!(
        sidecar_path(input, ProbeFormat::Xml, None),
        Path::new("my.clip.xml")
    );
    assert_eq!(
        sidecar_path(input, ProbeFormat::Json, Some(Path::new("out"))),
        Path::new("out/my.clip.json")
    );
}

#[test]
fn sidecar_is_written_verbatim_and_replaced() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let sidecar_dir = directory.path().join("nested/probes");

    let first = write_sidecar(Path::new("clip.mp4"), ProbeFormat::Xml, "<old/>", Some(&sidecar_dir))
        .unwrap();
    let second = write_sidecar(Path::new("clip.mp4"), ProbeFormat::Xml, "<new/>", Some(&sidecar_dir))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first, sidecar_dir.join("clip.xml"));
    assert_eq!(std::fs::read_to_string(&first).unwrap(), "<new/>");
}

#[test]
fn real_ffprobe_on_fixture() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    for format in [ProbeFormat::Xml, ProbeFormat::Json] {
        let options = AnalysisOptions::new()
            .with_format(format)
            .with_sidecar_dir(directory.path());
        let result = match analyze_bitrate(SAMPLE_VIDEO, &options) {
            Ok(result) => result,
            Err(error) => {
                eprintln!("Skipping: ffprobe unavailable or failed: {error}");
                return;
            }
        };

        assert!(!result.is_empty());
        assert!(!result.encoder().is_empty());
        assert!(result.bitrates().iter().all(|bitrate| *bitrate >= 0.0));
        assert!(sidecar_path(Path::new(SAMPLE_VIDEO), format, Some(directory.path())).exists());
    }
}
