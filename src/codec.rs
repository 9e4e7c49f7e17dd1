//! Human-readable codec names.

use std::collections::HashMap;
use std::sync::LazyLock;

/// `ffprobe` codec identifiers and their display names. Built once, never
/// modified.
static CODEC_DISPLAY_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("h264", "H.264/AVC"),
        ("hevc", "H.265/HEVC"),
        ("h265", "H.265/HEVC"),
        ("vvc", "H.266/VVC"),
        ("av1", "AV1"),
        ("vp8", "VP8"),
        ("vp9", "VP9"),
        ("mpeg1video", "MPEG-1"),
        ("mpeg2video", "MPEG-2"),
        ("mpeg4", "MPEG-4 Part 2"),
        ("h263", "H.263"),
        ("theora", "Theora"),
        ("prores", "Apple ProRes"),
        ("dnxhd", "Avid DNxHD/DNxHR"),
        ("mjpeg", "Motion JPEG"),
        ("ffv1", "FFV1"),
        ("cfhd", "GoPro CineForm"),
        ("vc1", "VC-1"),
        ("wmv3", "Windows Media Video 9"),
    ])
});

/// Map a raw codec identifier to its display name.
///
/// Unknown identifiers are returned unchanged.
///
/// # Example
///
/// ```
/// use bitrate_graph::pretty_codec_name;
///
/// assert_eq!(pretty_codec_name("hevc"), "H.265/HEVC");
/// assert_eq!(pretty_codec_name("MyCodec"), "MyCodec");
/// ```
pub fn pretty_codec_name(codec: &str) -> &str {
    CODEC_DISPLAY_NAMES.get(codec).copied().unwrap_or(codec)
}
