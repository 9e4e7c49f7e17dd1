//! Summary statistics and display name tests.

use bitrate_graph::{BitrateAggregator, BitrateStatistics, PacketRecord, mbit_label, pretty_codec_name};

#[test]
fn statistics_of_empty_slice() {
    assert!(BitrateStatistics::from_samples(&[]).is_none());
}

#[test]
fn statistics_of_constant_series() {
    let stats = BitrateStatistics::from_samples(&[3.0; 10]).unwrap();
    assert_eq!(stats.count, 10);
    assert_eq!(stats.min, 3.0);
    assert_eq!(stats.max, 3.0);
    assert!((stats.mean - 3.0).abs() < 1e-12);
    assert!(stats.std_dev.abs() < 1e-12);
}

#[test]
fn statistics_use_population_deviation() {
    let stats = BitrateStatistics::from_samples(&[1.0, 3.0]).unwrap();
    assert!((stats.mean - 2.0).abs() < 1e-12);
    // Sample deviation would be sqrt(2).
    assert!((stats.std_dev - 1.0).abs() < 1e-12);
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.max, 3.0);
}

#[test]
fn result_statistics_include_empty_windows() {
    let records = [
        PacketRecord::new(0.0, 125_000, true),
        PacketRecord::new(2.0, 125_000, false),
    ];
    let result = BitrateAggregator::aggregate(records, "h264").unwrap();

    let stats = result.statistics();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.min, 0.0);
    assert_eq!(stats.max, 1.0);
    assert!((stats.mean - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn mbit_labels() {
    assert_eq!(mbit_label(0.0), "0.00 Mbps");
    assert_eq!(mbit_label(12.0), "12.00 Mbps");
    assert_eq!(mbit_label(7.126), "7.13 Mbps");
}

#[test]
fn known_codec_names() {
    assert_eq!(pretty_codec_name("h264"), "H.264/AVC");
    assert_eq!(pretty_codec_name("hevc"), "H.265/HEVC");
    assert_eq!(pretty_codec_name("av1"), "AV1");
    assert_eq!(pretty_codec_name("vp9"), "VP9");
    assert_eq!(pretty_codec_name("prores"), "Apple ProRes");
}

#[test]
fn unknown_codec_names_pass_through() {
    assert_eq!(pretty_codec_name("rawvideo"), "rawvideo");
    assert_eq!(pretty_codec_name(""), "");
}
