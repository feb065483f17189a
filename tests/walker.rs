//! Stream walker tests: offsets, contiguity, termination and restart detection.

use jpeg_markers::jpeg::{APP0, DHT, DQT, DRI, EOI, RST0, SOF0, SOI, SOS};
use jpeg_markers::{
    has_restart_markers, is_restart, scan, scan_all, MarkerWalker, ScanError, ScanOptions,
    Termination,
};

fn segment(code: u16, payload: &[u8]) -> Vec<u8> {
    let mut v = code.to_be_bytes().to_vec();
    v.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    v.extend_from_slice(payload);
    v
}

/// Baseline 16x8 single-component stream with a restart interval of one MCU.
fn sample_jpeg() -> Vec<u8> {
    let mut v = vec![0xFF, 0xD8];
    v.extend(segment(APP0, &[b'J', b'F', b'I', b'F', 0, 1, 1, 0, 0, 1, 0, 1, 0, 0]));
    let mut dqt = vec![0x00];
    dqt.extend_from_slice(&[1u8; 64]);
    v.extend(segment(DQT, &dqt));
    v.extend(segment(SOF0, &[8, 0, 8, 0, 16, 1, 1, 0x11, 0]));
    let mut dht = vec![0x00];
    let mut counts = [0u8; 16];
    counts[1] = 1;
    dht.extend_from_slice(&counts);
    dht.push(0x00);
    v.extend(segment(DHT, &dht));
    v.extend(segment(DRI, &[0x00, 0x01]));
    v.extend(segment(SOS, &[1, 1, 0x00, 0, 63, 0]));
    v.extend_from_slice(&[0x12, 0xFF, 0x00, 0x34]);
    v.extend_from_slice(&[0xFF, 0xD0, 0x56, 0x78]);
    v.extend_from_slice(&[0xFF, 0xD1, 0x9A, 0xFF, 0xFF]);
    v.extend_from_slice(&[0xFF, 0xD9]);
    v
}

#[test]
fn bare_soi_yields_one_record() {
    let markers = scan_all(&[0xFF, 0xD8]).unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].id, SOI);
    assert_eq!(markers[0].offset, 0);
}

#[test]
fn minimal_stream_soi_eoi() {
    let segments: Vec<_> = MarkerWalker::new(&[0xFF, 0xD8, 0xFF, 0xD9], ScanOptions::default())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!((segments[0].marker.id, segments[0].marker.offset, segments[0].consumed), (SOI, 0, 2));
    assert_eq!((segments[1].marker.id, segments[1].marker.offset, segments[1].consumed), (EOI, 2, 0));
}

#[test]
fn empty_buffer_yields_nothing() {
    assert!(scan_all(&[]).unwrap().is_empty());
    let r = scan(&[], &ScanOptions::default()).unwrap();
    assert_eq!(r.termination, Termination::Exhausted);
}

#[test]
fn sample_marker_sequence() {
    let ids: Vec<u16> = scan_all(&sample_jpeg()).unwrap().iter().map(|m| m.id).collect();
    assert_eq!(
        ids,
        vec![SOI, APP0, DQT, SOF0, DHT, DRI, SOS, RST0, RST0 + 1, EOI]
    );
}

#[test]
fn spans_are_contiguous_and_cover_the_stream() {
    let data = sample_jpeg();
    let segments: Vec<_> = MarkerWalker::new(&data, ScanOptions::default())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(segments[0].marker.offset, 0);
    for pair in segments.windows(2) {
        assert!(pair[0].consumed > 0);
        assert_eq!(pair[0].marker.offset + pair[0].consumed, pair[1].marker.offset);
    }
    // Concatenating every span but EOI's rebuilds the stream up to the EOI code.
    let last = segments.last().unwrap();
    assert_eq!(last.consumed, 0);
    let rebuilt: Vec<u8> = segments[..segments.len() - 1]
        .iter()
        .flat_map(|s| data[s.marker.offset..s.marker.offset + s.consumed].iter().copied())
        .collect();
    assert_eq!(rebuilt, data[..last.marker.offset]);
}

#[test]
fn entropy_byte_counts() {
    let markers = scan_all(&sample_jpeg()).unwrap();
    let sos = markers.iter().find(|m| m.id == SOS).unwrap();
    assert_eq!(sos.description, "0xFFDA: Start Of Scan [Ns: 1] (4 bytes)");
    let rst0 = markers.iter().find(|m| m.id == RST0).unwrap();
    assert_eq!(rst0.description, "0xFFD0: RST0 (2 bytes)");
    // Fill bytes before EOI stay with the preceding entropy data.
    let rst1 = markers.iter().find(|m| m.id == RST0 + 1).unwrap();
    assert_eq!(rst1.description, "0xFFD1: RST1 (3 bytes)");
}

#[test]
fn restart_detection() {
    assert!(has_restart_markers(&sample_jpeg()).unwrap());
    assert!(!has_restart_markers(&[0xFF, 0xD8, 0xFF, 0xD9]).unwrap());
    let r = scan(&sample_jpeg(), &ScanOptions::default()).unwrap();
    assert!(r.has_restart_markers());
    assert!(r.is_complete());
}

#[test]
fn restart_predicate_bounds() {
    assert!((0xFFD0..=0xFFD7).all(is_restart));
    assert!(!is_restart(0xFFCF));
    assert!(!is_restart(0xFFD8));
}

#[test]
fn missing_eoi_returns_collected_records() {
    let mut data = sample_jpeg();
    data.truncate(data.len() - 2);
    let r = scan(&data, &ScanOptions::default()).unwrap();
    assert_eq!(r.termination, Termination::Exhausted);
    assert_eq!(r.markers.last().unwrap().id, RST0 + 1);
    assert!(!r.warnings.is_empty());
}

#[test]
fn truncated_header_fails_the_scan() {
    let data = sample_jpeg();
    // Cut inside the DQT segment.
    let cut = &data[..30];
    let err = scan_all(cut).unwrap_err();
    assert!(
        matches!(err, ScanError::Truncated { code: DQT, offset: 20, .. }),
        "{err:?}"
    );
}

#[test]
fn unknown_marker_policy_on_stream() {
    let data = [0xFF, 0xD8, 0xFF, 0x10, 0x00, 0x00, 0xFF, 0xD9];
    let r = scan(&data, &ScanOptions::default()).unwrap();
    let ids: Vec<u16> = r.markers.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![SOI, 0xFF10, EOI]);
    assert_eq!(r.markers[1].offset, 2);
    assert_eq!(r.markers[2].offset, 6);
    assert_eq!(r.warnings, vec!["unexpected marker 0xFF10 at offset 0x2".to_string()]);

    let err = scan(&data, &ScanOptions::strict()).unwrap_err();
    assert_eq!(err, ScanError::UnknownMarker { code: 0xFF10, offset: 2 });
}

#[test]
fn single_fill_byte_before_eoi_keeps_eoi() {
    let r = scan(&[0xFF, 0xD8, 0xFF, 0xFF, 0xD9], &ScanOptions::default()).unwrap();
    let found: Vec<(u16, usize)> = r.markers.iter().map(|m| (m.id, m.offset)).collect();
    assert_eq!(found, vec![(SOI, 0), (0xFFFF, 2), (EOI, 3)]);
    assert_eq!(r.termination, Termination::EndOfImage);
}

#[test]
fn odd_fill_run_before_dqt_keeps_dqt() {
    let mut dqt = vec![0x00];
    dqt.extend_from_slice(&[1u8; 64]);
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xFF, 0xFF];
    data.extend(segment(DQT, &dqt));
    data.extend_from_slice(&[0xFF, 0xD9]);
    let found: Vec<(u16, usize)> = scan_all(&data)
        .unwrap()
        .iter()
        .map(|m| (m.id, m.offset))
        .collect();
    assert_eq!(found, vec![(SOI, 0), (0xFFFF, 2), (DQT, 4), (EOI, 73)]);
}

#[test]
fn unexpected_record_keeps_raw_non_ff_code() {
    let r = scan(&[0xFF, 0xD8, 0x12, 0x34, 0xFF, 0xD9], &ScanOptions::default()).unwrap();
    let found: Vec<(u16, usize)> = r.markers.iter().map(|m| (m.id, m.offset)).collect();
    assert_eq!(found, vec![(SOI, 0), (0x1234, 2), (EOI, 4)]);
    assert_eq!(r.markers[1].description, "0x1234: unexpected marker (0 bytes)");
    assert!(r.is_complete());
}
