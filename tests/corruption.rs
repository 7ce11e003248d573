use combyte::{compress, decompress, test_stream, CombyteError};

fn packed(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    compress(data, &mut out, 1).unwrap();
    out
}

#[test]
fn truncated_mid_payload() {
    let data: Vec<u8> = (0..4_000_u32).map(|i| (i % 251) as u8).collect();
    let stream = packed(&data);
    let cut = &stream[..stream.len() - 10];
    let mut out = Vec::new();
    let result = decompress(cut, &mut out);
    assert!(matches!(result, Err(CombyteError::TruncatedStream(_))));
    // Only whole blocks before the damage were written.
    assert_eq!(out.len(), 3 * 1024);
    assert_eq!(&out[..], &data[..3 * 1024]);
}

#[test]
fn truncated_mid_header() {
    let stream = packed(b"some data");
    let mut damaged = stream.clone();
    damaged.extend_from_slice(&[1, 0, 0]);
    assert!(matches!(
        test_stream(damaged.as_slice()),
        Err(CombyteError::TruncatedStream("block header"))
    ));
}

#[test]
fn primary_index_out_of_range() {
    let mut stream = packed(b"some data");
    stream[..4].copy_from_slice(&9_i32.to_le_bytes());
    assert!(matches!(
        test_stream(stream.as_slice()),
        Err(CombyteError::InvalidPrimaryIndex { index: 9, len: 9 })
    ));
}

#[test]
fn negative_primary_index() {
    let mut stream = packed(b"some data");
    stream[..4].copy_from_slice(&(-3_i32).to_le_bytes());
    assert!(matches!(
        test_stream(stream.as_slice()),
        Err(CombyteError::InvalidPrimaryIndex { index: -3, .. })
    ));
}

#[test]
fn not_a_combyte_stream() {
    let garbage = b"this is plain text and not a compressed stream at all";
    assert!(test_stream(&garbage[..]).is_err());
}
