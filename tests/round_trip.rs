use combyte::{compress, compress_with, decompress, decompress_parallel, Algorithm, CompressOptions};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn pack(data: &[u8], level: usize, workers: usize) -> Vec<u8> {
    let opts = CompressOptions {
        level,
        workers,
        algorithm: Algorithm::Auto,
    };
    let mut out = Vec::new();
    compress_with(data, &mut out, &opts).unwrap();
    out
}

fn unpack(stream: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    decompress(stream, &mut out).unwrap();
    out
}

#[test]
fn edge_inputs_round_trip() {
    let all_values: Vec<u8> = (0..=255_u8).collect();
    let cases: Vec<Vec<u8>> = vec![
        vec![],
        vec![0],
        vec![255],
        all_values,
        vec![b'a'; 127],
        vec![b'a'; 128],
        vec![b'a'; 129],
        vec![b'a'; 1023],
        vec![b'a'; 1024],
        vec![b'a'; 1025],
        (0..2049_u32).map(|i| (i % 2) as u8).collect(),
        b"banana".to_vec(),
    ];
    for data in cases {
        assert_eq!(unpack(&pack(&data, 1, 3)), data, "failed on {} bytes", data.len());
    }
}

#[test]
fn random_and_repetitive_inputs_round_trip() {
    let mut rng = StdRng::seed_from_u64(1_000_003);
    let random: Vec<u8> = (0..50_000).map(|_| rng.gen()).collect();
    let text: Vec<u8> = b"the quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(40_000)
        .collect();
    for data in [random, text] {
        for level in [1, 3, 16] {
            assert_eq!(unpack(&pack(&data, level, 4)), data);
        }
    }
}

#[test]
fn output_does_not_depend_on_worker_count() {
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<u8> = (0..100_000).map(|_| b"ACGTTGCA"[rng.gen_range(0..8)]).collect();
    let one = pack(&data, 2, 1);
    let eight = pack(&data, 2, 8);
    assert_eq!(one, eight);
    assert_eq!(one, pack(&data, 2, 3));
}

#[test]
fn parallel_decode_matches_sequential() {
    let data: Vec<u8> = (0..30_000_u32).map(|i| ((i / 7) % 256) as u8).collect();
    let stream = pack(&data, 1, 4);
    let mut out = Vec::new();
    decompress_parallel(stream.as_slice(), &mut out, 8).unwrap();
    assert_eq!(out, data);
}

#[test]
fn default_compress_entry_point() {
    let data = b"If Peter Piper picked a peck of pickled peppers".repeat(100);
    let mut stream = Vec::new();
    let stats = compress(data.as_slice(), &mut stream, 3).unwrap();
    assert_eq!(stats.bytes_in, data.len() as u64);
    assert_eq!(stats.blocks, 2);
    assert!(stream.len() < data.len());
    assert_eq!(unpack(&stream), data);
}

proptest! {
    #[test]
    fn any_bytes_round_trip(data in proptest::collection::vec(any::<u8>(), 0..5_000)) {
        prop_assert_eq!(unpack(&pack(&data, 1, 2)), data);
    }

    #[test]
    fn runs_round_trip(runs in proptest::collection::vec((any::<u8>(), 1_usize..300), 0..40)) {
        let data: Vec<u8> = runs
            .iter()
            .flat_map(|&(byte, len)| std::iter::repeat(byte).take(len))
            .collect();
        prop_assert_eq!(unpack(&pack(&data, 1, 2)), data);
    }
}
