use rayon::prelude::*;

/// Returns a frequency count of the input data. Uses parallelism when data set is over 64k.
pub fn freqs(data: &[u8]) -> [u32; 256] {
    if data.len() > 64_000 {
        // 16k is pretty much the sweet spot for chunk size.
        data.par_chunks(16_000)
            .fold(
                || [0_u32; 256],
                |mut freqs, chunk| {
                    chunk.iter().for_each(|&el| freqs[el as usize] += 1);
                    freqs
                },
            )
            .reduce(
                || [0_u32; 256],
                |mut s, f| {
                    s.iter_mut().zip(f.iter()).for_each(|(a, b)| *a += b);
                    s
                },
            )
    } else {
        let mut freqs = [0_u32; 256];
        data.iter().for_each(|&el| freqs[el as usize] += 1);
        freqs
    }
}

#[cfg(test)]
mod test {
    use super::freqs;

    #[test]
    fn small_count() {
        let f = freqs(b"banana");
        assert_eq!(f[b'a' as usize], 3);
        assert_eq!(f[b'b' as usize], 1);
        assert_eq!(f[b'n' as usize], 2);
        assert_eq!(f.iter().sum::<u32>(), 6);
    }

    #[test]
    fn parallel_count_matches_sequential() {
        let data: Vec<u8> = (0..200_000_u32).map(|i| (i * 7 % 251) as u8).collect();
        let par = freqs(&data);
        let mut seq = [0_u32; 256];
        data.iter().for_each(|&b| seq[b as usize] += 1);
        assert_eq!(par, seq);
    }
}
