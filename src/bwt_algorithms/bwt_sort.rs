use crate::error::{CombyteError, Result};
use crate::tools::freq_count::freqs;
use log::{error, trace};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::str::FromStr;

/// Blocks shorter than this always use the native comparison sort.
const SMALL_BLOCK: usize = 3_000;
/// Sample length used when guessing whether a block is repetitive.
const SAMPLE: usize = 5_000;
/// The sample is taken as this many windows spread over the block.
const SAMPLE_WINDOWS: usize = 5;
/// A run of one byte this long anywhere in the block is too slow to compare directly.
const LONG_RUN: usize = 4_096;
/// Native sort goes parallel above this many bytes.
const PAR_SORT: usize = 40_000;

/// Define the forward sorting algorithms
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Pick per block, based on a sample of the data
    Auto,
    /// Comparison sort of rotations. Fast on varied data, slow on long repeats
    Native,
    /// Prefix doubling over cyclic rotations. O(n log n) regardless of content
    Doubling,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Auto
    }
}

impl FromStr for Algorithm {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Algorithm::Auto),
            "native" => Ok(Algorithm::Native),
            "doubling" => Ok(Algorithm::Doubling),
            other => Err(format!("unknown algorithm '{}' (auto, native, doubling)", other)),
        }
    }
}

/// Burrows-Wheeler-Transform of one block, treated as cyclic. Returns the primary index (the row of
/// the unrotated block in the sorted rotation table) and the last column of that table.
/// Identical rotations sort by starting offset, so every algorithm gives the same answer.
pub fn bwt_encode(block: &[u8], algorithm: Algorithm) -> (u32, Vec<u8>) {
    if block.is_empty() {
        return (0, Vec::new());
    }
    let algorithm = match algorithm {
        Algorithm::Auto if use_doubling(block) => Algorithm::Doubling,
        Algorithm::Auto => Algorithm::Native,
        other => other,
    };
    trace!("Sorting {} bytes with {:?}", block.len(), algorithm);

    let index = match algorithm {
        Algorithm::Doubling => doubling_sort(block),
        _ => native_sort(block),
    };

    // Get key and BWT output
    let end = block.len();
    let mut key = 0_u32;
    let mut bwt = vec![0; end];
    for (row, &start) in index.iter().enumerate() {
        let start = start as usize;
        if start == 0 {
            key = row as u32;
            bwt[row] = block[end - 1];
        } else {
            bwt[row] = block[start - 1];
        }
    }
    (key, bwt)
}

/// Sort rotation offsets by comparing the rotations directly.
fn native_sort(block: &[u8]) -> Vec<u32> {
    let mut index = (0_u32..block.len() as u32).collect::<Vec<u32>>();
    if block.len() > PAR_SORT {
        index[..].par_sort_unstable_by(|a, b| rotation_compare(*a as usize, *b as usize, block));
    } else {
        index[..].sort_unstable_by(|a, b| rotation_compare(*a as usize, *b as usize, block));
    }
    index
}

/// Compare the rotations starting at a and b over the full length of the block, falling back to
/// the offsets when the rotations are identical.
fn rotation_compare(a: usize, b: usize, block: &[u8]) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    if a > b {
        return rotation_compare(b, a, block).reverse();
    }
    // With a < b the comparison splits into three slices that do not wrap:
    //   block[a..a+tail]  vs block[b..]        (b reaches the end first)
    //   block[a+tail..]   vs block[..b-a]      (a reaches the end)
    //   block[..a]        vs block[b-a..b]     (the remainder)
    let end = block.len();
    let tail = end - b;
    let gap = b - a;
    block[a..a + tail]
        .cmp(&block[b..])
        .then_with(|| block[a + tail..].cmp(&block[..gap]))
        .then_with(|| block[..a].cmp(&block[gap..b]))
        .then(a.cmp(&b))
}

/// Sort cyclic rotations by prefix doubling. Each round orders the rotations by their first 2k
/// bytes using two counting sorts over the ranks of the first k bytes.
fn doubling_sort(block: &[u8]) -> Vec<u32> {
    let end = block.len();

    // Round zero: counting sort on single bytes.
    let mut order = vec![0_u32; end];
    {
        let mut heads = [0_usize; 256];
        let counts = freqs(block);
        let mut sum = 0;
        for (head, &count) in heads.iter_mut().zip(counts.iter()) {
            *head = sum;
            sum += count as usize;
        }
        for (i, &b) in block.iter().enumerate() {
            order[heads[b as usize]] = i as u32;
            heads[b as usize] += 1;
        }
    }
    let mut class = vec![0_u32; end];
    let mut classes = 1;
    for w in 1..end {
        if block[order[w] as usize] != block[order[w - 1] as usize] {
            classes += 1;
        }
        class[order[w] as usize] = classes - 1;
    }

    let mut shifted = vec![0_u32; end];
    let mut next_class = vec![0_u32; end];
    let mut counts = vec![0_usize; end];
    let mut k = 1;
    while k < end && (classes as usize) < end {
        // Rotations ordered by their second half are the current order shifted back by k.
        for (slot, &start) in shifted.iter_mut().zip(order.iter()) {
            *slot = ((start as usize + end - k) % end) as u32;
        }

        // Stable counting sort by the class of the first half.
        counts[..classes as usize].iter_mut().for_each(|c| *c = 0);
        for &start in shifted.iter() {
            counts[class[start as usize] as usize] += 1;
        }
        let mut sum = 0;
        for c in counts[..classes as usize].iter_mut() {
            let here = *c;
            *c = sum;
            sum += here;
        }
        for &start in shifted.iter() {
            let c = class[start as usize] as usize;
            order[counts[c]] = start;
            counts[c] += 1;
        }

        // Renumber classes on (first half, second half) pairs.
        next_class[order[0] as usize] = 0;
        classes = 1;
        for w in 1..end {
            let cur = order[w] as usize;
            let prev = order[w - 1] as usize;
            let cur_pair = (class[cur], class[(cur + k) % end]);
            let prev_pair = (class[prev], class[(prev + k) % end]);
            if cur_pair != prev_pair {
                classes += 1;
            }
            next_class[cur] = classes - 1;
        }
        std::mem::swap(&mut class, &mut next_class);
        k <<= 1;
    }

    // Whatever classes remain shared are truly identical rotations. Put them in offset order.
    let mut run = 0;
    while run < end {
        let mut stop = run + 1;
        while stop < end && class[order[stop] as usize] == class[order[run] as usize] {
            stop += 1;
        }
        if stop - run > 1 {
            order[run..stop].sort_unstable();
        }
        run = stop;
    }
    order
}

/// Evenly spaced windows of the block, first and last included, joined into one sample.
fn sample_windows(block: &[u8]) -> Vec<u8> {
    if block.len() <= SAMPLE {
        return block.to_vec();
    }
    let width = SAMPLE / SAMPLE_WINDOWS;
    let stride = (block.len() - width) / (SAMPLE_WINDOWS - 1);
    (0..SAMPLE_WINDOWS)
        .flat_map(|w| &block[w * stride..w * stride + width])
        .copied()
        .collect()
}

/// Longest stretch of one repeated byte.
fn longest_run(data: &[u8]) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for w in data.windows(2) {
        if w[0] == w[1] {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

/// Decide whether a block is repetitive enough that comparison sorting would crawl.
fn use_doubling(block: &[u8]) -> bool {
    if block.len() < SMALL_BLOCK {
        return false;
    }
    // A single long run is cheap to find over the whole block
    if longest_run(block) >= LONG_RUN {
        return true;
    }
    let sample = sample_windows(block);
    let data = sample.as_slice();

    // Use doubling if the most frequent byte is more than 30% of the sample,
    //   or if the symbol count is less than 20 unique symbols
    let freq_array = freqs(data);
    let symbols = freq_array.iter().filter(|&&f| f != 0).count();
    let max = freq_array.iter().copied().max().unwrap_or(0) as usize;
    if max * 10 > data.len() * 3 || symbols < 20 {
        return true;
    }

    // Use doubling if the longest run is > 20% of the sample
    if longest_run(data) * 10 / data.len() > 2 {
        return true;
    }

    // Use doubling if most 8 byte grams have been seen before (periodic or copied text)
    let mut seen: FxHashSet<&[u8]> = FxHashSet::default();
    let grams = data.len() - 7;
    let repeats = data.windows(8).filter(|w| !seen.insert(*w)).count();
    repeats * 2 > grams
}

/// Decode a Burrows-Wheeler-Transform using the LF-mapping. The key must address a row of the
/// block.
pub fn bwt_decode(key: i32, bwt_in: &[u8]) -> Result<Vec<u8>> {
    // Calculate end once.
    let end = bwt_in.len();
    if end == 0 {
        return Ok(Vec::new());
    }
    if key < 0 || key as usize >= end {
        error!("Primary index {} is outside a block of {} bytes", key, end);
        return Err(CombyteError::InvalidPrimaryIndex {
            index: key as i64,
            len: end,
        });
    }

    // Convert frequency count to a cumulative sum of frequencies
    let freq_in = freqs(bwt_in);
    let mut freq = [0_u32; 256];
    for i in 0..255 {
        freq[i + 1] = freq[i] + freq_in[i];
    }

    //Build the transformation vector to find the next character in the original data
    let mut t_vec = vec![0_u32; end];
    for (i, &s) in bwt_in.iter().enumerate() {
        t_vec[freq[s as usize] as usize] = i as u32;
        freq[s as usize] += 1
    }

    // Walk the cycle starting from the row after the key
    let mut data = vec![0_u8; end];
    let mut curr = t_vec[key as usize] as usize;
    for byte in data.iter_mut() {
        *byte = bwt_in[curr];
        curr = t_vec[curr] as usize;
    }

    Ok(data)
}
