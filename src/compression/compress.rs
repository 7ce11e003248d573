use std::io::{Read, Write};
use std::time::Instant;

use log::{debug, info};

use super::compress_block::encode_block;
use super::pipeline::{default_workers, run_pipeline};
use crate::bwt_algorithms::bwt_sort::Algorithm;
use crate::error::{CombyteError, Result};
use crate::tools::block_reader::BlockReader;
use crate::tools::packbits::max_encoded_len;

/// Each compression level adds this many bytes to the block size.
pub const LEVEL_UNIT: usize = 1024;
/// Level used when none is given.
pub const DEFAULT_LEVEL: usize = 3;

/// Settings for one compression run.
#[derive(Clone, Debug)]
pub struct CompressOptions {
    /// Block size is level * 1024 bytes
    pub level: usize,
    /// Worker threads encoding blocks
    pub workers: usize,
    /// Sorting algorithm for the BWT
    pub algorithm: Algorithm,
}

impl CompressOptions {
    pub fn new(level: usize) -> Self {
        Self {
            level,
            workers: default_workers(),
            algorithm: Algorithm::Auto,
        }
    }
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

/// What a compress or decompress run got through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub blocks: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// Block size for a compression level. Payload lengths are stored as an i32, so a block has
/// to fit one even after PackBits has grown it.
pub fn block_size(level: usize) -> Result<usize> {
    let size = match level.checked_mul(LEVEL_UNIT) {
        Some(size) if level > 0 && max_encoded_len(size) <= i32::MAX as usize => size,
        _ => return Err(CombyteError::InvalidLevel(level)),
    };
    Ok(size)
}

/// Compress everything from reader into writer at the given level, using every core.
pub fn compress<R, W>(reader: R, writer: W, level: usize) -> Result<StreamStats>
where
    R: Read + Send,
    W: Write,
{
    compress_with(reader, writer, &CompressOptions::new(level))
}

/// Compress everything from reader into writer. Blocks are encoded in parallel and written in
/// their original order.
pub fn compress_with<R, W>(
    reader: R,
    mut writer: W,
    opts: &CompressOptions,
) -> Result<StreamStats>
where
    R: Read + Send,
    W: Write,
{
    let block_size = block_size(opts.level)?;
    let algorithm = opts.algorithm;
    info!(
        "Compressing in {} byte blocks with {} workers.",
        block_size, opts.workers
    );
    let timer = Instant::now();
    let mut stats = StreamStats::default();

    run_pipeline(
        opts.workers,
        move |feeder| {
            for block in BlockReader::new(reader, block_size) {
                if !feeder.push(block?) {
                    break;
                }
            }
            Ok(())
        },
        |block: Vec<u8>| {
            let encoded = encode_block(&block, algorithm);
            Ok((block.len(), encoded.to_bytes()?))
        },
        |(raw, frame): (usize, Vec<u8>)| {
            writer.write_all(&frame)?;
            debug!(
                "Wrote block {}: {} bytes in, {} bytes out.",
                stats.blocks,
                raw,
                frame.len()
            );
            stats.blocks += 1;
            stats.bytes_in += raw as u64;
            stats.bytes_out += frame.len() as u64;
            Ok(())
        },
    )?;
    writer.flush()?;

    report("Compressed", &stats, timer);
    Ok(stats)
}

/// Log a one line summary of a finished run.
pub(crate) fn report(what: &str, stats: &StreamStats, timer: Instant) {
    let elapsed = timer.elapsed().as_secs_f64();
    let mbps = if elapsed > 0.0 {
        stats.bytes_in.max(stats.bytes_out) as f64 / (1024.0 * 1024.0) / elapsed
    } else {
        0.0
    };
    info!(
        "{} {} blocks: {} -> {} bytes in {:.3}s ({:.2} MB/s).",
        what, stats.blocks, stats.bytes_in, stats.bytes_out, elapsed, mbps
    );
}
