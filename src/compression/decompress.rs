use std::io::{self, Read, Write};
use std::time::Instant;

use log::{debug, info};

use super::compress::{report, StreamStats};
use super::compress_block::{decode_block, EncodedBlock};
use super::pipeline::run_pipeline;
use super::stream_format::BlockFrames;
use crate::error::Result;

/// Decompress a combyte stream one block at a time. The first corrupt block stops the run;
/// nothing after it is written.
pub fn decompress<R: Read, W: Write>(reader: R, mut writer: W) -> Result<StreamStats> {
    let timer = Instant::now();
    let mut stats = StreamStats::default();

    for frame in BlockFrames::new(reader) {
        let block = frame?;
        let data = decode_block(&block)?;
        writer.write_all(&data)?;
        debug!(
            "Decoded block {}: {} bytes in, {} bytes out.",
            stats.blocks,
            block.encoded_len(),
            data.len()
        );
        stats.blocks += 1;
        stats.bytes_in += block.encoded_len() as u64;
        stats.bytes_out += data.len() as u64;
    }
    writer.flush()?;

    report("Decompressed", &stats, timer);
    Ok(stats)
}

/// Decompress with a worker pool. Block boundaries are only known by reading each header, so
/// the splitter reads frames in order while the workers undo the BWT and PackBits stages.
pub fn decompress_parallel<R, W>(reader: R, mut writer: W, workers: usize) -> Result<StreamStats>
where
    R: Read + Send,
    W: Write,
{
    info!("Decompressing with {} workers.", workers);
    let timer = Instant::now();
    let mut stats = StreamStats::default();

    run_pipeline(
        workers,
        move |feeder| {
            for frame in BlockFrames::new(reader) {
                if !feeder.push(frame?) {
                    break;
                }
            }
            Ok(())
        },
        |block: EncodedBlock| decode_block(&block).map(|data| (block.encoded_len(), data)),
        |(raw, data): (usize, Vec<u8>)| {
            writer.write_all(&data)?;
            stats.blocks += 1;
            stats.bytes_in += raw as u64;
            stats.bytes_out += data.len() as u64;
            Ok(())
        },
    )?;
    writer.flush()?;

    report("Decompressed", &stats, timer);
    Ok(stats)
}

/// Check that a stream decodes cleanly without keeping the output.
pub fn test_stream<R: Read>(reader: R) -> Result<StreamStats> {
    decompress(reader, io::sink())
}
