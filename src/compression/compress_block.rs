use std::io::{self, Read, Write};

use log::{error, trace};

use super::stream_format::{read_block, write_block, HEADER_LEN};
use crate::bwt_algorithms::bwt_sort::{bwt_decode, bwt_encode, Algorithm};
use crate::error::{CombyteError, Result};
use crate::tools::packbits::{packbits_decode, packbits_encode};

/// One block after the BWT and PackBits stages, ready for the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedBlock {
    /// Row of the original block in the sorted rotation table
    pub primary_index: i32,
    /// PackBits encoded last column
    pub payload: Vec<u8>,
}

impl EncodedBlock {
    /// Size of this block on the stream, header included.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }

    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<usize> {
        write_block(writer, self)
    }

    /// Serialize to the stream layout. Workers do this so the writer only copies bytes.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len());
        write_block(&mut out, self)?;
        Ok(out)
    }
}

/// Called by the compression workers, this handles the BWT and PackBits stages of one block.
/// The block must not be longer than i32::MAX, which the block size check guarantees.
pub fn encode_block(block: &[u8], algorithm: Algorithm) -> EncodedBlock {
    let (key, bwt) = bwt_encode(block, algorithm);
    let payload = packbits_encode(&bwt);
    trace!(
        "Encoded {} bytes, key {}, payload {} bytes",
        block.len(),
        key,
        payload.len()
    );
    EncodedBlock {
        primary_index: key as i32,
        payload,
    }
}

/// Undo the PackBits stage and then the BWT, checking the primary index on the way.
/// The encoder never writes an empty block, so a frame holding no bytes is corrupt.
pub fn decode_block(block: &EncodedBlock) -> Result<Vec<u8>> {
    let bwt = packbits_decode(&block.payload)?;
    if bwt.is_empty() {
        error!(
            "Block with primary index {} holds no data",
            block.primary_index
        );
        return Err(CombyteError::InvalidPrimaryIndex {
            index: block.primary_index as i64,
            len: 0,
        });
    }
    bwt_decode(block.primary_index, &bwt)
}

/// Read the next block from the stream and decode it. None at a clean end of stream.
pub fn decode_next<R: Read + ?Sized>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    match read_block(reader)? {
        Some(block) => decode_block(&block).map(Some),
        None => Ok(None),
    }
}
