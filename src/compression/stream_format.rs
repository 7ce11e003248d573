use std::io::{self, ErrorKind, Read, Write};

use log::{error, trace};

use super::compress_block::EncodedBlock;
use crate::error::{CombyteError, Result};

/*
    A combyte stream is nothing more than blocks written one after the other:

        primary index   i32, little endian
        payload length  i32, little endian
        payload         payload length bytes of PackBits data

    There is no file header, magic or checksum. The compression level is not stored
    because every block carries its own length.
*/

/// Bytes in the fixed part of every block.
pub const HEADER_LEN: usize = 8;

/// Upper bound on what we reserve before the payload has actually arrived.
const MAX_PREALLOC: usize = 1 << 20;

/// Write one block to the stream. Returns the number of bytes written.
pub fn write_block<W>(writer: &mut W, block: &EncodedBlock) -> io::Result<usize>
where
    W: Write + ?Sized,
{
    let len = i32::try_from(block.payload.len()).map_err(|_| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("payload of {} bytes is too long for a block", block.payload.len()),
        )
    })?;
    writer.write_all(&block.primary_index.to_le_bytes())?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&block.payload)?;
    Ok(HEADER_LEN + block.payload.len())
}

/// Read the fixed header. None means the stream ended cleanly on a block boundary.
fn read_header<R: Read + ?Sized>(reader: &mut R) -> Result<Option<[u8; HEADER_LEN]>> {
    let mut header = [0_u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        match reader.read(&mut header[filled..]) {
            Ok(0) => break,
            Ok(received) => filled += received,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    match filled {
        0 => Ok(None),
        HEADER_LEN => Ok(Some(header)),
        _ => {
            error!("Stream ended {} bytes into a block header", filled);
            Err(CombyteError::TruncatedStream("block header"))
        }
    }
}

/// Read the next block from the stream, or None at the end of the stream.
pub fn read_block<R: Read + ?Sized>(reader: &mut R) -> Result<Option<EncodedBlock>> {
    let header = match read_header(reader)? {
        Some(header) => header,
        None => return Ok(None),
    };
    let primary_index = i32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let len = i32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if len < 0 {
        error!("Block header declares a payload of {} bytes", len);
        return Err(CombyteError::InvalidPayloadLength(len));
    }
    trace!("Block header: key {}, payload {} bytes", primary_index, len);

    // Don't trust the length with a big allocation until the bytes show up.
    let len = len as usize;
    let mut payload = Vec::with_capacity(len.min(MAX_PREALLOC));
    (&mut *reader).take(len as u64).read_to_end(&mut payload)?;
    if payload.len() != len {
        error!(
            "Block payload holds {} of the {} bytes declared",
            payload.len(),
            len
        );
        return Err(CombyteError::TruncatedStream("block payload"));
    }

    Ok(Some(EncodedBlock {
        primary_index,
        payload,
    }))
}

/// Iterable struct returning each block of a stream in order. Stops after the first error.
pub struct BlockFrames<R> {
    source: R,
    done: bool,
}

impl<R: Read> BlockFrames<R> {
    pub fn new(source: R) -> Self {
        BlockFrames {
            source,
            done: false,
        }
    }
}

impl<R: Read> Iterator for BlockFrames<R> {
    type Item = Result<EncodedBlock>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read_block(&mut self.source) {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> EncodedBlock {
        EncodedBlock {
            primary_index: 3,
            payload: vec![2, b'x', b'y', b'z'],
        }
    }

    #[test]
    fn layout_is_little_endian() {
        let mut out = Vec::new();
        assert_eq!(write_block(&mut out, &sample()).unwrap(), 12);
        assert_eq!(out, vec![3, 0, 0, 0, 4, 0, 0, 0, 2, b'x', b'y', b'z']);
    }

    #[test]
    fn read_back_two_blocks() {
        let mut out = Vec::new();
        write_block(&mut out, &sample()).unwrap();
        let second = EncodedBlock {
            primary_index: 0x0102_0304,
            payload: vec![],
        };
        write_block(&mut out, &second).unwrap();

        let mut input = out.as_slice();
        assert_eq!(read_block(&mut input).unwrap(), Some(sample()));
        assert_eq!(read_block(&mut input).unwrap(), Some(second));
        assert_eq!(read_block(&mut input).unwrap(), None);
    }

    #[test]
    fn empty_stream_has_no_blocks() {
        let mut input: &[u8] = &[];
        assert!(read_block(&mut input).unwrap().is_none());
        assert_eq!(BlockFrames::new(input).count(), 0);
    }

    #[test]
    fn truncated_header() {
        let mut input: &[u8] = &[3, 0, 0, 0, 4];
        assert!(matches!(
            read_block(&mut input),
            Err(CombyteError::TruncatedStream("block header"))
        ));
    }

    #[test]
    fn truncated_payload() {
        let mut input: &[u8] = &[3, 0, 0, 0, 4, 0, 0, 0, 2, b'x'];
        assert!(matches!(
            read_block(&mut input),
            Err(CombyteError::TruncatedStream("block payload"))
        ));
    }

    #[test]
    fn huge_length_does_not_allocate_up_front() {
        let mut input: &[u8] = &[0, 0, 0, 0, 0xff, 0xff, 0xff, 0x7f, 1, 2, 3];
        assert!(matches!(
            read_block(&mut input),
            Err(CombyteError::TruncatedStream(_))
        ));
    }

    #[test]
    fn negative_length() {
        let mut input: &[u8] = &[0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff];
        assert!(matches!(
            read_block(&mut input),
            Err(CombyteError::InvalidPayloadLength(-1))
        ));
    }

    #[test]
    fn frames_stop_after_error() {
        let mut out = Vec::new();
        write_block(&mut out, &sample()).unwrap();
        out.extend_from_slice(&[1, 2, 3]);
        let mut frames = BlockFrames::new(out.as_slice());
        assert!(frames.next().unwrap().is_ok());
        assert!(frames.next().unwrap().is_err());
        assert!(frames.next().is_none());
    }
}
