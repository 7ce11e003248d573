use crate::error::{CombyteError, Result};

/// Longest run (repeat or literal) a single header byte can describe.
pub const MAX_RUN: usize = 128;

/// Header value reserved by PackBits. Decoders skip it.
const NOOP: i8 = -128;

/// Longest output packbits_encode can give for `len` input bytes. The worst case is a lone
/// literal before every 2-byte repeat, where 3 bytes become 4.
pub fn max_encoded_len(len: usize) -> usize {
    len + (len + 2) / 3
}

/// PackBits run-length encode. Runs of 2-128 identical bytes become a header of -(count-1)
/// followed by the byte. Everything else is copied out in literal runs of 1-128 bytes with a header
/// of count-1.
pub fn packbits_encode(data: &[u8]) -> Vec<u8> {
    // Room for one header per 128 literals.
    let mut out = Vec::with_capacity(data.len() + data.len() / MAX_RUN + 1);
    let end = data.len();
    let mut i = 0;

    while i < end {
        if i + 1 < end && data[i] == data[i + 1] {
            // Repeat run. Extend until the run breaks or we hit the header limit.
            let byte = data[i];
            let mut count = 2;
            while i + count < end && count < MAX_RUN && data[i + count] == byte {
                count += 1;
            }
            out.push((1 - count as i32) as i8 as u8);
            out.push(byte);
            i += count;
        } else {
            // Literal run. Stop one byte early if a repeat run starts.
            let start = i;
            i += 1;
            while i < end && i - start < MAX_RUN {
                if i + 1 < end && data[i] == data[i + 1] {
                    break;
                }
                i += 1;
            }
            out.push((i - start - 1) as u8);
            out.extend_from_slice(&data[start..i]);
        }
    }
    out
}

/// Reverse packbits_encode. A header that promises more bytes than remain is reported as
/// a truncated stream.
pub fn packbits_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut i = 0;

    while i < data.len() {
        let header = data[i] as i8;
        i += 1;

        if header >= 0 {
            let count = header as usize + 1;
            if i + count > data.len() {
                return Err(CombyteError::TruncatedStream("literal run"));
            }
            out.extend_from_slice(&data[i..i + count]);
            i += count;
        } else if header != NOOP {
            let count = (1 - header as i32) as usize;
            let &byte = data
                .get(i)
                .ok_or(CombyteError::TruncatedStream("repeat run"))?;
            i += 1;
            out.resize(out.len() + count, byte);
        }
    }
    Ok(out)
}
