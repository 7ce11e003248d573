//! combyte, a block-sorting file compressor.
//!
//! Version 0.1.0
//!
//! Compresses a byte stream with a Burrows-Wheeler Transform followed by PackBits run length
//! coding. The input is cut into independent blocks that are encoded on every available core
//! and written back in their original order.
//!
//! The stream has no header. Each block is stored as a little endian primary index, a little
//! endian payload length and the payload, so any block can be decoded on its own.
//!
//! Basic usage from the command line:
//!
//! `$> combyte --compress --filename test.txt`
//!
//! This will compress the file and create the file test.txt.combyte.
//!
//! From Rust:
//!
//! ```
//! let mut packed = Vec::new();
//! combyte::compress(&b"banana banana"[..], &mut packed, 3).unwrap();
//! let mut restored = Vec::new();
//! combyte::decompress(packed.as_slice(), &mut restored).unwrap();
//! assert_eq!(restored, b"banana banana");
//! ```
//!
pub mod bwt_algorithms;
pub mod compression;
pub mod error;
pub mod tools;

pub use bwt_algorithms::bwt_sort::Algorithm;
pub use compression::compress::{block_size, compress, compress_with, CompressOptions, StreamStats};
pub use compression::decompress::{decompress, decompress_parallel, test_stream};
pub use error::{CombyteError, Result};
