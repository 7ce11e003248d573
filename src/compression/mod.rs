//! The compression module manages both directions of the combyte stream.
//!
//! Compression happens in the following steps:
//! - Split: The input is cut into blocks of level * 1024 bytes. Only the last block may be shorter.
//! - Burrow Wheeler Transform: Sort the rotations of each block so that bytes with similar contexts sit together.
//! - PackBits: Code the runs that the transform produced.
//! - Write: Each block goes out as primary index, payload length and payload.
//!
//! Blocks do not depend on each other, so a pool of workers encodes them in parallel. A single
//! writer holds any block that finishes early until all of the blocks before it have been written.
//!
//! Decompression follows the inverse of the compression process, one block at a time, stopping at the
//! first block that fails to decode. A parallel version is available that reuses the same pool.
//!

pub mod compress;
pub mod compress_block;
pub mod decompress;
pub mod pipeline;
pub mod reorder;
pub mod stream_format;
