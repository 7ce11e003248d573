//! The tools module provides several helper functions for combyte.
//!
//! The tools are:
//! - block_reader: Splits an input stream into fixed size blocks.
//! - cli: Command line interface for combyte.
//! - freq_count: Frequency count of the bytes in a block.
//! - packbits: PackBits style run length coding of the BWT output.
//!
pub mod block_reader;
pub mod cli;
pub mod freq_count;
pub mod packbits;
