use std::io::{self, ErrorKind, Read};

/// Iterable struct that returns blocks of at most block_size bytes read from the source.
/// Every block is full except possibly the last one, and no empty block is ever returned.
pub struct BlockReader<R> {
    source: R,
    block_size: usize,
    data_gone: bool,
}

impl<R: Read> BlockReader<R> {
    pub fn new(source: R, block_size: usize) -> Self {
        BlockReader {
            source,
            block_size: block_size.max(1),
            data_gone: false,
        }
    }

    /// Keep reading until the block is full or the source runs dry. A single read may legally
    /// return fewer bytes than asked for, so one call is not enough to fill a block.
    fn fill_block(&mut self) -> io::Result<Vec<u8>> {
        let mut block = vec![0_u8; self.block_size];
        let mut filled = 0;
        while filled < self.block_size {
            match self.source.read(&mut block[filled..]) {
                Ok(0) => {
                    self.data_gone = true;
                    break;
                }
                Ok(received) => filled += received,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.data_gone = true;
                    return Err(e);
                }
            }
        }
        block.truncate(filled);
        Ok(block)
    }
}

impl<R: Read> Iterator for BlockReader<R> {
    type Item = io::Result<Vec<u8>>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.data_gone {
            return None;
        }
        match self.fill_block() {
            Ok(block) if block.is_empty() => None,
            other => Some(other),
        }
    }
}
