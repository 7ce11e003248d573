use rustc_hash::FxHashMap;

use crate::error::{CombyteError, Result};

/// Holds results that finished out of order until everything before them has been written.
/// The buffer only ever contains sequence numbers at or after `next`.
pub struct ReorderBuffer<T> {
    pending: FxHashMap<u64, T>,
    next: u64,
    peak: usize,
}

impl<T> ReorderBuffer<T> {
    pub fn new() -> Self {
        Self {
            pending: FxHashMap::default(),
            next: 0,
            peak: 0,
        }
    }

    /// Park a finished result. A sequence number that was already flushed or is already waiting
    /// means a block was duplicated somewhere upstream.
    pub fn insert(&mut self, seq: u64, item: T) -> Result<()> {
        if seq < self.next || self.pending.contains_key(&seq) {
            return Err(CombyteError::Pipeline(format!(
                "block {} arrived twice",
                seq
            )));
        }
        self.pending.insert(seq, item);
        self.peak = self.peak.max(self.pending.len());
        Ok(())
    }

    /// Take the next result in sequence if it has arrived.
    pub fn pop_ready(&mut self) -> Option<T> {
        let item = self.pending.remove(&self.next)?;
        self.next += 1;
        Some(item)
    }

    /// Sequence number the writer is waiting for.
    pub fn next_seq(&self) -> u64 {
        self.next
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Most results held at one time.
    pub fn peak(&self) -> usize {
        self.peak
    }
}

impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::ReorderBuffer;

    #[test]
    fn in_order_passes_straight_through() {
        let mut buf = ReorderBuffer::new();
        for seq in 0..5_u64 {
            buf.insert(seq, seq * 10).unwrap();
            assert_eq!(buf.pop_ready(), Some(seq * 10));
            assert_eq!(buf.pop_ready(), None);
        }
        assert_eq!(buf.next_seq(), 5);
        assert_eq!(buf.peak(), 1);
    }

    #[test]
    fn out_of_order_waits_for_gap() {
        let mut buf = ReorderBuffer::new();
        buf.insert(2, "c").unwrap();
        buf.insert(1, "b").unwrap();
        assert_eq!(buf.pop_ready(), None);
        assert_eq!(buf.len(), 2);

        buf.insert(0, "a").unwrap();
        let flushed: Vec<&str> = std::iter::from_fn(|| buf.pop_ready()).collect();
        assert_eq!(flushed, vec!["a", "b", "c"]);
        assert!(buf.is_empty());
        assert_eq!(buf.next_seq(), 3);
        assert_eq!(buf.peak(), 3);
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut buf = ReorderBuffer::new();
        buf.insert(0, ()).unwrap();
        buf.insert(3, ()).unwrap();
        assert!(buf.insert(3, ()).is_err());
        assert_eq!(buf.pop_ready(), Some(()));
        assert!(buf.insert(0, ()).is_err());
    }
}
