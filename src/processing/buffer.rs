// src/processing/buffer.rs
use crate::error::{DantienError, Result};

// BUFFER COMPONENT ------------------------------------------------------------

/// Fixed-length sample history, oldest sample first.
///
/// The buffer is zero-filled on creation and never changes length: appending
/// `n` samples evicts the `n` oldest ones.
#[derive(Debug, Clone)]
pub struct SlidingBuffer {
    buffer: Vec<f64>,
    capacity: usize,
}

impl SlidingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity],
            capacity,
        }
    }

    /// Appends `batch` at the newest end and drops as many samples from the
    /// oldest end.
    ///
    /// # Errors
    ///
    /// * `DantienError::InvalidBatch` if the batch is longer than the
    ///   capacity. The buffer is not touched in that case.
    pub fn append(&mut self, batch: &[f64]) -> Result<()> {
        let n = batch.len();
        if n > self.capacity {
            return Err(DantienError::InvalidBatch {
                len: n,
                capacity: self.capacity,
            });
        }
        if n == 0 {
            return Ok(());
        }

        // Shift the surviving history to the front, then write the batch behind it
        self.buffer.copy_within(n.., 0);
        let keep = self.capacity - n;
        self.buffer[keep..].copy_from_slice(batch);

        Ok(())
    }

    pub fn samples(&self) -> &[f64] {
        &self.buffer
    }

    /// The newest `len` samples (the whole buffer if `len` exceeds it).
    pub fn tail(&self, len: usize) -> &[f64] {
        let len = len.min(self.capacity);
        &self.buffer[self.capacity - len..]
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.buffer.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zero_filled_at_capacity() {
        let buffer = SlidingBuffer::new(16);
        assert_eq!(buffer.len(), 16);
        assert!(buffer.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn append_evicts_oldest_and_keeps_order() {
        let mut buffer = SlidingBuffer::new(5);
        buffer.append(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        buffer.append(&[6.0, 7.0]).unwrap();
        assert_eq!(buffer.samples(), &[3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn full_capacity_batch_replaces_everything() {
        let mut buffer = SlidingBuffer::new(4);
        buffer.append(&[1.0, 1.0]).unwrap();
        buffer.append(&[9.0, 8.0, 7.0, 6.0]).unwrap();
        assert_eq!(buffer.samples(), &[9.0, 8.0, 7.0, 6.0]);
    }

    #[test]
    fn oversized_batch_is_rejected_without_mutation() {
        let mut buffer = SlidingBuffer::new(3);
        buffer.append(&[1.0, 2.0, 3.0]).unwrap();
        let err = buffer.append(&[0.0; 4]).unwrap_err();
        assert!(matches!(
            err,
            DantienError::InvalidBatch {
                len: 4,
                capacity: 3
            }
        ));
        assert_eq!(buffer.samples(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let mut buffer = SlidingBuffer::new(3);
        buffer.append(&[1.0, 2.0, 3.0]).unwrap();
        buffer.append(&[]).unwrap();
        assert_eq!(buffer.samples(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn tail_is_clamped_to_capacity() {
        let mut buffer = SlidingBuffer::new(4);
        buffer.append(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(buffer.tail(2), &[3.0, 4.0]);
        assert_eq!(buffer.tail(10).len(), 4);
    }
}
