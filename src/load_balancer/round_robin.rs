//! Round-robin rotation cursor.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared rotation counter.
/// Every dispatch reserves its starting point with a single atomic increment,
/// so concurrent callers never observe the same start.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next starting position.
    pub fn start(&self) -> usize {
        self.counter.fetch_add(1, Ordering::AcqRel)
    }

    /// Move the cursor past backends skipped during a scan.
    pub fn advance(&self, skipped: usize) {
        if skipped > 0 {
            self.counter.fetch_add(skipped, Ordering::AcqRel);
        }
    }

    /// Current counter value.
    pub fn position(&self) -> usize {
        self.counter.load(Ordering::Acquire)
    }

    /// Map a counter value onto a pool of `len` backends. `len` must be non-zero.
    pub fn index(value: usize, len: usize) -> usize {
        value % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_round_robin() {
        let rr = RoundRobin::new();
        let picks: Vec<usize> = (0..5).map(|_| RoundRobin::index(rr.start(), 2)).collect();
        assert_eq!(picks, vec![0, 1, 0, 1, 0]);
        assert_eq!(rr.position(), 5);
    }

    #[test]
    fn test_advance_skips() {
        let rr = RoundRobin::new();
        assert_eq!(rr.start(), 0);
        rr.advance(2);
        assert_eq!(rr.start(), 3);
        rr.advance(0);
        assert_eq!(rr.position(), 4);
    }

    #[test]
    fn test_counter_wraps_without_panicking() {
        let rr = RoundRobin { counter: AtomicUsize::new(usize::MAX) };
        assert_eq!(RoundRobin::index(rr.start(), 3), usize::MAX % 3);
        assert_eq!(RoundRobin::index(rr.start(), 3), 0);
    }

    #[test]
    fn test_concurrent_starts_are_unique() {
        let rr = Arc::new(RoundRobin::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let rr = rr.clone();
                std::thread::spawn(move || (0..1000).map(|_| rr.start()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<usize> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 8000);
        assert_eq!(rr.position(), 8000);
    }
}
