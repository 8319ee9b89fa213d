//! Object Id Generation
//!
//! The directory only requires ids to be comparable; how they are minted is
//! the builder layer's business. The generator is injected rather than hidden
//! global state so multiple trees can coexist in one process.

use std::sync::atomic::{AtomicU64, Ordering};

/// Capability for minting object ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Monotonic decimal ids from an atomic counter.
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: u64) -> Self {
        SequentialIds {
            counter: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        self.counter.fetch_add(1, Ordering::Relaxed).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIds::new();
        assert_eq!(ids.next_id(), "0");
        assert_eq!(ids.next_id(), "1");
        let ids = SequentialIds::starting_at(100);
        assert_eq!(ids.next_id(), "100");
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let ids = SequentialIds::new();
        let mut minted: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| (0..50).map(|_| ids.next_id()).collect::<Vec<_>>()))
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });
        minted.sort();
        minted.dedup();
        assert_eq!(minted.len(), 200);
    }
}
