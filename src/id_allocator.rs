use std::sync::atomic::{AtomicI32, Ordering};

use crate::api::BookId;

/// Hands out unique book ids. Implementations must be safe to share
/// between concurrent `add` calls.
pub trait IdAllocator: Send + Sync {
    fn next_id(&self) -> BookId;
}

/// Fetch-and-increment sequence. It is not persisted, after a restart it
/// starts over regardless of what the store contains.
pub struct SequenceIdAllocator {
    next: AtomicI32,
}

impl SequenceIdAllocator {
    pub fn starting_at(first_id: BookId) -> Self {
        Self {
            next: AtomicI32::new(first_id),
        }
    }
}

impl IdAllocator for SequenceIdAllocator {
    fn next_id(&self) -> BookId {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}
