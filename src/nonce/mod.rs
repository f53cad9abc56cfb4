//! Per-address nonce allocation.

pub mod allocator;

pub use allocator::{NonceAllocator, NonceStatus};
