//! TTL key-value cache abstraction for the Undugu client.
//!
//! The view cache medium is deliberately abstract: plain text values,
//! bounded size, per-key expiry. Nothing here assumes a particular storage
//! backend; the in-memory implementation is the reference and the test
//! double.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use traits::ViewStore;
