//! Library rendition of the browser event-capture client.
//!
//! Channel attribution, idle-timeout sessions, section-view deduplication and
//! fire-and-forget delivery, with storage and transport injected so the logic
//! runs deterministically under test.

pub mod client;
pub mod session;
pub mod transport;

pub use client::CaptureClient;
pub use session::{KvStore, MemoryStore};
pub use transport::{DataLayer, DeliveryResult, Transport};
