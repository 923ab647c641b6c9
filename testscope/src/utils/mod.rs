//! Shared helpers: type-erased hashable values and timestamps.

mod erased;
pub mod timestamps;

pub use erased::{ErasedKey, KeyValue};
pub use timestamps::{format_iso8601, iso_timestamp, now_utc, Timestamp};
