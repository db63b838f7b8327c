//! Coordination-free, sortable 64-bit Snowflake-style IDs.
//!
//! The crate centers on one component: [`SnowflakeAllocator`], an ID-issuing
//! authority bound to a single 10-bit worker id. Each call to
//! [`SnowflakeAllocator::next_id`] packs the current millisecond offset from a
//! configurable epoch, the worker id, and a per-millisecond sequence counter
//! into an immutable [`SnowflakeId`]:
//!
//! ```text
//!  Bit Index:  63           63 62            22 21            12 11             0
//!              +--------------+----------------+----------------+---------------+
//!  Field:      | reserved (1) | timestamp (41) | worker id (10) | sequence (12) |
//!              +--------------+----------------+----------------+---------------+
//!              |<----------- MSB ---------- 64 bits ----------- LSB ----------->|
//! ```
//!
//! IDs issued by one allocator are strictly increasing, unique across
//! allocators with distinct worker ids, and hard-capped at 4096 per
//! millisecond per instance (callers above that rate are throttled, not
//! failed). Backward wall-clock steps within a configured tolerance are
//! absorbed by waiting; larger steps refuse ID generation with
//! [`Error::ClockMovedBackwards`] and leave the allocator usable for a later
//! retry.
//!
//! # Example
//!
//! ```
//! use snowdrift::SnowflakeAllocator;
//!
//! let allocator = SnowflakeAllocator::new(7)?;
//! let a = allocator.next_id()?;
//! let b = allocator.next_id()?;
//!
//! assert!(a < b);
//! assert_eq!(a.worker_id(), 7);
//! # Ok::<(), snowdrift::Error>(())
//! ```

mod allocator;
mod error;
mod id;
mod rand;
mod time;

pub use crate::allocator::*;
pub use crate::error::*;
pub use crate::id::*;
pub use crate::rand::*;
pub use crate::time::*;
