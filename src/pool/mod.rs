//! Multicast pool allocation
//!
//! A [`McastPool`] owns a contiguous range of IPv4 multicast addresses and
//! hands out unique addresses to streaming entries. Allocation is
//! lowest-free-first, so seeding the same channel list twice yields the
//! same address assignment.
//!
//! The pool is synchronous and lock-based; wrap it in an `Arc` to share it
//! with asynchronous contributors.
//!
//! # Example
//!
//! ```
//! use shardseed::pool::{McastPool, McastRange};
//!
//! let range = McastRange::new(
//!     "239.255.0.1".parse().unwrap(),
//!     "239.255.0.3".parse().unwrap(),
//! ).unwrap();
//! let pool = McastPool::new(range);
//!
//! let first = pool.allocate().unwrap();
//! assert_eq!(first.to_string(), "239.255.0.1");
//! pool.release(first).unwrap();
//! ```

pub mod allocator;
pub mod error;
pub mod range;

pub use allocator::{McastPool, PoolStats};
pub use error::PoolError;
pub use range::McastRange;
