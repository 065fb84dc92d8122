//! Pool error types
//!
//! Error types for multicast pool construction and allocation.

use std::net::Ipv4Addr;

/// Error type for multicast pool operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Every address in the configured range is currently allocated
    #[error("multicast pool exhausted")]
    Exhausted,
    /// Release of an address that is not currently allocated
    #[error("address {0} is not allocated")]
    NotAllocated(Ipv4Addr),
    /// Range constructed with start above end
    #[error("invalid range: start {start} is above end {end}")]
    InvalidRange { start: Ipv4Addr, end: Ipv4Addr },
    /// Range endpoint outside 224.0.0.0/4
    #[error("address {0} is not an IPv4 multicast address")]
    NotMulticast(Ipv4Addr),
}
