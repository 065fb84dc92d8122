//! Multicast address range
//!
//! An inclusive range of IPv4 multicast addresses, validated on
//! construction. The range is the immutable half of a pool; the allocator
//! tracks which of its addresses are handed out.

use std::fmt;
use std::net::Ipv4Addr;

use super::error::PoolError;

/// Inclusive range of IPv4 multicast addresses
///
/// Both endpoints must lie in 224.0.0.0/4 and `start` must not be above
/// `end`. Ordering and arithmetic follow the numeric value of the dotted
/// quad, so `239.255.0.255` is immediately followed by `239.255.1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McastRange {
    start: Ipv4Addr,
    end: Ipv4Addr,
}

impl McastRange {
    /// Creates a validated range from two inclusive endpoints
    pub fn new(start: Ipv4Addr, end: Ipv4Addr) -> Result<Self, PoolError> {
        if !start.is_multicast() {
            return Err(PoolError::NotMulticast(start));
        }
        if !end.is_multicast() {
            return Err(PoolError::NotMulticast(end));
        }
        if u32::from(start) > u32::from(end) {
            return Err(PoolError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First address of the range
    pub fn start(&self) -> Ipv4Addr {
        self.start
    }

    /// Last address of the range
    pub fn end(&self) -> Ipv4Addr {
        self.end
    }

    /// Returns true when the address lies inside the range
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let bits = u32::from(addr);
        bits >= u32::from(self.start) && bits <= u32::from(self.end)
    }

    /// Number of addresses in the range, endpoints included
    pub fn capacity(&self) -> u64 {
        u64::from(u32::from(self.end)) - u64::from(u32::from(self.start)) + 1
    }
}

impl fmt::Display for McastRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
