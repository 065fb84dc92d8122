//! Multicast pool allocator
//!
//! Hands out unique multicast addresses from a fixed range. Every channel
//! entry that streams over multicast gets its own address; releases return
//! the address for reuse. Allocation always picks the lowest free address,
//! so a given sequence of operations produces the same assignment on every
//! run.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::PoolError;
use super::range::McastRange;

/// Pool of multicast addresses over a fixed range
///
/// Thread-safe; the allocated set lives behind a mutex so check-then-mark
/// is atomic and two callers can never receive the same address. Shared
/// across tasks via `Arc`.
#[derive(Debug)]
pub struct McastPool {
    /// Configured address range, immutable for the pool's lifetime
    range: McastRange,
    /// Currently allocated addresses, kept sorted for the lowest-free scan
    allocated: Mutex<BTreeSet<Ipv4Addr>>,
}

/// Snapshot of a pool's occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Total addresses in the range
    pub capacity: u64,
    /// Addresses currently handed out
    pub allocated: u64,
    /// Addresses still free
    pub free: u64,
}

impl McastPool {
    /// Creates an empty pool over the given range
    pub fn new(range: McastRange) -> Self {
        Self {
            range,
            allocated: Mutex::new(BTreeSet::new()),
        }
    }

    /// The range this pool allocates from
    pub fn range(&self) -> McastRange {
        self.range
    }

    /// Allocates the lowest free address in the range
    ///
    /// Returns [`PoolError::Exhausted`] when every address is taken.
    pub fn allocate(&self) -> Result<Ipv4Addr, PoolError> {
        let mut allocated = self.lock();
        // The set holds only in-range addresses in ascending order, so the
        // first gap between the range start and the set is the lowest free
        // address.
        let mut candidate = u32::from(self.range.start());
        for addr in allocated.iter() {
            if u32::from(*addr) == candidate {
                candidate += 1;
            } else {
                break;
            }
        }
        if candidate > u32::from(self.range.end()) {
            return Err(PoolError::Exhausted);
        }
        let addr = Ipv4Addr::from(candidate);
        allocated.insert(addr);
        tracing::debug!(addr = %addr, "Multicast address allocated");
        Ok(addr)
    }

    /// Releases a previously allocated address back into the pool
    ///
    /// Returns [`PoolError::NotAllocated`] if the address is not currently
    /// handed out; the pool state is unchanged in that case.
    pub fn release(&self, addr: Ipv4Addr) -> Result<(), PoolError> {
        let mut allocated = self.lock();
        if !allocated.remove(&addr) {
            return Err(PoolError::NotAllocated(addr));
        }
        tracing::debug!(addr = %addr, "Multicast address released");
        Ok(())
    }

    /// Returns true when the address lies inside the pool's range
    ///
    /// Membership is about the range, not about allocation state.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.range.contains(addr)
    }

    /// Returns true when the address is currently allocated
    pub fn is_allocated(&self, addr: Ipv4Addr) -> bool {
        self.lock().contains(&addr)
    }

    /// Current occupancy snapshot
    pub fn stats(&self) -> PoolStats {
        let allocated = self.lock().len() as u64;
        let capacity = self.range.capacity();
        PoolStats {
            capacity,
            allocated,
            free: capacity - allocated,
        }
    }

    // The set stays consistent even if a holder panicked; recover the guard.
    fn lock(&self) -> MutexGuard<'_, BTreeSet<Ipv4Addr>> {
        self.allocated.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn addr(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    fn pool(start: &str, end: &str) -> McastPool {
        McastPool::new(McastRange::new(addr(start), addr(end)).unwrap())
    }

    #[test]
    fn test_allocate_ascending_until_exhausted() {
        let pool = pool("239.255.0.1", "239.255.0.3");

        assert_eq!(pool.allocate().unwrap(), addr("239.255.0.1"));
        assert_eq!(pool.allocate().unwrap(), addr("239.255.0.2"));
        assert_eq!(pool.allocate().unwrap(), addr("239.255.0.3"));
        assert!(matches!(pool.allocate(), Err(PoolError::Exhausted)));
    }

    #[test]
    fn test_release_makes_address_lowest_free() {
        let pool = pool("239.255.0.1", "239.255.0.3");
        pool.allocate().unwrap();
        let second = pool.allocate().unwrap();
        pool.allocate().unwrap();

        pool.release(second).unwrap();
        assert_eq!(pool.allocate().unwrap(), second);
        assert!(matches!(pool.allocate(), Err(PoolError::Exhausted)));
    }

    #[test]
    fn test_release_unallocated_is_rejected() {
        let pool = pool("239.255.0.1", "239.255.0.3");
        pool.allocate().unwrap();

        let result = pool.release(addr("239.255.0.2"));
        assert!(matches!(result, Err(PoolError::NotAllocated(a)) if a == addr("239.255.0.2")));

        // Out-of-range addresses are never allocated either.
        let result = pool.release(addr("10.0.0.1"));
        assert!(matches!(result, Err(PoolError::NotAllocated(_))));

        // The failed releases must not have disturbed the pool.
        assert_eq!(pool.allocate().unwrap(), addr("239.255.0.2"));
    }

    #[test]
    fn test_allocate_crosses_octet_boundary() {
        let pool = pool("239.255.0.254", "239.255.1.1");

        assert_eq!(pool.allocate().unwrap(), addr("239.255.0.254"));
        assert_eq!(pool.allocate().unwrap(), addr("239.255.0.255"));
        assert_eq!(pool.allocate().unwrap(), addr("239.255.1.0"));
        assert_eq!(pool.allocate().unwrap(), addr("239.255.1.1"));
        assert!(matches!(pool.allocate(), Err(PoolError::Exhausted)));
    }

    #[test]
    fn test_contains_is_range_membership() {
        let pool = pool("239.255.0.1", "239.255.0.3");
        assert!(pool.contains(addr("239.255.0.2")));
        assert!(!pool.contains(addr("239.255.0.4")));

        // Unallocated in-range addresses are still contained.
        assert!(!pool.is_allocated(addr("239.255.0.2")));
        let a = pool.allocate().unwrap();
        assert!(pool.is_allocated(a));
    }

    #[test]
    fn test_stats_track_occupancy() {
        let pool = pool("239.255.0.1", "239.255.0.4");
        assert_eq!(
            pool.stats(),
            PoolStats {
                capacity: 4,
                allocated: 0,
                free: 4
            }
        );

        let a = pool.allocate().unwrap();
        pool.allocate().unwrap();
        assert_eq!(pool.stats().allocated, 2);
        assert_eq!(pool.stats().free, 2);

        pool.release(a).unwrap();
        assert_eq!(pool.stats().allocated, 1);
        assert_eq!(pool.stats().capacity, 4);
    }

    #[test]
    fn test_same_operations_same_assignment() {
        let run = || {
            let pool = pool("239.255.0.1", "239.255.0.10");
            let mut out = Vec::new();
            let a = pool.allocate().unwrap();
            let b = pool.allocate().unwrap();
            out.push(pool.allocate().unwrap());
            pool.release(a).unwrap();
            pool.release(b).unwrap();
            out.push(pool.allocate().unwrap());
            out.push(pool.allocate().unwrap());
            out
        };
        assert_eq!(run(), run());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_allocations_are_unique() {
        let pool = Arc::new(pool("239.255.0.1", "239.255.0.64"));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let pool = Arc::clone(&pool);
            handles.push(tokio::spawn(async move {
                let mut got = Vec::new();
                for _ in 0..8 {
                    got.push(pool.allocate().unwrap());
                }
                got
            }));
        }

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }

        all.sort();
        all.dedup();
        assert_eq!(all.len(), 64);
        assert!(all.iter().all(|a| pool.contains(*a)));
        assert!(matches!(pool.allocate(), Err(PoolError::Exhausted)));
    }
}
