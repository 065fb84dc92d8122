//! Multicast pool walkthrough
//!
//! Run with: cargo run --example address_pool
//!
//! Allocates a small pool to exhaustion, releases an address in the
//! middle, and shows that the freed address is the next one handed out.

use shardseed::pool::{McastPool, McastRange, PoolError};

fn main() -> shardseed::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let range = McastRange::new("239.255.0.1".parse().unwrap(), "239.255.0.4".parse().unwrap())?;
    let pool = McastPool::new(range);
    println!("pool over {range}");

    let mut held = Vec::new();
    loop {
        match pool.allocate() {
            Ok(addr) => {
                println!("allocated {addr}");
                held.push(addr);
            }
            Err(PoolError::Exhausted) => {
                println!("pool exhausted after {} addresses", held.len());
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    let freed = held[1];
    pool.release(freed)?;
    println!("released {freed}");
    println!("next allocation: {}", pool.allocate()?);

    let stats = pool.stats();
    println!(
        "{} allocated, {} free of {}",
        stats.allocated, stats.free, stats.capacity
    );
    Ok(())
}
