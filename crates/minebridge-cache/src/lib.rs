//! Expiring containers for Minebridge.
//!
//! [`TimedSet`] and [`TimedMap`] remember each entry together with the
//! instant it was written. An entry is visible while
//! `now - written < ttl` and invisible afterwards:
//!
//! - Reads evict lazily: a `contains`/`get` that finds a stale entry
//!   removes it and answers "absent".
//! - [`sweep`](TimedSet::sweep) purges every stale entry at once, which
//!   bounds memory for keys that are written and never read again.
//! - Re-inserting an entry restarts its window from the new write.
//!
//! Time comes from `tokio::time::Instant`, so tests can drive expiry with
//! a paused clock.
//!
//! Neither container synchronizes internally; the owner wraps each one in
//! its own lock.

mod map;
mod set;

pub use map::TimedMap;
pub use set::TimedSet;
