// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// WEBTETHER - NODE
//
// HTTP service around tether-core: warp API, reqwest agent client, TOML
// configuration and a non-authoritative local profile cache.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod agent;
pub mod api;
pub mod cache;
pub mod config;
pub mod submit;

use std::sync::{Arc, Mutex, MutexGuard};

pub type SharedStore = Arc<Mutex<tether_core::Store>>;

/// Recover from a poisoned mutex instead of panicking. The store holds only
/// plain data, so a panicked writer cannot leave it logically torn.
pub fn safe_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Unix seconds from the system clock.
pub fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
