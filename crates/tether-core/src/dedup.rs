// ─────────────────────────────────────────────────────────────────
// Ping Deduplication Window
// ─────────────────────────────────────────────────────────────────
// A validator may ping a given website at most once per window
// (default 1 hour). Pure filter over the full ping history — no
// incremental index. O(n) per check is acceptable at the history
// sizes this system anticipates; a production deployment would index
// pings by (validator, website) in a time-ordered structure.
// ─────────────────────────────────────────────────────────────────

use crate::{Ping, Website};
use std::collections::BTreeMap;

/// True if no ping by `validator` against `wid` exists within
/// `window_secs` before `now`. A ping at time `t` blocks the pair for
/// `t' in (t, t + window)`; at `t' >= t + window` the pair is eligible
/// again. Because this scans the live history, a just-appended ping is
/// immediately visible — there is no stale-read window.
pub fn is_eligible_target(
    validator: u64,
    wid: u64,
    pings: &[Ping],
    now: u64,
    window_secs: u64,
) -> bool {
    !pings.iter().any(|p| {
        p.uid == Some(validator) && p.wid == wid && now < p.timestamp.saturating_add(window_secs)
    })
}

/// Websites `validator` may ping right now: not their own, and not
/// already checked within the window.
pub fn available_targets<'a>(
    validator: u64,
    websites: &'a BTreeMap<u64, Website>,
    pings: &[Ping],
    now: u64,
    window_secs: u64,
) -> Vec<&'a Website> {
    websites
        .values()
        .filter(|w| w.uid != validator)
        .filter(|w| is_eligible_target(validator, w.wid, pings, now, window_secs))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AgentConfig, Store, DEFAULT_DEDUP_WINDOW_SECS, DEFAULT_REGION, PING_REWARD_UETH};

    fn ping(uid: Option<u64>, wid: u64, timestamp: u64) -> Ping {
        Ping {
            pid: 0,
            wid,
            uid,
            is_up: true,
            latency_ms: Some(50),
            region: DEFAULT_REGION.to_string(),
            tx_hash: "TX-001".to_string(),
            reward_ueth: PING_REWARD_UETH,
            timestamp,
        }
    }

    #[test]
    fn test_window_boundaries() {
        // Ping at t=0: ineligible at 30 min, eligible again at t >= 3600
        let history = vec![ping(Some(1), 7, 0)];
        assert!(!is_eligible_target(1, 7, &history, 1800, DEFAULT_DEDUP_WINDOW_SECS));
        assert!(!is_eligible_target(1, 7, &history, 3599, DEFAULT_DEDUP_WINDOW_SECS));
        assert!(is_eligible_target(1, 7, &history, 3600, DEFAULT_DEDUP_WINDOW_SECS));
        assert!(is_eligible_target(1, 7, &history, 3601, DEFAULT_DEDUP_WINDOW_SECS));
    }

    #[test]
    fn test_other_pair_does_not_block() {
        let history = vec![ping(Some(1), 7, 100)];
        // Different validator, same website
        assert!(is_eligible_target(2, 7, &history, 200, 3600));
        // Same validator, different website
        assert!(is_eligible_target(1, 8, &history, 200, 3600));
    }

    #[test]
    fn test_automated_pings_do_not_block() {
        // Pings with no validator attached never count against anyone
        let history = vec![ping(None, 7, 100)];
        assert!(is_eligible_target(1, 7, &history, 200, 3600));
    }

    #[test]
    fn test_empty_history_is_eligible() {
        assert!(is_eligible_target(1, 7, &[], 0, 3600));
    }

    #[test]
    fn test_available_targets_excludes_own_and_recent() {
        let mut store = Store::new();
        let owner = store.add_user("owner", AgentConfig::default());
        let validator = store.add_user("validator", AgentConfig::default());
        let own = store
            .add_website(validator, "https://mine.example", None, 0)
            .unwrap()
            .wid;
        let w1 = store
            .add_website(owner, "https://a.example", None, 0)
            .unwrap()
            .wid;
        let w2 = store
            .add_website(owner, "https://b.example", None, 0)
            .unwrap()
            .wid;

        let history = vec![ping(Some(validator), w1, 1000)];
        let targets = available_targets(validator, &store.websites, &history, 1500, 3600);
        let wids: Vec<u64> = targets.iter().map(|w| w.wid).collect();
        assert!(!wids.contains(&own), "own site must be excluded");
        assert!(!wids.contains(&w1), "recently pinged site must be excluded");
        assert!(wids.contains(&w2));
    }
}
