// ─────────────────────────────────────────────────────────────────
// Stats Aggregator — pure reducers over websites and ping history
// ─────────────────────────────────────────────────────────────────
// Conventions (callers must not special-case these):
//   uptime on zero pings     = 100.0  (no data is not an alarm)
//   success rate on zero     = 0.0
//   avg latency on zero      = 0      (never NaN)
// Average latency counts only successful pings that reported one.
// ─────────────────────────────────────────────────────────────────

use crate::{Ping, Website, WebsiteStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OwnerStats {
    pub total_websites: u64,
    pub online_count: u64,
    pub uptime_percent: f64,
    pub avg_response_ms: u32,
    /// Total rewards paid out for checks against this owner's sites
    pub total_earnings_ueth: i128,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ValidatorStats {
    pub total_pings: u64,
    pub success_rate: f64,
    pub avg_response_ms: u32,
    pub total_earnings_ueth: i128,
}

fn avg_latency(pings: &[&Ping]) -> u32 {
    let latencies: Vec<u32> = pings
        .iter()
        .filter(|p| p.is_up)
        .filter_map(|p| p.latency_ms)
        .collect();
    if latencies.is_empty() {
        return 0;
    }
    (latencies.iter().map(|&l| l as u64).sum::<u64>() / latencies.len() as u64) as u32
}

/// Aggregate view for a website owner: joins the owner's websites with the
/// ping history of those sites.
pub fn owner_stats(uid: u64, websites: &BTreeMap<u64, Website>, pings: &[Ping]) -> OwnerStats {
    let owned: Vec<&Website> = websites.values().filter(|w| w.uid == uid).collect();
    let owned_wids: Vec<u64> = owned.iter().map(|w| w.wid).collect();
    let site_pings: Vec<&Ping> = pings.iter().filter(|p| owned_wids.contains(&p.wid)).collect();

    let total = site_pings.len() as u64;
    let up = site_pings.iter().filter(|p| p.is_up).count() as u64;
    let uptime_percent = if total == 0 {
        100.0
    } else {
        up as f64 / total as f64 * 100.0
    };

    OwnerStats {
        total_websites: owned.len() as u64,
        online_count: owned
            .iter()
            .filter(|w| w.status == WebsiteStatus::Up)
            .count() as u64,
        uptime_percent,
        avg_response_ms: avg_latency(&site_pings),
        total_earnings_ueth: site_pings.iter().map(|p| p.reward_ueth).sum(),
    }
}

/// Aggregate view for a validator: reduces the pings that validator produced.
pub fn validator_stats(uid: u64, pings: &[Ping]) -> ValidatorStats {
    let mine: Vec<&Ping> = pings.iter().filter(|p| p.uid == Some(uid)).collect();

    let total = mine.len() as u64;
    let up = mine.iter().filter(|p| p.is_up).count() as u64;
    let success_rate = if total == 0 {
        0.0
    } else {
        up as f64 / total as f64 * 100.0
    };

    ValidatorStats {
        total_pings: total,
        success_rate,
        avg_response_ms: avg_latency(&mine),
        total_earnings_ueth: mine.iter().map(|p| p.reward_ueth).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AgentConfig, Store, DEFAULT_REGION, PING_REWARD_UETH};

    fn ping(uid: Option<u64>, wid: u64, is_up: bool, latency_ms: Option<u32>, ts: u64) -> Ping {
        Ping {
            pid: 0,
            wid,
            uid,
            is_up,
            latency_ms,
            region: DEFAULT_REGION.to_string(),
            tx_hash: "TX-001".to_string(),
            reward_ueth: PING_REWARD_UETH,
            timestamp: ts,
        }
    }

    #[test]
    fn test_validator_stats_empty_history() {
        let stats = validator_stats(1, &[]);
        assert_eq!(
            stats,
            ValidatorStats {
                total_pings: 0,
                success_rate: 0.0,
                avg_response_ms: 0,
                total_earnings_ueth: 0,
            }
        );
    }

    #[test]
    fn test_validator_stats_mixed_history() {
        let history = vec![
            ping(Some(1), 7, true, Some(100), 1),
            ping(Some(1), 8, true, Some(200), 2),
            ping(Some(1), 9, false, None, 3),
            // Another validator's ping is excluded
            ping(Some(2), 7, true, Some(999), 4),
        ];
        let stats = validator_stats(1, &history);
        assert_eq!(stats.total_pings, 3);
        assert!((stats.success_rate - 200.0 / 3.0).abs() < 1e-9);
        // Only the two successful pings with latency count: (100+200)/2
        assert_eq!(stats.avg_response_ms, 150);
        assert_eq!(stats.total_earnings_ueth, 3 * PING_REWARD_UETH);
    }

    #[test]
    fn test_avg_latency_ignores_down_pings() {
        // A down ping that somehow reported latency must not skew the average
        let history = vec![
            ping(Some(1), 7, true, Some(100), 1),
            ping(Some(1), 8, false, Some(5000), 2),
        ];
        assert_eq!(validator_stats(1, &history).avg_response_ms, 100);
    }

    #[test]
    fn test_all_failed_pings_report_zero_latency() {
        let history = vec![ping(Some(1), 7, false, None, 1)];
        let stats = validator_stats(1, &history);
        assert_eq!(stats.avg_response_ms, 0);
        assert_eq!(stats.success_rate, 0.0);
        // Failed checks still earned the fixed reward
        assert_eq!(stats.total_earnings_ueth, PING_REWARD_UETH);
    }

    #[test]
    fn test_owner_stats_no_pings_is_100_uptime() {
        let mut store = Store::new();
        let uid = store.add_user("owner", AgentConfig::default());
        store.add_website(uid, "https://a.example", None, 0).unwrap();

        let stats = owner_stats(uid, &store.websites, &[]);
        assert_eq!(stats.total_websites, 1);
        assert_eq!(stats.online_count, 0);
        assert_eq!(stats.uptime_percent, 100.0);
        assert_eq!(stats.avg_response_ms, 0);
    }

    #[test]
    fn test_owner_stats_joins_on_ownership() {
        let mut store = Store::new();
        let owner = store.add_user("owner", AgentConfig::default());
        let other = store.add_user("other", AgentConfig::default());
        let wid = store
            .add_website(owner, "https://a.example", None, 0)
            .unwrap()
            .wid;
        let other_wid = store
            .add_website(other, "https://b.example", None, 0)
            .unwrap()
            .wid;

        let history = vec![
            ping(Some(other), wid, true, Some(120), 10),
            ping(Some(other), wid, false, None, 20),
            ping(Some(owner), other_wid, true, Some(80), 30),
        ];
        // Mark the site's last-known status through the store path
        store.record_ping(history[0].clone());

        let stats = owner_stats(owner, &store.websites, &history);
        assert_eq!(stats.total_websites, 1);
        assert_eq!(stats.online_count, 1);
        assert_eq!(stats.uptime_percent, 50.0);
        assert_eq!(stats.avg_response_ms, 120);
        // Both pings against the owner's site, not the owner's own ping
        assert_eq!(stats.total_earnings_ueth, 2 * PING_REWARD_UETH);
    }
}
