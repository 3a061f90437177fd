// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// WEBTETHER - CORE MODULE
//
// Domain primitives for the uptime-monitoring reward economy: Website, Ping,
// LedgerEntry, the transaction-code pool and the services that decide whether
// a validator may submit a ping and what it earns.
// All financial arithmetic uses i128 micro-ETH units (no floating-point).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod agent;
pub mod dedup;
pub mod ledger;
pub mod stats;
pub mod submit;
pub mod tx_codes;

pub use agent::{agent_status, has_valid_agent, AgentStatus, MissingField};
pub use ledger::{EntryKind, LedgerEntry, RewardLedger};
pub use stats::{owner_stats, validator_stats, OwnerStats, ValidatorStats};
pub use submit::{
    begin, settle, CheckOutcome, PingError, PingRequest, ReservedSubmission, SettledPing,
    SubmissionState,
};
pub use tx_codes::{CodeError, Reservation, TransactionCodeRegistry};

/// 1 ETH = 1,000,000 µETH. All amounts are simulated — no real chain exists.
pub const UETH_PER_ETH: i128 = 1_000_000;

/// Fixed reward per recorded ping: 0.0002 ETH.
/// Paid regardless of `is_up` — validators are compensated for the act of
/// checking, so a correctly reported outage earns the same as a healthy hit.
pub const PING_REWARD_UETH: i128 = 200;

/// One-time fee debited from an owner when a website is registered (0.0005 ETH).
pub const WEBSITE_FEE_UETH: i128 = 500;

/// Every wallet starts with 1.0 ETH of simulated balance.
pub const STARTING_BALANCE_UETH: i128 = UETH_PER_ETH;

/// A validator may not re-ping the same website within this window.
pub const DEFAULT_DEDUP_WINDOW_SECS: u64 = 3600;

/// Region label recorded when the agent does not report one.
pub const DEFAULT_REGION: &str = "cloudflare-edge";

/// Format a signed µETH amount as a 4-decimal ETH string (e.g. "0.9998").
pub fn format_eth(amount_ueth: i128) -> String {
    let sign = if amount_ueth < 0 { "-" } else { "" };
    let abs = amount_ueth.unsigned_abs();
    let whole = abs / UETH_PER_ETH as u128;
    // 4 decimal places: 1 display step = 100 µETH
    let frac = (abs % UETH_PER_ETH as u128) / 100;
    format!("{}{}.{:04}", sign, whole, frac)
}

/// Last observed state of a monitored website.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WebsiteStatus {
    /// No ping recorded yet
    Unknown,
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Website {
    pub wid: u64,
    /// Owning user
    pub uid: u64,
    pub url: String,
    pub category: Option<String>,
    pub status: WebsiteStatus,
    pub created_at: u64,
}

/// One check of a website's reachability. Append-only: a Ping is a fact and
/// is never mutated after creation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Ping {
    pub pid: u64,
    pub wid: u64,
    /// Validator that performed the check; None for automated pings
    pub uid: Option<u64>,
    pub is_up: bool,
    pub latency_ms: Option<u32>,
    pub region: String,
    pub tx_hash: String,
    pub reward_ueth: i128,
    pub timestamp: u64,
}

/// Outbound checking agent configured per validator. Both kinds of agent
/// (Cloudflare worker, Replit agent) share this shape and are interchangeable.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AgentConfig {
    #[serde(rename = "replit_agent_url")]
    pub agent_url: String,
    #[serde(rename = "replit_agent_token")]
    pub auth_token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub uid: u64,
    pub name: String,
    #[serde(flatten)]
    pub agent: AgentConfig,
}

/// Explicit in-memory store passed by reference to the core services.
///
/// Replaces the ad-hoc global lookups of the original dashboard: every read
/// and write goes through this one object, so the services stay pure
/// functions of `(store, input)` and are testable without any I/O.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Store {
    pub users: BTreeMap<u64, User>,
    pub websites: BTreeMap<u64, Website>,
    pub pings: Vec<Ping>,
    pub codes: TransactionCodeRegistry,
    pub ledger: RewardLedger,
    next_uid: u64,
    next_wid: u64,
    next_pid: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            users: BTreeMap::new(),
            websites: BTreeMap::new(),
            pings: Vec::new(),
            codes: TransactionCodeRegistry::new(),
            ledger: RewardLedger::new(),
            next_uid: 1,
            next_wid: 1,
            next_pid: 1,
        }
    }

    pub fn add_user(&mut self, name: &str, agent: AgentConfig) -> u64 {
        let uid = self.next_uid;
        self.next_uid += 1;
        self.users.insert(
            uid,
            User {
                uid,
                name: name.to_string(),
                agent,
            },
        );
        uid
    }

    /// Register a website for monitoring and debit the registration fee from
    /// the owner's ledger. The fee entry uses the wid as its reference code.
    pub fn add_website(
        &mut self,
        uid: u64,
        url: &str,
        category: Option<String>,
        now: u64,
    ) -> Result<&Website, String> {
        if !self.users.contains_key(&uid) {
            return Err(format!("User {} not found", uid));
        }
        let wid = self.next_wid;
        self.next_wid += 1;
        self.websites.insert(
            wid,
            Website {
                wid,
                uid,
                url: url.to_string(),
                category,
                status: WebsiteStatus::Unknown,
                created_at: now,
            },
        );
        self.ledger.append(LedgerEntry {
            kind: EntryKind::WebsiteFee,
            amount_ueth: -WEBSITE_FEE_UETH,
            tx_hash: format!("SITE-{:03}", wid),
            timestamp: now,
            uid,
        });
        Ok(&self.websites[&wid])
    }

    pub fn user(&self, uid: u64) -> Option<&User> {
        self.users.get(&uid)
    }

    pub fn website(&self, wid: u64) -> Option<&Website> {
        self.websites.get(&wid)
    }

    /// Append a ping and update the target website's last-known status.
    /// Internal: callers go through `submit::settle`, which also records the
    /// reward ledger entry.
    pub(crate) fn record_ping(&mut self, ping: Ping) {
        if let Some(site) = self.websites.get_mut(&ping.wid) {
            site.status = if ping.is_up {
                WebsiteStatus::Up
            } else {
                WebsiteStatus::Down
            };
        }
        self.pings.push(ping);
    }

    pub(crate) fn next_pid(&mut self) -> u64 {
        let pid = self.next_pid;
        self.next_pid += 1;
        pid
    }
}

/// Deterministic receipt hash for a settled submission: SHA3-256 over the
/// transaction code, target, validator and timestamp, hex-encoded.
pub fn receipt_hash(tx_hash: &str, wid: u64, uid: u64, timestamp: u64) -> String {
    use sha3::{Digest, Sha3_256};
    let mut hasher = Sha3_256::new();
    hasher.update(tx_hash.as_bytes());
    hasher.update(wid.to_le_bytes());
    hasher.update(uid.to_le_bytes());
    hasher.update(timestamp.to_le_bytes());
    hex::encode(hasher.finalize())
}
