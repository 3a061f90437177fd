// ─────────────────────────────────────────────────────────────────
// Ping Submission Service
// ─────────────────────────────────────────────────────────────────
// One submission walks: Idle → Validating → Reserving → Checking →
// Recording → Settled. Validating and Reserving failures leave no
// side effects (besides a completed reservation, which is always
// permanent). A failed external check is NOT a submission failure:
// "the site could not be confirmed up" is itself a billable result,
// so Checking always proceeds to Recording.
//
// The external check itself is a collaborator outside this crate.
// `begin` performs all validation and the code reservation; the
// caller runs the check and hands the outcome to `settle`.
// ─────────────────────────────────────────────────────────────────

use crate::{
    agent_status, dedup, receipt_hash, EntryKind, LedgerEntry, MissingField, Ping, Reservation,
    Store, DEFAULT_REGION, PING_REWARD_UETH,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Reserving,
    Checking,
    Recording,
    Settled,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Validating => "validating",
            SubmissionState::Reserving => "reserving",
            SubmissionState::Checking => "checking",
            SubmissionState::Recording => "recording",
            SubmissionState::Settled => "settled",
        };
        write!(f, "{}", s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PingRequest {
    pub validator_uid: u64,
    pub wid: u64,
    pub url: String,
    pub tx_hash: String,
}

/// Validation failures. All of these are recoverable locally: no side
/// effects have occurred and the caller should re-prompt the user.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PingError {
    #[error("transaction code {0} is unknown or has already been used")]
    InvalidCode(String),
    #[error("invalid ping target: {0}")]
    InvalidTarget(String),
    #[error("validator {0} not found")]
    UnknownValidator(u64),
    #[error("no checking agent configured: missing {}", format_missing(.0))]
    AgentNotConfigured(Vec<MissingField>),
    #[error("you cannot ping your own site")]
    OwnSite,
    #[error("this site was already checked by you within the last hour")]
    AlreadyChecked,
}

fn format_missing(missing: &[MissingField]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A validated submission holding its consumed transaction code and the
/// agent endpoint the caller must invoke. Consumed by `settle`.
#[derive(Debug)]
pub struct ReservedSubmission {
    pub request: PingRequest,
    pub reservation: Reservation,
    pub agent_url: String,
    pub auth_token: String,
}

/// What the external check reported (or failed to report).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub is_up: bool,
    pub latency_ms: Option<u32>,
    pub region: Option<String>,
}

impl CheckOutcome {
    /// Agent unreachable / timed out / returned garbage. Recorded as a down
    /// observation rather than surfaced as an error.
    pub fn transport_failure() -> Self {
        Self {
            is_up: false,
            latency_ms: None,
            region: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SettledPing {
    pub ping: Ping,
    pub reward_ueth: i128,
    /// Deterministic stand-in for the on-chain receipt
    pub receipt: String,
}

/// Validating + Reserving. Fail-fast, first failure wins, in this order:
/// transaction code, target, validator/agent, ownership, dedup window.
/// On success the code is consumed before any external effect is attempted.
pub fn begin(
    store: &mut Store,
    request: &PingRequest,
    now: u64,
    window_secs: u64,
) -> Result<ReservedSubmission, PingError> {
    // 1. Code must be known and unconsumed
    if !store.codes.is_available(&request.tx_hash) {
        return Err(PingError::InvalidCode(request.tx_hash.clone()));
    }

    // 2. Target must exist and the URL must be a well-formed absolute http(s) URL
    let owner_uid = match store.website(request.wid) {
        Some(site) => site.uid,
        None => {
            return Err(PingError::InvalidTarget(format!(
                "website {} not found",
                request.wid
            )))
        }
    };
    match Url::parse(&request.url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
        _ => {
            return Err(PingError::InvalidTarget(format!(
                "'{}' is not an absolute http(s) URL",
                request.url
            )))
        }
    }

    // 3. Validator must exist and have a configured agent
    let user = store
        .user(request.validator_uid)
        .ok_or(PingError::UnknownValidator(request.validator_uid))?;
    let status = agent_status(&user.agent);
    if !status.configured {
        return Err(PingError::AgentNotConfigured(status.missing));
    }
    let agent_url = user.agent.agent_url.trim().to_string();
    let auth_token = user.agent.auth_token.trim().to_string();

    // 4. Owners may not ping their own sites
    if owner_uid == request.validator_uid {
        return Err(PingError::OwnSite);
    }

    // 5. Dedup window over the full ping history
    if !dedup::is_eligible_target(
        request.validator_uid,
        request.wid,
        &store.pings,
        now,
        window_secs,
    ) {
        return Err(PingError::AlreadyChecked);
    }

    // Reserve last: the consumed flag is set before the external check runs,
    // so the same code can never be double-spent by a concurrent submission.
    let reservation = store
        .codes
        .reserve(&request.tx_hash)
        .map_err(|_| PingError::InvalidCode(request.tx_hash.clone()))?;

    Ok(ReservedSubmission {
        request: request.clone(),
        reservation,
        agent_url,
        auth_token,
    })
}

/// Recording: construct the immutable Ping, credit the fixed reward and
/// update the target's last-known status. Cannot fail — by this point the
/// submission is committed regardless of what the check reported.
pub fn settle(
    store: &mut Store,
    reserved: ReservedSubmission,
    outcome: CheckOutcome,
    now: u64,
) -> SettledPing {
    let ReservedSubmission {
        request,
        reservation,
        ..
    } = reserved;

    let pid = store.next_pid();
    let ping = Ping {
        pid,
        wid: request.wid,
        uid: Some(request.validator_uid),
        is_up: outcome.is_up,
        latency_ms: outcome.latency_ms,
        region: outcome.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
        tx_hash: reservation.tx_hash,
        reward_ueth: PING_REWARD_UETH,
        timestamp: now,
    };

    store.ledger.append(LedgerEntry {
        kind: EntryKind::PingPayment,
        amount_ueth: PING_REWARD_UETH,
        tx_hash: ping.tx_hash.clone(),
        timestamp: now,
        uid: request.validator_uid,
    });

    let receipt = receipt_hash(&ping.tx_hash, ping.wid, request.validator_uid, now);
    store.record_ping(ping.clone());

    SettledPing {
        ping,
        reward_ueth: PING_REWARD_UETH,
        receipt,
    }
}
