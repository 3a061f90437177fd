// ─────────────────────────────────────────────────────────────────
// Submission orchestration
// ─────────────────────────────────────────────────────────────────
// Validation and code reservation happen under the store lock; the
// agent call runs without it; settlement re-takes it. One client's
// submissions are serialized by the caller disabling its submit
// action, so the lock mainly narrows the cross-session race the core
// documents (two sessions of the same validator passing dedup
// concurrently).
// ─────────────────────────────────────────────────────────────────

use crate::agent::AgentClient;
use crate::{now_secs, safe_lock, SharedStore};
use tether_core::{submit, PingError, PingRequest, SettledPing, SubmissionState};
use tracing::{debug, info};

pub async fn submit_ping(
    store: &SharedStore,
    agent: &AgentClient,
    request: PingRequest,
    window_secs: u64,
) -> Result<SettledPing, PingError> {
    debug!(
        uid = request.validator_uid,
        wid = request.wid,
        state = %SubmissionState::Validating,
        "ping submission started"
    );

    let reserved = {
        let mut guard = safe_lock(store);
        submit::begin(&mut guard, &request, now_secs(), window_secs)?
    };
    debug!(tx = %reserved.reservation.tx_hash, state = %SubmissionState::Checking, "code reserved, invoking agent");

    let outcome = agent
        .check(&reserved.agent_url, &reserved.auth_token, &request.url)
        .await;

    debug!(is_up = outcome.is_up, state = %SubmissionState::Recording, "check complete");
    let settled = {
        let mut guard = safe_lock(store);
        submit::settle(&mut guard, reserved, outcome, now_secs())
    };

    info!(
        pid = settled.ping.pid,
        wid = settled.ping.wid,
        is_up = settled.ping.is_up,
        reward = %tether_core::format_eth(settled.reward_ueth),
        state = %SubmissionState::Settled,
        "ping recorded"
    );
    Ok(settled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tether_core::{AgentConfig, Store, STARTING_BALANCE_UETH};

    fn shared_store_with_target(agent_url: String) -> (SharedStore, u64, u64) {
        let mut store = Store::new();
        let owner = store.add_user("owner", AgentConfig::default());
        let validator = store.add_user(
            "validator",
            AgentConfig {
                agent_url,
                auth_token: "tok".to_string(),
            },
        );
        let wid = store
            .add_website(owner, "https://example.com", None, 0)
            .unwrap()
            .wid;
        (Arc::new(Mutex::new(store)), validator, wid)
    }

    #[tokio::test]
    async fn test_unreachable_agent_settles_as_down() {
        // Agent endpoint refuses connections: the submission must still
        // settle with is_up=false and pay the fixed reward.
        let (store, validator, wid) =
            shared_store_with_target("http://127.0.0.1:1/check".to_string());
        let agent = AgentClient::new(1).unwrap();

        let settled = submit_ping(
            &store,
            &agent,
            PingRequest {
                validator_uid: validator,
                wid,
                url: "https://example.com".to_string(),
                tx_hash: "TX-001".to_string(),
            },
            3600,
        )
        .await
        .unwrap();

        assert!(!settled.ping.is_up);
        assert_eq!(settled.ping.latency_ms, None);
        let guard = safe_lock(&store);
        assert_eq!(
            guard.ledger.balance_of(validator),
            STARTING_BALANCE_UETH + settled.reward_ueth
        );
    }

    #[tokio::test]
    async fn test_validation_failure_short_circuits_agent_call() {
        let (store, validator, wid) = shared_store_with_target("http://127.0.0.1:1".to_string());
        let agent = AgentClient::new(1).unwrap();

        let err = submit_ping(
            &store,
            &agent,
            PingRequest {
                validator_uid: validator,
                wid,
                url: "https://example.com".to_string(),
                tx_hash: "TX-999".to_string(),
            },
            3600,
        )
        .await
        .unwrap_err();
        assert_eq!(err, PingError::InvalidCode("TX-999".to_string()));

        let guard = safe_lock(&store);
        assert!(guard.pings.is_empty());
    }
}
