// ─────────────────────────────────────────────────────────────────
// Agent client — invokes a validator's external checking agent
// ─────────────────────────────────────────────────────────────────
// POST {"url": target} to the validator's configured agent with a
// bearer token. Any transport or decode failure maps to a recorded
// "down" observation (CheckOutcome::transport_failure), never to a
// submission error — an unreachable site is a billable result.
// ─────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tether_core::CheckOutcome;
use tracing::warn;

#[derive(Serialize)]
struct AgentRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct AgentResponse {
    is_up: bool,
    latency_ms: Option<u32>,
    region: Option<String>,
}

#[derive(Clone)]
pub struct AgentClient {
    http: reqwest::Client,
}

impl AgentClient {
    pub fn new(timeout_secs: u64) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
        Ok(Self { http })
    }

    /// One check. Never returns an error: failures become a down observation.
    pub async fn check(&self, agent_url: &str, auth_token: &str, target_url: &str) -> CheckOutcome {
        let response = self
            .http
            .post(agent_url)
            .bearer_auth(auth_token)
            .json(&AgentRequest { url: target_url })
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(agent = agent_url, error = %e, "agent unreachable");
                return CheckOutcome::transport_failure();
            }
        };

        if !response.status().is_success() {
            warn!(agent = agent_url, status = %response.status(), "agent returned error status");
            return CheckOutcome::transport_failure();
        }

        match response.json::<AgentResponse>().await {
            Ok(body) => CheckOutcome {
                is_up: body.is_up,
                latency_ms: body.latency_ms,
                region: body.region,
            },
            Err(e) => {
                warn!(agent = agent_url, error = %e, "agent response not decodable");
                CheckOutcome::transport_failure()
            }
        }
    }
}
