// ─────────────────────────────────────────────────────────────────
// Agent Eligibility — precondition check for originating pings
// ─────────────────────────────────────────────────────────────────
// A validator needs an outbound checking agent (URL) plus its auth
// token before any manual ping is accepted. Reported per-field so the
// caller can tell the user exactly what to configure.
// ─────────────────────────────────────────────────────────────────

use crate::AgentConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Url,
    Token,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingField::Url => write!(f, "URL"),
            MissingField::Token => write!(f, "Token"),
        }
    }
}

/// Outcome of the eligibility check. `message` is ready for direct display.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AgentStatus {
    pub configured: bool,
    pub missing: Vec<MissingField>,
    pub message: String,
}

/// Pure function of the agent record: both fields must be non-blank after
/// trimming. No retries, no I/O — invoked synchronously before every
/// submission.
pub fn agent_status(agent: &AgentConfig) -> AgentStatus {
    let mut missing = Vec::new();
    if agent.agent_url.trim().is_empty() {
        missing.push(MissingField::Url);
    }
    if agent.auth_token.trim().is_empty() {
        missing.push(MissingField::Token);
    }

    if missing.is_empty() {
        AgentStatus {
            configured: true,
            missing,
            message: "Agent is properly configured".to_string(),
        }
    } else {
        let list = missing
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        AgentStatus {
            configured: false,
            missing,
            message: format!("Missing: {}", list),
        }
    }
}

pub fn has_valid_agent(agent: &AgentConfig) -> bool {
    agent_status(agent).configured
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(url: &str, token: &str) -> AgentConfig {
        AgentConfig {
            agent_url: url.to_string(),
            auth_token: token.to_string(),
        }
    }

    #[test]
    fn test_fully_configured() {
        let status = agent_status(&agent("https://agent.example", "tok"));
        assert!(status.configured);
        assert!(status.missing.is_empty());
    }

    #[test]
    fn test_missing_url_only() {
        let status = agent_status(&agent("", "abc"));
        assert!(!status.configured);
        assert_eq!(status.missing, vec![MissingField::Url]);
        assert_eq!(status.message, "Missing: URL");
    }

    #[test]
    fn test_missing_token_only() {
        let status = agent_status(&agent("https://agent.example", "   "));
        assert!(!status.configured);
        assert_eq!(status.missing, vec![MissingField::Token]);
    }

    #[test]
    fn test_missing_both() {
        let status = agent_status(&agent("  ", ""));
        assert_eq!(status.missing, vec![MissingField::Url, MissingField::Token]);
        assert_eq!(status.message, "Missing: URL, Token");
        assert!(!has_valid_agent(&agent("", "")));
    }

    #[test]
    fn test_whitespace_is_blank() {
        // Trimmed-blank fields must not count as configured
        assert!(!has_valid_agent(&agent(" \t", "tok")));
        assert!(has_valid_agent(&agent("https://a", "t")));
    }
}
