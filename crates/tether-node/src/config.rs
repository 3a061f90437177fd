// ─────────────────────────────────────────────────────────────────
// Node configuration (TOML)
// ─────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};
use std::path::Path;
use tether_core::DEFAULT_DEDUP_WINDOW_SECS;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct NodeConfig {
    pub listen_port: u16,
    /// Timeout for one call to a validator's checking agent
    pub agent_timeout_secs: u64,
    /// Re-ping cooldown per (validator, website) pair
    pub dedup_window_secs: u64,
    /// tracing EnvFilter directive, e.g. "info" or "tether_node=debug"
    pub log_filter: String,
    /// Seed a couple of demo users/websites at startup (dev convenience)
    pub seed_demo: bool,
    /// Where the non-authoritative signed-in-profile cache lives
    pub profile_cache: Option<std::path::PathBuf>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_port: 5000,
            agent_timeout_secs: 15,
            dedup_window_secs: DEFAULT_DEDUP_WINDOW_SECS,
            log_filter: "info".to_string(),
            seed_demo: false,
            profile_cache: None,
        }
    }
}

impl NodeConfig {
    /// Load from a TOML file; a missing file yields the defaults, a present
    /// but malformed file is an error (silent fallback would hide typos).
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        toml::from_str(&raw).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }
}
