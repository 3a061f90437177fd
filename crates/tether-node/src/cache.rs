// ─────────────────────────────────────────────────────────────────
// Local profile cache
// ─────────────────────────────────────────────────────────────────
// Non-authoritative copy of the signed-in user and their auth token.
// May be discarded at any time and rebuilt from the store; a missing
// or corrupt file silently yields an empty cache.
// ─────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};
use std::path::Path;
use tether_core::User;
use tracing::debug;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ProfileCache {
    pub user: Option<User>,
    pub auth_token: Option<String>,
}

impl ProfileCache {
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(cache) => cache,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "discarding corrupt profile cache");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to encode profile cache: {}", e))?;
        std::fs::write(path, raw)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::AgentConfig;

    #[test]
    fn test_missing_file_is_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ProfileCache::load(&dir.path().join("absent.json"));
        assert!(cache.user.is_none());
        assert!(cache.auth_token.is_none());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");

        let cache = ProfileCache {
            user: Some(User {
                uid: 7,
                name: "validator".to_string(),
                agent: AgentConfig {
                    agent_url: "https://agent.example".to_string(),
                    auth_token: "tok".to_string(),
                },
            }),
            auth_token: Some("jwt".to_string()),
        };
        cache.save(&path).unwrap();

        let loaded = ProfileCache::load(&path);
        assert_eq!(loaded.user.as_ref().unwrap().uid, 7);
        assert_eq!(loaded.auth_token.as_deref(), Some("jwt"));
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, "{not json").unwrap();
        let cache = ProfileCache::load(&path);
        assert!(cache.user.is_none());
    }
}
