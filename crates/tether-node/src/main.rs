// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// WEBTETHER - NODE BINARY
//
// Usage: tether-node [config.toml]
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tether_core::{AgentConfig, Store};
use tether_node::agent::AgentClient;
use tether_node::cache::ProfileCache;
use tether_node::config::NodeConfig;
use tether_node::{api, now_secs, safe_lock};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// A couple of users and sites so a fresh dev node has something to show.
fn seed_demo(store: &mut Store) {
    let owner = store.add_user("demo-owner", AgentConfig::default());
    let validator = store.add_user(
        "demo-validator",
        AgentConfig {
            agent_url: "http://127.0.0.1:8787/check".to_string(),
            auth_token: "demo-token".to_string(),
        },
    );
    let now = now_secs();
    let _ = store.add_website(owner, "https://example.com", Some("demo".into()), now);
    let _ = store.add_website(owner, "https://httpbin.org", Some("tools".into()), now);
    info!(owner, validator, "seeded demo data");
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let config_path: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "node.toml".to_string())
        .into();
    let config = NodeConfig::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone())),
        )
        .init();

    let mut store = Store::new();
    if config.seed_demo {
        seed_demo(&mut store);
    }
    let store = Arc::new(Mutex::new(store));
    let agent = AgentClient::new(config.agent_timeout_secs)?;

    // The cache is never authoritative: the store wins on any mismatch, and
    // a stale or corrupt file is simply rebuilt.
    if let Some(cache_path) = &config.profile_cache {
        let mut cache = ProfileCache::load(cache_path);
        match &cache.user {
            Some(cached) => {
                let guard = safe_lock(&store);
                match guard.user(cached.uid) {
                    Some(current) => {
                        info!(uid = current.uid, name = %current.name, "restored cached profile");
                        cache.user = Some(current.clone());
                    }
                    None => cache = ProfileCache::default(),
                }
            }
            None => {
                let guard = safe_lock(&store);
                cache.user = guard.users.values().next().cloned();
            }
        }
        if let Err(e) = cache.save(cache_path) {
            tracing::warn!(error = %e, "could not persist profile cache");
        }
    }

    let routes = api::routes(store, agent, config.dedup_window_secs);
    info!(port = config.listen_port, "tether-node listening");
    warp::serve(routes)
        .run(([0, 0, 0, 0], config.listen_port))
        .await;
    Ok(())
}
