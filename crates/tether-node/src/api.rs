// ─────────────────────────────────────────────────────────────────
// HTTP API
// ─────────────────────────────────────────────────────────────────
// Thin presentation adapter over the core services. JSON field names
// (wid, uid, tx_hash, is_up, latency_ms, region, replit_agent_url,
// replit_agent_token) are kept compatible with the existing dashboard
// collaborators. Errors are {"error": msg} with a specific, actionable
// message — never a stack trace.
// ─────────────────────────────────────────────────────────────────

use crate::agent::AgentClient;
use crate::{now_secs, safe_lock, submit, SharedStore};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tether_core::{
    dedup, format_eth, owner_stats, validator_stats, PingError, PingRequest, UETH_PER_ETH,
};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Reply};

#[derive(Deserialize)]
pub struct ManualPingBody {
    pub uid: u64,
    pub wid: u64,
    pub url: String,
    pub tx_hash: String,
}

#[derive(Deserialize)]
pub struct CreateWebsiteBody {
    pub uid: u64,
    pub url: String,
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateAgentBody {
    pub replit_agent_url: Option<String>,
    pub replit_agent_token: Option<String>,
}

#[derive(Deserialize)]
struct UidQuery {
    uid: u64,
}

#[derive(Serialize)]
struct WalletTransaction {
    tx_hash: String,
    amount: String,
    timestamp: u64,
    status: &'static str,
    #[serde(rename = "type")]
    kind: tether_core::EntryKind,
}

fn error_reply(code: StatusCode, message: &str) -> Response {
    warp::reply::with_status(warp::reply::json(&json!({ "error": message })), code)
        .into_response()
}

/// Each validation failure keeps its HTTP status distinct so the dashboard
/// can pick the right presentation (re-prompt vs. settings link vs. cooldown).
fn ping_error_reply(err: &PingError) -> Response {
    let code = match err {
        PingError::InvalidCode(_) => StatusCode::CONFLICT,
        PingError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
        PingError::UnknownValidator(_) => StatusCode::NOT_FOUND,
        PingError::AgentNotConfigured(_) => StatusCode::BAD_REQUEST,
        PingError::OwnSite => StatusCode::FORBIDDEN,
        PingError::AlreadyChecked => StatusCode::CONFLICT,
    };
    error_reply(code, &err.to_string())
}

fn with_store(
    store: SharedStore,
) -> impl Filter<Extract = (SharedStore,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || store.clone())
}

async fn handle_manual_ping(
    body: ManualPingBody,
    store: SharedStore,
    agent: AgentClient,
    window_secs: u64,
) -> Result<Response, warp::Rejection> {
    let request = PingRequest {
        validator_uid: body.uid,
        wid: body.wid,
        url: body.url,
        tx_hash: body.tx_hash,
    };
    match submit::submit_ping(&store, &agent, request, window_secs).await {
        Ok(settled) => Ok(warp::reply::json(&json!({
            "status": "recorded",
            "ping": settled.ping,
            "result": {
                "is_up": settled.ping.is_up,
                "latency_ms": settled.ping.latency_ms,
                "region": settled.ping.region,
            },
            "onchain": {
                "tx_hash": settled.ping.tx_hash,
                "amount": format_eth(settled.reward_ueth),
                "receipt": settled.receipt,
                "simulated": true,
            },
        }))
        .into_response()),
        Err(err) => Ok(ping_error_reply(&err)),
    }
}

fn handle_wallet_balance(query: UidQuery, store: SharedStore) -> Response {
    let guard = safe_lock(&store);
    if guard.user(query.uid).is_none() {
        return error_reply(StatusCode::NOT_FOUND, "User not found");
    }
    let ledger = &guard.ledger;
    // Display clamps at zero; the ledger itself stays signed and auditable
    let balance = ledger.balance_of(query.uid).max(0);
    let total_pings = guard
        .pings
        .iter()
        .filter(|p| p.uid == Some(query.uid))
        .count();
    warp::reply::json(&json!({
        "eth_balance": format_eth(balance),
        "usd_value": format!("{:.2}", (balance as f64 / UETH_PER_ETH as f64) * 2000.0),
        "total_earned": format_eth(ledger.total_earned_of(query.uid)),
        "total_spent": format_eth(ledger.total_spent_of(query.uid)),
        "total_pings": total_pings,
        "starting_balance": format_eth(ledger.starting_balance_ueth()),
        "simulated": true,
    }))
    .into_response()
}

fn handle_wallet_transactions(query: UidQuery, store: SharedStore) -> Response {
    let guard = safe_lock(&store);
    let transactions: Vec<WalletTransaction> = guard
        .ledger
        .history_of(query.uid, None)
        .into_iter()
        .map(|e| WalletTransaction {
            tx_hash: e.tx_hash.clone(),
            amount: format_eth(e.amount_ueth),
            timestamp: e.timestamp,
            status: "success",
            kind: e.kind,
        })
        .collect();
    warp::reply::json(&json!({
        "transactions": transactions,
        "total_count": transactions.len(),
    }))
    .into_response()
}

fn handle_update_agent(uid: u64, body: UpdateAgentBody, store: SharedStore) -> Response {
    let mut guard = safe_lock(&store);
    match guard.users.get_mut(&uid) {
        None => error_reply(StatusCode::NOT_FOUND, "User not found"),
        Some(user) => {
            if let Some(url) = body.replit_agent_url {
                user.agent.agent_url = url;
            }
            if let Some(token) = body.replit_agent_token {
                user.agent.auth_token = token;
            }
            warp::reply::json(&user.clone()).into_response()
        }
    }
}

pub fn routes(
    store: SharedStore,
    agent: AgentClient,
    window_secs: u64,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    let websites = warp::path!("websites")
        .and(warp::get())
        .and(with_store(store.clone()))
        .map(|store: SharedStore| {
            let guard = safe_lock(&store);
            let sites: Vec<_> = guard.websites.values().collect();
            warp::reply::json(&sites).into_response()
        });

    let create_website = warp::path!("websites")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .map(|body: CreateWebsiteBody, store: SharedStore| {
            let mut guard = safe_lock(&store);
            match guard.add_website(body.uid, &body.url, body.category, now_secs()) {
                Ok(site) => warp::reply::with_status(
                    warp::reply::json(site),
                    StatusCode::CREATED,
                )
                .into_response(),
                Err(msg) => error_reply(StatusCode::NOT_FOUND, &msg),
            }
        });

    let pings = warp::path!("pings")
        .and(warp::get())
        .and(with_store(store.clone()))
        .map(|store: SharedStore| {
            let guard = safe_lock(&store);
            warp::reply::json(&guard.pings).into_response()
        });

    let manual_ping = warp::path!("pings" / "manual")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .and(warp::any().map(move || agent.clone()))
        .and(warp::any().map(move || window_secs))
        .and_then(handle_manual_ping);

    let available_sites = warp::path!("available-sites")
        .and(warp::get())
        .and(warp::query::<UidQuery>())
        .and(with_store(store.clone()))
        .map(move |query: UidQuery, store: SharedStore| {
            let guard = safe_lock(&store);
            let sites = dedup::available_targets(
                query.uid,
                &guard.websites,
                &guard.pings,
                now_secs(),
                window_secs,
            );
            warp::reply::json(&sites).into_response()
        });

    let codes = warp::path!("codes")
        .and(warp::get())
        .and(with_store(store.clone()))
        .map(|store: SharedStore| {
            let guard = safe_lock(&store);
            warp::reply::json(&guard.codes.list_available()).into_response()
        });

    let wallet_balance = warp::path!("wallet" / "balance")
        .and(warp::get())
        .and(warp::query::<UidQuery>())
        .and(with_store(store.clone()))
        .map(handle_wallet_balance);

    let wallet_transactions = warp::path!("wallet" / "transactions")
        .and(warp::get())
        .and(warp::query::<UidQuery>())
        .and(with_store(store.clone()))
        .map(handle_wallet_transactions);

    let owner = warp::path!("stats" / "owner")
        .and(warp::get())
        .and(warp::query::<UidQuery>())
        .and(with_store(store.clone()))
        .map(|query: UidQuery, store: SharedStore| {
            let guard = safe_lock(&store);
            let stats = owner_stats(query.uid, &guard.websites, &guard.pings);
            warp::reply::json(&json!({
                "total_websites": stats.total_websites,
                "online_count": stats.online_count,
                "uptime_percent": stats.uptime_percent,
                "avg_response_ms": stats.avg_response_ms,
                "total_earnings": format_eth(stats.total_earnings_ueth),
            }))
            .into_response()
        });

    let validator = warp::path!("stats" / "validator")
        .and(warp::get())
        .and(warp::query::<UidQuery>())
        .and(with_store(store.clone()))
        .map(|query: UidQuery, store: SharedStore| {
            let guard = safe_lock(&store);
            let stats = validator_stats(query.uid, &guard.pings);
            warp::reply::json(&json!({
                "total_pings": stats.total_pings,
                "success_rate": stats.success_rate,
                "avg_response_ms": stats.avg_response_ms,
                "total_earnings": format_eth(stats.total_earnings_ueth),
            }))
            .into_response()
        });

    let get_user = warp::path!("users" / u64)
        .and(warp::get())
        .and(with_store(store.clone()))
        .map(|uid: u64, store: SharedStore| {
            let guard = safe_lock(&store);
            match guard.user(uid) {
                Some(user) => warp::reply::json(user).into_response(),
                None => error_reply(StatusCode::NOT_FOUND, "User not found"),
            }
        });

    let update_user = warp::path!("users" / u64)
        .and(warp::put())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .map(handle_update_agent);

    let network_status = warp::path!("network" / "status")
        .and(warp::get())
        .and(with_store(store))
        .map(|store: SharedStore| {
            let guard = safe_lock(&store);
            warp::reply::json(&json!({
                "connected": true,
                "chain_id": 31337,
                "network_name": "Hardhat Local",
                "ping_cost_eth": format_eth(tether_core::PING_REWARD_UETH),
                "available_tx_codes": guard.codes.list_available().len(),
                "simulated": true,
            }))
            .into_response()
        });

    websites
        .or(create_website)
        .unify()
        .or(pings)
        .unify()
        .or(manual_ping)
        .unify()
        .or(available_sites)
        .unify()
        .or(codes)
        .unify()
        .or(wallet_balance)
        .unify()
        .or(wallet_transactions)
        .unify()
        .or(owner)
        .unify()
        .or(validator)
        .unify()
        .or(get_user)
        .unify()
        .or(update_user)
        .unify()
        .or(network_status)
        .unify()
}
