//! Request handlers for all API endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::error;

use super::models::*;
use super::AppState;
use crate::storage::RecordFilter;

/// Default result cap for the token events listing
const DEFAULT_EVENT_LIMIT: usize = 200;

// ============================================================================
// Health & Status
// ============================================================================

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state
        .status
        .last()
        .await
        .unwrap_or_else(|| "Idle".to_string());
    Json(StatusResponse { status })
}

pub async fn get_status_log(State(state): State<AppState>) -> Json<StatusLogResponse> {
    let log = state.status.snapshot().await;
    let total = log.len();
    Json(StatusLogResponse { log, total })
}

// ============================================================================
// Alerts & Watchlist
// ============================================================================

pub async fn get_wallet_alerts(State(state): State<AppState>) -> Json<AlertsResponse> {
    let alerts = state.alerts.snapshot().await;
    let total = alerts.len();
    Json(AlertsResponse { alerts, total })
}

pub async fn get_watchlist(State(state): State<AppState>) -> Json<WatchlistResponse> {
    let addresses = state.watched.as_vec();
    let total = addresses.len();
    Json(WatchlistResponse { addresses, total })
}

// ============================================================================
// Token Events
// ============================================================================

pub async fn get_token_events(
    State(state): State<AppState>,
    Query(query): Query<TokenEventsQuery>,
) -> Result<Json<TokenEventsResponse>, (StatusCode, Json<ErrorResponse>)> {
    // Default window: start of the current UTC day up to now
    let start_ms = query.start_ms.unwrap_or_else(start_of_utc_day_ms);
    let end_ms = query.end_ms.unwrap_or_else(|| Utc::now().timestamp_millis());

    let filter = RecordFilter {
        since: Some(start_ms.div_euclid(1_000)),
        until: Some(end_ms.div_euclid(1_000)),
        text: query.q.clone(),
        honeypot: query.honeypot,
        ownership_renounced: query.ownership,
        min_liquidity: query.min_liquidity,
        limit: Some(query.limit.unwrap_or(DEFAULT_EVENT_LIMIT)),
    };

    let events = match state.store.query(&filter).await {
        Ok(events) => events,
        Err(e) => {
            error!("Token event query failed: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to query token events".to_string(),
                    details: Some(e.to_string()),
                }),
            ));
        }
    };

    let total = events.len();
    Ok(Json(TokenEventsResponse {
        events,
        total,
        start_ms,
        end_ms,
    }))
}

/// Millisecond timestamp of 00:00:00 UTC today.
fn start_of_utc_day_ms() -> i64 {
    let now_ms = Utc::now().timestamp_millis();
    now_ms - now_ms.rem_euclid(86_400_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::EventFeed;
    use crate::storage::test_support::record;
    use crate::storage::{EventStore, MemoryStore};
    use crate::watchlist::WatchedAddresses;
    use crate::pipeline::identity::EventIdentity;
    use std::sync::Arc;

    async fn state_with_records(records: Vec<crate::models::PairRecord>) -> AppState {
        let store = Arc::new(MemoryStore::new());
        for r in &records {
            let identity = EventIdentity {
                tx_hash: r.tx_hash.clone(),
                log_index: r.log_index,
            };
            store.insert_if_absent(&identity, r).await.unwrap();
        }
        AppState::new(
            store,
            EventFeed::new("status"),
            EventFeed::new("alerts"),
            Arc::new(WatchedAddresses::from_iter(["0xaa", "0xbb"])),
        )
    }

    #[tokio::test]
    async fn test_status_defaults_to_idle() {
        let state = state_with_records(Vec::new()).await;
        let Json(response) = get_status(State(state.clone())).await;
        assert_eq!(response.status, "Idle");

        state.status.push("Connected & listening...").await;
        let Json(response) = get_status(State(state)).await;
        assert_eq!(response.status, "Connected & listening...");
    }

    #[tokio::test]
    async fn test_watchlist_listing() {
        let state = state_with_records(Vec::new()).await;
        let Json(response) = get_watchlist(State(state)).await;
        assert_eq!(response.total, 2);
        assert_eq!(response.addresses, vec!["0xaa", "0xbb"]);
    }

    #[tokio::test]
    async fn test_token_events_filters_honeypots() {
        let mut safe = record("0x11", 0);
        safe.honeypot = false;
        let mut trap = record("0x22", 0);
        trap.honeypot = true;
        let state = state_with_records(vec![safe, trap]).await;

        let query = TokenEventsQuery {
            honeypot: Some(true),
            // Fixture timestamps are in the past; widen the window over them
            start_ms: Some(0),
            end_ms: Some(Utc::now().timestamp_millis()),
            ..Default::default()
        };
        let Json(response) = get_token_events(State(state), Query(query)).await.unwrap();

        assert_eq!(response.total, 1);
        assert_eq!(response.events[0].tx_hash, "0x22");
    }

    #[tokio::test]
    async fn test_token_events_default_window_excludes_old_records() {
        // Fixture timestamp is 2023; the default window starts today
        let state = state_with_records(vec![record("0x11", 0)]).await;

        let Json(response) = get_token_events(State(state), Query(TokenEventsQuery::default()))
            .await
            .unwrap();

        assert_eq!(response.total, 0);
        assert_eq!(response.start_ms % 86_400_000, 0);
        assert!(response.end_ms >= response.start_ms);
    }

    #[tokio::test]
    async fn test_token_events_text_search() {
        let mut pepe = record("0x11", 0);
        pepe.token0_info.name = "Pepe Classic".to_string();
        let other = record("0x22", 0);
        let state = state_with_records(vec![pepe, other]).await;

        let query = TokenEventsQuery {
            q: Some("PEPE".to_string()),
            start_ms: Some(0),
            ..Default::default()
        };
        let Json(response) = get_token_events(State(state), Query(query)).await.unwrap();

        assert_eq!(response.total, 1);
        assert_eq!(response.events[0].tx_hash, "0x11");
    }
}
