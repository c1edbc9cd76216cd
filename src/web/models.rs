//! Request and Response DTOs for the Web API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::PairRecord;

// ============================================================================
// Health & Status
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Most recent listener status line
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusLogResponse {
    pub log: Vec<String>,
    pub total: usize,
}

// ============================================================================
// Alerts & Watchlist
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<String>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub addresses: Vec<String>,
    pub total: usize,
}

// ============================================================================
// Token Events
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct TokenEventsQuery {
    /// Case-insensitive substring over addresses, names and symbols
    pub q: Option<String>,
    pub honeypot: Option<bool>,
    pub ownership: Option<bool>,
    pub min_liquidity: Option<f64>,
    /// Inclusive window bounds, unix milliseconds
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TokenEventsResponse {
    pub events: Vec<PairRecord>,
    pub total: usize,
    /// The window actually applied, after defaults
    pub start_ms: i64,
    pub end_ms: i64,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}
