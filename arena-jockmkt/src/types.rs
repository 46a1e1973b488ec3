//! JockMkt API response types
//!
//! List endpoints share a paging envelope (`status`/`start`/`limit`/`count`
//! plus a payload array named after the resource); single-resource endpoints
//! wrap the payload in a field of the same name. Payload shapes live in
//! `arena-core` and are shared with the streaming engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use arena_core::{Balance, Entry, Event, Game, Order, Position, Tradeable};

/// Bearer token minted from an api key/secret pair
///
/// This is what feeds the streaming engine's token source.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthToken {
    pub access_token: String,

    /// Expiry (epoch millis)
    pub expired_at: i64,
}

impl AuthToken {
    /// Expiry as a `DateTime`
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.expired_at)
    }
}

/// Response from POST /oauth/tokens
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: AuthToken,
}

/// The account profile
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Account {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

/// Response from GET /account
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    pub account: Account,
}

/// Response from GET /balances
#[derive(Debug, Clone, Deserialize)]
pub struct BalancesResponse {
    pub balances: Vec<Balance>,
}

/// Response from GET /events
#[derive(Debug, Clone, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<Event>,
    #[serde(default)]
    pub start: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Response from GET /events/{event_id}
#[derive(Debug, Clone, Deserialize)]
pub struct EventResponse {
    pub event: Event,
}

/// Response from GET /events/{event_id}/tradeables
#[derive(Debug, Clone, Deserialize)]
pub struct EventTradeablesResponse {
    pub tradeables: Vec<Tradeable>,
}

/// Response from GET /events/{event_id}/games
#[derive(Debug, Clone, Deserialize)]
pub struct EventGamesResponse {
    pub games: Vec<Game>,
}

/// Response from GET /games
#[derive(Debug, Clone, Deserialize)]
pub struct GamesResponse {
    pub games: Vec<Game>,
    #[serde(default)]
    pub start: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Response from GET /games/{game_id}
#[derive(Debug, Clone, Deserialize)]
pub struct GameResponse {
    pub game: Game,
}

/// Response from GET /entries
#[derive(Debug, Clone, Deserialize)]
pub struct EntriesResponse {
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub start: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Response from POST /entries
#[derive(Debug, Clone, Deserialize)]
pub struct EntryResponse {
    pub entry: Entry,
}

/// Response from GET /orders
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
    #[serde(default)]
    pub start: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Response from POST /orders and DELETE /orders/{order_id}
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub order: Order,
}

/// Response from GET /positions
#[derive(Debug, Clone, Deserialize)]
pub struct PositionsResponse {
    pub positions: Vec<Position>,
}

/// Order placement request for POST /orders
///
/// Only limit orders exist; `phase` selects the ipo or live market.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceOrderRequest {
    pub tradeable_id: String,

    /// "buy" or "sell"
    pub side: String,

    #[serde(rename = "type")]
    pub order_type: String,

    /// "ipo" or "live"
    pub phase: String,

    pub quantity: Decimal,

    pub limit_price: Decimal,
}

impl PlaceOrderRequest {
    /// A limit buy in the given phase
    pub fn buy(tradeable_id: impl Into<String>, quantity: Decimal, limit_price: Decimal) -> Self {
        Self {
            tradeable_id: tradeable_id.into(),
            side: "buy".to_string(),
            order_type: "limit".to_string(),
            phase: "live".to_string(),
            quantity,
            limit_price,
        }
    }

    /// A limit sell in the given phase
    pub fn sell(tradeable_id: impl Into<String>, quantity: Decimal, limit_price: Decimal) -> Self {
        Self {
            tradeable_id: tradeable_id.into(),
            side: "sell".to_string(),
            order_type: "limit".to_string(),
            phase: "live".to_string(),
            quantity,
            limit_price,
        }
    }

    /// Target the IPO phase instead of live trading
    pub fn ipo(mut self) -> Self {
        self.phase = "ipo".to_string();
        self
    }
}
