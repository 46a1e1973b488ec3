//! Account-side structures: balances, positions, orders, entries, payouts

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A currency balance on the account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    /// Currency code (e.g. "usd")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Funds available for new orders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<Decimal>,

    /// Funds locked in open orders or pending settlement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<Decimal>,

    /// Total balance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
}

/// A holding in one tradeable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub tradeable_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    /// Shares bought over the lifetime of the position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bought_count: Option<Decimal>,

    /// Open buy order interest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_interest: Option<Decimal>,

    /// Open sell order interest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_interest: Option<Decimal>,

    /// Shares currently owned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_basis: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proceeds: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_basis_all_time: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proceeds_all_time: Option<Decimal>,

    /// Last server-side update (epoch millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// An order on the account, in any phase of its lifecycle
///
/// Status, side, type and phase are kept as wire strings; the set of values
/// is owned by the API (e.g. status: created, accepted, filled, cancelled).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tradeable_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// "buy" or "sell"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,

    /// Order type (e.g. "limit")
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,

    /// Market phase the order targets ("ipo" or "live")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_basis: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_paid: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filled_quantity: Option<Decimal>,

    /// Lifecycle timestamps (epoch millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filled_at: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_requested_at: Option<i64>,
}

/// The account's entry into an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    /// Leaderboard standing within the event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaderboard: Option<EntryLeaderboard>,

    /// Tradeable ids the account has favorited
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub favorites: Vec<String>,

    /// Last server-side update (epoch millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Position and profit on an event leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryLeaderboard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

/// A payout issued when an event settles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tradeable_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    /// Final leaderboard position the payout is for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

/// An in-app notification for the account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Notification category (e.g. "order_filled")
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,

    /// Creation time (epoch millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}
