//! Public per-event activity feed payloads
//!
//! These are the anonymized objects streamed on the `event_activity`
//! subscription; they carry no account information.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A public view of someone's order in the event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tradeable_id: Option<String>,

    /// "buy" or "sell"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// A matched trade in the event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tradeable_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_at: Option<i64>,
}

/// Someone joining the event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Join {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}
