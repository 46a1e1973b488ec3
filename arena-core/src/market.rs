//! Market data structures for fantasy sports events
//!
//! JockMkt timestamps arrive as epoch milliseconds; structs keep the raw
//! value and expose `chrono` accessors where callers want real times.

use crate::league::League;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An event: one tradeable contest (a slate of games or a tournament)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (e.g. "evt_60dbec530d2197a973c5dddcf6f65e12")
    pub id: String,

    /// Human-readable event name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Longer description of the event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Contest type (e.g. "open")
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    /// Lifecycle status (scheduled, ipo, live, payouts_completed, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// League the event belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub league: Option<League>,

    /// When the IPO phase opens (epoch millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipo_open_at: Option<i64>,

    /// Estimated start of live trading (epoch millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_at_estimated: Option<i64>,

    /// Fraction of the event completed (0.0 - 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_completed: Option<Decimal>,

    /// Last server-side update (epoch millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,

    /// Games included in the event, when expanded by the API
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub games: Vec<Game>,

    /// Tradeables in the event, when expanded by the API
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tradeables: Vec<Tradeable>,
}

impl Event {
    /// IPO open time as a `DateTime`, when present
    pub fn ipo_open_time(&self) -> Option<DateTime<Utc>> {
        self.ipo_open_at.and_then(DateTime::from_timestamp_millis)
    }

    /// Estimated live time as a `DateTime`, when present
    pub fn live_time_estimated(&self) -> Option<DateTime<Utc>> {
        self.live_at_estimated
            .and_then(DateTime::from_timestamp_millis)
    }
}

/// A tradeable: one athlete's share listing within an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tradeable {
    /// Unique identifier (e.g. "tdbl_...")
    pub id: String,

    /// League of the underlying athlete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub league: Option<League>,

    /// The underlying athlete's entity id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    /// The event this tradeable belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    /// The game currently in focus for this tradeable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_game_id: Option<String>,

    /// Fantasy point totals (projected and scored)
    #[serde(default)]
    pub points: TradeablePoints,

    /// Price ladder for the share
    #[serde(default)]
    pub price: TradeablePrice,

    /// Last server-side update (epoch millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Fantasy point figures attached to a tradeable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeablePoints {
    /// Pre-game projection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected: Option<Decimal>,

    /// Live-updating projection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_live: Option<Decimal>,

    /// Points actually scored so far
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scored: Option<Decimal>,
}

/// Price information for a tradeable share
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeablePrice {
    /// IPO price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipo: Option<Decimal>,

    /// Session high
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    /// Session low
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    /// Last traded price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<Decimal>,

    /// Model-estimated fair value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated: Option<Decimal>,

    /// Best bid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid: Option<Decimal>,

    /// Best ask
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask: Option<Decimal>,

    /// Final settlement price, once the event pays out
    #[serde(rename = "final", skip_serializing_if = "Option::is_none")]
    pub final_price: Option<Decimal>,
}

/// A real-world game underlying an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Unique identifier (e.g. "game_...")
    pub id: String,

    /// Display name (e.g. "BOS @ MIA")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// League the game is played in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub league: Option<League>,

    /// Scheduled start (epoch millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_start: Option<i64>,

    /// Venue name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,

    /// Lifecycle status (scheduled, in_progress, final, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Fraction of the game completed (0.0 - 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_completed: Option<Decimal>,

    /// Home team, for leagues with team structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<Team>,

    /// Away team, for leagues with team structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away: Option<Team>,
}

impl Game {
    /// Scheduled start as a `DateTime`, when present
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.scheduled_start
            .and_then(DateTime::from_timestamp_millis)
    }
}

/// A team reference embedded in games and entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub league: Option<League>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}
