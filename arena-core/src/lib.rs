//! Core types for the Arena fantasy sports trading terminal
//!
//! This crate defines the shared data structures used across the terminal,
//! including market objects, account state, the public activity feed, and
//! the streaming vocabulary shared between the engine and its consumers.

pub mod account;
pub mod activity;
pub mod error;
pub mod league;
pub mod market;
pub mod streaming;

pub use account::{Balance, Entry, EntryLeaderboard, Notification, Order, Payout, Position};
pub use activity::{Join, PublicOrder, Trade};
pub use error::{ArenaError, ArenaResult};
pub use league::League;
pub use market::{Event, Game, Team, Tradeable, TradeablePoints, TradeablePrice};
pub use streaming::{ConnectionState, FocusChange, Operation};
