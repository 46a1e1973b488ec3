//! Shared vocabulary for the real-time streaming connection
//!
//! The platform crates own their wire protocols; this module holds the
//! pieces their consumers see: connection lifecycle states, the operation
//! tag carried by every domain frame, and focus-change requests.

use serde::{Deserialize, Serialize};

use crate::league::League;

/// Lifecycle state of the streaming connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No transport; a reconnect may be pending
    Disconnected,
    /// Transport being opened
    Connecting,
    /// Transport open, not yet authenticated
    Connected,
    /// Authenticated; subscriptions are live
    Authenticated,
}

impl ConnectionState {
    /// Whether a transport currently exists in this state
    pub fn has_transport(&self) -> bool {
        !matches!(self, ConnectionState::Disconnected | ConnectionState::Connecting)
    }
}

/// Operation tag carried by every streamed domain object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Created,
    Updated,
    Deleted,
}

/// A change to the application's focus, driving topic subscriptions
///
/// Each populated field replaces the corresponding focus slot; a change with
/// neither field set clears all focus interest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusChange {
    /// Event to follow (`event` + `event_activity` topics)
    pub event_id: Option<String>,
    /// League whose games to follow (`games` topic)
    pub league: Option<League>,
}

impl FocusChange {
    /// A change that clears all focus interest
    pub fn clear() -> Self {
        Self::default()
    }

    /// Focus on an event
    pub fn event(event_id: impl Into<String>) -> Self {
        Self {
            event_id: Some(event_id.into()),
            league: None,
        }
    }

    /// Focus on a league's games
    pub fn league(league: League) -> Self {
        Self {
            event_id: None,
            league: Some(league),
        }
    }

    /// True when no field is populated
    pub fn is_empty(&self) -> bool {
        self.event_id.is_none() && self.league.is_none()
    }
}
