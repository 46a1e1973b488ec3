//! Wire protocol for the JockMkt streaming endpoint
//!
//! One JSON object per frame in both directions. Outbound commands are
//! tagged by `action`, inbound frames by `object`; modelling both as closed
//! serde enums makes dispatch exhaustive at compile time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use arena_core::{
    Balance, Entry, Event, Game, Join, League, Notification, Operation, Payout, Position, Trade,
    Tradeable,
};

// ============================================================================
// Outbound commands
// ============================================================================

/// Command sent to the streaming endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Authenticate the connection with a bearer token
    Authenticate { authentication: TokenAuthentication },
    /// Open a topic subscription
    Subscribe { subscription: SubscriptionTopic },
    /// Close a topic subscription
    Unsubscribe { subscription: SubscriptionTopic },
}

impl ClientCommand {
    pub fn authenticate(token: impl Into<String>) -> Self {
        ClientCommand::Authenticate {
            authentication: TokenAuthentication::Token {
                token: token.into(),
            },
        }
    }

    pub fn subscribe(subscription: SubscriptionTopic) -> Self {
        ClientCommand::Subscribe { subscription }
    }

    pub fn unsubscribe(subscription: SubscriptionTopic) -> Self {
        ClientCommand::Unsubscribe { subscription }
    }
}

/// Authentication payload; the only supported scheme is a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenAuthentication {
    Token { token: String },
}

/// Topics the streaming endpoint supports
///
/// `event` and `event_activity` are keyed by event id, `games` by league;
/// `account` and `notification` take no key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubscriptionTopic {
    Event { event_id: String },
    EventActivity { event_id: String },
    Account,
    Notification,
    Games { league: League },
}

// ============================================================================
// Inbound frames
// ============================================================================

/// Frame received from the streaming endpoint, discriminated by `object`
///
/// Domain frames carry the payload under a field named after the object,
/// plus the `operation` performed on it. `order` frames arrive on both the
/// `account` and `event_activity` subscriptions with different payload
/// shapes, so the payload stays raw here and is decoded by the router once
/// the originating subscription is known.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum ServerFrame {
    Authentication {
        status: AuthStatus,
    },
    Error {
        error: String,
    },
    Subscription {
        status: SubscriptionStatus,
        #[serde(flatten)]
        topic: SubscriptionTopic,
    },
    Tradeable {
        operation: Operation,
        tradeable: Tradeable,
    },
    Game {
        operation: Operation,
        game: Game,
    },
    Event {
        operation: Operation,
        event: Event,
    },
    Entry {
        operation: Operation,
        entry: Entry,
    },
    Balance {
        operation: Operation,
        balance: Balance,
    },
    Position {
        operation: Operation,
        position: Position,
    },
    Order {
        subscription: SubscriptionContext,
        #[serde(default)]
        event_id: Option<String>,
        operation: Operation,
        order: Value,
    },
    Payout {
        operation: Operation,
        payout: Payout,
    },
    Notification {
        operation: Operation,
        notification: Notification,
    },
    Trade {
        #[serde(default)]
        event_id: Option<String>,
        operation: Operation,
        trade: Trade,
    },
    Join {
        #[serde(default)]
        event_id: Option<String>,
        operation: Operation,
        join: Join,
    },
}

/// Result of the authenticate command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    Success,
    Error,
}

/// Result of a subscribe/unsubscribe command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Subscribed,
    Unsubscribed,
}

/// Which subscription a domain frame originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionContext {
    Event,
    EventActivity,
    Account,
    Notification,
    Games,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn authenticate_command_wire_shape() {
        let cmd = ClientCommand::authenticate("jm_tok_abc123");
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({
                "action": "authenticate",
                "authentication": {"type": "token", "token": "jm_tok_abc123"}
            })
        );
    }

    #[test]
    fn keyed_subscribe_commands_wire_shape() {
        let cmd = ClientCommand::subscribe(SubscriptionTopic::Event {
            event_id: "evt_1".into(),
        });
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({
                "action": "subscribe",
                "subscription": {"type": "event", "event_id": "evt_1"}
            })
        );

        let cmd = ClientCommand::unsubscribe(SubscriptionTopic::Games {
            league: League::Nba,
        });
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({
                "action": "unsubscribe",
                "subscription": {"type": "games", "league": "nba"}
            })
        );
    }

    #[test]
    fn unkeyed_subscribe_commands_wire_shape() {
        let cmd = ClientCommand::subscribe(SubscriptionTopic::Account);
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({
                "action": "subscribe",
                "subscription": {"type": "account"}
            })
        );

        let cmd = ClientCommand::subscribe(SubscriptionTopic::Notification);
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({
                "action": "subscribe",
                "subscription": {"type": "notification"}
            })
        );
    }

    #[test]
    fn parses_authentication_frames() {
        let frame: ServerFrame =
            serde_json::from_str(r#"{"object": "authentication", "status": "success"}"#).unwrap();
        assert!(matches!(
            frame,
            ServerFrame::Authentication {
                status: AuthStatus::Success
            }
        ));

        let frame: ServerFrame =
            serde_json::from_str(r#"{"object": "authentication", "status": "error"}"#).unwrap();
        assert!(matches!(
            frame,
            ServerFrame::Authentication {
                status: AuthStatus::Error
            }
        ));
    }

    #[test]
    fn parses_error_frame() {
        let frame: ServerFrame =
            serde_json::from_str(r#"{"object": "error", "error": "rate limited"}"#).unwrap();
        match frame {
            ServerFrame::Error { error } => assert_eq!(error, "rate limited"),
            other => panic!("expected error frame, got {:?}", other),
        }
    }

    #[test]
    fn parses_subscription_confirmations() {
        let frame: ServerFrame = serde_json::from_value(json!({
            "object": "subscription",
            "status": "subscribed",
            "type": "event",
            "event_id": "evt_1"
        }))
        .unwrap();
        match frame {
            ServerFrame::Subscription { status, topic } => {
                assert_eq!(status, SubscriptionStatus::Subscribed);
                assert_eq!(
                    topic,
                    SubscriptionTopic::Event {
                        event_id: "evt_1".into()
                    }
                );
            }
            other => panic!("expected subscription frame, got {:?}", other),
        }

        let frame: ServerFrame = serde_json::from_value(json!({
            "object": "subscription",
            "status": "unsubscribed",
            "type": "games",
            "league": "nhl"
        }))
        .unwrap();
        match frame {
            ServerFrame::Subscription { status, topic } => {
                assert_eq!(status, SubscriptionStatus::Unsubscribed);
                assert_eq!(topic, SubscriptionTopic::Games { league: League::Nhl });
            }
            other => panic!("expected subscription frame, got {:?}", other),
        }
    }

    #[test]
    fn parses_order_frames_from_both_contexts() {
        let frame: ServerFrame = serde_json::from_value(json!({
            "object": "order",
            "subscription": "account",
            "operation": "updated",
            "order": {"id": "ord_1", "status": "filled"}
        }))
        .unwrap();
        match frame {
            ServerFrame::Order {
                subscription,
                event_id,
                ..
            } => {
                assert_eq!(subscription, SubscriptionContext::Account);
                assert!(event_id.is_none());
            }
            other => panic!("expected order frame, got {:?}", other),
        }

        let frame: ServerFrame = serde_json::from_value(json!({
            "object": "order",
            "subscription": "event_activity",
            "event_id": "evt_1",
            "operation": "created",
            "order": {"side": "buy", "quantity": "5"}
        }))
        .unwrap();
        match frame {
            ServerFrame::Order {
                subscription,
                event_id,
                ..
            } => {
                assert_eq!(subscription, SubscriptionContext::EventActivity);
                assert_eq!(event_id.as_deref(), Some("evt_1"));
            }
            other => panic!("expected order frame, got {:?}", other),
        }
    }

    #[test]
    fn parses_domain_frame_with_payload() {
        let frame: ServerFrame = serde_json::from_value(json!({
            "object": "tradeable",
            "subscription": "event",
            "event_id": "evt_1",
            "operation": "updated",
            "tradeable": {
                "id": "tdbl_1",
                "league": "nba",
                "event_id": "evt_1",
                "price": {"last": "12.50", "bid": "12.25", "ask": "12.75"}
            }
        }))
        .unwrap();
        match frame {
            ServerFrame::Tradeable {
                operation,
                tradeable,
            } => {
                assert_eq!(operation, Operation::Updated);
                assert_eq!(tradeable.id, "tdbl_1");
                assert!(tradeable.price.last.is_some());
            }
            other => panic!("expected tradeable frame, got {:?}", other),
        }
    }

    #[test]
    fn unknown_object_discriminator_is_a_parse_error() {
        let result = serde_json::from_str::<ServerFrame>(
            r#"{"object": "heartbeat", "operation": "created"}"#,
        );
        assert!(result.is_err());
    }
}
