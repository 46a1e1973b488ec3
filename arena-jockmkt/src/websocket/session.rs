//! Connection-session state machine
//!
//! `StreamSession` owns everything the engine knows about one logical
//! connection: the lifecycle state, the desired focus, and the
//! server-confirmed subscription set. Inputs (transport events, inbound
//! frames, focus changes) are turned into effect lists; the I/O loop in
//! `mod.rs` performs the sends and emits. This layer never awaits: a
//! transition always completes before the next input is examined.

use serde_json::Value;
use tracing::{debug, info, warn};

use arena_core::{ConnectionState, FocusChange, League, Operation};

use super::protocol::{
    AuthStatus, ClientCommand, ServerFrame, SubscriptionContext, SubscriptionStatus,
    SubscriptionTopic,
};
use super::{ActivityItem, JockmktUpdate};

/// An action the I/O loop must carry out for the session
#[derive(Debug)]
pub(crate) enum Effect {
    /// Send a command frame on the transport
    Send(ClientCommand),
    /// Forward an update to the consumer
    Emit(JockmktUpdate),
    /// Close the transport
    Close,
}

/// Focus interest retained across connections
///
/// Never cleared by connection churn; only `set_focus` mutates it.
#[derive(Debug, Clone, Default)]
struct DesiredFocus {
    event_id: Option<String>,
    league: Option<League>,
}

/// Server-confirmed subscription state, one slot per focus topic
///
/// The fixed `account`/`notification` subscriptions are not tracked; they
/// exist exactly when the session is authenticated.
#[derive(Debug, Default)]
struct ActiveSubscriptions {
    event: Option<String>,
    event_activity: Option<String>,
    games: Option<League>,
}

impl ActiveSubscriptions {
    fn clear(&mut self) {
        *self = Self::default();
    }

    fn is_empty(&self) -> bool {
        self.event.is_none() && self.event_activity.is_none() && self.games.is_none()
    }
}

pub(crate) struct StreamSession {
    state: ConnectionState,
    desired: DesiredFocus,
    active: ActiveSubscriptions,
}

impl StreamSession {
    pub(crate) fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            desired: DesiredFocus::default(),
            active: ActiveSubscriptions::default(),
        }
    }

    pub(crate) fn connection_state(&self) -> ConnectionState {
        self.state
    }

    fn is_authenticated(&self) -> bool {
        self.state == ConnectionState::Authenticated
    }

    // ------------------------------------------------------------------
    // Transport lifecycle
    // ------------------------------------------------------------------

    pub(crate) fn on_connecting(&mut self) -> Vec<Effect> {
        self.state = ConnectionState::Connecting;
        vec![Effect::Emit(JockmktUpdate::ConnectionStatus(
            ConnectionState::Connecting,
        ))]
    }

    pub(crate) fn on_connected(&mut self) -> Vec<Effect> {
        self.state = ConnectionState::Connected;
        vec![Effect::Emit(JockmktUpdate::ConnectionStatus(
            ConnectionState::Connected,
        ))]
    }

    /// Transport gone: reset per-connection state, keep desired focus
    pub(crate) fn on_disconnected(&mut self) -> Vec<Effect> {
        let was_authenticated = self.is_authenticated();
        self.state = ConnectionState::Disconnected;
        self.active.clear();

        let mut effects = Vec::new();
        if was_authenticated {
            effects.push(Effect::Emit(JockmktUpdate::AuthenticationStatus(false)));
        }
        effects.push(Effect::Emit(JockmktUpdate::ConnectionStatus(
            ConnectionState::Disconnected,
        )));
        effects
    }

    // ------------------------------------------------------------------
    // Subscription reconciliation
    // ------------------------------------------------------------------

    /// Apply a focus change and converge subscriptions toward it
    ///
    /// Before authentication this is a pure state update; the
    /// authentication-success path re-applies whatever is desired then.
    pub(crate) fn set_focus(&mut self, change: FocusChange) -> Vec<Effect> {
        let mut effects = Vec::new();

        if change.is_empty() {
            self.desired = DesiredFocus::default();
            if self.is_authenticated() && !self.active.is_empty() {
                debug!("[JockMkt WS] Focus cleared, unsubscribing active topics");
                if let Some(event_id) = self.active.event.take() {
                    effects.push(Effect::Send(ClientCommand::unsubscribe(
                        SubscriptionTopic::Event { event_id },
                    )));
                }
                if let Some(event_id) = self.active.event_activity.take() {
                    effects.push(Effect::Send(ClientCommand::unsubscribe(
                        SubscriptionTopic::EventActivity { event_id },
                    )));
                }
                if let Some(league) = self.active.games.take() {
                    effects.push(Effect::Send(ClientCommand::unsubscribe(
                        SubscriptionTopic::Games { league },
                    )));
                }
            }
            return effects;
        }

        if let Some(event_id) = change.event_id {
            self.desired.event_id = Some(event_id.clone());
            if self.is_authenticated() {
                effects.push(Effect::Send(ClientCommand::subscribe(
                    SubscriptionTopic::Event {
                        event_id: event_id.clone(),
                    },
                )));
                effects.push(Effect::Send(ClientCommand::subscribe(
                    SubscriptionTopic::EventActivity { event_id },
                )));
            }
        }

        if let Some(league) = change.league {
            self.desired.league = Some(league);
            if self.is_authenticated() {
                effects.push(Effect::Send(ClientCommand::subscribe(
                    SubscriptionTopic::Games { league },
                )));
            }
        }

        effects
    }

    /// Subscribe commands for the currently desired focus
    fn desired_focus_subscriptions(&self, effects: &mut Vec<Effect>) {
        if let Some(event_id) = &self.desired.event_id {
            effects.push(Effect::Send(ClientCommand::subscribe(
                SubscriptionTopic::Event {
                    event_id: event_id.clone(),
                },
            )));
            effects.push(Effect::Send(ClientCommand::subscribe(
                SubscriptionTopic::EventActivity {
                    event_id: event_id.clone(),
                },
            )));
        }
        if let Some(league) = self.desired.league {
            effects.push(Effect::Send(ClientCommand::subscribe(
                SubscriptionTopic::Games { league },
            )));
        }
    }

    /// Record a subscription confirmation or denial
    ///
    /// A confirmation for a key the focus has since moved away from is still
    /// recorded; the next unsubscribe-all pass removes it.
    fn record_subscription(&mut self, status: SubscriptionStatus, topic: SubscriptionTopic) {
        let subscribed = status == SubscriptionStatus::Subscribed;
        match topic {
            SubscriptionTopic::Event { event_id } => {
                debug!("[JockMkt WS] event subscription {:?}: {}", status, event_id);
                self.active.event = subscribed.then_some(event_id);
            }
            SubscriptionTopic::EventActivity { event_id } => {
                debug!(
                    "[JockMkt WS] event_activity subscription {:?}: {}",
                    status, event_id
                );
                self.active.event_activity = subscribed.then_some(event_id);
            }
            SubscriptionTopic::Games { league } => {
                debug!("[JockMkt WS] games subscription {:?}: {}", status, league);
                self.active.games = subscribed.then_some(league);
            }
            // Fixed subscriptions: accepted, nothing to track
            SubscriptionTopic::Account | SubscriptionTopic::Notification => {
                debug!("[JockMkt WS] fixed subscription {:?}", status);
            }
        }
    }

    // ------------------------------------------------------------------
    // Inbound routing
    // ------------------------------------------------------------------

    /// Parse and route one inbound text frame
    ///
    /// Malformed frames (including unknown `object` discriminators) are
    /// skipped with a log line rather than tearing down the connection.
    pub(crate) fn handle_text(&mut self, text: &str) -> Vec<Effect> {
        match serde_json::from_str::<ServerFrame>(text) {
            Ok(frame) => self.handle_frame(frame),
            Err(e) => {
                warn!("[JockMkt WS] Skipping unparseable frame: {}", e);
                Vec::new()
            }
        }
    }

    pub(crate) fn handle_frame(&mut self, frame: ServerFrame) -> Vec<Effect> {
        let mut effects = Vec::new();
        match frame {
            // Fatal for this connection; the reconnect policy still applies
            ServerFrame::Error { error } => {
                warn!("[JockMkt WS] Server error: {}", error);
                effects.push(Effect::Close);
            }

            ServerFrame::Authentication { status } => match status {
                AuthStatus::Success => {
                    info!("[JockMkt WS] Authenticated");
                    self.state = ConnectionState::Authenticated;
                    effects.push(Effect::Emit(JockmktUpdate::ConnectionStatus(
                        ConnectionState::Authenticated,
                    )));
                    effects.push(Effect::Emit(JockmktUpdate::AuthenticationStatus(true)));
                    effects.push(Effect::Send(ClientCommand::subscribe(
                        SubscriptionTopic::Account,
                    )));
                    effects.push(Effect::Send(ClientCommand::subscribe(
                        SubscriptionTopic::Notification,
                    )));
                    self.desired_focus_subscriptions(&mut effects);
                }
                AuthStatus::Error => {
                    warn!("[JockMkt WS] Authentication rejected");
                    effects.push(Effect::Close);
                }
            },

            ServerFrame::Subscription { status, topic } => {
                self.record_subscription(status, topic);
            }

            ServerFrame::Tradeable {
                operation,
                tradeable,
            } => {
                effects.push(Effect::Emit(JockmktUpdate::Tradeable {
                    operation,
                    tradeable,
                }));
            }
            ServerFrame::Game { operation, game } => {
                effects.push(Effect::Emit(JockmktUpdate::Game { operation, game }));
            }
            ServerFrame::Event { operation, event } => {
                effects.push(Effect::Emit(JockmktUpdate::Event { operation, event }));
            }
            ServerFrame::Entry { operation, entry } => {
                effects.push(Effect::Emit(JockmktUpdate::Entry { operation, entry }));
            }
            ServerFrame::Balance { operation, balance } => {
                effects.push(Effect::Emit(JockmktUpdate::Balance { operation, balance }));
            }
            ServerFrame::Position {
                operation,
                position,
            } => {
                effects.push(Effect::Emit(JockmktUpdate::Position {
                    operation,
                    position,
                }));
            }
            ServerFrame::Payout { operation, payout } => {
                effects.push(Effect::Emit(JockmktUpdate::Payout { operation, payout }));
            }

            ServerFrame::Order {
                subscription,
                event_id,
                operation,
                order,
            } => {
                if let Some(update) = route_order(subscription, event_id, operation, order) {
                    effects.push(Effect::Emit(update));
                }
            }

            ServerFrame::Trade {
                event_id,
                operation,
                trade,
            } => {
                if let Some(update) =
                    activity_update(event_id, operation, ActivityItem::Trade(trade))
                {
                    effects.push(Effect::Emit(update));
                }
            }
            ServerFrame::Join {
                event_id,
                operation,
                join,
            } => {
                if let Some(update) = activity_update(event_id, operation, ActivityItem::Join(join))
                {
                    effects.push(Effect::Emit(update));
                }
            }

            ServerFrame::Notification {
                operation,
                notification,
            } => match operation {
                Operation::Created => {
                    effects.push(Effect::Emit(JockmktUpdate::NotificationReceived(
                        notification,
                    )));
                }
                Operation::Updated => {
                    effects.push(Effect::Emit(JockmktUpdate::NotificationUpdated(
                        notification,
                    )));
                }
                Operation::Deleted => {
                    debug!("[JockMkt WS] Ignoring deleted notification");
                }
            },
        }
        effects
    }
}

/// Decode an `order` frame according to its originating subscription
///
/// The wire object name is the same in both contexts but the payloads and
/// the consumer-facing events differ: account orders are the user's own,
/// event-activity orders are the public anonymized feed.
fn route_order(
    subscription: SubscriptionContext,
    event_id: Option<String>,
    operation: Operation,
    order: Value,
) -> Option<JockmktUpdate> {
    match subscription {
        SubscriptionContext::Account => match serde_json::from_value(order) {
            Ok(order) => Some(JockmktUpdate::Order { operation, order }),
            Err(e) => {
                warn!("[JockMkt WS] Skipping malformed account order: {}", e);
                None
            }
        },
        SubscriptionContext::EventActivity => match serde_json::from_value(order) {
            Ok(order) => activity_update(event_id, operation, ActivityItem::Order(order)),
            Err(e) => {
                warn!("[JockMkt WS] Skipping malformed public order: {}", e);
                None
            }
        },
        other => {
            debug!(
                "[JockMkt WS] order frame from unexpected subscription {:?}",
                other
            );
            None
        }
    }
}

fn activity_update(
    event_id: Option<String>,
    operation: Operation,
    activity: ActivityItem,
) -> Option<JockmktUpdate> {
    match event_id {
        Some(event_id) => Some(JockmktUpdate::EventActivity {
            event_id,
            operation,
            activity,
        }),
        None => {
            warn!("[JockMkt WS] Dropping event activity frame without event_id");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sent_commands(effects: &[Effect]) -> Vec<&ClientCommand> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Send(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    fn has_close(effects: &[Effect]) -> bool {
        effects.iter().any(|e| matches!(e, Effect::Close))
    }

    fn updates(effects: Vec<Effect>) -> Vec<JockmktUpdate> {
        effects
            .into_iter()
            .filter_map(|e| match e {
                Effect::Emit(u) => Some(u),
                _ => None,
            })
            .collect()
    }

    fn auth_success() -> ServerFrame {
        serde_json::from_value(json!({"object": "authentication", "status": "success"})).unwrap()
    }

    fn confirm(topic: Value) -> ServerFrame {
        let mut frame = json!({"object": "subscription", "status": "subscribed"});
        frame
            .as_object_mut()
            .unwrap()
            .extend(topic.as_object().unwrap().clone());
        serde_json::from_value(frame).unwrap()
    }

    /// Session that has completed the handshake, with confirmations applied
    /// for every subscribe command the handshake produced.
    fn authenticated_session() -> StreamSession {
        let mut session = StreamSession::new();
        session.on_connecting();
        session.on_connected();
        let effects = session.handle_frame(auth_success());
        assert_eq!(session.connection_state(), ConnectionState::Authenticated);
        // Default subscriptions only; no focus yet
        assert_eq!(sent_commands(&effects).len(), 2);
        session
    }

    fn confirm_focus(session: &mut StreamSession, effects: &[Effect]) {
        for cmd in sent_commands(effects) {
            if let ClientCommand::Subscribe { subscription } = cmd {
                let topic_json = serde_json::to_value(subscription).unwrap();
                session.handle_frame(confirm(topic_json));
            }
        }
    }

    #[test]
    fn focus_before_authentication_sends_nothing() {
        let mut session = StreamSession::new();
        let effects = session.set_focus(FocusChange::event("evt_1"));
        assert!(sent_commands(&effects).is_empty());

        session.on_connecting();
        session.on_connected();
        let effects = session.set_focus(FocusChange::event("evt_2"));
        assert!(sent_commands(&effects).is_empty());
    }

    #[test]
    fn authentication_applies_only_final_desired_focus() {
        let mut session = StreamSession::new();
        // Several focus changes before the handshake completes
        session.set_focus(FocusChange::event("evt_1"));
        session.set_focus(FocusChange::event("evt_2"));
        session.set_focus(FocusChange::league(League::Nba));
        session.on_connecting();
        session.on_connected();

        let effects = session.handle_frame(auth_success());
        let cmds = sent_commands(&effects);
        assert_eq!(
            cmds,
            vec![
                &ClientCommand::subscribe(SubscriptionTopic::Account),
                &ClientCommand::subscribe(SubscriptionTopic::Notification),
                &ClientCommand::subscribe(SubscriptionTopic::Event {
                    event_id: "evt_2".into()
                }),
                &ClientCommand::subscribe(SubscriptionTopic::EventActivity {
                    event_id: "evt_2".into()
                }),
                &ClientCommand::subscribe(SubscriptionTopic::Games {
                    league: League::Nba
                }),
            ]
        );
    }

    #[test]
    fn focus_event_subscribes_event_and_activity() {
        let mut session = authenticated_session();
        let effects = session.set_focus(FocusChange::event("evt_1"));
        assert_eq!(
            sent_commands(&effects),
            vec![
                &ClientCommand::subscribe(SubscriptionTopic::Event {
                    event_id: "evt_1".into()
                }),
                &ClientCommand::subscribe(SubscriptionTopic::EventActivity {
                    event_id: "evt_1".into()
                }),
            ]
        );
    }

    #[test]
    fn adding_league_focus_leaves_event_focus_untouched() {
        let mut session = authenticated_session();
        let effects = session.set_focus(FocusChange::event("evt_1"));
        confirm_focus(&mut session, &effects);

        let effects = session.set_focus(FocusChange::league(League::Nba));
        assert_eq!(
            sent_commands(&effects),
            vec![&ClientCommand::subscribe(SubscriptionTopic::Games {
                league: League::Nba
            })]
        );
    }

    #[test]
    fn clearing_focus_unsubscribes_everything_tracked() {
        let mut session = authenticated_session();
        let effects = session.set_focus(FocusChange {
            event_id: Some("evt_1".into()),
            league: Some(League::Nba),
        });
        confirm_focus(&mut session, &effects);

        let effects = session.set_focus(FocusChange::clear());
        let cmds = sent_commands(&effects);
        assert_eq!(cmds.len(), 3);
        assert!(cmds.contains(&&ClientCommand::unsubscribe(SubscriptionTopic::Event {
            event_id: "evt_1".into()
        })));
        assert!(cmds.contains(&&ClientCommand::unsubscribe(
            SubscriptionTopic::EventActivity {
                event_id: "evt_1".into()
            }
        )));
        assert!(cmds.contains(&&ClientCommand::unsubscribe(SubscriptionTopic::Games {
            league: League::Nba
        })));
        assert!(session.active.is_empty());

        // A second clear has nothing left to unsubscribe
        let effects = session.set_focus(FocusChange::clear());
        assert!(sent_commands(&effects).is_empty());
    }

    #[test]
    fn clearing_focus_without_confirmations_sends_nothing() {
        let mut session = authenticated_session();
        // Subscribes in flight, none confirmed
        session.set_focus(FocusChange::event("evt_1"));

        let effects = session.set_focus(FocusChange::clear());
        assert!(sent_commands(&effects).is_empty());
    }

    #[test]
    fn stale_confirmation_is_recorded_for_later_cleanup() {
        let mut session = authenticated_session();
        session.set_focus(FocusChange::event("evt_1"));
        session.set_focus(FocusChange::event("evt_2"));

        // The slow confirmation for the stale key arrives last
        session.handle_frame(confirm(json!({"type": "event", "event_id": "evt_2"})));
        session.handle_frame(confirm(json!({"type": "event", "event_id": "evt_1"})));

        let effects = session.set_focus(FocusChange::clear());
        assert_eq!(
            sent_commands(&effects),
            vec![&ClientCommand::unsubscribe(SubscriptionTopic::Event {
                event_id: "evt_1".into()
            })]
        );
    }

    #[test]
    fn disconnect_clears_active_but_keeps_desired() {
        let mut session = authenticated_session();
        let effects = session.set_focus(FocusChange::event("evt_1"));
        confirm_focus(&mut session, &effects);

        session.on_disconnected();
        assert!(session.active.is_empty());
        assert_eq!(session.connection_state(), ConnectionState::Disconnected);

        // Re-authentication re-issues the still-desired focus
        session.on_connecting();
        session.on_connected();
        let effects = session.handle_frame(auth_success());
        let cmds = sent_commands(&effects);
        assert!(cmds.contains(&&ClientCommand::subscribe(SubscriptionTopic::Event {
            event_id: "evt_1".into()
        })));
        assert!(cmds.contains(&&ClientCommand::subscribe(
            SubscriptionTopic::EventActivity {
                event_id: "evt_1".into()
            }
        )));
    }

    #[test]
    fn disconnect_emits_both_status_updates_when_authenticated() {
        let mut session = authenticated_session();
        let emitted = updates(session.on_disconnected());
        assert!(matches!(
            emitted[0],
            JockmktUpdate::AuthenticationStatus(false)
        ));
        assert!(matches!(
            emitted[1],
            JockmktUpdate::ConnectionStatus(ConnectionState::Disconnected)
        ));
    }

    #[test]
    fn error_frame_always_closes() {
        let mut session = StreamSession::new();
        session.on_connecting();
        session.on_connected();
        let effects =
            session.handle_text(r#"{"object": "error", "error": "subscription limit"}"#);
        assert!(has_close(&effects));

        let mut session = authenticated_session();
        let effects = session.handle_text(r#"{"object": "error", "error": "internal"}"#);
        assert!(has_close(&effects));
    }

    #[test]
    fn authentication_failure_closes() {
        let mut session = StreamSession::new();
        session.on_connecting();
        session.on_connected();
        let effects = session
            .handle_text(r#"{"object": "authentication", "status": "error"}"#);
        assert!(has_close(&effects));
        assert_eq!(session.connection_state(), ConnectionState::Connected);
    }

    #[test]
    fn malformed_frame_is_skipped() {
        let mut session = authenticated_session();
        assert!(session.handle_text("not json at all").is_empty());
        assert!(session
            .handle_text(r#"{"object": "heartbeat"}"#)
            .is_empty());
        // Connection unaffected
        assert_eq!(session.connection_state(), ConnectionState::Authenticated);
    }

    #[test]
    fn order_frames_demux_by_subscription_context() {
        let mut session = authenticated_session();

        let effects = session.handle_text(
            r#"{"object": "order", "subscription": "account", "operation": "updated",
                "order": {"id": "ord_1", "status": "filled"}}"#,
        );
        match &updates(effects)[..] {
            [JockmktUpdate::Order { order, .. }] => assert_eq!(order.id, "ord_1"),
            other => panic!("expected account order update, got {:?}", other),
        }

        let effects = session.handle_text(
            r#"{"object": "order", "subscription": "event_activity", "event_id": "evt_1",
                "operation": "created", "order": {"side": "buy", "quantity": "3"}}"#,
        );
        match &updates(effects)[..] {
            [JockmktUpdate::EventActivity {
                event_id,
                activity: ActivityItem::Order(order),
                ..
            }] => {
                assert_eq!(event_id, "evt_1");
                assert_eq!(order.side.as_deref(), Some("buy"));
            }
            other => panic!("expected event activity update, got {:?}", other),
        }
    }

    #[test]
    fn notification_demux_by_operation() {
        let mut session = authenticated_session();

        let effects = session.handle_text(
            r#"{"object": "notification", "subscription": "notification",
                "operation": "created", "notification": {"id": "not_1"}}"#,
        );
        assert!(matches!(
            &updates(effects)[..],
            [JockmktUpdate::NotificationReceived(_)]
        ));

        let effects = session.handle_text(
            r#"{"object": "notification", "subscription": "notification",
                "operation": "updated", "notification": {"id": "not_1"}}"#,
        );
        assert!(matches!(
            &updates(effects)[..],
            [JockmktUpdate::NotificationUpdated(_)]
        ));

        let effects = session.handle_text(
            r#"{"object": "notification", "subscription": "notification",
                "operation": "deleted", "notification": {"id": "not_1"}}"#,
        );
        assert!(updates(effects).is_empty());
    }
}
