//! JockMkt WebSocket streaming engine
//!
//! Maintains one logical connection to the JockMkt streaming endpoint:
//! authenticates it with a bearer token, keeps topic subscriptions in sync
//! with the application's focus, and forwards typed updates to consumers.
//!
//! The engine runs as a single spawned task that owns the transport and all
//! connection state; the [`JockmktWebSocket`] handle talks to it over a
//! command channel, and consumers receive [`JockmktUpdate`]s on a broadcast
//! channel. One task means frames and commands are processed strictly in
//! order with no locking.

use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use url::Url;

use arena_core::{
    Balance, ConnectionState, Entry, Event, FocusChange, Game, Join, Notification, Operation,
    Order, Payout, Position, PublicOrder, Trade, Tradeable,
};

pub mod protocol;
mod session;

use protocol::ClientCommand;
use session::{Effect, StreamSession};

/// Fixed path suffix of the streaming endpoint
const STREAMING_PATH: &str = "/streaming";

/// Default API host
const DEFAULT_HOST: &str = "api.jockmkt.net";

/// Fixed delay before a reconnect attempt
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

// ============================================================================
// Normalized Update Types (sent to consumers)
// ============================================================================

/// Update emitted by the streaming engine
#[derive(Debug, Clone)]
pub enum JockmktUpdate {
    /// Connection lifecycle transition
    ConnectionStatus(ConnectionState),
    /// Authentication gained or lost
    AuthenticationStatus(bool),
    /// Tradeable changed on the focused event
    Tradeable {
        operation: Operation,
        tradeable: Tradeable,
    },
    /// Game changed in the focused league
    Game { operation: Operation, game: Game },
    /// The focused event itself changed
    Event { operation: Operation, event: Event },
    /// The account's entry into an event changed
    Entry { operation: Operation, entry: Entry },
    /// Account balance changed
    Balance {
        operation: Operation,
        balance: Balance,
    },
    /// An account position changed
    Position {
        operation: Operation,
        position: Position,
    },
    /// One of the account's own orders changed
    Order { operation: Operation, order: Order },
    /// A payout was issued to the account
    Payout {
        operation: Operation,
        payout: Payout,
    },
    /// A notification arrived for the first time
    NotificationReceived(Notification),
    /// An already-delivered notification was edited
    NotificationUpdated(Notification),
    /// Public activity on the focused event
    EventActivity {
        event_id: String,
        operation: Operation,
        activity: ActivityItem,
    },
}

/// One item on the public event activity feed
#[derive(Debug, Clone)]
pub enum ActivityItem {
    Order(PublicOrder),
    Trade(Trade),
    Join(Join),
}

// ============================================================================
// Collaborators: token source and connection intent
// ============================================================================

/// Consumer-held side of the session channels
///
/// The token and the intent flag are owned by the application's own auth
/// flow; the engine only ever reads them.
pub struct SessionController {
    token_tx: watch::Sender<Option<String>>,
    intent_tx: watch::Sender<bool>,
}

impl SessionController {
    /// Publish the current bearer token, or `None` when logged out
    pub fn set_token(&self, token: Option<String>) {
        let _ = self.token_tx.send(token);
    }

    /// Declare whether the engine should keep a connection alive
    ///
    /// Consulted at reconnect-decision time only; flipping this to false
    /// does not close an already-open connection.
    pub fn set_connection_intent(&self, connected: bool) {
        let _ = self.intent_tx.send(connected);
    }
}

/// Engine-held side of the session channels
pub struct Session {
    token_rx: watch::Receiver<Option<String>>,
    intent_rx: watch::Receiver<bool>,
}

impl Session {
    /// Create a controller/session pair with no token and no intent
    pub fn pair() -> (SessionController, Session) {
        let (token_tx, token_rx) = watch::channel(None);
        let (intent_tx, intent_rx) = watch::channel(false);
        (
            SessionController {
                token_tx,
                intent_tx,
            },
            Session {
                token_rx,
                intent_rx,
            },
        )
    }

    /// The token as of right now, if any
    pub fn current_token(&self) -> Option<String> {
        self.token_rx.borrow().clone()
    }

    /// Wait until a token is available
    ///
    /// Resolves to `None` only when the controller is gone and no token
    /// will ever arrive.
    pub async fn wait_for_token(&mut self) -> Option<String> {
        loop {
            if let Some(token) = self.token_rx.borrow_and_update().clone() {
                return Some(token);
            }
            if self.token_rx.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Whether the consumer currently wants a live connection
    pub fn should_stay_connected(&self) -> bool {
        *self.intent_rx.borrow()
    }
}

// ============================================================================
// Engine handle
// ============================================================================

/// Configuration for [`JockmktWebSocket`]
#[derive(Debug, Clone)]
pub struct JockmktWebSocketConfig {
    /// API host the streaming path is appended to
    pub host: String,
    /// Full endpoint override (staging, tests); takes precedence over `host`
    pub endpoint: Option<String>,
    /// Fixed delay before a reconnect attempt
    pub reconnect_delay: Duration,
}

impl Default for JockmktWebSocketConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            endpoint: None,
            reconnect_delay: RECONNECT_DELAY,
        }
    }
}

impl JockmktWebSocketConfig {
    fn streaming_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("wss://{}{}", self.host, STREAMING_PATH))
    }
}

/// Command from the handle to the engine task
enum EngineCommand {
    Connect,
    Disconnect,
    SetFocus(FocusChange),
}

/// Handle to the JockMkt streaming engine
///
/// Cheap to construct once at the composition root and share by reference;
/// all methods are non-blocking.
pub struct JockmktWebSocket {
    command_tx: mpsc::UnboundedSender<EngineCommand>,
    update_tx: broadcast::Sender<JockmktUpdate>,
}

impl JockmktWebSocket {
    /// Spawn the engine task and return its handle plus an update receiver
    pub fn new(
        config: JockmktWebSocketConfig,
        session: Session,
    ) -> (Self, broadcast::Receiver<JockmktUpdate>) {
        let (update_tx, update_rx) = broadcast::channel(1024);
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let engine = Engine {
            config,
            session,
            commands: command_rx,
            updates: update_tx.clone(),
            state: StreamSession::new(),
        };
        tokio::spawn(engine.run());

        (
            Self {
                command_tx,
                update_tx,
            },
            update_rx,
        )
    }

    /// Open the connection; a no-op when one is already open or opening
    pub fn connect(&self) {
        let _ = self.command_tx.send(EngineCommand::Connect);
    }

    /// Close the connection and cancel any pending reconnect
    pub fn disconnect(&self) {
        let _ = self.command_tx.send(EngineCommand::Disconnect);
    }

    /// Change the focused event and/or league
    ///
    /// Safe in any connection state: focus is retained and applied once the
    /// connection authenticates.
    pub fn set_focus(&self, change: FocusChange) {
        let _ = self.command_tx.send(EngineCommand::SetFocus(change));
    }

    /// Get another update receiver (for cloning to other tasks)
    pub fn subscribe_updates(&self) -> broadcast::Receiver<JockmktUpdate> {
        self.update_tx.subscribe()
    }
}

impl std::fmt::Debug for JockmktWebSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JockmktWebSocket").finish()
    }
}

// ============================================================================
// Engine task
// ============================================================================

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

struct Engine {
    config: JockmktWebSocketConfig,
    session: Session,
    commands: mpsc::UnboundedReceiver<EngineCommand>,
    updates: broadcast::Sender<JockmktUpdate>,
    state: StreamSession,
}

impl Engine {
    async fn run(mut self) {
        // At most one armed reconnect deadline; cleared by any command that
        // resolves the disconnected phase and re-armed on every close.
        let mut reconnect_at: Option<Instant> = None;

        loop {
            let deadline = reconnect_at.unwrap_or_else(Instant::now);
            let connect_now = tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(EngineCommand::Connect) => {
                        reconnect_at = None;
                        true
                    }
                    Some(EngineCommand::Disconnect) => {
                        reconnect_at = None;
                        false
                    }
                    Some(EngineCommand::SetFocus(change)) => {
                        let effects = self.state.set_focus(change);
                        forward_updates(&self.updates, effects);
                        false
                    }
                    None => return,
                },
                _ = tokio::time::sleep_until(deadline), if reconnect_at.is_some() => {
                    reconnect_at = None;
                    if self.session.should_stay_connected() {
                        info!("[JockMkt WS] Reconnecting");
                        true
                    } else {
                        debug!("[JockMkt WS] Skipping reconnect, connection no longer wanted");
                        false
                    }
                }
            };

            if !connect_now {
                continue;
            }

            self.run_connection().await;

            // Transport gone; try again after the fixed delay if the
            // consumer still wants a connection then.
            reconnect_at = Some(Instant::now() + self.config.reconnect_delay);
        }
    }

    /// Drive one connection from open to close
    async fn run_connection(&mut self) {
        let effects = self.state.on_connecting();
        forward_updates(&self.updates, effects);

        let url = match Url::parse(&self.config.streaming_url()) {
            Ok(url) => url,
            Err(e) => {
                error!("[JockMkt WS] Invalid endpoint: {}", e);
                let effects = self.state.on_disconnected();
                forward_updates(&self.updates, effects);
                return;
            }
        };

        info!("[JockMkt WS] Connecting to {}", url);
        let ws_stream = match connect_async(url).await {
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => {
                error!("[JockMkt WS] Connection failed: {}", e);
                let effects = self.state.on_disconnected();
                forward_updates(&self.updates, effects);
                return;
            }
        };

        info!("[JockMkt WS] Connected");
        let effects = self.state.on_connected();
        forward_updates(&self.updates, effects);

        let (mut write, mut read) = ws_stream.split();

        // The token may not exist yet (login in flight). Wait for it without
        // blocking frame handling; a close or an explicit disconnect while
        // waiting abandons the handshake.
        let token = loop {
            tokio::select! {
                token = self.session.wait_for_token() => break token,
                cmd = self.commands.recv() => match cmd {
                    Some(EngineCommand::SetFocus(change)) => {
                        let effects = self.state.set_focus(change);
                        forward_updates(&self.updates, effects);
                    }
                    Some(EngineCommand::Connect) => {}
                    Some(EngineCommand::Disconnect) | None => {
                        let _ = write.send(Message::Close(None)).await;
                        break None;
                    }
                },
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        let effects = self.state.handle_text(&text);
                        if !apply_effects(&mut write, &self.updates, effects).await {
                            break None;
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if write.send(Message::Pong(payload)).await.is_err() {
                            break None;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break None,
                    Some(Err(e)) => {
                        error!("[JockMkt WS] Error: {}", e);
                        break None;
                    }
                    Some(Ok(_)) => {}
                },
            }
        };

        let authenticated_send = match token {
            // Re-check the connection is still standing before sending
            Some(token) if self.state.connection_state() == ConnectionState::Connected => {
                send_command(&mut write, &ClientCommand::authenticate(token)).await
            }
            _ => false,
        };

        if authenticated_send {
            // Main traffic loop: inbound frames and focus commands, strictly
            // in arrival order.
            loop {
                tokio::select! {
                    cmd = self.commands.recv() => match cmd {
                        Some(EngineCommand::SetFocus(change)) => {
                            let effects = self.state.set_focus(change);
                            if !apply_effects(&mut write, &self.updates, effects).await {
                                break;
                            }
                        }
                        Some(EngineCommand::Connect) => {}
                        Some(EngineCommand::Disconnect) | None => {
                            info!("[JockMkt WS] Disconnecting");
                            let _ = write.send(Message::Close(None)).await;
                            break;
                        }
                    },
                    msg = read.next() => match msg {
                        Some(Ok(Message::Text(text))) => {
                            let effects = self.state.handle_text(&text);
                            if !apply_effects(&mut write, &self.updates, effects).await {
                                break;
                            }
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            if write.send(Message::Pong(payload)).await.is_err() {
                                warn!("[JockMkt WS] Failed to send pong");
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            info!("[JockMkt WS] Connection closed by server");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!("[JockMkt WS] Error: {}", e);
                            break;
                        }
                        None => {
                            info!("[JockMkt WS] Stream ended");
                            break;
                        }
                    },
                }
            }
        }

        let effects = self.state.on_disconnected();
        forward_updates(&self.updates, effects);
    }
}

/// Send one command frame; false when the transport is gone
async fn send_command(write: &mut WsSink, command: &ClientCommand) -> bool {
    match serde_json::to_string(command) {
        Ok(json) => {
            debug!("[JockMkt WS] Sending: {}", json);
            if let Err(e) = write.send(Message::Text(json.into())).await {
                warn!("[JockMkt WS] Failed to send command: {}", e);
                return false;
            }
            true
        }
        Err(e) => {
            error!("[JockMkt WS] Failed to encode command: {}", e);
            true
        }
    }
}

/// Carry out session effects against a live transport
///
/// Returns false once the connection must be torn down.
async fn apply_effects(
    write: &mut WsSink,
    updates: &broadcast::Sender<JockmktUpdate>,
    effects: Vec<Effect>,
) -> bool {
    for effect in effects {
        match effect {
            Effect::Send(command) => {
                if !send_command(write, &command).await {
                    return false;
                }
            }
            Effect::Emit(update) => {
                let _ = updates.send(update);
            }
            Effect::Close => {
                let _ = write.send(Message::Close(None)).await;
                return false;
            }
        }
    }
    true
}

/// Carry out session effects with no transport present
fn forward_updates(updates: &broadcast::Sender<JockmktUpdate>, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::Emit(update) => {
                let _ = updates.send(update);
            }
            Effect::Send(command) => {
                debug!("[JockMkt WS] Dropping command while offline: {:?}", command);
            }
            Effect::Close => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_url_derived_from_host() {
        let config = JockmktWebSocketConfig::default();
        assert_eq!(config.streaming_url(), "wss://api.jockmkt.net/streaming");

        let config = JockmktWebSocketConfig {
            host: "stage.api.jockmkt.net".into(),
            ..Default::default()
        };
        assert_eq!(
            config.streaming_url(),
            "wss://stage.api.jockmkt.net/streaming"
        );
    }

    #[test]
    fn endpoint_override_wins() {
        let config = JockmktWebSocketConfig {
            endpoint: Some("ws://127.0.0.1:9999/streaming".into()),
            ..Default::default()
        };
        assert_eq!(config.streaming_url(), "ws://127.0.0.1:9999/streaming");
    }

    #[tokio::test]
    async fn wait_for_token_resolves_once_published() {
        let (controller, mut session) = Session::pair();
        assert!(session.current_token().is_none());

        let wait = tokio::spawn(async move { session.wait_for_token().await });
        controller.set_token(Some("jm_tok_1".into()));
        let token = wait.await.unwrap();
        assert_eq!(token.as_deref(), Some("jm_tok_1"));
    }

    #[tokio::test]
    async fn wait_for_token_gives_up_when_controller_dropped() {
        let (controller, mut session) = Session::pair();
        drop(controller);
        assert!(session.wait_for_token().await.is_none());
    }

    #[test]
    fn connection_intent_defaults_to_false() {
        let (controller, session) = Session::pair();
        assert!(!session.should_stay_connected());
        controller.set_connection_intent(true);
        assert!(session.should_stay_connected());
    }
}
