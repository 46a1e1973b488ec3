//! JockMkt API client
//!
//! Provides methods for interacting with the JockMkt REST API: token
//! exchange, event and game catalogs, entries, orders, and positions.
//! All endpoints except the token exchange require a bearer token.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use arena_core::{
    ArenaError, ArenaResult, Balance, Entry, Event, Game, League, Order, Position, Tradeable,
};

use crate::types::{
    Account, AccountResponse, AuthToken, BalancesResponse, EntriesResponse, EntryResponse,
    EventGamesResponse, EventResponse, EventTradeablesResponse, EventsResponse, GameResponse,
    GamesResponse, OrderResponse, OrdersResponse, PlaceOrderRequest, PositionsResponse,
    TokenResponse,
};

/// Base URL for the JockMkt API
const JOCKMKT_API_BASE: &str = "https://api.jockmkt.net/v1";

/// JockMkt API client
#[derive(Clone)]
pub struct JockmktClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl JockmktClient {
    /// Create a new client with no token (call [`Self::create_token`] or
    /// [`Self::with_token`] before hitting authenticated endpoints)
    pub fn new() -> Self {
        Self::with_base_url(JOCKMKT_API_BASE)
    }

    /// Create a client against a non-default base URL (staging, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Create a client around an existing bearer token
    pub fn with_token(token: impl Into<String>) -> Self {
        let mut client = Self::new();
        client.token = Some(token.into());
        client
    }

    /// Replace the bearer token (e.g. after a refresh)
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange an api key/secret pair for a bearer token
    ///
    /// The token is stored on the client for subsequent calls and returned
    /// so it can also be published to the streaming engine's token source.
    #[instrument(skip(self, api_key, secret_key))]
    pub async fn create_token(
        &mut self,
        api_key: &str,
        secret_key: &str,
    ) -> ArenaResult<AuthToken> {
        let url = format!("{}/oauth/tokens", self.base_url);
        debug!("Requesting token from: {}", url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("key", api_key),
                ("secret", secret_key),
            ])
            .send()
            .await
            .map_err(|e| ArenaError::network(format!("Failed to request token: {}", e)))?;

        if !response.status().is_success() {
            return Err(ArenaError::auth(
                "Token exchange rejected; check api key and secret",
            ));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| ArenaError::parse(format!("Failed to parse token response: {}", e)))?;

        self.token = Some(token_response.token.access_token.clone());
        Ok(token_response.token)
    }

    /// Get the account profile
    #[instrument(skip(self))]
    pub async fn get_account(&self) -> ArenaResult<Account> {
        let response: AccountResponse = self.get("account", &[]).await?;
        Ok(response.account)
    }

    /// Get the account's currency balances
    #[instrument(skip(self))]
    pub async fn get_balances(&self) -> ArenaResult<Vec<Balance>> {
        let response: BalancesResponse = self.get("balances", &[]).await?;
        Ok(response.balances)
    }

    /// List events, optionally filtered by league
    #[instrument(skip(self))]
    pub async fn get_events(
        &self,
        league: Option<League>,
        start: u64,
        limit: u64,
    ) -> ArenaResult<Vec<Event>> {
        let mut query = vec![
            ("start", start.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(league) = league {
            query.push(("league", league.as_str().to_string()));
        }
        let response: EventsResponse = self.get("events", &query).await?;
        Ok(response.events)
    }

    /// Get a single event by id
    #[instrument(skip(self))]
    pub async fn get_event(&self, event_id: &str) -> ArenaResult<Event> {
        let response: EventResponse = self.get(&format!("events/{}", event_id), &[]).await?;
        Ok(response.event)
    }

    /// Get the tradeables in an event
    #[instrument(skip(self))]
    pub async fn get_event_tradeables(&self, event_id: &str) -> ArenaResult<Vec<Tradeable>> {
        let response: EventTradeablesResponse = self
            .get(&format!("events/{}/tradeables", event_id), &[])
            .await?;
        Ok(response.tradeables)
    }

    /// Get the games underlying an event
    #[instrument(skip(self))]
    pub async fn get_event_games(&self, event_id: &str) -> ArenaResult<Vec<Game>> {
        let response: EventGamesResponse =
            self.get(&format!("events/{}/games", event_id), &[]).await?;
        Ok(response.games)
    }

    /// List games, optionally filtered by league
    #[instrument(skip(self))]
    pub async fn get_games(
        &self,
        league: Option<League>,
        start: u64,
        limit: u64,
    ) -> ArenaResult<Vec<Game>> {
        let mut query = vec![
            ("start", start.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(league) = league {
            query.push(("league", league.as_str().to_string()));
        }
        let response: GamesResponse = self.get("games", &query).await?;
        Ok(response.games)
    }

    /// Get a single game by id
    #[instrument(skip(self))]
    pub async fn get_game(&self, game_id: &str) -> ArenaResult<Game> {
        let response: GameResponse = self.get(&format!("games/{}", game_id), &[]).await?;
        Ok(response.game)
    }

    /// List the account's event entries
    #[instrument(skip(self))]
    pub async fn get_entries(&self, start: u64, limit: u64) -> ArenaResult<Vec<Entry>> {
        let query = vec![
            ("start", start.to_string()),
            ("limit", limit.to_string()),
        ];
        let response: EntriesResponse = self.get("entries", &query).await?;
        Ok(response.entries)
    }

    /// Enter the account into an event
    #[instrument(skip(self))]
    pub async fn create_entry(&self, event_id: &str) -> ArenaResult<Entry> {
        let response: EntryResponse = self
            .post("entries", &[("event_id", event_id.to_string())])
            .await?;
        Ok(response.entry)
    }

    /// List the account's orders
    #[instrument(skip(self))]
    pub async fn get_orders(
        &self,
        event_id: Option<&str>,
        active: bool,
    ) -> ArenaResult<Vec<Order>> {
        let mut query = Vec::new();
        if let Some(event_id) = event_id {
            query.push(("event_id", event_id.to_string()));
        }
        if active {
            query.push(("active", "true".to_string()));
        }
        let response: OrdersResponse = self.get("orders", &query).await?;
        Ok(response.orders)
    }

    /// Place a limit order
    #[instrument(skip(self, request))]
    pub async fn place_order(&self, request: &PlaceOrderRequest) -> ArenaResult<Order> {
        let url = format!("{}/orders", self.base_url);
        debug!("Placing order at: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bearer()?)
            .form(request)
            .send()
            .await
            .map_err(|e| ArenaError::network(format!("Failed to place order: {}", e)))?;

        let response: OrderResponse = Self::handle_response(response).await?;
        Ok(response.order)
    }

    /// Request cancellation of an order
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: &str) -> ArenaResult<Order> {
        let url = format!("{}/orders/{}", self.base_url, order_id);
        debug!("Cancelling order at: {}", url);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(|e| ArenaError::network(format!("Failed to cancel order: {}", e)))?;

        let response: OrderResponse = Self::handle_response(response).await?;
        Ok(response.order)
    }

    /// Get the account's positions
    #[instrument(skip(self))]
    pub async fn get_positions(&self) -> ArenaResult<Vec<Position>> {
        let response: PositionsResponse = self.get("positions", &[]).await?;
        Ok(response.positions)
    }

    // ------------------------------------------------------------------
    // Request plumbing
    // ------------------------------------------------------------------

    fn bearer(&self) -> ArenaResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| ArenaError::auth("No token; call create_token first"))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ArenaResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {}", url);

        let mut request = self.client.get(&url).bearer_auth(self.bearer()?);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ArenaError::network(format!("Request to {} failed: {}", path, e)))?;

        Self::handle_response(response).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> ArenaResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bearer()?)
            .form(form)
            .send()
            .await
            .map_err(|e| ArenaError::network(format!("Request to {} failed: {}", path, e)))?;

        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ArenaResult<T> {
        if response.status().as_u16() == 404 {
            return Err(ArenaError::not_found(format!(
                "Resource not found: {}",
                response.url()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ArenaError::api(format!(
                "JockMkt API error ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ArenaError::parse(format!("Failed to parse response: {}", e)))
    }
}

impl Default for JockmktClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JockmktClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JockmktClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
