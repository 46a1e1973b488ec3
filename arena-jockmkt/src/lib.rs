//! JockMkt integration for the Arena fantasy sports trading terminal
//!
//! This crate provides a client for interacting with the JockMkt API,
//! including event and market data retrieval, order management, and the
//! real-time WebSocket streaming engine.

pub mod client;
pub mod types;
pub mod websocket;

pub use client::JockmktClient;
pub use websocket::{
    ActivityItem, JockmktUpdate, JockmktWebSocket, JockmktWebSocketConfig, Session,
    SessionController,
};
