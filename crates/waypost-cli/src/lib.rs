//! # Waypost Server
//!
//! HTTP surface over [`waypost_store`] for the travel journal.
//!
//! This crate provides:
//! - **Media route**: full and byte-range delivery of stored files
//! - **Uploads**: staging into `tmp`, promotion into permanent buckets
//! - **Middleware**: request ids, request logging, per-client rate limiting
//! - **Sweeper**: removal of staged uploads that were never promoted
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Browser / journal frontend       │
//! └────────────────────┬────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────┐
//! │  Request ID │ Logging │ Rate Limiter    │
//! ├─────────────────────────────────────────┤
//! │  GET /files/*   POST /uploads[/promote] │
//! ├─────────────────────────────────────────┤
//! │              waypost-store              │
//! └─────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod sweeper;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorCode};
pub use server::{run_server, run_server_with_shutdown};
pub use state::AppState;
