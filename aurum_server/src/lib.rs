//! # Aurum Server
//!
//! HTTP boundary for the gold price predictor. Loads a
//! [`PredictionContext`](aurum_forecast::PredictionContext) at startup and
//! serves it over a small JSON API.

pub mod config;
pub mod logging;
pub mod routes;
pub mod server;
pub mod state;

pub use crate::config::AppConfig;
pub use crate::routes::{api_router, ApiError};
pub use crate::server::run_server;
pub use crate::state::AppState;
