//! Match-day workflow for a youth soccer league: attendance validation,
//! substitution registration and result recording against the league's
//! JSON API.

pub mod config;
pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use services::league_api::{HttpLeagueApi, LeagueApi};
pub use state::AppState;
