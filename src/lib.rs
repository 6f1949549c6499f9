//! Talent Search API Library
//!
//! Search and access-control core of a board-director talent marketplace.
//! The surrounding application (sign-up funnels, admin back office,
//! billing) is an external caller; this crate owns candidate search and
//! the credit-gated unlock of anonymized profiles.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                          API                             │
//! │                                                          │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐    │
//! │  │ Routes  │  │Services │  │   DB    │  │  Types  │    │
//! │  └────┬────┘  └────┬────┘  └────┬────┘  └────┬────┘    │
//! │       │            │            │            │          │
//! │       └────────────┴────────────┴────────────┘          │
//! │                         │                                │
//! └─────────────────────────┼────────────────────────────────┘
//!                           │
//!                           ▼
//!                  ┌────────────────┐
//!                  │   PostgreSQL   │
//!                  └────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: environment configuration, scoring weight tuning
//! - `error`: error taxonomy and HTTP mapping
//! - `routes`: HTTP endpoint handlers
//! - `services`: normalizer, scoring, facets, unlock/access control
//! - `db`: PostgreSQL access and the store traits
//! - `types`: closed domain enums

use std::sync::Arc;

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use db::Database;
pub use error::ApiError;

/// Application-wide shared state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
}
