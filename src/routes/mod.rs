//! API Routes Module
//!
//! HTTP endpoint handlers.
//!
//! # Routes
//! - `GET  /health` - server and dependency status
//! - `POST /api/search` - filtered, ranked, faceted candidate search
//! - `POST /api/unlock` - spend a credit to reveal an anonymized profile
//! - `GET  /api/unlock/:company_id/:candidate_id` - unlock status probe
//! - `GET  /api/balance/:company_id` - current credit balance

pub mod health;
pub mod search;
pub mod unlock;
