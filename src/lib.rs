//! # Order Sync Library
//!
//! Obtains marketplace credentials, lists orders and forwards a fixed
//! projection of each order to a hosted table store.
//!
//! Modules:
//! - `config` — YAML service configuration and validation
//! - `auth` — LWA token exchange, STS role assumption, SigV4 signing
//! - `orders` — order and order-item listing
//! - `forwarder` — destination record projection and create calls
//! - `pipeline` — one sync run composed from the above
//! - `server` — health, probe and sync HTTP endpoints

pub mod auth;
pub mod config;
pub mod error;
pub mod forwarder;
pub mod helpers;
pub mod observability;
pub mod orders;
pub mod pipeline;
pub mod server;
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use crate::config::service::ServiceConfig;
pub use crate::error::{AuthError, ForwardError, SyncError, UpstreamError};
pub use crate::pipeline::{SyncPipeline, SyncReport};
