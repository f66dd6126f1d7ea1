//! helpdeskd - IT service desk daemon
//!
//! Repair tickets, Zoom meeting bookings and procurement work orders behind
//! a JSON HTTP API. Lifecycle rules live in `helpdesk_shared`; this crate
//! persists, notifies and serves.

pub mod cli;
pub mod config;
pub mod desk;
pub mod notifier;
pub mod routes;
pub mod seed;
pub mod server;
pub mod store;

pub use config::Config;
pub use desk::Desk;
pub use server::AppState;
