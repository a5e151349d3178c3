//! # Juz Tracker Library
//!
//! Core of the Juz reading tracker service: the tenant-scoped domain,
//! persistence, identity integration and HTTP surface.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub mod tracker;
pub use migration;
