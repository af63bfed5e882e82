//! Catalog backend library
//!
//! Item catalog API with bearer-token authentication. Exposes the backend
//! modules for the binary and the integration tests.

pub mod auth;
pub mod cleanup;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
