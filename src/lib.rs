//! Loan management REST API.
//!
//! Customers, their loans, and the payments that pay those loans down,
//! behind a static API key.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: `Authorization: Api-Key <key>`, keys hashed with SHA-256
//! - **Money**: exact decimals (`rust_decimal`), never floats
//! - **Format**: JSON requests/responses (forms also accepted for writes)

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::build_router;
