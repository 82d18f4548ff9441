//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /del/:key` - Delete a key
//! - `PUT /expire/:key` - Replace a key's expiration
//! - `POST /incr/:key` - Atomically increment an integer value
//! - `GET /stats` - Get cache statistics
//! - `GET /metrics` - Prometheus text exposition
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
