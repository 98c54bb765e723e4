//! API Module
//!
//! HTTP handlers and routing exposing the cache and its diagnostics.
//!
//! # Endpoints
//! - `PUT /cache` - Store a key-value pair
//! - `GET /cache/:key` - Retrieve a value by key
//! - `DELETE /cache/:key` - Delete a key
//! - `POST /cache/mget` / `PUT /cache/mset` - Batch operations
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
