//! Growth Calculation Module
//!
//! Computes two parallel growth sequences for a positive base `B` and an
//! exponent `E` in `[1, 100]`: linear growth (`B×1 … B×E`) and exponential
//! growth (`B^1 … B^E`). Results are exposed through a synchronous REST
//! endpoint and a server-sent event stream with a fixed cadence between
//! steps. Every run is journaled to an append-only event log.
//!
//! ## Layering
//!
//! - `domain` - calculation engine, growth step generator, store ports
//! - `api` - REST handlers, DTOs, SSE transport, OpenAPI document
//! - `infra` - SeaORM-backed implementations of the store ports
//!
//! The engine depends only on the `domain::ports` traits; `test_support`
//! provides in-memory fakes with failure injection for isolated testing.

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
pub mod test_support;
mod util;
