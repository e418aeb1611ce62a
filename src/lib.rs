//! pgo-status - namespace status reports for a PostgreSQL operator.
//!
//! The `serve` side reads Kubernetes objects and aggregates them into a
//! [`status::StatusReport`]; the client side queries an operator API server
//! and renders its responses.

pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod k8s;
pub mod logging;
pub mod metrics;
pub mod output;
pub mod quantity;
pub mod server;
pub mod status;
