//! Noteblog Server: per-visitor sessions and application context for the
//! Noteblog CMS.
//!
//! The service crate owns the session store, registry and account flows;
//! the HTTP crate adapts them to axum. This crate wires both to the
//! command line.

pub mod config;

pub use noteblog_http::{AppState, router, serve};
pub use noteblog_service::ServiceState;
