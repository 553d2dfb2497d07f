//! HTTP middleware: request ID tracking and session resolution.

pub mod request_id;
pub mod session;
