//! HTTP surface of the deployment receiver: one authenticated upload
//! endpoint plus health and metrics, behind tracing, timeout, body-limit,
//! and compression layers.

pub mod handlers;
pub mod responses;
pub mod server;

pub use server::start_server;
