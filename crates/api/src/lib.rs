//! HTTP gatekeeper: configuration, credential extraction and the gate middleware.

pub mod app;
pub mod config;
pub mod context;
pub mod credentials;
pub mod excluded;
pub mod middleware;
