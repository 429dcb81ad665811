//! HTTP application wiring (Axum router + gate).
//!
//! - `routes.rs`: placeholder page handlers standing in for the application
//!   behind the gate

use std::sync::Arc;

use axum::{Router, routing::get};

use gatekeeper_auth::{DecisionEngine, HmacJwtCodec, PolicyTable};

use crate::config::{ConfigError, GatekeeperConfig};
use crate::excluded::ExcludedPaths;
use crate::middleware::{self, GateState};

pub mod routes;

/// Build the decision engine from configuration. Policy validation happens
/// here, so a bad policy fails process start.
pub fn build_engine(config: &GatekeeperConfig) -> Result<DecisionEngine, ConfigError> {
    let policy = PolicyTable::from_config(config.policy.clone())?;
    let codec = HmacJwtCodec::with_algorithm(config.jwt_secret.as_bytes(), config.jwt_algorithm);
    Ok(DecisionEngine::new(policy, codec))
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &GatekeeperConfig) -> Result<Router, ConfigError> {
    let engine = Arc::new(build_engine(config)?);
    let gate_state = GateState::new(engine, ExcludedPaths::default(), &config.cookie_name)?;

    // Everything except the health probe goes through the gate, fallback included.
    let gated = routes::router().layer(axum::middleware::from_fn_with_state(
        gate_state,
        middleware::gate_middleware,
    ));

    Ok(Router::new()
        .route("/health", get(routes::health))
        .merge(gated))
}
