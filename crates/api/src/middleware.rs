use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use gatekeeper_auth::{Decision, DecisionEngine};

use crate::config::ConfigError;
use crate::context::PrincipalContext;
use crate::credentials::{RequestCredentials, clearing_cookie};
use crate::excluded::ExcludedPaths;

#[derive(Clone)]
pub struct GateState {
    engine: Arc<DecisionEngine>,
    excluded: Arc<ExcludedPaths>,
    cookie_name: Arc<str>,
    clear_cookie: HeaderValue,
}

impl GateState {
    pub fn new(
        engine: Arc<DecisionEngine>,
        excluded: ExcludedPaths,
        cookie_name: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            engine,
            excluded: Arc::new(excluded),
            cookie_name: Arc::from(cookie_name),
            clear_cookie: clearing_cookie(cookie_name)?,
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}

/// Runs the access decision before any handler.
///
/// Redirects and denials are `307 Temporary Redirect`; a denial points at the
/// not-found page rather than answering 403.
pub async fn gate_middleware(State(state): State<GateState>, req: Request, next: Next) -> Response {
    if state.excluded.matches(req.uri().path()) {
        return next.run(req).await;
    }

    let request_id = Uuid::now_v7();
    let span = tracing::info_span!("gate", %request_id, path = %req.uri().path());
    gate(state, req, next).instrument(span).await
}

async fn gate(state: GateState, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut credentials = RequestCredentials::from_headers(req.headers(), state.cookie_name());
    let evaluation = state.engine.enforce(&path, &mut credentials, Utc::now());

    let mut response = match evaluation.decision {
        Decision::Allow { .. } => {
            if let Some(claims) = evaluation.claims {
                req.extensions_mut().insert(PrincipalContext::from(claims));
            }
            next.run(req).await
        }
        Decision::Redirect { target, .. } | Decision::Deny { target } => {
            Redirect::temporary(&target).into_response()
        }
    };

    if credentials.clear_requested() {
        response
            .headers_mut()
            .append(header::SET_COOKIE, state.clear_cookie.clone());
    }

    response
}
