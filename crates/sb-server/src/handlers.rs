//! HTTP handlers.

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use serde_json::Value;

use sb_session::{SessionId, UserIdentity};

use crate::error::{ApiError, ApiResult};
use crate::extract::SessionCookie;
use crate::state::AppState;

/// Server information response.
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    name: &'static str,
    version: &'static str,
    message: &'static str,
}

/// Root endpoint handler.
pub async fn root() -> Json<ServerInfo> {
    Json(ServerInfo {
        name: "Session Bridge",
        version: env!("CARGO_PKG_VERSION"),
        message: "Companion API sharing the Identity Service session",
    })
}

/// Returns the identity behind the session cookie, or 401.
pub async fn current_user(
    State(state): State<AppState>,
    SessionCookie(session_id): SessionCookie,
) -> ApiResult<Json<UserIdentity>> {
    state
        .resolver
        .resolve(session_id.as_ref())
        .await
        .map(Json)
        .ok_or(ApiError::Unauthorized)
}

/// Session data response.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SessionResponse {
    /// A session record exists.
    Found {
        /// Identifier the record was found under.
        session_id: SessionId,
        /// Record with sensitive keys removed.
        session_data: BTreeMap<String, Value>,
    },
    /// No cookie, no readable record, or an empty record.
    Missing {
        /// Always `null`.
        session: Option<()>,
    },
}

/// Returns the filtered session record behind the cookie.
pub async fn session_data(
    State(state): State<AppState>,
    SessionCookie(session_id): SessionCookie,
) -> Json<SessionResponse> {
    let Some(session_id) = session_id else {
        return Json(SessionResponse::Missing { session: None });
    };

    match state.resolver.load_record(&session_id).await {
        Some(record) if !record.is_empty() => Json(SessionResponse::Found {
            session_data: record.project(&state.filter),
            session_id,
        }),
        _ => Json(SessionResponse::Missing { session: None }),
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    store: String,
    directory: String,
}

/// Reports the reachability of both backends.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (store, directory) = tokio::join!(state.store.ping(), state.directory.ping());

    let healthy = store.is_ok() && directory.is_ok();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        store: describe(store),
        directory: describe(directory),
    };
    (status, Json(body))
}

fn describe<E: std::fmt::Display>(result: Result<(), E>) -> String {
    match result {
        Ok(()) => "ok".to_string(),
        Err(e) => format!("error: {e}"),
    }
}

/// Kubernetes liveness probe.
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe.
///
/// Ready once the session store answers PING. The directory is not checked.
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match state.store.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
