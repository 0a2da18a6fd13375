//! Query endpoint and its wire types.
//!
//! - `POST /query`: answer a question, threading the caller's state token
//!
//! Field aliases (`q`, `previousText`, `nologging`) keep older clients working.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use threadline_agent::{QueryRequest, QueryResponse};
use threadline_core::error::Error;
use threadline_core::state::StateToken;

use crate::SharedState;

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    #[serde(alias = "q")]
    pub question: String,

    /// Omitted, null and `""` all start a new conversation.
    #[serde(default, alias = "previousText")]
    pub prior_state: Option<String>,

    #[serde(default, alias = "nologging")]
    pub suppress_audit: Option<bool>,
}

impl From<QueryBody> for QueryRequest {
    fn from(body: QueryBody) -> Self {
        QueryRequest {
            question: body.question,
            prior_state: body.prior_state.map(StateToken::from),
            suppress_audit: body.suppress_audit.unwrap_or(false),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
}

/// A failed request, rendered as `{"error":{"kind","message"}}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_request",
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = if err.is_timeout() {
            StatusCode::GATEWAY_TIMEOUT
        } else {
            match &err {
                Error::StateDecode(_) => StatusCode::BAD_REQUEST,
                Error::Retrieval(_) => StatusCode::SERVICE_UNAVAILABLE,
                Error::Generation(_) => StatusCode::BAD_GATEWAY,
                Error::Config { .. } | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        };
        Self {
            status,
            kind: err.kind().as_str(),
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.kind.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn query_handler(
    State(state): State<SharedState>,
    payload: Result<Json<QueryBody>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(body) = payload?;
    if body.question.trim().is_empty() {
        return Err(ApiError::invalid_request("question must not be empty"));
    }

    info!(
        question_len = body.question.len(),
        has_state = body.prior_state.as_deref().is_some_and(|s| !s.trim().is_empty()),
        "Query received"
    );

    match state.orchestrator.query(body.into()).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            warn!(kind = %e.kind(), error = %e, "Query failed");
            Err(e.into())
        }
    }
}
