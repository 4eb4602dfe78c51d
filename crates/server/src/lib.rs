use api_types::ErrorBody;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

pub use server::{Actor, app, run, run_with_listener, spawn_with_listener};

mod balance;
mod categories;
mod entries;
mod ledger;
mod reports;
mod server;
mod views;

pub enum ServerError {
    Engine(EngineError),
    /// The request could not be extracted (malformed JSON, wrong types,
    /// missing fields).
    Rejected(StatusCode, String),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ConcurrencyConflict(_) => StatusCode::CONFLICT,
        EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation { .. }
        | EngineError::InsufficientBalance { .. }
        | EngineError::InvalidCursor(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorBody {
    let field = err.field().map(str::to_string);
    let error = match err {
        EngineError::Storage(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::ConcurrencyConflict(reason) => {
            tracing::warn!("write conflict: {reason}");
            "the ledger is busy, try again".to_string()
        }
        other => other.to_string(),
    };
    ErrorBody { error, field }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Rejected(status, error) => {
                tracing::debug!(%status, "rejected request: {error}");
                (status, ErrorBody { error, field: None })
            }
            ServerError::Generic(error) => (StatusCode::BAD_REQUEST, ErrorBody { error, field: None }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejected(rejection.status(), rejection.body_text())
    }
}
