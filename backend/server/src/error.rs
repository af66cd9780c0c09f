use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Data source unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::StoreUnavailable { .. } | AppError::Database { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("{self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("Dish").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InvalidRequest("query is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::StoreUnavailable("down".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Database(sqlx::Error::PoolTimedOut).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_pass_through() {
        assert_eq!(AppError::NotFound("Restaurant").to_string(), "Restaurant not found");
        assert_eq!(
            AppError::StoreUnavailable("reading data/dishes.json".into()).to_string(),
            "Data source unavailable: reading data/dishes.json"
        );
    }
}
