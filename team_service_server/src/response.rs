use axum::response::{IntoResponse, Response};
use axum::http::StatusCode;
use serde::{Serialize, Deserialize};
use tracing::error;

use team_service_entities::DomainError;


#[derive(Debug, Clone)]
pub struct APIError {
    pub message: String,
    pub code: StatusCode,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct APIErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

impl APIError {
    pub fn new(message: String) -> Self {
        APIError {
            message,
            code: StatusCode::INTERNAL_SERVER_ERROR,
            errors: None,
        }
    }
}

impl From<DomainError> for APIError {
    fn from(err: DomainError) -> Self {
        let code = match &err {
            DomainError::Validation(_) | DomainError::InvalidReference => StatusCode::BAD_REQUEST,
            DomainError::NotFound
            | DomainError::TournamentNotFound
            | DomainError::NoTeamsFound => StatusCode::NOT_FOUND,
            DomainError::DuplicateName | DomainError::DuplicateMembership => StatusCode::CONFLICT,
            DomainError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        match err {
            DomainError::Validation(errors) => APIError {
                message: "Invalid data".to_string(),
                code,
                errors: Some(errors),
            },
            DomainError::Persistence(db_err) => {
                error!("Error while handling request {}", db_err);
                APIError { message: "Internal server error".to_string(), code, errors: None }
            }
            other => APIError { message: other.to_string(), code, errors: None },
        }
    }
}

impl IntoResponse for APIError
{
    fn into_response(self) -> Response {
        let mut res = axum::Json(APIErrorResponse {
            message: self.message.clone(),
            errors: self.errors.clone(),
        }).into_response();
        *res.status_mut() = self.code;
        res
    }
}


impl From<(StatusCode, &str)> for APIError {
    fn from((code, message): (StatusCode, &str)) -> Self {
        error!("Error while handling request {}", message);
        APIError { message: message.to_string(), code, errors: None }
    }
}

impl From<(StatusCode, String)> for APIError {
    fn from((code, message): (StatusCode, String)) -> Self {
        error!("Error while handling request {}", message);
        APIError { message, code, errors: None }
    }
}

pub fn handle_error<E>(err: E) -> APIError
where
    E: std::error::Error
{
    error!("Error while handling request {}", err);
    APIError::new(err.to_string())
}

/// Uniform body for routes that only confirm an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        MessageResponse { message: message.to_string() }
    }
}
