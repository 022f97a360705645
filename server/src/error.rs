use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum PlantNetError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Document encoding error: {0}")]
    BsonEncode(#[from] mongodb::bson::ser::Error),

    #[error("Document decoding error: {0}")]
    BsonDecode(#[from] mongodb::bson::de::Error),

    #[error("unauthorized access")]
    Unauthorized,

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl ResponseError for PlantNetError {
    fn status_code(&self) -> StatusCode {
        match self {
            PlantNetError::Unauthorized => StatusCode::UNAUTHORIZED,
            PlantNetError::InvalidId(_) => StatusCode::BAD_REQUEST,
            PlantNetError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PlantNetError::Conflict(_) => StatusCode::CONFLICT,
            PlantNetError::NotFound(_) => StatusCode::NOT_FOUND,
            PlantNetError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlantNetError::BsonEncode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlantNetError::BsonDecode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlantNetError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlantNetError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {:?}", self);
        }

        let error_response = ErrorResponse {
            success: false,
            error: self.to_string(),
        };

        HttpResponse::build(status).json(error_response)
    }
}

pub type Result<T> = std::result::Result<T, PlantNetError>;
