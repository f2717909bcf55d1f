use axum::http::StatusCode;
use axum::response::{ IntoResponse, Response };
use axum::Json;
use log::error;

use crate::models::RelayResponse;
use crate::relay::RelayError;

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        if let RelayError::InternalError(cause) = &self {
            error!("Chat API error: {}", cause);
        }

        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
        let body = RelayResponse::Failure { error: self.to_string() };

        (status, Json(body)).into_response()
    }
}
