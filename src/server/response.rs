use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::error;

use crate::error::CatalogError;

/// `{"<field>": ["<message>"]}`
fn field_error(field: &str, message: &str) -> Value {
    let mut body = Map::new();
    body.insert(field.to_string(), json!([message]));
    Value::Object(body)
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            CatalogError::Validation { field, message } => {
                (StatusCode::BAD_REQUEST, field_error(field, message))
            }
            CatalogError::Conflict(_) => (
                StatusCode::BAD_REQUEST,
                field_error("name", "planet with this name already exists."),
            ),
            CatalogError::InvalidPopulation { value, .. } => (
                StatusCode::BAD_REQUEST,
                field_error("population", &format!("{} is not a valid population.", value)),
            ),
            CatalogError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "detail": "Not found." })),
            CatalogError::Fetch(_) | CatalogError::MalformedResponse(_) => {
                error!("{}", self);
                (StatusCode::BAD_GATEWAY, json!({ "detail": self.to_string() }))
            }
            CatalogError::Database(_) | CatalogError::Internal(_) => {
                error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": self.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
