//! Request body extractor for write endpoints.
//!
//! Create endpoints accept the same fields as JSON, as an urlencoded form, or
//! as multipart form data. The content type picks the decoder.

use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;

/// Body decoded from JSON, `application/x-www-form-urlencoded` or
/// `multipart/form-data`.
#[derive(Debug, Clone)]
pub struct JsonOrForm<T>(pub T);

impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
            return Ok(Self(value));
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
            return Ok(Self(value));
        }

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
            return multipart_fields(multipart).await.map(Self);
        }

        Err(AppError::UnsupportedMediaType)
    }
}

/// Collect text fields of a multipart body and decode them as `T`.
async fn multipart_fields<T: DeserializeOwned>(mut multipart: Multipart) -> Result<T, AppError> {
    let mut fields = Map::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let text = field
            .text()
            .await
            .map_err(|e| AppError::InvalidRequest(e.body_text()))?;
        fields.insert(name, Value::String(text));
    }

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::InvalidRequest(format!("Failed to deserialize form body: {e}")))
}
