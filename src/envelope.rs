use axum::{
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Uniform `{code, message, data, success}` wrapper around every response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: String,
    pub message: String,
    pub data: Option<T>,
    pub success: bool,
}

impl<T> Envelope<T> {
    pub fn success(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            code: status.as_u16().to_string(),
            message: message.into(),
            data: Some(data),
            success: true,
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16().to_string(),
            message: message.into(),
            data: None,
            success: false,
        }
    }
}

/// Successful handler output, rendered as an [`Envelope`].
#[derive(Debug)]
pub struct Reply<T> {
    status: StatusCode,
    message: String,
    data: T,
}

impl<T: Serialize> Reply<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message: "Success".into(),
            data,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            message: "Created".into(),
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(Envelope::success(self.status, self.message, self.data)),
        )
            .into_response()
    }
}

/// `Json` extractor whose rejection is rendered in the envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` extractor whose rejection is rendered in the envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// `Path` extractor whose rejection is rendered in the envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
