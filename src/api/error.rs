use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use std::borrow::Cow;

use crate::modules::classification::model::ClassifyError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Internal Server Error")]
    InternalServer,
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub message: Cow<'static, str>,
}

impl Error {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match *self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut res = HttpResponse::build(self.status_code());

        match self {
            // Has Message
            Error::NotFound(msg) | Error::BadRequest(msg) => {
                res.json(ErrorBody { message: msg.clone() })
            }
            // No Message
            Error::InternalServer => res.json(json!({ "message": "Internal Server Error" })),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    // reqwest errors
    #[error("{0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("HTTP error! status: {0}")]
    UpstreamStatus(u16),
    // classification provider errors
    #[error(transparent)]
    Classification(#[from] ClassifyError),
    // base64 errors
    #[error("Invalid image data: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    // Custom Errors
    #[error("{0}")]
    BadRequest(Cow<'static, str>),
    #[error("{0}")]
    NotFound(Cow<'static, str>),
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::BadRequest(msg) => Error::BadRequest(msg),
            SystemError::NotFound(msg) => Error::NotFound(msg),
            _ => {
                log::error!("Internal Server Error: {:?}", value);
                Error::InternalServer
            }
        }
    }
}

impl SystemError {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, SystemError::BadRequest(_))
    }
}
