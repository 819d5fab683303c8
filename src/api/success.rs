use actix_web::{http::StatusCode, HttpResponse};
use std::borrow::Cow;

use crate::api::error::SystemError;

/// `{ data, message }` body shared by every RPC procedure. The uploader reads it back
/// through the same type.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SuccessData<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<Cow<'static, str>>,
}

impl<T> SuccessData<T> {
    /// Unwrap the payload; a `null` payload becomes `NotFound` carrying the message.
    pub fn into_data(self) -> Result<T, SystemError> {
        match self.data {
            Some(data) => Ok(data),
            None => Err(SystemError::NotFound(
                self.message.unwrap_or(Cow::Borrowed("Response carried no data")),
            )),
        }
    }
}

pub struct Success<T: serde::Serialize> {
    pub status: StatusCode,
    pub body: SuccessData<T>,
}

impl<T: serde::Serialize> Success<T> {
    pub fn ok(data: Option<T>) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: Option<T>) -> Self {
        Self::with_status(StatusCode::CREATED, data)
    }

    fn with_status(status: StatusCode, data: Option<T>) -> Self {
        Self { status, body: SuccessData { data, message: None } }
    }

    pub fn message<M>(mut self, msg: M) -> Self
    where
        M: Into<Cow<'static, str>>,
    {
        self.body.message = Some(msg.into());
        self
    }
}

impl<T: serde::Serialize> actix_web::Responder for Success<T> {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _req: &actix_web::HttpRequest) -> HttpResponse<Self::Body> {
        HttpResponse::build(self.status).json(self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_data_reads_as_not_found_with_message() {
        let body: SuccessData<u32> =
            serde_json::from_str(r#"{"data":null,"message":"Image not found"}"#).unwrap();
        let err = body.into_data().unwrap_err();
        assert!(matches!(err, SystemError::NotFound(ref m) if m == "Image not found"));
    }

    #[test]
    fn message_is_optional_on_the_wire() {
        let body: SuccessData<bool> = serde_json::from_str(r#"{"data":true}"#).unwrap();
        assert!(body.into_data().unwrap());
    }

    #[test]
    fn message_lands_in_the_body() {
        let success = Success::created(Some(1)).message("Image analyzed successfully");
        assert_eq!(success.status, StatusCode::CREATED);
        assert_eq!(success.body.message.as_deref(), Some("Image analyzed successfully"));
    }
}
