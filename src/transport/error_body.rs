use serde::Deserialize;

use crate::domain::{ApiError, BadRequestError};
use crate::transport::raw_text::RawText;

#[derive(Debug, Deserialize)]
struct ApiErrorJson {
    code: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct BadRequestJson {
    status: u16,
    path: String,
    #[serde(default)]
    timestamp: Option<RawText>,
    error: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    Api(ApiError),
    BadRequest(BadRequestError),
}

/// Decode a 400/403 body.
///
/// The `{code, text}` shape is tried first. Only a well-formed body of the
/// wrong shape falls back to `{status, path, timestamp, error}`; malformed
/// JSON, or a body matching neither shape, is returned as the parse error.
pub fn decode_error_body(body: &[u8]) -> Result<ErrorBody, serde_json::Error> {
    match serde_json::from_slice::<ApiErrorJson>(body) {
        Ok(api) => Ok(ErrorBody::Api(ApiError {
            code: api.code,
            text: api.text,
        })),
        Err(err) if err.is_data() => {
            let bad = serde_json::from_slice::<BadRequestJson>(body)?;
            Ok(ErrorBody::BadRequest(BadRequestError {
                status: bad.status,
                path: bad.path,
                timestamp: bad.timestamp.map(RawText::into_string),
                error: bad.error,
                message: bad.message,
            }))
        }
        Err(err) => Err(err),
    }
}
