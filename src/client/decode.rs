//! Turns a buffered HTTP response into a typed value or a typed error.

use reqwest::StatusCode;
use serde::de::{DeserializeOwned, Error as _};
use tracing::warn;

use crate::client::error::{UnexpectedResponse, XmsError, XmsResult};
use crate::domain::Page;
use crate::transport::{ErrorBody, HttpResponse, decode_error_body, decode_page};

enum Success {
    Body(Vec<u8>),
    Accepted,
}

fn classify(path: &str, response: HttpResponse) -> XmsResult<Success> {
    match response.status {
        StatusCode::OK | StatusCode::CREATED => Ok(Success::Body(response.body)),
        StatusCode::ACCEPTED | StatusCode::NO_CONTENT => Ok(Success::Accepted),
        StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN => {
            match decode_error_body(&response.body).map_err(XmsError::Parse)? {
                ErrorBody::Api(err) => Err(XmsError::Api(err)),
                ErrorBody::BadRequest(err) => Err(XmsError::BadRequest(err)),
            }
        }
        StatusCode::NOT_FOUND => Err(XmsError::NotFound {
            path: path.to_owned(),
        }),
        StatusCode::UNAUTHORIZED => Err(XmsError::Unauthorized),
        _ => Err(XmsError::UnexpectedResponse(Box::new(
            UnexpectedResponse::from(response),
        ))),
    }
}

fn missing_body() -> XmsError {
    XmsError::Parse(serde_json::Error::custom(
        "response accepted without the expected body",
    ))
}

/// Decode a bodied response; `Ok(None)` for `202 Accepted` and `204 No Content`.
pub fn decode_json<T: DeserializeOwned>(path: &str, response: HttpResponse) -> XmsResult<Option<T>> {
    match classify(path, response)? {
        Success::Body(body) => serde_json::from_slice(&body)
            .map(Some)
            .map_err(XmsError::Parse),
        Success::Accepted => Ok(None),
    }
}

/// Like [`decode_json`], but a missing body is a parse error.
pub fn decode_json_required<T: DeserializeOwned>(path: &str, response: HttpResponse) -> XmsResult<T> {
    decode_json(path, response)?.ok_or_else(missing_body)
}

/// Decode a response to a pure command; trailing content is logged, not fatal.
pub fn decode_empty(path: &str, response: HttpResponse) -> XmsResult<()> {
    let status = response.status;
    if let Success::Body(body) = classify(path, response)? {
        if !body.iter().all(u8::is_ascii_whitespace) {
            warn!(
                path,
                status = status.as_u16(),
                body_size = body.len(),
                "expected an empty response body; ignoring it"
            );
        }
    }
    Ok(())
}

/// Decode one page of a listing fetched with `requested_page_size`.
pub fn decode_page_response<T: DeserializeOwned>(
    path: &str,
    response: HttpResponse,
    requested_page_size: u32,
) -> XmsResult<Page<T>> {
    match classify(path, response)? {
        Success::Body(body) => decode_page(&body, requested_page_size).map_err(XmsError::Parse),
        Success::Accepted => Err(missing_body()),
    }
}
