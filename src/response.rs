//! Response interpretation: parsing, materialization and error classification.
//!
//! Two interpretation paths share the same parsing and classification logic.
//! [`interpret`] serves endpoints whose success is a JSON body; it treats any
//! status outside `[200, 400)` as a failure. [`interpret_no_content`] serves
//! endpoints whose success signal is the status line and headers (a redirect
//! carrying a `Location`, for instance); it treats only statuses `>= 400` as
//! failures and never exposes a materialized body.

use http::{HeaderMap, StatusCode};

use crate::convert::convert;
use crate::error::{ApiErrorKind, Error, Result};
use crate::model::ErrorDetail;
use crate::object::{ApiObject, Value};
use crate::options::RequestOptions;
use crate::registry::Registry;

/// A successfully interpreted response with a materialized body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// The materialized top-level entity.
    pub object: ApiObject,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The raw response body, useful for debugging and logging.
    pub raw_body: String,
}

/// A successfully interpreted response for endpoints that answer through the
/// status line and headers alone.
///
/// There is deliberately no body accessor here: these endpoints convey their
/// result without one, so the type cannot express reading it.
#[derive(Debug, Clone)]
pub struct NoContentResponse {
    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,
}

impl NoContentResponse {
    /// The `Location` header, when the server answered with a redirect.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(http::header::LOCATION)?.to_str().ok()
    }
}

/// Interprets a response whose success carries a JSON body.
///
/// The body is parsed and materialized first; an unparseable body is an
/// [`Error::UnexpectedValue`] regardless of status. On a failing status the
/// materialized object must carry the `error` discriminator to be classified
/// through the status table; a failing status with any other body shape is
/// anomalous and also surfaces as `UnexpectedValue`.
pub fn interpret(
    status: StatusCode,
    headers: HeaderMap,
    body: String,
    registry: &Registry,
    options: &RequestOptions,
) -> Result<ApiResponse> {
    let contents: serde_json::Value = match serde_json::from_str(&body) {
        Ok(contents) => contents,
        Err(parse_error) => {
            tracing::debug!(
                status = status.as_u16(),
                error = %parse_error,
                "response body is not JSON"
            );
            return Err(Error::UnexpectedValue {
                status,
                headers,
                body,
            });
        }
    };

    let converted = convert(contents, registry, options);

    if status.as_u16() < 200 || status.as_u16() >= 400 {
        return Err(error_from_converted(converted, status, headers, body));
    }

    match converted {
        Value::Object(object) => Ok(ApiResponse {
            object,
            status,
            headers,
            raw_body: body,
        }),
        _ => Err(Error::UnexpectedValue {
            status,
            headers,
            body,
        }),
    }
}

/// Interprets a response whose success carries no usable body.
///
/// On a success status (`< 400`) the body is never read. On a failing status
/// the body goes through the same parse/materialize/classify path as
/// [`interpret`].
pub fn interpret_no_content(
    status: StatusCode,
    headers: HeaderMap,
    body: String,
    registry: &Registry,
    options: &RequestOptions,
) -> Result<NoContentResponse> {
    if status.as_u16() < 400 {
        return Ok(NoContentResponse { status, headers });
    }

    let contents: serde_json::Value = match serde_json::from_str(&body) {
        Ok(contents) => contents,
        Err(_) => {
            return Err(Error::UnexpectedValue {
                status,
                headers,
                body,
            })
        }
    };

    let converted = convert(contents, registry, options);
    Err(error_from_converted(converted, status, headers, body))
}

/// Selects the error for a failing status from its materialized body.
fn error_from_converted(
    converted: Value,
    status: StatusCode,
    headers: HeaderMap,
    body: String,
) -> Error {
    match converted {
        Value::Object(object) if object.object() == Some(ErrorDetail::OBJECT_NAME) => {
            let kind = ApiErrorKind::classify(status);
            tracing::debug!(status = status.as_u16(), %kind, "classified API error");
            Error::Api {
                kind,
                status,
                headers,
                body,
                error: Some(ErrorDetail::new(object)),
            }
        }
        _ => Error::UnexpectedValue {
            status,
            headers,
            body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;

    fn interpret_default(status: u16, body: &str) -> Result<ApiResponse> {
        interpret(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            body.to_owned(),
            &Registry::with_defaults(),
            &RequestOptions::default(),
        )
    }

    fn interpret_no_content_default(status: u16, body: &str) -> Result<NoContentResponse> {
        interpret_no_content(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            body.to_owned(),
            &Registry::with_defaults(),
            &RequestOptions::default(),
        )
    }

    #[test]
    fn success_with_unregistered_discriminator_is_generic() {
        let response = interpret_default(200, r#"{"object":"test","id":"x"}"#).unwrap();
        assert_eq!(response.object.kind(), ObjectKind::Generic);
        assert_eq!(response.object.id().as_str(), Some("x"));
    }

    #[test]
    fn created_status_is_success() {
        let response = interpret_default(201, r#"{"object":"message","id":"msg_1"}"#).unwrap();
        assert_eq!(response.object.kind(), ObjectKind::Message);
        assert_eq!(response.status, StatusCode::CREATED);
    }

    #[test]
    fn bad_request_with_error_body_is_classified() {
        let error = interpret_default(400, r#"{"object":"error","code":"bad"}"#).unwrap_err();
        match error {
            Error::Api {
                kind,
                status,
                error: Some(detail),
                ..
            } => {
                assert_eq!(kind, ApiErrorKind::BadRequest);
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(detail.code(), Ok("bad"));
            }
            other => panic!("expected Error::Api, got {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_unexpected_even_when_classifiable() {
        let error = interpret_default(429, "not json at all").unwrap_err();
        match error {
            Error::UnexpectedValue { status, body, .. } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(body, "not json at all");
            }
            other => panic!("expected Error::UnexpectedValue, got {other:?}"),
        }
    }

    #[test]
    fn unlisted_failure_status_is_unknown_kind() {
        let error = interpret_default(500, r#"{"object":"error"}"#).unwrap_err();
        match error {
            Error::Api { kind, status, .. } => {
                assert_eq!(kind, ApiErrorKind::Unknown);
                assert_eq!(status.as_u16(), 500);
            }
            other => panic!("expected Error::Api, got {other:?}"),
        }
    }

    #[test]
    fn failing_status_without_error_discriminator_is_unexpected() {
        let error = interpret_default(400, r#"{"object":"message","id":"msg_1"}"#).unwrap_err();
        assert!(matches!(error, Error::UnexpectedValue { .. }));
    }

    #[test]
    fn success_with_non_object_body_is_unexpected() {
        let error = interpret_default(200, "[1,2,3]").unwrap_err();
        assert!(matches!(error, Error::UnexpectedValue { .. }));
    }

    #[test]
    fn no_content_success_ignores_the_body() {
        let response = interpret_no_content_default(302, "<html>redirect</html>").unwrap();
        assert_eq!(response.status, StatusCode::FOUND);
    }

    #[test]
    fn no_content_failure_is_classified() {
        let error =
            interpret_no_content_default(404, r#"{"object":"error","code":"missing"}"#).unwrap_err();
        match error {
            Error::Api { kind, error, .. } => {
                assert_eq!(kind, ApiErrorKind::NotFound);
                assert_eq!(error.unwrap().code(), Ok("missing"));
            }
            other => panic!("expected Error::Api, got {other:?}"),
        }
    }

    #[test]
    fn no_content_failure_with_non_json_body_is_unexpected() {
        let error = interpret_no_content_default(400, "oops").unwrap_err();
        assert!(matches!(error, Error::UnexpectedValue { .. }));
    }

    #[test]
    fn location_header_is_exposed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::LOCATION,
            "https://files.denpo.jp/results/abc".parse().unwrap(),
        );
        let response = NoContentResponse {
            status: StatusCode::FOUND,
            headers,
        };
        assert_eq!(
            response.location(),
            Some("https://files.denpo.jp/results/abc")
        );
    }
}
