//! Error types for API calls.
//!
//! All failures surface through the single [`Error`] enum. HTTP-level API
//! failures are one variant carrying an [`ApiErrorKind`] tag plus the common
//! payload (status, headers, raw body, structured error detail), so callers
//! branch on the kind instead of downcasting through a hierarchy. Local
//! validation failures never touch the network and carry only the structured
//! detail.

use http::{HeaderMap, StatusCode};

use crate::model::ErrorDetail;

/// The classified kind of an HTTP API failure.
///
/// Classification is a pure function of the status code; the body has
/// already been checked for the `error` discriminator by the time a kind is
/// assigned, and is never consulted again.
///
/// # Examples
///
/// ```
/// use denpo::ApiErrorKind;
/// use http::StatusCode;
///
/// assert_eq!(ApiErrorKind::classify(StatusCode::BAD_REQUEST), ApiErrorKind::BadRequest);
/// assert_eq!(ApiErrorKind::classify(StatusCode::BAD_GATEWAY), ApiErrorKind::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 422
    UnprocessableEntity,
    /// 429
    TooManyRequests,
    /// Any failure status outside the fixed table.
    Unknown,
}

impl ApiErrorKind {
    /// Classifies a failure status code.
    pub fn classify(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => ApiErrorKind::BadRequest,
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            422 => ApiErrorKind::UnprocessableEntity,
            429 => ApiErrorKind::TooManyRequests,
            _ => ApiErrorKind::Unknown,
        }
    }

    /// The fixed status code bound to this kind, `None` for `Unknown`.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ApiErrorKind::BadRequest => Some(StatusCode::BAD_REQUEST),
            ApiErrorKind::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ApiErrorKind::Forbidden => Some(StatusCode::FORBIDDEN),
            ApiErrorKind::NotFound => Some(StatusCode::NOT_FOUND),
            ApiErrorKind::UnprocessableEntity => Some(StatusCode::UNPROCESSABLE_ENTITY),
            ApiErrorKind::TooManyRequests => Some(StatusCode::TOO_MANY_REQUESTS),
            ApiErrorKind::Unknown => None,
        }
    }
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ApiErrorKind::BadRequest => "bad request",
            ApiErrorKind::Unauthorized => "unauthorized",
            ApiErrorKind::Forbidden => "forbidden",
            ApiErrorKind::NotFound => "not found",
            ApiErrorKind::UnprocessableEntity => "unprocessable entity",
            ApiErrorKind::TooManyRequests => "too many requests",
            ApiErrorKind::Unknown => "unknown error",
        };
        f.write_str(name)
    }
}

/// The error type for API calls.
///
/// # Examples
///
/// ```no_run
/// use denpo::{Client, Error, MessageDetailParams};
///
/// # async fn example(client: Client, params: MessageDetailParams) {
/// match client.message_detail(&params, None).await {
///     Ok(message) => println!("status: {:?}", message.status()),
///     Err(Error::Api { kind, status, error, .. }) => {
///         eprintln!("API rejected the call ({kind}, status {status})");
///         if let Some(detail) = error {
///             eprintln!("  code: {:?}", detail.code());
///         }
///     }
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed,
    /// TLS handshake failed, ...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request took longer than the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered a failing status with a structured
    /// `{"object": "error", ...}` body.
    #[error("API error ({kind}): status {status}")]
    Api {
        /// Classified from the status code alone.
        kind: ApiErrorKind,
        /// The raw status code; callers of the `Unknown` kind need it.
        status: StatusCode,
        /// The response headers.
        headers: HeaderMap,
        /// The raw response body.
        body: String,
        /// The materialized error object, carrying `code`, `message` and the
        /// per-field `errors`.
        error: Option<ErrorDetail>,
    },

    /// The body could not be parsed as JSON, or a failing status arrived
    /// without the `error` discriminator. Either way the response cannot be
    /// trusted as a structured error, so it is surfaced verbatim.
    #[error("unexpected response value (status {status})")]
    UnexpectedValue {
        /// The HTTP status code.
        status: StatusCode,
        /// The response headers.
        headers: HeaderMap,
        /// The raw response body, exactly as received.
        body: String,
    },

    /// Caller-supplied parameters failed validation. Raised before any
    /// request is sent.
    #[error("invalid parameters")]
    InvalidParams {
        /// Per-field validation messages, shaped like a server error object.
        error: ErrorDetail,
    },

    /// The merged request options are incomplete. Raised before any request
    /// is sent.
    #[error("invalid request options")]
    InvalidRequestOptions {
        /// Per-field validation messages, shaped like a server error object.
        error: ErrorDetail,
    },

    /// Invalid client configuration (bad header value, unbuildable client).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An invalid URL was provided.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// All retry attempts were exhausted.
    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// The number of attempts made.
        attempts: usize,
        /// The last error encountered before giving up.
        last_error: Box<Error>,
    },
}

impl Error {
    /// Returns `true` if this error is potentially retryable.
    ///
    /// Network errors, timeouts, 429s and 5xx responses are considered
    /// retryable; validation failures and the other 4xx kinds are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) | Error::Timeout => true,
            Error::Api { kind, status, .. } => {
                *kind == ApiErrorKind::TooManyRequests || status.is_server_error()
            }
            _ => false,
        }
    }

    /// The HTTP status code, for errors produced from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } | Error::UnexpectedValue { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The response headers, for errors produced from a response.
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Error::Api { headers, .. } | Error::UnexpectedValue { headers, .. } => Some(headers),
            _ => None,
        }
    }

    /// The raw response body, for errors produced from a response.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::Api { body, .. } | Error::UnexpectedValue { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The structured error detail, when one was materialized.
    pub fn detail(&self) -> Option<&ErrorDetail> {
        match self {
            Error::Api { error, .. } => error.as_ref(),
            Error::InvalidParams { error } | Error::InvalidRequestOptions { error } => Some(error),
            _ => None,
        }
    }
}

/// A specialized `Result` type for API calls.
pub type Result<T> = std::result::Result<T, Error>;
