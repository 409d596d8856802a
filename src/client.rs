//! The API client: request assembly, execution and the typed endpoint
//! surface.
//!
//! [`Client`] is cheap to clone and reuses its connection pools across
//! requests. Configure one through [`ClientBuilder`], then drive the API
//! through the typed endpoint methods (`create_message`, `list_messages`,
//! ...) or through the generic [`request`](Client::request) /
//! [`request_no_content`](Client::request_no_content) entry points.

use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, Method, StatusCode};
use url::Url;

use crate::error::{Error, Result};
use crate::model::{BulkFile, BulkMessage, Collection, Message};
use crate::object::ApiObject;
use crate::options::{RequestOptions, DEFAULT_API_BASE, DEFAULT_API_VERSION};
use crate::params::{
    encode, BulkMessageCreateParams, BulkMessageListMessageParams, BulkMessageShowParams,
    MessageCancelParams, MessageCreateParams, MessageDetailParams, MessageListParams, ParamValue,
    BULK_CONTEXT_PATH,
};
use crate::registry::Registry;
use crate::response::{interpret, interpret_no_content, ApiResponse, NoContentResponse};
use crate::retry::{server_requested_delay, RetryOnRetryable, RetryPredicate, RetryStrategy};

const DEFAULT_USER_AGENT: &str = concat!("Denpo/Rust/", env!("CARGO_PKG_VERSION"));
const VERSION_HEADER: &str = "Denpo-Version";
const CLIENT_USER_AGENT_HEADER: &str = "Denpo-Client-User-Agent";

/// Longest wait a `Retry-After` header can impose on a retried 429.
const MAX_SERVER_WAIT: Duration = Duration::from_secs(300);

/// An API client for the Denpo SMS delivery platform.
///
/// # Examples
///
/// ```no_run
/// use denpo::{Client, MessageCreateParams};
///
/// # async fn example() -> Result<(), denpo::Error> {
/// let client = Client::builder()
///     .api_key("key_live_1")
///     .tenant_id("tn_1")
///     .build()?;
///
/// let params = MessageCreateParams::builder()
///     .service_id(1)
///     .to("09012345678")
///     .body("hello")
///     .build();
///
/// let message = client.create_message(&params, None).await?;
/// println!("sent message {:?}", message.id());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    http_no_redirect: reqwest::Client,
    options: RequestOptions,
    registry: Registry,
    retry_strategy: RetryStrategy,
    retry_predicate: Box<dyn RetryPredicate>,
}

impl Client {
    /// Creates a new [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Sends a message.
    pub async fn create_message(
        &self,
        params: &MessageCreateParams,
        options: Option<&RequestOptions>,
    ) -> Result<Message> {
        params.validate()?;
        let data = params.to_data();
        let response = self
            .request_response(Method::POST, &params.to_path(), None, Some(&data), options)
            .await?;
        Ok(Message::new(response.object))
    }

    /// Fetches a single message.
    pub async fn message_detail(
        &self,
        params: &MessageDetailParams,
        options: Option<&RequestOptions>,
    ) -> Result<Message> {
        params.validate()?;
        let response = self
            .request_response(Method::GET, &params.to_path(), None, None, options)
            .await?;
        Ok(Message::new(response.object))
    }

    /// Lists messages matching the given filters.
    pub async fn list_messages(
        &self,
        params: &MessageListParams,
        options: Option<&RequestOptions>,
    ) -> Result<Collection> {
        params.validate()?;
        let query = params.to_params();
        let response = self
            .request_response(Method::GET, &params.to_path(), Some(&query), None, options)
            .await?;
        Ok(Collection::new(response.object))
    }

    /// Cancels a scheduled message.
    pub async fn cancel_message(
        &self,
        params: &MessageCancelParams,
        options: Option<&RequestOptions>,
    ) -> Result<Message> {
        params.validate()?;
        let response = self
            .request_response(Method::POST, &params.to_path(), None, None, options)
            .await?;
        Ok(Message::new(response.object))
    }

    /// Reserves an upload slot for a bulk CSV.
    pub async fn create_bulk_file(&self, options: Option<&RequestOptions>) -> Result<BulkFile> {
        let path = format!("{BULK_CONTEXT_PATH}/files");
        let response = self
            .request_response(Method::POST, &path, None, None, options)
            .await?;
        Ok(BulkFile::new(response.object))
    }

    /// Starts a bulk send from an uploaded file.
    pub async fn create_bulk_message(
        &self,
        params: &BulkMessageCreateParams,
        options: Option<&RequestOptions>,
    ) -> Result<BulkMessage> {
        params.validate()?;
        let data = params.to_data();
        let response = self
            .request_response(Method::POST, &params.to_path(), None, Some(&data), options)
            .await?;
        Ok(BulkMessage::new(response.object))
    }

    /// Fetches a bulk send's state.
    pub async fn show_bulk_message(
        &self,
        params: &BulkMessageShowParams,
        options: Option<&RequestOptions>,
    ) -> Result<BulkMessage> {
        params.validate()?;
        let response = self
            .request_response(Method::GET, &params.to_path(), None, None, options)
            .await?;
        Ok(BulkMessage::new(response.object))
    }

    /// Locates a bulk send's result file.
    ///
    /// The endpoint answers `302 Found` with a `Location` header once the
    /// result is ready, and a plain success with no location while it is
    /// still being assembled, in which case this returns `Ok(None)` and the
    /// caller decides whether to ask again later.
    pub async fn bulk_message_result_url(
        &self,
        params: &BulkMessageListMessageParams,
        options: Option<&RequestOptions>,
    ) -> Result<Option<String>> {
        params.validate()?;
        let response = self
            .request_no_content(Method::GET, &params.to_path(), None, options)
            .await?;
        if response.status == StatusCode::FOUND {
            Ok(response.location().map(str::to_owned))
        } else {
            Ok(None)
        }
    }

    /// Performs a request against an endpoint that answers with a JSON body,
    /// returning the materialized top-level entity.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, ParamValue)]>,
        form: Option<&[(String, ParamValue)]>,
        options: Option<&RequestOptions>,
    ) -> Result<ApiObject> {
        self.request_response(method, path, query, form, options)
            .await
            .map(|response| response.object)
    }

    /// Like [`request`](Self::request), but keeps the raw status, headers
    /// and body alongside the materialized entity.
    pub async fn request_response(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, ParamValue)]>,
        form: Option<&[(String, ParamValue)]>,
        options: Option<&RequestOptions>,
    ) -> Result<ApiResponse> {
        let merged = self.inner.options.merge(options);
        merged.validate()?;

        self.call(&method, path, query, form, &merged, false, |status, headers, body| {
            interpret(status, headers, body, &self.inner.registry, &merged)
        })
        .await
    }

    /// Performs a request against an endpoint whose success signal is the
    /// status line and headers (redirect `Location` inspection, 202-style
    /// acknowledgements). Redirects are not followed.
    pub async fn request_no_content(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, ParamValue)]>,
        options: Option<&RequestOptions>,
    ) -> Result<NoContentResponse> {
        let merged = self.inner.options.merge(options);
        merged.validate()?;

        self.call(&method, path, query, None, &merged, true, |status, headers, body| {
            interpret_no_content(status, headers, body, &self.inner.registry, &merged)
        })
        .await
    }

    /// Runs the send/interpret cycle under the configured retry policy.
    ///
    /// Interpretation runs exactly once per attempt; only whole attempts are
    /// retried.
    async fn call<T>(
        &self,
        method: &Method,
        path: &str,
        query: Option<&[(String, ParamValue)]>,
        form: Option<&[(String, ParamValue)]>,
        options: &RequestOptions,
        no_redirect: bool,
        interpret_with: impl Fn(StatusCode, HeaderMap, String) -> Result<T>,
    ) -> Result<T> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = match self
                .send(method, path, query, form, options, no_redirect, attempt)
                .await
            {
                Ok((status, headers, body)) => interpret_with(status, headers, body),
                Err(e) => Err(e),
            };

            let error = match result {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            tracing::warn!(
                error = %error,
                attempt = attempt,
                method = %method,
                path = %path,
                "request failed"
            );

            if !self.inner.retry_predicate.should_retry(&error, attempt) {
                return Err(error);
            }

            let delay = self
                .inner
                .retry_strategy
                .delay_for_attempt(attempt)
                .map(|planned| server_requested_delay(&error, MAX_SERVER_WAIT).unwrap_or(planned));

            match delay {
                Some(delay) => {
                    tracing::info!(
                        delay_ms = delay.as_millis(),
                        attempt = attempt,
                        "retrying request after delay"
                    );
                    tokio::time::sleep(delay).await;
                }
                None if attempt == 1 => return Err(error),
                None => {
                    return Err(Error::MaxRetriesExceeded {
                        attempts: attempt,
                        last_error: Box::new(error),
                    })
                }
            }
        }
    }

    /// Executes a single HTTP attempt, returning the raw response parts.
    async fn send(
        &self,
        method: &Method,
        path: &str,
        query: Option<&[(String, ParamValue)]>,
        form: Option<&[(String, ParamValue)]>,
        options: &RequestOptions,
        no_redirect: bool,
        attempt: usize,
    ) -> Result<(StatusCode, HeaderMap, String)> {
        let url = Url::parse(&format!("{}{}", options.base_uri(), path))?;

        tracing::debug!(
            method = %method,
            url = %url,
            attempt = attempt,
            "executing HTTP request"
        );

        let http = if no_redirect {
            &self.inner.http_no_redirect
        } else {
            &self.inner.http
        };

        let mut request = http
            .request(method.clone(), url)
            .header(
                http::header::AUTHORIZATION,
                format!("Bearer {}", options.api_key.as_deref().unwrap_or_default()),
            )
            .header(
                VERSION_HEADER,
                options.api_version.as_deref().unwrap_or_default(),
            )
            .header(
                http::header::USER_AGENT,
                options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
            )
            .header(CLIENT_USER_AGENT_HEADER, client_user_agent())
            .timeout(options.timeout());

        if let Some(query) = query {
            request = request.query(&encode(query));
        }
        if let Some(form) = form {
            request = request.form(&encode(form));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout
            } else {
                Error::Network(e)
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        tracing::debug!(
            status = status.as_u16(),
            attempt = attempt,
            "received HTTP response"
        );

        Ok((status, headers, body))
    }
}

fn client_user_agent() -> String {
    serde_json::json!({
        "bindings_version": env!("CARGO_PKG_VERSION"),
        "language": "Rust",
        "uname": format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
    })
    .to_string()
}

/// Builder for configuring and creating a [`Client`].
///
/// The API base and version default to the production endpoint and the
/// version this SDK is pinned to; credentials have no default and are
/// checked when the first request is made (or when per-call overrides
/// supply them).
///
/// # Examples
///
/// ```no_run
/// use denpo::{Client, RetryStrategy};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), denpo::Error> {
/// let client = Client::builder()
///     .api_key("key_live_1")
///     .tenant_id("tn_1")
///     .read_timeout(Duration::from_secs(10))
///     .retry_strategy(RetryStrategy::ExponentialBackoff {
///         initial_delay: Duration::from_millis(100),
///         max_delay: Duration::from_secs(10),
///         max_retries: 3,
///         jitter: true,
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    options: RequestOptions,
    registry: Option<Registry>,
    retry_strategy: RetryStrategy,
    retry_predicate: Option<Box<dyn RetryPredicate>>,
}

impl ClientBuilder {
    /// Creates a builder with the production defaults.
    pub fn new() -> Self {
        Self {
            options: RequestOptions::builder()
                .api_base(DEFAULT_API_BASE)
                .api_version(DEFAULT_API_VERSION)
                .build(),
            registry: None,
            retry_strategy: RetryStrategy::None,
            retry_predicate: None,
        }
    }

    /// Sets the bearer token.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.options.api_key = Some(api_key.into());
        self
    }

    /// Sets the tenant the client operates on.
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.options.tenant_id = Some(tenant_id.into());
        self
    }

    /// Overrides the API origin.
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.options.api_base = Some(api_base.into());
        self
    }

    /// Pins a specific API version.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.options.api_version = Some(api_version.into());
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the TCP connect timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.options.connection_timeout = Some(timeout);
        self
    }

    /// Sets the whole-request timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.options.read_timeout = Some(timeout);
        self
    }

    /// Replaces the entity registry.
    ///
    /// Defaults to [`Registry::with_defaults`]. Replace it to register
    /// additional discriminators before the client issues its first request.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the retry strategy. Defaults to [`RetryStrategy::None`].
    pub fn retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    /// Sets a custom retry predicate.
    ///
    /// By default retries are gated on [`Error::is_retryable`].
    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Builds the configured `Client`.
    pub fn build(self) -> Result<Client> {
        let mut http = reqwest::Client::builder();
        let mut http_no_redirect =
            reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());

        if let Some(timeout) = self.options.connection_timeout {
            http = http.connect_timeout(timeout);
            http_no_redirect = http_no_redirect.connect_timeout(timeout);
        }

        let http = http
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;
        let http_no_redirect = http_no_redirect
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                http,
                http_no_redirect,
                options: self.options,
                registry: self.registry.unwrap_or_default(),
                retry_strategy: self.retry_strategy,
                retry_predicate: self
                    .retry_predicate
                    .unwrap_or_else(|| Box::new(RetryOnRetryable)),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
