//! # Denpo - Rust client for the Denpo SMS delivery API
//!
//! This crate is the official Rust SDK for the Denpo messaging platform. It
//! builds and sends API requests, materializes the polymorphic JSON the
//! server returns into typed entity trees, and maps failing responses onto a
//! single classified error type.
//!
//! ## Quick start
//!
//! ```no_run
//! use denpo::{Client, MessageCreateParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), denpo::Error> {
//!     let client = Client::builder()
//!         .api_key("key_live_1")
//!         .tenant_id("tn_1")
//!         .build()?;
//!
//!     let params = MessageCreateParams::builder()
//!         .service_id(1)
//!         .to("09012345678")
//!         .body("hello from Rust")
//!         .build();
//!
//!     let message = client.create_message(&params, None).await?;
//!     println!("created message {:?}, status {:?}", message.id(), message.status());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## How responses become objects
//!
//! Every payload the server returns carries an `object` discriminator
//! (`"message"`, `"list"`, `"error"`, ...). Responses are decoded to JSON,
//! then recursively converted: arrays element-wise, mappings into
//! [`ApiObject`] property bags dispatched through the [`Registry`], scalars
//! as-is. A discriminator without a registration falls back to a generic
//! object rather than failing, so new server-side entities degrade
//! gracefully. The typed views ([`Message`], [`Collection`], ...) are thin
//! projections over the same bags: their accessors return a
//! [`PropertyError`] when a property is missing or has drifted in shape.
//!
//! ## Error handling
//!
//! Failing statuses with a structured `{"object": "error", ...}` body are
//! classified purely by status code into [`ApiErrorKind`]; anything else (a
//! body that is not JSON, or a failure without the error discriminator) is
//! an [`Error::UnexpectedValue`] carrying the raw response. Parameter and
//! option validation fail locally, before any request is sent.
//!
//! ```no_run
//! use denpo::{ApiErrorKind, Client, Error, MessageDetailParams};
//!
//! # async fn example(client: Client) {
//! let params = MessageDetailParams::builder().id("msg_1").build();
//! match client.message_detail(&params, None).await {
//!     Ok(message) => println!("carrier: {:?}", message.carrier()),
//!     Err(Error::Api { kind: ApiErrorKind::NotFound, .. }) => println!("no such message"),
//!     Err(Error::UnexpectedValue { status, body, .. }) => {
//!         eprintln!("unexpected response ({status}): {body}");
//!     }
//!     Err(e) => eprintln!("request failed: {e}"),
//! }
//! # }
//! ```
//!
//! ## Retries
//!
//! The client can retry transient transport failures (network errors,
//! timeouts, 429s, 5xx) with configurable pacing; see [`RetryStrategy`] and
//! [`retry`]. Retrying is off by default and never re-runs response
//! interpretation for an attempt that already produced one.

mod client;
mod convert;
mod error;
mod model;
mod object;
mod options;
mod params;
mod registry;
mod response;
pub mod retry;

pub use client::{Client, ClientBuilder};
pub use convert::{convert, convert_object};
pub use error::{ApiErrorKind, Error, Result};
pub use model::{
    BulkFile, BulkMessage, BulkMessageStatus, Carrier, Collection, DeliveryResult, ErrorDetail,
    Message, SentResult, Status,
};
pub use object::{ApiObject, ObjectKind, PropertyError, Value};
pub use options::{
    RequestOptions, RequestOptionsBuilder, DEFAULT_API_BASE, DEFAULT_API_VERSION, DEFAULT_TIMEOUT,
};
pub use params::{
    BulkMessageCreateParams, BulkMessageCreateParamsBuilder, BulkMessageListMessageParams,
    BulkMessageListMessageParamsBuilder, BulkMessageShowParams, BulkMessageShowParamsBuilder,
    MessageCancelParams, MessageCancelParamsBuilder, MessageCreateParams,
    MessageCreateParamsBuilder, MessageDetailParams, MessageDetailParamsBuilder,
    MessageListParams, MessageListParamsBuilder, ParamValue,
};
pub use registry::{Factory, Registry};
pub use response::{interpret, interpret_no_content, ApiResponse, NoContentResponse};
pub use retry::{RetryPredicate, RetryStrategy};
