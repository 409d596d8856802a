//! Typed views over materialized entities.
//!
//! Each view wraps an [`ApiObject`] and projects its well-known properties
//! through typed accessors. The accessors return a [`PropertyError`] when the
//! stored shape is not what the caller asked for: a payload missing a field
//! or carrying a drifted type fails at the point of access instead of
//! panicking somewhere downstream.

use chrono::{DateTime, Utc};

use crate::object::{ApiObject, ObjectKind, PropertyError, Value};

/// Delivery result reported for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryResult {
    Done,
    Processing,
}

impl DeliveryResult {
    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "done" => Some(Self::Done),
            "processing" => Some(Self::Processing),
            _ => None,
        }
    }

    /// The wire representation, as sent in query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Processing => "processing",
        }
    }
}

/// Processing status of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Done,
    Waiting,
    Error,
    Canceled,
}

impl Status {
    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "done" => Some(Self::Done),
            "waiting" => Some(Self::Waiting),
            "error" => Some(Self::Error),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }

    /// The wire representation, as sent in query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Waiting => "waiting",
            Self::Error => "error",
            Self::Canceled => "canceled",
        }
    }
}

/// Handset-level delivery outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentResult {
    None,
    Received,
    Unconnected,
    Error,
    Unknown,
}

impl SentResult {
    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "received" => Some(Self::Received),
            "unconnected" => Some(Self::Unconnected),
            "error" => Some(Self::Error),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// The wire representation, as sent in query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Received => "received",
            Self::Unconnected => "unconnected",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

/// Carrier the recipient number was resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrier {
    Docomo,
    Softbank,
    Au,
    Rakuten,
    Option,
    International,
    Checking,
    Unknown,
}

impl Carrier {
    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "docomo" => Some(Self::Docomo),
            "softbank" => Some(Self::Softbank),
            "au" => Some(Self::Au),
            "rakuten" => Some(Self::Rakuten),
            "option" => Some(Self::Option),
            "international" => Some(Self::International),
            "checking" => Some(Self::Checking),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// The wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Docomo => "docomo",
            Self::Softbank => "softbank",
            Self::Au => "au",
            Self::Rakuten => "rakuten",
            Self::Option => "option",
            Self::International => "international",
            Self::Checking => "checking",
            Self::Unknown => "unknown",
        }
    }
}

/// Processing status of a bulk send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkMessageStatus {
    Done,
    Waiting,
    Processing,
    Error,
}

impl BulkMessageStatus {
    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "done" => Some(Self::Done),
            "waiting" => Some(Self::Waiting),
            "processing" => Some(Self::Processing),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// The wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Waiting => "waiting",
            Self::Processing => "processing",
            Self::Error => "error",
        }
    }
}

fn enum_property<T>(
    object: &ApiObject,
    key: &str,
    parse: fn(&str) -> Option<T>,
    expected: &'static str,
) -> Result<T, PropertyError> {
    let value = object.get_str(key)?;
    parse(value).ok_or(PropertyError::Mismatch {
        key: key.to_owned(),
        expected,
    })
}

fn timestamp_property(object: &ApiObject, key: &str) -> Result<DateTime<Utc>, PropertyError> {
    let value = object.get_str(key)?;
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| PropertyError::Mismatch {
            key: key.to_owned(),
            expected: "RFC 3339 timestamp",
        })
}

/// An SMS message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message(ApiObject);

impl Message {
    /// Discriminator the server labels messages with.
    pub const OBJECT_NAME: &'static str = "message";

    /// Wraps a materialized object.
    pub fn new(object: ApiObject) -> Self {
        Self(object)
    }

    /// Consumes the view, returning the underlying object.
    pub fn into_inner(self) -> ApiObject {
        self.0
    }

    pub fn service_id(&self) -> Result<i64, PropertyError> {
        self.0.get_i64("service_id")
    }

    pub fn billing_address_id(&self) -> Result<i64, PropertyError> {
        self.0.get_i64("billing_address_id")
    }

    pub fn to(&self) -> Result<&str, PropertyError> {
        self.0.get_str("to")
    }

    pub fn body(&self) -> Result<&str, PropertyError> {
        self.0.get_str("body")
    }

    /// The tags attached to the message.
    pub fn tags(&self) -> Result<Vec<&str>, PropertyError> {
        let values = self.0.get_array("tags")?;
        values
            .iter()
            .map(|value| {
                value.as_str().ok_or(PropertyError::Mismatch {
                    key: "tags".to_owned(),
                    expected: "array of strings",
                })
            })
            .collect()
    }

    pub fn is_shorten(&self) -> Result<bool, PropertyError> {
        self.0.get_bool("is_shorten")
    }

    pub fn result(&self) -> Result<DeliveryResult, PropertyError> {
        enum_property(&self.0, "result", DeliveryResult::from_wire, "delivery result")
    }

    pub fn status(&self) -> Result<Status, PropertyError> {
        enum_property(&self.0, "status", Status::from_wire, "message status")
    }

    pub fn sent_result(&self) -> Result<SentResult, PropertyError> {
        enum_property(&self.0, "sent_result", SentResult::from_wire, "sent result")
    }

    pub fn carrier(&self) -> Result<Carrier, PropertyError> {
        enum_property(&self.0, "carrier", Carrier::from_wire, "carrier")
    }

    pub fn charged_count_per_sent(&self) -> Result<i64, PropertyError> {
        self.0.get_i64("charged_count_per_sent")
    }

    pub fn scheduled_at(&self) -> Result<DateTime<Utc>, PropertyError> {
        timestamp_property(&self.0, "scheduled_at")
    }

    pub fn limited_at(&self) -> Result<DateTime<Utc>, PropertyError> {
        timestamp_property(&self.0, "limited_at")
    }

    pub fn sent_at(&self) -> Result<DateTime<Utc>, PropertyError> {
        timestamp_property(&self.0, "sent_at")
    }

    pub fn received_at(&self) -> Result<DateTime<Utc>, PropertyError> {
        timestamp_property(&self.0, "received_at")
    }

    pub fn charged_at(&self) -> Result<DateTime<Utc>, PropertyError> {
        timestamp_property(&self.0, "charged_at")
    }

    pub fn created_at(&self) -> Result<DateTime<Utc>, PropertyError> {
        timestamp_property(&self.0, "created_at")
    }

    pub fn updated_at(&self) -> Result<DateTime<Utc>, PropertyError> {
        timestamp_property(&self.0, "updated_at")
    }
}

impl std::ops::Deref for Message {
    type Target = ApiObject;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A bulk send operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkMessage(ApiObject);

impl BulkMessage {
    /// Discriminator the server labels bulk sends with.
    pub const OBJECT_NAME: &'static str = "bulk_message";

    pub fn new(object: ApiObject) -> Self {
        Self(object)
    }

    pub fn into_inner(self) -> ApiObject {
        self.0
    }

    pub fn status(&self) -> Result<BulkMessageStatus, PropertyError> {
        enum_property(
            &self.0,
            "status",
            BulkMessageStatus::from_wire,
            "bulk message status",
        )
    }

    /// The partial-failure detail, when the bulk send reported one.
    pub fn error(&self) -> Result<Option<ErrorDetail>, PropertyError> {
        match self.0.get("error") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(object)) => Ok(Some(ErrorDetail::new(object.clone()))),
            Some(_) => Err(PropertyError::Mismatch {
                key: "error".to_owned(),
                expected: "object",
            }),
        }
    }

    pub fn created_at(&self) -> Result<DateTime<Utc>, PropertyError> {
        timestamp_property(&self.0, "created_at")
    }

    pub fn updated_at(&self) -> Result<DateTime<Utc>, PropertyError> {
        timestamp_property(&self.0, "updated_at")
    }
}

impl std::ops::Deref for BulkMessage {
    type Target = ApiObject;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// An upload slot for a bulk CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkFile(ApiObject);

impl BulkFile {
    /// Discriminator the server labels upload slots with.
    pub const OBJECT_NAME: &'static str = "bulk_file";

    pub fn new(object: ApiObject) -> Self {
        Self(object)
    }

    pub fn into_inner(self) -> ApiObject {
        self.0
    }

    /// The signed URL the CSV should be uploaded to.
    pub fn url(&self) -> Result<&str, PropertyError> {
        self.0.get_str("url")
    }

    pub fn created_at(&self) -> Result<DateTime<Utc>, PropertyError> {
        timestamp_property(&self.0, "created_at")
    }

    pub fn expires_at(&self) -> Result<DateTime<Utc>, PropertyError> {
        timestamp_property(&self.0, "expires_at")
    }
}

impl std::ops::Deref for BulkFile {
    type Target = ApiObject;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A paginated list of entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection(ApiObject);

impl Collection {
    /// Discriminator the server labels lists with.
    pub const OBJECT_NAME: &'static str = "list";

    pub fn new(object: ApiObject) -> Self {
        Self(object)
    }

    pub fn into_inner(self) -> ApiObject {
        self.0
    }

    /// The page members, in server order.
    pub fn data(&self) -> Result<&[Value], PropertyError> {
        self.0.get_array("data")
    }

    /// Whether further pages exist.
    pub fn has_more(&self) -> Result<bool, PropertyError> {
        self.0.get_bool("has_more")
    }
}

impl std::ops::Deref for Collection {
    type Target = ApiObject;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A structured API error object.
///
/// Carried by [`Error::Api`](crate::Error::Api) when the server answered
/// with an `{"object": "error", ...}` body, and by the local validation
/// errors, which mirror its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetail(ApiObject);

impl ErrorDetail {
    /// Discriminator the server labels errors with.
    pub const OBJECT_NAME: &'static str = "error";

    pub fn new(object: ApiObject) -> Self {
        Self(object)
    }

    pub fn into_inner(self) -> ApiObject {
        self.0
    }

    /// Machine-readable error code.
    pub fn code(&self) -> Result<&str, PropertyError> {
        self.0.get_str("code")
    }

    /// Human-readable summary.
    pub fn message(&self) -> Result<&str, PropertyError> {
        self.0.get_str("message")
    }

    /// Per-field message lists.
    pub fn errors(&self) -> Result<&ApiObject, PropertyError> {
        self.0.get_object("errors")
    }

    /// Builds a locally constructed detail around per-field messages.
    pub(crate) fn with_errors(errors: ApiObject) -> Self {
        let mut object = ApiObject::new(ObjectKind::Error, Value::Null);
        object.set("errors", errors);
        Self(object)
    }
}

impl std::ops::Deref for ErrorDetail {
    type Target = ApiObject;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Accumulates per-field validation messages the way the server reports
/// them: an object whose keys are field names and values are message arrays.
pub(crate) struct ValidationErrors {
    fields: ApiObject,
    has_error: bool,
}

impl ValidationErrors {
    pub(crate) fn new() -> Self {
        Self {
            fields: ApiObject::generic(Value::Null),
            has_error: false,
        }
    }

    pub(crate) fn push(&mut self, field: &str, messages: &[&str]) {
        let values: Vec<Value> = messages.iter().copied().map(Value::from).collect();
        self.fields.set(field, values);
        self.has_error = true;
    }

    pub(crate) fn into_detail(self) -> Option<ErrorDetail> {
        self.has_error.then(|| ErrorDetail::with_errors(self.fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert;
    use crate::options::RequestOptions;
    use crate::registry::Registry;
    use chrono::TimeZone;
    use serde_json::json;

    fn materialize(raw: serde_json::Value) -> ApiObject {
        let converted = convert(raw, &Registry::with_defaults(), &RequestOptions::default());
        match converted {
            Value::Object(object) => object,
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn message_accessors_project_the_payload() {
        let message = Message::new(materialize(json!({
            "object": "message",
            "id": "msg_1",
            "service_id": 1,
            "to": "09012345678",
            "body": "hello",
            "tags": ["a", "b"],
            "is_shorten": true,
            "result": "done",
            "status": "done",
            "sent_result": "received",
            "carrier": "docomo",
            "charged_count_per_sent": 2,
            "created_at": "2024-03-01T09:00:00Z"
        })));

        assert_eq!(message.kind(), ObjectKind::Message);
        assert_eq!(message.service_id(), Ok(1));
        assert_eq!(message.to(), Ok("09012345678"));
        assert_eq!(message.tags(), Ok(vec!["a", "b"]));
        assert_eq!(message.is_shorten(), Ok(true));
        assert_eq!(message.result(), Ok(DeliveryResult::Done));
        assert_eq!(message.status(), Ok(Status::Done));
        assert_eq!(message.sent_result(), Ok(SentResult::Received));
        assert_eq!(message.carrier(), Ok(Carrier::Docomo));
        assert_eq!(message.charged_count_per_sent(), Ok(2));
        assert_eq!(
            message.created_at(),
            Ok(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn unrecognized_enum_values_fail_typed() {
        let message = Message::new(materialize(json!({
            "object": "message",
            "status": "paused"
        })));

        assert_eq!(
            message.status(),
            Err(PropertyError::Mismatch {
                key: "status".to_owned(),
                expected: "message status",
            })
        );
    }

    #[test]
    fn missing_timestamp_is_a_missing_property() {
        let message = Message::new(materialize(json!({"object": "message"})));
        assert_eq!(
            message.sent_at(),
            Err(PropertyError::Missing("sent_at".to_owned()))
        );
    }

    #[test]
    fn bulk_message_error_is_optional() {
        let without = BulkMessage::new(materialize(json!({
            "object": "bulk_message",
            "status": "processing"
        })));
        assert_eq!(without.error(), Ok(None));
        assert_eq!(without.status(), Ok(BulkMessageStatus::Processing));

        let with = BulkMessage::new(materialize(json!({
            "object": "bulk_message",
            "status": "error",
            "error": {"object": "error", "code": "partial"}
        })));
        let detail = with.error().unwrap().unwrap();
        assert_eq!(detail.code(), Ok("partial"));
        assert_eq!(detail.kind(), ObjectKind::Error);
    }

    #[test]
    fn collection_exposes_members_and_paging() {
        let collection = Collection::new(materialize(json!({
            "object": "list",
            "has_more": true,
            "data": [{"object": "message", "id": "msg_1"}]
        })));

        assert_eq!(collection.has_more(), Ok(true));
        let data = collection.data().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(
            data[0].as_object().unwrap().kind(),
            ObjectKind::Message
        );
    }

    #[test]
    fn bulk_file_exposes_the_signed_url() {
        let file = BulkFile::new(materialize(json!({
            "object": "bulk_file",
            "id": "file_1",
            "url": "https://upload.denpo.jp/signed/abc",
            "expires_at": "2024-03-01T10:00:00Z"
        })));

        assert_eq!(file.url(), Ok("https://upload.denpo.jp/signed/abc"));
        assert!(file.expires_at().is_ok());
    }

    #[test]
    fn validation_errors_mirror_the_server_shape() {
        let mut errors = ValidationErrors::new();
        errors.push("to", &["to is required."]);
        let detail = errors.into_detail().unwrap();

        assert_eq!(detail.kind(), ObjectKind::Error);
        let fields = detail.errors().unwrap();
        let messages = fields.get_array("to").unwrap();
        assert_eq!(messages[0].as_str(), Some("to is required."));
    }

    #[test]
    fn empty_validation_produces_no_detail() {
        assert!(ValidationErrors::new().into_detail().is_none());
    }
}
