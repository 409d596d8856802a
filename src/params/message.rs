//! Parameters for the message endpoints.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::{DeliveryResult, SentResult, Status, ValidationErrors};
use crate::params::{format_timestamp, ParamValue};

pub(crate) const CONTEXT_PATH: &str = "/messages";

/// Parameters for sending a message.
///
/// # Examples
///
/// ```
/// use denpo::MessageCreateParams;
///
/// let params = MessageCreateParams::builder()
///     .service_id(1)
///     .to("09012345678")
///     .body("hello")
///     .tags(["campaign"])
///     .build();
///
/// assert!(params.validate().is_ok());
/// assert_eq!(params.to_path(), "/messages");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageCreateParams {
    pub service_id: i64,
    pub to: String,
    pub body: String,
    pub tags: Option<Vec<String>>,
    pub is_shorten: Option<bool>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub limited_at: Option<DateTime<Utc>>,
}

impl MessageCreateParams {
    pub fn builder() -> MessageCreateParamsBuilder {
        MessageCreateParamsBuilder::default()
    }

    pub fn to_path(&self) -> String {
        CONTEXT_PATH.to_owned()
    }

    /// Renders the form body. Unset optional fields are omitted entirely.
    pub fn to_data(&self) -> Vec<(String, ParamValue)> {
        let mut data = vec![
            (
                "service_id".to_owned(),
                ParamValue::Single(self.service_id.to_string()),
            ),
            ("to".to_owned(), ParamValue::Single(self.to.clone())),
            ("body".to_owned(), ParamValue::Single(self.body.clone())),
        ];
        if let Some(tags) = &self.tags {
            data.push(("tags".to_owned(), ParamValue::List(tags.clone())));
        }
        if let Some(is_shorten) = self.is_shorten {
            data.push((
                "is_shorten".to_owned(),
                ParamValue::Single(is_shorten.to_string()),
            ));
        }
        if let Some(at) = &self.scheduled_at {
            data.push((
                "scheduled_at".to_owned(),
                ParamValue::Single(format_timestamp(at)),
            ));
        }
        if let Some(at) = &self.limited_at {
            data.push((
                "limited_at".to_owned(),
                ParamValue::Single(format_timestamp(at)),
            ));
        }
        data
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();

        if self.service_id <= 0 {
            errors.push(
                "serviceId",
                &["serviceId is required.", "Enter a positive integer."],
            );
        }
        if self.to.is_empty() {
            errors.push("to", &["to is required.", "Enter a string."]);
        }
        if self.body.is_empty() {
            errors.push("body", &["body is required.", "Enter a string."]);
        }

        match errors.into_detail() {
            None => Ok(()),
            Some(error) => Err(Error::InvalidParams { error }),
        }
    }
}

/// Builder for [`MessageCreateParams`].
#[derive(Debug, Default)]
pub struct MessageCreateParamsBuilder {
    params: MessageCreateParams,
}

impl MessageCreateParamsBuilder {
    pub fn service_id(mut self, service_id: i64) -> Self {
        self.params.service_id = service_id;
        self
    }

    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.params.to = to.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.params.body = body.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_shorten(mut self, is_shorten: bool) -> Self {
        self.params.is_shorten = Some(is_shorten);
        self
    }

    /// Schedules delivery. Any timezone is accepted; the wire format is UTC.
    pub fn scheduled_at<Tz: chrono::TimeZone>(mut self, at: DateTime<Tz>) -> Self {
        self.params.scheduled_at = Some(at.with_timezone(&Utc));
        self
    }

    /// Sets the delivery deadline. Any timezone is accepted; the wire format
    /// is UTC.
    pub fn limited_at<Tz: chrono::TimeZone>(mut self, at: DateTime<Tz>) -> Self {
        self.params.limited_at = Some(at.with_timezone(&Utc));
        self
    }

    pub fn build(self) -> MessageCreateParams {
        self.params
    }
}

/// Parameters for fetching a single message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageDetailParams {
    pub id: String,
}

impl MessageDetailParams {
    pub fn builder() -> MessageDetailParamsBuilder {
        MessageDetailParamsBuilder::default()
    }

    pub fn to_path(&self) -> String {
        format!("{CONTEXT_PATH}/{}", self.id)
    }

    pub fn validate(&self) -> Result<()> {
        validate_id(&self.id)
    }
}

/// Builder for [`MessageDetailParams`].
#[derive(Debug, Default)]
pub struct MessageDetailParamsBuilder {
    params: MessageDetailParams,
}

impl MessageDetailParamsBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.params.id = id.into();
        self
    }

    pub fn build(self) -> MessageDetailParams {
        self.params
    }
}

/// Parameters for cancelling a scheduled message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCancelParams {
    pub id: String,
}

impl MessageCancelParams {
    pub fn builder() -> MessageCancelParamsBuilder {
        MessageCancelParamsBuilder::default()
    }

    pub fn to_path(&self) -> String {
        format!("{CONTEXT_PATH}/{}/cancel", self.id)
    }

    pub fn validate(&self) -> Result<()> {
        validate_id(&self.id)
    }
}

/// Builder for [`MessageCancelParams`].
#[derive(Debug, Default)]
pub struct MessageCancelParamsBuilder {
    params: MessageCancelParams,
}

impl MessageCancelParamsBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.params.id = id.into();
        self
    }

    pub fn build(self) -> MessageCancelParams {
        self.params
    }
}

/// Parameters for listing messages. Every filter is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageListParams {
    pub service_id: Option<i64>,
    pub to: Option<String>,
    pub status: Option<Status>,
    pub result: Option<DeliveryResult>,
    pub sent_result: Option<SentResult>,
    pub tag: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl MessageListParams {
    pub fn builder() -> MessageListParamsBuilder {
        MessageListParamsBuilder::default()
    }

    pub fn to_path(&self) -> String {
        CONTEXT_PATH.to_owned()
    }

    /// Renders the query string. Unset filters are omitted entirely.
    pub fn to_params(&self) -> Vec<(String, ParamValue)> {
        let mut params = Vec::new();
        if let Some(service_id) = self.service_id {
            params.push((
                "service_id".to_owned(),
                ParamValue::Single(service_id.to_string()),
            ));
        }
        if let Some(to) = &self.to {
            params.push(("to".to_owned(), ParamValue::Single(to.clone())));
        }
        if let Some(status) = self.status {
            params.push((
                "status".to_owned(),
                ParamValue::Single(status.as_str().to_owned()),
            ));
        }
        if let Some(result) = self.result {
            params.push((
                "result".to_owned(),
                ParamValue::Single(result.as_str().to_owned()),
            ));
        }
        if let Some(sent_result) = self.sent_result {
            params.push((
                "sent_result".to_owned(),
                ParamValue::Single(sent_result.as_str().to_owned()),
            ));
        }
        if let Some(tag) = &self.tag {
            params.push(("tag".to_owned(), ParamValue::Single(tag.clone())));
        }
        if let Some(at) = &self.start_at {
            params.push(("start_at".to_owned(), ParamValue::Single(format_timestamp(at))));
        }
        if let Some(at) = &self.end_at {
            params.push(("end_at".to_owned(), ParamValue::Single(format_timestamp(at))));
        }
        if let Some(page) = self.page {
            params.push(("page".to_owned(), ParamValue::Single(page.to_string())));
        }
        if let Some(per_page) = self.per_page {
            params.push((
                "per_page".to_owned(),
                ParamValue::Single(per_page.to_string()),
            ));
        }
        params
    }

    /// Listing has no required fields.
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Builder for [`MessageListParams`].
#[derive(Debug, Default)]
pub struct MessageListParamsBuilder {
    params: MessageListParams,
}

impl MessageListParamsBuilder {
    pub fn service_id(mut self, service_id: i64) -> Self {
        self.params.service_id = Some(service_id);
        self
    }

    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.params.to = Some(to.into());
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.params.status = Some(status);
        self
    }

    pub fn result(mut self, result: DeliveryResult) -> Self {
        self.params.result = Some(result);
        self
    }

    pub fn sent_result(mut self, sent_result: SentResult) -> Self {
        self.params.sent_result = Some(sent_result);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.params.tag = Some(tag.into());
        self
    }

    pub fn start_at<Tz: chrono::TimeZone>(mut self, at: DateTime<Tz>) -> Self {
        self.params.start_at = Some(at.with_timezone(&Utc));
        self
    }

    pub fn end_at<Tz: chrono::TimeZone>(mut self, at: DateTime<Tz>) -> Self {
        self.params.end_at = Some(at.with_timezone(&Utc));
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.params.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.params.per_page = Some(per_page);
        self
    }

    pub fn build(self) -> MessageListParams {
        self.params
    }
}

fn validate_id(id: &str) -> Result<()> {
    let mut errors = ValidationErrors::new();
    if id.is_empty() {
        errors.push("id", &["id is required.", "Enter a string (UUID)."]);
    }
    match errors.into_detail() {
        None => Ok(()),
        Some(error) => Err(Error::InvalidParams { error }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::encode;
    use chrono::TimeZone;

    #[test]
    fn create_renders_required_fields_only_when_bare() {
        let params = MessageCreateParams::builder()
            .service_id(1)
            .to("09012345678")
            .body("hello")
            .build();

        let keys: Vec<String> = params.to_data().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["service_id", "to", "body"]);
    }

    #[test]
    fn create_renders_optional_fields_when_set() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let params = MessageCreateParams::builder()
            .service_id(1)
            .to("09012345678")
            .body("hello")
            .tags(["a", "b"])
            .is_shorten(true)
            .scheduled_at(at)
            .build();

        let pairs = encode(&params.to_data());
        assert!(pairs.contains(&("tags[0]".to_owned(), "a".to_owned())));
        assert!(pairs.contains(&("tags[1]".to_owned(), "b".to_owned())));
        assert!(pairs.contains(&("is_shorten".to_owned(), "true".to_owned())));
        assert!(pairs.contains(&("scheduled_at".to_owned(), "2024-03-01T12:00:00Z".to_owned())));
    }

    #[test]
    fn create_validation_collects_every_failing_field() {
        let error = MessageCreateParams::default().validate().unwrap_err();
        let Error::InvalidParams { error: detail } = error else {
            panic!("expected InvalidParams");
        };

        let errors = detail.errors().unwrap();
        for field in ["serviceId", "to", "body"] {
            assert!(errors.get_array(field).is_ok(), "{field}");
        }
    }

    #[test]
    fn detail_and_cancel_paths_embed_the_id() {
        let detail = MessageDetailParams::builder().id("msg_1").build();
        assert_eq!(detail.to_path(), "/messages/msg_1");

        let cancel = MessageCancelParams::builder().id("msg_1").build();
        assert_eq!(cancel.to_path(), "/messages/msg_1/cancel");
    }

    #[test]
    fn blank_id_fails_validation() {
        let error = MessageCancelParams::default().validate().unwrap_err();
        let detail = error.detail().unwrap();
        assert!(detail.errors().unwrap().get_array("id").is_ok());
    }

    #[test]
    fn list_omits_unset_filters() {
        let params = MessageListParams::builder().page(2).build();
        let pairs = encode(&params.to_params());
        assert_eq!(pairs, vec![("page".to_owned(), "2".to_owned())]);
    }

    #[test]
    fn list_renders_enum_filters_on_the_wire() {
        let params = MessageListParams::builder()
            .status(Status::Done)
            .result(DeliveryResult::Processing)
            .sent_result(SentResult::Received)
            .build();

        let pairs = encode(&params.to_params());
        assert!(pairs.contains(&("status".to_owned(), "done".to_owned())));
        assert!(pairs.contains(&("result".to_owned(), "processing".to_owned())));
        assert!(pairs.contains(&("sent_result".to_owned(), "received".to_owned())));
    }
}
