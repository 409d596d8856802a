//! Per-endpoint request parameters.
//!
//! Each endpoint has a params type built through a consuming builder. A
//! params type knows its request path, renders itself into wire pairs
//! (query string or form body), and validates itself locally; validation
//! failures become [`Error::InvalidParams`](crate::Error::InvalidParams)
//! before any request is sent.

use chrono::{DateTime, Utc};

mod bulk;
mod message;

pub use bulk::{
    BulkMessageCreateParams, BulkMessageCreateParamsBuilder, BulkMessageListMessageParams,
    BulkMessageListMessageParamsBuilder, BulkMessageShowParams, BulkMessageShowParamsBuilder,
};
pub use message::{
    MessageCancelParams, MessageCancelParamsBuilder, MessageCreateParams,
    MessageCreateParamsBuilder, MessageDetailParams, MessageDetailParamsBuilder,
    MessageListParams, MessageListParamsBuilder,
};

pub(crate) use bulk::BULK_CONTEXT_PATH;

/// A single parameter value before wire encoding.
///
/// List values encode as indexed keys: `tags[0]=a&tags[1]=b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

/// Flattens parameters into wire pairs.
///
/// Scalars stay as `key=value`; lists expand into `key[i]=value` in order.
/// Absent parameters never reach this point: params types simply do not
/// emit them, so nothing is ever sent as an empty placeholder.
pub(crate) fn encode(params: &[(String, ParamValue)]) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            ParamValue::Single(value) => pairs.push((key.clone(), value.clone())),
            ParamValue::List(values) => {
                for (index, value) in values.iter().enumerate() {
                    pairs.push((format!("{key}[{index}]"), value.clone()));
                }
            }
        }
    }
    pairs
}

/// Renders a timestamp in the wire format: UTC, second precision,
/// `YYYY-MM-DDTHH:MM:SSZ`.
pub(crate) fn format_timestamp<Tz: chrono::TimeZone>(at: &DateTime<Tz>) -> String {
    at.with_timezone(&Utc)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn encode_keeps_scalars_flat() {
        let params = vec![
            ("page".to_owned(), ParamValue::Single("2".to_owned())),
            ("per_page".to_owned(), ParamValue::Single("50".to_owned())),
        ];
        assert_eq!(
            encode(&params),
            vec![
                ("page".to_owned(), "2".to_owned()),
                ("per_page".to_owned(), "50".to_owned()),
            ]
        );
    }

    #[test]
    fn encode_indexes_lists_in_order() {
        let params = vec![(
            "tags".to_owned(),
            ParamValue::List(vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]),
        )];
        assert_eq!(
            encode(&params),
            vec![
                ("tags[0]".to_owned(), "a".to_owned()),
                ("tags[1]".to_owned(), "b".to_owned()),
                ("tags[2]".to_owned(), "c".to_owned()),
            ]
        );
    }

    #[test]
    fn timestamps_render_in_utc_at_second_precision() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 34, 56).unwrap();
        assert_eq!(format_timestamp(&at), "2024-03-01T12:34:56Z");
    }

    #[test]
    fn offset_timestamps_are_converted_to_utc_first() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let at = jst.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(format_timestamp(&at), "2024-03-01T00:00:00Z");
    }
}
