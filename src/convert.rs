//! Recursive conversion of decoded JSON into materialized entity trees.
//!
//! The walk mirrors the JSON grammar: arrays convert element-wise, mappings
//! become [`ApiObject`]s dispatched through the [`Registry`], scalars pass
//! through untouched. Input trees are acyclic by construction, so the
//! recursion needs no cycle protection, and the whole pass is synchronous,
//! proportional to payload size, with no suspension points.

use serde_json::Map;

use crate::object::{ApiObject, Value};
use crate::options::RequestOptions;
use crate::registry::Registry;

/// Converts a decoded JSON value into a materialized [`Value`].
///
/// Mappings are dispatched on their `object` discriminator: a present,
/// non-null string that is registered selects that factory, anything else
/// falls back to the generic constructor. Every key of the mapping,
/// `id` and `object` included, is stored as an ordinary property with its
/// value converted through this same entry point.
///
/// # Examples
///
/// ```
/// use denpo::{convert, ObjectKind, Registry, RequestOptions, Value};
///
/// let registry = Registry::with_defaults();
/// let options = RequestOptions::default();
///
/// let raw = serde_json::json!({"object": "message", "id": "msg_1", "to": "09012345678"});
/// let converted = convert(raw, &registry, &options);
///
/// let object = converted.as_object().unwrap();
/// assert_eq!(object.kind(), ObjectKind::Message);
/// assert_eq!(object.get_str("to"), Ok("09012345678"));
/// ```
pub fn convert(raw: serde_json::Value, registry: &Registry, options: &RequestOptions) -> Value {
    match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| convert(item, registry, options))
                .collect(),
        ),
        serde_json::Value::Object(map) => Value::Object(convert_object(map, registry, options)),
    }
}

/// Converts a decoded JSON mapping into an [`ApiObject`].
pub fn convert_object(
    map: Map<String, serde_json::Value>,
    registry: &Registry,
    options: &RequestOptions,
) -> ApiObject {
    let factory = map
        .get("object")
        .and_then(serde_json::Value::as_str)
        .and_then(|discriminator| registry.resolve(discriminator));

    let id = map
        .get("id")
        .cloned()
        .map(|raw| convert(raw, registry, options))
        .unwrap_or(Value::Null);

    let mut object = match factory {
        Some(factory) => factory(id, options),
        None => ApiObject::generic(id),
    };

    for (key, value) in map {
        let converted = convert(value, registry, options);
        object.set(key, converted);
    }

    object
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;
    use serde_json::json;

    fn convert_default(raw: serde_json::Value) -> Value {
        convert(raw, &Registry::with_defaults(), &RequestOptions::default())
    }

    #[test]
    fn scalars_convert_to_themselves() {
        assert_eq!(convert_default(json!(null)), Value::Null);
        assert_eq!(convert_default(json!(true)), Value::Bool(true));
        assert_eq!(convert_default(json!("text")).as_str(), Some("text"));
        assert_eq!(convert_default(json!(42)).as_i64(), Some(42));
        assert_eq!(convert_default(json!(1.5)).as_f64(), Some(1.5));
    }

    #[test]
    fn arrays_preserve_length_and_order() {
        let converted = convert_default(json!([3, 1, 2]));
        let items = converted.as_array().unwrap();
        assert_eq!(
            items.iter().map(|v| v.as_i64().unwrap()).collect::<Vec<_>>(),
            vec![3, 1, 2]
        );
    }

    #[test]
    fn nested_arrays_preserve_depth() {
        let converted = convert_default(json!([[[{"object": "message"}]]]));

        let level1 = converted.as_array().unwrap();
        let level2 = level1[0].as_array().unwrap();
        let level3 = level2[0].as_array().unwrap();
        let object = level3[0].as_object().unwrap();
        assert_eq!(object.kind(), ObjectKind::Message);
    }

    #[test]
    fn mapping_without_discriminator_is_generic() {
        let converted = convert_default(json!({"to": "09012345678"}));
        assert_eq!(converted.as_object().unwrap().kind(), ObjectKind::Generic);
    }

    #[test]
    fn unregistered_discriminator_falls_back_to_generic() {
        let converted = convert_default(json!({"object": "webhook", "id": "wh_1"}));

        let object = converted.as_object().unwrap();
        assert_eq!(object.kind(), ObjectKind::Generic);
        assert_eq!(object.get_str("object"), Ok("webhook"));
        assert_eq!(object.id().as_str(), Some("wh_1"));
    }

    #[test]
    fn null_discriminator_falls_back_to_generic() {
        let converted = convert_default(json!({"object": null}));
        assert_eq!(converted.as_object().unwrap().kind(), ObjectKind::Generic);
    }

    #[test]
    fn registered_discriminator_selects_the_kind() {
        for (discriminator, kind) in [
            ("error", ObjectKind::Error),
            ("list", ObjectKind::Collection),
            ("message", ObjectKind::Message),
            ("bulk_message", ObjectKind::BulkMessage),
            ("bulk_file", ObjectKind::BulkFile),
        ] {
            let converted = convert_default(json!({"object": discriminator}));
            assert_eq!(converted.as_object().unwrap().kind(), kind);
        }
    }

    #[test]
    fn id_and_object_are_stored_as_ordinary_properties() {
        let converted = convert_default(json!({"object": "message", "id": "msg_1"}));

        let object = converted.as_object().unwrap();
        assert_eq!(object.get_str("id"), Ok("msg_1"));
        assert_eq!(object.get_str("object"), Ok("message"));
    }

    #[test]
    fn empty_mapping_has_only_a_null_id() {
        let converted = convert_default(json!({}));

        let object = converted.as_object().unwrap();
        assert!(object.id().is_null());
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["id"]);
    }

    #[test]
    fn nested_structures_materialize_at_every_level() {
        let converted = convert_default(json!({"a": [{"b": 1}, {"c": [2, 3]}]}));
        let object = converted.as_object().unwrap();

        let a = object.get_array("a").unwrap();
        assert_eq!(a.len(), 2);

        let first = a[0].as_object().unwrap();
        assert_eq!(first.get_i64("b"), Ok(1));

        let second = a[1].as_object().unwrap();
        let c = second.get_array("c").unwrap();
        assert_eq!(
            c.iter().map(|v| v.as_i64().unwrap()).collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[test]
    fn collection_data_materializes_members() {
        let converted = convert_default(json!({
            "object": "list",
            "has_more": false,
            "data": [
                {"object": "message", "id": "msg_1"},
                {"object": "message", "id": "msg_2"}
            ]
        }));

        let list = converted.as_object().unwrap();
        assert_eq!(list.kind(), ObjectKind::Collection);
        let data = list.get_array("data").unwrap();
        for member in data {
            assert_eq!(member.as_object().unwrap().kind(), ObjectKind::Message);
        }
    }

    #[test]
    fn converting_the_exported_form_is_idempotent() {
        let raw = json!({
            "object": "bulk_message",
            "id": "bulk_1",
            "error": {"object": "error", "code": "partial", "errors": {"rows": [["r1", "r2"]]}},
            "counts": [1, [2, 3]]
        });

        let first = convert_default(raw);
        let second = convert_default(first.to_raw());
        assert_eq!(first, second);
    }
}
