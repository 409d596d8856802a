//! Discriminator-to-constructor dispatch table.
//!
//! The server labels every entity with an `object` string. The [`Registry`]
//! maps those labels to factory functions so the converter can materialize
//! each payload as its concrete kind. It is built once, before the first
//! request, and handed to the [`Client`](crate::Client); lookups are
//! read-only afterwards, so concurrent conversions need no locking.

use std::collections::HashMap;

use crate::model::{BulkFile, BulkMessage, Collection, ErrorDetail, Message};
use crate::object::{ApiObject, ObjectKind, Value};
use crate::options::RequestOptions;

/// Constructs an entity from its `id` and the ambient request context.
///
/// The context parameter mirrors the shape of object construction during a
/// conversion pass; the built-in factories ignore it, but custom factories
/// may capture per-request detail from it.
pub type Factory = fn(id: Value, options: &RequestOptions) -> ApiObject;

/// Maps `object` discriminator strings to entity factories.
///
/// Unknown discriminators, and payloads with no discriminator at all,
/// always fall back to the generic constructor; registry membership, not
/// discriminator presence, governs the fallback.
///
/// # Examples
///
/// ```
/// use denpo::{ObjectKind, Registry};
///
/// let registry = Registry::with_defaults();
/// assert!(registry.contains("message"));
/// assert!(!registry.contains("webhook"));
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    factories: HashMap<String, Factory>,
}

impl Registry {
    /// Creates a registry with no registrations.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Creates a registry covering every entity this API returns.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(ErrorDetail::OBJECT_NAME, |id, _| {
            ApiObject::new(ObjectKind::Error, id)
        });
        registry.register(Collection::OBJECT_NAME, |id, _| {
            ApiObject::new(ObjectKind::Collection, id)
        });
        registry.register(Message::OBJECT_NAME, |id, _| {
            ApiObject::new(ObjectKind::Message, id)
        });
        registry.register(BulkMessage::OBJECT_NAME, |id, _| {
            ApiObject::new(ObjectKind::BulkMessage, id)
        });
        registry.register(BulkFile::OBJECT_NAME, |id, _| {
            ApiObject::new(ObjectKind::BulkFile, id)
        });
        registry
    }

    /// Registers (or replaces) the factory for a discriminator.
    pub fn register(&mut self, discriminator: impl Into<String>, factory: Factory) {
        self.factories.insert(discriminator.into(), factory);
    }

    /// Looks up the factory for a discriminator.
    pub fn resolve(&self, discriminator: &str) -> Option<Factory> {
        self.factories.get(discriminator).copied()
    }

    /// Returns `true` when the discriminator has a registered factory.
    pub fn contains(&self, discriminator: &str) -> bool {
        self.factories.contains_key(discriminator)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_server_entities() {
        let registry = Registry::with_defaults();
        for discriminator in ["error", "list", "message", "bulk_message", "bulk_file"] {
            assert!(registry.contains(discriminator), "{discriminator}");
        }
    }

    #[test]
    fn resolve_is_none_for_unregistered() {
        let registry = Registry::with_defaults();
        assert!(registry.resolve("carrier").is_none());
    }

    #[test]
    fn custom_registration_overrides() {
        let mut registry = Registry::with_defaults();
        registry.register("message", |id, _| ApiObject::new(ObjectKind::Generic, id));

        let factory = registry.resolve("message").unwrap();
        let object = factory(Value::Null, &RequestOptions::default());
        assert_eq!(object.kind(), ObjectKind::Generic);
    }
}
