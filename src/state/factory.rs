//! Typed state registry and factories.
//!
//! A factory does not construct states itself: it answers, for each
//! [`StateKind`], which [`StateProfile`] a state of that kind is built with.
//! The profile is the per-kind capability table: negotiated media type,
//! entity parsing policy, embeddable relations and the named operation sets
//! the state exposes. The typed builder
//! [`GedcomxClient::build`](crate::GedcomxClient::build) and the name-based
//! [`GedcomxClient::build_named`](crate::GedcomxClient::build_named) consult
//! it, so an extension factory changes what every transition produces
//! without any state type knowing about the extension.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{EntityPolicy, StateError, StateKind};

/// Variant name of the core GEDCOM X states.
pub const GEDCOMX_VARIANT: &str = "gedcomx";

/// How states of one kind are built and what they can do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateProfile {
    pub kind: StateKind,
    /// Which API flavor produced the state, e.g. `gedcomx` or `familysearch`.
    pub variant: String,
    /// Media type sent in `Accept` and `Content-Type`.
    pub media_type: String,
    /// Which exchanges carry a body worth parsing.
    pub entity_policy: EntityPolicy,
    /// Relations considered embeddable on each top-level item.
    pub embedded_relations: Vec<String>,
    /// Extension operation sets enabled on states of this profile.
    pub operations: BTreeSet<String>,
}

impl StateProfile {
    /// A profile with the core policy and embedded relations of `kind`.
    #[must_use]
    pub fn new(kind: StateKind, variant: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            kind,
            variant: variant.into(),
            media_type: media_type.into(),
            entity_policy: kind.default_entity_policy(),
            embedded_relations: kind
                .default_embedded_relations()
                .iter()
                .map(ToString::to_string)
                .collect(),
            operations: BTreeSet::new(),
        }
    }

    /// The core profile of a kind.
    #[must_use]
    pub fn gedcomx(kind: StateKind) -> Self {
        Self::new(kind, GEDCOMX_VARIANT, kind.default_media_type())
    }

    #[must_use]
    pub fn with_entity_policy(mut self, policy: EntityPolicy) -> Self {
        self.entity_policy = policy;
        self
    }

    #[must_use]
    pub fn with_embedded_relations<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.embedded_relations = relations.into_iter().map(Into::into).collect();
        self
    }

    /// Enables a named operation set.
    #[must_use]
    pub fn with_operations(mut self, name: impl Into<String>) -> Self {
        self.operations.insert(name.into());
        self
    }

    #[must_use]
    pub fn supports(&self, operations: &str) -> bool {
        self.operations.contains(operations)
    }
}

/// A map from kind to profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateRegistry {
    profiles: BTreeMap<StateKind, StateProfile>,
}

impl StateRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a profile, replacing any existing one for the same kind.
    #[must_use]
    pub fn with(mut self, profile: StateProfile) -> Self {
        self.register(profile);
        self
    }

    pub fn register(&mut self, profile: StateProfile) {
        self.profiles.insert(profile.kind, profile);
    }

    #[must_use]
    pub fn get(&self, kind: StateKind) -> Option<&StateProfile> {
        self.profiles.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = StateKind> + '_ {
        self.profiles.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Resolves the profile for each kind of state.
pub trait StateFactory: fmt::Debug + Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// The profile for `kind`, or `None` if the factory has no mapping.
    fn profile(&self, kind: StateKind) -> Option<StateProfile>;

    /// Fails fast if any of `required` is unmapped.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownStateType`] naming the first unmapped kind.
    fn validate(&self, required: &[StateKind]) -> Result<(), StateError> {
        match required.iter().find(|kind| self.profile(**kind).is_none()) {
            Some(missing) => Err(StateError::unknown_state_type(missing.name())),
            None => {
                debug!(factory = self.name(), kinds = required.len(), "state factory validated");
                Ok(())
            }
        }
    }
}

/// A factory backed by a single registry.
#[derive(Debug, Clone)]
pub struct DefaultStateFactory {
    name: String,
    registry: StateRegistry,
}

impl DefaultStateFactory {
    #[must_use]
    pub fn new(name: impl Into<String>, registry: StateRegistry) -> Self {
        Self {
            name: name.into(),
            registry,
        }
    }

    /// Every kind, with its core GEDCOM X profile.
    #[must_use]
    pub fn gedcomx() -> Self {
        let registry = StateKind::ALL
            .into_iter()
            .fold(StateRegistry::new(), |registry, kind| {
                registry.with(StateProfile::gedcomx(kind))
            });
        Self::new(GEDCOMX_VARIANT, registry)
    }

    #[must_use]
    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }
}

impl StateFactory for DefaultStateFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn profile(&self, kind: StateKind) -> Option<StateProfile> {
        self.registry.get(kind).cloned()
    }
}

/// Overrides some kinds and delegates the rest to a base factory.
#[derive(Debug, Clone)]
pub struct ExtensionStateFactory {
    name: String,
    overrides: StateRegistry,
    base: Arc<dyn StateFactory>,
}

impl ExtensionStateFactory {
    #[must_use]
    pub fn new(name: impl Into<String>, overrides: StateRegistry, base: Arc<dyn StateFactory>) -> Self {
        Self {
            name: name.into(),
            overrides,
            base,
        }
    }

    #[must_use]
    pub fn overrides(&self) -> &StateRegistry {
        &self.overrides
    }

    #[must_use]
    pub fn base(&self) -> &Arc<dyn StateFactory> {
        &self.base
    }
}

impl StateFactory for ExtensionStateFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn profile(&self, kind: StateKind) -> Option<StateProfile> {
        match self.overrides.get(kind) {
            Some(profile) => Some(profile.clone()),
            None => self.base.profile(kind),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{FAMILYSEARCH_JSON, GEDCOMX_JSON};

    fn extension() -> ExtensionStateFactory {
        let overrides = StateRegistry::new().with(StateProfile::new(
            StateKind::Collection,
            "custom",
            FAMILYSEARCH_JSON,
        ));
        ExtensionStateFactory::new("custom", overrides, Arc::new(DefaultStateFactory::gedcomx()))
    }

    #[test]
    fn test_gedcomx_factory_maps_every_kind() {
        let factory = DefaultStateFactory::gedcomx();
        assert_eq!(factory.registry().len(), StateKind::ALL.len());
        factory.validate(&StateKind::ALL).expect("all kinds mapped");
    }

    #[test]
    fn test_extension_overrides_only_its_kinds() {
        let ext = extension();
        let collection = ext.profile(StateKind::Collection).unwrap();
        assert_eq!(collection.variant, "custom");
        assert_eq!(collection.media_type, FAMILYSEARCH_JSON);
    }

    #[test]
    fn test_extension_delegates_unmapped_kinds() {
        let ext = extension();
        let base = DefaultStateFactory::gedcomx();
        assert_eq!(
            ext.profile(StateKind::Discussion),
            base.profile(StateKind::Discussion)
        );
        assert_eq!(
            ext.profile(StateKind::Discussion).unwrap().media_type,
            GEDCOMX_JSON
        );
    }

    #[test]
    fn test_core_profile_carries_kind_capabilities() {
        let person = StateProfile::gedcomx(StateKind::Person);
        assert_eq!(person.entity_policy, EntityPolicy::Tombstone);
        assert!(person.embedded_relations.iter().any(|r| r == "notes"));
        assert!(person.operations.is_empty());
        assert!(!person.supports("family-tree"));
    }

    #[test]
    fn test_override_replaces_capabilities() {
        let profile = StateProfile::gedcomx(StateKind::Discussion)
            .with_entity_policy(EntityPolicy::Tombstone)
            .with_embedded_relations(["comments", "attachments"])
            .with_operations("moderation");
        assert_eq!(profile.entity_policy, EntityPolicy::Tombstone);
        assert_eq!(profile.embedded_relations, vec!["comments", "attachments"]);
        assert!(profile.supports("moderation"));
        assert_eq!(profile.media_type, GEDCOMX_JSON);
    }

    #[test]
    fn test_validate_names_missing_kind() {
        let partial = DefaultStateFactory::new(
            "partial",
            StateRegistry::new().with(StateProfile::gedcomx(StateKind::Collection)),
        );
        let err = partial
            .validate(&[StateKind::Collection, StateKind::User])
            .unwrap_err();
        assert!(matches!(err, StateError::UnknownStateType { ref name } if name == "UserState"));
    }
}
