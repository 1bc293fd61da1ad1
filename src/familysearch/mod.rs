//! FamilySearch extension.
//!
//! The FamilySearch API serves the Collection, Person and Place resources
//! in its own media type and adds family-tree operations (duplicate
//! matching, merging, restoring deleted persons, change history). The media
//! type is swapped in by an [`ExtensionStateFactory`], whose Person profile
//! also enables the [`TREE_OPERATIONS`] set. The operations in [`tree`]
//! answer `Ok(None)` on a person built by any factory that does not enable it.

use std::sync::Arc;

use crate::GedcomxClient;
use crate::config::ClientConfig;
use crate::model::FAMILYSEARCH_JSON;
use crate::state::{
    DefaultStateFactory, ExtensionStateFactory, StateError, StateKind, StateProfile,
    StateRegistry,
};

pub mod tree;

/// Variant name of states built by the FamilySearch factory.
pub const FAMILYSEARCH_VARIANT: &str = "familysearch";

/// Operation set enabling the family-tree transitions of a person.
pub const TREE_OPERATIONS: &str = "family-tree";

/// Kinds whose FamilySearch representation differs from the core one.
pub const OVERRIDDEN_KINDS: [StateKind; 3] =
    [StateKind::Collection, StateKind::Person, StateKind::Place];

/// The FamilySearch factory: overrides [`OVERRIDDEN_KINDS`] and delegates
/// every other kind to the core GEDCOM X factory.
#[must_use]
pub fn factory() -> ExtensionStateFactory {
    let overrides = OVERRIDDEN_KINDS
        .into_iter()
        .fold(StateRegistry::new(), |registry, kind| {
            let profile = StateProfile::new(kind, FAMILYSEARCH_VARIANT, FAMILYSEARCH_JSON);
            registry.with(match kind {
                StateKind::Person => profile.with_operations(TREE_OPERATIONS),
                _ => profile,
            })
        });
    ExtensionStateFactory::new(
        FAMILYSEARCH_VARIANT,
        overrides,
        Arc::new(DefaultStateFactory::gedcomx()),
    )
}

/// A client negotiating FamilySearch representations.
///
/// # Errors
///
/// As [`GedcomxClient::with_factory`].
pub fn client(config: &ClientConfig) -> Result<GedcomxClient, StateError> {
    GedcomxClient::with_factory(config, Arc::new(factory()))
}
