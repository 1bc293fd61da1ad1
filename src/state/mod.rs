//! Hypermedia application states.
//!
//! This module provides the navigation engine: immutable snapshots of one
//! HTTP exchange, typed by the resource they represent, and the transitions
//! between them.
//!
//! # Architecture
//!
//! - [`ApplicationState`] - Generic engine over a [`ResourceKind`]
//! - [`StateKind`] / [`EntityPolicy`] - Closed set of resource types and their parse rules
//! - [`StateFactory`] - Maps kinds to profiles; [`ExtensionStateFactory`] overrides a subset
//! - [`AnyState`] - A state whose kind is only known at run time
//! - Per-resource transitions (`read_parents`, `add_comment`, ...) as inherent
//!   methods on the `XState` aliases
//!
//! # Example
//!
//! ```no_run
//! use gedcomx_client::{ClientConfig, GedcomxClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GedcomxClient::new(&ClientConfig::default())?;
//! let tree = client
//!     .read_collection("https://api.example.com/platform/collections/tree", &[])
//!     .await?
//!     .authenticate_with_access_token("token")?;
//! if let Some(person) = tree.read_person_by_id("KWQS-BBQ", &[]).await? {
//!     let parents = person.read_parents(&[]).await?;
//!     println!("{parents:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod any;
mod application;
mod auth;
mod collection;
mod discussion;
mod embedded;
mod error;
mod factory;
mod kind;
mod person;
mod place;
mod resources;
mod results;
mod source;
mod user;

pub use any::AnyState;
pub use application::ApplicationState;
pub use embedded::EmbeddedResource;
pub use error::StateError;
pub use factory::{
    DefaultStateFactory, ExtensionStateFactory, GEDCOMX_VARIANT, StateFactory, StateProfile,
    StateRegistry,
};
pub use kind::{EntityPolicy, ResourceKind, StateKind};
pub use resources::{
    AgentResource, AgentState, ChangeHistoryResource, ChangeHistoryState, CollectionResource,
    CollectionState, DiscussionResource, DiscussionState, PersonChildrenResource,
    PersonChildrenState, PersonMatchResultsResource, PersonMatchResultsState,
    PersonMergeResource, PersonMergeState, PersonNonMatchesResource, PersonNonMatchesState,
    PersonParentsResource, PersonParentsState, PersonResource, PersonSearchResultsResource,
    PersonSearchResultsState, PersonSpousesResource, PersonSpousesState, PersonState,
    PlaceResource, PlaceState, RelationshipResource, RelationshipState,
    SourceDescriptionResource, SourceDescriptionState, UserResource, UserState,
};

pub(crate) use application::to_body;
