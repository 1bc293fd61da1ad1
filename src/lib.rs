//! GEDCOM X hypermedia client.
//!
//! This library navigates a hypermedia-driven genealogical REST API: every
//! resource after the entry point is reached by following typed links found
//! in the previous response, never by building URIs by hand.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`state`] - Application states, transitions, the state factory, OAuth2
//! - [`transport`] - Request/response values, middleware pipeline, throttling
//! - [`link`] - Links, relation names, URI templates, `Link` headers
//! - [`modifier`] - Composable request modifiers (query, headers, preconditions)
//! - [`model`] - GEDCOM X and Atom feed payloads
//! - [`familysearch`] - FamilySearch factory and family-tree operations
//! - [`config`] - Client configuration file handling

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod client;
pub mod config;
pub mod familysearch;
pub mod link;
pub mod model;
pub mod modifier;
pub mod state;
pub mod transport;
mod user_agent;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use client::GedcomxClient;
pub use config::{ClientConfig, ConfigError};
pub use link::{Link, LinkError, Links};
pub use modifier::{CacheDirectives, HeaderParameter, Preconditions, QueryParameter, RequestModifier};
pub use state::{AnyState, ApplicationState, StateError, StateFactory, StateKind};
pub use transport::{HttpRequest, HttpResponse, StatusClass, TransportError};
