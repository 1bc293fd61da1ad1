//! Shared User-Agent string for API traffic.
//!
//! Single source for project URL and UA format so every transport built by
//! the crate identifies itself the same way.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/gedcomx/gedcomx-rs-client";

/// Default User-Agent for API requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("gedcomx-client/{version} (hypermedia-navigator; +{PROJECT_UA_URL})")
}
