//! Athlete profile backend for a powerlifting coaching application.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the profile rules
//! and ports, [`inbound`] exposes them over HTTP and [`outbound`] implements
//! the ports against the hosted store and identity provider.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(feature = "test-support")]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
