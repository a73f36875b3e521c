//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports ([`ProfileStore`], [`AccessTokenVerifier`]) describe what the
//! domain needs from the outside world. Driving ports
//! ([`AthleteProfileCommand`], [`AthleteProfileQuery`]) are what inbound
//! adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod access_token_verifier;
mod athlete_profile_command;
mod athlete_profile_query;
mod profile_store;

#[cfg(test)]
pub use access_token_verifier::MockAccessTokenVerifier;
pub use access_token_verifier::{
    AccessTokenVerifier, AccessTokenVerifierError, FixtureAccessTokenVerifier,
};
#[cfg(test)]
pub use athlete_profile_command::MockAthleteProfileCommand;
pub use athlete_profile_command::AthleteProfileCommand;
#[cfg(test)]
pub use athlete_profile_query::MockAthleteProfileQuery;
pub use athlete_profile_query::AthleteProfileQuery;
#[cfg(test)]
pub use profile_store::MockProfileStore;
pub use profile_store::{Filter, ProfileStore, ProfileStoreError, Row, SelectQuery};
