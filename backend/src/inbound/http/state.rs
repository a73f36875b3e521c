//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and only ever see
//! domain ports, so they stay testable without a store or identity provider.

use std::sync::Arc;

use crate::domain::ports::{AccessTokenVerifier, AthleteProfileCommand, AthleteProfileQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub profiles: Arc<dyn AthleteProfileCommand>,
    pub profiles_query: Arc<dyn AthleteProfileQuery>,
    pub tokens: Arc<dyn AccessTokenVerifier>,
}

impl HttpState {
    /// Bundle the ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use coaching_backend::domain::ports::FixtureAccessTokenVerifier;
    /// use coaching_backend::domain::{AthleteProfileService, SchemaRegistry, UserId};
    /// use coaching_backend::inbound::http::state::HttpState;
    /// use coaching_backend::outbound::postgrest::PostgrestProfileStore;
    ///
    /// # fn build(store: PostgrestProfileStore) {
    /// let service = Arc::new(AthleteProfileService::new(
    ///     Arc::new(store),
    ///     Arc::new(SchemaRegistry::athlete_profiles()),
    /// ));
    /// let tokens = Arc::new(FixtureAccessTokenVerifier::new("token", UserId::random()));
    /// let state = HttpState::new(service.clone(), service, tokens);
    /// let _profiles = state.profiles.clone();
    /// # }
    /// ```
    pub fn new(
        profiles: Arc<dyn AthleteProfileCommand>,
        profiles_query: Arc<dyn AthleteProfileQuery>,
        tokens: Arc<dyn AccessTokenVerifier>,
    ) -> Self {
        Self {
            profiles,
            profiles_query,
            tokens,
        }
    }
}
