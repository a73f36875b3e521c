//! Builders for HTTP state ports backed by the outbound adapters.

use std::sync::Arc;

use actix_web::web;

use coaching_backend::domain::{AthleteProfileService, SchemaRegistry};
use coaching_backend::inbound::http::state::HttpState;
use coaching_backend::outbound::AdapterBuildError;
use coaching_backend::outbound::postgrest::PostgrestProfileStore;
use coaching_backend::outbound::supabase_auth::SupabaseTokenVerifier;

use super::ServerConfig;

/// Wire the profile service over the PostgREST store and the token verifier
/// over the auth API. Both share the project URL and service key.
pub(super) fn build_http_state(
    config: &ServerConfig,
) -> Result<web::Data<HttpState>, AdapterBuildError> {
    let store = PostgrestProfileStore::new(
        &config.project_url,
        config.service_key.clone(),
        config.request_timeout,
    )?;
    let tokens = SupabaseTokenVerifier::new(
        &config.project_url,
        config.service_key.clone(),
        config.request_timeout,
    )?;
    let service = Arc::new(AthleteProfileService::new(
        Arc::new(store),
        Arc::new(SchemaRegistry::athlete_profiles()),
    ));
    Ok(web::Data::new(HttpState::new(
        service.clone(),
        service,
        Arc::new(tokens),
    )))
}
