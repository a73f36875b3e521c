//! Access token verification against the hosted auth API.
//!
//! `GET {project}/auth/v1/user` answers 200 with the user record for a valid
//! token and 401/403 otherwise.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::UserId;
use crate::domain::ports::{AccessTokenVerifier, AccessTokenVerifierError};
use crate::outbound::{AdapterBuildError, body_preview};

const USER_PATH: &str = "auth/v1/user";

#[derive(Debug, Deserialize)]
struct AuthUserDto {
    id: String,
}

/// Verifier backed by the identity provider's user endpoint.
pub struct SupabaseTokenVerifier {
    client: Client,
    user_endpoint: Url,
    api_key: Zeroizing<String>,
}

impl SupabaseTokenVerifier {
    /// # Errors
    ///
    /// Returns an error when the endpoint URL cannot be derived or the
    /// reqwest client cannot be constructed.
    pub fn new(
        project_url: &Url,
        api_key: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Self, AdapterBuildError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            user_endpoint: project_url.join(USER_PATH)?,
            api_key,
        })
    }
}

#[async_trait]
impl AccessTokenVerifier for SupabaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, AccessTokenVerifierError> {
        let response = self
            .client
            .get(self.user_endpoint.clone())
            .header("apikey", self.api_key.as_str())
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await
            .map_err(|error| AccessTokenVerifierError::unavailable(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| AccessTokenVerifierError::unavailable(error.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_user_id(body.as_ref())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AccessTokenVerifierError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        AccessTokenVerifierError::rejected(message)
    } else {
        AccessTokenVerifierError::unavailable(message)
    }
}

fn parse_user_id(body: &[u8]) -> Result<UserId, AccessTokenVerifierError> {
    let user: AuthUserDto = serde_json::from_slice(body).map_err(|error| {
        AccessTokenVerifierError::unavailable(format!("invalid auth user payload: {error}"))
    })?;
    UserId::new(&user.id).map_err(|error| {
        AccessTokenVerifierError::unavailable(format!("auth user id {}: {error}", user.id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED, true)]
    #[case(StatusCode::FORBIDDEN, true)]
    #[case(StatusCode::TOO_MANY_REQUESTS, false)]
    #[case(StatusCode::BAD_GATEWAY, false)]
    fn statuses_split_into_rejection_and_outage(#[case] status: StatusCode, #[case] rejected: bool) {
        let error = map_status_error(status, br#"{"msg":"invalid JWT"}"#);
        assert_eq!(
            matches!(error, AccessTokenVerifierError::Rejected { .. }),
            rejected
        );
    }

    #[test]
    fn user_payload_yields_id() {
        let body = br#"{"id":"3fa85f64-5717-4562-b3fc-2c963f66afa6","aud":"authenticated","email":"lifter@example.com"}"#;
        let user_id = parse_user_id(body).expect("id parses");
        assert_eq!(user_id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[test]
    fn malformed_payload_is_an_outage() {
        let error = parse_user_id(b"{}").expect_err("missing id");
        assert!(matches!(error, AccessTokenVerifierError::Unavailable { .. }));
    }

    #[test]
    fn endpoint_is_under_project_url() {
        let url = Url::parse("https://abc.supabase.co").expect("url");
        let verifier = SupabaseTokenVerifier::new(
            &url,
            Zeroizing::new("anon".to_owned()),
            Duration::from_secs(1),
        )
        .expect("verifier builds");
        assert_eq!(
            verifier.user_endpoint.as_str(),
            "https://abc.supabase.co/auth/v1/user"
        );
    }
}
