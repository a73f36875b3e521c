//! Port for verifying bearer tokens issued by the identity provider.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token verification adapters.
    pub enum AccessTokenVerifierError {
        /// The provider does not recognise the token.
        Rejected { message: String } => "access token rejected: {message}",
        /// The provider could not be reached.
        Unavailable { message: String } => "identity provider unavailable: {message}",
    }
}

/// Resolve an access token to the user it was issued for.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessTokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<UserId, AccessTokenVerifierError>;
}

/// Verifier accepting a single known token, for tests and local runs.
#[derive(Debug, Clone)]
pub struct FixtureAccessTokenVerifier {
    token: String,
    user_id: UserId,
}

impl FixtureAccessTokenVerifier {
    pub fn new(token: impl Into<String>, user_id: UserId) -> Self {
        Self {
            token: token.into(),
            user_id,
        }
    }
}

#[async_trait]
impl AccessTokenVerifier for FixtureAccessTokenVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, AccessTokenVerifierError> {
        if token == self.token {
            Ok(self.user_id.clone())
        } else {
            Err(AccessTokenVerifierError::rejected("unknown token"))
        }
    }
}
