//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers that need the caller's identity take an [`AuthenticatedUser`]
//! argument. The extractor reads `Authorization: Bearer <token>` and asks the
//! identity provider, through [`AccessTokenVerifier`], who the token belongs
//! to.
//!
//! [`AccessTokenVerifier`]: crate::domain::ports::AccessTokenVerifier

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::domain::ports::AccessTokenVerifierError;
use crate::domain::{Error, UserId};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller, established from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &UserId {
        &self.0
    }

    pub fn into_inner(self) -> UserId {
        self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

fn map_verifier_error(error: AccessTokenVerifierError) -> Error {
    match error {
        AccessTokenVerifierError::Rejected { message } => {
            debug!(reason = %message, "access token rejected");
            Error::unauthorized("Invalid token")
        }
        AccessTokenVerifierError::Unavailable { message } => {
            warn!(error = %message, "identity provider unavailable");
            Error::service_unavailable("identity provider unavailable")
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token.ok_or_else(|| Error::unauthorized("No token provided"))?;
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not registered with the app"))?;
            state
                .tokens
                .verify(&token)
                .await
                .map(AuthenticatedUser)
                .map_err(map_verifier_error)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::inbound::http::test_utils::{test_state, test_user_id};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.user_id().to_string())
    }

    #[rstest]
    #[case(None, StatusCode::UNAUTHORIZED, Some("No token provided"))]
    #[case(Some("Basic abc"), StatusCode::UNAUTHORIZED, Some("No token provided"))]
    #[case(Some("Bearer "), StatusCode::UNAUTHORIZED, Some("No token provided"))]
    #[case(Some("Bearer forged"), StatusCode::UNAUTHORIZED, Some("Invalid token"))]
    #[case(Some("Bearer test-token"), StatusCode::OK, None)]
    #[actix_web::test]
    async fn bearer_header_is_verified(
        #[case] header: Option<&str>,
        #[case] status: StatusCode,
        #[case] message: Option<&str>,
    ) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;
        let mut request = actix_test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }
        let response = actix_test::call_service(&app, request.to_request()).await;
        assert_eq!(response.status(), status);

        let body = actix_test::read_body(response).await;
        match message {
            Some(expected) => {
                let error: Error = serde_json::from_slice(&body).expect("error payload");
                assert_eq!(error.message(), expected);
            }
            None => assert_eq!(body, test_user_id().to_string()),
        }
    }

    #[test]
    fn provider_outage_is_service_unavailable() {
        let err = map_verifier_error(AccessTokenVerifierError::unavailable("timeout"));
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
