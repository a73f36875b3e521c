//! Tests for HTTP error mapping.

use super::*;
use crate::domain::{ProfileError, StoreFailure};
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn trace_id() -> String {
    TRACE_ID.to_owned()
}

async fn decode(error: &Error, expected_status: StatusCode) -> (Option<String>, Error) {
    let response = ResponseError::error_response(error);
    assert_eq!(response.status(), expected_status);
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|value| value.to_str().expect("ascii header").to_owned());
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("error JSON");
    (header, payload)
}

#[rstest]
#[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
#[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] code: ErrorCode, #[case] status: StatusCode) {
    assert_eq!(status_for(code), status);
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(trace_id: String) {
    let error = Error::internal("connection pool exhausted")
        .with_trace_id(trace_id.clone())
        .with_details(json!({ "secret": "x" }));

    let (header, payload) = decode(&error, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.message(), "Internal server error");
    assert_eq!(payload.trace_id(), Some(trace_id.as_str()));
    assert!(payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn profile_errors_keep_store_diagnostics() {
    let error = Error::from(ProfileError::ProfileLookupFailed(StoreFailure::new(
        "PGRST116",
        "JSON object requested, multiple (or no) rows returned",
    )));

    let (header, payload) = decode(&error, StatusCode::BAD_REQUEST).await;
    assert!(header.is_none());
    assert_eq!(
        payload.message(),
        "Failed to retrieve profile details: PGRST116 - JSON object requested, multiple (or no) rows returned"
    );
    assert_eq!(
        payload.details().and_then(|details| details.get("storeCode")),
        Some(&json!("PGRST116"))
    );
}

#[test]
fn actix_errors_become_internal_errors() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert!(err.details().is_none());
}
