//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use crate::domain::UserId;
use crate::domain::ports::{
    FixtureAccessTokenVerifier, MockAthleteProfileCommand, MockAthleteProfileQuery,
};

use super::state::HttpState;

/// Token accepted by [`test_state`].
pub const TEST_TOKEN: &str = "test-token";

const TEST_USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

pub fn test_user_id() -> UserId {
    UserId::new(TEST_USER_ID).expect("fixture user id")
}

/// `Authorization` header value carrying [`TEST_TOKEN`].
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {TEST_TOKEN}"))
}

/// State whose profile ports are the supplied mocks.
pub fn state_with(command: MockAthleteProfileCommand, query: MockAthleteProfileQuery) -> HttpState {
    HttpState::new(
        Arc::new(command),
        Arc::new(query),
        Arc::new(FixtureAccessTokenVerifier::new(TEST_TOKEN, test_user_id())),
    )
}

/// State with mocks that expect no profile calls.
pub fn test_state() -> HttpState {
    state_with(MockAthleteProfileCommand::new(), MockAthleteProfileQuery::new())
}
