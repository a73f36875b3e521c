//! Driving port for athlete profile writes.

use async_trait::async_trait;

use crate::domain::{AthleteProfileChange, CreateAthleteProfile, Error, UserId};

/// Use-case port for creating and updating the caller's athlete profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AthleteProfileCommand: Send + Sync {
    /// Complete the profile of a newly registered user.
    async fn create_profile(
        &self,
        user_id: &UserId,
        request: CreateAthleteProfile,
    ) -> Result<(), Error>;

    /// Apply one field change to the caller's profile.
    async fn update_profile(
        &self,
        user_id: &UserId,
        change: AthleteProfileChange,
    ) -> Result<(), Error>;
}
