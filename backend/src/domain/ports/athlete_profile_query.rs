//! Driving port for athlete profile reads.

use async_trait::async_trait;

use crate::domain::{AthleteId, Error};

use super::Row;

/// Use-case port for reading an athlete's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AthleteProfileQuery: Send + Sync {
    /// Load the requested fields of the athlete's profile.
    ///
    /// An empty `fields` slice selects the default projection.
    async fn retrieve_profile(
        &self,
        athlete_id: &AthleteId,
        fields: &[String],
    ) -> Result<Row, Error>;
}
