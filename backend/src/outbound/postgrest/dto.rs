//! DTOs for PostgREST error bodies.

use serde::Deserialize;

/// Error body returned by PostgREST, e.g.
/// `{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned","details":"...","hint":null}`.
#[derive(Debug, Deserialize)]
pub(super) struct PostgrestErrorDto {
    pub(super) code: Option<String>,
    pub(super) message: Option<String>,
    #[serde(default)]
    pub(super) details: Option<String>,
    #[serde(default)]
    pub(super) hint: Option<String>,
}

impl PostgrestErrorDto {
    /// Human-readable message with details and hint appended when present.
    pub(super) fn full_message(&self) -> String {
        let mut message = self.message.clone().unwrap_or_default();
        for extra in [&self.details, &self.hint].into_iter().flatten() {
            if extra.is_empty() {
                continue;
            }
            if !message.is_empty() {
                message.push_str(" (");
                message.push_str(extra);
                message.push(')');
            } else {
                message.clone_from(extra);
            }
        }
        message
    }
}
