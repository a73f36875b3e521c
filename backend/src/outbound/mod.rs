//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **postgrest**: the profile store, reached over the PostgREST HTTP API
//! - **supabase_auth**: access token verification against the auth API
//!
//! Adapters are thin translators between domain types and wire formats. They
//! contain no business logic.

pub mod postgrest;
pub mod supabase_auth;

/// Failure to construct an HTTP adapter at startup.
#[derive(Debug, thiserror::Error)]
pub enum AdapterBuildError {
    #[error("invalid adapter base URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Whitespace-collapsed, length-capped rendering of a response body for logs
/// and error messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
