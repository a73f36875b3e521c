//! PostgREST outbound adapter.
//!
//! Implements the `ProfileStore` port against the hosted REST interface
//! exposed at `{base}/rest/v1/{table}`.

mod client;
mod dto;

pub use client::PostgrestProfileStore;
