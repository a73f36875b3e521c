//! Reqwest-backed profile store adapter.
//!
//! This adapter owns transport details only: URL and header construction,
//! timeout and HTTP error mapping, and JSON decoding into rows.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::PostgrestErrorDto;
use crate::domain::ports::{Filter, ProfileStore, ProfileStoreError, Row, SelectQuery};
use crate::domain::profile_error::NO_ROWS_CODE;
use crate::outbound::{AdapterBuildError, body_preview};

const REST_PATH: &str = "rest/v1/";
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const PREFER_MINIMAL: &str = "return=minimal";
const API_KEY_HEADER: &str = "apikey";

/// Profile store speaking the PostgREST dialect over HTTP.
pub struct PostgrestProfileStore {
    client: Client,
    rest_base: Url,
    api_key: Zeroizing<String>,
}

impl PostgrestProfileStore {
    /// Build an adapter for the project at `project_url`, authenticating with
    /// the service key.
    ///
    /// # Errors
    ///
    /// Returns an error when the REST base URL cannot be derived or the
    /// reqwest client cannot be constructed.
    pub fn new(
        project_url: &Url,
        api_key: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Self, AdapterBuildError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            rest_base: project_url.join(REST_PATH)?,
            api_key,
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, ProfileStoreError> {
        self.rest_base.join(table).map_err(|error| {
            ProfileStoreError::rejected("invalid_table", format!("{table}: {error}"))
        })
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key.as_str()))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ProfileStoreError> {
        let response = self
            .authorised(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(map_status_error(status, body.as_ref()))
        }
    }
}

#[async_trait]
impl ProfileStore for PostgrestProfileStore {
    async fn select_single(&self, query: &SelectQuery) -> Result<Option<Row>, ProfileStoreError> {
        let request = self
            .client
            .get(self.table_url(&query.table)?)
            .header(ACCEPT, SINGLE_OBJECT)
            .query(&select_params(query));
        match self.send(request).await {
            Ok(body) => parse_row(&body).map(Some),
            Err(error) if is_empty_result(&error) => {
                debug!(table = %query.table, "select matched no rows");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    async fn insert(&self, table: &str, row: &Row) -> Result<(), ProfileStoreError> {
        let request = self
            .client
            .post(self.table_url(table)?)
            .header("Prefer", PREFER_MINIMAL)
            .json(row);
        self.send(request).await.map(drop)
    }

    async fn update(
        &self,
        table: &str,
        changes: &Row,
        filter: &Filter,
    ) -> Result<(), ProfileStoreError> {
        let request = self
            .client
            .patch(self.table_url(table)?)
            .header("Prefer", PREFER_MINIMAL)
            .query(&[filter_param(filter)])
            .json(changes);
        self.send(request).await.map(drop)
    }
}

/// PostgREST rejects whitespace inside `select`, so `users (name, email)`
/// becomes `users(name,email)`.
fn compact_select(expression: &str) -> String {
    expression.chars().filter(|c| !c.is_whitespace()).collect()
}

fn filter_param(filter: &Filter) -> (String, String) {
    (filter.column.clone(), format!("eq.{}", filter.value))
}

fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    std::iter::once(("select".to_owned(), compact_select(&query.columns)))
        .chain(query.filters.iter().map(filter_param))
        .collect()
}

fn parse_row(body: &[u8]) -> Result<Row, ProfileStoreError> {
    serde_json::from_slice(body)
        .map_err(|error| ProfileStoreError::decode(format!("invalid PostgREST row: {error}")))
}

/// Single-object selects answer zero rows with `PGRST116`; the same code
/// also covers multiple rows, which stays an error.
fn is_empty_result(error: &ProfileStoreError) -> bool {
    matches!(
        error,
        ProfileStoreError::Rejected { code, message }
            if code == NO_ROWS_CODE && message.contains(" 0 rows")
    )
}

fn map_transport_error(error: reqwest::Error) -> ProfileStoreError {
    ProfileStoreError::unavailable(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ProfileStoreError {
    let transient = status.is_server_error()
        || matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT
        );
    let preview = body_preview(body);
    if transient {
        return ProfileStoreError::unavailable(format!("status {}: {preview}", status.as_u16()));
    }

    match serde_json::from_slice::<PostgrestErrorDto>(body) {
        Ok(dto) => {
            let message = dto.full_message();
            let code = dto.code.unwrap_or_else(|| status.as_u16().to_string());
            ProfileStoreError::rejected(code, message)
        }
        Err(_) => ProfileStoreError::rejected(status.as_u16().to_string(), preview),
    }
}
