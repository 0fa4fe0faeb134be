//! Supabase (PostgREST) HTTP client.
//!
//! Talks to the `locations` and `journal_entries` tables over the REST
//! interface. The project's anon key goes in the `apikey` header; the
//! caller's session token is sent as the bearer credential.

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::AccessToken;

use super::error::SupabaseError;
use super::types::{
    JournalEntryRow, JournalEntryUpdate, LocationRow, NewJournalEntry, NewLocation,
};

/// Media type asking PostgREST for a single object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Embedded select for entries with their location.
const ENTRY_SELECT: &str = "*,location:locations(*)";

/// PostgREST code for "no rows" on a single-object request.
const NO_ROWS: &str = "PGRST116";

/// Configuration for the Supabase client.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public anon key
    pub anon_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SupabaseConfig {
    /// Create a new config for the given project.
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            timeout_secs: 30,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// REST endpoint root.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url.trim_end_matches('/'))
    }

    /// Anon key with everything past the first 5 characters hidden.
    pub fn redacted_key(&self) -> String {
        let prefix: String = self.anon_key.chars().take(5).collect();
        format!("{prefix}...")
    }
}

/// Supabase REST client.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    rest_url: String,
}

impl SupabaseClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SupabaseConfig) -> Result<Self, SupabaseError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&config.anon_key).map_err(|_| SupabaseError::Api {
            status: 0,
            message: "Invalid anon key format".to_string(),
        })?;
        headers.insert(HeaderName::from_static("apikey"), api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        debug!(url = %config.url, key = %config.redacted_key(), "supabase client ready");

        Ok(Self {
            http,
            rest_url: config.rest_url(),
        })
    }

    fn table(&self, name: &str) -> String {
        format!("{}/{}", self.rest_url, name)
    }

    /// All locations, newest first.
    pub async fn get_locations(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<LocationRow>, SupabaseError> {
        let request = self
            .http
            .get(self.table("locations"))
            .bearer_auth(token.as_str())
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        fetch_json(request, "locations").await
    }

    /// Insert a location and return the stored row.
    pub async fn create_location(
        &self,
        token: &AccessToken,
        location: &NewLocation,
    ) -> Result<LocationRow, SupabaseError> {
        let request = self
            .http
            .post(self.table("locations"))
            .bearer_auth(token.as_str())
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .query(&[("select", "*")])
            .json(location);

        fetch_json(request, "new location").await
    }

    /// All journal entries with their embedded location, newest first.
    pub async fn get_journal_entries(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<JournalEntryRow>, SupabaseError> {
        let request = self
            .http
            .get(self.table("journal_entries"))
            .bearer_auth(token.as_str())
            .query(&[("select", ENTRY_SELECT), ("order", "created_at.desc")]);

        fetch_json(request, "journal entries").await
    }

    /// Insert a journal entry and return it with its location.
    pub async fn create_journal_entry(
        &self,
        token: &AccessToken,
        entry: &NewJournalEntry,
    ) -> Result<JournalEntryRow, SupabaseError> {
        let request = self
            .http
            .post(self.table("journal_entries"))
            .bearer_auth(token.as_str())
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .query(&[("select", ENTRY_SELECT)])
            .json(entry);

        fetch_json(request, "new journal entry").await
    }

    /// Apply a partial update to one journal entry.
    pub async fn update_journal_entry(
        &self,
        token: &AccessToken,
        id: &str,
        update: &JournalEntryUpdate,
    ) -> Result<JournalEntryRow, SupabaseError> {
        let filter = format!("eq.{id}");
        let request = self
            .http
            .patch(self.table("journal_entries"))
            .bearer_auth(token.as_str())
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .query(&[("id", filter.as_str()), ("select", ENTRY_SELECT)])
            .json(update);

        fetch_json(request, &format!("journal entry {id}")).await
    }

    /// Delete one journal entry.
    pub async fn delete_journal_entry(
        &self,
        token: &AccessToken,
        id: &str,
    ) -> Result<(), SupabaseError> {
        self.delete_by_id(token, "journal_entries", id).await
    }

    /// Delete one location.
    pub async fn delete_location(&self, token: &AccessToken, id: &str) -> Result<(), SupabaseError> {
        self.delete_by_id(token, "locations", id).await
    }

    async fn delete_by_id(
        &self,
        token: &AccessToken,
        table: &str,
        id: &str,
    ) -> Result<(), SupabaseError> {
        let filter = format!("eq.{id}");
        let request = self
            .http
            .delete(self.table(table))
            .bearer_auth(token.as_str())
            .query(&[("id", filter.as_str())]);

        let response = request.send().await?;
        check_status(response, &format!("{table} {id}")).await?;
        Ok(())
    }
}

/// Send a request and decode a JSON body.
async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    what: &str,
) -> Result<T, SupabaseError> {
    let response = request.send().await?;
    let response = check_status(response, what).await?;
    let body = response.text().await?;

    serde_json::from_str(&body).map_err(|e| SupabaseError::Json {
        message: e.to_string(),
    })
}

/// Map error statuses onto [`SupabaseError`].
async fn check_status(response: Response, what: &str) -> Result<Response, SupabaseError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(SupabaseError::Unauthorized);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(SupabaseError::NotFound(what.to_string()));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify_error(status, what, body));
    }

    Ok(response)
}

fn classify_error(status: StatusCode, what: &str, body: String) -> SupabaseError {
    if status == StatusCode::NOT_ACCEPTABLE && body.contains(NO_ROWS) {
        return SupabaseError::NotFound(what.to_string());
    }

    SupabaseError::Api {
        status: status.as_u16(),
        message: body,
    }
}
