// API client module: a small blocking HTTP client for the Sonarr REST API.
// Every request URL is composed from the saved base URL (see `endpoint`) and
// carries the API key, and every response is checked for a success status
// before its JSON body is decoded.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::credentials::Credentials;
use crate::endpoint;
use crate::error::{Error, Result};

pub const SERIES_LOOKUP: &str = "api/series/lookup";
pub const SERIES: &str = "api/series";
pub const PROFILES: &str = "api/profile";
pub const ROOT_FOLDERS: &str = "api/rootfolder";

/// Options that apply to every request the client makes.
#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    pub timeout: Duration,
}

/// Blocking client bound to one Sonarr instance.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// A TV series as returned by Sonarr's lookup and series endpoints. Fields
/// the client does not use are kept in `extra` so a looked-up series can be
/// sent back to Sonarr without losing anything.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub year: u32,
    #[serde(default)]
    pub tvdb_id: u64,
    #[serde(default)]
    pub overview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_profile_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder_path: Option<String>,
    #[serde(default)]
    pub monitored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_options: Option<AddOptions>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Options Sonarr applies when a series is first added.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddOptions {
    #[serde(default)]
    pub search_for_missing_episodes: bool,
    #[serde(default)]
    pub ignore_episodes_with_files: bool,
    #[serde(default)]
    pub ignore_episodes_without_files: bool,
}

/// Quality profile.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: u64,
    pub name: String,
}

/// Root folder series can be downloaded into.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RootFolder {
    pub id: u64,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_space: Option<u64>,
}

impl ApiClient {
    /// Create a client for the instance described by `credentials`.
    pub fn new(credentials: &Credentials, options: ClientOptions) -> Result<Self> {
        endpoint::parse_base(&credentials.service_url)?;
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(Error::transport)?;
        Ok(ApiClient {
            client,
            base_url: credentials.service_url.clone(),
            api_key: credentials.api_key.clone(),
        })
    }

    fn url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
        endpoint::compose_request(&self.base_url, endpoint, params, &self.api_key)
    }

    /// GET `endpoint` with optional query parameters.
    pub fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Response> {
        tracing::debug!(endpoint, "sonarr GET request");
        let url = self.url(endpoint, params)?;
        send(self.client.get(url))
    }

    /// PUT a JSON body to `endpoint`.
    pub fn put<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Response> {
        tracing::debug!(endpoint, "sonarr PUT request");
        let url = self.url(endpoint, &[])?;
        send(self.client.put(url).json(body))
    }

    /// POST a JSON body to `endpoint`.
    pub fn post<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Response> {
        tracing::debug!(endpoint, "sonarr POST request");
        let url = self.url(endpoint, &[])?;
        send(self.client.post(url).json(body))
    }

    /// DELETE `endpoint` with optional query parameters.
    pub fn delete(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Response> {
        tracing::debug!(endpoint, "sonarr DELETE request");
        let url = self.url(endpoint, params)?;
        send(self.client.delete(url))
    }

    /// Search the series lookup for `term`.
    pub fn search(&self, term: &str) -> Result<Vec<Series>> {
        decode(self.get(SERIES_LOOKUP, &[("term", term)])?)
    }

    /// Look a series up by its TVDB id.
    pub fn series_by_tvdb(&self, tvdb_id: u64) -> Result<Series> {
        let term = format!("tvdb:{tvdb_id}");
        let results: Vec<Series> = decode(self.get(SERIES_LOOKUP, &[("term", &term)])?)?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("series with tvdb id {tvdb_id}")))
    }

    pub fn profiles(&self) -> Result<Vec<Profile>> {
        decode(self.get(PROFILES, &[])?)
    }

    pub fn root_folders(&self) -> Result<Vec<RootFolder>> {
        decode(self.get(ROOT_FOLDERS, &[])?)
    }

    /// Add a series to Sonarr, returning the stored record.
    pub fn add_series(&self, series: &Series) -> Result<Series> {
        decode(self.post(SERIES, series)?)
    }

    /// Update an existing series.
    pub fn update_series(&self, series: &Series) -> Result<Series> {
        decode(self.put(SERIES, series)?)
    }

    /// Remove a series, optionally deleting its files on disk.
    pub fn delete_series(&self, id: u64, delete_files: bool) -> Result<()> {
        let endpoint = format!("{SERIES}/{id}");
        let delete_files = if delete_files { "true" } else { "false" };
        self.delete(&endpoint, &[("deleteFiles", delete_files)])?;
        Ok(())
    }
}

/// Send the request and turn non-success statuses into `Error::Status`.
fn send(request: RequestBuilder) -> Result<Response> {
    let res = request.send().map_err(Error::transport)?;
    let status = res.status();
    if !status.is_success() {
        let body = res.text().unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "sonarr request failed");
        return Err(Error::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        });
    }
    Ok(res)
}

/// Decode a JSON response body.
pub fn decode<T: DeserializeOwned>(res: Response) -> Result<T> {
    let body = res.text().map_err(Error::transport)?;
    Ok(serde_json::from_str(&body)?)
}
