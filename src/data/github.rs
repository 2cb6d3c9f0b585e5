//! GitHub profile summary client
//!
//! Fetches per-user statistics (languages, stars, commit activity) from the
//! profile-summary-for-github API.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::CacheManager;
use crate::settings::GithubSettings;

/// Base URL for the profile summary API
const PROFILE_SUMMARY_BASE_URL: &str = "https://profile-summary-for-github.com/api/user";

/// Cache key for `username`'s profile data, one slot per user
pub fn github_cache_key(username: &str) -> String {
    format!("github.{}", username.trim())
}

/// Public profile of a GitHub user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub hireable: bool,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub public_repos: u64,
}

/// Aggregated statistics for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubData {
    pub user: GithubUser,
    /// Commits per quarter, keyed like "2024-Q3"
    #[serde(default)]
    pub quarter_commit_count: BTreeMap<String, u64>,
    #[serde(default)]
    pub lang_repo_count: BTreeMap<String, u64>,
    #[serde(default)]
    pub lang_star_count: BTreeMap<String, u64>,
    #[serde(default)]
    pub lang_commit_count: BTreeMap<String, u64>,
    #[serde(default)]
    pub repo_star_count: BTreeMap<String, u64>,
}

impl GithubData {
    /// Stars across all of the user's repositories
    pub fn total_stars(&self) -> u64 {
        self.repo_star_count.values().sum()
    }

    /// Commits across all recorded quarters
    pub fn total_commits(&self) -> u64 {
        self.quarter_commit_count.values().sum()
    }

    /// Languages by repository count, most used first, skipping `excluded`
    /// (compared case-insensitively). Ties are broken by name.
    pub fn top_languages(&self, limit: usize, excluded: &[String]) -> Vec<(&str, u64)> {
        let mut languages: Vec<(&str, u64)> = self
            .lang_repo_count
            .iter()
            .filter(|(lang, _)| !excluded.iter().any(|ex| ex.eq_ignore_ascii_case(lang)))
            .map(|(lang, count)| (lang.as_str(), *count))
            .collect();
        languages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        languages.truncate(limit);
        languages
    }
}

/// Errors that can occur when fetching GitHub data
#[derive(Debug, Error)]
pub enum GithubError {
    /// HTTP request failed or returned an error status
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// No username configured
    #[error("GitHub username not set")]
    MissingUsername,

    /// The API does not know the user
    #[error("GitHub user '{0}' not found")]
    UserNotFound(String),

    /// The base URL cannot carry a username path segment
    #[error("Invalid profile URL: '{0}'")]
    InvalidUrl(String),
}

/// Client for the profile summary API
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GithubClient {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: PROFILE_SUMMARY_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Request URL for `username`, with the username as a single path segment
    fn profile_url(&self, username: &str) -> Result<Url, GithubError> {
        let invalid = || GithubError::InvalidUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(username);
        Ok(url)
    }

    /// Fetch the profile summary for `username`
    pub async fn fetch_profile(&self, username: &str) -> Result<GithubData, GithubError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(GithubError::MissingUsername);
        }

        let url = self.profile_url(username)?;
        log::info!("fetching GitHub profile for '{}'", username);

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(GithubError::UserNotFound(username.to_string()));
        }
        let text = response.error_for_status()?.text().await?;

        parse_profile(&text)
    }

    /// Fetch the profile through `cache` using the username and cache
    /// duration from `settings`.
    ///
    /// An empty username fails before the cache is consulted.
    pub async fn fetch_cached(
        &self,
        cache: &CacheManager,
        settings: &GithubSettings,
    ) -> Result<GithubData, GithubError> {
        let username = settings.username.trim();
        if username.is_empty() {
            return Err(GithubError::MissingUsername);
        }

        let params = GithubParams { username };
        let ttl = Duration::from_secs(settings.cache_duration_minutes.saturating_mul(60));

        cache
            .get(&github_cache_key(username), &params, ttl, || {
                self.fetch_profile(username)
            })
            .await
    }
}

#[derive(Debug, Serialize)]
struct GithubParams<'a> {
    username: &'a str,
}

/// Parse a profile summary response body
pub fn parse_profile(body: &str) -> Result<GithubData, GithubError> {
    Ok(serde_json::from_str(body)?)
}
