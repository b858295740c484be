//! Code-hosting providers: the minimal request operations the workflow needs.
//!
//! The workflow engine only sees [`RepoProvider`]. GitHub and GitLab differ in
//! field names (`head`/`base`/`body` versus
//! `source_branch`/`target_branch`/`description`) and in the verb used to
//! update, and those differences stay inside the adapters.

pub mod error;
pub mod github;
pub mod gitlab;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

pub use error::ProviderError;
pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;

/// HTTP request timeout for provider API calls.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An open pull/merge request observed on the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingRequest {
    /// Pull request number (GitHub) or merge request iid (GitLab).
    pub id: u64,
    /// Current title.
    pub title: String,
    /// Current body/description; empty when the provider returns none.
    pub description: String,
    /// Web URL.
    pub url: String,
    /// Provider state, e.g. `open` or `opened`.
    pub state: String,
}

/// Result of a create or update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    /// Pull request number or merge request iid.
    pub id: u64,
    /// Web URL.
    pub url: String,
    /// Provider state after the call.
    pub state: String,
}

/// Boxed future returned by provider operations.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Minimal pull/merge request capability of a hosting provider.
pub trait RepoProvider: Send + Sync {
    /// Display name, e.g. "GitHub".
    fn name(&self) -> &'static str;

    /// What the provider calls a request, e.g. "pull request".
    fn request_noun(&self) -> &'static str;

    /// Formats a request id the way the provider shows it (`#42`, `!42`).
    fn request_ref(&self, id: u64) -> String;

    /// Looks up the open request between two branches.
    ///
    /// "Not found" is `Ok(None)`; transport and auth problems are errors.
    fn find_existing_request<'a>(
        &'a self,
        repository: &'a str,
        source_branch: &'a str,
        target_branch: &'a str,
    ) -> ProviderFuture<'a, Option<ExistingRequest>>;

    /// Opens a new request from `source_branch` into `target_branch`.
    fn create_request<'a>(
        &'a self,
        repository: &'a str,
        source_branch: &'a str,
        target_branch: &'a str,
        title: &'a str,
        description: &'a str,
    ) -> ProviderFuture<'a, RequestRecord>;

    /// Replaces the title and description of an existing request.
    fn update_request<'a>(
        &'a self,
        repository: &'a str,
        request_id: u64,
        title: &'a str,
        description: &'a str,
    ) -> ProviderFuture<'a, RequestRecord>;
}

/// Supported hosting providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// github.com or GitHub Enterprise.
    #[value(name = "github")]
    GitHub,
    /// gitlab.com or self-hosted GitLab.
    #[value(name = "gitlab")]
    GitLab,
}

impl ProviderKind {
    /// Guesses the provider from a remote host name.
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.to_lowercase();
        if host.contains("github") {
            Some(Self::GitHub)
        } else if host.contains("gitlab") {
            Some(Self::GitLab)
        } else {
            None
        }
    }

    /// Environment variables holding the API token, in lookup order.
    pub fn token_variables(self) -> &'static [&'static str] {
        match self {
            Self::GitHub => &["GITHUB_TOKEN", "GH_TOKEN"],
            Self::GitLab => &["GITLAB_TOKEN", "GITLAB_PRIVATE_TOKEN"],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GitHub => write!(f, "GitHub"),
            Self::GitLab => write!(f, "GitLab"),
        }
    }
}

/// Builds an HTTP client with the provider timeout and a user agent.
pub(crate) fn build_http_client() -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("pr-scribe/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::Network(e.to_string()))
}

/// Returns the response unchanged on success, or an [`ProviderError::Api`]
/// carrying the raw body text.
pub(crate) async fn check_response(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_else(|e| {
        tracing::debug!("Failed to read error response body: {e}");
        String::new()
    });
    Err(ProviderError::Api { status, body })
}

/// Parses a base URL and appends fixed path segments to it.
pub(crate) fn api_url(base: &str, segments: &[&str]) -> Result<url::Url, ProviderError> {
    let mut url = url::Url::parse(base).map_err(|_| ProviderError::InvalidUrl(base.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| ProviderError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Appends path segments to a copy of `base`, percent-encoding each one.
pub(crate) fn join_segments<I, S>(base: &url::Url, segments: I) -> Result<url::Url, ProviderError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ProviderError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_host() {
        assert_eq!(ProviderKind::from_host("github.com"), Some(ProviderKind::GitHub));
        assert_eq!(
            ProviderKind::from_host("GitLab.Example.org"),
            Some(ProviderKind::GitLab)
        );
        assert_eq!(ProviderKind::from_host("bitbucket.org"), None);
    }

    #[test]
    fn provider_serde_names() {
        assert_eq!(serde_json::to_string(&ProviderKind::GitHub).unwrap(), "\"github\"");
        assert_eq!(
            serde_json::from_str::<ProviderKind>("\"gitlab\"").unwrap(),
            ProviderKind::GitLab
        );
    }

    #[test]
    fn api_url_keeps_base_path() {
        let url = api_url("https://ghe.example.com/api/v3", &["repos"]).unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/repos");

        let url = api_url("https://api.github.com", &["repos"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos");
    }

    #[test]
    fn join_segments_encodes_slashes() {
        let base = url::Url::parse("https://gitlab.com/api/v4").unwrap();
        let url = join_segments(&base, ["projects", "group/sub/project"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://gitlab.com/api/v4/projects/group%2Fsub%2Fproject"
        );
    }

    #[test]
    fn api_url_rejects_garbage() {
        assert!(matches!(
            api_url("not a url", &[]),
            Err(ProviderError::InvalidUrl(_))
        ));
    }
}
