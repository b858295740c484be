//! GitHub pull request adapter (REST v3).

use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use super::{
    api_url, build_http_client, check_response, join_segments, ExistingRequest, ProviderError,
    ProviderFuture, RepoProvider, RequestRecord,
};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Pull request as returned by the GitHub API.
#[derive(Deserialize, Debug)]
struct PullRequestResponse {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    html_url: String,
    state: String,
}

impl From<PullRequestResponse> for ExistingRequest {
    fn from(pr: PullRequestResponse) -> Self {
        Self {
            id: pr.number,
            title: pr.title,
            description: pr.body.unwrap_or_default(),
            url: pr.html_url,
            state: pr.state,
        }
    }
}

impl From<PullRequestResponse> for RequestRecord {
    fn from(pr: PullRequestResponse) -> Self {
        Self {
            id: pr.number,
            url: pr.html_url,
            state: pr.state,
        }
    }
}

#[derive(Serialize, Debug)]
struct CreatePullRequest<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
}

#[derive(Serialize, Debug)]
struct UpdatePullRequest<'a> {
    title: &'a str,
    body: &'a str,
}

/// GitHub REST client for pull requests.
pub struct GitHubProvider {
    client: Client,
    token: String,
    api_base: Url,
}

impl GitHubProvider {
    /// Creates a client for github.com.
    pub fn new(token: String) -> Result<Self, ProviderError> {
        Self::with_api_url(token, DEFAULT_API_URL)
    }

    /// Creates a client for a GitHub Enterprise (or mock) API base URL.
    pub fn with_api_url(token: String, api_url_base: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client()?,
            token,
            api_base: api_url(api_url_base, &[])?,
        })
    }

    /// Returns `/repos/{owner}/{repo}/pulls[/tail..]`.
    fn pulls_url(&self, repository: &str, tail: &[&str]) -> Result<Url, ProviderError> {
        let (owner, repo) = split_repository(repository)?;
        let mut segments = vec!["repos", owner, repo, "pulls"];
        segments.extend_from_slice(tail);
        join_segments(&self.api_base, segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn send_for_pull(&self, builder: RequestBuilder) -> Result<PullRequestResponse, ProviderError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

/// Splits `owner/repo` into its two parts.
fn split_repository(repository: &str) -> Result<(&str, &str), ProviderError> {
    match repository.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(ProviderError::InvalidRepository(repository.to_string())),
    }
}

impl RepoProvider for GitHubProvider {
    fn name(&self) -> &'static str {
        "GitHub"
    }

    fn request_noun(&self) -> &'static str {
        "pull request"
    }

    fn request_ref(&self, id: u64) -> String {
        format!("#{id}")
    }

    fn find_existing_request<'a>(
        &'a self,
        repository: &'a str,
        source_branch: &'a str,
        target_branch: &'a str,
    ) -> ProviderFuture<'a, Option<ExistingRequest>> {
        Box::pin(async move {
            let (owner, _) = split_repository(repository)?;
            let mut url = self.pulls_url(repository, &[])?;
            url.query_pairs_mut()
                .append_pair("state", "open")
                .append_pair("head", &format!("{owner}:{source_branch}"))
                .append_pair("base", target_branch);

            info!(%url, "Looking up open GitHub pull requests");
            let response = self
                .request(Method::GET, url)
                .send()
                .await
                .map_err(|e| ProviderError::Network(e.to_string()))?;
            let pulls: Vec<PullRequestResponse> = check_response(response)
                .await?
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

            debug!(count = pulls.len(), "GitHub returned open pull requests");
            Ok(pulls.into_iter().next().map(ExistingRequest::from))
        })
    }

    fn create_request<'a>(
        &'a self,
        repository: &'a str,
        source_branch: &'a str,
        target_branch: &'a str,
        title: &'a str,
        description: &'a str,
    ) -> ProviderFuture<'a, RequestRecord> {
        Box::pin(async move {
            let url = self.pulls_url(repository, &[])?;
            let payload = CreatePullRequest {
                title,
                head: source_branch,
                base: target_branch,
                body: description,
            };

            info!(%url, head = source_branch, base = target_branch, "Creating GitHub pull request");
            let pr = self
                .send_for_pull(self.request(Method::POST, url).json(&payload))
                .await?;
            Ok(pr.into())
        })
    }

    fn update_request<'a>(
        &'a self,
        repository: &'a str,
        request_id: u64,
        title: &'a str,
        description: &'a str,
    ) -> ProviderFuture<'a, RequestRecord> {
        Box::pin(async move {
            let number = request_id.to_string();
            let url = self.pulls_url(repository, &[number.as_str()])?;
            let payload = UpdatePullRequest {
                title,
                body: description,
            };

            info!(%url, number = request_id, "Updating GitHub pull request");
            let pr = self
                .send_for_pull(self.request(Method::PATCH, url).json(&payload))
                .await?;
            Ok(pr.into())
        })
    }
}
