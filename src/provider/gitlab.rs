//! GitLab merge request adapter (REST v4).

use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use super::{
    api_url, build_http_client, check_response, join_segments, ExistingRequest, ProviderError,
    ProviderFuture, RepoProvider, RequestRecord,
};

/// Public GitLab instance.
pub const DEFAULT_INSTANCE_URL: &str = "https://gitlab.com";

/// Merge request as returned by the GitLab API.
#[derive(Deserialize, Debug)]
struct MergeRequestResponse {
    iid: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    web_url: String,
    state: String,
}

impl From<MergeRequestResponse> for ExistingRequest {
    fn from(mr: MergeRequestResponse) -> Self {
        Self {
            id: mr.iid,
            title: mr.title,
            description: mr.description.unwrap_or_default(),
            url: mr.web_url,
            state: mr.state,
        }
    }
}

impl From<MergeRequestResponse> for RequestRecord {
    fn from(mr: MergeRequestResponse) -> Self {
        Self {
            id: mr.iid,
            url: mr.web_url,
            state: mr.state,
        }
    }
}

#[derive(Serialize, Debug)]
struct CreateMergeRequest<'a> {
    source_branch: &'a str,
    target_branch: &'a str,
    title: &'a str,
    description: &'a str,
}

#[derive(Serialize, Debug)]
struct UpdateMergeRequest<'a> {
    title: &'a str,
    description: &'a str,
}

/// GitLab REST client for merge requests.
pub struct GitLabProvider {
    client: Client,
    token: String,
    api_base: Url,
}

impl GitLabProvider {
    /// Creates a client for gitlab.com.
    pub fn new(token: String) -> Result<Self, ProviderError> {
        Self::with_instance_url(token, DEFAULT_INSTANCE_URL)
    }

    /// Creates a client for a self-hosted (or mock) instance; `/api/v4` is appended.
    pub fn with_instance_url(token: String, instance_url: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client()?,
            token,
            api_base: api_url(instance_url, &["api", "v4"])?,
        })
    }

    /// Returns `/projects/{url-encoded path}/merge_requests[/tail..]`.
    fn merge_requests_url(&self, project: &str, tail: &[&str]) -> Result<Url, ProviderError> {
        if project.is_empty() || project.starts_with('/') || project.ends_with('/') {
            return Err(ProviderError::InvalidRepository(project.to_string()));
        }
        let mut segments = vec!["projects", project, "merge_requests"];
        segments.extend_from_slice(tail);
        join_segments(&self.api_base, segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("PRIVATE-TOKEN", &self.token)
    }

    async fn send_for_merge_request(
        &self,
        builder: RequestBuilder,
    ) -> Result<MergeRequestResponse, ProviderError> {
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

impl RepoProvider for GitLabProvider {
    fn name(&self) -> &'static str {
        "GitLab"
    }

    fn request_noun(&self) -> &'static str {
        "merge request"
    }

    fn request_ref(&self, id: u64) -> String {
        format!("!{id}")
    }

    fn find_existing_request<'a>(
        &'a self,
        repository: &'a str,
        source_branch: &'a str,
        target_branch: &'a str,
    ) -> ProviderFuture<'a, Option<ExistingRequest>> {
        Box::pin(async move {
            let mut url = self.merge_requests_url(repository, &[])?;
            url.query_pairs_mut()
                .append_pair("state", "opened")
                .append_pair("source_branch", source_branch)
                .append_pair("target_branch", target_branch);

            info!(%url, "Looking up open GitLab merge requests");
            let response = self
                .request(Method::GET, url)
                .send()
                .await
                .map_err(|e| ProviderError::Network(e.to_string()))?;
            let merge_requests: Vec<MergeRequestResponse> = check_response(response)
                .await?
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

            debug!(count = merge_requests.len(), "GitLab returned open merge requests");
            Ok(merge_requests.into_iter().next().map(ExistingRequest::from))
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
            let url = self.merge_requests_url(repository, &[])?;
            let payload = CreateMergeRequest {
                source_branch,
                target_branch,
                title,
                description,
            };

            info!(%url, source_branch, target_branch, "Creating GitLab merge request");
            let mr = self
                .send_for_merge_request(self.request(Method::POST, url).json(&payload))
                .await?;
            Ok(mr.into())
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
            let iid = request_id.to_string();
            let url = self.merge_requests_url(repository, &[iid.as_str()])?;
            let payload = UpdateMergeRequest { title, description };

            info!(%url, iid = request_id, "Updating GitLab merge request");
            let mr = self
                .send_for_merge_request(self.request(Method::PUT, url).json(&payload))
                .await?;
            Ok(mr.into())
        })
    }
}
