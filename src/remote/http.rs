//! HTTP client for the repository service's `/api/*` endpoints.

use super::RemoteRepository;
use crate::config::RemoteConfig;
use crate::error::ApiError;
use crate::tree::TreeNode;
use crate::types::{BranchInfo, ContentMatch, RepoStatus, SearchKind, SearchResults};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct WriteRequest<'a> {
    path: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct PathRequest<'a> {
    path: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveRequest<'a> {
    old_path: &'a str,
    new_path: &'a str,
}

#[derive(Serialize)]
struct CommitRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct CommitResponse {
    hash: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// `RemoteRepository` over HTTP.
pub struct HttpRemote {
    base_url: String,
    client: Client,
}

impl HttpRemote {
    pub fn new(config: &RemoteConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            ApiError::ConfigError(format!("Invalid remote base URL '{}': {}", base_url, e))
        })?;
        let client = Client::builder()
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/api/file/<path>` with each segment percent-encoded.
    fn file_url(&self, path: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.endpoint("/api/file"))
            .map_err(|e| ApiError::ConfigError(format!("Invalid file endpoint: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::ConfigError("Remote base URL cannot carry a path".to_string()))?
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn with_branch(request: RequestBuilder, branch: Option<&str>) -> RequestBuilder {
        match branch {
            Some(branch) if !branch.is_empty() => request.query(&[("branch", branch)]),
            _ => request,
        }
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response, ApiError> {
        debug!(action, "Remote request");
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::remote(action, e))?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(ApiError::remote(action, Self::error_reason(response).await))
    }

    /// Human-readable reason from a failed response body.
    async fn error_reason(response: Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(&body) {
            return parsed.error;
        }
        let body = body.trim();
        if body.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        } else {
            body.to_string()
        }
    }

    async fn post_json<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
        action: &str,
    ) -> Result<Response, ApiError> {
        self.send(self.client.post(self.endpoint(path)).json(body), action)
            .await
    }
}

#[async_trait]
impl RemoteRepository for HttpRemote {
    async fn get_tree(&self, branch: Option<&str>) -> Result<TreeNode, ApiError> {
        let request = Self::with_branch(self.client.get(self.endpoint("/api/tree")), branch);
        let response = self.send(request, "fetch tree").await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::remote("parse tree", e))
    }

    async fn get_file(&self, path: &str, branch: Option<&str>) -> Result<String, ApiError> {
        let action = format!("fetch file {}", path);
        let request = Self::with_branch(self.client.get(self.file_url(path)?), branch);
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::remote(action.as_str(), e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }
        if !response.status().is_success() {
            return Err(ApiError::remote(action, Self::error_reason(response).await));
        }
        response
            .text()
            .await
            .map_err(|e| ApiError::remote(action, e))
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), ApiError> {
        self.post_json(
            "/api/write",
            &WriteRequest { path, content },
            &format!("write {}", path),
        )
        .await
        .map(|_| ())
    }

    async fn delete_file(&self, path: &str) -> Result<(), ApiError> {
        self.post_json("/api/delete", &PathRequest { path }, &format!("delete {}", path))
            .await
            .map(|_| ())
    }

    async fn move_file(&self, old_path: &str, new_path: &str) -> Result<(), ApiError> {
        self.post_json(
            "/api/move",
            &MoveRequest { old_path, new_path },
            &format!("move {} to {}", old_path, new_path),
        )
        .await
        .map(|_| ())
    }

    async fn move_folder(&self, old_path: &str, new_path: &str) -> Result<(), ApiError> {
        self.post_json(
            "/api/move-folder",
            &MoveRequest { old_path, new_path },
            &format!("move folder {} to {}", old_path, new_path),
        )
        .await
        .map(|_| ())
    }

    async fn commit(&self, message: &str) -> Result<String, ApiError> {
        let response = self
            .post_json("/api/commit", &CommitRequest { message }, "commit")
            .await?;
        let parsed: CommitResponse = response
            .json()
            .await
            .map_err(|e| ApiError::remote("parse commit response", e))?;
        Ok(parsed.hash)
    }

    async fn get_status(&self) -> Result<RepoStatus, ApiError> {
        let response = self
            .send(self.client.get(self.endpoint("/api/status")), "fetch status")
            .await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::remote("parse status", e))
    }

    async fn list_branches(&self) -> Result<Vec<BranchInfo>, ApiError> {
        let response = self
            .send(self.client.get(self.endpoint("/api/branches")), "fetch branches")
            .await?;
        // The service encodes an empty list as null.
        let branches: Option<Vec<BranchInfo>> = response
            .json()
            .await
            .map_err(|e| ApiError::remote("parse branches", e))?;
        Ok(branches.unwrap_or_default())
    }

    async fn search(&self, query: &str, kind: SearchKind) -> Result<SearchResults, ApiError> {
        let request = self
            .client
            .get(self.endpoint("/api/search"))
            .query(&[("q", query), ("type", kind.as_str())]);
        let response = self.send(request, "search").await?;
        match kind {
            SearchKind::Filename => {
                let paths: Option<Vec<String>> = response
                    .json()
                    .await
                    .map_err(|e| ApiError::remote("parse search results", e))?;
                Ok(SearchResults::Filenames(paths.unwrap_or_default()))
            }
            SearchKind::Content => {
                let matches: Option<Vec<ContentMatch>> = response
                    .json()
                    .await
                    .map_err(|e| ApiError::remote("parse search results", e))?;
                Ok(SearchResults::Content(matches.unwrap_or_default()))
            }
        }
    }
}
