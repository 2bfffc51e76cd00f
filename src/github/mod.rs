pub mod types;

pub use types::{Commit, PullRequest, Repository};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use types::{CommentResponse, CommitResponse, PullResponse};

const PAGE_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Invalid pull request URL: {0}")]
    InvalidUrl(String),

    #[error("Repository {0} not found among the authenticated user's repositories")]
    RepositoryNotFound(String),

    #[error("GitHub token not found in config or environment")]
    MissingToken,
}

/// Read side of the hosting service: the only GitHub operations
/// reconciliation depends on.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Repositories visible to the authenticated user.
    async fn repositories(&self) -> Result<Vec<Repository>, GitHubError>;

    /// Fetch a pull request with its commits and every commit's comments.
    async fn pull_request(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<PullRequest, GitHubError>;
}

/// Find one of the user's repositories by its exact short name.
#[instrument(skip(source))]
pub async fn find_repository(
    source: &dyn PullRequestSource,
    name: &str,
) -> Result<Repository, GitHubError> {
    let repos = source.repositories().await?;
    debug!(count = repos.len(), "listed repositories");
    repos
        .into_iter()
        .find(|repo| repo.name == name)
        .ok_or_else(|| GitHubError::RepositoryNotFound(name.to_string()))
}

/// Extract the repository short name from a pull request's API URL.
///
/// Expected format: https://api.github.com/repos/{owner}/{repo}/pulls/{number}
pub fn repository_name(api_url: &str) -> Result<String, GitHubError> {
    let parsed =
        reqwest::Url::parse(api_url).map_err(|_| GitHubError::InvalidUrl(api_url.to_string()))?;

    let segments: Vec<_> = parsed
        .path_segments()
        .ok_or_else(|| GitHubError::InvalidUrl(api_url.to_string()))?
        .collect();

    // repos / {owner} / {repo} / ...
    match segments.get(2) {
        Some(repo) if !repo.is_empty() => Ok(repo.to_string()),
        _ => Err(GitHubError::InvalidUrl(api_url.to_string())),
    }
}

pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    api_url: String,
}

impl GitHubClient {
    pub fn new(config: &crate::config::Config) -> Result<Self, GitHubError> {
        let token = config.github_token().ok_or(GitHubError::MissingToken)?;
        Ok(Self {
            http: reqwest::Client::new(),
            token,
            api_url: config.github_api_url().trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, GitHubError> {
        let response = self
            .http
            .get(url)
            .header("User-Agent", "gitrello")
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    /// Follow `page` until a short page comes back.
    async fn get_all<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, GitHubError> {
        let mut items = Vec::new();
        for page in 1.. {
            let batch: Vec<T> = self
                .get(
                    url,
                    &[("per_page", PAGE_SIZE.to_string()), ("page", page.to_string())],
                )
                .await?;
            let done = batch.len() < PAGE_SIZE;
            items.extend(batch);
            if done {
                break;
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    #[instrument(skip(self))]
    async fn repositories(&self) -> Result<Vec<Repository>, GitHubError> {
        debug!("fetching user repositories");
        self.get_all(&format!("{}/user/repos", self.api_url)).await
    }

    #[instrument(skip(self, repo), fields(repo = %repo.full_name, pr = number))]
    async fn pull_request(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<PullRequest, GitHubError> {
        let base_url = format!(
            "{}/repos/{}/{}",
            self.api_url,
            repo.owner(),
            repo.name
        );

        debug!("fetching PR metadata from GitHub API");
        let metadata: PullResponse = self
            .get(&format!("{base_url}/pulls/{number}"), &[])
            .await?;

        let raw_commits: Vec<CommitResponse> = self
            .get_all(&format!("{base_url}/pulls/{number}/commits"))
            .await?;
        debug!(commits = raw_commits.len(), "received PR commits");

        let mut commits = Vec::with_capacity(raw_commits.len());
        for raw in raw_commits {
            let comments: Vec<CommentResponse> = self
                .get_all(&format!("{base_url}/commits/{}/comments", raw.sha))
                .await?;
            debug!(sha = %raw.sha, comments = comments.len(), "received commit comments");
            commits.push(Commit {
                sha: raw.sha,
                message: raw.commit.message,
                comments: comments.into_iter().map(|c| c.body).collect(),
            });
        }

        Ok(PullRequest {
            number: metadata.number,
            url: metadata.url,
            html_url: metadata.html_url,
            commits,
        })
    }
}
