use serde::Deserialize;

/// A pull request together with everything reconciliation reads from it.
/// Note: Not Deserialize. Assembled from the pull, commits and comments
/// endpoints by GitHubClient.
#[derive(Debug, Clone)]
pub struct PullRequest {
    /// PR number (e.g., 42)
    pub number: u64,
    /// Canonical API URL (https://api.github.com/repos/{owner}/{repo}/pulls/{n})
    pub url: String,
    /// Web URL shown to humans and attached to the card
    pub html_url: String,
    /// Commits in the order GitHub lists them
    pub commits: Vec<Commit>,
}

#[derive(Debug, Clone)]
pub struct Commit {
    #[allow(dead_code)]
    pub sha: String,
    pub message: String,
    /// Bodies of the comments left on this commit
    pub comments: Vec<String>,
}

/// Repository as returned by GET /user/repos.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    /// "{owner}/{name}"
    pub full_name: String,
}

impl Repository {
    pub fn owner(&self) -> &str {
        self.full_name
            .split_once('/')
            .map(|(owner, _)| owner)
            .unwrap_or(&self.full_name)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullResponse {
    pub number: u64,
    pub url: String,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitResponse {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitDetail {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentResponse {
    #[serde(default)]
    pub body: String,
}
