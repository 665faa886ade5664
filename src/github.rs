//! GitHub REST client implementing [`RepositoryHost`].
//!
//! Uses reqwest for the API calls and base64 for file contents.

use crate::repository::{HostError, RepositoryHost, RepositoryRef, TreeEntry};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// User-Agent string identifying this client (GitHub rejects requests without one)
const USER_AGENT: &str = concat!("repodigest/", env!("CARGO_PKG_VERSION"), " (https://github.com/cladam/repodigest)");

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Media type that makes the contents API return the file bytes directly
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

/// Default timeout for HTTP requests
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("failed to build HTTP client: {0}")]
    ClientError(#[from] reqwest::Error),
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

#[derive(Deserialize)]
struct RepoResponse {
    default_branch: String,
}

#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Authenticated client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: Url,
}

impl GitHubClient {
    /// Client for api.github.com with the default timeout
    pub fn new(token: &str) -> Result<Self, GitHubError> {
        Self::with_settings(DEFAULT_API_URL, token, REQUEST_TIMEOUT)
    }

    /// Client for a specific API endpoint (e.g. GitHub Enterprise).
    ///
    /// The token is sent unmodified as a bearer credential; an empty token
    /// sends no `Authorization` header.
    pub fn with_settings(api_url: &str, token: &str, timeout: Duration) -> Result<Self, GitHubError> {
        let api_url = Url::parse(api_url).map_err(|e| GitHubError::InvalidUrl(e.to_string()))?;
        if api_url.cannot_be_a_base() {
            return Err(GitHubError::InvalidUrl(api_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));
        if !token.is_empty() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| GitHubError::InvalidToken(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, api_url })
    }

    /// Build an API URL from path segments; each segment is percent-encoded
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn repo_segments(repo: &RepositoryRef) -> [&str; 3] {
        ["repos", repo.owner.as_str(), repo.name.as_str()]
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, HostError> {
        let response = request
            .send()
            .await
            .map_err(|e| HostError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, HostError> {
        debug!(%url, "GET");
        self.send(self.client.get(url))
            .await?
            .json::<T>()
            .await
            .map_err(|e| HostError::Decode(e.to_string()))
    }

    async fn get_raw(&self, url: Url) -> Result<Vec<u8>, HostError> {
        debug!(%url, "GET raw");
        let request = self.client.get(url).header(ACCEPT, RAW_MEDIA_TYPE);
        let bytes = self
            .send(request)
            .await?
            .bytes()
            .await
            .map_err(|e| HostError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    async fn default_branch(&self, repo: &RepositoryRef) -> Result<String, HostError> {
        let url = self.endpoint(Self::repo_segments(repo));
        let response: RepoResponse = self.get_json(url).await?;
        Ok(response.default_branch)
    }

    async fn tree(&self, repo: &RepositoryRef, branch: &str) -> Result<Vec<TreeEntry>, HostError> {
        let mut url = self.endpoint(
            Self::repo_segments(repo)
                .into_iter()
                .chain(["git", "trees"])
                .chain(branch.split('/')),
        );
        url.query_pairs_mut().append_pair("recursive", "1");

        let response: TreeResponse = self.get_json(url).await?;
        if response.truncated {
            warn!(repo = %repo, "GitHub truncated the file tree; only the returned entries are digested");
        }
        Ok(response.tree)
    }

    async fn file_content(
        &self,
        repo: &RepositoryRef,
        path: &str,
        branch: &str,
    ) -> Result<Vec<u8>, HostError> {
        let mut url = self.endpoint(
            Self::repo_segments(repo)
                .into_iter()
                .chain(["contents"])
                .chain(path.split('/')),
        );
        url.query_pairs_mut().append_pair("ref", branch);

        let response: ContentResponse = self.get_json(url.clone()).await?;
        match decode_response(response, path)? {
            Some(bytes) => Ok(bytes),
            None => {
                debug!(path, "content too large for the JSON API, fetching raw");
                self.get_raw(url).await
            }
        }
    }
}

/// Map a failed API response to a [`HostError`], keeping GitHub's message.
fn api_error(status: StatusCode, body: &str) -> HostError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
    HostError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Decoded bytes of a contents response.
///
/// `Ok(None)` means GitHub withheld the content (files over 1 MB report
/// encoding `none`) and it must be fetched with the raw media type.
fn decode_response(response: ContentResponse, path: &str) -> Result<Option<Vec<u8>>, HostError> {
    match response.encoding.as_deref() {
        Some("base64") => match response.content.as_deref() {
            Some(content) => decode_content(content).map(Some),
            None => Err(HostError::Decode(format!("no content returned for {}", path))),
        },
        Some("none") => Ok(None),
        other => Err(HostError::Decode(format!(
            "unsupported content encoding {:?} for {}",
            other.unwrap_or("missing"),
            path
        ))),
    }
}

/// Decode GitHub's base64 file content, which is wrapped with newlines.
pub fn decode_content(encoded: &str) -> Result<Vec<u8>, HostError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| HostError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepositoryRef {
        RepositoryRef::parse("https://github.com/owner/repo").unwrap()
    }

    #[test]
    fn decodes_wrapped_base64() {
        let decoded = decode_content("aW1wb3J0IG9z\nCmRlZiBt\nYWluKCk6\n").unwrap();
        assert_eq!(decoded, b"import os\ndef main():");
    }

    #[test]
    fn rejects_malformed_base64() {
        let err = decode_content("not*base64!").unwrap_err();
        assert!(matches!(err, HostError::Decode(_)));
    }

    #[test]
    fn builds_encoded_endpoints() {
        let client = GitHubClient::new("").unwrap();
        let url = client.endpoint(
            GitHubClient::repo_segments(&repo())
                .into_iter()
                .chain(["contents"])
                .chain("docs/my notes.md".split('/')),
        );
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/owner/repo/contents/docs/my%20notes.md"
        );
    }

    #[test]
    fn keeps_enterprise_path_prefix() {
        let client =
            GitHubClient::with_settings("https://ghe.example.com/api/v3/", "t", REQUEST_TIMEOUT).unwrap();
        let url = client.endpoint(GitHubClient::repo_segments(&repo()));
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/repos/owner/repo");
    }

    #[test]
    fn rejects_invalid_settings() {
        assert!(matches!(
            GitHubClient::with_settings("not a url", "", REQUEST_TIMEOUT),
            Err(GitHubError::InvalidUrl(_))
        ));
        assert!(matches!(
            GitHubClient::with_settings(DEFAULT_API_URL, "bad\ntoken", REQUEST_TIMEOUT),
            Err(GitHubError::InvalidToken(_))
        ));
    }

    fn content(json: &str) -> ContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn api_error_keeps_github_message() {
        let err = api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"message": "Bad credentials", "documentation_url": "https://docs.github.com/rest"}"#,
        );
        assert!(matches!(err, HostError::Status { status: 401, ref message } if message == "Bad credentials"));
        assert_eq!(err.to_string(), "API returned 401: Bad credentials");
    }

    #[test]
    fn api_error_falls_back_to_reason_phrase() {
        let err = api_error(StatusCode::BAD_GATEWAY, "<html>upstream error</html>");
        assert!(matches!(err, HostError::Status { status: 502, ref message } if message == "Bad Gateway"));

        let err = api_error(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "API returned 404: Not Found");
    }

    #[test]
    fn decodes_base64_content_response() {
        let response = content(r#"{"encoding": "base64", "content": "aW1wb3J0IG9z\n"}"#);
        assert_eq!(decode_response(response, "a.py").unwrap(), Some(b"import os".to_vec()));
    }

    #[test]
    fn large_files_need_a_raw_fetch() {
        let response = content(r#"{"encoding": "none", "content": "", "size": 2097152}"#);
        assert_eq!(decode_response(response, "README.md").unwrap(), None);
    }

    #[test]
    fn missing_or_unknown_content_is_a_decode_error() {
        let missing = decode_response(content(r#"{"encoding": "base64"}"#), "a.py").unwrap_err();
        assert!(matches!(missing, HostError::Decode(m) if m.contains("a.py")));

        let unknown = decode_response(content(r#"{"encoding": "utf-16"}"#), "b.py").unwrap_err();
        assert!(matches!(unknown, HostError::Decode(m) if m.contains("utf-16")));

        let absent = decode_response(content("{}"), "c.py").unwrap_err();
        assert!(matches!(absent, HostError::Decode(m) if m.contains("missing")));
    }

    #[test]
    fn parses_tree_response() {
        let json = r#"{"sha": "abc", "tree": [{"path": "a.py", "type": "blob", "size": 3}], "truncated": true}"#;
        let response: TreeResponse = serde_json::from_str(json).unwrap();
        assert!(response.truncated);
        assert_eq!(response.tree, vec![TreeEntry::blob("a.py", Some(3))]);
    }
}
