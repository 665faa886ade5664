//! Repository addressing and the hosting-API abstraction.
//!
//! The digest builder only talks to a [`RepositoryHost`]; the GitHub REST
//! client in [`crate::github`] is the production implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode content: {0}")]
    Decode(String),
}

/// Owner/name pair identifying a repository on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    /// Take the last two `/`-separated segments of a URL as owner and name.
    ///
    /// Scheme and host are not validated; a nonsensical pair simply fails
    /// later at the API. Returns `None` when fewer than two non-empty
    /// segments are present.
    pub fn parse(url: &str) -> Option<Self> {
        let mut segments = url.trim().trim_end_matches('/').rsplit('/');
        let name = segments.next().filter(|s| !s.is_empty())?;
        let owner = segments.next().filter(|s| !s.is_empty())?;

        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Node type reported by the recursive tree listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    #[serde(other)]
    Other,
}

/// One node of a repository's recursive file tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Blob size in bytes, when the host reports it
    #[serde(default)]
    pub size: Option<u64>,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
            size,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Tree,
            size: None,
        }
    }

    pub fn is_blob(&self) -> bool {
        self.kind == EntryKind::Blob
    }

    /// True for the repository-root `README.md`, in any letter case
    pub fn is_readme(&self) -> bool {
        self.path.eq_ignore_ascii_case("readme.md")
    }

    pub fn extension(&self) -> Option<&str> {
        extension_of(&self.path)
    }
}

/// Text after the last `.` of the final path component.
pub fn extension_of(path: &str) -> Option<&str> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Read access to a source-control host.
///
/// Every method is a remote call that may fail.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Name of the repository's default branch
    async fn default_branch(&self, repo: &RepositoryRef) -> Result<String, HostError>;

    /// Full recursive file tree of `branch`, in host order
    async fn tree(&self, repo: &RepositoryRef, branch: &str)
        -> Result<Vec<TreeEntry>, HostError>;

    /// Decoded bytes of the file at `path` on `branch`
    async fn file_content(
        &self,
        repo: &RepositoryRef,
        path: &str,
        branch: &str,
    ) -> Result<Vec<u8>, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_and_name_from_url() {
        let repo = RepositoryRef::parse("https://github.com/mrwadams/stride-gpt").unwrap();
        assert_eq!(repo.owner, "mrwadams");
        assert_eq!(repo.name, "stride-gpt");
        assert_eq!(repo.to_string(), "mrwadams/stride-gpt");
    }

    #[test]
    fn ignores_trailing_slash() {
        let repo = RepositoryRef::parse("https://github.com/owner/repo/").unwrap();
        assert_eq!(repo.to_string(), "owner/repo");
    }

    #[test]
    fn takes_last_two_segments_without_validation() {
        let repo = RepositoryRef::parse("https://github.com/owner/repo/tree/main").unwrap();
        assert_eq!(repo.owner, "tree");
        assert_eq!(repo.name, "main");
    }

    #[test]
    fn rejects_urls_without_two_segments() {
        assert!(RepositoryRef::parse("repo").is_none());
        assert!(RepositoryRef::parse("").is_none());
        assert!(RepositoryRef::parse("/repo").is_none());
    }

    #[test]
    fn extension_comes_from_the_file_name() {
        assert_eq!(extension_of("src/app.py"), Some("py"));
        assert_eq!(extension_of("web/bundle.min.js"), Some("js"));
        assert_eq!(extension_of("v1.2/Makefile"), None);
        assert_eq!(extension_of("Dockerfile"), None);
    }

    #[test]
    fn readme_detection_is_case_insensitive_and_root_only() {
        assert!(TreeEntry::blob("README.md", None).is_readme());
        assert!(TreeEntry::blob("Readme.MD", None).is_readme());
        assert!(!TreeEntry::blob("docs/README.md", None).is_readme());
    }

    #[test]
    fn deserializes_github_tree_entries() {
        let json = r#"[
            {"path": "src", "mode": "040000", "type": "tree", "sha": "a"},
            {"path": "src/main.py", "mode": "100644", "type": "blob", "sha": "b", "size": 120},
            {"path": "vendor/lib", "mode": "160000", "type": "commit", "sha": "c"}
        ]"#;
        let entries: Vec<TreeEntry> = serde_json::from_str(json).unwrap();

        assert_eq!(entries[0], TreeEntry::tree("src"));
        assert_eq!(entries[1], TreeEntry::blob("src/main.py", Some(120)));
        assert_eq!(entries[2].kind, EntryKind::Other);
    }
}
