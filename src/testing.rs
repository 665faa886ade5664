//! In-memory repository host for tests.
//!
//! `MockHost` serves a fixed tree and file contents without network access
//! and records every file fetch so tests can assert what was (not) read.

use crate::repository::{HostError, RepositoryHost, RepositoryRef, TreeEntry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct MockState {
    fetched: Vec<String>,
}

/// Mock [`RepositoryHost`] built up with the `with_*` methods.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    default_branch: String,
    tree: Vec<TreeEntry>,
    files: HashMap<String, Vec<u8>>,
    failing_files: HashMap<String, String>,
    repository_error: Option<String>,
    tree_error: Option<String>,
    state: Arc<Mutex<MockState>>,
}

impl MockHost {
    pub fn new(default_branch: &str) -> Self {
        Self {
            default_branch: default_branch.to_string(),
            ..Default::default()
        }
    }

    /// Add a text blob to the tree
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.with_bytes(path, content.as_bytes().to_vec())
    }

    /// Add a blob with raw contents to the tree
    pub fn with_bytes(mut self, path: &str, content: Vec<u8>) -> Self {
        self.tree
            .push(TreeEntry::blob(path, Some(content.len() as u64)));
        self.files.insert(path.to_string(), content);
        self
    }

    /// Add a directory node to the tree
    pub fn with_dir(mut self, path: &str) -> Self {
        self.tree.push(TreeEntry::tree(path));
        self
    }

    /// Add a tree entry with no contents behind it
    pub fn with_entry(mut self, entry: TreeEntry) -> Self {
        self.tree.push(entry);
        self
    }

    /// Add a blob whose content fetch fails with `message`
    pub fn with_failing_file(mut self, path: &str, message: &str) -> Self {
        self.tree.push(TreeEntry::blob(path, None));
        self.failing_files
            .insert(path.to_string(), message.to_string());
        self
    }

    /// Make repository lookup fail with a 404
    pub fn fail_repository(mut self, message: &str) -> Self {
        self.repository_error = Some(message.to_string());
        self
    }

    /// Make the tree listing fail with a 403
    pub fn fail_tree(mut self, message: &str) -> Self {
        self.tree_error = Some(message.to_string());
        self
    }

    /// Paths of all content fetches, in call order
    pub fn fetched_paths(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .fetched
            .clone()
    }

    pub fn fetched(&self, path: &str) -> bool {
        self.fetched_paths().iter().any(|p| p == path)
    }
}

#[async_trait]
impl RepositoryHost for MockHost {
    async fn default_branch(&self, _repo: &RepositoryRef) -> Result<String, HostError> {
        match &self.repository_error {
            Some(message) => Err(HostError::Status {
                status: 404,
                message: message.clone(),
            }),
            None => Ok(self.default_branch.clone()),
        }
    }

    async fn tree(&self, _repo: &RepositoryRef, branch: &str) -> Result<Vec<TreeEntry>, HostError> {
        if let Some(message) = &self.tree_error {
            return Err(HostError::Status {
                status: 403,
                message: message.clone(),
            });
        }
        if branch != self.default_branch {
            return Err(HostError::Status {
                status: 404,
                message: format!("branch {} not found", branch),
            });
        }
        Ok(self.tree.clone())
    }

    async fn file_content(
        &self,
        _repo: &RepositoryRef,
        path: &str,
        _branch: &str,
    ) -> Result<Vec<u8>, HostError> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .fetched
            .push(path.to_string());

        if let Some(message) = self.failing_files.get(path) {
            return Err(HostError::Request(message.clone()));
        }
        self.files.get(path).cloned().ok_or_else(|| HostError::Status {
            status: 404,
            message: format!("{} not found", path),
        })
    }
}
