//! Repository digest: README plus per-extension file summaries under a
//! character budget, serialized into one system-description document.

use crate::github::GitHubClient;
use crate::repository::{HostError, RepositoryHost, RepositoryRef, TreeEntry};
use crate::summary::summarize;
use std::fmt::Write as _;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default budget for the combined length of all file summaries
pub const DEFAULT_CHAR_BUDGET: usize = 100_000;

/// README content longer than this is cut
pub const README_LIMIT: usize = 5_000;

/// Files larger than this (as reported by the tree listing) are skipped unfetched
pub const MAX_FILE_BYTES: u64 = 1024 * 1024;

/// Appended after a cut README
pub const README_TRUNCATION_NOTICE: &str = "...\n(README truncated due to length)\n";

/// Extensions summarized by default
pub const DEFAULT_EXTENSIONS: &[&str] = &["py", "js", "ts", "html", "css", "java", "go", "rb"];

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("error analyzing GitHub repository: {0}")]
    RepositoryAccess(String),
}

impl From<HostError> for DigestError {
    fn from(err: HostError) -> Self {
        DigestError::RepositoryAccess(err.to_string())
    }
}

/// Request-scoped digest settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestOptions {
    /// Iteration stops once summaries exceed this many characters
    pub char_budget: usize,
    pub readme_limit: usize,
    /// Per-file size ceiling; `None` disables the check
    pub max_file_bytes: Option<u64>,
    /// Allow-listed extensions, compared case-sensitively
    pub extensions: Vec<String>,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            char_budget: DEFAULT_CHAR_BUDGET,
            readme_limit: README_LIMIT,
            max_file_bytes: Some(MAX_FILE_BYTES),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl DigestOptions {
    pub fn with_char_budget(mut self, char_budget: usize) -> Self {
        self.char_budget = char_budget;
        self
    }

    fn allows(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }
}

/// Accumulated digest of one repository.
#[derive(Debug, Clone, Default)]
pub struct RepositoryDigest {
    pub repo_url: String,
    pub readme: Option<String>,
    readme_limit: usize,
    /// Rendered summaries per extension, both in first-seen order
    sections: Vec<(String, Vec<String>)>,
    /// Combined length of all summaries in characters
    pub total_chars: usize,
    pub files_summarized: usize,
    pub files_skipped: usize,
    /// True when iteration stopped early because of the budget
    pub budget_exhausted: bool,
}

impl RepositoryDigest {
    pub fn new(repo_url: &str, readme_limit: usize) -> Self {
        Self {
            repo_url: repo_url.to_string(),
            readme_limit,
            ..Default::default()
        }
    }

    /// Append a rendered summary under its extension.
    pub fn push(&mut self, extension: &str, summary: String) {
        self.total_chars += summary.chars().count();
        self.files_summarized += 1;

        match self.sections.iter_mut().find(|(ext, _)| ext == extension) {
            Some((_, summaries)) => summaries.push(summary),
            None => self.sections.push((extension.to_string(), vec![summary])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.readme.as_deref().map_or(true, str::is_empty)
    }

    /// Serialize into the system-description document.
    pub fn render(&self) -> String {
        let mut out = format!("Repository: {}\n\n", self.repo_url);

        if let Some(readme) = self.readme.as_deref().filter(|r| !r.is_empty()) {
            out.push_str("README.md Content:\n");
            match truncate_chars(readme, self.readme_limit) {
                Some(head) => {
                    out.push_str(head);
                    out.push_str(README_TRUNCATION_NOTICE);
                    out.push('\n');
                }
                None => {
                    out.push_str(readme);
                    out.push_str("\n\n");
                }
            }
        }

        for (extension, summaries) in &self.sections {
            let _ = writeln!(out, "{} Files:", extension.to_uppercase());
            for summary in summaries {
                out.push_str(summary);
                out.push('\n');
            }
            out.push('\n');
        }

        out
    }
}

/// First `limit` characters of `text`, or `None` if it already fits.
fn truncate_chars(text: &str, limit: usize) -> Option<&str> {
    text.char_indices().nth(limit).map(|(idx, _)| &text[..idx])
}

/// Builds repository digests against a [`RepositoryHost`].
pub struct DigestBuilder<H> {
    host: H,
    options: DigestOptions,
}

impl<H: RepositoryHost> DigestBuilder<H> {
    pub fn new(host: H, options: DigestOptions) -> Self {
        Self { host, options }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Build the digest document for `repo_url`.
    pub async fn build(&self, repo_url: &str) -> Result<String, DigestError> {
        Ok(self.collect(repo_url).await?.render())
    }

    /// Walk the repository tree and accumulate summaries.
    ///
    /// Entries are visited in host order. After each summarized file the
    /// running total is compared against the budget; once it is exceeded no
    /// further entries are examined, so the file that crossed the budget is
    /// still included.
    pub async fn collect(&self, repo_url: &str) -> Result<RepositoryDigest, DigestError> {
        let repo = RepositoryRef::parse(repo_url).ok_or_else(|| {
            DigestError::RepositoryAccess(format!("cannot resolve owner/name from {:?}", repo_url))
        })?;

        let branch = self.host.default_branch(&repo).await?;
        let tree = self.host.tree(&repo, &branch).await?;
        info!(repo = %repo, branch = %branch, entries = tree.len(), "digesting repository");

        let mut digest = RepositoryDigest::new(repo_url, self.options.readme_limit);

        for entry in &tree {
            if entry.is_readme() {
                let bytes = self
                    .host
                    .file_content(&repo, &entry.path, &branch)
                    .await
                    .map_err(|e| {
                        DigestError::RepositoryAccess(format!("failed to fetch {}: {}", entry.path, e))
                    })?;
                digest.readme = Some(String::from_utf8_lossy(&bytes).into_owned());
                continue;
            }

            let Some(extension) = entry.extension().filter(|ext| entry.is_blob() && self.options.allows(ext))
            else {
                continue;
            };

            if self.exceeds_size_limit(entry) {
                warn!(path = %entry.path, size = ?entry.size, "skipping oversized file");
                digest.files_skipped += 1;
                continue;
            }

            let content = match self.fetch_text(&repo, entry, &branch).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %entry.path, error = %e, "skipping unreadable file");
                    digest.files_skipped += 1;
                    continue;
                }
            };

            let summary = summarize(&entry.path, &content);
            debug!(path = %entry.path, chars = summary.chars().count(), "summarized file");
            digest.push(extension, summary);

            if digest.total_chars > self.options.char_budget {
                info!(
                    total_chars = digest.total_chars,
                    budget = self.options.char_budget,
                    "character budget exceeded, stopping"
                );
                digest.budget_exhausted = true;
                break;
            }
        }

        info!(
            files = digest.files_summarized,
            skipped = digest.files_skipped,
            chars = digest.total_chars,
            "digest complete"
        );
        Ok(digest)
    }

    fn exceeds_size_limit(&self, entry: &TreeEntry) -> bool {
        matches!((self.options.max_file_bytes, entry.size), (Some(max), Some(size)) if size > max)
    }

    async fn fetch_text(
        &self,
        repo: &RepositoryRef,
        entry: &TreeEntry,
        branch: &str,
    ) -> Result<String, HostError> {
        let bytes = self.host.file_content(repo, &entry.path, branch).await?;
        String::from_utf8(bytes).map_err(|e| HostError::Decode(e.to_string()))
    }
}

/// Digest a GitHub repository with default options and the given budget.
pub async fn build_digest(
    repo_url: &str,
    credential: &str,
    char_budget: usize,
) -> Result<String, DigestError> {
    let client =
        GitHubClient::new(credential).map_err(|e| DigestError::RepositoryAccess(e.to_string()))?;
    let options = DigestOptions::default().with_char_budget(char_budget);
    DigestBuilder::new(client, options).build(repo_url).await
}
