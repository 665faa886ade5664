//! # repodigest
//!
//! Turns a GitHub repository into a bounded plain-text system description
//! for use as LLM prompt context.
//!
//! ## Features
//!
//! - **Structural summaries**: imports, function signatures and type declarations per file
//! - **Hard budget**: stops reading files once summaries exceed a character budget
//! - **Host agnostic**: the digest builder works against any `RepositoryHost`; GitHub ships built in

pub mod config;
pub mod digest;
pub mod github;
pub mod matchers;
pub mod repository;
pub mod summary;
pub mod testing;

pub use config::Config;
pub use digest::{build_digest, DigestBuilder, DigestError, DigestOptions, RepositoryDigest};
pub use github::GitHubClient;
pub use repository::{HostError, RepositoryHost, RepositoryRef, TreeEntry};
pub use summary::{summarize, FileSummary};
