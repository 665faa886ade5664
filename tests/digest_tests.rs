//! End-to-end digest tests against the in-memory host.

use repodigest::testing::MockHost;
use repodigest::{Config, DigestBuilder, DigestError, DigestOptions};

const URL: &str = "https://github.com/acme/payments";

fn sample_repository() -> MockHost {
    MockHost::new("main")
        .with_file(
            "README.md",
            "# Payments\nHandles card payments for the acme storefront.\n",
        )
        .with_dir("api")
        .with_file(
            "api/server.py",
            "from flask import Flask\nimport stripe\n\nclass PaymentView:\n    def post(self, request):\n        pass\n",
        )
        .with_file("assets/logo.png", "not really a png")
        .with_file(
            "web/checkout.ts",
            "import { api } from './api';\nexport class Checkout {\nexport function submit(order) {\n",
        )
        .with_file("poetry.lock", "[[package]]\n")
        .with_file("api/models.py", "class Payment:\nclass Refund:\n")
}

#[tokio::test]
async fn digest_of_a_small_repository() {
    let builder = DigestBuilder::new(sample_repository(), DigestOptions::default());

    let digest = builder.build(URL).await.expect("digest should build");

    assert!(digest.starts_with("Repository: https://github.com/acme/payments\n\nREADME.md Content:\n# Payments\n"));

    let py = digest.find("PY Files:\n").expect("python section");
    let ts = digest.find("TS Files:\n").expect("typescript section");
    assert!(py < ts, "sections follow first-seen order");

    let server = digest.find("File: api/server.py").unwrap();
    let models = digest.find("File: api/models.py").unwrap();
    assert!(server < models && models < ts, "files stay grouped by extension");

    assert!(digest.contains("Imports:\nfrom flask import Flask\nimport stripe\n"));
    assert!(digest.contains("Classes:\nclass Payment:\nclass Refund:\n"));
    assert!(digest.contains("Functions:\nexport function submit(order) {\n"));
    assert!(!digest.contains("logo.png"));
    assert!(!digest.contains("poetry.lock"));

    assert_eq!(
        builder.host().fetched_paths(),
        vec!["README.md", "api/server.py", "web/checkout.ts", "api/models.py"]
    );
}

#[tokio::test]
async fn config_file_drives_the_builder() {
    let config = Config::parse("[digest]\nextensions = [\"ts\"]\nreadme_limit = 10\n").unwrap();
    let builder = DigestBuilder::new(sample_repository(), config.digest_options());

    let digest = builder.build(URL).await.unwrap();

    assert!(digest.contains("README.md Content:\n# Payments...\n(README truncated due to length)\n\n"));
    assert!(!digest.contains("PY Files:"));
    assert!(digest.contains("TS Files:"));
}

#[tokio::test]
async fn empty_digest_is_distinct_from_failure() {
    let empty = DigestBuilder::new(MockHost::new("main"), DigestOptions::default())
        .collect(URL)
        .await
        .unwrap();
    assert!(empty.is_empty());

    let failed = DigestBuilder::new(
        MockHost::new("main").fail_repository("Bad credentials"),
        DigestOptions::default(),
    )
    .build(URL)
    .await;
    assert!(matches!(failed, Err(DigestError::RepositoryAccess(_))));
}
