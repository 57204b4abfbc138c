//! Tests for the registry login service.

#![allow(clippy::expect_used)]

use lambda_api_verify::application::services::registry_login::registry_login;
use lambda_api_verify::domain::RegistryError;

use crate::mocks::{
    ACCOUNT_ID, FakeCloud, FakeContainers, Journal, REGISTRY_PASSWORD, RecordingReporter,
    encode_token,
};

const REGISTRY: &str = "123456789012.dkr.ecr.us-east-1.amazonaws.com";

#[tokio::test]
async fn test_login_uses_decoded_password_and_account_registry() {
    let journal = Journal::default();
    let cloud = FakeCloud::new(&journal);
    let containers = FakeContainers::new(&journal);
    let reporter = RecordingReporter::default();

    let host = registry_login(&cloud, &containers, "us-east-1", &reporter)
        .await
        .expect("login");

    assert_eq!(host, REGISTRY);
    let logins = containers.logins();
    assert_eq!(logins.len(), 1);
    assert_eq!(logins[0].username, "AWS");
    assert_eq!(logins[0].password, REGISTRY_PASSWORD);
    assert_eq!(logins[0].registry, format!("{ACCOUNT_ID}.dkr.ecr.us-east-1.amazonaws.com"));
    assert_eq!(
        journal.entries(),
        [
            "sts get-caller-identity",
            "ecr get-authorization-token",
            format!("docker login {REGISTRY}").as_str(),
        ]
    );
    assert!(reporter.any("logged in to"));
}

#[tokio::test]
async fn test_login_uses_first_token_only() {
    let journal = Journal::default();
    let cloud = FakeCloud::new(&journal)
        .with_tokens(vec![encode_token("first"), encode_token("second")]);
    let containers = FakeContainers::new(&journal);

    registry_login(&cloud, &containers, "eu-west-1", &RecordingReporter::default())
        .await
        .expect("login");

    let logins = containers.logins();
    assert_eq!(logins[0].password, "first");
    assert_eq!(
        logins[0].registry,
        "123456789012.dkr.ecr.eu-west-1.amazonaws.com"
    );
}

#[tokio::test]
async fn test_empty_token_list_fails_before_login() {
    let journal = Journal::default();
    let cloud = FakeCloud::new(&journal).with_tokens(Vec::new());
    let containers = FakeContainers::new(&journal);

    let err = registry_login(&cloud, &containers, "us-east-1", &RecordingReporter::default())
        .await
        .expect_err("should fail");

    assert_eq!(
        err.downcast_ref::<RegistryError>(),
        Some(&RegistryError::NoAuthorizationData)
    );
    assert_eq!(journal.count_prefix("docker login"), 0);
}

#[tokio::test]
async fn test_garbage_token_fails_before_login() {
    let journal = Journal::default();
    let cloud = FakeCloud::new(&journal).with_tokens(vec!["%%% not base64 %%%".into()]);
    let containers = FakeContainers::new(&journal);

    let err = registry_login(&cloud, &containers, "us-east-1", &RecordingReporter::default())
        .await
        .expect_err("should fail");

    assert_eq!(
        err.downcast_ref::<RegistryError>(),
        Some(&RegistryError::InvalidEncoding)
    );
    assert!(containers.logins().is_empty());
}

#[tokio::test]
async fn test_identity_failure_is_fatal_with_context() {
    let journal = Journal::default();
    let cloud = FakeCloud::new(&journal).failing_identity();
    let containers = FakeContainers::new(&journal);

    let err = registry_login(&cloud, &containers, "us-east-1", &RecordingReporter::default())
        .await
        .expect_err("should fail");
    let chain = format!("{err:#}");

    assert!(chain.contains("looking up caller identity"), "{chain}");
    assert!(chain.contains("ExpiredToken"), "{chain}");
    assert!(!journal.contains("ecr get-authorization-token"));
}

#[tokio::test]
async fn test_rejected_login_names_the_registry() {
    let journal = Journal::default();
    let cloud = FakeCloud::new(&journal);
    let containers = FakeContainers::new(&journal).failing_at(&format!("docker login {REGISTRY}"));

    let err = registry_login(&cloud, &containers, "us-east-1", &RecordingReporter::default())
        .await
        .expect_err("should fail");

    assert!(format!("{err:#}").contains(&format!("logging in to {REGISTRY}")));
}
