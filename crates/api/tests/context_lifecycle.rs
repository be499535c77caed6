//! Integration tests for AppContext construction
//!
//! The context must open (and migrate) the configured database, wire the
//! HTTP gateway and refuse to start without gateway credentials.

mod support;

use tempfile::TempDir;
use tidyhome_api::AppContext;
use tidyhome_domain::TidyHomeError;
use tokio_test::assert_ok;

use support::{setup_test_app, test_config};

#[tokio::test(flavor = "multi_thread")]
async fn test_context_creation_succeeds() {
    let app = setup_test_app().await;

    assert_ok!(app.ctx.health_check());
    assert_eq!(app.ctx.config.payouts.max_concurrency, 2);
    assert!(app.ctx.db.path().exists());
}

#[test]
fn test_context_requires_gateway_api_key() {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut config = test_config(&temp_dir, "http://127.0.0.1:9");
    config.gateway.api_key.clear();

    match AppContext::new(config) {
        Err(TidyHomeError::Config(msg)) => assert!(msg.contains("api_key")),
        Err(other) => panic!("expected config error, got {other:?}"),
        Ok(_) => panic!("context should not start without an api key"),
    }
}

#[test]
fn test_reopening_an_existing_database_is_idempotent() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config(&temp_dir, "http://127.0.0.1:9");

    let first = assert_ok!(AppContext::new(config.clone()));
    drop(first);
    let second = assert_ok!(AppContext::new(config));
    assert_ok!(second.health_check());
}
