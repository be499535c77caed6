#![allow(dead_code)]

use serde_json::json;
use tempfile::TempDir;
use tidyhome_api::AppContext;
use tidyhome_domain::{Config, DatabaseConfig, GatewayConfig, Job, PayoutsConfig};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Application context over a temporary database and a mocked gateway.
pub struct TestApp {
    pub ctx: AppContext,
    pub server: MockServer,
    /// Keep temporary directory alive for the lifetime of the app.
    pub temp_dir: TempDir,
}

/// Config pointing at `db_dir` and the mock gateway.
pub fn test_config(db_dir: &TempDir, gateway_url: &str) -> Config {
    Config {
        database: DatabaseConfig {
            path: db_dir.path().join("tidyhome.db").to_string_lossy().to_string(),
            pool_size: 4,
        },
        gateway: GatewayConfig {
            base_url: gateway_url.to_string(),
            api_key: "sk_test_api".to_string(),
            timeout_secs: 5,
            max_attempts: 1,
        },
        payouts: PayoutsConfig { currency: "usd".to_string(), max_concurrency: 2 },
    }
}

/// Start a gateway that accepts every charge lookup and transfer.
pub async fn setup_test_app() -> TestApp {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/charges/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "ch_1" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/transfers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "tr_1" })))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temporary database directory");
    let ctx = AppContext::new(test_config(&temp_dir, &server.uri()))
        .expect("failed to initialise application context");

    TestApp { ctx, server, temp_dir }
}

pub fn job(id: &str, site_id: &str, business_id: Option<&str>, amount_charged_cents: i64) -> Job {
    Job {
        id: id.to_string(),
        site_id: site_id.to_string(),
        business_id: business_id.map(str::to_string),
        amount_charged_cents,
        currency: "usd".to_string(),
        charge_ref: Some(format!("pi_{id}")),
    }
}
