use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use tidyhome_core::{Charge, PaymentGateway, Transfer, TransferRequest};
use tidyhome_domain::{GatewayConfig, Result, TidyHomeError};
use tracing::{debug, info, warn};

use super::types::{ErrorEnvelope, ObjectRef};
use crate::errors::to_domain;
use crate::http::HttpClient;

const CHARGES_PATH: &str = "/v1/charges";
const TRANSFERS_PATH: &str = "/v1/transfers";

/// Payment gateway reached over HTTP
///
/// Retries, backoff and per-request timeouts are delegated to [`HttpClient`].
/// The orchestrator still applies its own deadline around every call.
pub struct HttpPaymentGateway {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
}

impl HttpPaymentGateway {
    /// Create a gateway over an existing HTTP client
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        http_client: HttpClient,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http_client, api_key: api_key.into(), base_url }
    }

    /// Build the gateway and its HTTP client from configuration
    ///
    /// # Errors
    /// Returns `TidyHomeError::Config` when no API key is configured.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(TidyHomeError::Config("gateway api_key is not configured".into()));
        }
        let http_client = HttpClient::for_gateway(config)?;
        Ok(Self::new(config.base_url.clone(), config.api_key.clone(), http_client))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_object(&self, response: Response) -> Result<ObjectRef> {
        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }
        response.json::<ObjectRef>().await.map_err(to_domain)
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn retrieve_charge(&self, charge_ref: &str) -> Result<Charge> {
        if charge_ref.trim().is_empty() {
            return Err(TidyHomeError::InvalidInput("charge reference is empty".into()));
        }

        let url = self.url(&format!("{CHARGES_PATH}/{charge_ref}"));
        debug!(charge_ref, "retrieving charge");

        let request = self.http_client.request(Method::GET, &url).bearer_auth(&self.api_key);
        let response = self.http_client.send(request).await?;
        let charge = self.read_object(response).await?;

        Ok(Charge { charge_id: charge.id })
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<Transfer> {
        let form = transfer_form(request);
        let builder = self
            .http_client
            .request(Method::POST, self.url(TRANSFERS_PATH))
            .bearer_auth(&self.api_key)
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&form);

        let response = self.http_client.send(builder).await?;
        let transfer = self.read_object(response).await?;

        info!(
            transfer_id = %transfer.id,
            destination = %request.destination,
            amount_cents = request.amount_cents,
            "transfer accepted"
        );
        Ok(Transfer { transfer_id: transfer.id })
    }
}

/// Form body for a transfer; metadata keys use bracket notation.
fn transfer_form(request: &TransferRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), request.amount_cents.to_string()),
        ("currency".to_string(), request.currency.clone()),
        ("destination".to_string(), request.destination.clone()),
        ("source_transaction".to_string(), request.linked_charge_id.clone()),
    ];
    form.extend(
        request.metadata.iter().map(|(key, value)| (format!("metadata[{key}]"), value.clone())),
    );
    form
}

async fn error_from_response(status: StatusCode, response: Response) -> TidyHomeError {
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.describe())
        .unwrap_or_else(|_| {
            status.canonical_reason().unwrap_or("unexpected gateway response").to_string()
        });
    let message = format!("HTTP {}: {detail}", status.as_u16());

    warn!(status = status.as_u16(), %detail, "gateway request rejected");

    match status.as_u16() {
        404 => TidyHomeError::NotFound(message),
        429 | 500..=599 => TidyHomeError::Network(message),
        _ => TidyHomeError::Gateway(message),
    }
}
