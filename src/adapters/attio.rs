use crate::config::toml_config::AttioConfig;
use crate::core::CrmProvider;
use crate::domain::model::CrmContactPayload;
use crate::utils::error::{BridgeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub struct AttioClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AttioClient {
    pub fn new(config: &AttioConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BridgeError::ConfigError {
                message: format!("Failed to build Attio HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn people_records_url(&self) -> String {
        format!("{}/v2/objects/people/records", self.base_url)
    }
}

#[async_trait]
impl CrmProvider for AttioClient {
    async fn create_contact(&self, email: &str) -> Result<serde_json::Value> {
        let payload = CrmContactPayload::for_email(email);
        let write_error = |status: Option<u16>, body: String| BridgeError::CrmWriteError {
            email: email.to_string(),
            status,
            body,
        };

        let response = self
            .client
            .post(self.people_records_url())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| write_error(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        tracing::debug!("Attio response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| write_error(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(write_error(Some(status.as_u16()), body));
        }

        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
    }
}
