use crate::config::toml_config::SurveyMonkeyConfig;
use crate::core::{SurveyProvider, SurveyResponseDetail};
use crate::utils::error::{BridgeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub struct SurveyMonkeyClient {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl SurveyMonkeyClient {
    pub fn new(config: &SurveyMonkeyConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BridgeError::ConfigError {
                message: format!("Failed to build SurveyMonkey HTTP client: {}", e),
            })?;

        let base_url = Url::parse(&config.base_url).map_err(|e| BridgeError::ConfigError {
            message: format!("Invalid SurveyMonkey base URL '{}': {}", config.base_url, e),
        })?;

        Ok(Self {
            client,
            base_url,
            access_token: config.access_token.clone(),
        })
    }

    /// Ids come from the unauthenticated webhook body, so each one is
    /// percent-encoded as a single path segment.
    fn details_url(&self, survey_id: &str, response_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BridgeError::ConfigError {
                message: format!("SurveyMonkey base URL cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend([
                "v3",
                "surveys",
                survey_id,
                "responses",
                response_id,
                "details",
            ]);
        Ok(url)
    }
}

#[async_trait]
impl SurveyProvider for SurveyMonkeyClient {
    async fn fetch_response_detail(
        &self,
        survey_id: &str,
        response_id: &str,
    ) -> Result<SurveyResponseDetail> {
        let url = self.details_url(survey_id, response_id)?;
        tracing::debug!("Making SurveyMonkey request to: {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| BridgeError::UpstreamFetchError {
                status: e.status().map(|s| s.as_u16()),
                body: e.to_string(),
            })?;

        let status = response.status();
        tracing::debug!("SurveyMonkey response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::UpstreamFetchError {
                status: Some(status.as_u16()),
                body: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(BridgeError::UpstreamFetchError {
                status: Some(status.as_u16()),
                body,
            });
        }

        let json_data = serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "SurveyMonkey response body is not valid JSON");
            serde_json::Value::Null
        });

        Ok(SurveyResponseDetail::from_json(json_data))
    }
}
