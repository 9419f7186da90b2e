use crate::domain::model::SurveyResponseDetail;
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait SurveyProvider: Send + Sync {
    /// Fails with `UpstreamFetchError` on transport errors, timeouts and non-2xx statuses.
    async fn fetch_response_detail(
        &self,
        survey_id: &str,
        response_id: &str,
    ) -> Result<SurveyResponseDetail>;
}

#[async_trait]
pub trait CrmProvider: Send + Sync {
    /// Returns the created record. Fails with `CrmWriteError`.
    async fn create_contact(&self, email: &str) -> Result<serde_json::Value>;
}
