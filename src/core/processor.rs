use crate::core::email::extract_email;
use crate::core::intake::parse_notification;
use crate::domain::model::{ProcessOutcome, ProcessingStage};
use crate::domain::ports::{CrmProvider, SurveyProvider};
use crate::utils::error::{BridgeError, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Runs one webhook delivery through intake, enrichment and CRM submission.
///
/// Every stage is a hard gate and nothing is retried. The processor holds no
/// per-request state, so one instance serves all concurrent deliveries.
#[derive(Clone)]
pub struct WebhookProcessor {
    survey: Arc<dyn SurveyProvider>,
    crm: Arc<dyn CrmProvider>,
}

impl WebhookProcessor {
    pub fn new(survey: Arc<dyn SurveyProvider>, crm: Arc<dyn CrmProvider>) -> Self {
        Self { survey, crm }
    }

    pub async fn process(&self, payload: &Value) -> Result<ProcessOutcome> {
        info!(stage = %ProcessingStage::Received, payload = %payload, "SurveyMonkey webhook received");

        let notification = parse_notification(payload).inspect_err(|_| {
            error!(stage = %ProcessingStage::Rejected, "Missing required webhook data");
        })?;
        debug!(
            stage = %ProcessingStage::Validated,
            event_type = %notification.event_type,
            survey_id = %notification.survey_id,
            response_id = %notification.response_id,
            "Webhook notification validated"
        );

        if !notification.is_response_completed() {
            info!(stage = %ProcessingStage::Ignored, "Ignoring event type: {}", notification.event_type);
            return Ok(ProcessOutcome::Ignored {
                event_type: notification.event_type,
            });
        }

        debug!(stage = %ProcessingStage::Fetching, "Fetching survey response detail");
        let detail = self
            .survey
            .fetch_response_detail(&notification.survey_id, &notification.response_id)
            .await
            .inspect_err(|e| {
                if let BridgeError::UpstreamFetchError { status, body } = e {
                    error!(
                        stage = %ProcessingStage::Rejected,
                        survey_id = %notification.survey_id,
                        response_id = %notification.response_id,
                        status = ?status,
                        body = %body,
                        "Failed to fetch SurveyMonkey response"
                    );
                }
            })?;

        let email = extract_email(&detail).ok_or_else(|| {
            warn!(
                stage = %ProcessingStage::Rejected,
                response_id = %notification.response_id,
                "No email found in survey response"
            );
            BridgeError::NoEmailFoundError {
                response_id: notification.response_id.clone(),
            }
        })?;
        debug!(stage = %ProcessingStage::Extracted, email = %email, "Email extracted");

        debug!(stage = %ProcessingStage::Submitting, "Creating person in Attio");
        let record = self.crm.create_contact(&email).await.inspect_err(|e| {
            if let BridgeError::CrmWriteError { email, status, body } = e {
                error!(
                    stage = %ProcessingStage::Rejected,
                    email = %email,
                    status = ?status,
                    body = %body,
                    "Failed to create person in Attio"
                );
            }
        })?;

        info!(
            stage = %ProcessingStage::Done,
            email = %email,
            survey_id = %notification.survey_id,
            response_id = %notification.response_id,
            attio_response = %record,
            "Successfully created person in Attio"
        );

        Ok(ProcessOutcome::Created {
            email,
            survey_id: notification.survey_id,
            response_id: notification.response_id,
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SurveyResponseDetail;
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;

    struct MockSurvey {
        detail: Option<Value>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockSurvey {
        fn returning(detail: Value) -> Arc<Self> {
            Arc::new(Self {
                detail: Some(detail),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                detail: None,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SurveyProvider for MockSurvey {
        async fn fetch_response_detail(
            &self,
            survey_id: &str,
            response_id: &str,
        ) -> Result<SurveyResponseDetail> {
            self.calls
                .lock()
                .await
                .push((survey_id.to_string(), response_id.to_string()));
            match &self.detail {
                Some(detail) => Ok(SurveyResponseDetail::from_json(detail.clone())),
                None => Err(BridgeError::UpstreamFetchError {
                    status: Some(404),
                    body: "{\"error\":\"not found\"}".to_string(),
                }),
            }
        }
    }

    struct MockCrm {
        succeed: bool,
        created: Mutex<Vec<String>>,
    }

    impl MockCrm {
        fn new(succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                succeed,
                created: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CrmProvider for MockCrm {
        async fn create_contact(&self, email: &str) -> Result<Value> {
            self.created.lock().await.push(email.to_string());
            if self.succeed {
                Ok(json!({"data": {"id": {"record_id": "rec_1"}}}))
            } else {
                Err(BridgeError::CrmWriteError {
                    email: email.to_string(),
                    status: Some(400),
                    body: "bad request".to_string(),
                })
            }
        }
    }

    fn completed_event() -> Value {
        json!({
            "event_type": "response_completed",
            "object_id": "survey-1",
            "resources": {"response_id": "response-1"}
        })
    }

    fn detail_with_email(email: &str) -> Value {
        json!({"pages": [{"questions": [
            {"heading": "Email Address", "answers": [{"text": email}]}
        ]}]})
    }

    #[tokio::test]
    async fn test_missing_data_makes_no_outbound_calls() {
        let survey = MockSurvey::returning(detail_with_email("a@b.com"));
        let crm = MockCrm::new(true);
        let processor = WebhookProcessor::new(survey.clone(), crm.clone());

        let result = processor
            .process(&json!({"event_type": "response_completed", "object_id": "survey-1"}))
            .await;

        assert!(matches!(result, Err(BridgeError::ValidationError { .. })));
        assert!(survey.calls.lock().await.is_empty());
        assert!(crm.created.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_other_event_types_are_ignored() {
        let survey = MockSurvey::returning(detail_with_email("a@b.com"));
        let crm = MockCrm::new(true);
        let processor = WebhookProcessor::new(survey.clone(), crm.clone());

        for event_type in ["response_created", "response_updated", "collector_created"] {
            let outcome = processor
                .process(&json!({
                    "event_type": event_type,
                    "object_id": "survey-1",
                    "resources": {"response_id": "response-1"}
                }))
                .await
                .unwrap();

            assert_eq!(
                outcome,
                ProcessOutcome::Ignored {
                    event_type: event_type.to_string()
                }
            );
        }

        assert!(survey.calls.lock().await.is_empty());
        assert!(crm.created.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_crm() {
        let survey = MockSurvey::failing();
        let crm = MockCrm::new(true);
        let processor = WebhookProcessor::new(survey.clone(), crm.clone());

        let result = processor.process(&completed_event()).await;

        assert!(matches!(result, Err(BridgeError::UpstreamFetchError { .. })));
        assert_eq!(survey.calls.lock().await.len(), 1);
        assert!(crm.created.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_no_email_found() {
        let survey = MockSurvey::returning(json!({"pages": [{"questions": [
            {"heading": "Name", "answers": [{"text": "Ada"}]}
        ]}]}));
        let crm = MockCrm::new(true);
        let processor = WebhookProcessor::new(survey, crm.clone());

        let error = processor.process(&completed_event()).await.unwrap_err();

        assert!(matches!(
            &error,
            BridgeError::NoEmailFoundError { response_id } if response_id == "response-1"
        ));
        assert_eq!(error.status_code(), 400);
        assert_eq!(error.public_message(), "No email found");
        assert!(crm.created.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_crm_failure() {
        let survey = MockSurvey::returning(detail_with_email("person@example.com"));
        let crm = MockCrm::new(false);
        let processor = WebhookProcessor::new(survey, crm.clone());

        let error = processor.process(&completed_event()).await.unwrap_err();

        assert!(matches!(error, BridgeError::CrmWriteError { .. }));
        assert_eq!(error.public_message(), "Failed to create person in Attio");
        assert_eq!(
            crm.created.lock().await.as_slice(),
            ["person@example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_success() {
        let survey = MockSurvey::returning(detail_with_email("person@example.com"));
        let crm = MockCrm::new(true);
        let processor = WebhookProcessor::new(survey.clone(), crm.clone());

        let outcome = processor.process(&completed_event()).await.unwrap();

        match outcome {
            ProcessOutcome::Created {
                email,
                survey_id,
                response_id,
                record,
            } => {
                assert_eq!(email, "person@example.com");
                assert_eq!(survey_id, "survey-1");
                assert_eq!(response_id, "response-1");
                assert_eq!(record["data"]["id"]["record_id"], "rec_1");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        assert_eq!(
            survey.calls.lock().await.as_slice(),
            [("survey-1".to_string(), "response-1".to_string())]
        );
    }
}
