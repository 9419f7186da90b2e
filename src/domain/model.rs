use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The only event type that triggers a CRM write.
pub const RESPONSE_COMPLETED: &str = "response_completed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookNotification {
    pub event_type: String,
    pub survey_id: String,
    pub response_id: String,
}

impl WebhookNotification {
    pub fn is_response_completed(&self) -> bool {
        self.event_type == RESPONSE_COMPLETED
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SurveyResponseDetail {
    #[serde(default, deserialize_with = "lenient::seq")]
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Page {
    #[serde(default, deserialize_with = "lenient::seq")]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Question {
    #[serde(default, deserialize_with = "lenient::string")]
    pub heading: Option<String>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Answer {
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: Option<String>,
}

impl SurveyResponseDetail {
    /// Falls back to an empty detail when the body does not have the expected shape.
    pub fn from_json(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Survey response detail has an unexpected shape");
            Self::default()
        })
    }
}

/// Survey forms are free-form, so type mismatches read as "absent" instead of failing.
mod lenient {
    use super::*;
    use serde::de::DeserializeOwned;
    use serde_json::Value;

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrmContactPayload {
    pub data: CrmRecordData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrmRecordData {
    pub values: CrmRecordValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrmRecordValues {
    pub email_addresses: Vec<CrmEmailAddress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrmEmailAddress {
    pub email_address: String,
}

impl CrmContactPayload {
    pub fn for_email(email: &str) -> Self {
        Self {
            data: CrmRecordData {
                values: CrmRecordValues {
                    email_addresses: vec![CrmEmailAddress {
                        email_address: email.to_string(),
                    }],
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    Ignored {
        event_type: String,
    },
    Created {
        email: String,
        survey_id: String,
        response_id: String,
        /// Record as returned by the CRM; raw text when the body was not JSON.
        record: serde_json::Value,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    Received,
    Validated,
    Ignored,
    Fetching,
    Extracted,
    Submitting,
    Done,
    Rejected,
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessingStage::Received => "received",
            ProcessingStage::Validated => "validated",
            ProcessingStage::Ignored => "ignored",
            ProcessingStage::Fetching => "fetching",
            ProcessingStage::Extracted => "extracted",
            ProcessingStage::Submitting => "submitting",
            ProcessingStage::Done => "done",
            ProcessingStage::Rejected => "rejected",
        };
        f.write_str(name)
    }
}
