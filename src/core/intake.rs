use crate::domain::model::WebhookNotification;
use crate::utils::error::{BridgeError, Result};
use serde_json::Value;

/// Pulls `event_type`, `object_id` and `resources.response_id` out of a raw webhook body.
pub fn parse_notification(payload: &Value) -> Result<WebhookNotification> {
    let event_type = required_field(payload.get("event_type"));
    let survey_id = required_field(payload.get("object_id"));
    let response_id = required_field(
        payload
            .get("resources")
            .and_then(|resources| resources.get("response_id")),
    );

    match (event_type, survey_id, response_id) {
        (Some(event_type), Some(survey_id), Some(response_id)) => Ok(WebhookNotification {
            event_type,
            survey_id,
            response_id,
        }),
        _ => Err(BridgeError::ValidationError {
            message: "missing required data".to_string(),
        }),
    }
}

fn required_field(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_complete_notification() {
        let payload = json!({
            "name": "My Webhook",
            "event_type": "response_completed",
            "object_type": "survey",
            "object_id": "405987654",
            "resources": {
                "respondent_id": "1234",
                "response_id": "118888888",
                "survey_id": "405987654"
            }
        });

        let notification = parse_notification(&payload).unwrap();
        assert_eq!(notification.event_type, "response_completed");
        assert_eq!(notification.survey_id, "405987654");
        assert_eq!(notification.response_id, "118888888");
    }

    #[test]
    fn test_numeric_ids_are_accepted() {
        let payload = json!({
            "event_type": "response_completed",
            "object_id": 405987654,
            "resources": {"response_id": 118888888}
        });

        let notification = parse_notification(&payload).unwrap();
        assert_eq!(notification.survey_id, "405987654");
        assert_eq!(notification.response_id, "118888888");
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let payloads = vec![
            json!({}),
            json!(null),
            json!("response_completed"),
            json!({"object_id": "s", "resources": {"response_id": "r"}}),
            json!({"event_type": "response_completed", "resources": {"response_id": "r"}}),
            json!({"event_type": "response_completed", "object_id": "s"}),
            json!({"event_type": "response_completed", "object_id": "s", "resources": {}}),
            json!({"event_type": "response_completed", "object_id": "s", "response_id": "r"}),
            json!({"event_type": "", "object_id": "s", "resources": {"response_id": "r"}}),
            json!({"event_type": "response_completed", "object_id": "", "resources": {"response_id": "r"}}),
            json!({"event_type": "response_completed", "object_id": "s", "resources": {"response_id": null}}),
            json!({"event_type": "response_completed", "object_id": ["s"], "resources": {"response_id": "r"}}),
        ];

        for payload in payloads {
            let result = parse_notification(&payload);
            assert!(
                matches!(result, Err(BridgeError::ValidationError { .. })),
                "expected validation error for {payload}"
            );
        }
    }
}
