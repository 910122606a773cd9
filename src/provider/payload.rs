//! OneSignal notification request body.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

/// Segment covering every subscriber; the email filter narrows it down.
pub const ALL_SEGMENTS: &str = "All";

/// Language key of the pushed text. Outbound text is not localized.
pub const CONTENT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub relation: String,
    pub value: String,
}

impl Filter {
    /// Match devices whose registered email tag equals `email`.
    pub fn email_equals(email: &str) -> Self {
        Self {
            field: "email".to_string(),
            relation: "=".to_string(),
            value: email.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub app_id: String,
    pub included_segments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
    pub large_icon: String,
    pub contents: HashMap<String, String>,
    pub filters: Vec<Filter>,
}

impl NotificationPayload {
    /// Build the request addressing every device registered with `email`.
    pub fn for_email(provider: &ProviderConfig, email: &str, text: &str) -> Self {
        Self {
            app_id: provider.app_id.clone(),
            included_segments: vec![ALL_SEGMENTS.to_string()],
            data: provider.data.clone(),
            large_icon: provider.large_icon.clone(),
            contents: HashMap::from([(CONTENT_LANGUAGE.to_string(), text.to_string())]),
            filters: vec![Filter::email_equals(email)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> ProviderConfig {
        ProviderConfig {
            app_id: "app-123".to_string(),
            rest_key: "key".to_string(),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn test_wire_shape() {
        let payload = NotificationPayload::for_email(&provider(), "bob@example.com", "New grade");

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "app_id": "app-123",
                "included_segments": ["All"],
                "large_icon": "ic_launcher_round.png",
                "contents": {"en": "New grade"},
                "filters": [{"field": "email", "relation": "=", "value": "bob@example.com"}]
            })
        );
    }

    #[test]
    fn test_data_passthrough() {
        let mut provider = provider();
        provider.data = Some(HashMap::from([("screen".to_string(), "inbox".to_string())]));

        let payload = NotificationPayload::for_email(&provider, "bob@example.com", "hi");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["data"], json!({"screen": "inbox"}));
    }
}
