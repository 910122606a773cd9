use serde::{Deserialize, Serialize};

/// Authentication plugin name of accounts that may not log in
pub const NO_LOGIN_AUTH: &str = "nologin";

/// Recipient of an outbound message, as known by the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: i64,
    /// Authentication plugin of the account, e.g. "manual" or "nologin"
    #[serde(default)]
    pub auth: String,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
}

impl Recipient {
    /// Why this recipient must not receive messages, if any.
    pub fn ineligibility(&self) -> Option<IneligibleReason> {
        if self.auth == NO_LOGIN_AUTH {
            Some(IneligibleReason::NoLogin)
        } else if self.suspended {
            Some(IneligibleReason::Suspended)
        } else if self.deleted {
            Some(IneligibleReason::Deleted)
        } else {
            None
        }
    }
}

/// An outbound message handed over by the host messaging system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub recipient: Recipient,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub full_message: String,
    /// Short form of the message, used as the push text
    #[serde(default)]
    pub small_message: String,
    /// Id of the stored message in the host, for tracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_message_id: Option<i64>,
}

impl NotificationEvent {
    pub fn new(recipient: Recipient, small_message: impl Into<String>) -> Self {
        Self {
            recipient,
            subject: String::new(),
            full_message: String::new(),
            small_message: small_message.into(),
            saved_message_id: None,
        }
    }

    /// Text pushed to the device: the short message, else the subject.
    pub fn push_text(&self) -> &str {
        if self.small_message.trim().is_empty() {
            &self.subject
        } else {
            &self.small_message
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    /// Account authentication is "nologin"
    NoLogin,
    Suspended,
    Deleted,
    /// Recipient not found in the user directory
    UnknownUser,
    /// No email to address the provider filter with
    NoAddress,
}

impl IneligibleReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IneligibleReason::NoLogin => "no_login",
            IneligibleReason::Suspended => "suspended",
            IneligibleReason::Deleted => "deleted",
            IneligibleReason::UnknownUser => "unknown_user",
            IneligibleReason::NoAddress => "no_address",
        }
    }
}

/// Result of a dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Provider accepted the notification
    Delivered {
        #[serde(skip_serializing_if = "Option::is_none")]
        notification_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        recipients: Option<u64>,
        attempts: u32,
    },
    /// Outbound notifications are switched off site-wide
    SkippedSuppressed,
    SkippedIneligible { reason: IneligibleReason },
    /// Provider credentials are missing
    SkippedUnconfigured,
    DeliveryFailed {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        attempts: u32,
    },
}

impl DispatchOutcome {
    /// True unless delivery failed. Skips are intentional no-ops.
    pub fn is_handled(&self) -> bool {
        !matches!(self, DispatchOutcome::DeliveryFailed { .. })
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered { .. })
    }

    /// Label used for metrics and logs
    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Delivered { .. } => "delivered",
            DispatchOutcome::SkippedSuppressed => "skipped_suppressed",
            DispatchOutcome::SkippedIneligible { .. } => "skipped_ineligible",
            DispatchOutcome::SkippedUnconfigured => "skipped_unconfigured",
            DispatchOutcome::DeliveryFailed { .. } => "delivery_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recipient() -> Recipient {
        Recipient {
            id: 1,
            auth: "manual".to_string(),
            suspended: false,
            deleted: false,
            email: "a@example.com".to_string(),
            username: "a".to_string(),
        }
    }

    #[test]
    fn test_ineligibility_order() {
        assert_eq!(recipient().ineligibility(), None);

        let mut r = recipient();
        r.deleted = true;
        assert_eq!(r.ineligibility(), Some(IneligibleReason::Deleted));
        r.suspended = true;
        assert_eq!(r.ineligibility(), Some(IneligibleReason::Suspended));
        r.auth = NO_LOGIN_AUTH.to_string();
        assert_eq!(r.ineligibility(), Some(IneligibleReason::NoLogin));
    }

    #[test]
    fn test_push_text_falls_back_to_subject() {
        let mut event = NotificationEvent::new(recipient(), "  ");
        event.subject = "Assignment due".to_string();
        assert_eq!(event.push_text(), "Assignment due");

        event.small_message = "Due tomorrow".to_string();
        assert_eq!(event.push_text(), "Due tomorrow");
    }

    #[test]
    fn test_event_deserializes_with_defaults() {
        let event: NotificationEvent = serde_json::from_value(json!({
            "recipient": {"id": 3, "email": "c@example.com"},
            "small_message": "hello"
        }))
        .unwrap();
        assert_eq!(event.recipient.username, "");
        assert!(!event.recipient.suspended);
        assert_eq!(event.saved_message_id, None);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = DispatchOutcome::SkippedIneligible {
            reason: IneligibleReason::NoLogin,
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"outcome": "skipped_ineligible", "reason": "no_login"})
        );
        assert!(outcome.is_handled());

        let failed = DispatchOutcome::DeliveryFailed {
            reason: "rejected".to_string(),
            status: Some(400),
            attempts: 1,
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"outcome": "delivery_failed", "reason": "rejected", "status": 400, "attempts": 1})
        );
        assert!(!failed.is_handled());
        assert_eq!(failed.label(), "delivery_failed");
    }
}
