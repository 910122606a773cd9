use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use crate::config::{DeliveryConfig, ProviderConfig, Settings};
use crate::directory::UserDirectory;
use crate::infrastructure::backoff::{BackoffConfig, ExponentialBackoff};
use crate::metrics::DispatchMetrics;
use crate::provider::{NotificationPayload, ProviderResponse, PushTransport, TransportError};

use super::types::{DispatchOutcome, IneligibleReason, NotificationEvent, Recipient};

/// Configuration snapshot a dispatch runs against.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext<'a> {
    pub provider: &'a ProviderConfig,
    /// Site-wide "never send notifications" switch
    pub suppress_all: bool,
}

impl<'a> DispatchContext<'a> {
    pub fn new(provider: &'a ProviderConfig, suppress_all: bool) -> Self {
        Self {
            provider,
            suppress_all,
        }
    }

    pub fn from_settings(settings: &'a Settings) -> Self {
        Self::new(&settings.provider, settings.messaging.suppress_all)
    }
}

/// Statistics for the push dispatcher
#[derive(Debug, Default)]
pub struct DispatcherStats {
    pub total_messages: AtomicU64,
    pub delivered: AtomicU64,
    pub skipped: AtomicU64,
    pub failed: AtomicU64,
    /// Provider HTTP calls, retries included
    pub provider_calls: AtomicU64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            total_messages: self.total_messages.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            provider_calls: self.provider_calls.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub total_messages: u64,
    pub delivered: u64,
    pub skipped: u64,
    pub failed: u64,
    pub provider_calls: u64,
}

/// Turns outbound message events into provider notifications.
pub struct PushDispatcher {
    transport: Arc<dyn PushTransport>,
    directory: Arc<dyn UserDirectory>,
    backoff: BackoffConfig,
    max_retries: u32,
    stats: DispatcherStats,
}

impl PushDispatcher {
    pub fn new(
        transport: Arc<dyn PushTransport>,
        directory: Arc<dyn UserDirectory>,
        delivery: &DeliveryConfig,
    ) -> Self {
        Self {
            transport,
            directory,
            backoff: BackoffConfig::from(delivery),
            max_retries: delivery.max_retries,
            stats: DispatcherStats::default(),
        }
    }

    /// Messages may target any user, including internal support users.
    pub fn can_send_to_any_users(&self) -> bool {
        true
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatcherStatsSnapshot {
        self.stats.snapshot()
    }

    /// Dispatch one message event.
    ///
    /// Skips (suppression, ineligible recipient, missing credentials) are
    /// reported without contacting the provider.
    #[tracing::instrument(
        name = "dispatcher.send_message",
        skip(self, ctx, event),
        fields(
            dispatch_id = %Uuid::new_v4(),
            recipient_id = event.recipient.id,
            saved_message_id = ?event.saved_message_id
        )
    )]
    pub async fn send_message(&self, ctx: &DispatchContext<'_>, event: NotificationEvent) -> DispatchOutcome {
        let started = Instant::now();
        let outcome = self.process(ctx, event).await;

        self.stats.total_messages.fetch_add(1, Ordering::Relaxed);
        match &outcome {
            DispatchOutcome::Delivered { .. } => {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
            }
            DispatchOutcome::DeliveryFailed { .. } => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
            }
            _ => {
                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            }
        }
        DispatchMetrics::record_outcome(outcome.label());
        DispatchMetrics::observe_latency(started.elapsed().as_secs_f64());

        outcome
    }

    async fn process(&self, ctx: &DispatchContext<'_>, event: NotificationEvent) -> DispatchOutcome {
        if ctx.suppress_all {
            tracing::debug!("Outbound notifications suppressed site-wide");
            return DispatchOutcome::SkippedSuppressed;
        }

        if let Some(reason) = event.recipient.ineligibility() {
            tracing::debug!(reason = reason.as_str(), "Recipient not eligible for push");
            return DispatchOutcome::SkippedIneligible { reason };
        }

        if !ctx.provider.is_configured() {
            tracing::warn!("Push provider credentials missing, message not sent");
            return DispatchOutcome::SkippedUnconfigured;
        }

        let recipient = match self.resolve_address(event.recipient.clone()).await {
            Ok(recipient) => recipient,
            Err(outcome) => return outcome,
        };

        let payload = NotificationPayload::for_email(ctx.provider, &recipient.email, event.push_text());
        self.deliver(&ctx.provider.rest_key, &payload).await
    }

    /// Fill in the username (and email) from the directory when missing.
    async fn resolve_address(&self, mut recipient: Recipient) -> Result<Recipient, DispatchOutcome> {
        if recipient.username.trim().is_empty() {
            let record = match self.directory.find_user(recipient.id).await {
                Ok(Some(record)) => record,
                Ok(None) => {
                    tracing::warn!(user_id = recipient.id, "Recipient not found in user directory");
                    return Err(DispatchOutcome::SkippedIneligible {
                        reason: IneligibleReason::UnknownUser,
                    });
                }
                Err(e) => {
                    tracing::error!(user_id = recipient.id, error = %e, "User directory lookup failed");
                    return Err(DispatchOutcome::DeliveryFailed {
                        reason: format!("user lookup failed: {}", e),
                        status: None,
                        attempts: 0,
                    });
                }
            };

            recipient.username = record.username;
            if recipient.email.trim().is_empty() {
                recipient.email = record.email;
            }
        }

        if recipient.email.trim().is_empty() {
            tracing::warn!(user_id = recipient.id, "Recipient has no email to address");
            return Err(DispatchOutcome::SkippedIneligible {
                reason: IneligibleReason::NoAddress,
            });
        }

        Ok(recipient)
    }

    /// POST the payload, retrying transient failures with backoff.
    async fn deliver(&self, rest_key: &str, payload: &NotificationPayload) -> DispatchOutcome {
        let mut backoff = ExponentialBackoff::with_config(self.backoff.clone());
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            self.stats.provider_calls.fetch_add(1, Ordering::Relaxed);

            match self.transport.send(rest_key, payload).await {
                Ok(response) => return delivered(response, attempts),
                Err(e) if e.is_retryable() && attempts <= self.max_retries => {
                    let delay = backoff.next_delay();
                    DispatchMetrics::record_retry();
                    tracing::warn!(
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Provider call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(attempts = attempts, error = %e, "Push delivery failed");
                    let status = match &e {
                        TransportError::Status { status, .. } => Some(*status),
                        _ => None,
                    };
                    return DispatchOutcome::DeliveryFailed {
                        reason: e.to_string(),
                        status,
                        attempts,
                    };
                }
            }
        }
    }
}

fn delivered(response: ProviderResponse, attempts: u32) -> DispatchOutcome {
    let reply = response.reply;

    if reply.errors.is_some() && reply.recipients.unwrap_or(0) == 0 {
        tracing::warn!(
            status = response.status,
            errors = ?reply.errors,
            "Provider accepted the notification but reported no recipients"
        );
    } else {
        tracing::info!(
            status = response.status,
            notification_id = ?reply.id,
            recipients = ?reply.recipients,
            attempts = attempts,
            "Push notification delivered to provider"
        );
    }

    DispatchOutcome::Delivered {
        notification_id: reply.id.filter(|id| !id.is_empty()),
        recipients: reply.recipients,
        attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryUserDirectory;
    use crate::provider::ProviderReply;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays scripted results and counts calls.
    struct ScriptedTransport {
        results: Mutex<Vec<Result<ProviderResponse, TransportError>>>,
        calls: AtomicU64,
    }

    impl ScriptedTransport {
        fn new(mut results: Vec<Result<ProviderResponse, TransportError>>) -> Self {
            results.reverse();
            Self {
                results: Mutex::new(results),
                calls: AtomicU64::new(0),
            }
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PushTransport for ScriptedTransport {
        async fn send(&self, _rest_key: &str, _payload: &NotificationPayload) -> Result<ProviderResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(TransportError::Network("script exhausted".into())))
        }
    }

    fn ok() -> Result<ProviderResponse, TransportError> {
        Ok(ProviderResponse {
            status: 200,
            reply: ProviderReply {
                id: Some("notif-1".to_string()),
                recipients: Some(1),
                errors: None,
            },
        })
    }

    fn status(code: u16) -> Result<ProviderResponse, TransportError> {
        Err(TransportError::Status {
            status: code,
            body: String::new(),
        })
    }

    fn provider() -> ProviderConfig {
        ProviderConfig {
            app_id: "app".to_string(),
            rest_key: "key".to_string(),
            ..ProviderConfig::default()
        }
    }

    fn dispatcher(transport: Arc<ScriptedTransport>, max_retries: u32) -> PushDispatcher {
        let delivery = DeliveryConfig {
            max_retries,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        };
        PushDispatcher::new(transport, Arc::new(MemoryUserDirectory::new()), &delivery)
    }

    fn event() -> NotificationEvent {
        NotificationEvent::new(
            Recipient {
                id: 1,
                auth: "manual".to_string(),
                suspended: false,
                deleted: false,
                email: "a@example.com".to_string(),
                username: "a".to_string(),
            },
            "hello",
        )
    }

    #[tokio::test]
    async fn test_retries_transient_failure_then_delivers() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(503), ok()]));
        let dispatcher = dispatcher(transport.clone(), 2);
        let provider = provider();

        let outcome = dispatcher
            .send_message(&DispatchContext::new(&provider, false), event())
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Delivered {
                notification_id: Some("notif-1".to_string()),
                recipients: Some(1),
                attempts: 2,
            }
        );
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(400), ok()]));
        let dispatcher = dispatcher(transport.clone(), 2);
        let provider = provider();

        let outcome = dispatcher
            .send_message(&DispatchContext::new(&provider, false), event())
            .await;

        assert!(matches!(
            outcome,
            DispatchOutcome::DeliveryFailed {
                status: Some(400),
                attempts: 1,
                ..
            }
        ));
        assert_eq!(transport.calls(), 1);
        assert_eq!(dispatcher.stats().failed, 1);
    }

    #[tokio::test]
    async fn test_retry_budget_is_bounded() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(TransportError::Timeout),
            Err(TransportError::Timeout),
            Err(TransportError::Timeout),
            ok(),
        ]));
        let dispatcher = dispatcher(transport.clone(), 2);
        let provider = provider();

        let outcome = dispatcher
            .send_message(&DispatchContext::new(&provider, false), event())
            .await;

        assert!(matches!(
            outcome,
            DispatchOutcome::DeliveryFailed {
                status: None,
                attempts: 3,
                ..
            }
        ));
        assert_eq!(transport.calls(), 3);
        assert_eq!(dispatcher.stats().provider_calls, 3);
    }

    #[tokio::test]
    async fn test_empty_provider_id_is_dropped() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(ProviderResponse {
            status: 200,
            reply: ProviderReply {
                id: Some(String::new()),
                recipients: Some(0),
                errors: Some(serde_json::json!(["All included players are not subscribed"])),
            },
        })]));
        let dispatcher = dispatcher(transport, 0);
        let provider = provider();

        let outcome = dispatcher
            .send_message(&DispatchContext::new(&provider, false), event())
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Delivered {
                notification_id: None,
                recipients: Some(0),
                attempts: 1,
            }
        );
    }
}
