//! Outbound message dispatch to the push provider.
//!
//! `PushDispatcher::send_message` runs each event through suppression,
//! recipient eligibility and the configuration gate before resolving the
//! address and calling the provider. Every path ends in a `DispatchOutcome`.

mod dispatcher;
pub mod preferences;
mod types;

pub use dispatcher::{DispatchContext, DispatcherStats, DispatcherStatsSnapshot, PushDispatcher};
pub use preferences::{
    are_notification_preferences_configured, PreferenceWarning, PreferencesReport,
    UserPreferenceStatus,
};
pub use types::{DispatchOutcome, IneligibleReason, NotificationEvent, Recipient, NO_LOGIN_AUTH};
