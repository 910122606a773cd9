//! Whether users have routed any message provider to the push processor.

use serde::Serialize;

use crate::config::MessagingConfig;
use crate::directory::{DirectoryError, UserDirectory, UserPreference};

const PREFERENCE_PREFIX: &str = "message_provider_";
const LOGGED_IN_SUFFIX: &str = "_loggedin";
const LOGGED_OFF_SUFFIX: &str = "_loggedoff";

/// Warning code for users missing from the directory
pub const UNKNOWN_USER_WARNING: &str = "unknownuser";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPreferenceStatus {
    pub userid: i64,
    pub configured: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceWarning {
    pub item: &'static str,
    pub itemid: i64,
    pub warningcode: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreferencesReport {
    pub users: Vec<UserPreferenceStatus>,
    pub warnings: Vec<PreferenceWarning>,
}

fn is_delivery_preference(name: &str) -> bool {
    name.starts_with(PREFERENCE_PREFIX) && (name.ends_with(LOGGED_IN_SUFFIX) || name.ends_with(LOGGED_OFF_SUFFIX))
}

fn lists_processor(value: &str, processor: &str) -> bool {
    value.split(',').any(|p| p.trim() == processor)
}

/// True if any delivery preference, user-set or site-forced, lists the processor.
pub fn preferences_route_to(preferences: &[UserPreference], messaging: &MessagingConfig) -> bool {
    let processor = messaging.processor_name.as_str();

    let forced = messaging
        .forced_preferences
        .iter()
        .any(|(name, value)| is_delivery_preference(name) && lists_processor(value, processor));

    forced
        || preferences
            .iter()
            .any(|p| is_delivery_preference(&p.name) && lists_processor(&p.value, processor))
}

/// Check each user's message preferences for the push processor.
///
/// Unknown users produce a warning entry instead of a status.
#[tracing::instrument(skip(directory, messaging), fields(count = user_ids.len()))]
pub async fn are_notification_preferences_configured(
    directory: &dyn UserDirectory,
    messaging: &MessagingConfig,
    user_ids: &[i64],
) -> Result<PreferencesReport, DirectoryError> {
    let mut report = PreferencesReport::default();

    for &user_id in user_ids {
        match directory.notification_preferences(user_id).await? {
            Some(preferences) => report.users.push(UserPreferenceStatus {
                userid: user_id,
                configured: preferences_route_to(&preferences, messaging),
            }),
            None => report.warnings.push(PreferenceWarning {
                item: "user",
                itemid: user_id,
                warningcode: UNKNOWN_USER_WARNING,
                message: format!("User with id {} not found", user_id),
            }),
        }
    }

    Ok(report)
}
