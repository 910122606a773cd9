//! In-memory user directory for development and tests.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{DirectoryError, UserDirectory, UserPreference, UserRecord};

#[derive(Default)]
pub struct MemoryUserDirectory {
    users: DashMap<i64, UserRecord>,
    preferences: DashMap<i64, Vec<UserPreference>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: UserRecord) {
        self.users.insert(user.id, user);
    }

    pub fn set_preference(&self, user_id: i64, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let mut prefs = self.preferences.entry(user_id).or_default();
        match prefs.iter().position(|p| p.name == name) {
            Some(index) => prefs[index].value = value,
            None => prefs.push(UserPreference { name, value }),
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_user(&self, user_id: i64) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.users.get(&user_id).map(|u| u.clone()))
    }

    async fn notification_preferences(&self, user_id: i64) -> Result<Option<Vec<UserPreference>>, DirectoryError> {
        if !self.users.contains_key(&user_id) {
            return Ok(None);
        }
        Ok(Some(
            self.preferences
                .get(&user_id)
                .map(|p| p.clone())
                .unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_preferences_of_unknown_user() {
        let directory = MemoryUserDirectory::new();
        assert!(directory.notification_preferences(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_preference_overwrites() {
        let directory = MemoryUserDirectory::new();
        directory.insert_user(UserRecord {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
        });
        directory.set_preference(1, "message_provider_a_loggedin", "email");
        directory.set_preference(1, "message_provider_a_loggedin", "email,onesignal");

        let prefs = directory.notification_preferences(1).await.unwrap().unwrap();
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].value, "email,onesignal");
    }
}
