use axum::{extract::FromRequestParts, http::header, http::request::Parts};

use crate::error::AppError;
use crate::server::AppState;

use super::{Claims, MANAGE_DEVICES, VIEW_DEVICES};

/// The authenticated caller of a request.
///
/// Acts as the implicit actor for defaulted parameters and as the anchor of
/// every ownership check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: i64,
    pub capabilities: Vec<String>,
}

impl SessionContext {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            capabilities: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    pub fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        let user_id = claims
            .user_id()
            .parse::<i64>()
            .map_err(|_| AppError::Auth(format!("Invalid subject: {}", claims.user_id())))?;

        Ok(Self {
            user_id,
            capabilities: claims.capabilities.clone(),
        })
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    pub fn can_manage_devices(&self) -> bool {
        self.has_capability(MANAGE_DEVICES)
    }

    /// Whether the caller may look at the devices of `user_id`.
    pub fn can_view_devices_of(&self, user_id: i64) -> bool {
        user_id == self.user_id || self.has_capability(VIEW_DEVICES)
    }
}

impl FromRequestParts<AppState> for SessionContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Auth("Missing bearer token".to_string()))?;

        let claims = state.jwt_validator.validate(token)?;
        Self::from_claims(&claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            exp: 0,
            iat: 0,
            roles: vec![],
            capabilities: vec![MANAGE_DEVICES.to_string()],
            extra: Default::default(),
        }
    }

    #[test]
    fn test_from_claims() {
        let session = SessionContext::from_claims(&claims("7")).unwrap();
        assert_eq!(session.user_id, 7);
        assert!(session.can_manage_devices());
    }

    #[test]
    fn test_non_numeric_subject_is_rejected() {
        assert!(matches!(
            SessionContext::from_claims(&claims("user-abc")),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn test_view_other_users_requires_capability() {
        let session = SessionContext::new(1);
        assert!(session.can_view_devices_of(1));
        assert!(!session.can_view_devices_of(2));

        let admin = SessionContext::new(1).with_capability(VIEW_DEVICES);
        assert!(admin.can_view_devices_of(2));
    }
}
