use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Capability required to enable or disable push devices
pub const MANAGE_DEVICES: &str = "push:manage_devices";

/// Capability required to list another user's devices
pub const VIEW_DEVICES: &str = "push:view_devices";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (numeric user ID of the host platform)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// User roles
    #[serde(default)]
    pub roles: Vec<String>,
    /// Capabilities granted by the host permission model
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Additional custom claims
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }
}
