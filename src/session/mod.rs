//! Signed-in session state.
//!
//! The session is two key-value entries: the bearer token under `authToken`
//! and the user record under `userData`. Everything that talks to the backend
//! reads them through a shared [`CredentialStore`].

pub mod credentials;
pub mod store;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::id::opt_string_or_number;

pub use credentials::{CredentialStore, SessionEvent, Subscription};
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// The signed-in user as returned by sign-in and stored under `userData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    /// Either a role name or a role object, depending on the backend version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserData {
    pub fn new(email: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            full_name: full_name.into(),
            role: None,
            extra: Map::new(),
        }
    }

    /// Role name, whichever shape the backend sent.
    pub fn role_name(&self) -> Option<&str> {
        match self.role.as_ref()? {
            Value::String(name) => Some(name.as_str()),
            Value::Object(obj) => obj.get("name").and_then(Value::as_str),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_data_accepts_role_shapes() {
        let user: UserData = serde_json::from_value(json!({
            "id": 9,
            "email": "admin@example.com",
            "fullName": "Ada Admin",
            "role": {"id": 1, "name": "Super Admin"},
            "avatar": "a.png"
        }))
        .unwrap();
        assert_eq!(user.id.as_deref(), Some("9"));
        assert_eq!(user.role_name(), Some("Super Admin"));
        assert_eq!(user.extra.get("avatar"), Some(&json!("a.png")));

        let user: UserData =
            serde_json::from_value(json!({"email": "e@x.io", "fullName": "E", "role": "Editor"}))
                .unwrap();
        assert_eq!(user.role_name(), Some("Editor"));
        assert_eq!(user.id, None);
    }
}
