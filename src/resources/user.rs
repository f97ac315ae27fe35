use serde::{Deserialize, Serialize};
use tabled::Tabled;
use validator::Validate;

use crate::error::Result;
use crate::remote::{Resource, WriteMode};
use crate::utils::id::{opt_string_or_number, string_or_number};
use crate::utils::validation::{not_blank, validate_form};

use super::{TableRow, or_dash};

/// Console user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub role_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// The role embedded in a user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl User {
    /// The role id, from `roleId` or the embedded role.
    pub fn effective_role_id(&self) -> Option<&str> {
        self.role_id
            .as_deref()
            .or_else(|| self.role.as_ref().map(|r| r.id.as_str()))
    }
}

impl Resource for User {
    type Draft = UserDraft;
    const KIND: &'static str = "User";
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.full_name
    }

    /// A password is mandatory on create and optional on update.
    fn check_draft(draft: &UserDraft, mode: WriteMode) -> Result<()> {
        validate_form(draft, |errors| {
            if mode == WriteMode::Create && draft.password.is_none() {
                errors.add("password", "Password is required");
            }
        })
    }
}

/// Create and update body. An update without a password keeps the current one.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    #[validate(
        custom(function = "not_blank", message = "Full name is required"),
        length(min = 2, message = "Full name must be at least 2 characters long")
    )]
    pub full_name: String,
    #[validate(
        custom(function = "not_blank", message = "Email is required"),
        email(message = "Invalid email address")
    )]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: Option<String>,
    #[validate(custom(function = "not_blank", message = "Role is required"))]
    pub role_id: String,
}

impl UserDraft {
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        role_id: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into().trim().to_string(),
            email: email.into().trim().to_string(),
            password: None,
            role_id: role_id.into(),
        }
    }

    /// Set the password; an empty string leaves it unset.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into()).filter(|p| !p.is_empty());
        self
    }

    /// Start an edit form from an existing user. The password stays blank.
    pub fn from_user(user: &User) -> Self {
        Self {
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            password: None,
            role_id: user.effective_role_id().unwrap_or_default().to_string(),
        }
    }
}

#[derive(Tabled)]
pub struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Full name")]
    full_name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
}

impl TableRow for User {
    type Row = UserRow;

    fn row(&self) -> UserRow {
        let role = self
            .role
            .as_ref()
            .map(|r| r.name.as_str())
            .or(self.role_id.as_deref());
        UserRow {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            role: or_dash(role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackofficeError;
    use serde_json::json;

    #[test]
    fn test_user_decodes_embedded_role() {
        let user: User = serde_json::from_value(json!({
            "id": 9,
            "fullName": "Ada Lovelace",
            "email": "ada@example.com",
            "role": {"id": 2, "name": "Editor"},
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(user.id, "9");
        assert_eq!(user.effective_role_id(), Some("2"));
        assert_eq!(UserDraft::from_user(&user).role_id, "2");
    }

    #[test]
    fn test_create_requires_password() {
        let draft = UserDraft::new("Ada", "ada@example.com", "2");
        let Err(BackofficeError::ValidationFailed(errors)) =
            User::check_draft(&draft, WriteMode::Create)
        else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(errors.first("password"), Some("Password is required"));

        assert!(User::check_draft(&draft, WriteMode::Update).is_ok());
        let draft = draft.with_password("secret1");
        assert!(User::check_draft(&draft, WriteMode::Create).is_ok());
    }

    #[test]
    fn test_user_field_rules() {
        let draft = UserDraft::new("A", "not-an-email", "").with_password("123");
        let Err(BackofficeError::ValidationFailed(errors)) =
            User::check_draft(&draft, WriteMode::Create)
        else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(errors.first("email"), Some("Invalid email address"));
        assert_eq!(
            errors.first("password"),
            Some("Password must be at least 6 characters long")
        );
        assert!(errors.to_string().contains("Role is required"));
    }

    #[test]
    fn test_update_body_omits_blank_password() {
        let draft = UserDraft::new("Ada", "ada@example.com", "2").with_password("");
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({"fullName": "Ada", "email": "ada@example.com", "roleId": "2"})
        );
    }
}
