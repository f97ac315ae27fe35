//! Sign-in, sign-out and profile updates.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use validator::Validate;

use crate::error::{BackofficeError, FieldErrors, Result};
use crate::session::UserData;
use crate::utils::validation::{not_blank, validate_form};

use super::envelope::message_of;
use super::http::{ApiClient, ApiRequest};

const SIGNIN_PATH: &str = "auth/signin";
const PROFILE_PATH: &str = "info";
const INVALID_LOGIN: &str = "Invalid email or password. Please try again.";

/// Sign-in form. Both fields are required and checked before any request.
#[derive(Debug)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    fn check(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.expose_secret().is_empty() {
            let mut errors = FieldErrors::new();
            errors.add("credentials", "Email and password are required");
            return Err(BackofficeError::ValidationFailed(errors));
        }
        Ok(())
    }
}

/// Profile form: name and email always, password only when changing it.
#[derive(Debug, Clone, Validate, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
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
    #[serde(skip)]
    pub confirm_password: Option<String>,
}

impl ProfileForm {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            password: None,
            confirm_password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>, confirm: impl Into<String>) -> Self {
        self.password = Some(password.into()).filter(|p| !p.is_empty());
        self.confirm_password = Some(confirm.into());
        self
    }

    pub fn check(&self) -> Result<()> {
        validate_form(self, |errors| {
            if let Some(password) = &self.password
                && self.confirm_password.as_deref() != Some(password.as_str())
            {
                errors.add("confirmPassword", "Passwords do not match");
            }
        })
    }
}

#[derive(Deserialize)]
struct SignInData {
    token: String,
    user: UserData,
}

/// Authentication endpoints. Successful sign-in writes the session into the
/// client's credential store.
#[derive(Debug, Clone)]
pub struct AuthApi {
    api: ApiClient,
}

impl AuthApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `POST /auth/signin`; on success the token and user are persisted.
    pub async fn sign_in(&self, form: &LoginForm) -> Result<UserData> {
        form.check()?;

        let body = serde_json::json!({
            "email": form.email.trim(),
            "password": form.password.expose_secret(),
        });
        let response = self
            .api
            .send(
                ApiRequest::post(SIGNIN_PATH, &body)
                    .anonymous()
                    .failure_message(INVALID_LOGIN),
            )
            .await?;

        let accepted = matches!(response.body.get("status"), Some(Value::Bool(true)));
        let data = response
            .body
            .get("data")
            .cloned()
            .and_then(|d| serde_json::from_value::<SignInData>(d).ok());
        let (true, Some(data)) = (accepted, data) else {
            return Err(BackofficeError::RequestFailed {
                status: response.status.as_u16(),
                message: message_of(&response.body).unwrap_or_else(|| INVALID_LOGIN.to_string()),
            });
        };

        let token = SecretString::from(data.token);
        self.api.credentials().set_session(&token, &data.user)?;
        info!(email = %data.user.email, "signed in");
        Ok(data.user)
    }

    /// Clear the local session. The backend keeps no server-side session.
    pub fn logout(&self) -> Result<()> {
        self.api.credentials().logout()
    }

    /// `PUT /info?id=<user id>`; on success the new name and email are merged
    /// into the stored user record.
    pub async fn update_profile(&self, form: &ProfileForm) -> Result<UserData> {
        form.check()?;
        let (_, user) = self.api.credentials().require_session()?;
        let user_id = user.and_then(|u| u.id).ok_or_else(|| {
            BackofficeError::Other(
                "signed-in user record has no id; sign in again to refresh it".to_string(),
            )
        })?;

        let body = serde_json::to_value(form)?;
        let query = [("id", user_id.as_str())];
        self.api
            .send(ApiRequest::put(PROFILE_PATH, &body).query(&query))
            .await?;

        let updated = self
            .api
            .credentials()
            .update_user_data(|user| {
                user.full_name = form.full_name.clone();
                user.email = form.email.clone();
            })?
            .ok_or(BackofficeError::Unauthorized)?;
        info!("profile updated");
        Ok(updated)
    }
}
