use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Per-field validation messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First message recorded for a field, which is what a form shows inline.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Turn the collected messages into a `Result`.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(BackofficeError::ValidationFailed(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            if let Some(message) = messages.first() {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum BackofficeError {
    #[error("validation failed: {0}")]
    ValidationFailed(FieldErrors),

    #[error("Unauthorized. Please login again.")]
    Unauthorized,

    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    #[error(
        "Unable to connect to the server. Please check your connection and ensure the backend is running."
    )]
    NetworkUnavailable(String),

    #[error("request timed out after {0}s")]
    RequestTimeout(u64),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl BackofficeError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        BackofficeError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Whether the error ended the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackofficeError::Unauthorized)
    }

    /// Message suitable for a banner or an inline list error.
    pub fn user_message(&self) -> String {
        match self {
            BackofficeError::RequestFailed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BackofficeError>;
