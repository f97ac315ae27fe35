//! Firestore REST client.
//!
//! Documents live under
//! `projects/<project>/databases/(default)/documents/<collection>/<id>` and
//! carry typed values (`stringValue`, `integerValue`, `mapValue`, ...). The
//! codec here maps them to and from plain JSON so the rest of the crate never
//! sees the wire encoding.
//!
//! # Security Note - Logging
//!
//! The API key travels as a `key` query parameter. Request URLs are therefore
//! never logged, and transport errors are stripped of their URL before they are
//! turned into messages.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::error::{BackofficeError, Result};
use crate::remote::error::transport_failure;

use super::{Document, DocumentStore, Fields};

pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1/";

/// Documents requested per list call; larger collections are paged through.
const LIST_PAGE_SIZE: &str = "300";

#[derive(Clone)]
pub struct FirestoreClient {
    client: Client,
    base_url: Url,
    project_id: String,
    api_key: Option<SecretString>,
    timeout: Duration,
}

impl fmt::Debug for FirestoreClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirestoreClient")
            .field("base_url", &self.base_url.as_str())
            .field("project_id", &self.project_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl FirestoreClient {
    pub fn new(
        project_id: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self> {
        Self::with_base_url(FIRESTORE_BASE_URL, project_id, api_key, timeout)
    }

    /// Client against a non-default endpoint, such as the local emulator.
    pub fn with_base_url(
        base_url: &str,
        project_id: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self> {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            return Err(BackofficeError::Config(
                "firebase.project_id is not set".to_string(),
            ));
        }
        let base_url = Url::parse(base_url).map_err(|e| {
            BackofficeError::Config(format!("invalid Firestore URL '{base_url}': {e}"))
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackofficeError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            project_id,
            api_key,
            timeout,
        })
    }

    fn documents_url(&self, collection: &str, id: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                BackofficeError::Config(format!("invalid Firestore URL '{}'", self.base_url))
            })?;
            segments.pop_if_empty().extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                collection,
            ]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key.expose_secret());
        }
        Ok(url)
    }

    /// Send a request. `Ok(None)` means 404.
    async fn execute(&self, builder: RequestBuilder, op: &'static str) -> Result<Option<Value>> {
        let timeout_secs = self.timeout.as_secs();
        let response = builder.send().await.map_err(|e| {
            let e = e.without_url();
            warn!(op, "Firestore request failed: {e}");
            transport_failure(&e, timeout_secs)
        })?;

        let status = response.status();
        debug!(op, status = status.as_u16(), "Firestore response");
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|e| transport_failure(&e.without_url(), timeout_secs))?;
        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                BackofficeError::InvalidResponse(format!("Firestore returned invalid JSON: {e}"))
            })?
        };

        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            return Err(BackofficeError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }
        Ok(Some(body))
    }
}

#[async_trait::async_trait]
impl DocumentStore for FirestoreClient {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = self.documents_url(collection, None)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", LIST_PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }
            let Some(body) = self.execute(self.client.get(url), "list").await? else {
                break;
            };
            if let Some(raw) = body.get("documents").and_then(Value::as_array) {
                for doc in raw {
                    documents.push(decode_document(doc)?);
                }
            }
            page_token = body
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }
        debug!(collection, count = documents.len(), "listed documents");
        Ok(documents)
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let url = self.documents_url(collection, Some(id))?;
        match self.execute(self.client.get(url), "get").await? {
            Some(body) => decode_document(&body).map(Some),
            None => Ok(None),
        }
    }

    async fn add_document(&self, collection: &str, fields: Fields) -> Result<String> {
        let url = self.documents_url(collection, None)?;
        let body = json!({ "fields": encode_fields(&fields) });
        let created = self
            .execute(self.client.post(url).json(&body), "add")
            .await?
            .ok_or_else(|| {
                BackofficeError::InvalidResponse(format!("collection '{collection}' not found"))
            })?;
        Ok(decode_document(&created)?.id)
    }

    async fn update_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let mut url = self.documents_url(collection, Some(id))?;
        {
            let mut query = url.query_pairs_mut();
            for key in fields.keys() {
                query.append_pair("updateMask.fieldPaths", key);
            }
            query.append_pair("currentDocument.exists", "true");
        }
        let body = json!({ "fields": encode_fields(&fields) });
        self.execute(self.client.patch(url).json(&body), "update")
            .await?
            .ok_or_else(|| BackofficeError::not_found("document", id))?;
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        let url = self.documents_url(collection, Some(id))?;
        self.execute(self.client.delete(url), "delete").await?;
        Ok(())
    }
}

/// Decode a Firestore document resource into an id and plain JSON fields.
pub fn decode_document(raw: &Value) -> Result<Document> {
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| BackofficeError::InvalidResponse("document without a name".to_string()))?;
    let id = name.rsplit('/').next().unwrap_or(name).to_string();
    let fields = raw
        .get("fields")
        .and_then(Value::as_object)
        .map(decode_fields)
        .unwrap_or_default();
    Ok(Document { id, fields })
}

pub fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

pub fn decode_fields(fields: &Map<String, Value>) -> Fields {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), decode_value(value)))
        .collect()
}

/// Plain JSON to a Firestore typed value.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Firestore typed value to plain JSON.
///
/// Integers arrive as decimal strings and come back as numbers; timestamps,
/// references and bytes come back as strings. Unknown shapes decode to null.
pub fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(s.clone())),
            other => other.clone(),
        },
        "stringValue" | "doubleValue" | "booleanValue" | "timestampValue" | "referenceValue"
        | "bytesValue" | "geoPointValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}
