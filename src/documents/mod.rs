//! Document-store collections (categories).
//!
//! A [`DocumentStore`] is a schemaless store of JSON objects grouped into
//! named collections, each document addressed by a store-assigned id. The
//! Firestore REST client talks to a Firebase project; the in-memory store
//! backs tests and offline use. [`DocumentCollection`] adapts either one to
//! the typed [`CollectionClient`] interface.

pub mod firestore;
pub mod memory;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{BackofficeError, Result};
use crate::pagination::{ListQuery, ListResult, paginate_in_memory};
use crate::remote::{CollectionClient, Resource, WriteMode};
use crate::resources::StoredRecord;
use crate::utils::iso_timestamp;

pub use firestore::FirestoreClient;
pub use memory::MemoryDocumentStore;

/// JSON object fields of one document.
pub type Fields = Map<String, Value>;

/// A stored document: its id plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Storage backend for document collections.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in the collection, in store order.
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>>;

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Insert a document and return the id the store assigned.
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<String>;

    /// Overwrite the given fields of an existing document, leaving the others.
    ///
    /// Fails with `NotFound` when the document does not exist.
    async fn update_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

    /// Remove a document. Removing a missing document succeeds.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<()>;
}

/// Typed collection over a [`DocumentStore`], keyed by `T::COLLECTION`.
pub struct DocumentCollection<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for DocumentCollection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<T: Resource> fmt::Debug for DocumentCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentCollection")
            .field("collection", &T::COLLECTION)
            .finish_non_exhaustive()
    }
}

impl<T: StoredRecord> DocumentCollection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    fn decode(document: Document) -> Result<T> {
        let mut fields = document.fields;
        fields.insert("id".to_string(), Value::String(document.id));
        serde_json::from_value(Value::Object(fields)).map_err(|e| {
            BackofficeError::InvalidResponse(format!("malformed {} document: {e}", T::KIND))
        })
    }

    /// The record's fields as stored: everything except the id.
    fn encode(record: &T) -> Result<Fields> {
        match serde_json::to_value(record)? {
            Value::Object(mut fields) => {
                fields.remove("id");
                Ok(fields)
            }
            other => Err(BackofficeError::Other(format!(
                "{} did not serialize to an object: {other}",
                T::KIND
            ))),
        }
    }
}

impl<T: StoredRecord> CollectionClient<T> for DocumentCollection<T> {
    async fn list(&self, query: &ListQuery) -> Result<ListResult<T>> {
        let documents = self.store.list_documents(T::COLLECTION).await?;
        let records = documents
            .into_iter()
            .map(Self::decode)
            .collect::<Result<Vec<T>>>()?;
        Ok(paginate_in_memory(records, query, |r| r.label()))
    }

    async fn get(&self, id: &str) -> Result<T> {
        match self.store.get_document(T::COLLECTION, id).await? {
            Some(document) => Self::decode(document),
            None => Err(BackofficeError::not_found(T::KIND, id)),
        }
    }

    async fn create(&self, draft: &T::Draft) -> Result<T> {
        T::check_draft(draft, WriteMode::Create)?;
        let record = T::from_draft(String::new(), draft, &iso_timestamp());
        let fields = Self::encode(&record)?;
        let id = self
            .store
            .add_document(T::COLLECTION, fields.clone())
            .await?;
        debug!(collection = T::COLLECTION, %id, "document added");
        Self::decode(Document { id, fields })
    }

    async fn update(&self, id: &str, draft: &T::Draft) -> Result<T> {
        T::check_draft(draft, WriteMode::Update)?;
        let mut record = self.get(id).await?;
        record.apply_draft(draft, &iso_timestamp());
        self.store
            .update_document(T::COLLECTION, id, Self::encode(&record)?)
            .await?;
        debug!(collection = T::COLLECTION, id, "document updated");
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete_document(T::COLLECTION, id).await?;
        debug!(collection = T::COLLECTION, id, "document deleted");
        Ok(())
    }
}
