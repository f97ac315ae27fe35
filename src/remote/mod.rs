//! Remote collection access.
//!
//! A [`Resource`] names one record type; a [`CollectionClient`] performs CRUD
//! on a collection of them. [`RemoteCollection`] is the REST implementation.
//! The list controller is generic over the trait, so local and document-store
//! collections plug into the same screens.

pub mod auth;
pub mod collection;
pub mod envelope;
pub mod error;
pub mod http;

use serde::Serialize;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::Result;
use crate::pagination::{ListQuery, ListResult};
use crate::utils::validation::validate_form;

pub use auth::AuthApi;
pub use collection::RemoteCollection;
pub use http::{ApiClient, ApiRequest, ApiResponse};

/// Whether a draft is about to create a record or replace one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

/// A record type managed through one collection.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Request body for create and update.
    type Draft: Serialize + Validate + Send + Sync;

    /// Singular display name used in messages ("Role", "FAQ").
    const KIND: &'static str;
    /// Collection name, also the envelope key that may hold the records.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    /// Display field used for search filtering and confirmation prompts.
    fn label(&self) -> &str;

    /// Client-side form rules, run by every collection before a write.
    fn check_draft(draft: &Self::Draft, _mode: WriteMode) -> Result<()> {
        validate_form(draft, |_| {})
    }
}

/// Common interface for collection backends.
pub trait CollectionClient<T: Resource>: Send + Sync + 'static {
    /// Fetch one page of records matching the query.
    fn list(&self, query: &ListQuery)
    -> impl std::future::Future<Output = Result<ListResult<T>>> + Send;

    /// Fetch a single record.
    fn get(&self, id: &str) -> impl std::future::Future<Output = Result<T>> + Send;

    fn create(&self, draft: &T::Draft) -> impl std::future::Future<Output = Result<T>> + Send;

    fn update(
        &self,
        id: &str,
        draft: &T::Draft,
    ) -> impl std::future::Future<Output = Result<T>> + Send;

    fn delete(&self, id: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Paths of the five collection operations, relative to the API base URL.
///
/// Record ids are appended as a final path segment to `get`, `update` and
/// `delete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub list: String,
    pub add: String,
    pub get: String,
    pub update: String,
    pub delete: String,
}

impl Endpoints {
    /// The backend's usual layout: `POST /<c>`, `POST /<c>/add`,
    /// `GET /<c>/:id`, `PUT /<c>/update/:id`, `DELETE /<c>/delete/:id`.
    pub fn conventional(collection: &str) -> Self {
        Self {
            list: collection.to_string(),
            add: format!("{collection}/add"),
            get: collection.to_string(),
            update: format!("{collection}/update"),
            delete: format!("{collection}/delete"),
        }
    }

    pub fn get_path(&self, id: &str) -> String {
        join_id(&self.get, id)
    }

    pub fn update_path(&self, id: &str) -> String {
        join_id(&self.update, id)
    }

    pub fn delete_path(&self, id: &str) -> String {
        join_id(&self.delete, id)
    }
}

fn join_id(prefix: &str, id: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), id)
}
