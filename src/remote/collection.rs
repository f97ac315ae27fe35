//! REST implementation of [`CollectionClient`].

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;
use tracing::debug;

use crate::error::{BackofficeError, Result};
use crate::pagination::{ListQuery, ListResult};

use super::envelope::{parse_list, parse_record};
use super::http::{ApiClient, ApiRequest};
use super::{CollectionClient, Endpoints, Resource, WriteMode};

/// CRUD for one resource type against the admin backend.
pub struct RemoteCollection<T> {
    api: ApiClient,
    endpoints: Endpoints,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for RemoteCollection<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            endpoints: self.endpoints.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for RemoteCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCollection")
            .field("api", &self.api)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl<T: Resource> RemoteCollection<T> {
    /// Collection at the conventional endpoints for `T::COLLECTION`.
    pub fn new(api: ApiClient) -> Self {
        Self::with_endpoints(api, Endpoints::conventional(T::COLLECTION))
    }

    pub fn with_endpoints(api: ApiClient, endpoints: Endpoints) -> Self {
        Self {
            api,
            endpoints,
            _marker: PhantomData,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn decode(value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| {
            BackofficeError::InvalidResponse(format!("malformed {} record: {e}", T::KIND))
        })
    }

    fn record_from(body: Value, id: Option<&str>) -> Result<T> {
        match parse_record(body) {
            Some(record) => Self::decode(record),
            None => match id {
                Some(id) => Err(BackofficeError::not_found(T::KIND, id)),
                None => Err(BackofficeError::InvalidResponse(format!(
                    "create response carried no {} record",
                    T::KIND
                ))),
            },
        }
    }
}

impl<T: Resource> CollectionClient<T> for RemoteCollection<T> {
    async fn list(&self, query: &ListQuery) -> Result<ListResult<T>> {
        let body = serde_json::to_value(query)?;
        let response = self
            .api
            .send(ApiRequest::post(&self.endpoints.list, &body))
            .await?;

        let envelope = parse_list(response.body, T::COLLECTION);
        if envelope.pagination.is_none() {
            debug!(collection = T::COLLECTION, "no pagination metadata in list response");
        }
        let items = envelope
            .items
            .into_iter()
            .map(Self::decode)
            .collect::<Result<Vec<T>>>()?;

        Ok(ListResult::new(items, envelope.pagination))
    }

    async fn get(&self, id: &str) -> Result<T> {
        let path = self.endpoints.get_path(id);
        let response = match self.api.send(ApiRequest::get(&path)).await {
            Err(BackofficeError::RequestFailed { status: 404, .. }) => {
                return Err(BackofficeError::not_found(T::KIND, id));
            }
            other => other?,
        };
        Self::record_from(response.body, Some(id))
    }

    async fn create(&self, draft: &T::Draft) -> Result<T> {
        T::check_draft(draft, WriteMode::Create)?;
        let body = serde_json::to_value(draft)?;
        let response = self
            .api
            .send(ApiRequest::post(&self.endpoints.add, &body))
            .await?;
        debug!(kind = T::KIND, "record created");
        Self::record_from(response.body, None)
    }

    async fn update(&self, id: &str, draft: &T::Draft) -> Result<T> {
        T::check_draft(draft, WriteMode::Update)?;
        let path = self.endpoints.update_path(id);
        let body = serde_json::to_value(draft)?;
        let response = self.api.send(ApiRequest::put(&path, &body)).await?;
        debug!(kind = T::KIND, id, "record updated");
        Self::record_from(response.body, Some(id))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let path = self.endpoints.delete_path(id);
        self.api.send(ApiRequest::delete(&path)).await?;
        debug!(kind = T::KIND, id, "record deleted");
        Ok(())
    }
}
