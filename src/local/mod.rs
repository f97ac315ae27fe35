//! Collections kept as a JSON array under one key of the key-value store.
//!
//! FAQs, CMS pages and products have no backend; the whole collection is read,
//! changed and written back on every operation. Paging and search happen in
//! memory, so list results always carry exact totals.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{BackofficeError, Result};
use crate::pagination::{ListQuery, ListResult, paginate_in_memory};
use crate::remote::{CollectionClient, WriteMode};
use crate::resources::{CmsPage, Faq, Product, StoredRecord};
use crate::session::KeyValueStore;
use crate::types::{CMS_KEY, FAQS_KEY, PRODUCTS_KEY};
use crate::utils::{generate_uuid, iso_timestamp};

/// A record kept in the local store.
pub trait LocalRecord: StoredRecord {
    /// Store key holding the JSON array.
    const STORAGE_KEY: &'static str;
}

impl LocalRecord for Faq {
    const STORAGE_KEY: &'static str = FAQS_KEY;
}

impl LocalRecord for CmsPage {
    const STORAGE_KEY: &'static str = CMS_KEY;
}

impl LocalRecord for Product {
    const STORAGE_KEY: &'static str = PRODUCTS_KEY;
}

pub struct LocalCollection<T> {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for LocalCollection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            write_lock: Arc::clone(&self.write_lock),
            _marker: PhantomData,
        }
    }
}

impl<T: LocalRecord> fmt::Debug for LocalCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCollection")
            .field("key", &T::STORAGE_KEY)
            .finish_non_exhaustive()
    }
}

impl<T: LocalRecord> LocalCollection<T> {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
            _marker: PhantomData,
        }
    }

    /// Every stored record, in insertion order. A missing key is an empty
    /// collection.
    pub fn load_all(&self) -> Result<Vec<T>> {
        let Some(raw) = self.store.get(T::STORAGE_KEY)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            BackofficeError::Storage(format!(
                "stored {} list under '{}' is unreadable: {e}",
                T::KIND,
                T::STORAGE_KEY
            ))
        })
    }

    fn save_all(&self, records: &[T]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.store.set(T::STORAGE_KEY, &raw)
    }

    /// Read, change and write back the collection under the write lock.
    fn modify<R>(&self, change: impl FnOnce(&mut Vec<T>) -> Result<R>) -> Result<R> {
        let _guard = self.write_lock.lock();
        let mut records = self.load_all()?;
        let result = change(&mut records)?;
        self.save_all(&records)?;
        Ok(result)
    }
}

impl<T: LocalRecord> CollectionClient<T> for LocalCollection<T> {
    async fn list(&self, query: &ListQuery) -> Result<ListResult<T>> {
        let records = self.load_all()?;
        Ok(paginate_in_memory(records, query, |r| r.label()))
    }

    async fn get(&self, id: &str) -> Result<T> {
        self.load_all()?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| BackofficeError::not_found(T::KIND, id))
    }

    async fn create(&self, draft: &T::Draft) -> Result<T> {
        T::check_draft(draft, WriteMode::Create)?;
        let record = T::from_draft(generate_uuid(), draft, &iso_timestamp());
        self.modify(|records| {
            records.push(record.clone());
            Ok(())
        })?;
        debug!(kind = T::KIND, id = record.id(), "stored new record");
        Ok(record)
    }

    async fn update(&self, id: &str, draft: &T::Draft) -> Result<T> {
        T::check_draft(draft, WriteMode::Update)?;
        let now = iso_timestamp();
        self.modify(|records| {
            let record = records
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(|| BackofficeError::not_found(T::KIND, id))?;
            record.apply_draft(draft, &now);
            Ok(record.clone())
        })
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.modify(|records| {
            let before = records.len();
            records.retain(|r| r.id() != id);
            if records.len() == before {
                return Err(BackofficeError::not_found(T::KIND, id));
            }
            Ok(())
        })?;
        debug!(kind = T::KIND, id, "removed record");
        Ok(())
    }
}
