//! In-process document store.

use dashmap::DashMap;

use crate::error::{BackofficeError, Result};
use crate::utils::generate_uuid;

use super::{Document, DocumentStore, Fields};

/// Documents of one collection in insertion order.
#[derive(Debug, Default)]
struct OrderedDocs {
    entries: Vec<(String, Fields)>,
}

impl OrderedDocs {
    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|(doc_id, _)| doc_id == id)
    }
}

/// Document store held in memory; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: DashMap<String, OrderedDocs>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| {
                docs.entries
                    .iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        Ok(self.collections.get(collection).and_then(|docs| {
            docs.position(id).map(|i| Document {
                id: id.to_string(),
                fields: docs.entries[i].1.clone(),
            })
        }))
    }

    async fn add_document(&self, collection: &str, fields: Fields) -> Result<String> {
        let id = generate_uuid().replace('-', "");
        self.collections
            .entry(collection.to_string())
            .or_default()
            .entries
            .push((id.clone(), fields));
        Ok(id)
    }

    async fn update_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let mut docs = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| BackofficeError::not_found("document", id))?;
        let index = docs
            .position(id)
            .ok_or_else(|| BackofficeError::not_found("document", id))?;
        let existing = &mut docs.entries[index].1;
        for (key, value) in fields {
            existing.insert(key, value);
        }
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        if let Some(mut docs) = self.collections.get_mut(collection)
            && let Some(index) = docs.position(id)
        {
            docs.entries.remove(index);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryDocumentStore::new();
        let id = store
            .add_document("category", fields(json!({"a": 1, "b": 2})))
            .await
            .unwrap();
        store
            .update_document("category", &id, fields(json!({"b": 3, "c": 4})))
            .await
            .unwrap();
        let doc = store.get_document("category", &id).await.unwrap().unwrap();
        assert_eq!(doc.fields, fields(json!({"a": 1, "b": 3, "c": 4})));
    }

    #[tokio::test]
    async fn test_missing_documents() {
        let store = MemoryDocumentStore::new();
        assert!(store.get_document("category", "x").await.unwrap().is_none());
        assert!(store.delete_document("category", "x").await.is_ok());
        assert!(matches!(
            store
                .update_document("category", "x", Fields::new())
                .await,
            Err(BackofficeError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = MemoryDocumentStore::new();
        let first = store.add_document("c", Fields::new()).await.unwrap();
        let second = store.add_document("c", Fields::new()).await.unwrap();
        let ids: Vec<String> = store
            .list_documents("c")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
    }
}
