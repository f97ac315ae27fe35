use std::sync::Arc;

use backoffice::local::LocalCollection;
use backoffice::resources::{Product, ProductDraft};
use backoffice::session::UserData;
use backoffice::{
    BackofficeError, CollectionClient, CredentialStore, FileStore, KeyValueStore, ListQuery,
};
use secrecy::{ExposeSecret, SecretString};
use tempfile::TempDir;

fn open(temp: &TempDir) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::open(temp.path().join("storage.json")).unwrap())
}

#[test]
fn test_session_survives_reopen() {
    let temp = TempDir::new().unwrap();
    {
        let credentials = CredentialStore::new(open(&temp));
        let mut user = UserData::new("ada@example.com", "Ada Lovelace");
        user.id = Some("7".to_string());
        credentials
            .set_session(&SecretString::from("persisted".to_string()), &user)
            .unwrap();
    }

    let credentials = CredentialStore::new(open(&temp));
    assert!(credentials.is_authenticated().unwrap());
    assert_eq!(
        credentials.token().unwrap().unwrap().expose_secret(),
        "persisted"
    );
    assert_eq!(
        credentials.user_data().unwrap().unwrap().id.as_deref(),
        Some("7")
    );

    credentials.logout().unwrap();
    let credentials = CredentialStore::new(open(&temp));
    assert!(!credentials.is_authenticated().unwrap());
}

#[test]
fn test_unreadable_user_record_counts_as_signed_out_user() {
    let temp = TempDir::new().unwrap();
    let store = open(&temp);
    store.set("authToken", "tok").unwrap();
    store.set("userData", "{not json").unwrap();

    let credentials = CredentialStore::new(store);
    assert!(credentials.user_data().unwrap().is_none());
}

#[tokio::test]
async fn test_products_persist_between_runs() {
    let temp = TempDir::new().unwrap();
    let created = {
        let products: LocalCollection<Product> = LocalCollection::new(open(&temp));
        products
            .create(
                &ProductDraft::new("Desk lamp", "Warm light for late work", "lighting", 24.5)
                    .with_rating(Some(4.0)),
            )
            .await
            .unwrap()
    };

    let products: LocalCollection<Product> = LocalCollection::new(open(&temp));
    let page = products.list(&ListQuery::default()).await.unwrap();
    assert_eq!(page.items, vec![created.clone()]);

    let raw = std::fs::read_to_string(temp.path().join("storage.json")).unwrap();
    assert!(raw.contains("admin_products"));
    assert!(raw.contains("Desk lamp"));
}

#[tokio::test]
async fn test_corrupt_collection_is_a_storage_error() {
    let temp = TempDir::new().unwrap();
    let store = open(&temp);
    store.set("admin_products", "{\"oops\": true}").unwrap();

    let products: LocalCollection<Product> = LocalCollection::new(store);
    let err = products.list(&ListQuery::default()).await.unwrap_err();
    assert!(matches!(err, BackofficeError::Storage(_)));
    assert!(err.to_string().contains("admin_products"));
}
