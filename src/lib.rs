pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod documents;
pub mod error;
pub mod local;
pub mod pagination;
pub mod remote;
pub mod resources;
pub mod session;
pub mod types;
pub mod utils;

pub use config::Config;
pub use controller::{ControllerOptions, DeleteOutcome, ListController};
pub use error::{BackofficeError, FieldErrors, Result};
pub use pagination::{ListQuery, ListResult, PaginationMeta, reconcile};
pub use remote::{ApiClient, AuthApi, CollectionClient, RemoteCollection, Resource};
pub use session::{CredentialStore, FileStore, KeyValueStore, MemoryStore};
pub use types::PageSize;
