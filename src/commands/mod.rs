//! Command handlers behind the CLI.
//!
//! Every handler takes an [`AppContext`], which owns the loaded config and the
//! credential store, and builds the collection backends on demand.

mod auth;
mod browse;
mod config;
mod forms;
mod resource;
mod roles;

pub use auth::{cmd_login, cmd_logout, cmd_profile_update, cmd_whoami};
pub use browse::{BrowseCommand, parse_browse_command};
pub use config::{cmd_config_set, cmd_config_show};
pub use forms::FormFields;
pub use roles::cmd_role_edit;

use std::sync::Arc;

use owo_colors::OwoColorize;
use serde_json::Value;

use crate::cli::OutputOptions;
use crate::config::Config;
use crate::controller::ControllerOptions;
use crate::documents::{DocumentCollection, DocumentStore, FirestoreClient, MemoryDocumentStore};
use crate::error::{BackofficeError, Result};
use crate::local::{LocalCollection, LocalRecord};
use crate::pagination::ListQuery;
use crate::remote::{ApiClient, AuthApi, RemoteCollection, Resource};
use crate::resources::StoredRecord;
use crate::session::{
    CredentialStore, FileStore, KeyValueStore, MemoryStore, SessionEvent, UserData,
};
use crate::types::PageSize;

/// JSON result of a command, with an optional human-readable rendering.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print as JSON when requested, otherwise the text (falling back to JSON).
    pub fn print(self, output: OutputOptions) -> Result<()> {
        match self.text {
            Some(text) if !output.json => {
                println!("{text}");
                Ok(())
            }
            _ => print_json(&self.json),
        }
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Everything a command needs: configuration plus the shared session.
pub struct AppContext {
    pub config: Config,
    credentials: CredentialStore,
    ephemeral: bool,
    documents: Option<Arc<dyn DocumentStore>>,
}

impl AppContext {
    /// Load the config file and open the session store it names.
    pub fn load(ephemeral: bool) -> Result<Self> {
        let config = Config::load()?;
        let store: Arc<dyn KeyValueStore> = if ephemeral {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(FileStore::open(config.storage_path()?)?)
        };
        Ok(Self::new(config, store, ephemeral))
    }

    pub fn new(config: Config, store: Arc<dyn KeyValueStore>, ephemeral: bool) -> Self {
        let credentials = CredentialStore::new(store);
        credentials.subscribe(|event| {
            if event == SessionEvent::Expired {
                eprintln!(
                    "{}",
                    "Your session has expired. Run `backoffice login` to sign in again.".yellow()
                );
            }
        });
        let documents = ephemeral.then(|| Arc::new(MemoryDocumentStore::new()) as Arc<dyn DocumentStore>);
        Self {
            config,
            credentials,
            ephemeral,
            documents,
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Fail with `Unauthorized` unless a session is stored.
    pub fn require_session(&self) -> Result<Option<UserData>> {
        self.credentials.require_session().map(|(_, user)| user)
    }

    pub fn api(&self) -> Result<ApiClient> {
        ApiClient::new(
            &self.config.api_base_url(),
            self.credentials.clone(),
            self.config.request_timeout(),
        )
    }

    pub fn auth(&self) -> Result<AuthApi> {
        Ok(AuthApi::new(self.api()?))
    }

    pub fn remote<T: Resource>(&self) -> Result<RemoteCollection<T>> {
        Ok(RemoteCollection::new(self.api()?))
    }

    pub fn local<T: LocalRecord>(&self) -> LocalCollection<T> {
        LocalCollection::new(self.credentials.backing_store())
    }

    /// Document collection on Firestore, or in memory for ephemeral runs.
    pub fn documents<T: StoredRecord>(&self) -> Result<DocumentCollection<T>> {
        if let Some(store) = &self.documents {
            return Ok(DocumentCollection::new(Arc::clone(store)));
        }
        let project_id = self.config.firebase_project_id().ok_or_else(|| {
            BackofficeError::Config(
                "firebase.project_id is not set. Run `backoffice config set firebase.project_id <id>`"
                    .to_string(),
            )
        })?;
        let client = FirestoreClient::new(
            project_id,
            self.config.firebase_api_key(),
            self.config.request_timeout(),
        )?;
        Ok(DocumentCollection::new(Arc::new(client)))
    }

    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// List query with the configured page size unless one was given.
    pub fn list_query(&self, search: &str, page: u32, limit: Option<PageSize>) -> ListQuery {
        ListQuery::new(search, page, limit.unwrap_or(self.config.page_size))
    }

    pub fn controller_options(&self, query: ListQuery) -> ControllerOptions {
        ControllerOptions {
            query,
            banner_timeout: self.config.banner_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_uses_configured_page_size() {
        let mut config = Config::default();
        config.page_size = PageSize::Thirty;
        let ctx = AppContext::new(config, Arc::new(MemoryStore::new()), true);

        assert_eq!(ctx.list_query("", 1, None).limit, PageSize::Thirty);
        assert_eq!(
            ctx.list_query("x", 2, Some(PageSize::Ten)),
            ListQuery::new("x", 2, PageSize::Ten)
        );
    }

    #[test]
    fn test_documents_need_a_project_unless_ephemeral() {
        let ctx = AppContext::new(Config::default(), Arc::new(MemoryStore::new()), false);
        let err = ctx
            .documents::<crate::resources::Category>()
            .unwrap_err();
        assert!(err.to_string().contains("firebase.project_id"));

        let ctx = AppContext::new(Config::default(), Arc::new(MemoryStore::new()), true);
        assert!(ctx.documents::<crate::resources::Category>().is_ok());
    }

    #[test]
    fn test_require_session() {
        let ctx = AppContext::new(Config::default(), Arc::new(MemoryStore::new()), true);
        assert!(matches!(
            ctx.require_session(),
            Err(BackofficeError::Unauthorized)
        ));
    }
}
