//! Credential store shared by every backend call.
//!
//! Reads happen on every request; writes happen on sign-in, profile update,
//! logout and invalidation. Invalidation clears the session and notifies
//! subscribers at most once per session, however many late 401s arrive.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::error::{BackofficeError, Result};
use crate::types::{AUTH_TOKEN_KEY, USER_DATA_KEY};

use super::UserData;
use super::store::KeyValueStore;

/// Session lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    /// The backend rejected the token; the UI should return to the login screen.
    Expired,
    LoggedOut,
}

type Listener = Arc<dyn Fn(SessionEvent) + Send + Sync>;

/// Handle returned by [`CredentialStore::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn KeyValueStore>,
    // Serializes check-then-clear so concurrent invalidations notify once.
    write_lock: Mutex<()>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("token", &"[REDACTED]")
            .field("listeners", &self.inner.listeners.lock().len())
            .finish()
    }
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                write_lock: Mutex::new(()),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Underlying key-value store, shared with the local collections.
    pub fn backing_store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.inner.store)
    }

    pub fn token(&self) -> Result<Option<SecretString>> {
        Ok(self
            .inner
            .store
            .get(AUTH_TOKEN_KEY)?
            .filter(|t| !t.is_empty())
            .map(SecretString::from))
    }

    /// Stored user record; a corrupt entry reads as absent.
    pub fn user_data(&self) -> Result<Option<UserData>> {
        let Some(raw) = self.inner.store.get(USER_DATA_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("ignoring unreadable userData entry: {e}");
                Ok(None)
            }
        }
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.token()?.is_some())
    }

    /// Route guard: the current session, or `Unauthorized` when signed out.
    pub fn require_session(&self) -> Result<(SecretString, Option<UserData>)> {
        let token = self.token()?.ok_or(BackofficeError::Unauthorized)?;
        Ok((token, self.user_data()?))
    }

    pub fn set_session(&self, token: &SecretString, user: &UserData) -> Result<()> {
        {
            let _guard = self.inner.write_lock.lock();
            self.inner
                .store
                .set(AUTH_TOKEN_KEY, token.expose_secret())?;
            self.inner
                .store
                .set(USER_DATA_KEY, &serde_json::to_string(user)?)?;
        }
        info!(email = %user.email, "session started");
        self.notify(SessionEvent::SignedIn);
        Ok(())
    }

    /// Apply `update` to the stored user record, if there is one.
    pub fn update_user_data(&self, update: impl FnOnce(&mut UserData)) -> Result<Option<UserData>> {
        let _guard = self.inner.write_lock.lock();
        let Some(mut user) = self.user_data()? else {
            return Ok(None);
        };
        update(&mut user);
        self.inner
            .store
            .set(USER_DATA_KEY, &serde_json::to_string(&user)?)?;
        Ok(Some(user))
    }

    /// User-initiated sign-out. Subscribers see `LoggedOut`, never `Expired`.
    pub fn logout(&self) -> Result<()> {
        let had_session = self.clear_if_present()?;
        if had_session {
            info!("logged out");
            self.notify(SessionEvent::LoggedOut);
        }
        Ok(())
    }

    /// Drop the session after the backend rejected it.
    ///
    /// Returns whether this call ended a session. Only that call notifies.
    pub fn invalidate(&self) -> Result<bool> {
        let had_session = self.clear_if_present()?;
        if had_session {
            warn!("session rejected by backend, credentials cleared");
            self.notify(SessionEvent::Expired);
        } else {
            debug!("session already cleared, skipping invalidation");
        }
        Ok(had_session)
    }

    fn clear_if_present(&self) -> Result<bool> {
        let _guard = self.inner.write_lock.lock();
        let store = &self.inner.store;
        let had_session =
            store.get(AUTH_TOKEN_KEY)?.is_some() || store.get(USER_DATA_KEY)?.is_some();
        if had_session {
            store.remove(AUTH_TOKEN_KEY)?;
            store.remove(USER_DATA_KEY)?;
        }
        Ok(had_session)
    }

    pub fn subscribe(&self, listener: impl Fn(SessionEvent) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        Subscription(id)
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.inner
            .listeners
            .lock()
            .retain(|(id, _)| *id != subscription.0);
    }

    fn notify(&self, event: SessionEvent) {
        // Snapshot so listeners may subscribe or unsubscribe re-entrantly.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}
