//! Resource list controller.
//!
//! One generic controller drives every list screen: it owns the query, the
//! fetched page, the reconciled paging record, the delete confirmation and the
//! banner. Query changes issue a fetch as a spawned task; only the response to
//! the most recently issued query is applied. Fetch and banner tasks hold weak
//! references, so dropping the last controller handle (or calling
//! [`ListController::destroy`]) discards late responses and stops timers.

pub mod banner;
pub mod confirm;
pub mod state;

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::pagination::{ListQuery, ListResult};
use crate::remote::{CollectionClient, Resource};
use crate::types::PageSize;

pub use banner::{Banner, BannerLevel, DEFAULT_BANNER_TIMEOUT};
pub use confirm::{ConfirmDialogState, ConfirmGate, GateInput, GateOutcome};
pub use state::{DeleteTarget, ListPhase, ListView};

use state::ListState;

/// Construction options for a [`ListController`].
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub query: ListQuery,
    pub banner_timeout: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            query: ListQuery::default(),
            banner_timeout: DEFAULT_BANNER_TIMEOUT,
        }
    }
}

/// Result of driving the delete confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(DeleteTarget),
    Failed { target: DeleteTarget, message: String },
    Cancelled(DeleteTarget),
    /// Nothing was pending, or the gate was busy.
    Ignored,
}

pub struct ListController<T, C> {
    inner: Arc<Inner<T, C>>,
}

struct Inner<T, C> {
    client: Arc<C>,
    state: Mutex<ListState<T>>,
    banner_timeout: Duration,
}

impl<T, C> Drop for Inner<T, C> {
    fn drop(&mut self) {
        self.state.get_mut().stop_banner_timer();
    }
}

impl<T, C> Clone for ListController<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, C> fmt::Debug for ListController<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ListController")
            .field("query", &state.query)
            .field("phase", &state.phase)
            .field("items", &state.items.len())
            .finish()
    }
}

impl<T, C> ListController<T, C>
where
    T: Resource,
    C: CollectionClient<T>,
{
    pub fn new(client: C, options: ControllerOptions) -> Self {
        Self::with_shared_client(Arc::new(client), options)
    }

    pub fn with_shared_client(client: Arc<C>, options: ControllerOptions) -> Self {
        let query = ListQuery::new(options.query.search, options.query.page, options.query.limit);
        Self {
            inner: Arc::new(Inner {
                client,
                state: Mutex::new(ListState::new(query)),
                banner_timeout: options.banner_timeout,
            }),
        }
    }

    pub fn client(&self) -> &C {
        &self.inner.client
    }

    /// Snapshot of the current state.
    pub fn view(&self) -> ListView<T> {
        ListView::from_state(&self.inner.state.lock())
    }

    pub fn query(&self) -> ListQuery {
        self.inner.state.lock().query.clone()
    }

    /// Fetched items narrowed by the search term on their display field.
    pub fn visible_items(&self) -> Vec<T> {
        let view = self.view();
        let items: Vec<T> = view.visible(|item| item.label()).cloned().collect();
        items
    }

    /// Initial load.
    pub fn mount(&self) -> Option<JoinHandle<()>> {
        self.fetch()
    }

    /// Re-issue the current query.
    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        self.fetch()
    }

    /// Change the search term; resets to page 1.
    pub fn set_search(&self, search: impl Into<String>) -> Option<JoinHandle<()>> {
        let search = search.into();
        self.update_query(|q| q.clone().with_search(search))
    }

    /// Jump to a page; values below 1 become 1.
    pub fn set_page(&self, page: u32) -> Option<JoinHandle<()>> {
        self.update_query(|q| q.clone().with_page(page))
    }

    /// Change the page size; resets to page 1.
    pub fn set_page_size(&self, limit: PageSize) -> Option<JoinHandle<()>> {
        self.update_query(|q| q.clone().with_limit(limit))
    }

    /// Next page, if the reconciled metadata says there is one.
    pub fn next_page(&self) -> Option<JoinHandle<()>> {
        let target = {
            let state = self.inner.state.lock();
            let meta = state.meta?;
            meta.has_next().then_some(meta.current_page + 1)?
        };
        self.set_page(target)
    }

    pub fn prev_page(&self) -> Option<JoinHandle<()>> {
        let target = {
            let state = self.inner.state.lock();
            let meta = state.meta?;
            meta.has_prev().then_some(meta.current_page - 1)?
        };
        self.set_page(target)
    }

    fn update_query(&self, change: impl FnOnce(&ListQuery) -> ListQuery) -> Option<JoinHandle<()>> {
        {
            let mut state = self.inner.state.lock();
            if state.destroyed {
                return None;
            }
            let next = change(&state.query);
            if next == state.query && state.phase != ListPhase::Idle {
                return None;
            }
            state.query = next;
        }
        self.fetch()
    }

    fn fetch(&self) -> Option<JoinHandle<()>> {
        let (seq, query) = {
            let mut state = self.inner.state.lock();
            if state.destroyed {
                return None;
            }
            state.fetch_seq += 1;
            state.deleted_since_fetch.clear();
            state.phase = ListPhase::Loading;
            (state.fetch_seq, state.query.clone())
        };
        debug!(kind = T::KIND, seq, page = query.page, search = %query.search, "fetching list");

        let client = Arc::clone(&self.inner.client);
        let weak = Arc::downgrade(&self.inner);
        Some(tokio::spawn(async move {
            let result = client.list(&query).await;
            apply_list(&weak, seq, &query, result);
        }))
    }

    /// Ask to delete a row. Opens the confirmation; nothing is sent yet.
    pub fn request_delete(&self, id: impl Into<String>, label: impl Into<String>) -> bool {
        let target = DeleteTarget {
            id: id.into(),
            label: label.into(),
        };
        let mut state = self.inner.state.lock();
        if state.destroyed {
            return false;
        }
        let message = format!(
            "Are you sure you want to delete \"{}\"? This action cannot be undone.",
            target.label
        );
        let opened = state
            .gate
            .open(format!("Delete {}", T::KIND), message, target);
        if opened {
            state.gate.set_labels("Delete", "Cancel");
        }
        opened
    }

    /// Drop the pending delete without contacting the server.
    pub fn cancel_delete(&self) -> DeleteOutcome {
        match self.inner.state.lock().gate.handle(GateInput::Cancel) {
            GateOutcome::Cancelled(target) => DeleteOutcome::Cancelled(target),
            _ => DeleteOutcome::Ignored,
        }
    }

    /// Route a gate input: confirm runs the delete, cancel and backdrop drop it.
    pub async fn handle_gate(&self, input: GateInput) -> DeleteOutcome {
        match input {
            GateInput::Confirm => self.confirm_delete().await,
            GateInput::Cancel | GateInput::Backdrop => self.cancel_delete(),
            GateInput::Body => DeleteOutcome::Ignored,
        }
    }

    /// Run the pending delete.
    ///
    /// On success the row is removed locally and `total_items` drops by one,
    /// and a list response already in flight will not bring it back. On
    /// failure the list is left as it was. Either way a banner reports the
    /// result.
    pub async fn confirm_delete(&self) -> DeleteOutcome {
        let target = {
            let mut state = self.inner.state.lock();
            if state.destroyed {
                return DeleteOutcome::Ignored;
            }
            match state.gate.handle(GateInput::Confirm) {
                GateOutcome::Confirmed(target) => {
                    state.gate.set_loading(true);
                    target
                }
                _ => return DeleteOutcome::Ignored,
            }
        };

        info!(kind = T::KIND, id = %target.id, "deleting record");
        let result = self.inner.client.delete(&target.id).await;

        let outcome = {
            let mut state = self.inner.state.lock();
            state.gate.close();
            match result {
                Ok(()) => {
                    state.items.retain(|item| item.id() != target.id);
                    if let Some(meta) = state.meta.as_mut() {
                        meta.total_items = meta.total_items.saturating_sub(1);
                    }
                    state.deleted_since_fetch.push(target.id.clone());
                    DeleteOutcome::Deleted(target)
                }
                Err(e) => {
                    warn!(kind = T::KIND, id = %target.id, "delete failed: {e}");
                    DeleteOutcome::Failed {
                        target,
                        message: e.user_message(),
                    }
                }
            }
        };

        match &outcome {
            DeleteOutcome::Deleted(_) => {
                self.show_banner(Banner::success(format!("{} deleted successfully", T::KIND)))
            }
            DeleteOutcome::Failed { message, .. } => self.show_banner(Banner::error(message)),
            _ => {}
        }
        outcome
    }

    /// Raise a banner that clears itself after the configured timeout.
    ///
    /// A newer banner replaces the current one and cancels its timer.
    pub fn show_banner(&self, banner: Banner) {
        let mut state = self.inner.state.lock();
        if state.destroyed {
            return;
        }
        state.banner_seq += 1;
        state.banner = Some(banner);
        let id = state.banner_seq;

        let weak = Arc::downgrade(&self.inner);
        let timeout = self.inner.banner_timeout;
        state.stop_banner_timer();
        state.banner_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.state.lock();
                if state.banner_seq == id {
                    state.banner = None;
                    state.banner_timer = None;
                }
            }
        }));
    }

    /// Clear the banner before its timer fires.
    pub fn dismiss_banner(&self) {
        let mut state = self.inner.state.lock();
        state.banner = None;
        state.stop_banner_timer();
    }

    /// Tear down: stop timers and ignore any response still in flight.
    pub fn destroy(&self) {
        {
            let mut state = self.inner.state.lock();
            state.destroyed = true;
            state.fetch_seq += 1;
            state.banner = None;
            state.stop_banner_timer();
        }
        debug!(kind = T::KIND, "list controller destroyed");
    }
}

fn apply_list<T: Resource, C>(
    weak: &Weak<Inner<T, C>>,
    seq: u64,
    query: &ListQuery,
    result: Result<ListResult<T>>,
) {
    let Some(inner) = weak.upgrade() else {
        debug!(kind = T::KIND, seq, "controller gone, dropping list response");
        return;
    };
    let mut state = inner.state.lock();
    if state.destroyed || seq != state.fetch_seq {
        debug!(
            kind = T::KIND,
            seq,
            latest = state.fetch_seq,
            "discarding stale list response"
        );
        return;
    }

    match result {
        Ok(mut result) => {
            let mut meta = result.meta(query);
            if !state.deleted_since_fetch.is_empty() {
                let before = result.items.len();
                let deleted = std::mem::take(&mut state.deleted_since_fetch);
                result
                    .items
                    .retain(|item| !deleted.iter().any(|id| id == item.id()));
                let dropped = (before - result.items.len()) as u64;
                meta.total_items = meta.total_items.saturating_sub(dropped);
            }
            debug!(
                kind = T::KIND,
                seq,
                items = result.items.len(),
                page = meta.current_page,
                total_pages = meta.total_pages,
                "list applied"
            );
            state.query.page = meta.current_page;
            state.items = result.items;
            state.meta = Some(meta);
            state.phase = ListPhase::Loaded;
        }
        Err(e) => {
            warn!(kind = T::KIND, "list load failed: {e}");
            state.items.clear();
            state.meta = None;
            state.phase = ListPhase::LoadError(e.user_message());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackofficeError;
    use crate::pagination::paginate_in_memory;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use validator::Validate;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
    struct Row {
        id: String,
        name: String,
    }

    impl Resource for Row {
        type Draft = Row;
        const KIND: &'static str = "Role";
        const COLLECTION: &'static str = "roles";

        fn id(&self) -> &str {
            &self.id
        }

        fn label(&self) -> &str {
            &self.name
        }
    }

    #[derive(Default)]
    struct FakeClient {
        rows: Mutex<Vec<Row>>,
        fail_list: AtomicBool,
        slow_list: AtomicBool,
        fail_delete: AtomicBool,
        list_calls: AtomicUsize,
        delete_calls: AtomicUsize,
    }

    impl FakeClient {
        fn with_rows(names: &[&str]) -> Self {
            let rows = names
                .iter()
                .enumerate()
                .map(|(i, name)| Row {
                    id: (i + 1).to_string(),
                    name: name.to_string(),
                })
                .collect();
            Self {
                rows: Mutex::new(rows),
                ..Self::default()
            }
        }
    }

    impl CollectionClient<Row> for FakeClient {
        async fn list(&self, query: &ListQuery) -> Result<ListResult<Row>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let rows = self.rows.lock().clone();
            if query.search == "slow" || self.slow_list.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(BackofficeError::NetworkUnavailable("offline".to_string()));
            }
            Ok(paginate_in_memory(rows, query, |r| r.name.as_str()))
        }

        async fn get(&self, id: &str) -> Result<Row> {
            self.rows
                .lock()
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| BackofficeError::not_found("Role", id))
        }

        async fn create(&self, draft: &Row) -> Result<Row> {
            self.rows.lock().push(draft.clone());
            Ok(draft.clone())
        }

        async fn update(&self, _id: &str, draft: &Row) -> Result<Row> {
            Ok(draft.clone())
        }

        async fn delete(&self, id: &str) -> Result<()> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(BackofficeError::RequestFailed {
                    status: 409,
                    message: "Role is assigned to users".to_string(),
                });
            }
            self.rows.lock().retain(|r| r.id != id);
            Ok(())
        }
    }

    fn controller(client: FakeClient) -> ListController<Row, FakeClient> {
        ListController::new(client, ControllerOptions::default())
    }

    async fn settle(handle: Option<JoinHandle<()>>) {
        handle.expect("fetch issued").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_loads_first_page() {
        let names: Vec<String> = (1..=12).map(|i| format!("Role {i}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let ctl = controller(FakeClient::with_rows(&names));

        assert_eq!(ctl.view().phase, ListPhase::Idle);
        settle(ctl.mount()).await;

        let view = ctl.view();
        assert_eq!(view.phase, ListPhase::Loaded);
        assert_eq!(view.items.len(), 10);
        let meta = view.meta.unwrap();
        assert_eq!(meta.total_pages, 2);
        assert_eq!(meta.total_items, 12);
        assert!(meta.has_next());
    }

    #[tokio::test(start_paused = true)]
    async fn test_paging_and_search_reset() {
        let names: Vec<String> = (1..=25).map(|i| format!("Role {i}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let ctl = controller(FakeClient::with_rows(&names));
        settle(ctl.mount()).await;

        settle(ctl.next_page()).await;
        assert_eq!(ctl.query().page, 2);
        settle(ctl.next_page()).await;
        assert_eq!(ctl.query().page, 3);
        assert!(ctl.next_page().is_none());
        assert_eq!(ctl.view().items.len(), 5);

        settle(ctl.set_search("role 2")).await;
        assert_eq!(ctl.query().page, 1);
        assert_eq!(ctl.view().items.len(), 7);

        settle(ctl.set_page_size(PageSize::Fifty)).await;
        assert_eq!(ctl.query().limit, PageSize::Fifty);
        assert!(ctl.prev_page().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_query_does_not_refetch() {
        let ctl = controller(FakeClient::with_rows(&["Admin"]));
        settle(ctl.mount()).await;
        assert!(ctl.set_page(1).is_none());
        assert!(ctl.set_search("").is_none());
        assert_eq!(ctl.client().list_calls.load(Ordering::SeqCst), 1);

        settle(ctl.refresh()).await;
        assert_eq!(ctl.client().list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_past_end_is_clamped() {
        let ctl = controller(FakeClient::with_rows(&["Admin", "Editor"]));
        settle(ctl.set_page(7)).await;
        let view = ctl.view();
        assert_eq!(view.meta.unwrap().current_page, 1);
        assert_eq!(view.query.page, 1);
        assert_eq!(view.items.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let ctl = controller(FakeClient::with_rows(&["slow", "Admin", "Editor"]));
        let slow = ctl.set_search("slow");
        let fast = ctl.set_search("edit");

        settle(fast).await;
        assert_eq!(ctl.view().items.len(), 1);
        assert_eq!(ctl.view().items[0].name, "Editor");

        settle(slow).await;
        let view = ctl.view();
        assert_eq!(view.query.search, "edit");
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].name, "Editor");
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_error_clears_list() {
        let ctl = controller(FakeClient::with_rows(&["Admin"]));
        settle(ctl.mount()).await;
        assert_eq!(ctl.view().items.len(), 1);

        ctl.client().fail_list.store(true, Ordering::SeqCst);
        settle(ctl.refresh()).await;
        let view = ctl.view();
        assert!(view.items.is_empty());
        assert!(view.meta.is_none());
        assert!(view.error().unwrap().starts_with("Unable to connect to the server"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_never_contacts_server() {
        let ctl = controller(FakeClient::with_rows(&["Admin", "Editor"]));
        settle(ctl.mount()).await;

        assert!(ctl.request_delete("2", "Editor"));
        let dialog = ctl.view().confirm.unwrap();
        assert_eq!(dialog.title, "Delete Role");
        assert_eq!(
            dialog.message,
            "Are you sure you want to delete \"Editor\"? This action cannot be undone."
        );
        assert_eq!(dialog.confirm_text, "Delete");

        assert_eq!(ctl.handle_gate(GateInput::Body).await, DeleteOutcome::Ignored);
        assert!(matches!(
            ctl.handle_gate(GateInput::Backdrop).await,
            DeleteOutcome::Cancelled(_)
        ));
        assert!(ctl.view().confirm.is_none());
        assert_eq!(ctl.confirm_delete().await, DeleteOutcome::Ignored);
        assert_eq!(ctl.client().delete_calls.load(Ordering::SeqCst), 0);
        assert_eq!(ctl.view().items.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_success_removes_row_and_banner_expires() {
        let ctl = controller(FakeClient::with_rows(&["Admin", "Editor", "Viewer"]));
        settle(ctl.mount()).await;

        ctl.request_delete("2", "Editor");
        let running = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.confirm_delete().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let view = ctl.view();
        assert_eq!(view.deleting_id(), Some("2"));
        assert!(!ctl.request_delete("3", "Viewer"));
        assert_eq!(ctl.cancel_delete(), DeleteOutcome::Ignored);

        let outcome = running.await.unwrap();
        assert!(matches!(outcome, DeleteOutcome::Deleted(ref t) if t.id == "2"));

        let view = ctl.view();
        assert!(view.confirm.is_none());
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.meta.unwrap().total_items, 2);
        let banner = view.banner.unwrap();
        assert_eq!(banner.message, "Role deleted successfully");
        assert!(!banner.is_error());
        assert_eq!(ctl.client().list_calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(2_800)).await;
        assert!(ctl.view().banner.is_some());
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(ctl.view().banner.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_failure_keeps_list() {
        let client = FakeClient::with_rows(&["Admin", "Editor"]);
        client.fail_delete.store(true, Ordering::SeqCst);
        let ctl = controller(client);
        settle(ctl.mount()).await;

        ctl.request_delete("1", "Admin");
        let outcome = ctl.handle_gate(GateInput::Confirm).await;
        assert_eq!(
            outcome,
            DeleteOutcome::Failed {
                target: DeleteTarget {
                    id: "1".to_string(),
                    label: "Admin".to_string()
                },
                message: "Role is assigned to users".to_string(),
            }
        );

        let view = ctl.view();
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.meta.unwrap().total_items, 2);
        assert!(view.confirm.is_none());
        assert!(view.banner.unwrap().is_error());
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_in_flight_during_delete_keeps_row_gone() {
        let ctl = controller(FakeClient::with_rows(&["Admin", "Editor", "Viewer"]));
        settle(ctl.mount()).await;

        ctl.client().slow_list.store(true, Ordering::SeqCst);
        let pending = ctl.refresh();
        ctl.request_delete("1", "Admin");
        assert!(matches!(ctl.confirm_delete().await, DeleteOutcome::Deleted(_)));
        settle(pending).await;

        let view = ctl.view();
        assert_eq!(view.phase, ListPhase::Loaded);
        let ids: Vec<&str> = view.items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(view.meta.unwrap().total_items, 2);

        settle(ctl.refresh()).await;
        assert_eq!(ctl.view().items.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_banner_stops_timer() {
        let ctl = controller(FakeClient::default());
        ctl.show_banner(Banner::error("Role is assigned to users"));
        ctl.dismiss_banner();
        assert!(ctl.view().banner.is_none());
        assert!(ctl.inner.state.lock().banner_timer.is_none());

        ctl.show_banner(Banner::info("next"));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(ctl.view().banner.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_banners_keep_latest_timer() {
        let ctl = ListController::new(
            FakeClient::default(),
            ControllerOptions {
                banner_timeout: Duration::from_millis(100),
                ..ControllerOptions::default()
            },
        );
        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let ctl = ctl.clone();
                tokio::spawn(async move { ctl.show_banner(Banner::info(format!("banner {i}"))) })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert!(ctl.view().banner.is_some());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(ctl.view().banner.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_banner_restarts_timer() {
        let ctl = controller(FakeClient::default());
        ctl.show_banner(Banner::info("first"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        ctl.show_banner(Banner::info("second"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(ctl.view().banner.unwrap().message, "second");
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert!(ctl.view().banner.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_discards_in_flight_response() {
        let ctl = controller(FakeClient::with_rows(&["slow"]));
        let pending = ctl.set_search("slow");
        ctl.destroy();
        settle(pending).await;

        let view = ctl.view();
        assert_eq!(view.phase, ListPhase::Loading);
        assert!(view.items.is_empty());
        assert!(ctl.refresh().is_none());
        assert!(!ctl.request_delete("1", "slow"));
    }

    #[test]
    fn test_visible_items_filter_by_label() {
        let ctl = controller(FakeClient::default());
        {
            let mut state = ctl.inner.state.lock();
            state.query.search = "ed".to_string();
            state.items = vec![
                Row {
                    id: "1".to_string(),
                    name: "Admin".to_string(),
                },
                Row {
                    id: "2".to_string(),
                    name: "Editor".to_string(),
                },
            ];
        }
        let visible = ctl.visible_items();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "2");
    }
}
