//! List screen state and the read-only snapshot handed to renderers.

use tokio::task::JoinHandle;

use crate::pagination::{ListQuery, PaginationMeta};
use crate::utils::contains_ignore_case;

use super::banner::Banner;
use super::confirm::{ConfirmDialogState, ConfirmGate};

/// Load lifecycle of a list screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// Load failed; the message replaces the list.
    LoadError(String),
}

/// The row a delete was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub id: String,
    pub label: String,
}

/// Everything the controller owns for one screen.
#[derive(Debug)]
pub(crate) struct ListState<T> {
    pub query: ListQuery,
    pub items: Vec<T>,
    pub meta: Option<PaginationMeta>,
    pub phase: ListPhase,
    pub gate: ConfirmGate<DeleteTarget>,
    pub banner: Option<Banner>,
    pub banner_timer: Option<JoinHandle<()>>,
    /// Sequence number of the latest issued fetch.
    pub fetch_seq: u64,
    /// Ids deleted since the latest fetch was issued.
    pub deleted_since_fetch: Vec<String>,
    pub banner_seq: u64,
    pub destroyed: bool,
}

impl<T> ListState<T> {
    pub fn new(query: ListQuery) -> Self {
        Self {
            query,
            items: Vec::new(),
            meta: None,
            phase: ListPhase::Idle,
            gate: ConfirmGate::new(),
            banner: None,
            banner_timer: None,
            fetch_seq: 0,
            deleted_since_fetch: Vec::new(),
            banner_seq: 0,
            destroyed: false,
        }
    }

    pub fn stop_banner_timer(&mut self) {
        if let Some(timer) = self.banner_timer.take() {
            timer.abort();
        }
    }
}

/// Snapshot of a list screen for display.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    pub query: ListQuery,
    /// Fetched items, in server order.
    pub items: Vec<T>,
    pub meta: Option<PaginationMeta>,
    pub phase: ListPhase,
    pub banner: Option<Banner>,
    pub confirm: Option<ConfirmDialogState<DeleteTarget>>,
}

impl<T> ListView<T> {
    pub(crate) fn from_state(state: &ListState<T>) -> Self
    where
        T: Clone,
    {
        Self {
            query: state.query.clone(),
            items: state.items.clone(),
            meta: state.meta,
            phase: state.phase.clone(),
            banner: state.banner.clone(),
            confirm: state.gate.dialog().cloned(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ListPhase::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            ListPhase::LoadError(message) => Some(message),
            _ => None,
        }
    }

    /// Items whose label contains the search term, ignoring case.
    pub fn visible<'a>(&'a self, label: impl Fn(&T) -> &str + 'a) -> impl Iterator<Item = &'a T> {
        self.items
            .iter()
            .filter(move |item| contains_ignore_case(label(*item), &self.query.search))
    }

    /// The id currently being deleted, if a confirmed delete is in flight.
    pub fn deleting_id(&self) -> Option<&str> {
        self.confirm
            .as_ref()
            .filter(|c| c.loading)
            .map(|c| c.action.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageSize;

    #[test]
    fn test_view_filters_by_label() {
        let mut state = ListState::new(ListQuery::new("ADM", 1, PageSize::Ten));
        state.items = vec![
            "Administrator".to_string(),
            "Editor".to_string(),
            "Sub-admin".to_string(),
        ];
        let view = ListView::from_state(&state);
        let visible: Vec<&String> = view.visible(|s| s.as_str()).collect();
        assert_eq!(visible, vec!["Administrator", "Sub-admin"]);
        assert_eq!(view.items.len(), 3);
    }

    #[test]
    fn test_view_error_and_deleting() {
        let mut state: ListState<String> = ListState::new(ListQuery::default());
        state.phase = ListPhase::LoadError("boom".to_string());
        state.gate.open(
            "Delete role",
            "sure?",
            DeleteTarget {
                id: "4".to_string(),
                label: "Editor".to_string(),
            },
        );
        let view = ListView::from_state(&state);
        assert_eq!(view.error(), Some("boom"));
        assert_eq!(view.deleting_id(), None);

        state.gate.set_loading(true);
        let view = ListView::from_state(&state);
        assert_eq!(view.deleting_id(), Some("4"));
    }
}
