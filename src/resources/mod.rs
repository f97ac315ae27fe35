//! Record types managed by the console.
//!
//! Roles, users and modules live on the REST backend. Categories live in a
//! document collection. FAQs, CMS pages and products live in the local
//! key-value store.

pub mod category;
pub mod cms;
pub mod faq;
pub mod module;
pub mod product;
pub mod role;
pub mod user;

use tabled::Tabled;

use crate::remote::Resource;

pub use category::{Category, CategoryDraft};
pub use cms::{CmsDraft, CmsPage};
pub use faq::{Faq, FaqDraft};
pub use module::{Module, ModuleDraft};
pub use product::{Product, ProductDraft};
pub use role::{Role, RoleDraft};
pub use user::{RoleRef, User, UserDraft};

/// A record whose store assigns the id and timestamps, rather than a server.
pub trait StoredRecord: Resource {
    /// Build a new record from a validated draft.
    fn from_draft(id: String, draft: &Self::Draft, now: &str) -> Self;

    /// Overwrite the editable fields, keeping id and creation time.
    fn apply_draft(&mut self, draft: &Self::Draft, now: &str);
}

/// How a record shows up as one table row.
pub trait TableRow: Resource {
    type Row: Tabled;

    fn row(&self) -> Self::Row;
}

/// Shorten long free text for table cells.
pub(crate) fn cell(text: &str) -> String {
    crate::utils::truncate_string(text, 48)
}

/// `-` for absent optional values.
pub(crate) fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}
