use serde::{Deserialize, Serialize};
use tabled::Tabled;
use validator::Validate;

use crate::remote::Resource;
use crate::utils::slugify;
use crate::utils::validation::not_blank;

use super::{StoredRecord, TableRow, cell};

/// A content page (About, Terms, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsPage {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Resource for CmsPage {
    type Draft = CmsDraft;
    const KIND: &'static str = "CMS page";
    const COLLECTION: &'static str = "cms";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}

impl StoredRecord for CmsPage {
    fn from_draft(id: String, draft: &CmsDraft, now: &str) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            content: draft.content.clone(),
            slug: draft.effective_slug(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    fn apply_draft(&mut self, draft: &CmsDraft, now: &str) {
        self.title = draft.title.clone();
        self.content = draft.content.clone();
        self.slug = draft.effective_slug();
        self.updated_at = now.to_string();
    }
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct CmsDraft {
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,
    #[validate(custom(function = "not_blank", message = "Content is required"))]
    pub content: String,
    /// Left blank to derive one from the title.
    pub slug: String,
}

impl CmsDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
            content: content.into(),
            slug: String::new(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into().trim().to_string();
        self
    }

    /// The given slug, or one generated from the title.
    pub fn effective_slug(&self) -> String {
        if self.slug.is_empty() {
            slugify(&self.title)
        } else {
            self.slug.clone()
        }
    }
}

impl From<&CmsPage> for CmsDraft {
    fn from(page: &CmsPage) -> Self {
        Self::new(&page.title, &page.content).with_slug(&page.slug)
    }
}

#[derive(Tabled)]
pub struct CmsRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Content")]
    content: String,
}

impl TableRow for CmsPage {
    type Row = CmsRow;

    fn row(&self) -> CmsRow {
        CmsRow {
            id: self.id.clone(),
            title: cell(&self.title),
            slug: self.slug.clone(),
            content: cell(&self.content),
        }
    }
}
