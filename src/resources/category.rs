use serde::{Deserialize, Serialize};
use tabled::Tabled;
use validator::Validate;

use crate::remote::Resource;
use crate::types::CATEGORY_COLLECTION;
use crate::utils::validation::not_blank;

use super::{StoredRecord, TableRow, cell, or_dash};

/// Product category, stored as a document keyed by its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub category_title: String,
    #[serde(default)]
    pub category_image: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Resource for Category {
    type Draft = CategoryDraft;
    const KIND: &'static str = "Category";
    const COLLECTION: &'static str = CATEGORY_COLLECTION;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.category_title
    }
}

impl StoredRecord for Category {
    fn from_draft(id: String, draft: &CategoryDraft, now: &str) -> Self {
        Self {
            id,
            category_title: draft.category_title.clone(),
            category_image: draft.category_image.clone(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    fn apply_draft(&mut self, draft: &CategoryDraft, now: &str) {
        self.category_title = draft.category_title.clone();
        self.category_image = draft.category_image.clone();
        self.updated_at = now.to_string();
    }
}

/// The image is a URL or empty; uploads happen elsewhere.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    #[validate(custom(function = "not_blank", message = "Category title is required"))]
    pub category_title: String,
    pub category_image: String,
}

impl CategoryDraft {
    pub fn new(title: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            category_title: title.into().trim().to_string(),
            category_image: image.into().trim().to_string(),
        }
    }
}

impl From<&Category> for CategoryDraft {
    fn from(category: &Category) -> Self {
        Self::new(&category.category_title, &category.category_image)
    }
}

#[derive(Tabled)]
pub struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Image")]
    image: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl TableRow for Category {
    type Row = CategoryRow;

    fn row(&self) -> CategoryRow {
        CategoryRow {
            id: self.id.clone(),
            title: self.category_title.clone(),
            image: or_dash(Some(&cell(&self.category_image))),
            updated: or_dash(Some(&self.updated_at)),
        }
    }
}
