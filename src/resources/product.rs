use serde::{Deserialize, Serialize};
use tabled::Tabled;
use validator::Validate;

use crate::error::Result;
use crate::remote::{Resource, WriteMode};
use crate::utils::validation::{not_blank, validate_form};

use super::{StoredRecord, TableRow, cell, or_dash};

/// Placeholder value of the category picker; never a real category.
pub const UNSELECTED_CATEGORY: &str = "default";

const MAX_TITLE_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub pricing: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Resource for Product {
    type Draft = ProductDraft;
    const KIND: &'static str = "Product";
    const COLLECTION: &'static str = "products";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }

    fn check_draft(draft: &ProductDraft, _mode: WriteMode) -> Result<()> {
        validate_form(draft, |errors| {
            if draft.title.chars().count() > MAX_TITLE_CHARS {
                errors.add("title", "Product title must not exceed 100 characters");
            }
            if draft.description.chars().count() > MAX_DESCRIPTION_CHARS {
                errors.add(
                    "description",
                    "Product description must not exceed 1000 characters",
                );
            }
            if draft.category.trim() == UNSELECTED_CATEGORY {
                errors.add("category", "Please select a valid category");
            }
        })
    }
}

impl StoredRecord for Product {
    fn from_draft(id: String, draft: &ProductDraft, now: &str) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            category: draft.category.clone(),
            pricing: draft.pricing,
            rating: draft.rating,
            product_image: draft.product_image.clone(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    fn apply_draft(&mut self, draft: &ProductDraft, now: &str) {
        self.title = draft.title.clone();
        self.description = draft.description.clone();
        self.category = draft.category.clone();
        self.pricing = draft.pricing;
        self.rating = draft.rating;
        self.product_image = draft.product_image.clone();
        self.updated_at = now.to_string();
    }
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[validate(
        custom(function = "not_blank", message = "Product title is required"),
        length(min = 3, message = "Product title must be at least 3 characters long")
    )]
    pub title: String,
    #[validate(
        custom(function = "not_blank", message = "Product description is required"),
        length(
            min = 10,
            message = "Product description must be at least 10 characters long"
        )
    )]
    pub description: String,
    #[validate(custom(function = "not_blank", message = "Category is required"))]
    pub category: String,
    #[validate(range(exclusive_min = 0.0, message = "Pricing must be greater than 0"))]
    pub pricing: f64,
    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: Option<f64>,
    #[validate(url(message = "Please enter a valid image URL"))]
    pub product_image: Option<String>,
}

impl ProductDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        pricing: f64,
    ) -> Self {
        Self {
            title: title.into().trim().to_string(),
            description: description.into().trim().to_string(),
            category: category.into().trim().to_string(),
            pricing,
            rating: None,
            product_image: None,
        }
    }

    pub fn with_rating(mut self, rating: Option<f64>) -> Self {
        self.rating = rating;
        self
    }

    /// Set the image URL; blank clears it.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.product_image = Some(url.into().trim().to_string()).filter(|u| !u.is_empty());
        self
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            pricing: product.pricing,
            rating: product.rating,
            product_image: product.product_image.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    pricing: String,
    #[tabled(rename = "Rating")]
    rating: String,
}

impl TableRow for Product {
    type Row = ProductRow;

    fn row(&self) -> ProductRow {
        ProductRow {
            id: self.id.clone(),
            title: cell(&self.title),
            category: or_dash(Some(&self.category)),
            pricing: format!("{:.2}", self.pricing),
            rating: self
                .rating
                .map(|r| format!("{r:.1}"))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}
