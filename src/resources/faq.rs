use serde::{Deserialize, Serialize};
use tabled::Tabled;
use validator::Validate;

use crate::remote::Resource;
use crate::utils::validation::not_blank;

use super::{StoredRecord, TableRow, cell};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Resource for Faq {
    type Draft = FaqDraft;
    const KIND: &'static str = "FAQ";
    const COLLECTION: &'static str = "faqs";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.question
    }
}

impl StoredRecord for Faq {
    fn from_draft(id: String, draft: &FaqDraft, now: &str) -> Self {
        Self {
            id,
            question: draft.question.clone(),
            answer: draft.answer.clone(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    fn apply_draft(&mut self, draft: &FaqDraft, now: &str) {
        self.question = draft.question.clone();
        self.answer = draft.answer.clone();
        self.updated_at = now.to_string();
    }
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct FaqDraft {
    #[validate(custom(function = "not_blank", message = "Question is required"))]
    pub question: String,
    #[validate(custom(function = "not_blank", message = "Answer is required"))]
    pub answer: String,
}

impl FaqDraft {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into().trim().to_string(),
            answer: answer.into().trim().to_string(),
        }
    }
}

impl From<&Faq> for FaqDraft {
    fn from(faq: &Faq) -> Self {
        Self::new(&faq.question, &faq.answer)
    }
}

#[derive(Tabled)]
pub struct FaqRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Question")]
    question: String,
    #[tabled(rename = "Answer")]
    answer: String,
}

impl TableRow for Faq {
    type Row = FaqRow;

    fn row(&self) -> FaqRow {
        FaqRow {
            id: self.id.clone(),
            question: cell(&self.question),
            answer: cell(&self.answer),
        }
    }
}
