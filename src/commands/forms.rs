//! Command-line fields to drafts.
//!
//! On `add` the draft starts empty; on `edit` it starts from the stored
//! record. Either way only the flags given on the command line change it, and
//! the collection's form rules then decide whether the result is acceptable.

use clap::Args;

use crate::cli::{
    CategoryFields, CmsFields, FaqFields, ModuleFields, ProductFields, RoleFields, UserFields,
};
use crate::remote::Resource;
use crate::resources::{
    Category, CategoryDraft, CmsDraft, CmsPage, Faq, FaqDraft, Module, ModuleDraft, Product,
    ProductDraft, Role, RoleDraft, User, UserDraft,
};

/// Flags that fill in a draft for `T`.
pub trait FormFields<T: Resource>: Args {
    fn into_draft(self, existing: Option<&T>) -> T::Draft;
}

fn text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl FormFields<Role> for RoleFields {
    fn into_draft(self, existing: Option<&Role>) -> RoleDraft {
        let mut draft = existing
            .map(|role| RoleDraft::new(&role.name, role.assigned_module_ids()))
            .unwrap_or_default();
        self.apply(&mut draft);
        draft
    }
}

impl RoleFields {
    pub(crate) fn apply(self, draft: &mut RoleDraft) {
        if let Some(name) = text(self.name) {
            draft.name = name;
        }
        if let Some(modules) = self.modules {
            draft.module_ids = modules
                .into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect();
        }
    }
}

impl FormFields<User> for UserFields {
    fn into_draft(self, existing: Option<&User>) -> UserDraft {
        let mut draft = existing.map(UserDraft::from_user).unwrap_or_default();
        if let Some(name) = text(self.name) {
            draft.full_name = name;
        }
        if let Some(email) = text(self.email) {
            draft.email = email;
        }
        if let Some(password) = self.password {
            draft = draft.with_password(password);
        }
        if let Some(role) = text(self.role) {
            draft.role_id = role;
        }
        draft
    }
}

impl FormFields<Module> for ModuleFields {
    fn into_draft(self, existing: Option<&Module>) -> ModuleDraft {
        let mut draft = existing
            .map(|module| ModuleDraft::new(&module.name, module.role_ids.clone()))
            .unwrap_or_default();
        if let Some(name) = text(self.name) {
            draft.name = name;
        }
        if let Some(roles) = self.roles {
            draft.role_ids = roles
                .into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect();
        }
        draft
    }
}

impl FormFields<Category> for CategoryFields {
    fn into_draft(self, existing: Option<&Category>) -> CategoryDraft {
        let mut draft = existing.map(CategoryDraft::from).unwrap_or_default();
        if let Some(title) = text(self.title) {
            draft.category_title = title;
        }
        if let Some(image) = text(self.image) {
            draft.category_image = image;
        }
        draft
    }
}

impl FormFields<Faq> for FaqFields {
    fn into_draft(self, existing: Option<&Faq>) -> FaqDraft {
        let mut draft = existing.map(FaqDraft::from).unwrap_or_default();
        if let Some(question) = text(self.question) {
            draft.question = question;
        }
        if let Some(answer) = text(self.answer) {
            draft.answer = answer;
        }
        draft
    }
}

impl FormFields<CmsPage> for CmsFields {
    fn into_draft(self, existing: Option<&CmsPage>) -> CmsDraft {
        let mut draft = existing.map(CmsDraft::from).unwrap_or_default();
        if let Some(title) = text(self.title) {
            draft.title = title;
        }
        if let Some(content) = self.content {
            draft.content = content;
        }
        if let Some(slug) = self.slug {
            draft = draft.with_slug(slug);
        }
        draft
    }
}

impl FormFields<Product> for ProductFields {
    fn into_draft(self, existing: Option<&Product>) -> ProductDraft {
        let mut draft = existing.map(ProductDraft::from).unwrap_or_default();
        if let Some(title) = text(self.title) {
            draft.title = title;
        }
        if let Some(description) = text(self.description) {
            draft.description = description;
        }
        if let Some(category) = text(self.category) {
            draft.category = category;
        }
        if let Some(price) = self.price {
            draft.pricing = price;
        }
        if let Some(rating) = self.rating {
            draft.rating = Some(rating);
        }
        if let Some(image) = self.image {
            draft = draft.with_image(image);
        }
        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::StoredRecord;

    fn faq() -> Faq {
        Faq {
            id: "f1".to_string(),
            question: "Do you ship abroad?".to_string(),
            answer: "Yes.".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_edit_keeps_fields_not_given() {
        let fields = FaqFields {
            question: None,
            answer: Some("  To the EU only. ".to_string()),
        };
        let draft = fields.into_draft(Some(&faq()));
        assert_eq!(draft.question, "Do you ship abroad?");
        assert_eq!(draft.answer, "To the EU only.");
    }

    #[test]
    fn test_add_starts_blank() {
        let draft = FaqFields::default().into_draft(None);
        assert!(draft.question.is_empty());
        assert!(Faq::check_draft(&draft, crate::remote::WriteMode::Create).is_err());
    }

    #[test]
    fn test_role_module_list_replaces_and_drops_blanks() {
        let fields = RoleFields {
            name: Some("Editor".to_string()),
            modules: Some(vec!["1".to_string(), " ".to_string(), " 4".to_string()]),
        };
        let draft = fields.into_draft(None);
        assert_eq!(draft.name, "Editor");
        assert_eq!(draft.module_ids, vec!["1", "4"]);
    }

    #[test]
    fn test_product_image_can_be_cleared() {
        let product = Product::from_draft(
            "p1".to_string(),
            &ProductDraft::new("Desk lamp", "Warm light, brass finish", "lighting", 10.0)
                .with_image("https://cdn.example.com/lamp.png"),
            "2026-01-01T00:00:00Z",
        );
        let fields = ProductFields {
            image: Some(String::new()),
            price: Some(12.5),
            ..Default::default()
        };
        let draft = fields.into_draft(Some(&product));
        assert_eq!(draft.product_image, None);
        assert_eq!(draft.pricing, 12.5);
        assert_eq!(draft.title, "Desk lamp");
    }
}
