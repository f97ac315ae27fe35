use serde::{Deserialize, Serialize};
use tabled::Tabled;
use validator::Validate;

use crate::remote::Resource;
use crate::utils::id::{string_or_number, vec_string_or_number};
use crate::utils::validation::not_blank;

use super::{TableRow, or_dash};

/// A permission module roles can be granted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "vec_string_or_number")]
    pub role_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Resource for Module {
    type Draft = ModuleDraft;
    const KIND: &'static str = "Module";
    const COLLECTION: &'static str = "modules";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDraft {
    #[validate(
        custom(function = "not_blank", message = "Module name is required"),
        length(min = 2, message = "Module name must be at least 2 characters long")
    )]
    pub name: String,
    pub role_ids: Vec<String>,
}

impl ModuleDraft {
    pub fn new(name: impl Into<String>, role_ids: Vec<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            role_ids,
        }
    }
}

#[derive(Tabled)]
pub struct ModuleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Roles")]
    roles: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl TableRow for Module {
    type Row = ModuleRow;

    fn row(&self) -> ModuleRow {
        ModuleRow {
            id: self.id.clone(),
            name: self.name.clone(),
            roles: if self.role_ids.is_empty() {
                "-".to_string()
            } else {
                self.role_ids.join(", ")
            },
            created: or_dash(self.created_at.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::WriteMode;
    use serde_json::json;

    #[test]
    fn test_module_decodes_mixed_ids() {
        let module: Module =
            serde_json::from_value(json!({"id": 4, "name": "Reports", "roleIds": [1, "2"]}))
                .unwrap();
        assert_eq!(module.id, "4");
        assert_eq!(module.role_ids, vec!["1", "2"]);
        assert!(module.created_at.is_none());
    }

    #[test]
    fn test_module_name_required() {
        assert!(Module::check_draft(&ModuleDraft::new("  ", vec![]), WriteMode::Create).is_err());
        assert!(Module::check_draft(&ModuleDraft::new("Reports", vec![]), WriteMode::Create).is_ok());
        let body = serde_json::to_value(ModuleDraft::new("Reports", vec!["1".to_string()])).unwrap();
        assert_eq!(body, json!({"name": "Reports", "roleIds": ["1"]}));
    }
}
