use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;
use validator::Validate;

use crate::remote::Resource;
use crate::utils::id::{id_from_value, ids_as_numbers, string_or_number};
use crate::utils::validation::not_blank;

use super::{Module, TableRow, cell};

/// A role as returned by the backend.
///
/// Depending on the endpoint, assigned modules arrive as `moduleIds`, as
/// `modules` (objects or bare names) or as `roleModules[].module`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_ids: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_modules: Option<Vec<Value>>,
}

impl Role {
    /// Module ids the role reports, in the order reported.
    ///
    /// `moduleIds` wins when present, then `modules[].id` (or `moduleId`),
    /// then `roleModules[].module.id`.
    pub fn assigned_module_ids(&self) -> Vec<String> {
        if let Some(ids) = &self.module_ids {
            return ids.iter().filter_map(id_from_value).collect();
        }
        if let Some(modules) = &self.modules {
            return modules
                .iter()
                .filter_map(|m| {
                    m.get("id")
                        .and_then(id_from_value)
                        .or_else(|| m.get("moduleId").and_then(id_from_value))
                })
                .collect();
        }
        self.role_modules
            .iter()
            .flatten()
            .filter_map(|rm| rm.get("module").and_then(|m| m.get("id")).and_then(id_from_value))
            .collect()
    }

    /// Assigned module ids that exist in `available`, ready to pre-select in
    /// an edit form. Ids compare numerically when both sides are numeric.
    pub fn reconcile_module_ids(&self, available: &[Module]) -> Vec<String> {
        let mut matched = Vec::new();
        for id in self.assigned_module_ids() {
            if let Some(module) = available.iter().find(|m| same_id(&m.id, &id))
                && !matched.contains(&module.id)
            {
                matched.push(module.id.clone());
            }
        }
        matched
    }

    /// Names of the assigned modules for display.
    pub fn module_names(&self) -> Vec<String> {
        if let Some(modules) = &self.modules {
            return modules
                .iter()
                .filter_map(|m| match m {
                    Value::String(name) => Some(name.clone()),
                    other => other.get("name").and_then(Value::as_str).map(str::to_string),
                })
                .collect();
        }
        self.role_modules
            .iter()
            .flatten()
            .filter_map(|rm| {
                rm.get("module")
                    .and_then(|m| m.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect()
    }
}

fn same_id(a: &str, b: &str) -> bool {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => a == b,
    }
}

impl Resource for Role {
    type Draft = RoleDraft;
    const KIND: &'static str = "Role";
    const COLLECTION: &'static str = "roles";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Create and update body.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoleDraft {
    #[validate(
        custom(function = "not_blank", message = "Role name is required"),
        length(min = 2, message = "Role name must be at least 2 characters long")
    )]
    pub name: String,
    #[serde(serialize_with = "ids_as_numbers")]
    pub module_ids: Vec<String>,
}

impl RoleDraft {
    pub fn new(name: impl Into<String>, module_ids: Vec<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            module_ids,
        }
    }

    /// Start an edit form from an existing role.
    pub fn from_role(role: &Role, available: &[Module]) -> Self {
        Self {
            name: role.name.clone(),
            module_ids: role.reconcile_module_ids(available),
        }
    }

    /// Add the module if absent, remove it if present.
    pub fn toggle_module(&mut self, module_id: &str) {
        if let Some(pos) = self.module_ids.iter().position(|id| id == module_id) {
            self.module_ids.remove(pos);
        } else {
            self.module_ids.push(module_id.to_string());
        }
    }
}

#[derive(Tabled)]
pub struct RoleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Modules")]
    modules: String,
}

impl TableRow for Role {
    type Row = RoleRow;

    fn row(&self) -> RoleRow {
        let names = self.module_names();
        RoleRow {
            id: self.id.clone(),
            name: self.name.clone(),
            modules: if names.is_empty() {
                "-".to_string()
            } else {
                cell(&names.join(", "))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackofficeError;
    use crate::remote::WriteMode;
    use serde_json::json;

    fn modules() -> Vec<Module> {
        serde_json::from_value(json!([
            {"id": 1, "name": "Users", "roleIds": []},
            {"id": "2", "name": "Roles", "roleIds": []},
            {"id": 3, "name": "CMS", "roleIds": []}
        ]))
        .unwrap()
    }

    #[test]
    fn test_module_ids_from_each_shape() {
        let role: Role =
            serde_json::from_value(json!({"id": 1, "name": "Admin", "moduleIds": [1, "3"]}))
                .unwrap();
        assert_eq!(role.id, "1");
        assert_eq!(role.assigned_module_ids(), vec!["1", "3"]);

        let role: Role = serde_json::from_value(json!({
            "id": 2, "name": "Editor",
            "modules": [{"id": 2, "name": "Roles"}, {"moduleId": "3"}]
        }))
        .unwrap();
        assert_eq!(role.assigned_module_ids(), vec!["2", "3"]);

        let role: Role = serde_json::from_value(json!({
            "id": 3, "name": "Viewer",
            "roleModules": [{"module": {"id": 1, "name": "Users"}}]
        }))
        .unwrap();
        assert_eq!(role.assigned_module_ids(), vec!["1"]);
        assert_eq!(role.module_names(), vec!["Users"]);
    }

    #[test]
    fn test_reconcile_drops_unknown_modules() {
        let role: Role =
            serde_json::from_value(json!({"id": 1, "name": "Admin", "moduleIds": ["02", 9, 3]}))
                .unwrap();
        let draft = RoleDraft::from_role(&role, &modules());
        assert_eq!(draft.module_ids, vec!["2", "3"]);
        assert_eq!(draft.name, "Admin");
    }

    #[test]
    fn test_draft_body_uses_numeric_ids() {
        let mut draft = RoleDraft::new(" Editor ", vec!["1".to_string()]);
        draft.toggle_module("3");
        draft.toggle_module("1");
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({"name": "Editor", "moduleIds": [3]})
        );
    }

    #[test]
    fn test_role_name_rules() {
        let Err(BackofficeError::ValidationFailed(errors)) =
            Role::check_draft(&RoleDraft::new("", vec![]), WriteMode::Create)
        else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(errors.first("name"), Some("Role name is required"));

        let Err(BackofficeError::ValidationFailed(errors)) =
            Role::check_draft(&RoleDraft::new("A", vec![]), WriteMode::Update)
        else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(
            errors.first("name"),
            Some("Role name must be at least 2 characters long")
        );

        assert!(Role::check_draft(&RoleDraft::new("Admin", vec![]), WriteMode::Create).is_ok());
    }
}
