use tracing::debug;

use super::AppContext;
use super::resource::print_saved;
use crate::cli::{OutputOptions, RoleFields};
use crate::error::Result;
use crate::pagination::ListQuery;
use crate::remote::CollectionClient;
use crate::resources::{Module, Role, RoleDraft};
use crate::types::PageSize;

/// Edit a role, starting from its module assignments as they stand against
/// the modules that still exist.
pub async fn cmd_role_edit(
    ctx: &AppContext,
    id: &str,
    fields: RoleFields,
    output: OutputOptions,
) -> Result<()> {
    let roles = ctx.remote::<Role>()?;
    let modules = ctx.remote::<Module>()?;

    let role = roles.get(id).await?;
    let available = modules
        .list(&ListQuery::new("", 1, PageSize::Hundred))
        .await?
        .items;

    let mut draft = RoleDraft::from_role(&role, &available);
    let dropped = role
        .assigned_module_ids()
        .len()
        .saturating_sub(draft.module_ids.len());
    if dropped > 0 {
        debug!(role = id, dropped, "ignoring assignments to modules that no longer exist");
    }
    fields.apply(&mut draft);

    let updated = roles.update(id, &draft).await?;
    print_saved(&updated, "Updated", output)
}
