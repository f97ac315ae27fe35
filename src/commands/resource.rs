//! `ls`, `show`, `add`, `edit` and `rm`, shared by every collection.

use owo_colors::OwoColorize;
use serde_json::{Value, json};
use tabled::Table;
use tabled::settings::Style;
use tracing::debug;

use super::browse::cmd_browse;
use super::{AppContext, CommandOutput, FormFields, print_json};
use crate::cli::{OutputOptions, ResourceAction};
use crate::controller::{ConfirmGate, DeleteTarget, GateInput, GateOutcome};
use crate::error::{BackofficeError, Result};
use crate::pagination::ListQuery;
use crate::remote::CollectionClient;
use crate::resources::TableRow;
use crate::utils::{contains_ignore_case, is_stdin_tty, prompt_line};

impl AppContext {
    /// Dispatch one collection subcommand against `client`.
    pub async fn run_resource<T, C, F>(&self, client: C, action: ResourceAction<F>) -> Result<()>
    where
        T: TableRow,
        C: CollectionClient<T>,
        F: FormFields<T>,
    {
        match action {
            ResourceAction::Ls {
                search,
                page,
                limit,
                output,
            } => {
                let query = self.list_query(&search, page, limit);
                cmd_ls(&client, &query, output).await
            }
            ResourceAction::Show { id, output } => cmd_show(&client, &id, output).await,
            ResourceAction::Add { fields, output } => {
                let draft = fields.into_draft(None);
                let record = client.create(&draft).await?;
                print_saved(&record, "Created", output)
            }
            ResourceAction::Edit { id, fields, output } => {
                let existing = client.get(&id).await?;
                let draft = fields.into_draft(Some(&existing));
                let record = client.update(&id, &draft).await?;
                print_saved(&record, "Updated", output)
            }
            ResourceAction::Rm { id, yes, output } => cmd_rm(&client, &id, yes, output).await,
            ResourceAction::Browse { search } => {
                let query = self.list_query(&search, 1, None);
                cmd_browse(client, self.controller_options(query)).await
            }
        }
    }
}

/// Print one page as a table, followed by the paging summary.
pub async fn cmd_ls<T, C>(client: &C, query: &ListQuery, output: OutputOptions) -> Result<()>
where
    T: TableRow,
    C: CollectionClient<T>,
{
    let page = client.list(query).await?;
    let meta = page.meta(query);
    let visible: Vec<&T> = page
        .items
        .iter()
        .filter(|item| contains_ignore_case(item.label(), &query.search))
        .collect();

    if output.json {
        return print_json(&json!({
            "items": visible,
            "pagination": meta,
        }));
    }

    if visible.is_empty() {
        println!("No {} found.", T::COLLECTION);
        return Ok(());
    }

    let rows: Vec<T::Row> = visible.into_iter().map(T::row).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!(
        "\n{}",
        format!(
            "Page {} of {} ({} total)",
            meta.current_page, meta.total_pages, meta.total_items
        )
        .dimmed()
    );
    Ok(())
}

pub async fn cmd_show<T, C>(client: &C, id: &str, output: OutputOptions) -> Result<()>
where
    T: TableRow,
    C: CollectionClient<T>,
{
    let record = client.get(id).await?;
    let value = serde_json::to_value(&record)?;
    CommandOutput::new(value.clone())
        .with_text(format_fields(&value))
        .print(output)
}

async fn cmd_rm<T, C>(client: &C, id: &str, yes: bool, output: OutputOptions) -> Result<()>
where
    T: TableRow,
    C: CollectionClient<T>,
{
    let record = client.get(id).await?;
    let target = DeleteTarget {
        id: id.to_string(),
        label: record.label().to_string(),
    };

    if !yes && !confirm_delete::<T>(target.clone())? {
        return CommandOutput::new(json!({
            "action": "delete",
            "id": id,
            "deleted": false,
        }))
        .with_text("Cancelled.")
        .print(output);
    }

    client.delete(id).await?;
    debug!(kind = T::KIND, id, "deleted from the command line");
    CommandOutput::new(json!({
        "action": "delete",
        "id": id,
        "deleted": true,
    }))
    .with_text(format!("{} deleted successfully", T::KIND).green().to_string())
    .print(output)
}

/// Ask on the terminal through a confirmation gate.
fn confirm_delete<T: TableRow>(target: DeleteTarget) -> Result<bool> {
    if !is_stdin_tty() {
        return Err(BackofficeError::Other(
            "refusing to delete without confirmation; pass --yes".to_string(),
        ));
    }

    let mut gate = ConfirmGate::new();
    let message = format!(
        "Are you sure you want to delete \"{}\"? This action cannot be undone.",
        target.label
    );
    gate.open(format!("Delete {}", T::KIND), message, target);
    gate.set_labels("Delete", "Cancel");

    loop {
        let Some(dialog) = gate.dialog() else {
            return Ok(false);
        };
        println!("{}", dialog.title.bold());
        println!("{}", dialog.message);
        let prompt = format!("{} / {} [y/n]: ", dialog.confirm_text.red(), dialog.cancel_text);
        let Some(answer) = prompt_line(&prompt)? else {
            gate.handle(GateInput::Cancel);
            return Ok(false);
        };
        match GateInput::from_key(&answer).map(|input| gate.handle(input)) {
            Some(GateOutcome::Confirmed(_)) => {
                gate.close();
                return Ok(true);
            }
            Some(GateOutcome::Cancelled(_)) => return Ok(false),
            Some(GateOutcome::Ignored) | None => continue,
        }
    }
}

pub(super) fn print_saved<T: TableRow>(record: &T, verb: &str, output: OutputOptions) -> Result<()> {
    let value = serde_json::to_value(record)?;
    let text = format!(
        "{} {} {}",
        verb.green(),
        T::KIND,
        record.id().cyan()
    );
    CommandOutput::new(value).with_text(text).print(output)
}

/// Render a record's fields as `key: value` lines.
pub(crate) fn format_fields(value: &Value) -> String {
    let Value::Object(fields) = value else {
        return value.to_string();
    };
    let width = fields.keys().map(|k| k.len()).max().unwrap_or(0);
    fields
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Null => "-".to_string(),
                other => other.to_string(),
            };
            format!("{key:width$}  {rendered}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
