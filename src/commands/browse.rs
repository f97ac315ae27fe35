//! Interactive list screen driven by one-line commands.
//!
//! The screen is a [`ListController`]: every command maps onto one controller
//! operation, and the view is re-rendered from the controller's snapshot after
//! each one.

use owo_colors::OwoColorize;
use tabled::Table;
use tabled::settings::Style;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::controller::{ControllerOptions, GateInput, ListController, ListPhase, ListView};
use crate::error::{BackofficeError, Result};
use crate::remote::CollectionClient;
use crate::resources::TableRow;
use crate::types::{PageSize, VALID_PAGE_SIZES};
use crate::utils::prompt_line;

const HELP: &str = "n next · p prev · g <page> · /<text> search · l <size> page size · d <id> delete · r refresh · enter dismiss · q quit";

/// One line typed at the browse prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Prev,
    Page(u32),
    /// Empty text clears the search.
    Search(String),
    PageSize(PageSize),
    Delete(String),
    Refresh,
    /// Blank line: clear the banner.
    DismissBanner,
    Help,
    Quit,
}

/// Parse a browse prompt line; the error is a message for the user.
pub fn parse_browse_command(line: &str) -> std::result::Result<BrowseCommand, String> {
    let line = line.trim();
    if let Some(term) = line.strip_prefix('/') {
        return Ok(BrowseCommand::Search(term.trim().to_string()));
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match (word, rest) {
        ("n" | "next", "") => Ok(BrowseCommand::Next),
        ("p" | "prev", "") => Ok(BrowseCommand::Prev),
        ("r" | "refresh", "") => Ok(BrowseCommand::Refresh),
        ("q" | "quit" | "exit", "") => Ok(BrowseCommand::Quit),
        ("?" | "h" | "help", "") => Ok(BrowseCommand::Help),
        ("g" | "page", page) => page
            .parse::<u32>()
            .ok()
            .filter(|p| *p > 0)
            .map(BrowseCommand::Page)
            .ok_or_else(|| format!("invalid page number '{page}'")),
        ("l" | "limit", size) => size.parse::<PageSize>().map(BrowseCommand::PageSize).map_err(|_| {
            format!(
                "invalid page size '{size}', expected one of: {}",
                VALID_PAGE_SIZES.join(", ")
            )
        }),
        ("d" | "delete", id) if !id.is_empty() => Ok(BrowseCommand::Delete(id.to_string())),
        ("d" | "delete", _) => Err("usage: d <id>".to_string()),
        ("", "") => Ok(BrowseCommand::DismissBanner),
        _ => Err(format!("unknown command '{line}' (? for help)")),
    }
}

/// Run the list screen until `q` or end of input.
pub async fn cmd_browse<T, C>(client: C, options: ControllerOptions) -> Result<()>
where
    T: TableRow,
    C: CollectionClient<T>,
{
    let controller = ListController::new(client, options);
    settle(controller.mount()).await;

    loop {
        render(&controller.view());
        let Some(line) = read_line("> ").await? else {
            break;
        };
        let command = match parse_browse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message.yellow());
                continue;
            }
        };

        match command {
            BrowseCommand::Next => settle(controller.next_page()).await,
            BrowseCommand::Prev => settle(controller.prev_page()).await,
            BrowseCommand::Page(page) => settle(controller.set_page(page)).await,
            BrowseCommand::Search(term) => settle(controller.set_search(term)).await,
            BrowseCommand::PageSize(size) => settle(controller.set_page_size(size)).await,
            BrowseCommand::Refresh => settle(controller.refresh()).await,
            BrowseCommand::Delete(id) => delete_row(&controller, &id).await?,
            BrowseCommand::DismissBanner => controller.dismiss_banner(),
            BrowseCommand::Help => println!("{}", HELP.dimmed()),
            BrowseCommand::Quit => break,
        }
    }

    controller.destroy();
    Ok(())
}

async fn delete_row<T, C>(controller: &ListController<T, C>, id: &str) -> Result<()>
where
    T: TableRow,
    C: CollectionClient<T>,
{
    let label = controller
        .view()
        .items
        .iter()
        .find(|item| item.id() == id)
        .map(|item| item.label().to_string());
    let Some(label) = label else {
        println!("{}", format!("No {} with id {id} on this page", T::KIND).yellow());
        return Ok(());
    };

    if !controller.request_delete(id, label) {
        return Ok(());
    }

    while let Some(dialog) = controller.view().confirm {
        println!("{}", dialog.title.bold());
        println!("{}", dialog.message);
        let prompt = format!("{} / {} [y/n]: ", dialog.confirm_text.red(), dialog.cancel_text);
        let input = match read_line(&prompt).await? {
            Some(answer) => GateInput::from_key(&answer),
            None => Some(GateInput::Cancel),
        };
        if let Some(input) = input {
            let outcome = controller.handle_gate(input).await;
            debug!(?outcome, "delete gate resolved");
        }
    }
    Ok(())
}

/// Wait for a fetch the controller started, if it started one.
async fn settle(handle: Option<JoinHandle<()>>) {
    if let Some(handle) = handle
        && let Err(e) = handle.await
    {
        debug!("list fetch task ended abnormally: {e}");
    }
}

async fn read_line(prompt: &str) -> Result<Option<String>> {
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || prompt_line(&prompt))
        .await
        .map_err(|e| BackofficeError::Other(format!("input task failed: {e}")))?
        .map_err(BackofficeError::from)
}

fn render<T: TableRow>(view: &ListView<T>) {
    println!();
    if let Some(banner) = &view.banner {
        println!("{}", banner.message.color(banner.color()).bold());
    }
    if !view.query.search.is_empty() {
        println!("{}", format!("Search: {}", view.query.search).dimmed());
    }

    match &view.phase {
        ListPhase::Idle | ListPhase::Loading => println!("Loading..."),
        ListPhase::LoadError(message) => println!("{}", message.red()),
        ListPhase::Loaded => {
            let rows: Vec<T::Row> = view.visible(T::label).map(T::row).collect();
            if rows.is_empty() {
                println!("No {} found.", T::COLLECTION);
            } else {
                let mut table = Table::new(rows);
                table.with(Style::rounded());
                println!("{table}");
            }
        }
    }

    if let Some(meta) = &view.meta {
        let pages = meta
            .window()
            .into_iter()
            .map(|page| {
                if page == meta.current_page {
                    format!("[{page}]").bold().to_string()
                } else {
                    page.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{}  {}",
            pages,
            format!(
                "page {} of {} · {} total · {} per page",
                meta.current_page, meta.total_pages, meta.total_items, meta.items_per_page
            )
            .dimmed()
        );
    }
    println!("{}", HELP.dimmed());
}
