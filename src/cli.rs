use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;

use crate::commands::AppContext;
use crate::resources::{Category, CmsPage, Faq, Module, Product, Role, User};
use crate::types::{PageSize, VALID_PAGE_SIZES};

#[derive(Parser)]
#[command(name = "backoffice")]
#[command(about = "Admin console for roles, users, modules and site content")]
#[command(version)]
pub struct Cli {
    /// Keep the session and local collections in memory for this run only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format shared by read commands
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct OutputOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in to the admin backend
    Login {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Account password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Clear the stored session
    Logout,

    /// Show the signed-in user
    Whoami {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// Manage your own account
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Manage roles and their module access
    Roles {
        #[command(subcommand)]
        action: ResourceAction<RoleFields>,
    },

    /// Manage admin users
    Users {
        #[command(subcommand)]
        action: ResourceAction<UserFields>,
    },

    /// Manage modules
    Modules {
        #[command(subcommand)]
        action: ResourceAction<ModuleFields>,
    },

    /// Manage product categories (Firestore)
    Categories {
        #[command(subcommand)]
        action: ResourceAction<CategoryFields>,
    },

    /// Manage FAQs
    Faqs {
        #[command(subcommand)]
        action: ResourceAction<FaqFields>,
    },

    /// Manage CMS pages
    Cms {
        #[command(subcommand)]
        action: ResourceAction<CmsFields>,
    },

    /// Manage products
    Products {
        #[command(subcommand)]
        action: ResourceAction<ProductFields>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Update your name, email and optionally your password
    Update {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// New password (leave out to keep the current one)
        #[arg(long)]
        password: Option<String>,

        /// Repeat the new password
        #[arg(long, requires = "password")]
        confirm_password: Option<String>,

        #[command(flatten)]
        output: OutputOptions,
    },
}

/// Operations every collection supports.
#[derive(Subcommand)]
pub enum ResourceAction<F: Args> {
    /// List one page of records
    #[command(visible_alias = "list")]
    Ls {
        /// Only records whose name or title contains this text
        #[arg(short, long, default_value = "")]
        search: String,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Rows per page (10, 20, 30, 50, 100; default from config)
        #[arg(short, long, value_parser = parse_page_size)]
        limit: Option<PageSize>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Show one record
    Show {
        id: String,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Create a record
    Add {
        #[command(flatten)]
        fields: F,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Change a record; fields left out keep their current value
    Edit {
        id: String,

        #[command(flatten)]
        fields: F,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Delete a record after confirmation
    Rm {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Interactive list screen
    Browse {
        /// Initial search text
        #[arg(short, long, default_value = "")]
        search: String,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct RoleFields {
    /// Role name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Module ids the role may access, comma separated (replaces the current set)
    #[arg(short, long, value_delimiter = ',')]
    pub modules: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct UserFields {
    /// Full name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Email address
    #[arg(short, long)]
    pub email: Option<String>,

    /// Password (required when adding; leave out on edit to keep it)
    #[arg(long)]
    pub password: Option<String>,

    /// Role id
    #[arg(short, long)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ModuleFields {
    /// Module name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Role ids granted the module, comma separated (replaces the current set)
    #[arg(short, long, value_delimiter = ',')]
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct CategoryFields {
    /// Category title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Image URL
    #[arg(short, long)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FaqFields {
    #[arg(short, long)]
    pub question: Option<String>,

    #[arg(short, long)]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct CmsFields {
    /// Page title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Page body
    #[arg(short, long)]
    pub content: Option<String>,

    /// URL slug (derived from the title when empty)
    #[arg(short, long)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ProductFields {
    /// Product title
    #[arg(short, long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Category id
    #[arg(short, long)]
    pub category: Option<String>,

    /// Price, greater than 0
    #[arg(short, long)]
    pub price: Option<f64>,

    /// Rating from 1 to 5
    #[arg(short, long)]
    pub rating: Option<f64>,

    /// Image URL (empty string clears it)
    #[arg(short, long)]
    pub image: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Display current configuration
    Show {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., page_size, firebase.project_id)
        key: String,

        /// Value to set
        value: String,

        #[command(flatten)]
        output: OutputOptions,
    },
}

impl Cli {
    /// Execute the parsed command line.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            cmd_config_set, cmd_config_show, cmd_login, cmd_logout, cmd_profile_update,
            cmd_role_edit, cmd_whoami,
        };

        let ephemeral = self.ephemeral;
        match self.command {
            Commands::Config { action } => match action {
                ConfigAction::Show { output } => cmd_config_show(output),
                ConfigAction::Set { key, value, output } => cmd_config_set(&key, &value, output),
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }

            command => {
                let ctx = AppContext::load(ephemeral)?;
                match command {
                    Commands::Login { email, password } => {
                        cmd_login(&ctx, email, password).await
                    }
                    Commands::Logout => cmd_logout(&ctx),
                    Commands::Whoami { output } => cmd_whoami(&ctx, output),
                    Commands::Profile {
                        action:
                            ProfileAction::Update {
                                name,
                                email,
                                password,
                                confirm_password,
                                output,
                            },
                    } => {
                        cmd_profile_update(&ctx, name, email, password, confirm_password, output)
                            .await
                    }

                    Commands::Roles {
                        action: ResourceAction::Edit { id, fields, output },
                    } => {
                        ctx.require_session()?;
                        cmd_role_edit(&ctx, &id, fields, output).await
                    }
                    Commands::Roles { action } => {
                        ctx.require_session()?;
                        ctx.run_resource::<Role, _, _>(ctx.remote()?, action).await
                    }
                    Commands::Users { action } => {
                        ctx.require_session()?;
                        ctx.run_resource::<User, _, _>(ctx.remote()?, action).await
                    }
                    Commands::Modules { action } => {
                        ctx.require_session()?;
                        ctx.run_resource::<Module, _, _>(ctx.remote()?, action).await
                    }
                    Commands::Categories { action } => {
                        ctx.run_resource::<Category, _, _>(ctx.documents()?, action)
                            .await
                    }
                    Commands::Faqs { action } => {
                        ctx.run_resource::<Faq, _, _>(ctx.local(), action).await
                    }
                    Commands::Cms { action } => {
                        ctx.run_resource::<CmsPage, _, _>(ctx.local(), action).await
                    }
                    Commands::Products { action } => {
                        ctx.run_resource::<Product, _, _>(ctx.local(), action).await
                    }

                    Commands::Config { .. } | Commands::Completions { .. } => {
                        unreachable!("handled without a context")
                    }
                }
            }
        }
    }
}

fn parse_page_size(s: &str) -> Result<PageSize, String> {
    s.parse().map_err(|_| {
        format!(
            "Invalid page size. Must be one of: {}",
            VALID_PAGE_SIZES.join(", ")
        )
    })
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "backoffice", &mut io::stdout());
}
