//! Sign-in, sign-out, `whoami` and profile updates.

use owo_colors::OwoColorize;
use serde_json::json;

use super::{AppContext, CommandOutput};
use crate::cli::OutputOptions;
use crate::error::{BackofficeError, Result};
use crate::remote::auth::{LoginForm, ProfileForm};
use crate::session::UserData;
use crate::utils::{is_stdin_tty, prompt_line};

/// Value from the command line, or asked for on the terminal.
fn value_or_prompt(value: Option<String>, prompt: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    if !is_stdin_tty() {
        return Err(BackofficeError::Other(format!(
            "{} is required when not running interactively",
            prompt.trim_end_matches(": ")
        )));
    }
    Ok(prompt_line(prompt)?.unwrap_or_default())
}

pub async fn cmd_login(
    ctx: &AppContext,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let email = value_or_prompt(email, "Email: ")?;
    let password = value_or_prompt(password, "Password: ")?;

    let user = ctx
        .auth()?
        .sign_in(&LoginForm::new(email, password))
        .await?;

    let mut text = format!("Signed in as {}", user_label(&user).cyan());
    if ctx.is_ephemeral() {
        text.push_str(&format!("\n{}", "(session kept for this run only)".dimmed()));
    }
    println!("{text}");
    Ok(())
}

pub fn cmd_logout(ctx: &AppContext) -> Result<()> {
    let was_signed_in = ctx.credentials().is_authenticated()?;
    ctx.credentials().logout()?;
    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("{}", "Not signed in.".dimmed());
    }
    Ok(())
}

pub fn cmd_whoami(ctx: &AppContext, output: OutputOptions) -> Result<()> {
    if !ctx.credentials().is_authenticated()? {
        return CommandOutput::new(json!({ "authenticated": false }))
            .with_text("Not signed in.".dimmed().to_string())
            .print(output);
    }

    let user = ctx.credentials().user_data()?;
    let json_output = json!({
        "authenticated": true,
        "user": user,
    });

    let text = match &user {
        Some(user) => {
            let mut text = format!("{}\n", user_label(user).cyan().bold());
            text.push_str(&format!("  email: {}\n", user.email));
            if let Some(role) = user.role_name() {
                text.push_str(&format!("  role: {role}\n"));
            }
            if let Some(id) = &user.id {
                text.push_str(&format!("  id: {id}"));
            }
            text.trim_end().to_string()
        }
        None => "Signed in (no user record stored)".to_string(),
    };

    CommandOutput::new(json_output).with_text(text).print(output)
}

pub async fn cmd_profile_update(
    ctx: &AppContext,
    name: String,
    email: String,
    password: Option<String>,
    confirm_password: Option<String>,
    output: OutputOptions,
) -> Result<()> {
    let mut form = ProfileForm::new(name.trim(), email.trim());
    if let Some(password) = password {
        let confirm = match confirm_password {
            Some(confirm) => confirm,
            None => value_or_prompt(None, "Confirm password: ")?,
        };
        form = form.with_password(password, confirm);
    }

    let user = ctx.auth()?.update_profile(&form).await?;
    CommandOutput::new(json!({
        "action": "profile_update",
        "user": user,
    }))
    .with_text("Profile updated successfully".green().to_string())
    .print(output)
}

fn user_label(user: &UserData) -> &str {
    if user.full_name.trim().is_empty() {
        &user.email
    } else {
        &user.full_name
    }
}
