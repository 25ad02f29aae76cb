//! Credential CLI commands: generate, save, find, show-all.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Password;

use passvault_core::service::password::generate_password;
use passvault_types::credential::{CredentialKey, CredentialRecord, ServiceSecret, UserSecret};
use passvault_types::password::PasswordPolicy;
use passvault_types::secret::{Redacted, RevealedSecret};

use crate::state::AppState;

/// Borrow the opened store, or fail if the caller never opened one.
pub fn store(state: Option<&AppState>) -> Result<&AppState> {
    state.context("credential store is not open")
}

fn secret_cell(secret: &RevealedSecret, mask: bool) -> Cell {
    match secret {
        RevealedSecret::Plain(plain) if mask => Cell::new(plain.masked()).fg(Color::Cyan),
        RevealedSecret::Plain(plain) => Cell::new(plain.expose()).fg(Color::Cyan),
        RevealedSecret::Unreadable(_) => Cell::new(secret.expose_or_sentinel()).fg(Color::Red),
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::White))
            .collect::<Vec<_>>(),
    );
    table
}

fn print_empty(what: &str) {
    println!();
    println!(
        "  {} No credentials stored {what}. Add one with: {}",
        style("i").blue().bold(),
        style("passvault save <USERNAME> <SERVICE>").yellow()
    );
    println!();
}

fn print_unreadable_footer(unreadable: usize) {
    if unreadable > 0 {
        println!(
            "  {} {} row{} could not be decrypted (wrong key or corrupt data)",
            style("!").yellow().bold(),
            style(unreadable).bold(),
            if unreadable == 1 { "" } else { "s" }
        );
        println!();
    }
}

/// Generate a password and optionally store it.
///
/// # Examples
///
/// ```bash
/// passvault generate -l 20 -s -d -u
/// passvault generate -d --username ivan --service gmail
/// ```
pub async fn generate(
    state: Option<&AppState>,
    policy: &PasswordPolicy,
    save: Option<&CredentialKey>,
    json: bool,
) -> Result<()> {
    if policy.only_lowercase() {
        tracing::warn!(
            "no special characters, digits or uppercase selected; the password will be lowercase letters only"
        );
    }

    let password = generate_password(policy)?;

    if let Some(key) = save {
        store(state)?.credentials.upsert(key, &password).await?;
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "password": password,
                "length": policy.length,
                "saved": save.map(|k| serde_json::json!({"username": k.username(), "service": k.service()})),
            })
        );
        return Ok(());
    }

    println!("  {} {}", style("Generated password:").bold(), style(&password).green());
    if let Some(key) = save {
        println!(
            "  {} Saved for {}",
            style("✓").green().bold(),
            style(key).cyan()
        );
    }

    Ok(())
}

/// Store a password, prompting with hidden input when none was given.
///
/// # Examples
///
/// ```bash
/// # Secure prompt (recommended)
/// passvault save ivan gmail
///
/// # Script/automation mode
/// passvault save ivan gmail --password MyPass123
/// ```
pub async fn save(
    state: &AppState,
    key: &CredentialKey,
    password: Option<Redacted>,
    json: bool,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => Redacted::new(
            Password::new()
                .with_prompt(format!("Password for {}", style(key).bold()))
                .with_confirmation("Repeat password", "Passwords do not match")
                .allow_empty_password(true)
                .interact()?,
        ),
    };

    state.credentials.upsert(key, password.expose()).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "saved": true,
                "username": key.username(),
                "service": key.service(),
                "masked": password.masked(),
            })
        );
    } else {
        println!(
            "  {} Password for {} saved ({})",
            style("✓").green().bold(),
            style(key).bold(),
            password.masked()
        );
    }

    Ok(())
}

/// Look up the single secret for a username and service.
pub async fn find_by_both(state: &AppState, key: &CredentialKey, json: bool) -> Result<()> {
    let found = state
        .credentials
        .get(key)
        .await
        .with_context(|| format!("failed to read the password for {key}"))?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "username": key.username(),
                "service": key.service(),
                "found": found.is_some(),
                "password": found.as_ref().map(Redacted::expose),
            })
        );
        return Ok(());
    }

    match found {
        Some(secret) => println!(
            "  {} Password for {}: {}",
            style("✓").green().bold(),
            style(key).bold(),
            style(secret.expose()).cyan()
        ),
        None => println!(
            "  {} No password stored for {}",
            style("✗").red().bold(),
            style(key).bold()
        ),
    }

    Ok(())
}

/// List every service stored for a username.
pub async fn find_by_username(state: &AppState, username: &str, json: bool) -> Result<()> {
    let rows: Vec<ServiceSecret> = state.credentials.find_by_username(username).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        print_empty(&format!("for user '{username}'"));
        return Ok(());
    }

    let mut table = new_table(&["Service", "Password"]);
    for row in &rows {
        table.add_row(vec![Cell::new(&row.service), secret_cell(&row.secret, false)]);
    }

    println!();
    println!("  Credentials for {}", style(username).bold());
    println!("{table}");
    println!();
    print_unreadable_footer(rows.iter().filter(|r| !r.secret.is_readable()).count());

    Ok(())
}

/// List every username stored for a service.
pub async fn find_by_service(state: &AppState, service: &str, json: bool) -> Result<()> {
    let rows: Vec<UserSecret> = state.credentials.find_by_service(service).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        print_empty(&format!("for service '{service}'"));
        return Ok(());
    }

    let mut table = new_table(&["Username", "Password"]);
    for row in &rows {
        table.add_row(vec![Cell::new(&row.username), secret_cell(&row.secret, false)]);
    }

    println!();
    println!("  Credentials for {}", style(service).bold());
    println!("{table}");
    println!();
    print_unreadable_footer(rows.iter().filter(|r| !r.secret.is_readable()).count());

    Ok(())
}

/// Total and unreadable counts, taken from the rows actually shown.
fn tally(rows: &[CredentialRecord]) -> (usize, usize) {
    let unreadable = rows.iter().filter(|r| !r.secret.is_readable()).count();
    (rows.len(), unreadable)
}

/// Show every stored credential with a count footer.
pub async fn show_all(state: &AppState, mask: bool, json: bool) -> Result<()> {
    let rows: Vec<CredentialRecord> = state.credentials.list_all().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        print_empty("yet");
        return Ok(());
    }

    let mut table = new_table(&["Username", "Service", "Password", "Saved"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(&row.username),
            Cell::new(&row.service),
            secret_cell(&row.secret, mask),
            Cell::new(row.created_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
        ]);
    }

    let (total, unreadable) = tally(&rows);

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} credential{}",
        style(total).bold(),
        if total == 1 { "" } else { "s" }
    );
    println!();
    print_unreadable_footer(unreadable);

    Ok(())
}
