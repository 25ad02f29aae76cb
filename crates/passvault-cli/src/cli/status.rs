//! Status command: where things live and how much is stored.

use anyhow::Result;
use console::style;

use crate::state::{AppState, Layout};

/// Display the data directory, key file and database state.
///
/// Never creates the key file: the store is only opened when both the key
/// and the database already exist.
pub async fn status(layout: Layout, json: bool) -> Result<()> {
    let key_exists = layout.key_file.exists();
    let db_exists = tokio::fs::try_exists(&layout.database_file)
        .await
        .unwrap_or(false);

    let count = if key_exists && db_exists {
        let state = AppState::init(layout.clone()).await?;
        Some(state.credentials.count().await?)
    } else {
        None
    };

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": layout.data_dir.display().to_string(),
            "key_file": layout.key_file.path().display().to_string(),
            "key_exists": key_exists,
            "database_file": layout.database_file.display().to_string(),
            "database_exists": db_exists,
            "credentials": count,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let check_mark = |ok: bool| {
        if ok {
            format!("{}", style("✓").green())
        } else {
            format!("{}", style("✗").red())
        }
    };

    println!();
    println!(
        "  {} passvault v{}",
        style("🔐").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("  Data dir: {}", style(layout.data_dir.display()).cyan());
    println!(
        "  {} Key file  {}",
        check_mark(key_exists),
        style(layout.key_file.path().display()).dim()
    );
    println!(
        "  {} Database  {}",
        check_mark(db_exists),
        style(layout.database_file.display()).dim()
    );
    match count {
        Some(n) => println!("  Credentials: {}", style(n).bold()),
        None => println!(
            "  {}",
            style("Nothing stored yet. The key is created on the first save.").dim()
        ),
    }
    println!();

    Ok(())
}
