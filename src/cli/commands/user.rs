//! User management commands

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_user_add(config: &Config, username: &str, admin: bool) -> anyhow::Result<()> {
    let username = username.trim();
    if username.is_empty() {
        anyhow::bail!("Username cannot be empty");
    }

    let store = Store::new(&config.general.database_path).await?;
    if store.get_user_by_username(username).await?.is_some() {
        anyhow::bail!("User '{username}' already exists");
    }

    let user = store.create_user(username, admin).await?;

    println!("✓ Created user '{}' (ID: {})", user.username, user.id);
    if user.is_admin {
        println!("  Role: operator");
    }
    println!("  API key: {}", user.api_key);
    println!();
    println!("Send it as the X-Api-Key header. It will not be shown again.");

    Ok(())
}

pub async fn cmd_user_list(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let users = store.list_users().await?;

    if users.is_empty() {
        println!("No users yet.");
        println!();
        println!("Add one with: lmn user add <username>");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<50}", "");
    for user in users {
        let role = if user.is_admin { " [operator]" } else { "" };
        println!("{:>4}  {}{}  (since {})", user.id, user.username, role, user.created_at);
    }

    Ok(())
}

pub async fn cmd_user_regenerate_key(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let key = store.regenerate_user_api_key(username).await?;

    println!("✓ New API key for '{username}': {key}");
    Ok(())
}
