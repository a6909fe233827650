use serde_json::Value;

use crate::config::Config;
use crate::db::Store;
use crate::domain::Username;
use crate::models::ProfileRecord;
use crate::models::profile::is_present;
use crate::services::ProfileLookupService;
use crate::services::generators::insights_digest;
use crate::state::SharedState;

pub async fn cmd_lookup(config: Config, username: &str) -> anyhow::Result<()> {
    let username = Username::parse(username)?;
    let state = SharedState::new(config).await?;

    println!("Looking up @{username}...");
    let record = state.lookup_service.ensure_profile_ready(&username).await?;

    print_profile(&record);
    Ok(())
}

pub async fn cmd_show(config: &Config, username: &str) -> anyhow::Result<()> {
    let username = Username::parse(username)?;
    let store = Store::new(&config.general.database_path).await?;

    match store.get_profile(&username).await? {
        Some(record) => print_profile(&record),
        None => println!("@{username} has not been looked up yet."),
    }

    Ok(())
}

pub(super) fn print_profile(record: &ProfileRecord) {
    let verified = if record.is_verified { " ✓" } else { "" };
    println!();
    println!(
        "{} (@{}){}",
        record.name.as_deref().unwrap_or("Unknown"),
        record.username,
        verified
    );
    println!("{:-<60}", "");
    if let Some(bio) = record.bio.as_deref().filter(|b| !b.is_empty()) {
        println!("{bio}");
    }
    println!(
        "Followers: {}  Following: {}  Posts: {}",
        record.followers_count, record.following_count, record.posts_count
    );
    if let Some(at) = record.last_fetched_at {
        println!("Fetched: {}", at.format("%Y-%m-%d %H:%M UTC"));
    }

    println!();
    println!("Insights:");
    if is_present(record.insights_data.as_ref()) {
        for line in insights_digest(record).lines() {
            println!("  {line}");
        }
    } else {
        println!("  (pending)");
    }

    println!();
    println!("Prep guide:");
    print_list(record.strategy_data.as_ref(), "sections", "question");

    println!();
    println!("Personas:");
    print_list(record.personas_data.as_ref(), "personas", "name");
}

fn print_list(document: Option<&Value>, key: &str, title: &str) {
    let items = document
        .and_then(|d| d.get(key))
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty());

    let Some(items) = items else {
        println!("  (pending)");
        return;
    };

    for item in items {
        let id = item.get("id").and_then(Value::as_str).unwrap_or("?");
        let text = item.get(title).and_then(Value::as_str).unwrap_or("");
        println!("  [{id}] {text}");
    }
}
