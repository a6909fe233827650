use crate::config::Config;
use crate::db::Store;

pub async fn cmd_history(config: &Config, caller: &str, limit: u64) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let entries = store.list_search_history(caller.trim(), limit).await?;

    if entries.is_empty() {
        println!("No lookups recorded for '{caller}'.");
        return Ok(());
    }

    println!("Recent lookups for '{}' (last {}):", caller, entries.len());
    println!("{:-<60}", "");

    for entry in entries {
        let name = entry.name.as_deref().unwrap_or("Unknown");
        println!("• @{} - {}", entry.username, name);
        println!("  {}", entry.searched_at.format("%Y-%m-%d %H:%M UTC"));
    }

    Ok(())
}
