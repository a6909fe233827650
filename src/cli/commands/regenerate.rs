use crate::config::Config;
use crate::domain::{InsightKind, Username};
use crate::services::ProfileLookupService;
use crate::state::SharedState;

use super::lookup::print_profile;

pub async fn cmd_regenerate(config: Config, username: &str, kind: &str) -> anyhow::Result<()> {
    let username = Username::parse(username)?;
    let kind = match kind.trim() {
        "all" => None,
        name => Some(InsightKind::from_name(name).ok_or_else(|| {
            anyhow::anyhow!("Unknown kind '{name}'. Use insights, strategy, personas or all")
        })?),
    };

    let state = SharedState::new(config).await?;

    match kind {
        Some(kind) => println!("Regenerating {kind} for @{username}..."),
        None => println!("Regenerating all documents for @{username}..."),
    }
    let record = state.lookup_service.regenerate(&username, kind).await?;

    print_profile(&record);
    Ok(())
}
