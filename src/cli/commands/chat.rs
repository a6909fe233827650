use crate::clients::ChatMessage;
use crate::config::Config;
use crate::domain::Username;
use crate::services::ProfileLookupService;
use crate::state::SharedState;

pub async fn cmd_chat(
    config: Config,
    username: &str,
    persona_id: &str,
    message: &str,
) -> anyhow::Result<()> {
    let username = Username::parse(username)?;
    let state = SharedState::new(config).await?;

    let reply = state
        .lookup_service
        .chat(&username, persona_id, vec![ChatMessage::user(message)])
        .await?;

    println!("{persona_id}: {reply}");
    Ok(())
}
