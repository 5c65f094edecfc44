//! Slash command handlers.
//!
//! Every handler follows the same shape: defer the reply, perform exactly one
//! external call (Ollama HTTP, host command, or file I/O), format the result
//! under the message-length budget, and reply. All domain failures are caught
//! here and turned into a user-visible message; the only errors that escape
//! are Discord transport errors, which dispatch() logs.

use crate::config::Config;
use crate::host;
use crate::logging::ellipse;
use crate::ollama::{format_model_list, OllamaClient};
use crate::preprompt;
use crate::reply::{render_messages, ChunkPolicy};
use crate::user_config::{self, UserConfigError};
use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, EditInteractionResponse,
};
use serenity::client::Context;
use serenity::model::application::{CommandInteraction, CommandOptionType};
use serenity::model::{Colour, Timestamp};
use tracing::{debug, error, warn};

/// Fixed denial for non-admins invoking admin-only commands.
const PERMISSION_DENIED: &str = "You need administrator permissions to use this command.";

/// Embed accent colour shared by the bot's rich replies.
const EMBED_COLOUR: Colour = Colour::new(0x00AE86);

/// The slash commands this bot registers globally on Ready.
pub fn registered_commands() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("listmodels")
            .description("Lists all available models from the Ollama instance."),
        CreateCommand::new("activemodel")
            .description("Shows the Ollama model currently active for you."),
        CreateCommand::new("gpuinfo").description("Displays GPU information using nvidia-smi."),
        CreateCommand::new("users")
            .description("Lists active users connected to the server (via TTY/PTS)."),
        CreateCommand::new("set-preprompt")
            .description("Replaces the persisted pre-prompt (admin only).")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "text", "New pre-prompt text")
                    .required(true),
            ),
        CreateCommand::new("viewprompt")
            .description("Shows the persisted pre-prompt (admin only)."),
    ]
}

/// Route one command interaction to its handler. Transport errors (the reply
/// itself failing) are logged here; they cannot be reported to the user.
pub async fn dispatch(
    ctx: &Context,
    interaction: &CommandInteraction,
    config: &Config,
    ollama: &OllamaClient,
) {
    let name = interaction.data.name.clone();
    let result = match name.as_str() {
        "listmodels" => list_models(ctx, interaction, ollama).await,
        "activemodel" => active_model(ctx, interaction, config).await,
        "gpuinfo" => gpu_info(ctx, interaction).await,
        "users" => users(ctx, interaction).await,
        "set-preprompt" => set_preprompt(ctx, interaction, config).await,
        "viewprompt" => view_prompt(ctx, interaction, config).await,
        other => {
            warn!("Discord: unknown command /{}", other);
            Ok(())
        }
    };
    if let Err(e) = result {
        error!("Discord: /{} reply failed: {}", name, e);
    }
}

/// True when the invoking member's resolved permissions include ADMINISTRATOR.
/// DMs carry no member, so they are never admin.
fn is_admin(interaction: &CommandInteraction) -> bool {
    interaction
        .member
        .as_ref()
        .and_then(|m| m.permissions)
        .is_some_and(|p| p.administrator())
}

/// Acknowledge immediately; the real reply follows as an edit.
async fn defer(
    ctx: &Context,
    interaction: &CommandInteraction,
    ephemeral: bool,
) -> serenity::Result<()> {
    let message = CreateInteractionResponseMessage::new().ephemeral(ephemeral);
    interaction
        .create_response(&ctx.http, CreateInteractionResponse::Defer(message))
        .await
}

/// Replace the deferred acknowledgment with plain content.
async fn edit(ctx: &Context, interaction: &CommandInteraction, content: &str) -> serenity::Result<()> {
    interaction
        .edit_response(&ctx.http, EditInteractionResponse::new().content(content))
        .await?;
    Ok(())
}

/// Deliver `raw` through the chunked reply formatter: the first chunk edits
/// the deferred reply, any further chunks go out as follow-ups.
async fn send_chunked(
    ctx: &Context,
    interaction: &CommandInteraction,
    header: Option<&str>,
    raw: &str,
    policy: &ChunkPolicy,
    ephemeral: bool,
) -> serenity::Result<()> {
    let messages = render_messages(header, raw, policy);
    debug!(
        "Discord: /{} sending {} message(s): {}",
        interaction.data.name,
        messages.len(),
        ellipse(raw, 120)
    );
    let mut messages = messages.into_iter();
    if let Some(first) = messages.next() {
        edit(ctx, interaction, &first).await?;
    }
    for followup in messages {
        interaction
            .create_followup(
                &ctx.http,
                CreateInteractionResponseFollowup::new()
                    .content(followup)
                    .ephemeral(ephemeral),
            )
            .await?;
    }
    Ok(())
}

/// /listmodels: GET /api/tags, render as an embed, truncate at the embed cap.
async fn list_models(
    ctx: &Context,
    interaction: &CommandInteraction,
    ollama: &OllamaClient,
) -> serenity::Result<()> {
    defer(ctx, interaction, false).await?;

    let models = match ollama.list_models().await {
        Ok(models) => models,
        Err(e) => {
            error!("Discord: /listmodels fetch failed: {}", e);
            return edit(
                ctx,
                interaction,
                &format!("Failed to fetch models from Ollama. Error: {}", e),
            )
            .await;
        }
    };

    if models.is_empty() {
        return edit(ctx, interaction, "No models found in Ollama.").await;
    }

    let policy = ChunkPolicy::embed_description();
    let description: String = crate::reply::chunks(&format_model_list(&models), None, &policy)
        .map(|c| c.content)
        .collect();

    let embed = CreateEmbed::new()
        .title("Available Ollama Models")
        .description(description)
        .colour(EMBED_COLOUR)
        .timestamp(Timestamp::now());
    interaction
        .edit_response(&ctx.http, EditInteractionResponse::new().embed(embed))
        .await?;
    Ok(())
}

/// /activemodel: per-user switch-model override, else the configured default.
/// An absent config file is the default case, not an error.
async fn active_model(
    ctx: &Context,
    interaction: &CommandInteraction,
    config: &Config,
) -> serenity::Result<()> {
    defer(ctx, interaction, true).await?;

    let path = config.user_config_path(&interaction.user.name);
    match user_config::active_model(&path, &config.default_model) {
        Ok(model) => edit(ctx, interaction, &format!("Active model: **{}**", model)).await,
        Err(UserConfigError::Malformed(e)) => {
            warn!("Discord: /activemodel malformed config {:?}: {}", path, e);
            edit(
                ctx,
                interaction,
                "Your configuration file exists but could not be parsed.",
            )
            .await
        }
        Err(e) => {
            error!("Discord: /activemodel read failed {:?}: {}", path, e);
            edit(ctx, interaction, "Failed to read your configuration.").await
        }
    }
}

/// /gpuinfo: run nvidia-smi and chunk its output into code fences.
async fn gpu_info(ctx: &Context, interaction: &CommandInteraction) -> serenity::Result<()> {
    defer(ctx, interaction, true).await?;

    let policy = ChunkPolicy {
        empty_placeholder: "No output from nvidia-smi.".to_string(),
        ..ChunkPolicy::plain_text()
    };
    match host::gpu_info().await {
        Ok(out) => {
            let stdout = out.stdout.trim();
            let stderr = out.stderr.trim();
            if stdout.is_empty() && !stderr.is_empty() {
                // Zero exit but nothing on stdout: surface the warning stream.
                send_chunked(
                    ctx,
                    interaction,
                    Some("Could not retrieve full GPU info. Output (stderr):"),
                    stderr,
                    &policy,
                    true,
                )
                .await
            } else {
                send_chunked(ctx, interaction, None, stdout, &policy, true).await
            }
        }
        Err(e) => {
            send_chunked(
                ctx,
                interaction,
                Some("Error retrieving GPU info:"),
                &e.to_string(),
                &policy,
                true,
            )
            .await
        }
    }
}

/// /users: run who, keep pts/tty session lines, chunk into code fences.
async fn users(ctx: &Context, interaction: &CommandInteraction) -> serenity::Result<()> {
    defer(ctx, interaction, true).await?;

    let policy = ChunkPolicy::plain_text();
    match host::active_users().await {
        Ok(out) => {
            let stderr = out.stderr.trim();
            if out.stdout.trim().is_empty() && !stderr.is_empty() {
                send_chunked(
                    ctx,
                    interaction,
                    Some("Could not retrieve full user info. Output (stderr):"),
                    stderr,
                    &policy,
                    true,
                )
                .await
            } else {
                let sessions = host::filter_session_lines(&out.stdout);
                send_chunked(ctx, interaction, None, &sessions, &policy, true).await
            }
        }
        Err(e) => {
            send_chunked(
                ctx,
                interaction,
                Some("Error retrieving user list:"),
                &e.to_string(),
                &policy,
                true,
            )
            .await
        }
    }
}

/// /set-preprompt: admin-only wholesale replacement of preprompt.txt.
/// The permission check happens before the file is touched.
async fn set_preprompt(
    ctx: &Context,
    interaction: &CommandInteraction,
    config: &Config,
) -> serenity::Result<()> {
    defer(ctx, interaction, true).await?;

    if !is_admin(interaction) {
        warn!(
            "Discord: /set-preprompt denied for {}",
            interaction.user.name
        );
        return edit(ctx, interaction, PERMISSION_DENIED).await;
    }

    let Some(text) = interaction
        .data
        .options
        .first()
        .and_then(|o| o.value.as_str())
    else {
        return edit(ctx, interaction, "The pre-prompt text argument is required.").await;
    };

    match preprompt::write(&config.preprompt_path(), text) {
        Ok(()) => {
            edit(
                ctx,
                interaction,
                &format!("Pre-prompt updated ({} chars).", text.chars().count()),
            )
            .await
        }
        Err(e) => {
            error!("Discord: /set-preprompt write failed: {}", e);
            edit(ctx, interaction, "Failed to write the pre-prompt file.").await
        }
    }
}

/// /viewprompt: admin-only read of preprompt.txt, chunked in a code fence.
async fn view_prompt(
    ctx: &Context,
    interaction: &CommandInteraction,
    config: &Config,
) -> serenity::Result<()> {
    defer(ctx, interaction, true).await?;

    if !is_admin(interaction) {
        warn!("Discord: /viewprompt denied for {}", interaction.user.name);
        return edit(ctx, interaction, PERMISSION_DENIED).await;
    }

    match preprompt::read(&config.preprompt_path()) {
        Ok(None) => edit(ctx, interaction, "No pre-prompt is set.").await,
        Ok(Some(content)) => {
            let policy = ChunkPolicy::plain_text();
            send_chunked(ctx, interaction, None, content.trim(), &policy, true).await
        }
        Err(e) => {
            error!("Discord: /viewprompt read failed: {}", e);
            edit(ctx, interaction, "Failed to read the pre-prompt file.").await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_all_six_commands() {
        let commands = registered_commands();
        assert_eq!(commands.len(), 6);
    }

    #[test]
    fn denial_message_is_fixed() {
        assert_eq!(
            PERMISSION_DENIED,
            "You need administrator permissions to use this command."
        );
    }
}
