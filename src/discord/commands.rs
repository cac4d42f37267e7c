//! Slash command definitions and handlers.
//!
//! Two commands, both restricted to guild managers and unusable in DMs:
//! `/reply-to-user` registers a watch entry, `/clear-settings` removes
//! every entry of the invoking guild. All validation happens here, before
//! the watch store is touched; replies are always ephemeral.

use fancy_regex::Regex;
use lazy_static::lazy_static;
use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use serenity::model::application::{CommandInteraction, CommandOptionType, ResolvedValue};
use serenity::model::channel::ChannelType;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::model::Permissions;
use serenity::prelude::*;
use tracing::info;

use crate::store::{WatchEntry, WatchStore};

pub const REGISTER: &str = "reply-to-user";
pub const CLEAR: &str = "clear-settings";

lazy_static! {
    /// A raw user id, or a balanced `<@id>` / `<@!id>` mention.
    static ref USER_REF: Regex = Regex::new(r"^(?:(\d+)|<@!?(\d+)>)$").expect("static pattern");
}

/// Builders for the global slash commands.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new(REGISTER)
            .description("Sets the bot to reply to a given user.")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "user", "The user to reply to")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "channel",
                    "The channel to reply in",
                )
                .required(false),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Number,
                    "rate",
                    "The percentage of words to replace",
                )
                .required(false),
            )
            .dm_permission(false)
            .default_member_permissions(Permissions::MANAGE_GUILD),
        CreateCommand::new(CLEAR)
            .description("Sets the bot to reply to nobody.")
            .dm_permission(false)
            .default_member_permissions(Permissions::MANAGE_GUILD),
    ]
}

/// Handle `/reply-to-user`.
pub async fn handle_register(
    store: &WatchStore,
    ctx: &Context,
    command: &CommandInteraction,
) -> serenity::Result<()> {
    let Some(community) = command.guild_id else {
        return Ok(());
    };

    let mut user_ref = None;
    let mut channel = None;
    let mut rate = None;
    for option in command.data.options() {
        match (option.name, option.value) {
            ("user", ResolvedValue::String(value)) => user_ref = Some(value),
            ("channel", ResolvedValue::Channel(value)) => channel = Some((value.id, value.kind)),
            ("rate", ResolvedValue::Number(value)) => rate = Some(value),
            _ => {}
        }
    }

    let reply = register(store, community, user_ref, channel, rate).await;
    respond(ctx, command, &reply).await
}

/// Validate a register invocation and, when everything passes, upsert the
/// watch entry. Returns the ephemeral reply text; any rejection leaves
/// the store untouched.
async fn register(
    store: &WatchStore,
    community: GuildId,
    user_ref: Option<&str>,
    channel: Option<(ChannelId, ChannelType)>,
    rate: Option<f64>,
) -> String {
    let Some(user) = user_ref.and_then(parse_user_ref) else {
        return "I couldn't tell which user that is. Pass a user id or an @mention.".to_string();
    };

    if let Some((id, kind)) = channel {
        // Announcement channels are text-capable too.
        if !matches!(kind, ChannelType::Text | ChannelType::News) {
            return format!("That channel (<#{}>) is not a text channel.", id);
        }
    }

    let rate = match rate {
        Some(percent) => match rate_fraction(percent) {
            Some(fraction) => Some(fraction),
            None => {
                return format!(
                    "That rate ({}) is invalid. I expected a number between 0 and 100.",
                    percent
                );
            }
        },
        None => None,
    };

    let destination = channel.map(|(id, _)| id);
    store
        .upsert(
            community,
            user,
            WatchEntry {
                channel: destination,
                rate,
            },
        )
        .await;
    info!("Watching user {} in community {}", user, community);

    let routing = match destination {
        Some(channel) => format!("in <#{}>", channel),
        None => "where they send their messages".to_string(),
    };
    format!("User <@{}> will be replied to {}.", user, routing)
}

/// Handle `/clear-settings`.
pub async fn handle_clear(
    store: &WatchStore,
    ctx: &Context,
    command: &CommandInteraction,
) -> serenity::Result<()> {
    let Some(community) = command.guild_id else {
        return Ok(());
    };

    let removed = store.remove_community(community).await;
    info!("Cleared {} watch entries in community {}", removed, community);

    let possessive = if removed == 1 { "user's" } else { "users'" };
    let text = format!(
        "No users will be replied to. Stopped listening to {} {} messages.",
        removed, possessive
    );
    respond(ctx, command, &text).await
}

/// Parse a user argument given as a raw id or a mention.
fn parse_user_ref(value: &str) -> Option<UserId> {
    let captures = USER_REF.captures(value.trim()).ok().flatten()?;
    captures
        .get(1)
        .or_else(|| captures.get(2))?
        .as_str()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(UserId::new)
}

/// Validate a rate percentage and convert it to the stored fraction.
/// `None` means the value is out of range and must be rejected.
fn rate_fraction(percent: f64) -> Option<f32> {
    if (0.0..=100.0).contains(&percent) {
        Some((percent / 100.0) as f32)
    } else {
        None
    }
}

/// Send an ephemeral reply to the invoking moderator.
async fn respond(
    ctx: &Context,
    command: &CommandInteraction,
    text: &str,
) -> serenity::Result<()> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(text)
                    .ephemeral(true),
            ),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NoopPersistence;
    use std::sync::Arc;

    fn store() -> WatchStore {
        WatchStore::new(Arc::new(NoopPersistence))
    }

    #[test]
    fn test_parse_user_ref() {
        assert_eq!(parse_user_ref("123456"), Some(UserId::new(123456)));
        assert_eq!(parse_user_ref("<@123456>"), Some(UserId::new(123456)));
        assert_eq!(parse_user_ref("<@!123456>"), Some(UserId::new(123456)));
        assert_eq!(parse_user_ref(" 123456 "), Some(UserId::new(123456)));
        assert_eq!(parse_user_ref("not a user"), None);
        assert_eq!(parse_user_ref("<@>"), None);
        assert_eq!(parse_user_ref("0"), None);
        assert_eq!(parse_user_ref(""), None);
    }

    #[test]
    fn test_parse_user_ref_rejects_unbalanced_mentions() {
        assert_eq!(parse_user_ref("123456>"), None);
        assert_eq!(parse_user_ref("<@123456"), None);
        assert_eq!(parse_user_ref("<@!123456"), None);
    }

    #[tokio::test]
    async fn test_rejected_rate_leaves_existing_entry_untouched() {
        let store = store();
        let community = GuildId::new(1);
        let existing = WatchEntry {
            channel: Some(ChannelId::new(30)),
            rate: Some(0.5),
        };
        store.upsert(community, UserId::new(2), existing).await;

        let reply = register(&store, community, Some("2"), None, Some(150.0)).await;
        assert_eq!(
            reply,
            "That rate (150) is invalid. I expected a number between 0 and 100."
        );
        assert_eq!(
            store.lookup(community, UserId::new(2)).await,
            Some(existing)
        );
    }

    #[tokio::test]
    async fn test_boundary_rates_map_to_fractions() {
        let store = store();
        let community = GuildId::new(1);

        register(&store, community, Some("2"), None, Some(0.0)).await;
        assert_eq!(
            store.lookup(community, UserId::new(2)).await,
            Some(WatchEntry {
                channel: None,
                rate: Some(0.0)
            })
        );

        register(&store, community, Some("2"), None, Some(100.0)).await;
        assert_eq!(
            store.lookup(community, UserId::new(2)).await,
            Some(WatchEntry {
                channel: None,
                rate: Some(1.0)
            })
        );
    }

    #[tokio::test]
    async fn test_non_text_channel_rejected_without_mutation() {
        let store = store();
        let community = GuildId::new(1);
        let voice = (ChannelId::new(30), ChannelType::Voice);

        let reply = register(&store, community, Some("2"), Some(voice), None).await;
        assert_eq!(reply, "That channel (<#30>) is not a text channel.");
        assert_eq!(store.lookup(community, UserId::new(2)).await, None);
    }

    #[tokio::test]
    async fn test_announcement_channel_accepted() {
        let store = store();
        let community = GuildId::new(1);
        let news = (ChannelId::new(30), ChannelType::News);

        let reply = register(&store, community, Some("2"), Some(news), None).await;
        assert_eq!(reply, "User <@2> will be replied to in <#30>.");
        assert_eq!(
            store.lookup(community, UserId::new(2)).await,
            Some(WatchEntry {
                channel: Some(ChannelId::new(30)),
                rate: None
            })
        );
    }

    #[tokio::test]
    async fn test_register_without_channel_replies_in_place() {
        let store = store();
        let community = GuildId::new(1);

        let reply = register(&store, community, Some("<@2>"), None, Some(40.0)).await;
        assert_eq!(
            reply,
            "User <@2> will be replied to where they send their messages."
        );
        assert_eq!(
            store.lookup(community, UserId::new(2)).await,
            Some(WatchEntry {
                channel: None,
                rate: Some(0.4)
            })
        );
    }

    #[test]
    fn test_rate_fraction_bounds() {
        assert_eq!(rate_fraction(0.0), Some(0.0));
        assert_eq!(rate_fraction(100.0), Some(1.0));
        assert_eq!(rate_fraction(40.0), Some(0.4));
        assert_eq!(rate_fraction(150.0), None);
        assert_eq!(rate_fraction(-2.0), None);
    }
}
