//! Inbound message routing.
//!
//! Decides whether a message belongs to a watched user and, if so,
//! re-broadcasts a scrambled copy to the resolved destination.

use serenity::builder::{CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage};
use serenity::model::channel::{Embed, Message};
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use tracing::{debug, error};

use crate::engine::Substituter;
use crate::store::{WatchEntry, WatchStore};

/// Notice sent when a watched message carries no readable content.
const UNREADABLE_CONTENT: &str = "I found a message to reply to, but I can't see what it is. \
    Are you sure I have permission to view message contents?";

/// Process one inbound message event.
pub async fn route(store: &WatchStore, engine: &Substituter, ctx: &Context, msg: &Message) {
    // Direct messages are out of scope.
    let Some(community) = msg.guild_id else { return };

    let Some(entry) = store.lookup(community, msg.author.id).await else {
        return;
    };
    debug!(
        "Got message: community: {}; author: {}",
        community, msg.author.id
    );

    let destination = destination(&entry, msg.channel_id);

    if is_unreadable(&msg.content, &msg.embeds) {
        if let Err(e) = destination.say(&ctx.http, UNREADABLE_CONTENT).await {
            error!(
                "Failed to send unreadable-content notice to {}: {}",
                destination, e
            );
        }
        return;
    }

    let body = engine.transform(&msg.content, entry.rate);
    let embeds: Vec<CreateEmbed> = msg
        .embeds
        .iter()
        .map(|embed| scramble_embed(engine, embed, entry.rate))
        .collect();

    let outgoing = CreateMessage::new().content(body).embeds(embeds);
    if let Err(e) = destination.send_message(&ctx.http, outgoing).await {
        error!("Failed to send scrambled message to {}: {}", destination, e);
    }
}

/// The entry's channel when set, else the channel the message arrived in.
fn destination(entry: &WatchEntry, origin: ChannelId) -> ChannelId {
    entry.channel.unwrap_or(origin)
}

/// A watched message with no body and no embeds has nothing to scramble;
/// it gets the diagnostic notice instead.
fn is_unreadable(content: &str, embeds: &[Embed]) -> bool {
    content.is_empty() && embeds.is_empty()
}

/// Rebuild an embed with its text-bearing fields scrambled, each with an
/// independent random selection. Everything else carries through as-is.
fn scramble_embed(engine: &Substituter, embed: &Embed, rate: Option<f32>) -> CreateEmbed {
    let mut rebuilt = CreateEmbed::new();
    if let Some(author) = &embed.author {
        let mut rebuilt_author = CreateEmbedAuthor::new(engine.transform(&author.name, rate));
        if let Some(icon_url) = &author.icon_url {
            rebuilt_author = rebuilt_author.icon_url(icon_url);
        }
        if let Some(url) = &author.url {
            rebuilt_author = rebuilt_author.url(url);
        }
        rebuilt = rebuilt.author(rebuilt_author);
    }
    if let Some(colour) = embed.colour {
        rebuilt = rebuilt.colour(colour);
    }
    if let Some(description) = &embed.description {
        rebuilt = rebuilt.description(engine.transform(description, rate));
    }
    if let Some(footer) = &embed.footer {
        let mut rebuilt_footer = CreateEmbedFooter::new(engine.transform(&footer.text, rate));
        if let Some(icon_url) = &footer.icon_url {
            rebuilt_footer = rebuilt_footer.icon_url(icon_url);
        }
        rebuilt = rebuilt.footer(rebuilt_footer);
    }
    if let Some(image) = &embed.image {
        rebuilt = rebuilt.image(image.url.clone());
    }
    if let Some(thumbnail) = &embed.thumbnail {
        rebuilt = rebuilt.thumbnail(thumbnail.url.clone());
    }
    if let Some(timestamp) = &embed.timestamp {
        rebuilt = rebuilt.timestamp(*timestamp);
    }
    if let Some(title) = &embed.title {
        rebuilt = rebuilt.title(engine.transform(title, rate));
    }
    if let Some(url) = &embed.url {
        rebuilt = rebuilt.url(url);
    }
    rebuilt
}
