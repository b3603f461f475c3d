//! Echo Bot Demo
//!
//! A small rule bot driven from the terminal through the console adapter.
//!
//! # Rule System
//!
//! Each rule pairs a prefix-anchored regex with a handler and guard
//! conditions; every matching rule whose guards pass fires:
//! - scopes decide which chats the rule listens in
//! - `require_mention` restricts a group rule to `@<name>`-tagged lines
//! - `from_sender` restricts a rule to one sender
//!
//! # Usage
//!
//! ```bash
//! cargo run --package echo-bot
//! ```
//!
//! Then type lines such as:
//!
//! ```text
//! alice: 你好
//! alice: 大写:abc
//! /g alice: @小助手 ping
//! console-self: note: remember this
//! ```
//!
//! (`console-self` is the console account's own id, so the last line is
//! routed to the own-message rules.)

use std::sync::Arc;

use anyhow::Result;
use braze::prelude::*;
use braze_adapter_console::ConsoleClient;
use tracing::info;

// ============================================================================
// Handler Functions
// ============================================================================

/// Greets back in kind.
async fn greet_handler(_ctx: Arc<MessageContext>) -> &'static str {
    "你好！有什么可以帮忙的？"
}

/// Uppercases everything after the `大写:` prefix.
async fn uppercase_handler(ctx: Arc<MessageContext>) -> String {
    ctx.text()
        .strip_prefix("大写:")
        .unwrap_or_default()
        .to_uppercase()
}

/// Replies with an image payload.
async fn photo_handler(_ctx: Arc<MessageContext>) -> (&'static str, &'static str) {
    ("image", "assets/cat.png")
}

/// Answers a mention-only group ping.
async fn ping_handler(_ctx: Arc<MessageContext>) -> &'static str {
    "pong"
}

/// Records the bot's own messages.
async fn self_note_handler(ctx: Arc<MessageContext>) -> String {
    info!(text = %ctx.text(), "saw my own message");
    format!("noted: {}", ctx.text())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let runtime = BrazeRuntime::new();

    let client = ConsoleClient::new("helper")
        .with_contact(Contact::new("alice", "Alice"))
        .with_contact(Contact::new("bob", "Bob"))
        .with_group_alias("小助手");

    let bot = runtime.login(Arc::new(client)).await?;

    // Greeting - fires in private and group chats alike.
    bot.rule("你好").private().group().handler(greet_handler)?;

    // Uppercase transformer - private only (the default scope).
    bot.rule("大写:[a-zA-Z]*$").handler(uppercase_handler)?;

    // Image reply.
    bot.rule("^photo$").handler(photo_handler)?;

    // Group ping, only when the bot is mentioned, and only from Alice.
    bot.rule("^ping$")
        .group()
        .require_mention()
        .from_sender("alice")
        .handler(ping_handler)?;

    // Listen to the bot's own messages.
    bot.rule("note:").own().name("self-note").handler(self_note_handler)?;

    runtime.run(&bot).await?;
    Ok(())
}
