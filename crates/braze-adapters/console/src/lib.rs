//! Console loopback adapter for the Braze framework.
//!
//! [`ConsoleClient`] implements the [`ChatClient`](braze_core::ChatClient)
//! trait over stdin/stdout, so a bot can be driven from a terminal without
//! any chat network:
//!
//! - a plain line is a private message: `alice: hello`
//! - a `/g ` prefix marks a group line: `/g alice: @helper ping`
//! - an `@<name> ` prefix on group text counts as mentioning the bot
//! - outbound messages are printed to stdout
//!
//! The client honors `hot_reload` login by persisting the profile to the
//! configured session file as JSON.

mod client;

pub use client::ConsoleClient;
