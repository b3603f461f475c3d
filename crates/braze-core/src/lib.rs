//! # Braze Core
//!
//! The dispatch core of the Braze chat bot framework.
//!
//! Braze routes inbound chat events through a rule table: each event is
//! classified by scope (private, group, or the bot's own messages), its
//! text is matched against prefix-anchored regular expressions, and every
//! matching rule whose guard conditions pass has its handler executed.
//! All of them fire, each independently guarded.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! Core abstractions and type system:
//! - **Message Types**: Wire-shaped inbound/outbound payloads
//!   ([`InboundMessage`], [`OutboundMessage`])
//! - **Context**: The isolated per-delivery snapshot ([`MessageContext`])
//! - **Rules**: Scopes, guards and the handler trait ([`Rule`], [`Scope`],
//!   [`RuleHandler`])
//! - **Replies**: Handler results and outbound actions ([`Reply`],
//!   [`Action`])
//!
//! ### Framework Layer
//!
//! The dispatch pipeline:
//! - **Registry**: Scope-qualified rule storage ([`RuleRegistry`])
//! - **Matcher**: Scope classification and pattern matching ([`Matcher`])
//! - **Dispatcher**: Guarded rule execution ([`Dispatcher`])
//!
//! ### Integration Layer
//!
//! External system interfaces:
//! - **Chat Client**: The consumed transport trait ([`ChatClient`])
//! - **Bot Façade**: Registration surface and event intake ([`Bot`])
//!
//! ## Event Flow
//!
//! ```text
//! ┌────────────┐     ┌─────┐     ┌─────────┐     ┌────────────┐
//! │ ChatClient │────▶│ Bot │────▶│ Matcher │────▶│ Dispatcher │──▶ send
//! │  (intake)  │     │     │     │         │────▶│ (per rule) │──▶ send
//! └────────────┘     └─────┘     └─────────┘     └────────────┘
//! ```
//!
//! Each inbound event gets its own context and its own spawned dispatch
//! task; two in-flight events can never observe each other's state.
//!
//! ## Example
//!
//! ```rust,ignore
//! use braze_core::{Bot, LoginOptions, MessageContext};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(MyChatClient::connect().await?);
//!     let bot = Bot::login(client, LoginOptions::default()).await?;
//!
//!     bot.rule("^ping$")
//!         .group()
//!         .require_mention()
//!         .handler(|_ctx| async { "pong" })?;
//!
//!     bot.rule("大写:[a-zA-Z]*$")
//!         .handler(|ctx: Arc<MessageContext>| async move {
//!             ctx.text().strip_prefix("大写:").unwrap_or_default().to_uppercase()
//!         })?;
//!
//!     bot.run().await?;
//!     Ok(())
//! }
//! ```

// Architectural layers
pub mod foundation;
pub mod framework;
pub mod integration;

// Re-export foundation types
pub use foundation::{
    Action, BotError, BotResult, BoxedHandler, ClientError, ClientResult, Contact, HandlerError,
    HandlerResult, InboundMessage, IntoReply, MessageContext, OutboundMessage, Profile,
    RegistryError, RegistryResult, Reply, Rule, RuleHandler, Scope, ScopeSet, UNKNOWN_SENDER,
    into_handler,
};

// Re-export framework types
pub use framework::{Dispatcher, Matcher, PatternBucket, RuleRegistry};

// Re-export integration types
pub use integration::{
    Bot, BoxedClient, ChatClient, EventIntake, LifecycleHook, LoginOptions, RuleBuilder,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::{
        Action, HandlerError, HandlerResult, InboundMessage, IntoReply, MessageContext,
        OutboundMessage, Reply, Rule, Scope, ScopeSet, into_handler,
    };
    pub use super::integration::{Bot, BoxedClient, ChatClient, EventIntake, LoginOptions};
}
