//! # Braze
//!
//! A rule-based, scope-aware chat bot framework for Rust.
//!
//! ## Overview
//!
//! Braze sits between a chat-protocol client and your rule handlers.
//! Every inbound text event is classified by scope (private chat, group
//! chat, or the bot's own messages), matched against prefix-anchored regex
//! rules, and each matching rule whose guards pass (mention requirement,
//! sender filter) runs its handler in the event's own isolated task.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐    ┌─────────────┐    ┌──────────────────────────────────┐
//! │ ChatClient │───▶│ Bot (intake)│───▶│ dispatch task (own context)      │──▶ send
//! │ (console,  │    │  + registry │───▶│ dispatch task (own context)      │──▶ send
//! │  ...)      │    └─────────────┘───▶│ dispatch task (own context)      │──▶ send
//! └────────────┘                       └──────────────────────────────────┘
//! ```
//!
//! - **ChatClient**: protocol implementations (console loopback, etc.)
//! - **Bot**: rule registration surface and per-event task spawning
//! - **Matcher / Dispatcher**: scope selection, pattern matching, guarded
//!   execution
//! - **Runtime**: configuration, logging and signal-based shutdown
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use braze::prelude::*;
//! use braze_adapter_console::ConsoleClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = BrazeRuntime::new();
//!     let bot = runtime.login(Arc::new(ConsoleClient::new("helper"))).await?;
//!
//!     bot.rule("^ping$")
//!         .group()
//!         .require_mention()
//!         .handler(|_ctx| async { "pong" })?;
//!
//!     runtime.run(&bot).await?;
//!     Ok(())
//! }
//! ```

pub use braze_core as core;
pub use braze_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use braze::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use braze_runtime::BrazeRuntime;

    // Registration surface and façade
    pub use braze_core::{Bot, RuleBuilder};

    // Handler building blocks
    pub use braze_core::{
        Action, HandlerError, HandlerResult, IntoReply, MessageContext, Reply, into_handler,
    };

    // Rules and scopes
    pub use braze_core::{Rule, Scope, ScopeSet};

    // Client-side types for custom transports
    pub use braze_core::{
        BoxedClient, ChatClient, Contact, EventIntake, InboundMessage, LoginOptions,
        OutboundMessage, Profile,
    };
}
