//! Foundation layer - Core abstractions and type system.
//!
//! This module contains the fundamental building blocks of the Braze
//! dispatch core:
//! - Wire-shaped message and directory types
//! - The per-delivery message context
//! - Rules, scopes and the handler trait
//! - Handler replies and outbound actions
//! - The error taxonomy

pub mod context;
pub mod error;
pub mod message;
pub mod reply;
pub mod rule;

pub use context::{MessageContext, UNKNOWN_SENDER};
pub use error::{
    BotError, BotResult, ClientError, ClientResult, HandlerError, HandlerResult, RegistryError,
    RegistryResult,
};
pub use message::{Contact, InboundMessage, OutboundMessage, Profile};
pub use reply::{Action, IntoReply, Reply};
pub use rule::{BoxedHandler, Rule, RuleHandler, Scope, ScopeSet, into_handler};
