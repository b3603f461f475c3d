//! Integration layer - External system interfaces.
//!
//! This module contains the seam between the dispatch core and the outside
//! world:
//! - The chat client trait the core consumes
//! - The event intake trait the core exposes to clients
//! - The bot façade tying registry, matcher and dispatcher together

pub mod bot;
pub mod client;

pub use bot::{Bot, RuleBuilder};
pub use client::{BoxedClient, ChatClient, EventIntake, LifecycleHook, LoginOptions};
