//! Per-delivery message context.
//!
//! This module provides [`MessageContext`], the immutable snapshot of facts
//! about one inbound event. Every delivery gets its own instance, created at
//! intake and shared into the dispatch task behind an `Arc`, so two in-flight
//! events can never observe or overwrite each other's state.

use crate::foundation::message::InboundMessage;

/// Sentinel display name substituted when the sender cannot be resolved.
pub const UNKNOWN_SENDER: &str = "unknown";

/// An isolated bundle of derived facts about one inbound event.
///
/// The context is immutable after construction. Handlers receive it as an
/// `Arc<MessageContext>` scoped to their own dispatch task; there is no
/// shared "current message" slot anywhere in the framework.
pub struct MessageContext {
    /// The raw event as delivered by the chat client.
    event: InboundMessage,
    /// Whether the event arrived in a group conversation.
    is_group: bool,
    /// Whether the message tagged the bot by display name.
    mentioned: bool,
    /// Resolved display name of the sender.
    sender_name: String,
}

impl MessageContext {
    /// Creates a context snapshot for one delivery.
    ///
    /// The mentioned flag is taken from the event itself; `sender_name` is
    /// expected to be pre-resolved by the intake path (with
    /// [`UNKNOWN_SENDER`] substituted on lookup failure).
    pub fn new(event: InboundMessage, is_group: bool, sender_name: impl Into<String>) -> Self {
        let mentioned = event.mentioned;
        Self {
            event,
            is_group,
            mentioned,
            sender_name: sender_name.into(),
        }
    }

    /// Returns the raw inbound event.
    pub fn event(&self) -> &InboundMessage {
        &self.event
    }

    /// Returns the decoded text content of the message.
    pub fn text(&self) -> &str {
        &self.event.text
    }

    /// Returns the conversation replies should be addressed to.
    pub fn reply_target(&self) -> &str {
        &self.event.reply_target
    }

    /// Whether the event arrived in a group conversation.
    pub fn is_group(&self) -> bool {
        self.is_group
    }

    /// Whether the message tagged the bot by display name.
    pub fn mentioned(&self) -> bool {
        self.mentioned
    }

    /// Resolved display name of the sender.
    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }
}

impl std::fmt::Debug for MessageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageContext")
            .field("sender_name", &self.sender_name)
            .field("is_group", &self.is_group)
            .field("mentioned", &self.mentioned)
            .field("text", &self.event.text)
            .finish()
    }
}
