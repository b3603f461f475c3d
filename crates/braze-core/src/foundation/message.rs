//! Wire-shaped message and directory types.
//!
//! These types form the data contract between the dispatch core and a
//! [`ChatClient`](crate::integration::ChatClient) implementation: what a
//! client delivers for each inbound text event, what the dispatcher hands
//! back for sending, and the directory records used to resolve identities.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single inbound text event as delivered by the chat client.
///
/// One `InboundMessage` is produced per received event and consumed by
/// exactly one [`MessageContext`](crate::foundation::MessageContext); it is
/// never shared between deliveries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Conversation the message arrived in. Replies are addressed here.
    pub reply_target: String,

    /// Transport-level identifier of the sender, suitable for
    /// [`lookup_contact`](crate::integration::ChatClient::lookup_contact).
    pub sender_id: String,

    /// Display name the sender carries in the group roster, if any.
    ///
    /// Group events resolve the sender from this field directly instead of
    /// going through the contact directory.
    #[serde(default)]
    pub sender_alias: Option<String>,

    /// The bot's own per-group display name, when the group assigns one.
    ///
    /// Mention prefixes use this name, not the bot's global nickname.
    #[serde(default)]
    pub self_alias: Option<String>,

    /// Decoded text content of the message.
    pub text: String,

    /// Whether the message tagged the bot by display name.
    #[serde(default)]
    pub mentioned: bool,
}

/// An outbound payload accepted by the chat client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboundMessage {
    /// Plain text body.
    Text(String),
    /// Path to a local image file to upload.
    Image(PathBuf),
}

/// A directory entry returned by contact lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Transport-level identifier.
    pub id: String,
    /// Human-readable display name.
    pub display_name: String,
}

impl Contact {
    /// Creates a contact record.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// The logged-in account's own identity, as reported by the client at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Transport-level identifier of the account.
    pub user_id: String,
    /// Global nickname of the account.
    pub nick_name: String,
}

impl Profile {
    /// Creates a profile record.
    pub fn new(user_id: impl Into<String>, nick_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            nick_name: nick_name.into(),
        }
    }
}
