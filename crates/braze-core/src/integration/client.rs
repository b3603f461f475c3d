//! Chat client trait and related types.
//!
//! The dispatch core never talks to a chat network directly. It consumes a
//! [`ChatClient`] (login, directory lookup, outbound send and the blocking
//! event-intake loop) and hands the client an [`EventIntake`] to call for
//! every received text event. Session persistence, reconnection and retry
//! policy all live on the client's side of this boundary.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::foundation::error::ClientResult;
use crate::foundation::message::{Contact, InboundMessage, OutboundMessage, Profile};

/// A shared lifecycle callback invoked by the client at login milestones.
pub type LifecycleHook = Arc<dyn Fn() + Send + Sync>;

/// Options controlling session establishment.
///
/// Covers persisted-session reuse, QR presentation for clients that log in
/// by scan, and optional lifecycle hooks.
#[derive(Clone)]
pub struct LoginOptions {
    /// Reuse a persisted session instead of performing a fresh login.
    pub hot_reload: bool,
    /// Where the persisted session is stored.
    pub session_file: PathBuf,
    /// Render the login QR code on the terminal instead of a picture file.
    pub headless_qr: bool,
    /// Directory to drop the QR picture into, when not headless.
    pub qr_dir: Option<PathBuf>,
    /// Invoked when a login QR code is presented.
    pub on_qr: Option<LifecycleHook>,
    /// Invoked once the session is established.
    pub on_login: Option<LifecycleHook>,
    /// Invoked when the session ends.
    pub on_exit: Option<LifecycleHook>,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self {
            hot_reload: false,
            session_file: PathBuf::from("braze-session.json"),
            headless_qr: false,
            qr_dir: None,
            on_qr: None,
            on_login: None,
            on_exit: None,
        }
    }
}

impl std::fmt::Debug for LoginOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginOptions")
            .field("hot_reload", &self.hot_reload)
            .field("session_file", &self.session_file)
            .field("headless_qr", &self.headless_qr)
            .field("qr_dir", &self.qr_dir)
            .field("has_on_qr", &self.on_qr.is_some())
            .field("has_on_login", &self.on_login.is_some())
            .field("has_on_exit", &self.on_exit.is_some())
            .finish()
    }
}

/// Receiver of inbound text events.
///
/// The bot façade implements this; clients call it serially, once per
/// received event, with `is_group` distinguishing group conversations from
/// one-to-one and self chats. Implementations must return promptly; any
/// slow per-event work is spawned off the intake path.
#[async_trait]
pub trait EventIntake: Send + Sync {
    /// Delivers one inbound text event.
    async fn on_message(&self, message: InboundMessage, is_group: bool);
}

/// The chat transport collaborator consumed by the dispatch core.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Establishes a session and returns the logged-in account's identity.
    async fn login(&self, options: &LoginOptions) -> ClientResult<Profile>;

    /// Looks up a contact by transport-level identifier.
    ///
    /// `Ok(None)` means the identifier resolved to nothing; callers treat
    /// both that and `Err` as a non-fatal lookup failure.
    async fn lookup_contact(&self, id: &str) -> ClientResult<Option<Contact>>;

    /// Delivers an outbound message to `target`.
    ///
    /// Sends are fire-and-forget from the dispatcher's perspective; retry
    /// and backoff are the client's concern.
    async fn send(&self, target: &str, message: &OutboundMessage) -> ClientResult<()>;

    /// Runs the blocking event-intake loop.
    ///
    /// Invokes `intake.on_message` for every received text event and
    /// returns only on shutdown.
    async fn run_event_loop(&self, intake: Arc<dyn EventIntake>) -> ClientResult<()>;
}

/// A shared, type-erased chat client.
pub type BoxedClient = Arc<dyn ChatClient>;
