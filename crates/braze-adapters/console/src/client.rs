//! Console chat client implementation.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use braze_core::{
    ChatClient, ClientError, ClientResult, Contact, EventIntake, InboundMessage, LifecycleHook,
    LoginOptions, OutboundMessage, Profile,
};

/// Prefix marking a console line as a group message.
const GROUP_PREFIX: &str = "/g ";

/// A terminal-backed chat client.
///
/// Inbound events come from stdin lines, outbound messages go to stdout.
/// The contact directory is a fixed roster configured at construction.
pub struct ConsoleClient {
    /// The identity reported at login.
    profile: Profile,
    /// The contact directory served by lookups.
    roster: Vec<Contact>,
    /// Reply target used for group lines.
    group_name: String,
    /// The bot's display name inside the simulated group, if different
    /// from its global nickname.
    group_alias: Option<String>,
    /// Sender id for lines without an explicit `name: ` prefix.
    default_sender: String,
    /// Exit hook stashed at login, invoked when stdin closes.
    exit_hook: Mutex<Option<LifecycleHook>>,
}

impl ConsoleClient {
    /// Creates a client logging in as `nick_name`.
    pub fn new(nick_name: impl Into<String>) -> Self {
        Self {
            profile: Profile::new("console-self", nick_name),
            roster: Vec::new(),
            group_name: "lobby".to_string(),
            group_alias: None,
            default_sender: "console".to_string(),
            exit_hook: Mutex::new(None),
        }
    }

    /// Adds a contact to the directory.
    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.roster.push(contact);
        self
    }

    /// Sets the bot's display name inside the simulated group.
    pub fn with_group_alias(mut self, alias: impl Into<String>) -> Self {
        self.group_alias = Some(alias.into());
        self
    }

    /// Sets the reply target used for group lines.
    pub fn with_group_name(mut self, name: impl Into<String>) -> Self {
        self.group_name = name.into();
        self
    }

    /// The display name a mention prefix must use.
    fn mention_name(&self) -> &str {
        self.group_alias.as_deref().unwrap_or(&self.profile.nick_name)
    }

    /// Parses one console line into an inbound event.
    ///
    /// Returns `None` for blank lines. Lines look like
    /// `[/g ]<sender>: <text>`; the sender part is optional.
    fn parse_line(&self, line: &str) -> Option<(InboundMessage, bool)> {
        let line = line.trim_end();
        if line.trim().is_empty() {
            return None;
        }

        let (rest, is_group) = match line.strip_prefix(GROUP_PREFIX) {
            Some(rest) => (rest, true),
            None => (line, false),
        };

        let (sender, text) = match rest.split_once(": ") {
            Some((sender, text)) if !sender.is_empty() && !sender.contains(' ') => (sender, text),
            _ => (self.default_sender.as_str(), rest),
        };

        let mentioned = is_group && text.starts_with(&format!("@{} ", self.mention_name()));

        let message = InboundMessage {
            reply_target: if is_group {
                self.group_name.clone()
            } else {
                sender.to_string()
            },
            sender_id: sender.to_string(),
            sender_alias: is_group.then(|| sender.to_string()),
            self_alias: if is_group { self.group_alias.clone() } else { None },
            text: text.to_string(),
            mentioned,
        };

        Some((message, is_group))
    }

    /// Restores a persisted session, if one is usable.
    fn restore_session(&self, options: &LoginOptions) -> Option<Profile> {
        if !options.hot_reload || !options.session_file.is_file() {
            return None;
        }

        match std::fs::read_to_string(&options.session_file)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str::<Profile>(&raw).map_err(|e| e.to_string()))
        {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(
                    file = %options.session_file.display(),
                    error = %e,
                    "stale session file, performing fresh login"
                );
                None
            }
        }
    }

    /// Persists the session for later hot-reload logins.
    fn store_session(&self, options: &LoginOptions) -> ClientResult<()> {
        let raw = serde_json::to_string_pretty(&self.profile)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        std::fs::write(&options.session_file, raw)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        debug!(file = %options.session_file.display(), "session persisted");
        Ok(())
    }
}

#[async_trait]
impl ChatClient for ConsoleClient {
    async fn login(&self, options: &LoginOptions) -> ClientResult<Profile> {
        *self.exit_hook.lock() = options.on_exit.clone();

        let profile = match self.restore_session(options) {
            Some(profile) => {
                info!(nick_name = %profile.nick_name, "session restored");
                profile
            }
            None => {
                // The console needs no QR scan; a fresh login is immediate.
                if options.hot_reload {
                    self.store_session(options)?;
                }
                info!(nick_name = %self.profile.nick_name, "fresh login");
                self.profile.clone()
            }
        };

        if let Some(hook) = &options.on_login {
            hook();
        }
        Ok(profile)
    }

    async fn lookup_contact(&self, id: &str) -> ClientResult<Option<Contact>> {
        Ok(self.roster.iter().find(|c| c.id == id).cloned())
    }

    async fn send(&self, target: &str, message: &OutboundMessage) -> ClientResult<()> {
        match message {
            OutboundMessage::Text(body) => println!("[{target}] {body}"),
            OutboundMessage::Image(path) => println!("[{target}] <image {}>", path.display()),
        }
        Ok(())
    }

    async fn run_event_loop(&self, intake: Arc<dyn EventIntake>) -> ClientResult<()> {
        info!("console intake started; plain lines are private, '/g ' lines are group");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let Some((message, is_group)) = self.parse_line(&line) else {
                continue;
            };
            intake.on_message(message, is_group).await;
        }

        info!("console intake closed");
        if let Some(hook) = self.exit_hook.lock().take() {
            hook();
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConsoleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleClient")
            .field("profile", &self.profile)
            .field("roster_len", &self.roster.len())
            .field("group_name", &self.group_name)
            .finish()
    }
}
