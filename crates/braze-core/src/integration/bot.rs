//! Bot façade.
//!
//! The [`Bot`] owns the rule registry for its whole lifetime, exposes the
//! registration surface, and is the [`EventIntake`] the chat client drives:
//! for every received event it resolves the sender's display name, builds
//! that event's own [`MessageContext`] and spawns one independent dispatch
//! task, so a slow handler never blocks reception of the next event.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::foundation::context::{MessageContext, UNKNOWN_SENDER};
use crate::foundation::error::{BotResult, RegistryResult};
use crate::foundation::message::{InboundMessage, Profile};
use crate::foundation::reply::IntoReply;
use crate::foundation::rule::{BoxedHandler, Rule, Scope, ScopeSet, into_handler};
use crate::framework::dispatcher::Dispatcher;
use crate::framework::matcher::Matcher;
use crate::framework::registry::RuleRegistry;
use crate::integration::client::{BoxedClient, EventIntake, LoginOptions};

/// A logged-in bot instance wired to a chat client.
pub struct Bot {
    /// The logged-in account's identity.
    profile: Profile,
    /// The chat transport collaborator.
    client: BoxedClient,
    /// Rule storage; written during setup, read by in-flight dispatches.
    registry: Arc<RwLock<RuleRegistry>>,
    /// The dispatch pipeline shared by all per-event tasks.
    dispatcher: Arc<Dispatcher>,
}

impl Bot {
    /// Logs in through `client` and returns the bot façade.
    pub async fn login(client: BoxedClient, options: LoginOptions) -> BotResult<Arc<Self>> {
        Self::build(client, options, None).await
    }

    /// Like [`login`](Self::login), but bounds every handler invocation.
    pub async fn login_with_timeout(
        client: BoxedClient,
        options: LoginOptions,
        handler_timeout: Duration,
    ) -> BotResult<Arc<Self>> {
        Self::build(client, options, Some(handler_timeout)).await
    }

    async fn build(
        client: BoxedClient,
        options: LoginOptions,
        handler_timeout: Option<Duration>,
    ) -> BotResult<Arc<Self>> {
        let profile = client.login(&options).await?;
        info!(
            nick_name = %profile.nick_name,
            user_id = %profile.user_id,
            "logged in"
        );

        let registry = Arc::new(RwLock::new(RuleRegistry::new()));
        let matcher = Matcher::new(profile.nick_name.clone());
        let mut dispatcher = Dispatcher::new(matcher, Arc::clone(&registry), Arc::clone(&client));
        if let Some(limit) = handler_timeout {
            dispatcher = dispatcher.with_handler_timeout(limit);
        }

        Ok(Arc::new(Self {
            profile,
            client,
            registry,
            dispatcher: Arc::new(dispatcher),
        }))
    }

    /// Returns the logged-in account's identity.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Starts a rule registration for `pattern`.
    ///
    /// ```rust,ignore
    /// bot.rule("^ping$")
    ///     .group()
    ///     .require_mention()
    ///     .handler(|_ctx| async { "pong" })?;
    /// ```
    pub fn rule(&self, pattern: impl Into<String>) -> RuleBuilder<'_> {
        RuleBuilder {
            bot: self,
            pattern: pattern.into(),
            scopes: ScopeSet::new(),
            name: None,
            require_mention: false,
            required_sender: None,
        }
    }

    /// Registers a pre-built rule under the given scopes.
    ///
    /// The direct-call counterpart of the [`rule`](Self::rule) builder.
    pub fn add_rule(&self, scopes: ScopeSet, pattern: &str, rule: Rule) -> RegistryResult<()> {
        self.registry.write().register(scopes, pattern, rule)
    }

    /// Total number of rule registrations.
    pub fn rule_count(&self) -> usize {
        self.registry.read().rule_count()
    }

    /// Runs the chat client's event loop until shutdown.
    ///
    /// Registration is expected to be complete by now; rules registered
    /// while the loop runs take effect, but no ordering with in-flight
    /// dispatches is guaranteed.
    pub async fn run(self: Arc<Self>) -> BotResult<()> {
        if self.registry.read().is_empty() {
            warn!("starting event loop with no registered rules");
        }
        info!("starting event loop");
        let intake: Arc<dyn EventIntake> = Arc::clone(&self) as Arc<dyn EventIntake>;
        self.client.run_event_loop(intake).await?;
        Ok(())
    }

    /// Resolves the display name dispatch guards compare against.
    ///
    /// Group events carry the sender's roster alias on the event itself;
    /// one-to-one and self events go through the contact directory. Any
    /// failure degrades to [`UNKNOWN_SENDER`].
    async fn resolve_sender(&self, message: &InboundMessage, is_group: bool) -> String {
        if is_group {
            return message
                .sender_alias
                .clone()
                .filter(|alias| !alias.is_empty())
                .unwrap_or_else(|| UNKNOWN_SENDER.to_string());
        }

        if message.sender_id == self.profile.user_id {
            return self.profile.nick_name.clone();
        }

        match self.client.lookup_contact(&message.sender_id).await {
            Ok(Some(contact)) => contact.display_name,
            Ok(None) => {
                debug!(sender_id = %message.sender_id, "sender not in directory");
                UNKNOWN_SENDER.to_string()
            }
            Err(e) => {
                warn!(sender_id = %message.sender_id, error = %e, "contact lookup failed");
                UNKNOWN_SENDER.to_string()
            }
        }
    }
}

#[async_trait]
impl EventIntake for Bot {
    async fn on_message(&self, message: InboundMessage, is_group: bool) {
        let sender = self.resolve_sender(&message, is_group).await;
        info!(group = is_group, sender = %sender, text = %message.text, "message received");

        let ctx = Arc::new(MessageContext::new(message, is_group, sender));
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            dispatcher.dispatch(ctx).await;
        });
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("profile", &self.profile)
            .field("rule_count", &self.rule_count())
            .finish()
    }
}

/// Builder-style rule registration, the decorator equivalent.
///
/// Scope methods accumulate; when none is named the rule defaults to
/// private chat only. The terminal [`handler`](Self::handler) call performs
/// the registration.
#[must_use = "a rule builder does nothing until a handler is attached"]
pub struct RuleBuilder<'a> {
    bot: &'a Bot,
    pattern: String,
    scopes: ScopeSet,
    name: Option<String>,
    require_mention: bool,
    required_sender: Option<String>,
}

impl RuleBuilder<'_> {
    /// Sets the label used in logs. Defaults to the pattern itself.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Listens in one-to-one chats.
    pub fn private(mut self) -> Self {
        self.scopes.insert(Scope::Private);
        self
    }

    /// Listens in group chats.
    pub fn group(mut self) -> Self {
        self.scopes.insert(Scope::Group);
        self
    }

    /// Listens to the bot's own messages.
    pub fn own(mut self) -> Self {
        self.scopes.insert(Scope::Own);
        self
    }

    /// Replaces the accumulated scopes wholesale.
    pub fn scopes(mut self, scopes: ScopeSet) -> Self {
        self.scopes = scopes;
        self
    }

    /// Requires group messages to mention the bot.
    pub fn require_mention(mut self) -> Self {
        self.require_mention = true;
        self
    }

    /// Only fires for this sender display name.
    pub fn from_sender(mut self, sender: impl Into<String>) -> Self {
        self.required_sender = Some(sender.into());
        self
    }

    /// Registers the rule with the given handler function.
    pub fn handler<F, Fut, R>(self, f: F) -> RegistryResult<()>
    where
        F: Fn(Arc<MessageContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoReply + Send + 'static,
    {
        self.handler_boxed(into_handler(f))
    }

    /// Registers the rule with a pre-built handler.
    pub fn handler_boxed(self, handler: BoxedHandler) -> RegistryResult<()> {
        let scopes = if self.scopes.is_empty() {
            ScopeSet::from(Scope::Private)
        } else {
            self.scopes
        };
        let name = self.name.unwrap_or_else(|| self.pattern.clone());

        let mut rule = Rule::new(name, handler).require_mention(self.require_mention);
        if let Some(sender) = self.required_sender {
            rule = rule.from_sender(sender);
        }

        self.bot.add_rule(scopes, &self.pattern, rule)
    }
}
