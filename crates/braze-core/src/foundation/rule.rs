//! Rules, scopes and the handler trait.
//!
//! A [`Rule`] pairs a handler with the guard conditions evaluated after its
//! pattern matched: whether a group message must mention the bot, and an
//! optional sender-identity filter. The same handler may be registered under
//! several scopes, each registration carrying its own guard values.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::foundation::context::MessageContext;
use crate::foundation::error::HandlerResult;
use crate::foundation::reply::IntoReply;

// =============================================================================
// Scope
// =============================================================================

/// Classification of an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A one-to-one conversation.
    Private,
    /// A group conversation.
    Group,
    /// A message sent by the bot's own account.
    Own,
}

impl Scope {
    /// Returns the scope name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Group => "group",
            Self::Own => "own",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subset of the three scopes a rule can be registered under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeSet {
    private: bool,
    group: bool,
    own: bool,
}

impl ScopeSet {
    /// Creates an empty scope set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set containing every scope.
    pub fn all() -> Self {
        Self {
            private: true,
            group: true,
            own: true,
        }
    }

    /// Adds a scope (builder form).
    pub fn with(mut self, scope: Scope) -> Self {
        self.insert(scope);
        self
    }

    /// Adds a scope in place.
    pub fn insert(&mut self, scope: Scope) {
        match scope {
            Scope::Private => self.private = true,
            Scope::Group => self.group = true,
            Scope::Own => self.own = true,
        }
    }

    /// Whether the set contains the given scope.
    pub fn contains(&self, scope: Scope) -> bool {
        match scope {
            Scope::Private => self.private,
            Scope::Group => self.group,
            Scope::Own => self.own,
        }
    }

    /// Whether no scope is set.
    pub fn is_empty(&self) -> bool {
        !(self.private || self.group || self.own)
    }

    /// Iterates over the contained scopes.
    pub fn iter(&self) -> impl Iterator<Item = Scope> + '_ {
        [Scope::Private, Scope::Group, Scope::Own]
            .into_iter()
            .filter(|s| self.contains(*s))
    }
}

impl From<Scope> for ScopeSet {
    fn from(scope: Scope) -> Self {
        Self::new().with(scope)
    }
}

// =============================================================================
// Handler Trait
// =============================================================================

/// A rule handler invoked when its rule matched and passed its guards.
///
/// Handlers receive their event's [`MessageContext`] explicitly (there is
/// no ambient current-message state) and return a value the dispatcher
/// interprets into an outbound action.
#[async_trait]
pub trait RuleHandler: Send + Sync {
    /// Runs the handler for one delivery.
    async fn call(&self, ctx: Arc<MessageContext>) -> HandlerResult;
}

/// A shared, type-erased rule handler.
pub type BoxedHandler = Arc<dyn RuleHandler>;

/// A handler function with its future and return type erased.
type ErasedFn = Box<dyn Fn(Arc<MessageContext>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Adapter implementing [`RuleHandler`] for plain async functions.
struct FnHandler(ErasedFn);

#[async_trait]
impl RuleHandler for FnHandler {
    async fn call(&self, ctx: Arc<MessageContext>) -> HandlerResult {
        (self.0)(ctx).await
    }
}

/// Wraps an async function or closure as a [`BoxedHandler`].
///
/// Accepts anything of the shape `Fn(Arc<MessageContext>) -> Future` whose
/// output implements [`IntoReply`]:
///
/// ```rust,ignore
/// let handler = into_handler(|_ctx| async { "pong" });
/// let handler = into_handler(|ctx: Arc<MessageContext>| async move {
///     Reply::text(ctx.text().to_uppercase())
/// });
/// ```
pub fn into_handler<F, Fut, R>(f: F) -> BoxedHandler
where
    F: Fn(Arc<MessageContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + Send + 'static,
{
    Arc::new(FnHandler(Box::new(move |ctx| {
        let fut = f(ctx);
        let erased: BoxFuture<'static, HandlerResult> =
            Box::pin(async move { fut.await.into_reply() });
        erased
    })))
}

// =============================================================================
// Rule
// =============================================================================

/// A registered pattern-to-handler rule.
///
/// Identity within a scope bucket is the (pattern, handler) registration
/// itself; duplicate registrations are kept and all fire on match. Cloning
/// is cheap since the handler is shared.
#[derive(Clone)]
pub struct Rule {
    /// Label used in logs.
    name: String,
    /// The handler to invoke.
    handler: BoxedHandler,
    /// Whether a group message must mention the bot for this rule to fire.
    require_mention: bool,
    /// Only fire for this sender display name, when set.
    required_sender: Option<String>,
}

impl Rule {
    /// Creates a rule with default guards (no mention, any sender).
    pub fn new(name: impl Into<String>, handler: BoxedHandler) -> Self {
        Self {
            name: name.into(),
            handler,
            require_mention: false,
            required_sender: None,
        }
    }

    /// Sets whether a group message must mention the bot.
    pub fn require_mention(mut self, required: bool) -> Self {
        self.require_mention = required;
        self
    }

    /// Restricts the rule to a single sender display name.
    pub fn from_sender(mut self, sender: impl Into<String>) -> Self {
        self.required_sender = Some(sender.into());
        self
    }

    /// Returns the rule's log label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the handler.
    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    /// Whether a group message must mention the bot.
    pub fn requires_mention(&self) -> bool {
        self.require_mention
    }

    /// The sender display name this rule is restricted to, if any.
    pub fn required_sender(&self) -> Option<&str> {
        self.required_sender.as_deref()
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("require_mention", &self.require_mention)
            .field("required_sender", &self.required_sender)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_set_builder_and_contains() {
        let set = ScopeSet::new().with(Scope::Private).with(Scope::Own);
        assert!(set.contains(Scope::Private));
        assert!(!set.contains(Scope::Group));
        assert!(set.contains(Scope::Own));
        assert_eq!(set.iter().count(), 2);
    }

    #[test]
    fn empty_scope_set() {
        let set = ScopeSet::new();
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
        assert!(!ScopeSet::all().is_empty());
    }
}
