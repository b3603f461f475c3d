//! Scope classification and pattern matching.
//!
//! The matcher decides which rule list applies to a delivery and which
//! rules in it the text selects. Classification precedence is
//! own > group > private: a message the bot sent into a group is still the
//! bot's own message.

use tracing::{debug, trace};

use crate::foundation::context::MessageContext;
use crate::foundation::rule::{Rule, Scope};
use crate::framework::registry::RuleRegistry;

/// Selects and matches rules for one delivery.
pub struct Matcher {
    /// The bot's global nickname, used for self-classification and as the
    /// mention-prefix fallback.
    nick_name: String,
}

impl Matcher {
    /// Creates a matcher for the given bot nickname.
    pub fn new(nick_name: impl Into<String>) -> Self {
        Self {
            nick_name: nick_name.into(),
        }
    }

    /// Returns the bot nickname this matcher classifies against.
    pub fn nick_name(&self) -> &str {
        &self.nick_name
    }

    /// Classifies a delivery into a scope.
    ///
    /// Pure function of `(sender == bot, is_group)`, in that precedence
    /// order: a self-sent message inside a group is [`Scope::Own`], not
    /// [`Scope::Group`].
    pub fn select_scope(&self, ctx: &MessageContext) -> Scope {
        if ctx.sender_name() == self.nick_name {
            Scope::Own
        } else if ctx.is_group() {
            Scope::Group
        } else {
            Scope::Private
        }
    }

    /// Returns the text rules are matched against.
    ///
    /// When the delivery mentioned the bot, exactly one leading
    /// `"@<display-name> "` prefix is removed. The display name is the
    /// bot's per-group alias when the group assigns one, falling back to
    /// the global nickname. Text without that exact prefix is returned
    /// unchanged; nothing is ever stripped from the middle.
    pub fn preprocess_text<'c>(&'c self, ctx: &'c MessageContext) -> &'c str {
        let text = ctx.text();
        if !ctx.mentioned() {
            return text;
        }

        let alias = ctx
            .event()
            .self_alias
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(&self.nick_name);

        text.strip_prefix('@')
            .and_then(|rest| rest.strip_prefix(alias))
            .and_then(|rest| rest.strip_prefix(' '))
            .unwrap_or(text)
    }

    /// Accumulates every rule under `scope` whose pattern matches at the
    /// start of `text`.
    ///
    /// Buckets are walked in registration order and each matching bucket
    /// contributes all of its rules in order; matching is case-sensitive
    /// over the decoded text. The matched rules are cloned out so the
    /// caller can drop its registry borrow before executing anything.
    pub fn match_rules(&self, registry: &RuleRegistry, scope: Scope, text: &str) -> Vec<Rule> {
        let mut matched = Vec::new();

        for bucket in registry.rules_for(scope) {
            if bucket.matches_prefix(text) {
                trace!(pattern = bucket.pattern(), "pattern matched");
                matched.extend_from_slice(bucket.rules());
            }
        }

        debug!(scope = %scope, text, count = matched.len(), "rules matched");
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::message::InboundMessage;
    use crate::foundation::rule::{ScopeSet, into_handler};

    const BOT_NICK: &str = "brazebot";

    fn message(text: &str) -> InboundMessage {
        InboundMessage {
            reply_target: "room".to_string(),
            sender_id: "u1".to_string(),
            sender_alias: None,
            self_alias: None,
            text: text.to_string(),
            mentioned: false,
        }
    }

    fn ctx(text: &str, is_group: bool, sender: &str) -> MessageContext {
        MessageContext::new(message(text), is_group, sender)
    }

    #[test]
    fn scope_precedence_own_beats_group() {
        let matcher = Matcher::new(BOT_NICK);

        assert_eq!(matcher.select_scope(&ctx("x", true, BOT_NICK)), Scope::Own);
        assert_eq!(matcher.select_scope(&ctx("x", false, BOT_NICK)), Scope::Own);
        assert_eq!(matcher.select_scope(&ctx("x", true, "alice")), Scope::Group);
        assert_eq!(matcher.select_scope(&ctx("x", false, "alice")), Scope::Private);
    }

    #[test]
    fn mention_prefix_is_stripped_with_group_alias() {
        let matcher = Matcher::new(BOT_NICK);
        let mut event = message("@小助手 hello");
        event.self_alias = Some("小助手".to_string());
        event.mentioned = true;
        let ctx = MessageContext::new(event, true, "alice");

        assert_eq!(matcher.preprocess_text(&ctx), "hello");
    }

    #[test]
    fn mention_prefix_falls_back_to_nick_name() {
        let matcher = Matcher::new(BOT_NICK);
        let mut event = message("@brazebot hello");
        event.self_alias = Some(String::new());
        event.mentioned = true;
        let ctx = MessageContext::new(event, true, "alice");

        assert_eq!(matcher.preprocess_text(&ctx), "hello");
    }

    #[test]
    fn no_strip_without_mention_flag() {
        let matcher = Matcher::new(BOT_NICK);
        let ctx = ctx("@brazebot hello", true, "alice");

        assert_eq!(matcher.preprocess_text(&ctx), "@brazebot hello");
    }

    #[test]
    fn no_partial_strip_when_prefix_differs() {
        let matcher = Matcher::new(BOT_NICK);
        let mut event = message("@brazebotx hello");
        event.mentioned = true;
        let ctx = MessageContext::new(event, true, "alice");

        // "@brazebotx " is not "@brazebot " followed by a space.
        assert_eq!(matcher.preprocess_text(&ctx), "@brazebotx hello");
    }

    #[test]
    fn match_accumulates_across_buckets_in_order() {
        let mut registry = RuleRegistry::new();
        let scopes = ScopeSet::from(Scope::Private);
        let noop = || into_handler(|_ctx| async { "ok" });
        registry.register(scopes, "he", Rule::new("short", noop())).unwrap();
        registry.register(scopes, "hello", Rule::new("long", noop())).unwrap();
        registry.register(scopes, "bye", Rule::new("other", noop())).unwrap();

        let matcher = Matcher::new(BOT_NICK);
        let matched = matcher.match_rules(&registry, Scope::Private, "hello world");

        let names: Vec<_> = matched.iter().map(Rule::name).collect();
        assert_eq!(names, ["short", "long"]);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let mut registry = RuleRegistry::new();
        registry
            .register(
                ScopeSet::from(Scope::Private),
                "Ping",
                Rule::new("ping", into_handler(|_ctx| async { "pong" })),
            )
            .unwrap();

        let matcher = Matcher::new(BOT_NICK);
        assert!(matcher.match_rules(&registry, Scope::Private, "ping").is_empty());
        assert_eq!(matcher.match_rules(&registry, Scope::Private, "Ping").len(), 1);
    }
}
