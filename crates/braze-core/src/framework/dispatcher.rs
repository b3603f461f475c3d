//! Per-event rule dispatch.
//!
//! The dispatcher takes one delivery's context, asks the matcher for the
//! matching rules, and runs every rule that also passes its guards. All
//! matched-and-passing rules fire, not just the first, and a failure in
//! one rule (bad reply, handler error, failed send, timeout) never
//! prevents the remaining rules from running.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::timeout;
use tracing::{Instrument, Level, debug, error, info, span, warn};

use crate::foundation::context::MessageContext;
use crate::foundation::message::OutboundMessage;
use crate::foundation::reply::Action;
use crate::foundation::rule::Rule;
use crate::framework::matcher::Matcher;
use crate::framework::registry::RuleRegistry;
use crate::integration::client::BoxedClient;

/// Executes matched rules for one delivery and sends their replies.
pub struct Dispatcher {
    /// Scope classification and pattern matching.
    matcher: Matcher,
    /// Shared rule storage; the read guard is held only while cloning
    /// matched rules out, never across an await.
    registry: Arc<RwLock<RuleRegistry>>,
    /// Outbound side of the chat client.
    client: BoxedClient,
    /// Upper bound on a single handler's run time, when set.
    handler_timeout: Option<Duration>,
}

impl Dispatcher {
    /// Creates a dispatcher without a handler timeout.
    pub fn new(matcher: Matcher, registry: Arc<RwLock<RuleRegistry>>, client: BoxedClient) -> Self {
        Self {
            matcher,
            registry,
            client,
            handler_timeout: None,
        }
    }

    /// Bounds each handler invocation to `limit`.
    ///
    /// A handler that exceeds the bound is abandoned with a warning; the
    /// remaining matched rules still run.
    pub fn with_handler_timeout(mut self, limit: Duration) -> Self {
        self.handler_timeout = Some(limit);
        self
    }

    /// Returns the matcher.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Dispatches one delivery: classify, match, guard, execute.
    pub async fn dispatch(&self, ctx: Arc<MessageContext>) {
        let span = span!(Level::DEBUG, "dispatch", sender = %ctx.sender_name());

        async {
            let scope = self.matcher.select_scope(&ctx);
            let text = self.matcher.preprocess_text(&ctx).to_owned();

            let matched = {
                let registry = self.registry.read();
                self.matcher.match_rules(&registry, scope, &text)
            };
            info!(scope = %scope, count = matched.len(), "rules triggered");

            for rule in &matched {
                if self.should_fire(rule, &ctx) {
                    self.execute(rule, &ctx).await;
                }
            }
        }
        .instrument(span)
        .await;
    }

    /// Evaluates a matched rule's guard conditions.
    ///
    /// The mention requirement only applies inside groups; a non-group
    /// delivery forces it off. The rule fires iff the effective mention
    /// requirement equals the context's mentioned flag and the sender
    /// filter (when set) names the context's sender. Mismatches are an
    /// expected control path, logged at debug level.
    pub fn should_fire(&self, rule: &Rule, ctx: &MessageContext) -> bool {
        let wants_mention = rule.requires_mention() && ctx.is_group();
        if wants_mention != ctx.mentioned() {
            debug!(
                rule = rule.name(),
                rule_mention = wants_mention,
                mentioned = ctx.mentioned(),
                "mention guard mismatch, skipping"
            );
            return false;
        }

        if let Some(required) = rule.required_sender()
            && required != ctx.sender_name()
        {
            debug!(
                rule = rule.name(),
                required,
                sender = ctx.sender_name(),
                "sender guard mismatch, skipping"
            );
            return false;
        }

        true
    }

    /// Runs one rule's handler and sends the action its reply maps to.
    pub async fn execute(&self, rule: &Rule, ctx: &Arc<MessageContext>) {
        info!(rule = rule.name(), "firing rule handler");

        let call = rule.handler().call(Arc::clone(ctx));
        let result = match self.handler_timeout {
            Some(limit) => match timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        rule = rule.name(),
                        limit_ms = limit.as_millis() as u64,
                        "handler timed out, abandoning"
                    );
                    return;
                }
            },
            None => call.await,
        };

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(rule = rule.name(), error = %e, "handler violated its contract");
                return;
            }
        };

        match Action::from(reply) {
            Action::Text(body) => {
                debug!(rule = rule.name(), reply = %body, "sending text reply");
                self.send(ctx, OutboundMessage::Text(body)).await;
            }
            Action::Image(path) => {
                debug!(rule = rule.name(), path = %path.display(), "sending image reply");
                self.send(ctx, OutboundMessage::Image(path)).await;
            }
            Action::Unsupported { kind } => {
                debug!(rule = rule.name(), kind = %kind, "unsupported reply kind, nothing sent");
            }
        }
    }

    /// Sends one outbound message, recovering failures at this boundary.
    async fn send(&self, ctx: &MessageContext, message: OutboundMessage) {
        if let Err(e) = self.client.send(ctx.reply_target(), &message).await {
            error!(target = ctx.reply_target(), error = %e, "failed to send reply");
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("nick_name", &self.matcher.nick_name())
            .field("handler_timeout", &self.handler_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::error::{ClientError, ClientResult, HandlerError};
    use crate::foundation::message::{Contact, InboundMessage, Profile};
    use crate::foundation::reply::Reply;
    use crate::foundation::rule::{Scope, ScopeSet, into_handler};
    use crate::integration::client::{ChatClient, EventIntake, LoginOptions};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::path::PathBuf;

    const BOT_NICK: &str = "brazebot";

    /// Client stub that records every outbound send.
    #[derive(Default)]
    struct MockClient {
        sent: Mutex<Vec<(String, OutboundMessage)>>,
        fail_sends: bool,
    }

    impl MockClient {
        fn sent(&self) -> Vec<(String, OutboundMessage)> {
            self.sent.lock().clone()
        }
    }

    #[async_trait]
    impl ChatClient for MockClient {
        async fn login(&self, _options: &LoginOptions) -> ClientResult<Profile> {
            Ok(Profile::new("id", BOT_NICK))
        }

        async fn lookup_contact(&self, _id: &str) -> ClientResult<Option<Contact>> {
            Ok(None)
        }

        async fn send(&self, target: &str, message: &OutboundMessage) -> ClientResult<()> {
            if self.fail_sends {
                return Err(ClientError::Send("wire down".to_string()));
            }
            self.sent.lock().push((target.to_string(), message.clone()));
            Ok(())
        }

        async fn run_event_loop(&self, _intake: Arc<dyn EventIntake>) -> ClientResult<()> {
            Ok(())
        }
    }

    fn dispatcher_with(
        client: Arc<MockClient>,
        setup: impl FnOnce(&mut RuleRegistry),
    ) -> Dispatcher {
        let mut registry = RuleRegistry::new();
        setup(&mut registry);
        Dispatcher::new(
            Matcher::new(BOT_NICK),
            Arc::new(RwLock::new(registry)),
            client,
        )
    }

    fn private_ctx(text: &str, sender: &str) -> Arc<MessageContext> {
        let event = InboundMessage {
            reply_target: "peer".to_string(),
            sender_id: "u1".to_string(),
            sender_alias: None,
            self_alias: None,
            text: text.to_string(),
            mentioned: false,
        };
        Arc::new(MessageContext::new(event, false, sender))
    }

    fn group_ctx(text: &str, sender: &str, mentioned: bool) -> Arc<MessageContext> {
        let event = InboundMessage {
            reply_target: "room".to_string(),
            sender_id: "u1".to_string(),
            sender_alias: Some(sender.to_string()),
            self_alias: None,
            text: text.to_string(),
            mentioned,
        };
        Arc::new(MessageContext::new(event, true, sender))
    }

    #[tokio::test]
    async fn text_reply_sends_exactly_one_text() {
        let client = Arc::new(MockClient::default());
        let dispatcher = dispatcher_with(Arc::clone(&client), |registry| {
            registry
                .register(
                    ScopeSet::from(Scope::Private),
                    "hi",
                    Rule::new("hi", into_handler(|_ctx| async { "hi" })),
                )
                .unwrap();
        });

        dispatcher.dispatch(private_ctx("hi there", "alice")).await;

        assert_eq!(
            client.sent(),
            vec![("peer".to_string(), OutboundMessage::Text("hi".to_string()))]
        );
    }

    #[tokio::test]
    async fn image_pair_sends_exactly_one_image() {
        let client = Arc::new(MockClient::default());
        let dispatcher = dispatcher_with(Arc::clone(&client), |registry| {
            registry
                .register(
                    ScopeSet::from(Scope::Private),
                    "photo",
                    Rule::new("photo", into_handler(|_ctx| async { ("image", "/tmp/a.png") })),
                )
                .unwrap();
        });

        dispatcher.dispatch(private_ctx("photo please", "alice")).await;

        assert_eq!(
            client.sent(),
            vec![(
                "peer".to_string(),
                OutboundMessage::Image(PathBuf::from("/tmp/a.png"))
            )]
        );
    }

    #[tokio::test]
    async fn unsupported_kind_sends_nothing() {
        let client = Arc::new(MockClient::default());
        let dispatcher = dispatcher_with(Arc::clone(&client), |registry| {
            registry
                .register(
                    ScopeSet::from(Scope::Private),
                    "clip",
                    Rule::new("clip", into_handler(|_ctx| async { ("video", "clip.mp4") })),
                )
                .unwrap();
        });

        dispatcher.dispatch(private_ctx("clip", "alice")).await;

        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn handler_error_skips_send_but_not_other_rules() {
        let client = Arc::new(MockClient::default());
        let dispatcher = dispatcher_with(Arc::clone(&client), |registry| {
            let scopes = ScopeSet::from(Scope::Private);
            registry
                .register(
                    scopes,
                    "go",
                    Rule::new(
                        "broken",
                        into_handler(|_ctx| async {
                            Err::<Reply, _>(HandlerError::Contract("not a reply".to_string()))
                        }),
                    ),
                )
                .unwrap();
            registry
                .register(
                    scopes,
                    "go",
                    Rule::new("working", into_handler(|_ctx| async { "done" })),
                )
                .unwrap();
        });

        dispatcher.dispatch(private_ctx("go", "alice")).await;

        assert_eq!(
            client.sent(),
            vec![("peer".to_string(), OutboundMessage::Text("done".to_string()))]
        );
    }

    #[tokio::test]
    async fn duplicate_registrations_both_fire() {
        let client = Arc::new(MockClient::default());
        let dispatcher = dispatcher_with(Arc::clone(&client), |registry| {
            let scopes = ScopeSet::from(Scope::Private);
            registry
                .register(scopes, "^twice$", Rule::new("a", into_handler(|_ctx| async { "one" })))
                .unwrap();
            registry
                .register(scopes, "^twice$", Rule::new("b", into_handler(|_ctx| async { "two" })))
                .unwrap();
        });

        dispatcher.dispatch(private_ctx("twice", "alice")).await;

        let bodies: Vec<_> = client
            .sent()
            .into_iter()
            .map(|(_, m)| match m {
                OutboundMessage::Text(body) => body,
                other => panic!("unexpected payload: {other:?}"),
            })
            .collect();
        assert_eq!(bodies, ["one", "two"]);
    }

    #[tokio::test]
    async fn mention_guard_skips_unmentioned_group_message() {
        let client = Arc::new(MockClient::default());
        let dispatcher = dispatcher_with(Arc::clone(&client), |registry| {
            registry
                .register(
                    ScopeSet::from(Scope::Group),
                    "^ping$",
                    Rule::new("ping", into_handler(|_ctx| async { "pong" }))
                        .require_mention(true),
                )
                .unwrap();
        });

        dispatcher.dispatch(group_ctx("ping", "alice", false)).await;
        assert!(client.sent().is_empty());

        dispatcher.dispatch(group_ctx("ping", "alice", true)).await;
        assert_eq!(client.sent().len(), 1);
    }

    #[tokio::test]
    async fn mention_requirement_is_forced_off_outside_groups() {
        let client = Arc::new(MockClient::default());
        let dispatcher = dispatcher_with(Arc::clone(&client), |registry| {
            registry
                .register(
                    ScopeSet::from(Scope::Private),
                    "^ping$",
                    Rule::new("ping", into_handler(|_ctx| async { "pong" }))
                        .require_mention(true),
                )
                .unwrap();
        });

        dispatcher.dispatch(private_ctx("ping", "alice")).await;

        assert_eq!(client.sent().len(), 1);
    }

    #[tokio::test]
    async fn sender_guard_filters_by_display_name() {
        let client = Arc::new(MockClient::default());
        let dispatcher = dispatcher_with(Arc::clone(&client), |registry| {
            registry
                .register(
                    ScopeSet::from(Scope::Private),
                    "secret",
                    Rule::new("secret", into_handler(|_ctx| async { "granted" }))
                        .from_sender("alice"),
                )
                .unwrap();
        });

        dispatcher.dispatch(private_ctx("secret", "bob")).await;
        assert!(client.sent().is_empty());

        dispatcher.dispatch(private_ctx("secret", "alice")).await;
        assert_eq!(client.sent().len(), 1);
    }

    #[tokio::test]
    async fn unicode_prefix_pattern_fires_once() {
        let client = Arc::new(MockClient::default());
        let dispatcher = dispatcher_with(Arc::clone(&client), |registry| {
            registry
                .register(
                    ScopeSet::from(Scope::Private),
                    "你好",
                    Rule::new("greet", into_handler(|_ctx| async { "你好！" })),
                )
                .unwrap();
        });

        dispatcher.dispatch(private_ctx("你好，there", "alice")).await;

        assert_eq!(client.sent().len(), 1);
    }

    #[tokio::test]
    async fn uppercase_rule_produces_transformed_payload() {
        let client = Arc::new(MockClient::default());
        let dispatcher = dispatcher_with(Arc::clone(&client), |registry| {
            registry
                .register(
                    ScopeSet::from(Scope::Private),
                    "大写:[a-zA-Z]*$",
                    Rule::new(
                        "upper",
                        into_handler(|ctx: Arc<MessageContext>| async move {
                            ctx.text()
                                .strip_prefix("大写:")
                                .unwrap_or_default()
                                .to_uppercase()
                        }),
                    ),
                )
                .unwrap();
        });

        dispatcher.dispatch(private_ctx("大写:abc", "alice")).await;

        assert_eq!(
            client.sent(),
            vec![("peer".to_string(), OutboundMessage::Text("ABC".to_string()))]
        );
    }

    #[tokio::test]
    async fn failed_send_does_not_abort_remaining_rules() {
        let client = Arc::new(MockClient {
            fail_sends: true,
            ..Default::default()
        });
        let fired = Arc::new(Mutex::new(0usize));
        let dispatcher = dispatcher_with(Arc::clone(&client), |registry| {
            let scopes = ScopeSet::from(Scope::Private);
            for name in ["first", "second"] {
                let fired = Arc::clone(&fired);
                registry
                    .register(
                        scopes,
                        "go",
                        Rule::new(
                            name,
                            into_handler(move |_ctx| {
                                let fired = Arc::clone(&fired);
                                async move {
                                    *fired.lock() += 1;
                                    "reply"
                                }
                            }),
                        ),
                    )
                    .unwrap();
            }
        });

        dispatcher.dispatch(private_ctx("go", "alice")).await;

        // Both handlers ran even though every send failed.
        assert_eq!(*fired.lock(), 2);
        assert!(client.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_handler_is_abandoned_on_timeout() {
        let client = Arc::new(MockClient::default());
        let mut registry = RuleRegistry::new();
        let scopes = ScopeSet::from(Scope::Private);
        registry
            .register(
                scopes,
                "slow",
                Rule::new(
                    "slow",
                    into_handler(|_ctx| async {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        "late"
                    }),
                ),
            )
            .unwrap();
        registry
            .register(scopes, "slow", Rule::new("fast", into_handler(|_ctx| async { "fast" })))
            .unwrap();

        let dispatcher = Dispatcher::new(
            Matcher::new(BOT_NICK),
            Arc::new(RwLock::new(registry)),
            Arc::clone(&client) as BoxedClient,
        )
        .with_handler_timeout(Duration::from_secs(1));

        dispatcher.dispatch(private_ctx("slow", "alice")).await;

        assert_eq!(
            client.sent(),
            vec![("peer".to_string(), OutboundMessage::Text("fast".to_string()))]
        );
    }

    #[tokio::test]
    async fn concurrent_dispatches_keep_contexts_isolated() {
        let client = Arc::new(MockClient::default());
        let dispatcher = Arc::new(dispatcher_with(Arc::clone(&client), |registry| {
            registry
                .register(
                    ScopeSet::from(Scope::Private),
                    "echo:",
                    Rule::new(
                        "echo",
                        into_handler(|ctx: Arc<MessageContext>| async move {
                            // Yield so the two dispatch units interleave.
                            tokio::task::yield_now().await;
                            format!("{}|{}", ctx.sender_name(), ctx.text())
                        }),
                    ),
                )
                .unwrap();
        }));

        let event = |target: &str, sender: &str, text: &str| {
            let event = InboundMessage {
                reply_target: target.to_string(),
                sender_id: sender.to_string(),
                sender_alias: None,
                self_alias: None,
                text: text.to_string(),
                mentioned: false,
            };
            Arc::new(MessageContext::new(event, false, sender))
        };

        let first = tokio::spawn({
            let dispatcher = Arc::clone(&dispatcher);
            let ctx = event("p1", "alice", "echo:one");
            async move { dispatcher.dispatch(ctx).await }
        });
        let second = tokio::spawn({
            let dispatcher = Arc::clone(&dispatcher);
            let ctx = event("p2", "bob", "echo:two");
            async move { dispatcher.dispatch(ctx).await }
        });
        let (a, b) = tokio::join!(first, second);
        a.unwrap();
        b.unwrap();

        let mut sent = client.sent();
        sent.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            sent,
            vec![
                ("p1".to_string(), OutboundMessage::Text("alice|echo:one".to_string())),
                ("p2".to_string(), OutboundMessage::Text("bob|echo:two".to_string())),
            ]
        );
    }
}
