//! Rule storage with scope-qualified lookup.
//!
//! The registry keeps one insertion-ordered bucket list per scope. Each
//! bucket maps a pattern string to the rules registered under it; a rule
//! whose scope set names several scopes is appended to each of them. The
//! pattern is compiled once, at registration time, so a malformed pattern
//! fails loudly instead of silently matching nothing later.

use regex::Regex;
use tracing::debug;

use crate::foundation::error::{RegistryError, RegistryResult};
use crate::foundation::rule::{Rule, Scope, ScopeSet};

/// One pattern and the ordered rules registered under it.
pub struct PatternBucket {
    /// The pattern as passed to registration.
    pattern: String,
    /// The pattern compiled with a start-of-text anchor.
    regex: Regex,
    /// Rules in registration order.
    rules: Vec<Rule>,
}

impl PatternBucket {
    /// Returns the pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the rules in registration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether the pattern matches at the start of `text`.
    ///
    /// This is a prefix match: a pattern that only covers the beginning of
    /// the text still counts.
    pub fn matches_prefix(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl std::fmt::Debug for PatternBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternBucket")
            .field("pattern", &self.pattern)
            .field("rule_count", &self.rules.len())
            .finish()
    }
}

/// Compiles a rule pattern anchored at the start of the subject text.
///
/// Wrapping in a non-capturing group keeps alternations intact:
/// `a|b` anchors both branches, not just the first.
fn compile_prefix(pattern: &str) -> RegistryResult<Regex> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| RegistryError::InvalidPattern {
        pattern: pattern.to_string(),
        source: Box::new(source),
    })
}

/// Scope-qualified rule storage.
///
/// Registration is expected to complete before the event loop starts; the
/// registry itself is plain data and the bot façade wraps it in a
/// read/write lock for the read-many dispatch phase.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    private: Vec<PatternBucket>,
    group: Vec<PatternBucket>,
    own: Vec<PatternBucket>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule under every scope in `scopes`.
    ///
    /// The pattern is compiled here; a malformed pattern fails the whole
    /// registration and nothing is stored. Duplicate patterns are not
    /// deduplicated: each registration appends, and all appended rules
    /// fire on a match.
    pub fn register(&mut self, scopes: ScopeSet, pattern: &str, rule: Rule) -> RegistryResult<()> {
        let regex = compile_prefix(pattern)?;

        for scope in scopes.iter() {
            let buckets = self.buckets_mut(scope);
            match buckets.iter_mut().find(|b| b.pattern == pattern) {
                Some(bucket) => bucket.rules.push(rule.clone()),
                None => buckets.push(PatternBucket {
                    pattern: pattern.to_string(),
                    regex: regex.clone(),
                    rules: vec![rule.clone()],
                }),
            }
            debug!(scope = %scope, pattern, rule = rule.name(), "rule registered");
        }

        Ok(())
    }

    /// Returns the pattern buckets registered under `scope`, in
    /// registration order.
    pub fn rules_for(&self, scope: Scope) -> &[PatternBucket] {
        match scope {
            Scope::Private => &self.private,
            Scope::Group => &self.group,
            Scope::Own => &self.own,
        }
    }

    /// Total number of rule registrations across all scopes.
    pub fn rule_count(&self) -> usize {
        [&self.private, &self.group, &self.own]
            .into_iter()
            .flatten()
            .map(|b| b.rules.len())
            .sum()
    }

    /// Whether no rule is registered in any scope.
    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }

    fn buckets_mut(&mut self, scope: Scope) -> &mut Vec<PatternBucket> {
        match scope {
            Scope::Private => &mut self.private,
            Scope::Group => &mut self.group,
            Scope::Own => &mut self.own,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::rule::into_handler;

    fn noop_rule(name: &str) -> Rule {
        Rule::new(name, into_handler(|_ctx| async { "ok" }))
    }

    #[test]
    fn registers_into_every_named_scope() {
        let mut registry = RuleRegistry::new();
        let scopes = ScopeSet::new().with(Scope::Private).with(Scope::Group);
        registry.register(scopes, "^hello", noop_rule("hello")).unwrap();

        assert_eq!(registry.rules_for(Scope::Private).len(), 1);
        assert_eq!(registry.rules_for(Scope::Group).len(), 1);
        assert!(registry.rules_for(Scope::Own).is_empty());
        assert_eq!(registry.rule_count(), 2);
    }

    #[test]
    fn duplicate_patterns_keep_both_rules() {
        let mut registry = RuleRegistry::new();
        let scopes = ScopeSet::from(Scope::Private);
        registry.register(scopes, "ping", noop_rule("first")).unwrap();
        registry.register(scopes, "ping", noop_rule("second")).unwrap();

        let buckets = registry.rules_for(Scope::Private);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].rules().len(), 2);
        assert_eq!(buckets[0].rules()[0].name(), "first");
        assert_eq!(buckets[0].rules()[1].name(), "second");
    }

    #[test]
    fn malformed_pattern_fails_at_registration() {
        let mut registry = RuleRegistry::new();
        let err = registry
            .register(ScopeSet::from(Scope::Private), "(unclosed", noop_rule("bad"))
            .unwrap_err();

        assert!(matches!(err, RegistryError::InvalidPattern { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn buckets_preserve_registration_order() {
        let mut registry = RuleRegistry::new();
        let scopes = ScopeSet::from(Scope::Group);
        for pattern in ["zeta", "alpha", "mid"] {
            registry.register(scopes, pattern, noop_rule(pattern)).unwrap();
        }

        let order: Vec<_> = registry
            .rules_for(Scope::Group)
            .iter()
            .map(PatternBucket::pattern)
            .collect();
        assert_eq!(order, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn prefix_matching_is_anchored_at_start() {
        let mut registry = RuleRegistry::new();
        registry
            .register(ScopeSet::from(Scope::Private), "你好", noop_rule("greet"))
            .unwrap();

        let bucket = &registry.rules_for(Scope::Private)[0];
        assert!(bucket.matches_prefix("你好，there"));
        assert!(!bucket.matches_prefix("there 你好"));
    }
}
