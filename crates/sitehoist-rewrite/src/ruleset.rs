//! Ordered rule sets.

use crate::rule::Rule;

/// An ordered sequence of rules. Each rule sees the previous rule's output.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    name: String,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create an empty, named rule set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Append a rule, builder style.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule over `content` in order.
    pub fn apply(&self, content: &str) -> String {
        self.rules
            .iter()
            .fold(content.to_string(), |text, rule| rule.apply(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rules_apply_in_order() {
        let forward = RuleSet::new("forward")
            .with_rule(Rule::literal("a", "b"))
            .with_rule(Rule::literal("b", "c"));
        let backward = RuleSet::new("backward")
            .with_rule(Rule::literal("b", "c"))
            .with_rule(Rule::literal("a", "b"));

        assert_eq!(forward.apply("ab"), "cc");
        assert_eq!(backward.apply("ab"), "bc");
    }

    #[test]
    fn with_rule_appends() {
        let rules = RuleSet::new("test");
        assert!(rules.is_empty());

        let rules = rules.with_rule(Rule::literal("x", "y"));

        assert_eq!(rules.len(), 1);
        assert_eq!(rules.name(), "test");
        assert!(matches!(rules.rules()[0], Rule::Literal { .. }));
    }
}
