use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;

use crate::models::{PatternKind, Rule};

/// A rule that matched a transaction, plus the text span that matched.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub rule: Rule,
    pub matched_text: String,
    pub category_id: i64,
}

struct CompiledRule {
    rule: Rule,
    // Some only for valid Regex-kind patterns; an invalid pattern compiles
    // to None and the rule never matches.
    regex: Option<Regex>,
}

fn compile(rule: &Rule) -> Option<Regex> {
    if rule.kind != PatternKind::Regex {
        return None;
    }
    RegexBuilder::new(&rule.pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

/// Pure in-memory matcher. Holds rules priority-descending (stable — ties
/// keep insertion order) and no reference to the store.
pub struct RulesEngine {
    rules: Vec<CompiledRule>,
}

impl RulesEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut engine = RulesEngine {
            rules: rules
                .into_iter()
                .map(|rule| CompiledRule {
                    regex: compile(&rule),
                    rule,
                })
                .collect(),
        };
        engine.sort();
        engine
    }

    fn sort(&mut self) {
        // Stable, so equal priorities stay in insertion order.
        self.rules
            .sort_by_key(|c| std::cmp::Reverse(c.rule.priority));
    }

    /// First active rule (in priority order) matching the transaction.
    pub fn find_match(
        &self,
        description: &str,
        vendor_name: Option<&str>,
        amount: Decimal,
    ) -> Option<RuleMatch> {
        self.rules.iter().find_map(|compiled| {
            self.try_rule(compiled, description, vendor_name, amount)
        })
    }

    /// Every active matching rule in priority order, no short-circuit.
    /// Used for "similar transaction" batch suggestions.
    pub fn find_all_matches(
        &self,
        description: &str,
        vendor_name: Option<&str>,
        amount: Decimal,
    ) -> Vec<RuleMatch> {
        self.rules
            .iter()
            .filter_map(|compiled| self.try_rule(compiled, description, vendor_name, amount))
            .collect()
    }

    fn try_rule(
        &self,
        compiled: &CompiledRule,
        description: &str,
        vendor_name: Option<&str>,
        amount: Decimal,
    ) -> Option<RuleMatch> {
        let rule = &compiled.rule;
        if !rule.is_active || !amount_in_range(rule, amount) {
            return None;
        }
        let matched_text = check_pattern(compiled, description)
            .or_else(|| vendor_name.and_then(|vendor| check_pattern(compiled, vendor)))?;
        Some(RuleMatch {
            rule: rule.clone(),
            matched_text,
            category_id: rule.category_id,
        })
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(CompiledRule {
            regex: compile(&rule),
            rule,
        });
        self.sort();
    }

    /// Drops the rule and its compiled pattern.
    pub fn remove_rule(&mut self, rule_id: i64) {
        self.rules.retain(|c| c.rule.id != Some(rule_id));
    }

    pub fn replace_all(&mut self, rules: Vec<Rule>) {
        *self = RulesEngine::new(rules);
    }

    /// All rules in priority order.
    pub fn rules(&self) -> Vec<Rule> {
        self.rules.iter().map(|c| c.rule.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// Bounds are inclusive and compared against abs(amount); None means
// unbounded on that side.
fn amount_in_range(rule: &Rule, amount: Decimal) -> bool {
    let abs = amount.abs();
    if let Some(min) = rule.min_amount {
        if abs < min {
            return false;
        }
    }
    match rule.max_amount {
        Some(max) => abs <= max,
        None => true,
    }
}

fn check_pattern(compiled: &CompiledRule, text: &str) -> Option<String> {
    let rule = &compiled.rule;
    match rule.kind {
        PatternKind::Exact => {
            if text.to_uppercase() == rule.pattern.to_uppercase() {
                Some(text.to_string())
            } else {
                None
            }
        }
        PatternKind::Contains => {
            if text.to_uppercase().contains(&rule.pattern.to_uppercase()) {
                Some(rule.pattern.clone())
            } else {
                None
            }
        }
        PatternKind::Regex => compiled
            .regex
            .as_ref()
            .and_then(|re| re.find(text))
            .map(|m| m.as_str().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: i64, pattern: &str, kind: PatternKind, category_id: i64, priority: i64) -> Rule {
        let mut r = Rule::for_category(pattern, pattern, kind, category_id, priority);
        r.id = Some(id);
        r
    }

    fn amount(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_contains_matches_case_insensitively() {
        let engine = RulesEngine::new(vec![rule(1, "adobe", PatternKind::Contains, 7, 0)]);
        let m = engine
            .find_match("ADOBE CREATIVE CLOUD", None, amount("-52.99"))
            .unwrap();
        assert_eq!(m.category_id, 7);
        assert_eq!(m.matched_text, "adobe");
    }

    #[test]
    fn test_exact_requires_full_string() {
        let engine = RulesEngine::new(vec![rule(1, "netflix", PatternKind::Exact, 3, 0)]);
        assert!(engine.find_match("NETFLIX", None, amount("-15")).is_some());
        assert!(engine
            .find_match("NETFLIX.COM 1234", None, amount("-15"))
            .is_none());
    }

    #[test]
    fn test_exact_matched_text_is_input() {
        let engine = RulesEngine::new(vec![rule(1, "netflix", PatternKind::Exact, 3, 0)]);
        let m = engine.find_match("Netflix", None, amount("-15")).unwrap();
        assert_eq!(m.matched_text, "Netflix");
    }

    #[test]
    fn test_regex_matches_first_span() {
        let engine = RulesEngine::new(vec![rule(1, r"AWS.*\d+", PatternKind::Regex, 9, 0)]);
        let m = engine
            .find_match("Payment to aws services 12345 inc", None, amount("-120"))
            .unwrap();
        assert_eq!(m.matched_text, "aws services 12345");
    }

    #[test]
    fn test_invalid_regex_never_matches_and_never_errors() {
        let engine = RulesEngine::new(vec![
            rule(1, r"[unclosed", PatternKind::Regex, 9, 10),
            rule(2, "AWS", PatternKind::Contains, 4, 0),
        ]);
        let m = engine.find_match("AWS SERVICES", None, amount("-10")).unwrap();
        assert_eq!(m.category_id, 4);
    }

    #[test]
    fn test_priority_wins_over_insertion_order() {
        let engine = RulesEngine::new(vec![
            rule(1, "AMAZON", PatternKind::Contains, 1, 1),
            rule(2, "AMAZON", PatternKind::Contains, 2, 10),
        ]);
        let m = engine
            .find_match("AMAZON MARKETPLACE", None, amount("-30"))
            .unwrap();
        assert_eq!(m.category_id, 2);
    }

    #[test]
    fn test_equal_priority_keeps_insertion_order() {
        let engine = RulesEngine::new(vec![
            rule(1, "AMAZON", PatternKind::Contains, 1, 5),
            rule(2, "AMAZON", PatternKind::Contains, 2, 5),
        ]);
        let m = engine
            .find_match("AMAZON MARKETPLACE", None, amount("-30"))
            .unwrap();
        assert_eq!(m.category_id, 1);
    }

    #[test]
    fn test_inactive_rules_are_skipped() {
        let mut inactive = rule(1, "AMAZON", PatternKind::Contains, 1, 10);
        inactive.is_active = false;
        let engine = RulesEngine::new(vec![
            inactive,
            rule(2, "AMAZON", PatternKind::Contains, 2, 0),
        ]);
        let m = engine.find_match("AMAZON", None, amount("-30")).unwrap();
        assert_eq!(m.category_id, 2);
    }

    #[test]
    fn test_amount_bounds_use_abs_and_are_inclusive() {
        let mut bounded = rule(1, "UBER", PatternKind::Contains, 5, 0);
        bounded.min_amount = Some(amount("50"));
        let engine = RulesEngine::new(vec![bounded]);

        assert!(engine.find_match("UBER TRIP", None, amount("-75")).is_some());
        assert!(engine.find_match("UBER TRIP", None, amount("-50")).is_some());
        assert!(engine.find_match("UBER TRIP", None, amount("-25")).is_none());
    }

    #[test]
    fn test_amount_upper_bound() {
        let mut bounded = rule(1, "UBER", PatternKind::Contains, 5, 0);
        bounded.max_amount = Some(amount("100"));
        let engine = RulesEngine::new(vec![bounded]);

        assert!(engine.find_match("UBER TRIP", None, amount("-100")).is_some());
        assert!(engine.find_match("UBER TRIP", None, amount("-100.01")).is_none());
    }

    #[test]
    fn test_vendor_checked_after_description() {
        let engine = RulesEngine::new(vec![rule(1, "adobe", PatternKind::Contains, 7, 0)]);
        let m = engine
            .find_match("CARD PURCHASE 9921", Some("Adobe Inc"), amount("-52.99"))
            .unwrap();
        assert_eq!(m.category_id, 7);
        assert!(engine
            .find_match("CARD PURCHASE 9921", None, amount("-52.99"))
            .is_none());
    }

    #[test]
    fn test_find_all_matches_in_priority_order() {
        let engine = RulesEngine::new(vec![
            rule(1, "PAYMENT", PatternKind::Contains, 1, 1),
            rule(2, "PAYMENT", PatternKind::Contains, 2, 10),
            rule(3, "STRIPE", PatternKind::Contains, 3, 5),
        ]);
        let matches = engine.find_all_matches("STRIPE PAYMENT", None, amount("-9.99"));
        let categories: Vec<i64> = matches.iter().map(|m| m.category_id).collect();
        assert_eq!(categories, vec![2, 3, 1]);
    }

    #[test]
    fn test_find_all_matches_skips_out_of_range() {
        let mut bounded = rule(1, "PAYMENT", PatternKind::Contains, 1, 10);
        bounded.min_amount = Some(amount("500"));
        let engine = RulesEngine::new(vec![
            bounded,
            rule(2, "PAYMENT", PatternKind::Contains, 2, 0),
        ]);
        let matches = engine.find_all_matches("PAYMENT", None, amount("-9.99"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].category_id, 2);
    }

    #[test]
    fn test_add_rule_maintains_priority_order() {
        let mut engine = RulesEngine::new(vec![rule(1, "A", PatternKind::Contains, 1, 5)]);
        engine.add_rule(rule(2, "B", PatternKind::Contains, 2, 10));
        let priorities: Vec<i64> = engine.rules().iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![10, 5]);
    }

    #[test]
    fn test_remove_rule_evicts() {
        let mut engine = RulesEngine::new(vec![
            rule(1, "A", PatternKind::Contains, 1, 5),
            rule(2, "B", PatternKind::Contains, 2, 10),
        ]);
        engine.remove_rule(2);
        assert_eq!(engine.rules().len(), 1);
        assert!(engine.find_match("B", None, amount("-1")).is_none());
        // Removing an unknown id is a no-op.
        engine.remove_rule(42);
        assert_eq!(engine.rules().len(), 1);
    }

    #[test]
    fn test_replace_all_resets_rules_and_patterns() {
        let mut engine = RulesEngine::new(vec![rule(1, "OLD", PatternKind::Contains, 1, 0)]);
        engine.replace_all(vec![rule(2, r"NEW\d+", PatternKind::Regex, 2, 0)]);
        assert!(engine.find_match("OLD", None, amount("-1")).is_none());
        assert!(engine.find_match("NEW77", None, amount("-1")).is_some());
    }

    #[test]
    fn test_empty_engine_matches_nothing() {
        let engine = RulesEngine::new(Vec::new());
        assert!(engine.is_empty());
        assert!(engine.find_match("ANYTHING", None, amount("-1")).is_none());
        assert!(engine.find_all_matches("ANYTHING", None, amount("-1")).is_empty());
    }
}
