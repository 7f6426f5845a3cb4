//! Fluent construction of [`FilterSet`] trees.
//!
//! # Wildcards inside OR nodes
//!
//! [`FilterSetBuilder::rule`] appends every rule a condition expands to
//! directly to the current node. A wildcard such as `"foo*bar"` becomes two
//! rules, so under an OR node it matches anything that begins with `foo`
//! *or* ends with `bar`. Nest an explicit AND child when the pattern must
//! hold as one unit:
//!
//! ```
//! use sifter_filter::{FilterSetBuilder, StringOp};
//!
//! let set = FilterSetBuilder::or()
//!     .and_set(|b| b.rule(10, StringOp::Wildcard, "foo*bar"))
//!     .rule(11, StringOp::Equals, "baz")
//!     .build();
//! assert_eq!(set.total_predicates(), 3);
//! ```
//!
//! The grouped helpers ([`or_rules`](FilterSetBuilder::or_rules),
//! [`or_values`](FilterSetBuilder::or_values) and their AND counterparts)
//! do this nesting themselves.

use sifter_convert::Value;
use sifter_params::ParameterId;

use crate::factory::RuleFactory;
use crate::op::StringOp;
use crate::rule::FilterRule;
use crate::set::{FilterSet, Logic};
use crate::value::StorageKind;

/// Builder for a [`FilterSet`] node and its descendants.
///
/// Conditions the [`RuleFactory`] cannot turn into rules are skipped.
///
/// # Example
///
/// ```
/// use sifter_filter::{FilterSetBuilder, StringOp};
///
/// // 83 = "D" and (80 = "A" or (81 = "B" and 82 = "C"))
/// let set = FilterSetBuilder::and()
///     .or_set(|b| {
///         b.rule(80, StringOp::Equals, "A")
///             .and_set(|b| b.rule(81, StringOp::Equals, "B").rule(82, StringOp::Equals, "C"))
///     })
///     .rule(83, StringOp::Equals, "D")
///     .build();
/// assert_eq!(set.total_predicates(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct FilterSetBuilder {
    factory: RuleFactory,
    set: FilterSet,
}

impl Default for FilterSetBuilder {
    fn default() -> Self {
        Self::and()
    }
}

impl FilterSetBuilder {
    /// Creates a builder with the default factory.
    pub fn new(logic: Logic) -> Self {
        Self::with_factory(RuleFactory::default(), logic)
    }

    pub fn and() -> Self {
        Self::new(Logic::And)
    }

    pub fn or() -> Self {
        Self::new(Logic::Or)
    }

    /// Creates a builder whose rules come from `factory`.
    pub fn with_factory(factory: RuleFactory, logic: Logic) -> Self {
        FilterSetBuilder {
            factory,
            set: FilterSet::new(logic),
        }
    }

    pub fn factory(&self) -> &RuleFactory {
        &self.factory
    }

    // ========================================================================
    // Conditions on the current node
    // ========================================================================

    /// Adds the rules for one condition to this node.
    pub fn rule(
        mut self,
        param: impl Into<ParameterId>,
        op: StringOp,
        value: impl Into<Value>,
    ) -> Self {
        self.add(&param.into(), op, &value.into(), false);
        self
    }

    /// Adds one condition against an attribute of known storage kind.
    ///
    /// The comparand is converted to the storage kind first; see
    /// [`RuleFactory::create_typed_rules`].
    pub fn typed_rule(
        mut self,
        param: impl Into<ParameterId>,
        storage: StorageKind,
        op: StringOp,
        value: impl Into<Value>,
    ) -> Self {
        let param = param.into();
        if let Some(rules) = self
            .factory
            .create_typed_rules(&param, storage, op, &value.into())
        {
            self.set.rules_extend(rules);
        }
        self
    }

    /// Adds a prebuilt rule.
    pub fn push(mut self, rule: FilterRule) -> Self {
        self.set.push_rule(rule);
        self
    }

    /// Adds several conditions to this node.
    pub fn rules<I, P, V>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = (P, StringOp, V)>,
        P: Into<ParameterId>,
        V: Into<Value>,
    {
        for (param, op, value) in conditions {
            self.add(&param.into(), op, &value.into(), false);
        }
        self
    }

    // ========================================================================
    // Nested sets
    // ========================================================================

    /// Adds an OR child configured by `configure`.
    pub fn or_set<F>(self, configure: F) -> Self
    where
        F: FnOnce(FilterSetBuilder) -> FilterSetBuilder,
    {
        self.nested(Logic::Or, configure)
    }

    /// Adds an AND child configured by `configure`.
    pub fn and_set<F>(self, configure: F) -> Self
    where
        F: FnOnce(FilterSetBuilder) -> FilterSetBuilder,
    {
        self.nested(Logic::And, configure)
    }

    /// Adds an OR child holding the given conditions.
    pub fn or_rules<I, P, V>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = (P, StringOp, V)>,
        P: Into<ParameterId>,
        V: Into<Value>,
    {
        self.grouped(Logic::Or, conditions)
    }

    /// Adds an AND child holding the given conditions.
    pub fn and_rules<I, P, V>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = (P, StringOp, V)>,
        P: Into<ParameterId>,
        V: Into<Value>,
    {
        self.grouped(Logic::And, conditions)
    }

    /// Adds an OR child matching `param op v` for any of `values`.
    pub fn or_values<I, V>(self, param: impl Into<ParameterId>, op: StringOp, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let param = param.into();
        self.grouped(
            Logic::Or,
            values.into_iter().map(|v| (param.clone(), op, v)),
        )
    }

    /// Adds an AND child matching `param op v` for all of `values`.
    pub fn and_values<I, V>(self, param: impl Into<ParameterId>, op: StringOp, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let param = param.into();
        self.grouped(
            Logic::And,
            values.into_iter().map(|v| (param.clone(), op, v)),
        )
    }

    /// Adds a prebuilt child set.
    pub fn child(mut self, set: FilterSet) -> Self {
        self.set.push_child(set);
        self
    }

    // ========================================================================
    // Finalize
    // ========================================================================

    pub fn build(self) -> FilterSet {
        self.set
    }

    fn nested<F>(mut self, logic: Logic, configure: F) -> Self
    where
        F: FnOnce(FilterSetBuilder) -> FilterSetBuilder,
    {
        let child = configure(Self::with_factory(self.factory.clone(), logic)).build();
        self.set.push_child(child);
        self
    }

    fn grouped<I, P, V>(mut self, logic: Logic, conditions: I) -> Self
    where
        I: IntoIterator<Item = (P, StringOp, V)>,
        P: Into<ParameterId>,
        V: Into<Value>,
    {
        let mut child = Self::with_factory(self.factory.clone(), logic);
        for (param, op, value) in conditions {
            child.add(&param.into(), op, &value.into(), true);
        }
        self.set.push_child(child.build());
        self
    }

    /// Expands one condition into this node. With `keep_together`, a
    /// multi-rule expansion under an OR node is wrapped in an AND child.
    fn add(&mut self, param: &ParameterId, op: StringOp, value: &Value, keep_together: bool) {
        let Some(rules) = self.factory.create_rules(param, op, value) else {
            return;
        };
        if keep_together && rules.len() > 1 && self.set.logic() == Logic::Or {
            let mut unit = FilterSet::and();
            unit.rules_extend(rules);
            self.set.push_child(unit);
        } else {
            self.set.rules_extend(rules);
        }
    }
}

impl FilterSet {
    fn rules_extend(&mut self, rules: Vec<FilterRule>) {
        for rule in rules {
            self.push_rule(rule);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set::Predicate;
    use sifter_convert::ElementId;

    #[test]
    fn rule_appends_wildcard_segments_to_current_node() {
        let set = FilterSetBuilder::or()
            .rule(1, StringOp::Wildcard, "foo*bar")
            .build();
        assert_eq!(set.rules().len(), 2);
        assert!(set.children().is_empty());
    }

    #[test]
    fn or_values_keeps_wildcards_together() {
        let set = FilterSetBuilder::and()
            .or_values(1, StringOp::Wildcard, ["foo*bar", "baz"])
            .build();
        let or = &set.children()[0];
        assert_eq!(or.logic(), Logic::Or);
        assert_eq!(or.rules().len(), 1);
        assert_eq!(or.children().len(), 1);
        assert_eq!(or.children()[0].logic(), Logic::And);
        assert_eq!(or.children()[0].rules().len(), 2);
    }

    #[test]
    fn and_values_appends() {
        let set = FilterSetBuilder::or()
            .and_values(1, StringOp::Contains, ["a", "b", "c"])
            .build();
        let and = &set.children()[0];
        assert_eq!(and.logic(), Logic::And);
        assert_eq!(and.rules().len(), 3);
    }

    #[test]
    fn unsupported_conditions_are_skipped() {
        let set = FilterSetBuilder::and()
            .rule(1, StringOp::Less, ElementId(4))
            .rule(2, StringOp::Equals, Value::Null)
            .rule(3, StringOp::Equals, 5)
            .build();
        assert_eq!(set.total_predicates(), 1);
    }

    #[test]
    fn star_alone_adds_nothing() {
        let set = FilterSetBuilder::and()
            .rule(1, StringOp::Wildcard, "*")
            .build();
        assert!(set.is_empty());
        assert_eq!(set.compile(), Predicate::AcceptAll);
    }

    #[test]
    fn rules_and_grouped_rules() {
        let set = FilterSetBuilder::and()
            .rules([(1, StringOp::Equals, "a"), (2, StringOp::Equals, "b")])
            .or_rules([(3, StringOp::Equals, "c"), (4, StringOp::Equals, "d")])
            .and_rules([(5, StringOp::Equals, "e")])
            .build();
        assert_eq!(set.rules().len(), 2);
        assert_eq!(set.children().len(), 2);
        assert_eq!(set.total_predicates(), 5);
    }

    #[test]
    fn child_and_push() {
        let inner = FilterSetBuilder::or().rule(1, StringOp::Equals, "x").build();
        let rule = FilterRule::integer(ParameterId::from(2), crate::op::ValueOp::Equals, 3);
        let set = FilterSetBuilder::and().child(inner).push(rule).build();
        assert_eq!(set.children().len(), 1);
        assert_eq!(set.rules().len(), 1);
    }

    #[test]
    fn typed_rule_converts() {
        let set = FilterSetBuilder::and()
            .typed_rule(1, StorageKind::Integer, StringOp::Equals, "12")
            .build();
        assert_eq!(
            set.rules()[0],
            FilterRule::integer(ParameterId::from(1), crate::op::ValueOp::Equals, 12)
        );
    }
}
