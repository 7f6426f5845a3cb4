//! Filter set tree and its compiled predicate.
//!
//! A [`FilterSet`] is an owned tree: each node holds a [`Logic`], a list of
//! rules and a list of child sets. Compiling it yields a [`Predicate`], the
//! evaluatable form:
//!
//! ```text
//! zero predicates, transitively → AcceptAll
//! exactly one predicate         → that predicate (node logic ignored)
//! otherwise                     → All(..) for And, Any(..) for Or
//! ```
//!
//! Child sets that contain no predicates are dropped during compilation, so
//! an empty child never turns an `Or` into accept-all.

use std::fmt;

use crate::rule::FilterRule;
use crate::value::Attributed;

/// How a node combines its rules and children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn as_str(self) -> &'static str {
        match self {
            Logic::And => "and",
            Logic::Or => "or",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tree of rules combined by AND/OR.
///
/// # Example
///
/// ```
/// use sifter_filter::{AttrValue, Attributed, FilterRule, FilterSet, StringOp};
/// use sifter_params::ParameterId;
///
/// struct Row(&'static str);
///
/// impl Attributed for Row {
///     fn attribute(&self, _: &ParameterId) -> AttrValue<'_> {
///         AttrValue::String(self.0)
///     }
/// }
///
/// let p = ParameterId::name("Mark").unwrap();
/// let mut set = FilterSet::or();
/// set.push_rule(FilterRule::string(p.clone(), StringOp::Equals, "a").unwrap());
/// set.push_rule(FilterRule::string(p, StringOp::Equals, "b").unwrap());
///
/// let rows = [Row("A"), Row("c"), Row("b")];
/// assert_eq!(set.count(&rows), 2);
/// assert!(FilterSet::and().matches(&Row("anything")));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSet {
    logic: Logic,
    rules: Vec<FilterRule>,
    children: Vec<FilterSet>,
}

impl FilterSet {
    /// Creates an empty set. An empty set accepts every record.
    pub fn new(logic: Logic) -> Self {
        FilterSet {
            logic,
            rules: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn and() -> Self {
        Self::new(Logic::And)
    }

    pub fn or() -> Self {
        Self::new(Logic::Or)
    }

    pub fn push_rule(&mut self, rule: FilterRule) {
        self.rules.push(rule);
    }

    pub fn push_child(&mut self, child: FilterSet) {
        self.children.push(child);
    }

    pub fn logic(&self) -> Logic {
        self.logic
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    pub fn children(&self) -> &[FilterSet] {
        &self.children
    }

    /// Number of rules in this node and all descendants.
    pub fn total_predicates(&self) -> usize {
        self.rules.len()
            + self
                .children
                .iter()
                .map(FilterSet::total_predicates)
                .sum::<usize>()
    }

    /// Returns `true` if the set holds no rules, transitively.
    pub fn is_empty(&self) -> bool {
        self.total_predicates() == 0
    }

    /// Compiles the tree into an evaluatable predicate.
    pub fn compile(&self) -> Predicate {
        let mut parts: Vec<Predicate> = self.rules.iter().cloned().map(Predicate::Rule).collect();
        parts.extend(
            self.children
                .iter()
                .map(FilterSet::compile)
                .filter(|p| !p.is_accept_all()),
        );

        match parts.len() {
            0 => Predicate::AcceptAll,
            1 => parts.remove(0),
            _ => match self.logic {
                Logic::And => Predicate::All(parts),
                Logic::Or => Predicate::Any(parts),
            },
        }
    }

    /// Evaluates the set against one record.
    ///
    /// Compiles on every call. Compile once with [`compile`](Self::compile)
    /// when evaluating many records.
    pub fn matches<T: Attributed + ?Sized>(&self, record: &T) -> bool {
        self.compile().evaluate(record)
    }

    /// Returns the records that match.
    pub fn filter<'a, T: Attributed>(&self, records: &'a [T]) -> Vec<&'a T> {
        let predicate = self.compile();
        records.iter().filter(|r| predicate.evaluate(*r)).collect()
    }

    /// Counts the records that match.
    pub fn count<T: Attributed>(&self, records: &[T]) -> usize {
        let predicate = self.compile();
        records.iter().filter(|r| predicate.evaluate(*r)).count()
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.compile())
    }
}

/// Compiled form of a [`FilterSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    AcceptAll,
    Rule(FilterRule),
    /// Left to right, stops at the first `false`.
    All(Vec<Predicate>),
    /// Left to right, stops at the first `true`.
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn evaluate<T: Attributed + ?Sized>(&self, record: &T) -> bool {
        match self {
            Predicate::AcceptAll => true,
            Predicate::Rule(rule) => rule.evaluate(record),
            Predicate::All(parts) => parts.iter().all(|p| p.evaluate(record)),
            Predicate::Any(parts) => parts.iter().any(|p| p.evaluate(record)),
        }
    }

    pub fn is_accept_all(&self) -> bool {
        matches!(self, Predicate::AcceptAll)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::AcceptAll => f.write_str("*"),
            Predicate::Rule(rule) => write!(f, "{rule}"),
            Predicate::All(parts) => write_joined(f, parts, "and"),
            Predicate::Any(parts) => write_joined(f, parts, "or"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Predicate], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, p) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, " {sep} ")?;
        }
        write!(f, "{p}")?;
    }
    f.write_str(")")
}
