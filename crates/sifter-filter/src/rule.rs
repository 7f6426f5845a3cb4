//! Atomic filter rules.
//!
//! A [`FilterRule`] is a single predicate: a parameter, a typed test, and a
//! comparand. Rules are immutable once built. They are normally produced by
//! the [`RuleFactory`](crate::RuleFactory), which picks the test kind from
//! the comparand's runtime type.

use std::borrow::Cow;
use std::fmt;

use sifter_convert::ElementId;
use sifter_params::ParameterId;

use crate::factory::DEFAULT_DOUBLE_TOLERANCE;
use crate::op::{StringOp, ValueOp};
use crate::value::{compare_with_tolerance, AttrValue, Attributed};

/// The typed test a rule applies.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleTest {
    /// Case-insensitive ordinal string test.
    String {
        op: StringOp,
        value: String,
        /// Upper-case folded comparand.
        folded: String,
    },
    /// Integer equality or ordering.
    Integer { op: ValueOp, value: i64 },
    /// Double equality or ordering within `epsilon`.
    Double {
        op: ValueOp,
        value: f64,
        epsilon: f64,
    },
    /// Reference equality. Only `Equals` and `NotEquals`.
    ElementId { op: ValueOp, value: ElementId },
}

/// A single filter predicate over one parameter.
///
/// # Example
///
/// ```
/// use sifter_filter::{AttrValue, FilterRule, StringOp};
/// use sifter_params::ParameterId;
///
/// let mark = ParameterId::name("Mark").unwrap();
/// let rule = FilterRule::string(mark, StringOp::BeginsWith, "d-").unwrap();
///
/// assert!(rule.matches(&AttrValue::String("D-101")));
/// assert!(!rule.matches(&AttrValue::String("W-101")));
/// assert!(!rule.matches(&AttrValue::None));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRule {
    param: ParameterId,
    test: RuleTest,
}

impl FilterRule {
    /// Creates a string rule.
    ///
    /// Returns `None` for [`StringOp::Wildcard`], which is not atomic. Use
    /// the rule factory to expand wildcard patterns.
    pub fn string(param: ParameterId, op: StringOp, value: impl Into<String>) -> Option<Self> {
        if op == StringOp::Wildcard {
            return None;
        }
        let value = value.into();
        let folded = fold(&value).into_owned();
        Some(FilterRule {
            param,
            test: RuleTest::String { op, value, folded },
        })
    }

    /// Creates an integer rule.
    pub fn integer(param: ParameterId, op: ValueOp, value: i64) -> Self {
        FilterRule {
            param,
            test: RuleTest::Integer { op, value },
        }
    }

    /// Creates a double rule with the given equality tolerance.
    pub fn double(param: ParameterId, op: ValueOp, value: f64, epsilon: f64) -> Self {
        FilterRule {
            param,
            test: RuleTest::Double { op, value, epsilon },
        }
    }

    /// Creates an element reference rule.
    ///
    /// Returns `None` for ordering operators: references have no order.
    pub fn element(param: ParameterId, op: ValueOp, value: ElementId) -> Option<Self> {
        if op.is_ordering() {
            return None;
        }
        Some(FilterRule {
            param,
            test: RuleTest::ElementId { op, value },
        })
    }

    /// The parameter this rule reads.
    pub fn param(&self) -> &ParameterId {
        &self.param
    }

    /// The typed test.
    pub fn test(&self) -> &RuleTest {
        &self.test
    }

    /// The operator, widened to [`StringOp`].
    pub fn op(&self) -> StringOp {
        match &self.test {
            RuleTest::String { op, .. } => *op,
            RuleTest::Integer { op, .. }
            | RuleTest::Double { op, .. }
            | RuleTest::ElementId { op, .. } => StringOp::from(*op),
        }
    }

    /// Evaluates this rule against a record.
    pub fn evaluate<T: Attributed + ?Sized>(&self, record: &T) -> bool {
        self.matches(&record.attribute(&self.param))
    }

    /// Evaluates this rule against an attribute value.
    ///
    /// A missing attribute or a value of an incompatible kind never
    /// matches, for negated operators too.
    pub fn matches(&self, attr: &AttrValue<'_>) -> bool {
        match (&self.test, attr) {
            (RuleTest::String { op, folded, .. }, AttrValue::String(s)) => {
                match_string(*op, &fold(s), folded)
            }

            (RuleTest::Integer { op, value }, AttrValue::Integer(n)) => {
                op.eval_ordering(n.cmp(value))
            }
            (RuleTest::Integer { op, value }, AttrValue::Double(n)) => {
                compare_with_tolerance(*n, *value as f64, DEFAULT_DOUBLE_TOLERANCE)
                    .is_some_and(|o| op.eval_ordering(o))
            }

            (RuleTest::Double { op, value, epsilon }, AttrValue::Double(n)) => {
                compare_with_tolerance(*n, *value, *epsilon).is_some_and(|o| op.eval_ordering(o))
            }
            (RuleTest::Double { op, value, epsilon }, AttrValue::Integer(n)) => {
                compare_with_tolerance(*n as f64, *value, *epsilon)
                    .is_some_and(|o| op.eval_ordering(o))
            }

            (RuleTest::ElementId { op, value }, AttrValue::ElementId(id)) => {
                op.eval_ordering(id.cmp(value))
            }

            // Missing attribute or kind mismatch
            _ => false,
        }
    }
}

/// Folds to upper case, ordinal-ignore-case style. Borrows when there is
/// nothing to fold.
fn fold(s: &str) -> Cow<'_, str> {
    if s.chars().any(char::is_lowercase) {
        Cow::Owned(s.to_uppercase())
    } else {
        Cow::Borrowed(s)
    }
}

fn match_string(op: StringOp, field: &str, pattern: &str) -> bool {
    match op {
        StringOp::Contains => field.contains(pattern),
        StringOp::NotContains => !field.contains(pattern),
        StringOp::BeginsWith => field.starts_with(pattern),
        StringOp::NotBeginsWith => !field.starts_with(pattern),
        StringOp::EndsWith => field.ends_with(pattern),
        StringOp::NotEndsWith => !field.ends_with(pattern),
        StringOp::Wildcard => false,
        other => other
            .as_value_op()
            .is_some_and(|op| op.eval_ordering(field.cmp(pattern))),
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.test {
            RuleTest::String { op, value, .. } => write!(f, "{} {} {:?}", self.param, op, value),
            RuleTest::Integer { op, value } => write!(f, "{} {} {}", self.param, op, value),
            RuleTest::Double { op, value, epsilon } => {
                write!(f, "{} {} {} (±{})", self.param, op, value, epsilon)
            }
            RuleTest::ElementId { op, value } => write!(f, "{} {} #{}", self.param, op, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(name: &str) -> ParameterId {
        ParameterId::name(name).unwrap()
    }

    #[test]
    fn wildcard_is_not_atomic() {
        assert!(FilterRule::string(pid("a"), StringOp::Wildcard, "x*y").is_none());
    }

    #[test]
    fn string_ops_ignore_case() {
        let eq = FilterRule::string(pid("a"), StringOp::Equals, "bar").unwrap();
        assert!(eq.matches(&AttrValue::String("bar")));
        assert!(eq.matches(&AttrValue::String("BAR")));
        assert!(!eq.matches(&AttrValue::String("baz")));

        let ends = FilterRule::string(pid("a"), StringOp::EndsWith, "BAR").unwrap();
        assert!(ends.matches(&AttrValue::String("foobar")));

        let not_contains = FilterRule::string(pid("a"), StringOp::NotContains, "o").unwrap();
        assert!(not_contains.matches(&AttrValue::String("bar")));
        assert!(!not_contains.matches(&AttrValue::String("FOO")));
    }

    #[test]
    fn string_ordering_is_ordinal() {
        let lt = FilterRule::string(pid("a"), StringOp::Less, "m").unwrap();
        assert!(lt.matches(&AttrValue::String("Alpha")));
        assert!(!lt.matches(&AttrValue::String("zulu")));
    }

    #[test]
    fn string_ordering_folds_to_upper_case() {
        // '_' sits between the upper and lower case letters.
        let gt = FilterRule::string(pid("a"), StringOp::Greater, "a").unwrap();
        assert!(gt.matches(&AttrValue::String("_")));
        let lt = FilterRule::string(pid("a"), StringOp::Less, "_").unwrap();
        assert!(lt.matches(&AttrValue::String("zulu")));
        assert!(matches!(fold("ABC"), Cow::Borrowed(_)));
    }

    #[test]
    fn missing_or_mismatched_never_matches() {
        let ne = FilterRule::string(pid("a"), StringOp::NotEquals, "x").unwrap();
        assert!(!ne.matches(&AttrValue::None));
        assert!(!ne.matches(&AttrValue::Integer(3)));

        let int = FilterRule::integer(pid("a"), ValueOp::Equals, 3);
        assert!(!int.matches(&AttrValue::String("3")));
    }

    #[test]
    fn integer_rules() {
        let gte = FilterRule::integer(pid("a"), ValueOp::GreaterOrEqual, 10);
        assert!(gte.matches(&AttrValue::Integer(10)));
        assert!(gte.matches(&AttrValue::Integer(11)));
        assert!(!gte.matches(&AttrValue::Integer(9)));
        assert!(gte.matches(&AttrValue::Double(10.5)));
    }

    #[test]
    fn integer_rules_on_doubles_use_tolerance() {
        let eq = FilterRule::integer(pid("w"), ValueOp::Equals, 3);
        assert!(eq.matches(&AttrValue::Double(3.0000001)));
        assert!(!eq.matches(&AttrValue::Double(3.01)));

        let lt = FilterRule::integer(pid("w"), ValueOp::Less, 3);
        assert!(!lt.matches(&AttrValue::Double(2.9999999)));
        assert!(lt.matches(&AttrValue::Double(2.5)));
    }

    #[test]
    fn double_rules_use_tolerance() {
        let eq = FilterRule::double(pid("w"), ValueOp::Equals, 2.5, 1e-6);
        assert!(eq.matches(&AttrValue::Double(2.5000001)));
        assert!(!eq.matches(&AttrValue::Double(2.51)));
        assert!(eq.matches(&AttrValue::Double(2.5)));

        let gt = FilterRule::double(pid("w"), ValueOp::Greater, 2.5, 1e-6);
        assert!(!gt.matches(&AttrValue::Double(2.5000001)));
        assert!(gt.matches(&AttrValue::Double(2.6)));
        assert!(gt.matches(&AttrValue::Integer(3)));
        assert!(!gt.matches(&AttrValue::Double(f64::NAN)));
    }

    #[test]
    fn element_rules() {
        assert!(FilterRule::element(pid("lvl"), ValueOp::Greater, ElementId(1)).is_none());

        let ne = FilterRule::element(pid("lvl"), ValueOp::NotEquals, ElementId(7)).unwrap();
        assert!(ne.matches(&AttrValue::ElementId(ElementId(8))));
        assert!(!ne.matches(&AttrValue::ElementId(ElementId(7))));
        assert!(!ne.matches(&AttrValue::Integer(8)));
    }

    #[test]
    fn op_widens() {
        let rule = FilterRule::integer(pid("a"), ValueOp::Less, 1);
        assert_eq!(rule.op(), StringOp::Less);
    }

    #[test]
    fn display() {
        let rule = FilterRule::string(pid("Mark"), StringOp::Contains, "D").unwrap();
        assert_eq!(rule.to_string(), "Mark contains \"D\"");
        let rule = FilterRule::element(pid("Level"), ValueOp::Equals, ElementId(3)).unwrap();
        assert_eq!(rule.to_string(), "Level equals #3");
    }
}
