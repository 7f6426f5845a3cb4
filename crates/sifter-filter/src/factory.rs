//! Rule factory: from `(parameter, operator, value)` to atomic rules.
//!
//! The factory picks the rule kind from the comparand's runtime kind:
//!
//! ```text
//! String             → string rule (Wildcard, or Equals with '*', expands)
//! Integer            → integer rule, or string rule for text-only operators
//! Double             → double rule with tolerance, or string rule likewise
//! Bool, Workset      → integer, through the registry
//! DateTime           → round-trip string, through the registry
//! ElementId          → reference rule, Equals and NotEquals only
//! Null               → nothing
//! ```
//!
//! Combinations that cannot produce a rule yield `None` from
//! [`RuleFactory::create_rules`] and are logged at debug level. Builders
//! skip them. [`RuleFactory::try_create_rules`] reports the reason instead.

use std::sync::Arc;

use sifter_convert::{ConvertContext, ConverterRegistry, Value, ValueKind};
use sifter_params::ParameterId;
use tracing::debug;

use crate::error::{FilterError, Result};
use crate::op::StringOp;
use crate::rule::FilterRule;
use crate::value::StorageKind;

/// Default equality tolerance for double rules.
pub const DEFAULT_DOUBLE_TOLERANCE: f64 = 1e-6;

/// Builds filter rules, consulting a converter registry for comparands that
/// need normalizing.
///
/// # Example
///
/// ```
/// use sifter_filter::{RuleFactory, StringOp};
/// use sifter_params::ParameterId;
///
/// let factory = RuleFactory::default();
/// let mark = ParameterId::name("Mark").unwrap();
///
/// let rules = factory.create_rules(&mark, StringOp::Wildcard, &"D*01".into()).unwrap();
/// assert_eq!(rules.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct RuleFactory {
    registry: Arc<ConverterRegistry>,
    ctx: ConvertContext,
    epsilon: f64,
}

impl Default for RuleFactory {
    fn default() -> Self {
        RuleFactory::new(Arc::new(ConverterRegistry::with_builtins()))
    }
}

impl RuleFactory {
    /// Creates a factory over `registry` with the default context and
    /// tolerance.
    pub fn new(registry: Arc<ConverterRegistry>) -> Self {
        RuleFactory {
            registry,
            ctx: ConvertContext::default(),
            epsilon: DEFAULT_DOUBLE_TOLERANCE,
        }
    }

    /// Sets the conversion context (display unit for bare numbers).
    pub fn with_context(mut self, ctx: ConvertContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Sets the equality tolerance for double rules.
    pub fn with_tolerance(mut self, epsilon: f64) -> Result<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(FilterError::InvalidTolerance(epsilon));
        }
        self.epsilon = epsilon;
        Ok(self)
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    pub fn context(&self) -> &ConvertContext {
        &self.ctx
    }

    pub fn tolerance(&self) -> f64 {
        self.epsilon
    }

    /// Creates the rules for one condition.
    ///
    /// Returns `None` when the operator is unsupported for the value. A
    /// wildcard pattern with no literal segments yields `Some(vec![])`.
    pub fn create_rules(
        &self,
        param: &ParameterId,
        op: StringOp,
        value: &Value,
    ) -> Option<Vec<FilterRule>> {
        match self.try_create_rules(param, op, value) {
            Ok(rules) => Some(rules),
            Err(err) => {
                debug!(%param, %op, error = %err, "no rule created");
                None
            }
        }
    }

    /// Creates a single atomic rule.
    ///
    /// Returns `None` when the condition does not map to exactly one rule.
    pub fn create_rule(&self, param: &ParameterId, op: StringOp, value: &Value) -> Option<FilterRule> {
        let mut rules = self.create_rules(param, op, value)?;
        if rules.len() == 1 {
            rules.pop()
        } else {
            debug!(%param, %op, count = rules.len(), "condition is not atomic");
            None
        }
    }

    /// Like [`create_rules`](Self::create_rules), reporting why no rule
    /// could be built.
    pub fn try_create_rules(
        &self,
        param: &ParameterId,
        op: StringOp,
        value: &Value,
    ) -> Result<Vec<FilterRule>> {
        let unsupported = |kind: &'static str| FilterError::UnsupportedOperator {
            op,
            value_kind: kind,
        };

        match value {
            Value::Null => Err(FilterError::NullValue {
                param: param.to_string(),
            }),

            Value::String(s) => {
                if op == StringOp::Wildcard || (op == StringOp::Equals && s.contains('*')) {
                    return Ok(self.wildcard(param, s));
                }
                FilterRule::string(param.clone(), op, s.as_str())
                    .map(|r| vec![r])
                    .ok_or_else(|| unsupported("string"))
            }

            Value::Integer(n) => match op.as_value_op() {
                Some(vop) => Ok(vec![FilterRule::integer(param.clone(), vop, *n)]),
                None => self.via(param, op, value, ValueKind::String),
            },

            Value::Double(n) => match op.as_value_op() {
                Some(vop) => Ok(vec![FilterRule::double(
                    param.clone(),
                    vop,
                    *n,
                    self.epsilon,
                )]),
                None => self.via(param, op, value, ValueKind::String),
            },

            Value::Bool(_) | Value::Workset(_) => self.via(param, op, value, ValueKind::Integer),

            Value::DateTime(_) => self.via(param, op, value, ValueKind::String),

            Value::ElementId(id) => op
                .as_value_op()
                .and_then(|vop| FilterRule::element(param.clone(), vop, *id))
                .map(|r| vec![r])
                .ok_or_else(|| unsupported("element id")),
        }
    }

    /// Creates rules for an attribute whose storage kind is known.
    ///
    /// For equality and ordering operators the comparand is first converted
    /// to the storage kind, so `"3.5m"` against a double attribute compares
    /// as feet. Text-only operators use the comparand as given.
    pub fn create_typed_rules(
        &self,
        param: &ParameterId,
        storage: StorageKind,
        op: StringOp,
        value: &Value,
    ) -> Option<Vec<FilterRule>> {
        let target = match (op.as_value_op(), storage.value_kind()) {
            (Some(_), Some(kind)) => kind,
            _ => return self.create_rules(param, op, value),
        };
        match self.registry.try_convert(value, target, &self.ctx) {
            Ok(converted) => self.create_rules(param, op, &converted),
            Err(err) => {
                debug!(%param, %op, %storage, error = %err, "comparand does not fit storage");
                None
            }
        }
    }

    /// Expands a `*` pattern into implicitly AND-ed segment rules.
    ///
    /// ```text
    /// "foo*bar"     → [BeginsWith foo, EndsWith bar]
    /// "foo*is*bar"  → [BeginsWith foo, Contains is, EndsWith bar]
    /// "foo*"        → [BeginsWith foo]
    /// "*bar"        → [EndsWith bar]
    /// "*"           → []
    /// ```
    pub fn wildcard(&self, param: &ParameterId, pattern: &str) -> Vec<FilterRule> {
        let segments: Vec<&str> = pattern.split('*').collect();
        let last = segments.len() - 1;

        let mut rules = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                continue;
            }
            let op = if i == 0 {
                StringOp::BeginsWith
            } else if i == last {
                StringOp::EndsWith
            } else {
                StringOp::Contains
            };
            rules.extend(FilterRule::string(param.clone(), op, *segment));
        }
        rules
    }

    fn via(
        &self,
        param: &ParameterId,
        op: StringOp,
        value: &Value,
        target: ValueKind,
    ) -> Result<Vec<FilterRule>> {
        let converted = self.registry.try_convert(value, target, &self.ctx)?;
        self.try_create_rules(param, op, &converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleTest;
    use sifter_convert::{ElementId, LengthUnit, WorksetId};

    fn pid() -> ParameterId {
        ParameterId::name("Comments").unwrap()
    }

    fn ops(rules: &[FilterRule]) -> Vec<(StringOp, String)> {
        rules
            .iter()
            .map(|r| match r.test() {
                RuleTest::String { op, value, .. } => (*op, value.clone()),
                other => panic!("expected string rule, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn wildcard_splits() {
        let f = RuleFactory::default();
        assert_eq!(
            ops(&f.wildcard(&pid(), "foo*bar")),
            vec![
                (StringOp::BeginsWith, "foo".into()),
                (StringOp::EndsWith, "bar".into())
            ]
        );
        assert_eq!(
            ops(&f.wildcard(&pid(), "foo*is*bar")),
            vec![
                (StringOp::BeginsWith, "foo".into()),
                (StringOp::Contains, "is".into()),
                (StringOp::EndsWith, "bar".into())
            ]
        );
        assert_eq!(
            ops(&f.wildcard(&pid(), "foo*")),
            vec![(StringOp::BeginsWith, "foo".into())]
        );
        assert_eq!(
            ops(&f.wildcard(&pid(), "*bar")),
            vec![(StringOp::EndsWith, "bar".into())]
        );
        assert!(f.wildcard(&pid(), "*").is_empty());
        assert!(f.wildcard(&pid(), "**").is_empty());
        assert_eq!(
            ops(&f.wildcard(&pid(), "*a**b*")),
            vec![(StringOp::Contains, "a".into()), (StringOp::Contains, "b".into())]
        );
    }

    #[test]
    fn equals_with_star_is_wildcard() {
        let f = RuleFactory::default();
        let rules = f
            .create_rules(&pid(), StringOp::Equals, &"foo*bar".into())
            .unwrap();
        assert_eq!(rules.len(), 2);

        let rules = f
            .create_rules(&pid(), StringOp::NotEquals, &"foo*bar".into())
            .unwrap();
        assert_eq!(ops(&rules), vec![(StringOp::NotEquals, "foo*bar".into())]);
    }

    #[test]
    fn numeric_rules() {
        let f = RuleFactory::default();
        let rule = f
            .create_rule(&pid(), StringOp::Greater, &Value::Integer(4))
            .unwrap();
        assert!(matches!(rule.test(), RuleTest::Integer { value: 4, .. }));

        let rule = f
            .create_rule(&pid(), StringOp::Equals, &Value::Double(2.5))
            .unwrap();
        assert!(matches!(
            rule.test(),
            RuleTest::Double { epsilon, .. } if *epsilon == DEFAULT_DOUBLE_TOLERANCE
        ));
    }

    #[test]
    fn numbers_under_text_ops_become_strings() {
        let f = RuleFactory::default();
        let rules = f
            .create_rules(&pid(), StringOp::Contains, &Value::Integer(42))
            .unwrap();
        assert_eq!(ops(&rules), vec![(StringOp::Contains, "42".into())]);
    }

    #[test]
    fn bool_and_workset_become_integers() {
        let f = RuleFactory::default();
        let rule = f
            .create_rule(&pid(), StringOp::Equals, &Value::Bool(true))
            .unwrap();
        assert!(matches!(rule.test(), RuleTest::Integer { value: 1, .. }));

        let rule = f
            .create_rule(&pid(), StringOp::Equals, &Value::Workset(WorksetId(7)))
            .unwrap();
        assert!(matches!(rule.test(), RuleTest::Integer { value: 7, .. }));
    }

    #[test]
    fn element_ids_reject_ordering_and_text_ops() {
        let f = RuleFactory::default();
        let id = Value::ElementId(ElementId(5));
        assert!(f.create_rule(&pid(), StringOp::Equals, &id).is_some());
        assert!(f.create_rule(&pid(), StringOp::Less, &id).is_none());
        assert!(f.create_rule(&pid(), StringOp::Contains, &id).is_none());
        assert!(matches!(
            f.try_create_rules(&pid(), StringOp::Less, &id),
            Err(FilterError::UnsupportedOperator { value_kind: "element id", .. })
        ));
    }

    #[test]
    fn null_yields_nothing() {
        let f = RuleFactory::default();
        assert!(f.create_rules(&pid(), StringOp::Equals, &Value::Null).is_none());
        assert!(matches!(
            f.try_create_rules(&pid(), StringOp::Equals, &Value::Null),
            Err(FilterError::NullValue { .. })
        ));
    }

    #[test]
    fn wildcard_on_atomic_entry_point() {
        let f = RuleFactory::default();
        assert!(f
            .create_rule(&pid(), StringOp::Wildcard, &"a*b".into())
            .is_none());
        assert!(f
            .create_rule(&pid(), StringOp::Wildcard, &"a*".into())
            .is_some());
    }

    #[test]
    fn typed_rules_convert_to_storage() {
        let f = RuleFactory::default().with_context(ConvertContext::for_unit(LengthUnit::Inches));
        let rules = f
            .create_typed_rules(&pid(), StorageKind::Double, StringOp::Equals, &"=30".into())
            .unwrap();
        assert!(matches!(
            rules[0].test(),
            RuleTest::Double { value, .. } if (*value - 2.5).abs() < 1e-12
        ));

        assert!(f
            .create_typed_rules(&pid(), StorageKind::Double, StringOp::Equals, &"abc".into())
            .is_none());

        let rules = f
            .create_typed_rules(&pid(), StorageKind::Double, StringOp::Contains, &"3".into())
            .unwrap();
        assert_eq!(ops(&rules), vec![(StringOp::Contains, "3".into())]);
    }

    #[test]
    fn tolerance_validation() {
        assert!(RuleFactory::default().with_tolerance(-1.0).is_err());
        assert!(RuleFactory::default().with_tolerance(f64::NAN).is_err());
        let f = RuleFactory::default().with_tolerance(0.01).unwrap();
        assert_eq!(f.tolerance(), 0.01);
    }
}
