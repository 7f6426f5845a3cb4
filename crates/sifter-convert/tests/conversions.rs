//! End-to-end conversion behavior through the public registry API.

use sifter_convert::{
    ConvertContext, ConvertError, ConverterRegistry, ElementId, LengthUnit, Target, Value,
    ValueKind, WorksetId,
};

fn feet() -> ConvertContext {
    ConvertContext::for_unit(LengthUnit::Feet)
}

#[test]
fn spec_bool_integer_examples() {
    let registry = ConverterRegistry::with_builtins();
    let ctx = feet();

    let one = registry
        .try_convert(&Value::Bool(true), ValueKind::Integer, &ctx)
        .unwrap();
    assert_eq!(one, Value::Integer(1));

    let zero = registry
        .try_convert(&Value::Bool(false), ValueKind::Integer, &ctx)
        .unwrap();
    assert_eq!(zero, Value::Integer(0));

    let back = registry.try_convert(&one, ValueKind::Bool, &ctx).unwrap();
    assert_eq!(back, Value::Bool(true));
}

#[test]
fn expression_strings_resolve_to_internal_units() {
    let registry = ConverterRegistry::with_builtins();
    let ctx = feet();

    assert_eq!(
        registry.try_convert(&Value::from("=2ft+6in"), ValueKind::Double, &ctx),
        Ok(Value::Double(2.5))
    );
    // Direct parse wins over unit scaling when the string is a plain number.
    let metric = ConvertContext::for_unit(LengthUnit::Meters);
    assert_eq!(
        registry.try_convert(&Value::from("2"), ValueKind::Double, &metric),
        Ok(Value::Double(2.0))
    );
    // With a leading '=' the same number is scaled by the display unit.
    assert_eq!(
        registry.try_convert(&Value::from("=2"), ValueKind::Double, &metric),
        Ok(Value::Double(2.0 * sifter_convert::FEET_PER_METER))
    );
}

#[test]
fn broken_expression_is_a_failure_not_a_panic() {
    let registry = ConverterRegistry::with_builtins();
    let result = registry.try_convert(&Value::from("=2ft+"), ValueKind::Double, &feet());
    assert!(result.is_err());
}

#[test]
fn custom_converter_runs_before_fallback() {
    let mut registry = ConverterRegistry::with_builtins();
    registry.register(ValueKind::String, ValueKind::Bool, |v, _| match v.as_str()? {
        "yes" => Some(Value::Bool(true)),
        "no" => Some(Value::Bool(false)),
        _ => None,
    });

    let ctx = feet();
    assert_eq!(
        registry.try_convert(&Value::from("yes"), ValueKind::Bool, &ctx),
        Ok(Value::Bool(true))
    );
    // Declined by the custom converter, accepted by the fallback.
    assert_eq!(
        registry.try_convert(&Value::from("false"), ValueKind::Bool, &ctx),
        Ok(Value::Bool(false))
    );
}

#[test]
fn nullable_targets() {
    let registry = ConverterRegistry::with_builtins();
    let ctx = feet();
    assert_eq!(
        registry.try_convert(&Value::Null, Target::optional(ValueKind::String), &ctx),
        Ok(Value::Null)
    );
    assert!(matches!(
        registry.try_convert(&Value::Null, ValueKind::String, &ctx),
        Err(ConvertError::NullNotAllowed { .. })
    ));
}

#[test]
fn references_reinterpret_numerically() {
    let registry = ConverterRegistry::with_builtins();
    let ctx = feet();
    assert_eq!(
        registry.try_convert(&Value::from(ElementId(-2000011)), ValueKind::Integer, &ctx),
        Ok(Value::Integer(-2000011))
    );
    assert_eq!(
        registry.try_convert(&Value::from(WorksetId(12)), ValueKind::Integer, &ctx),
        Ok(Value::Integer(12))
    );
    assert!(matches!(
        registry.try_convert(&Value::from(WorksetId(12)), ValueKind::DateTime, &ctx),
        Err(ConvertError::Unsupported { .. })
    ));
}
