//! Built-in converters and the generic fallback coercion.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

use crate::error::{ConvertError, Result};
use crate::expr;
use crate::registry::{ConvertContext, ConverterRegistry};
use crate::value::{ElementId, Value, ValueKind};

pub(crate) fn register_builtins(registry: &mut ConverterRegistry) {
    registry
        .register(ValueKind::Bool, ValueKind::Integer, |v, _| {
            v.as_bool().map(|b| Value::Integer(i64::from(b)))
        })
        .register(ValueKind::Integer, ValueKind::Bool, |v, _| {
            v.as_integer().map(|n| Value::Bool(n != 0))
        })
        .register(ValueKind::String, ValueKind::Integer, |v, ctx| {
            let s = v.as_str()?;
            if let Ok(n) = s.trim().parse::<i64>() {
                return Some(Value::Integer(n));
            }
            parse_number(s, ctx).and_then(double_to_integer).map(Value::Integer)
        })
        .register(ValueKind::String, ValueKind::Double, |v, ctx| {
            v.as_str()
                .and_then(|s| parse_number(s, ctx))
                .map(Value::Double)
        })
        .register(ValueKind::Integer, ValueKind::DateTime, |v, _| {
            let secs = v.as_integer()?;
            Utc.timestamp_opt(secs, 0).single().map(Value::DateTime)
        })
        .register(ValueKind::DateTime, ValueKind::Integer, |v, _| {
            v.as_datetime().map(|dt| Value::Integer(dt.timestamp()))
        })
        .register(ValueKind::DateTime, ValueKind::String, |v, _| {
            v.as_datetime().map(|dt| Value::String(format_round_trip(dt)))
        })
        .register(ValueKind::String, ValueKind::DateTime, |v, _| {
            v.as_str().and_then(parse_round_trip).map(Value::DateTime)
        })
        .register(ValueKind::ElementId, ValueKind::Integer, |v, _| {
            v.as_element_id().map(|id| Value::Integer(id.value()))
        })
        .register(ValueKind::Integer, ValueKind::ElementId, |v, _| {
            v.as_integer().map(|n| Value::ElementId(ElementId(n)))
        })
        .register(ValueKind::Workset, ValueKind::Integer, |v, _| match v {
            Value::Workset(id) => Some(Value::Integer(id.value())),
            _ => None,
        });
}

/// Parses a user-typed number.
///
/// Plain invariant parse first. Strings starting with `=`, or that do not
/// parse directly, go through the unit expression evaluator.
pub fn parse_number(s: &str, ctx: &ConvertContext) -> Option<f64> {
    let trimmed = s.trim();
    if !trimmed.starts_with('=') {
        if let Ok(n) = trimmed.parse::<f64>() {
            return n.is_finite().then_some(n);
        }
    }
    expr::evaluate(trimmed, ctx.default_unit_scale).ok()
}

/// Formats a timestamp in round-trip ISO-8601 form.
pub fn format_round_trip(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses a round-trip ISO-8601 timestamp.
pub fn parse_round_trip(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn double_to_integer(n: f64) -> Option<i64> {
    let rounded = n.round_ties_even();
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

/// Generic invariant coercion used when no registered converter applies.
pub(crate) fn coerce(value: &Value, to: ValueKind) -> Result<Value> {
    let Some(from) = value.kind() else {
        return Err(ConvertError::NullNotAllowed { target: to });
    };
    let unsupported = || ConvertError::Unsupported { from, to };

    match to {
        ValueKind::String => match value {
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            Value::Integer(n) => Ok(Value::String(n.to_string())),
            Value::Double(n) => Ok(Value::String(n.to_string())),
            Value::DateTime(dt) => Ok(Value::String(format_round_trip(*dt))),
            Value::ElementId(id) => Ok(Value::String(id.to_string())),
            Value::Workset(id) => Ok(Value::String(id.value().to_string())),
            _ => Err(unsupported()),
        },
        ValueKind::Double => match value {
            Value::Bool(b) => Ok(Value::Double(if *b { 1.0 } else { 0.0 })),
            Value::Integer(n) => Ok(Value::Double(*n as f64)),
            Value::ElementId(id) => Ok(Value::Double(id.value() as f64)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Double)
                .ok_or_else(|| ConvertError::failed(from, to, format!("'{s}' is not a number"))),
            _ => Err(unsupported()),
        },
        ValueKind::Integer => match value {
            Value::Bool(b) => Ok(Value::Integer(i64::from(*b))),
            Value::Double(n) => double_to_integer(*n)
                .map(Value::Integer)
                .ok_or_else(|| ConvertError::failed(from, to, format!("{n} is out of range"))),
            Value::ElementId(id) => Ok(Value::Integer(id.value())),
            Value::Workset(id) => Ok(Value::Integer(id.value())),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| ConvertError::failed(from, to, e.to_string())),
            _ => Err(unsupported()),
        },
        ValueKind::Bool => match value {
            Value::Integer(n) => Ok(Value::Bool(*n != 0)),
            Value::Double(n) => Ok(Value::Bool(*n != 0.0)),
            Value::String(s) => {
                let t = s.trim();
                if t.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if t.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(ConvertError::failed(from, to, format!("'{s}' is not a boolean")))
                }
            }
            _ => Err(unsupported()),
        },
        ValueKind::ElementId => match value {
            Value::Integer(n) => Ok(Value::ElementId(ElementId(*n))),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(|n| Value::ElementId(ElementId(n)))
                .map_err(|e| ConvertError::failed(from, to, e.to_string())),
            _ => Err(unsupported()),
        },
        ValueKind::DateTime => match value {
            Value::String(s) => parse_round_trip(s)
                .map(Value::DateTime)
                .ok_or_else(|| ConvertError::failed(from, to, format!("'{s}' is not ISO-8601"))),
            _ => Err(unsupported()),
        },
        ValueKind::Workset => Err(unsupported()),
    }
}
