//! Conversions between wire values and store-native property values.
//!
//! Reads flatten a native value into the simplest [`Value`] variant. Writes
//! dispatch on the slot's declared [`PropertyKind`]; the wire shape alone is
//! never trusted to pick the target type.

use scenewire_protocol::Value;

use super::{ObjectRef, PropertyDescriptor, PropertyKind, PropertyValue};
use crate::dispatch::CommandError;

/// Renders object references for reads; `None` renders as null.
pub type DescribeRef<'a> = dyn Fn(&ObjectRef) -> Option<String> + 'a;

/// Resolves reference text for writes; `Ok(None)` clears the reference.
pub type ResolveRef<'a> = dyn FnMut(&str) -> Result<Option<ObjectRef>, CommandError> + 'a;

/// Converts a native value into its wire form.
pub fn to_wire(kind: &PropertyKind, value: &PropertyValue, describe: &DescribeRef<'_>) -> Value {
    match value {
        PropertyValue::Integer(integer) => Value::Integer(*integer),
        PropertyValue::Float(float) => Value::Float(*float),
        PropertyValue::Boolean(flag) => Value::Bool(*flag),
        PropertyValue::String(text) | PropertyValue::Opaque(text) => Value::Text(text.clone()),
        PropertyValue::Enum(index) => enum_name(kind, *index),
        PropertyValue::Color(values) => Value::Color(*values),
        PropertyValue::Vector2(values) => Value::Vector2(*values),
        PropertyValue::Vector3(values) => Value::Vector3(*values),
        PropertyValue::Vector4(values) => Value::Vector4(*values),
        PropertyValue::Quaternion(values) => Value::Quaternion(*values),
        PropertyValue::Rect(values) => Value::Rect(*values),
        PropertyValue::Bounds(values) => Value::Bounds(*values),
        PropertyValue::Vector2Int(values) => Value::Vector2Int(*values),
        PropertyValue::Vector3Int(values) => Value::Vector3Int(*values),
        PropertyValue::RectInt(values) => Value::RectInt(*values),
        PropertyValue::BoundsInt(values) => Value::BoundsInt(*values),
        PropertyValue::Reference(None) => Value::Null,
        PropertyValue::Reference(Some(target)) => describe(target).map_or(Value::Null, Value::Text),
        PropertyValue::Array(items) => {
            let element = match kind {
                PropertyKind::Array(element) => element.as_ref(),
                other => other,
            };
            Value::Array(
                items
                    .iter()
                    .map(|item| to_wire(element, item, describe))
                    .collect(),
            )
        }
    }
}

fn enum_name(kind: &PropertyKind, index: usize) -> Value {
    if let PropertyKind::Enum(names) = kind
        && let Some(name) = names.get(index)
    {
        return Value::Text(name.clone());
    }
    i64::try_from(index).map_or(Value::Null, Value::Integer)
}

/// Converts a wire value into the native value for `property`.
///
/// # Errors
///
/// Returns [`CommandError::TypeMismatch`] when the value does not fit the
/// declared kind and [`CommandError::UnsupportedKind`] for kinds without a
/// write rule. Reference errors come from `resolve`.
pub fn from_wire(
    property: &PropertyDescriptor,
    value: &Value,
    resolve: &mut ResolveRef<'_>,
) -> Result<PropertyValue, CommandError> {
    let writer = Writer { property, value };
    match &property.kind {
        PropertyKind::Integer => writer.integer().map(PropertyValue::Integer),
        PropertyKind::Float => writer.float().map(PropertyValue::Float),
        PropertyKind::Boolean => writer.boolean().map(PropertyValue::Boolean),
        PropertyKind::String => writer.text().map(PropertyValue::String),
        PropertyKind::Enum(names) => writer.enumeration(names).map(PropertyValue::Enum),
        PropertyKind::Color => writer.floats(3, [0.0, 0.0, 0.0, 1.0]).map(PropertyValue::Color),
        PropertyKind::Vector2 => writer.floats(2, [0.0; 2]).map(PropertyValue::Vector2),
        PropertyKind::Vector3 => writer.floats(3, [0.0; 3]).map(PropertyValue::Vector3),
        PropertyKind::Vector4 => writer.floats(4, [0.0; 4]).map(PropertyValue::Vector4),
        PropertyKind::Quaternion => writer
            .floats(3, [0.0, 0.0, 0.0, 1.0])
            .map(PropertyValue::Quaternion),
        PropertyKind::Rect => writer.floats(4, [0.0; 4]).map(PropertyValue::Rect),
        PropertyKind::Bounds => writer.floats(6, [0.0; 6]).map(PropertyValue::Bounds),
        PropertyKind::Vector2Int => writer.integers([0; 2]).map(PropertyValue::Vector2Int),
        PropertyKind::Vector3Int => writer.integers([0; 3]).map(PropertyValue::Vector3Int),
        PropertyKind::RectInt => writer.integers([0; 4]).map(PropertyValue::RectInt),
        PropertyKind::BoundsInt => writer.integers([0; 6]).map(PropertyValue::BoundsInt),
        PropertyKind::ObjectReference => writer.reference(resolve).map(PropertyValue::Reference),
        PropertyKind::Array(_) | PropertyKind::Unsupported(_) => {
            Err(CommandError::UnsupportedKind {
                path: property.path.clone(),
                kind: property.kind.name(),
            })
        }
    }
}

struct Writer<'a> {
    property: &'a PropertyDescriptor,
    value: &'a Value,
}

impl Writer<'_> {
    fn bad(&self, message: impl Into<String>) -> CommandError {
        CommandError::mismatch(&self.property.path, self.property.kind.name(), message)
    }

    fn unexpected(&self) -> CommandError {
        self.bad(format!("cannot use a {} value", self.value.kind_name()))
    }

    fn integer(&self) -> Result<i64, CommandError> {
        self.value
            .as_i64()
            .or_else(|| self.value.as_f64().and_then(round_to_integer))
            .ok_or_else(|| self.unexpected())
    }

    fn float(&self) -> Result<f64, CommandError> {
        self.value.as_f64().ok_or_else(|| self.unexpected())
    }

    fn boolean(&self) -> Result<bool, CommandError> {
        match self.value {
            Value::Integer(0) => Ok(false),
            Value::Integer(1) => Ok(true),
            other => other.as_bool().ok_or_else(|| self.unexpected()),
        }
    }

    fn text(&self) -> Result<String, CommandError> {
        scalar_text(self.value).ok_or_else(|| self.unexpected())
    }

    fn enumeration(&self, names: &[String]) -> Result<usize, CommandError> {
        if let Value::Text(name) = self.value {
            if let Some(index) = names.iter().position(|candidate| candidate == name) {
                return Ok(index);
            }
            if name.trim().parse::<i64>().is_err() {
                return Err(self.bad(format!(
                    "'{name}' is not one of: {}",
                    names.join(", ")
                )));
            }
        }
        let raw = self.integer()?;
        usize::try_from(raw)
            .ok()
            .filter(|index| *index < names.len())
            .ok_or_else(|| {
                self.bad(format!(
                    "index {raw} is outside 0..{}",
                    names.len()
                ))
            })
    }

    fn numbers(&self) -> Result<Vec<f64>, CommandError> {
        let numbers = match self.value {
            Value::Text(text) => Value::sniff(text).numbers(),
            other => other.numbers(),
        };
        numbers.ok_or_else(|| self.bad(format!("expected a number array, got {}", self.value.kind_name())))
    }

    fn floats<const N: usize>(
        &self,
        required: usize,
        defaults: [f32; N],
    ) -> Result<[f32; N], CommandError> {
        let numbers = self.numbers()?;
        if numbers.len() < required {
            return Err(self.bad(format!(
                "expected at least {required} components, got {}",
                numbers.len()
            )));
        }
        let mut out = defaults;
        for (slot, number) in out.iter_mut().zip(numbers) {
            *slot = narrow(number);
        }
        Ok(out)
    }

    fn integers<const N: usize>(&self, defaults: [i32; N]) -> Result<[i32; N], CommandError> {
        let numbers = self.numbers()?;
        if numbers.len() < N {
            return Err(self.bad(format!(
                "expected at least {N} components, got {}",
                numbers.len()
            )));
        }
        let mut out = defaults;
        for (slot, number) in out.iter_mut().zip(numbers) {
            *slot = round_to_integer(number)
                .and_then(|whole| i32::try_from(whole).ok())
                .ok_or_else(|| self.bad(format!("{number} is not a 32-bit integer")))?;
        }
        Ok(out)
    }

    fn reference(&self, resolve: &mut ResolveRef<'_>) -> Result<Option<ObjectRef>, CommandError> {
        match self.value {
            Value::Null => Ok(None),
            other => {
                let text = scalar_text(other).ok_or_else(|| self.unexpected())?;
                resolve(&text)
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Text(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Integer(integer) => Some(integer.to_string()),
        Value::Float(float) => Some(float.to_string()),
        _ => None,
    }
}

/// Rounds to the nearest integer, halves to even; `None` beyond the range
/// a float represents exactly.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the value is integral and within 2^53"
)]
fn round_to_integer(number: f64) -> Option<i64> {
    const LIMIT: f64 = 9_007_199_254_740_992.0;
    let rounded = number.round_ties_even();
    (rounded.is_finite() && rounded.abs() <= LIMIT).then(|| rounded as i64)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "store aggregates hold single-precision floats"
)]
fn narrow(number: f64) -> f32 {
    number as f32
}
