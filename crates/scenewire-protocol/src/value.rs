//! Property values as they travel over the wire.
//!
//! Structured numeric aggregates (vectors, rotations, colours, rectangles,
//! bounds) are always flattened to plain JSON number arrays. Decoding cannot
//! tell a three-component vector from a three-element array, so inbound
//! aggregates arrive as [`Value::Array`] and the server coerces them against
//! the declared property kind.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A closed set of property values.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value, including an unset reference.
    #[default]
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integral number.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// Free text, enum member names, and reference paths.
    Text(String),
    /// Homogeneous list of values.
    Array(Vec<Value>),
    /// `[x, y]`.
    Vector2([f32; 2]),
    /// `[x, y, z]`.
    Vector3([f32; 3]),
    /// `[x, y, z, w]`.
    Vector4([f32; 4]),
    /// Rotation as `[x, y, z, w]`.
    Quaternion([f32; 4]),
    /// Colour as `[r, g, b, a]`.
    Color([f32; 4]),
    /// Rectangle as `[x, y, width, height]`.
    Rect([f32; 4]),
    /// Bounds as `[center.x, center.y, center.z, extents.x, extents.y, extents.z]`.
    Bounds([f32; 6]),
    /// `[x, y]` in integers.
    Vector2Int([i32; 2]),
    /// `[x, y, z]` in integers.
    Vector3Int([i32; 3]),
    /// Integer rectangle as `[x, y, width, height]`.
    RectInt([i32; 4]),
    /// Integer bounds as `[position.x, position.y, position.z, size.x, size.y, size.z]`.
    BoundsInt([i32; 6]),
}

impl Value {
    /// Detects the literal kind of command-line text.
    ///
    /// A JSON array of numbers becomes [`Value::Array`], `true`/`false`
    /// become booleans, integral and floating literals become numbers, and
    /// anything else is kept verbatim as text. Blank text stays text so it
    /// can clear references.
    #[must_use]
    pub fn sniff(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.starts_with('[')
            && trimmed.ends_with(']')
            && let Ok(serde_json::Value::Array(items)) = serde_json::from_str(trimmed)
            && items.iter().all(serde_json::Value::is_number)
        {
            return Self::Array(items.into_iter().map(Self::from).collect());
        }
        match trimmed {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(integer) = trimmed.parse::<i64>() {
            return Self::Integer(integer);
        }
        if trimmed.bytes().any(|byte| byte.is_ascii_digit())
            && let Ok(float) = trimmed.parse::<f64>()
            && float.is_finite()
        {
            return Self::Float(float);
        }
        Self::Text(text.to_owned())
    }

    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::Array(_) => "array",
            Self::Vector2(_) => "vector2",
            Self::Vector3(_) => "vector3",
            Self::Vector4(_) => "vector4",
            Self::Quaternion(_) => "quaternion",
            Self::Color(_) => "color",
            Self::Rect(_) => "rect",
            Self::Bounds(_) => "bounds",
            Self::Vector2Int(_) => "vector2int",
            Self::Vector3Int(_) => "vector3int",
            Self::RectInt(_) => "rectint",
            Self::BoundsInt(_) => "boundsint",
        }
    }

    /// Returns true for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrows the text of a [`Value::Text`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Reads a boolean, accepting the literal strings `true` and `false`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            Self::Text(text) => match text.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Reads an integer, accepting integral floats and numeric strings.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(integer) => Some(*integer),
            Self::Float(float) => integral_float(*float),
            Self::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Reads a float, accepting integers and numeric strings.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(float) => Some(*float),
            Self::Integer(integer) => Some(widen_integer(*integer)),
            Self::Text(text) => text.trim().parse().ok().filter(|value: &f64| value.is_finite()),
            _ => None,
        }
    }

    /// Flattens any numeric array or aggregate into a list of floats.
    ///
    /// Returns `None` when the value is not array-shaped or holds a
    /// non-numeric element.
    #[must_use]
    pub fn numbers(&self) -> Option<Vec<f64>> {
        match self {
            Self::Array(items) => items.iter().map(numeric_element).collect(),
            Self::Vector2(values) => Some(widen(values)),
            Self::Vector3(values) => Some(widen(values)),
            Self::Vector4(values)
            | Self::Quaternion(values)
            | Self::Color(values)
            | Self::Rect(values) => Some(widen(values)),
            Self::Bounds(values) => Some(widen(values)),
            Self::Vector2Int(values) => Some(values.iter().map(|v| f64::from(*v)).collect()),
            Self::Vector3Int(values) => Some(values.iter().map(|v| f64::from(*v)).collect()),
            Self::RectInt(values) => Some(values.iter().map(|v| f64::from(*v)).collect()),
            Self::BoundsInt(values) => Some(values.iter().map(|v| f64::from(*v)).collect()),
            _ => None,
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "only whole floats inside the i64 range reach the cast"
)]
fn integral_float(float: f64) -> Option<i64> {
    const LIMIT: f64 = 9_007_199_254_740_992.0;
    (float.fract() == 0.0 && float.abs() <= LIMIT).then(|| float as i64)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "wire integers beyond 2^53 lose precision as floats by definition"
)]
fn widen_integer(integer: i64) -> f64 {
    integer as f64
}

fn numeric_element(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(_) | Value::Float(_) => value.as_f64(),
        _ => None,
    }
}

fn widen(values: &[f32]) -> Vec<f64> {
    values.iter().map(|value| f64::from(*value)).collect()
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<Self>> for Value {
    fn from(value: Vec<Self>) -> Self {
        Self::Array(value)
    }
}

impl From<serde_json::Value> for Value {
    /// Objects have no variant of their own and are kept as their raw JSON
    /// text.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(flag) => Self::Bool(flag),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(integer) => Self::Integer(integer),
                None => number.as_f64().map_or(Self::Null, Self::Float),
            },
            serde_json::Value::String(text) => Self::Text(text),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            object @ serde_json::Value::Object(_) => Self::Text(object.to_string()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(flag) => serializer.serialize_bool(*flag),
            Self::Integer(integer) => serializer.serialize_i64(*integer),
            Self::Float(float) => serializer.serialize_f64(*float),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Vector2(values) => serialize_floats(values, serializer),
            Self::Vector3(values) => serialize_floats(values, serializer),
            Self::Vector4(values)
            | Self::Quaternion(values)
            | Self::Color(values)
            | Self::Rect(values) => serialize_floats(values, serializer),
            Self::Bounds(values) => serialize_floats(values, serializer),
            Self::Vector2Int(values) => values.serialize(serializer),
            Self::Vector3Int(values) => values.serialize(serializer),
            Self::RectInt(values) => values.serialize(serializer),
            Self::BoundsInt(values) => values.serialize(serializer),
        }
    }
}

/// Writes single-precision components as the `f64` nearest their shortest
/// decimal form, so `0.1_f32` appears on the wire as `0.1`.
fn serialize_floats<S>(values: &[f32], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for value in values {
        seq.serialize_element(&shortest_f64(*value))?;
    }
    seq.end()
}

fn shortest_f64(value: f32) -> f64 {
    value
        .to_string()
        .parse()
        .unwrap_or_else(|_| f64::from(value))
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}
