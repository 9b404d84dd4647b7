//! Typed access to request parameters.
//!
//! Unknown keys are ignored. A key that is absent, `null`, or blank text
//! counts as missing; a present key of the wrong shape is invalid.

use std::collections::BTreeMap;

use scenewire_protocol::Value;

use super::errors::CommandError;

/// Borrowed view of a request's `params` object.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Params<'a> {
    map: &'a BTreeMap<String, Value>,
}

/// How a request selects one component on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ComponentSelector {
    /// By type name, resolved through the component catalog.
    Type(String),
    /// By zero-based position among all components, transform included.
    Index(usize),
}

impl<'a> Params<'a> {
    pub(crate) const fn new(map: &'a BTreeMap<String, Value>) -> Self {
        Self { map }
    }

    fn present(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name).filter(|value| !value.is_null())
    }

    /// Required text; numbers and booleans are accepted in their literal form.
    pub(crate) fn required_str(&self, name: &str) -> Result<String, CommandError> {
        self.optional_str(name)?
            .ok_or_else(|| CommandError::missing(name))
    }

    /// Optional text; blank text is treated as absent.
    pub(crate) fn optional_str(&self, name: &str) -> Result<Option<String>, CommandError> {
        let Some(value) = self.present(name) else {
            return Ok(None);
        };
        let text = match value {
            Value::Text(text) => text.trim().to_owned(),
            Value::Integer(integer) => integer.to_string(),
            Value::Float(float) => float.to_string(),
            Value::Bool(flag) => flag.to_string(),
            other => {
                return Err(CommandError::invalid(
                    name,
                    format!("expected text, got {}", other.kind_name()),
                ));
            }
        };
        Ok(Some(text).filter(|text| !text.is_empty()))
    }

    /// Required raw value; an explicit `null` is kept as [`Value::Null`].
    pub(crate) fn required_value(&self, name: &str) -> Result<Value, CommandError> {
        self.map
            .get(name)
            .cloned()
            .ok_or_else(|| CommandError::missing(name))
    }

    pub(crate) fn optional_bool(&self, name: &str, default: bool) -> Result<bool, CommandError> {
        let Some(value) = self.present(name) else {
            return Ok(default);
        };
        match value {
            Value::Integer(0) => Ok(false),
            Value::Integer(1) => Ok(true),
            other => other
                .as_bool()
                .ok_or_else(|| CommandError::invalid(name, "expected true or false")),
        }
    }

    /// Optional non-negative count.
    pub(crate) fn optional_usize(&self, name: &str, default: usize) -> Result<usize, CommandError> {
        let Some(value) = self.present(name) else {
            return Ok(default);
        };
        let raw = value
            .as_i64()
            .ok_or_else(|| CommandError::invalid(name, "expected an integer"))?;
        usize::try_from(raw)
            .map_err(|_| CommandError::invalid(name, format!("must not be negative, got {raw}")))
    }

    /// Optional depth limit; absent or negative means unlimited.
    pub(crate) fn optional_depth(&self, name: &str) -> Result<Option<usize>, CommandError> {
        let Some(value) = self.present(name) else {
            return Ok(None);
        };
        let raw = value
            .as_i64()
            .ok_or_else(|| CommandError::invalid(name, "expected an integer"))?;
        Ok(usize::try_from(raw).ok())
    }

    /// `component_type` wins over `component_index`; one of them is required.
    pub(crate) fn component_selector(&self) -> Result<ComponentSelector, CommandError> {
        if let Some(type_name) = self.optional_str("component_type")? {
            return Ok(ComponentSelector::Type(type_name));
        }
        if self.present("component_index").is_some() {
            return self
                .optional_usize("component_index", 0)
                .map(ComponentSelector::Index);
        }
        Err(CommandError::missing("component_type"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn params(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.clone()))
            .collect()
    }

    #[rstest]
    #[case(Value::Null)]
    #[case(Value::from("   "))]
    fn blank_and_null_text_are_missing(#[case] value: Value) {
        let map = params(&[("path", value)]);
        let error = Params::new(&map).required_str("path").expect_err("missing");
        assert_eq!(error, CommandError::missing("path"));
    }

    #[test]
    fn text_is_trimmed_and_scalars_are_rendered() {
        let map = params(&[("path", Value::from(" A.prefab ")), ("name", Value::Integer(7))]);
        let view = Params::new(&map);
        assert_eq!(view.required_str("path").expect("path"), "A.prefab");
        assert_eq!(view.required_str("name").expect("name"), "7");
    }

    #[test]
    fn arrays_are_not_text() {
        let map = params(&[("path", Value::Array(vec![]))]);
        let error = Params::new(&map).required_str("path").expect_err("invalid");
        assert_eq!(error.kind(), "validation");
        assert!(error.to_string().contains("'path'"));
    }

    #[rstest]
    #[case(Value::Bool(true), true)]
    #[case(Value::from("false"), false)]
    #[case(Value::Integer(1), true)]
    fn booleans_accept_literals(#[case] value: Value, #[case] expected: bool) {
        let map = params(&[("include_properties", value)]);
        let flag = Params::new(&map)
            .optional_bool("include_properties", !expected)
            .expect("flag");
        assert_eq!(flag, expected);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(Value::Integer(0)), Some(0))]
    #[case(Some(Value::Integer(3)), Some(3))]
    #[case(Some(Value::Integer(-1)), None)]
    #[case(Some(Value::from("2")), Some(2))]
    fn depth_limits(#[case] value: Option<Value>, #[case] expected: Option<usize>) {
        let map = value
            .map(|value| params(&[("max_depth", value)]))
            .unwrap_or_default();
        assert_eq!(Params::new(&map).optional_depth("max_depth").expect("depth"), expected);
    }

    #[test]
    fn negative_offsets_are_rejected() {
        let map = params(&[("offset", Value::Integer(-5))]);
        let error = Params::new(&map).optional_usize("offset", 0).expect_err("negative");
        assert!(error.to_string().contains("must not be negative"));
    }

    #[test]
    fn component_type_wins_over_index() {
        let map = params(&[
            ("component_type", Value::from("BoxCollider")),
            ("component_index", Value::Integer(2)),
        ]);
        assert_eq!(
            Params::new(&map).component_selector().expect("selector"),
            ComponentSelector::Type("BoxCollider".to_owned())
        );
    }

    #[test]
    fn component_index_is_used_alone() {
        let map = params(&[("component_index", Value::Integer(0))]);
        assert_eq!(
            Params::new(&map).component_selector().expect("selector"),
            ComponentSelector::Index(0)
        );
    }

    #[test]
    fn a_selector_is_required() {
        let map = BTreeMap::new();
        let error = Params::new(&map).component_selector().expect_err("missing");
        assert_eq!(error, CommandError::missing("component_type"));
    }

    #[test]
    fn explicit_null_values_are_kept() {
        let map = params(&[("value", Value::Null)]);
        let view = Params::new(&map);
        assert_eq!(view.required_value("value").expect("value"), Value::Null);
        assert!(view.required_value("other").is_err());
    }
}
