//! Request envelope decoding.
//!
//! Decoding is deliberately forgiving about the envelope so that a failure
//! can still be answered with the client's id: the line is first read as a
//! generic JSON document, the id is recovered, and only then are `command`
//! and `params` checked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Value;

/// A single command invocation sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Opaque client-chosen correlation id, echoed in the response.
    pub id: String,
    /// Command name; matched case-insensitively.
    pub command: String,
    /// Named parameters; keys are fixed per command.
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

/// A request line that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed request: {reason}")]
pub struct MalformedRequest {
    /// Best-effort id recovered from the line; empty when none was found.
    pub id: String,
    /// Human-readable cause.
    pub reason: String,
}

impl MalformedRequest {
    fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

impl Request {
    /// Builds a request with no parameters.
    #[must_use]
    pub fn new(id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            command: command.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter, replacing any previous value under the same key.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Decodes one request line.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRequest`] when the line is blank, is not a JSON
    /// object, lacks a string `command`, or carries non-object `params`.
    pub fn parse(line: &str) -> Result<Self, MalformedRequest> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(MalformedRequest::new("", "empty request line"));
        }
        let document: serde_json::Value = serde_json::from_str(trimmed)
            .map_err(|error| MalformedRequest::new("", error.to_string()))?;
        let serde_json::Value::Object(mut envelope) = document else {
            return Err(MalformedRequest::new("", "request must be a JSON object"));
        };

        let id = recover_id(envelope.get("id"));
        let command = match envelope.remove("command") {
            Some(serde_json::Value::String(command)) if !command.trim().is_empty() => command,
            Some(serde_json::Value::String(_)) => {
                return Err(MalformedRequest::new(id, "command is empty"));
            }
            Some(_) => return Err(MalformedRequest::new(id, "command must be a string")),
            None => return Err(MalformedRequest::new(id, "missing command")),
        };
        let params = match envelope.remove("params") {
            None | Some(serde_json::Value::Null) => BTreeMap::new(),
            Some(serde_json::Value::Object(entries)) => entries
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect(),
            Some(_) => return Err(MalformedRequest::new(id, "params must be a JSON object")),
        };

        Ok(Self {
            id,
            command,
            params,
        })
    }

    /// Encodes the request as one newline-terminated line.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

fn recover_id(raw: Option<&serde_json::Value>) -> String {
    match raw {
        Some(serde_json::Value::String(id)) => id.clone(),
        Some(serde_json::Value::Number(id)) => id.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn parses_full_request() {
        let request = Request::parse(
            r#"{"id":"7","command":"get_prefab","params":{"path":"Assets/A.prefab","max_depth":1,"include_properties":true}}"#,
        )
        .expect("parse");
        assert_eq!(request.id, "7");
        assert_eq!(request.command, "get_prefab");
        assert_eq!(
            request.params.get("path"),
            Some(&Value::Text("Assets/A.prefab".to_owned()))
        );
        assert_eq!(request.params.get("max_depth"), Some(&Value::Integer(1)));
        assert_eq!(
            request.params.get("include_properties"),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn missing_params_default_to_empty() {
        let request = Request::parse(r#"{"id":"a","command":"ping"}"#).expect("parse");
        assert!(request.params.is_empty());
    }

    #[test]
    fn nested_params_are_kept_as_raw_text() {
        let request =
            Request::parse(r#"{"id":"a","command":"x","params":{"opts":{"k":[1,2]}}}"#)
                .expect("parse");
        assert_eq!(
            request.params.get("opts"),
            Some(&Value::Text(r#"{"k":[1,2]}"#.to_owned()))
        );
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let request = Request::parse(r#"{"id":12,"command":"ping"}"#).expect("parse");
        assert_eq!(request.id, "12");
    }

    #[rstest]
    #[case::blank("   ", "")]
    #[case::not_json("{oops", "")]
    #[case::not_object("[1,2]", "")]
    #[case::missing_command(r#"{"id":"9"}"#, "9")]
    #[case::empty_command(r#"{"id":"9","command":"  "}"#, "9")]
    #[case::numeric_command(r#"{"id":"9","command":4}"#, "9")]
    #[case::bad_params(r#"{"id":"9","command":"ping","params":[1]}"#, "9")]
    fn malformed_lines_keep_recoverable_id(#[case] line: &str, #[case] expected_id: &str) {
        let error = Request::parse(line).expect_err("line should be rejected");
        assert_eq!(error.id, expected_id);
    }

    #[test]
    fn encodes_single_line() {
        let line = Request::new("1", "ping")
            .with_param("verbose", true)
            .to_line()
            .expect("encode");
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        assert_eq!(Request::parse(&line).expect("decode").command, "ping");
    }
}
