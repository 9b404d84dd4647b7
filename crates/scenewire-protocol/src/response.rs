//! Response envelope.

use serde::{Deserialize, Serialize};

/// The server's answer to one [`crate::Request`].
///
/// `error` is non-null exactly when `success` is false. `data` is omitted from
/// the encoded line when there is no payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Id echoed from the request, or empty when none could be recovered.
    pub id: String,
    /// Whether the command completed.
    pub success: bool,
    /// Command payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Failure message on error.
    #[serde(default)]
    pub error: Option<String>,
}

impl Response {
    /// Builds a successful response; a JSON `null` payload is dropped.
    #[must_use]
    pub fn success(id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            success: true,
            data: (!data.is_null()).then_some(data),
            error: None,
        }
    }

    /// Builds a failed response.
    #[must_use]
    pub fn failure(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Encodes the response as one newline-terminated line.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Decodes one response line.
    ///
    /// # Errors
    ///
    /// Returns the decoder error when the line is not a response object.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }
}
