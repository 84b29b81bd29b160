//! Request and response types for the GraphQL endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

/// JSON body of a GraphQL POST.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    /// Query document, sent verbatim.
    pub query: &'a str,
    /// Variables object.
    pub variables: &'a Value,
    /// Operation to execute when the document holds several.
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'a str>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

/// A GraphQL-level error reported alongside (or instead of) data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Path to the field that failed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    /// Source locations in the query document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Value>,
    /// Server-specific details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQlError {
    /// Interpret one item of an `errors` collection.
    ///
    /// A bare string becomes the message. Anything that does not fit the
    /// usual shape is kept verbatim under `extensions`.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(message) => Self::with_message(message),
            Value::Object(_) => serde_json::from_value(value.clone())
                .unwrap_or_else(|_| Self::raw(value)),
            other => Self::raw(other),
        }
    }

    fn with_message(message: String) -> Self {
        Self {
            message,
            path: Vec::new(),
            locations: Vec::new(),
            extensions: None,
        }
    }

    fn raw(value: Value) -> Self {
        let mut error = Self::with_message(value.to_string());
        error.extensions = Some(value);
        error
    }
}

/// Normalized result of a GraphQL call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedResult {
    /// The `data` portion of the response.
    pub data: Value,
    /// GraphQL errors returned with the data (non-fatal).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQlError>,
    /// Whether the data was served from the cache.
    #[serde(skip)]
    pub cached: bool,
}

impl ParsedResult {
    /// Build a result for data served from the cache.
    pub fn from_cache(data: Value) -> Self {
        Self {
            data,
            errors: Vec::new(),
            cached: true,
        }
    }

    /// Whether the server reported partial errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Take the data portion.
    pub fn into_data(self) -> Value {
        self.data
    }

    /// Parse a successful response body.
    ///
    /// A body that is blank, not JSON, an empty object, or has neither
    /// `data` nor `errors` is rejected as [`Error::EmptyResponse`]. A body
    /// with errors but no data yields an empty object as data.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::EmptyResponse("response body is empty".to_string()));
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| Error::EmptyResponse(format!("response body is not JSON: {}", e)))?;

        let Value::Object(mut body) = value else {
            return Err(Error::EmptyResponse(
                "response body is not a JSON object".to_string(),
            ));
        };
        if body.is_empty() {
            return Err(Error::EmptyResponse(
                "response body is an empty object".to_string(),
            ));
        }

        let errors: Vec<GraphQlError> = match body.remove("errors") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.into_iter().map(GraphQlError::from_value).collect(),
            Some(single) => vec![GraphQlError::from_value(single)],
        };

        let data = match body.remove("data") {
            None | Some(Value::Null) => None,
            Some(data) => Some(data),
        };

        match data {
            Some(data) => Ok(Self {
                data,
                errors,
                cached: false,
            }),
            None if !errors.is_empty() => Ok(Self {
                data: Value::Object(Map::new()),
                errors,
                cached: false,
            }),
            None => Err(Error::EmptyResponse(
                "response has no data payload".to_string(),
            )),
        }
    }
}
