//! The persisted POS document.
//!
//! The whole application state (catalog, staff, sales, loyalty members,
//! settings, ...) lives in one JSON object. The server never looks inside the
//! nested records, so they stay generic [`serde_json::Value`] trees.

use core::fmt;

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Key every stored document must contain to be considered valid.
pub const REQUIRED_KEY: &str = "products";

/// Key holding the application settings object.
pub const SETTINGS_KEY: &str = "settings";

/// Top-level keys holding ordered record lists, in the order they are written.
pub const COLLECTION_KEYS: [&str; 7] = [
    "products",
    "users",
    "logs",
    "sales",
    "members",
    "discountCodes",
    "qrCodes",
];

/// Application name shipped in the default settings.
pub const DEFAULT_APP_NAME: &str = "POS Startosphere";

/// Currency code shipped in the default settings.
pub const DEFAULT_CURRENCY: &str = "THB";

/// Tax rate (percent) shipped in the default settings.
pub const DEFAULT_TAX_RATE: f64 = 7.0;

/// Errors that can occur when turning a JSON value into a [`Document`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The top-level value is not a JSON object.
    #[error("document must be a JSON object, found {found}")]
    NotAnObject {
        /// JSON kind that was found instead.
        found: &'static str,
    },
    /// The object has no `products` key.
    #[error("document is missing the `products` key")]
    MissingProducts,
}

/// The entire persisted application state.
///
/// A `Document` is always a JSON object containing at least a `products`
/// key. Nothing below the top level is validated.
///
/// ## Examples
///
/// ```
/// use serde_json::json;
/// use startosphere_core::Document;
///
/// let doc = Document::try_from(json!({"products": []})).unwrap();
/// assert!(doc.get("products").is_some());
///
/// assert!(Document::try_from(json!({})).is_err());
/// assert!(Document::try_from(json!([1, 2, 3])).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Validate the top-level shape of `value` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::NotAnObject`] for arrays, strings, numbers,
    /// booleans and null, and [`ShapeError::MissingProducts`] for objects
    /// without a `products` key.
    pub fn from_value(value: Value) -> Result<Self, ShapeError> {
        match value {
            Value::Object(map) if map.contains_key(REQUIRED_KEY) => Ok(Self(map)),
            Value::Object(_) => Err(ShapeError::MissingProducts),
            other => Err(ShapeError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// Returns the value stored under a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the `settings` object, if present and an object.
    #[must_use]
    pub fn settings(&self) -> Option<&Map<String, Value>> {
        self.0.get(SETTINGS_KEY).and_then(Value::as_object)
    }

    /// Returns the top-level map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the document and returns the top-level map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Default for Document {
    /// The fallback state used when nothing valid is stored yet: every record
    /// list empty and the stock settings filled in.
    fn default() -> Self {
        let mut map = Map::new();
        for key in COLLECTION_KEYS {
            map.insert(key.to_owned(), Value::Array(Vec::new()));
        }
        map.insert(
            SETTINGS_KEY.to_owned(),
            json!({
                "appName": DEFAULT_APP_NAME,
                "currency": DEFAULT_CURRENCY,
                "taxRate": DEFAULT_TAX_RATE,
            }),
        );
        Self(map)
    }
}

impl TryFrom<Value> for Document {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Self::Object(doc.0)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "Document[{}]", keys.join(", "))
    }
}

/// Human-readable name of a JSON value's kind, for log and error messages.
#[must_use]
pub const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
