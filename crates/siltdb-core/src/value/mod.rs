mod timestamp;


use serde::{Deserialize, Serialize};

// re-exports
pub use timestamp::Timestamp;

///
/// Value
///
/// Logical application-level value, distinct from the engine's native
/// storage representation (`engine::SqlValue`). Extended variants
/// (Timestamp, Json, TextSet, Bool) round-trip through native storage via
/// the codec layer.
///
/// Null → the field's value is absent (SQL NULL on the storage side).
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[remain::sorted]
pub enum Value {
    Blob(Vec<u8>),
    Bool(bool),
    Float(f64),
    Int(i64),
    Json(serde_json::Value),
    #[default]
    Null,
    Text(String),
    TextSet(Vec<String>),
    Timestamp(Timestamp),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Stable label used in error messages and codec mismatch reporting.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Blob(_) => "blob",
            Self::Bool(_) => "bool",
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Json(_) => "json",
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::TextSet(_) => "text_set",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Map a JSON wire value onto the closed logical value set.
    ///
    /// Integral numbers become `Int`, all other numbers `Float`; arrays and
    /// objects are carried as `Json` documents.
    #[must_use]
    pub fn from_wire(wire: &serde_json::Value) -> Self {
        match wire {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Self::Json(wire.clone()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Self::TextSet(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Self::Timestamp(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
