use derive_more::{Deref, DerefMut, IntoIterator};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

///
/// Engine seam
///
/// The storage engine is an external collaborator. This layer produces SQL
/// text plus named parameters and hands both across this trait; connection
/// handling, transactions, and file I/O live on the other side.
///

///
/// SqlValue
///
/// Native storage value, one variant per engine storage class.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[remain::sorted]
pub enum SqlValue {
    Blob(Vec<u8>),
    Integer(i64),
    #[default]
    Null,
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// Stable storage-class label for mismatch reporting.
    #[must_use]
    pub const fn class(&self) -> &'static str {
        match self {
            Self::Blob(_) => "blob",
            Self::Integer(_) => "integer",
            Self::Null => "null",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
        }
    }
}

///
/// Params
///
/// Named parameter map bound alongside one statement. Names never carry the
/// leading `:`; the engine side prefixes per its placeholder syntax.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, IntoIterator, PartialEq)]
pub struct Params(BTreeMap<String, SqlValue>);

impl Params {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Move every entry of `other` into this map.
    ///
    /// Caller guarantees name disjointness; a collision here is a bug in
    /// parameter-pool scoping, so it is surfaced loudly in debug builds.
    pub fn merge(&mut self, other: Self) {
        for (name, value) in other {
            let previous = self.0.insert(name, value);
            debug_assert!(previous.is_none(), "parameter name collision");
        }
    }
}

impl FromIterator<(String, SqlValue)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, SqlValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// RawRow
///
/// One undecoded result row: output column name → native value.
///

pub type RawRow = BTreeMap<String, SqlValue>;

///
/// ExecOutcome
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    pub last_insert_id: i64,
}

///
/// Engine
///
/// One statement in, one result out. Implementations execute statements
/// sequentially per handle; this layer never wraps calls in transactions,
/// retries, or cancellation.
///

pub trait Engine {
    /// Execute a non-returning statement (DDL, INSERT, UPDATE, DELETE).
    fn execute(&self, sql: &str, params: &Params) -> Result<ExecOutcome, EngineError>;

    /// Execute a row-returning statement (SELECT).
    fn query(&self, sql: &str, params: &Params) -> Result<Vec<RawRow>, EngineError>;
}

///
/// EngineError
///
/// Propagated verbatim from statement execution; never retried or
/// reclassified by this layer.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("engine error ({kind}): {message}")]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

///
/// EngineErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum EngineErrorKind {
    Constraint,
    Io,
    Other,
    Type,
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Constraint => "constraint",
            Self::Io => "io",
            Self::Other => "other",
            Self::Type => "type",
        };
        write!(f, "{label}")
    }
}
