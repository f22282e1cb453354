
use crate::value::Value;
use derive_more::{Deref, DerefMut, IntoIterator};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// StorageClass
///
/// Native storage class on the engine side. Every logical column type maps
/// to exactly one storage class.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum StorageClass {
    Blob,
    Integer,
    Real,
    Text,
}

impl StorageClass {
    #[must_use]
    pub const fn sql_type(self) -> &'static str {
        match self {
            Self::Blob => "BLOB",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }
}

///
/// ColumnType
///
/// Logical column type: the native set plus the extended set (Timestamp,
/// Json, TextSet, Bool) that round-trips through native storage via the
/// codec layer.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ColumnType {
    Blob,
    Bool,
    Integer,
    Json,
    Real,
    Text,
    TextSet,
    Timestamp,
}

impl ColumnType {
    #[must_use]
    pub const fn storage(self) -> StorageClass {
        match self {
            Self::Blob => StorageClass::Blob,
            Self::Bool | Self::Integer => StorageClass::Integer,
            Self::Real => StorageClass::Real,
            Self::Json | Self::Text | Self::TextSet | Self::Timestamp => StorageClass::Text,
        }
    }

    /// Extended types are the ones with a non-identity codec.
    #[must_use]
    pub const fn is_extended(self) -> bool {
        matches!(self, Self::Bool | Self::Json | Self::TextSet | Self::Timestamp)
    }
}

///
/// ColumnDefault
///
/// A literal default is emitted into DDL; a computed default never is — it
/// becomes a before-create pipeline hook instead.
///

#[derive(Clone, Debug)]
pub enum ColumnDefault {
    Literal(Value),
    Computed(fn() -> Value),
}

///
/// ForeignKey
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

///
/// Column
///

#[derive(Clone, Debug)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    pub indexed: bool,
    pub default: Option<ColumnDefault>,
    pub references: Option<ForeignKey>,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: true,
            unique: false,
            indexed: false,
            default: None,
            references: None,
        }
    }

    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub const fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    #[must_use]
    pub fn default_literal(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(ColumnDefault::Literal(value.into()));
        self
    }

    #[must_use]
    pub fn default_computed(mut self, f: fn() -> Value) -> Self {
        self.default = Some(ColumnDefault::Computed(f));
        self
    }

    #[must_use]
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(ForeignKey {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

///
/// TableSchema
///
/// One table: ordered columns, primary key (single or composite), composite
/// unique sets, and optional auto-managed timestamp columns.
///

#[derive(Clone, Debug, Default)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Vec<String>,
    pub unique_sets: Vec<Vec<String>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl TableSchema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn unique_together<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_sets
            .push(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Declare the auto-managed creation timestamp column.
    #[must_use]
    pub fn created_at(mut self, column: impl Into<String>) -> Self {
        self.created_at = Some(column.into());
        self
    }

    /// Declare the auto-managed update timestamp column.
    #[must_use]
    pub fn updated_at(mut self, column: impl Into<String>) -> Self {
        self.updated_at = Some(column.into());
        self
    }

    #[must_use]
    pub fn column_def(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Name → logical type map used by the condition compiler.
    #[must_use]
    pub fn column_map(&self) -> ColumnMap {
        self.columns.iter().map(|c| (c.name.clone(), c.ty)).collect()
    }

    /// Check that every constraint entry references a declared column and
    /// that column names are unique.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = std::collections::BTreeSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        let mut check = |column: &str, context: &'static str| {
            if seen.contains(column) {
                Ok(())
            } else {
                Err(SchemaError::UnknownColumn {
                    table: self.name.clone(),
                    column: column.to_string(),
                    context,
                })
            }
        };

        for column in &self.primary_key {
            check(column, "primary key")?;
        }
        for set in &self.unique_sets {
            for column in set {
                check(column, "unique set")?;
            }
        }
        if let Some(column) = &self.created_at {
            check(column, "created_at")?;
        }
        if let Some(column) = &self.updated_at {
            check(column, "updated_at")?;
        }

        Ok(())
    }
}

///
/// ColumnMap
///
/// Column name → logical type. In join context the map carries both
/// table-qualified and bare names; bare entries are first-table-wins.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, IntoIterator)]
pub struct ColumnMap(BTreeMap<String, ColumnType>);

impl ColumnMap {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Logical type for a field reference, if declared.
    #[must_use]
    pub fn type_of(&self, field: &str) -> Option<ColumnType> {
        self.0.get(field).copied()
    }
}

impl FromIterator<(String, ColumnType)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (String, ColumnType)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// SchemaError
///
/// A declared schema referencing a column that does not exist, or a join
/// contract whose key arities disagree.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum SchemaError {
    #[error("composite join key arity mismatch: {foreign} foreign part(s) vs {local} local part(s)")]
    CompositeKeyArity { foreign: usize, local: usize },

    #[error("table '{table}' declares column '{column}' more than once")]
    DuplicateColumn { table: String, column: String },

    #[error("table '{table}' {context} references unknown column '{column}'")]
    UnknownColumn {
        table: String,
        column: String,
        context: &'static str,
    },
}
