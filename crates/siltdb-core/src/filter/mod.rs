mod compile;
mod wire;

#[cfg(test)]
mod property;

use crate::{engine::Params, value::Value};
use std::ops::{BitAnd, BitOr};
use thiserror::Error as ThisError;

// re-exports
pub use compile::{CompiledPredicate, compile};

///
/// Filter AST
///
/// Closed, schema-agnostic representation of the filter language. The wire
/// shape (`Filter::from_wire`) is decoded into this set exactly once at the
/// boundary; the condition compiler is a total match over it. Constructed
/// per call, consumed once, never persisted.
///

///
/// CmpOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Like,
    NLike,
    Substr,
    NSubstr,
}

impl CmpOp {
    /// Wire spelling, used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::In => "$in",
            Self::Nin => "$nin",
            Self::Like => "$like",
            Self::NLike => "$nlike",
            Self::Substr => "$substr",
            Self::NSubstr => "$nsubstr",
        }
    }
}

///
/// Operand
///
/// Shape of a comparison's right-hand side, decided once at the boundary.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Scalar(Value),
    List(Vec<Value>),
}

///
/// CmpFilter
///

#[derive(Clone, Debug, PartialEq)]
pub struct CmpFilter {
    pub field: String,
    pub op: CmpOp,
    pub operand: Operand,
}

impl CmpFilter {
    fn scalar(field: impl Into<String>, op: CmpOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            operand: Operand::Scalar(value.into()),
        }
    }

    fn list<I>(field: impl Into<String>, op: CmpOp, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self {
            field: field.into(),
            op,
            operand: Operand::List(values.into_iter().map(Into::into).collect()),
        }
    }
}

///
/// Filter
///

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Filter {
    #[default]
    True,
    And(Vec<Self>),
    Or(Vec<Self>),
    Cmp(CmpFilter),
    Exists {
        field: String,
        present: bool,
    },
    /// Escape hatch: a prebuilt fragment with its own parameters, passed
    /// through verbatim. The caller owns its safety.
    Raw {
        statement: String,
        params: Params,
    },
}

impl Filter {
    #[must_use]
    pub const fn and(filters: Vec<Self>) -> Self {
        Self::And(filters)
    }

    #[must_use]
    pub const fn or(filters: Vec<Self>) -> Self {
        Self::Or(filters)
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Cmp(CmpFilter::scalar(field, CmpOp::Eq, value))
    }

    #[must_use]
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Cmp(CmpFilter::scalar(field, CmpOp::Ne, value))
    }

    #[must_use]
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Cmp(CmpFilter::scalar(field, CmpOp::Gt, value))
    }

    #[must_use]
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Cmp(CmpFilter::scalar(field, CmpOp::Gte, value))
    }

    #[must_use]
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Cmp(CmpFilter::scalar(field, CmpOp::Lt, value))
    }

    #[must_use]
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Cmp(CmpFilter::scalar(field, CmpOp::Lte, value))
    }

    #[must_use]
    pub fn like(field: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::Cmp(CmpFilter::scalar(field, CmpOp::Like, pattern))
    }

    #[must_use]
    pub fn not_like(field: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::Cmp(CmpFilter::scalar(field, CmpOp::NLike, pattern))
    }

    #[must_use]
    pub fn substr(field: impl Into<String>, needle: impl Into<Value>) -> Self {
        Self::Cmp(CmpFilter::scalar(field, CmpOp::Substr, needle))
    }

    #[must_use]
    pub fn not_substr(field: impl Into<String>, needle: impl Into<Value>) -> Self {
        Self::Cmp(CmpFilter::scalar(field, CmpOp::NSubstr, needle))
    }

    #[must_use]
    pub fn in_iter<I>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::Cmp(CmpFilter::list(field, CmpOp::In, values))
    }

    #[must_use]
    pub fn not_in_iter<I>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::Cmp(CmpFilter::list(field, CmpOp::Nin, values))
    }

    #[must_use]
    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists {
            field: field.into(),
            present: true,
        }
    }

    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Exists {
            field: field.into(),
            present: false,
        }
    }

    #[must_use]
    pub fn raw(statement: impl Into<String>, params: Params) -> Self {
        Self::Raw {
            statement: statement.into(),
            params,
        }
    }
}

impl BitAnd for Filter {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for Filter {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

///
/// FilterError
///
/// Structurally invalid filter input. The compiler never degrades a
/// malformed filter into "match nothing"; it fails here instead.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum FilterError {
    #[error("combinator '{key}' must be bound to an array of sub-filters")]
    CombinatorShape { key: String },

    #[error("list for field '{field}' may contain scalars only")]
    NonScalarElement { field: String },

    #[error("a filter must be a JSON object")]
    NotAnObject,

    #[error("operator {op} on field '{field}' has an operand of the wrong shape")]
    OperandShape { field: String, op: String },

    #[error("operator object for field '{field}' must carry exactly one recognized operator")]
    OperatorShape { field: String },

    #[error("raw filter must be {{$statement: string, $params: object}}")]
    RawShape,

    #[error("unrecognized operator '{op}'")]
    UnknownOperator { op: String },
}
