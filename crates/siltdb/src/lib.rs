//! SiltDB — a schema-first typed query layer over an embedded file-based
//! relational engine.
//!
//! ## Crate layout
//! - `core`: runtime data model, filters, condition compiler, codecs,
//!   collections, joins, and observability.
//! - `error`: the public error taxonomy for callers.
//!
//! The `prelude` module mirrors the runtime surface used by application
//! code.

pub use siltdb_core as core;

mod error;

pub use error::{Error, ErrorKind, ErrorOrigin};

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        collection::{Collection, Entry, FindOptions, OrderDirection, Projection},
        engine::{Engine, EngineError, ExecOutcome, Params, RawRow, SqlValue},
        filter::Filter,
        join::{JoinChain, JoinKind, JoinRow},
        schema::{Column, ColumnType, TableSchema},
        value::{Timestamp, Value},
    };
    pub use crate::{Error, ErrorKind, ErrorOrigin};
}
