use serde::{Deserialize, Serialize};
use siltdb_core::{
    DbError,
    codec::CodecError,
    engine::EngineErrorKind,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<DbError> for Error {
    fn from(err: DbError) -> Self {
        let message = err.to_string();

        match err {
            DbError::Codec(inner) => {
                let kind = match inner {
                    CodecError::Corrupt { .. } => ErrorKind::Corruption,
                    _ => ErrorKind::Invalid,
                };

                Self::new(kind, ErrorOrigin::Codec, message)
            }
            DbError::Engine(inner) => {
                let kind = match inner.kind {
                    EngineErrorKind::Constraint => ErrorKind::Conflict,
                    EngineErrorKind::Io => ErrorKind::Io,
                    EngineErrorKind::Type => ErrorKind::Invalid,
                    EngineErrorKind::Other => ErrorKind::Internal,
                };

                Self::new(kind, ErrorOrigin::Engine, message)
            }
            DbError::Filter(_) => Self::new(ErrorKind::Invalid, ErrorOrigin::Filter, message),
            DbError::Hook(_) => Self::new(ErrorKind::Invalid, ErrorOrigin::Hook, message),
            DbError::Schema(_) => Self::new(ErrorKind::Invalid, ErrorOrigin::Schema, message),
        }
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorKind {
    Conflict,
    Corruption,
    Internal,
    Invalid,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Conflict => "conflict",
            Self::Corruption => "corruption",
            Self::Internal => "internal",
            Self::Invalid => "invalid",
            Self::Io => "io",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// The layer an error surfaced from.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorOrigin {
    Codec,
    Engine,
    Filter,
    Hook,
    Schema,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Codec => "codec",
            Self::Engine => "engine",
            Self::Filter => "filter",
            Self::Hook => "hook",
            Self::Schema => "schema",
        };
        write!(f, "{label}")
    }
}
