use crate::{
    codec::CodecError, collection::HookError, engine::EngineError, filter::FilterError,
    schema::SchemaError,
};
use thiserror::Error as ThisError;

///
/// DbError
///
/// Aggregate runtime error. Each layer keeps its own structured error type;
/// this enum only carries them across the public CRUD surface.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
#[remain::sorted]
pub enum DbError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
