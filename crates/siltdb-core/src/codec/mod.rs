
use crate::{
    engine::SqlValue,
    schema::ColumnType,
    value::{Timestamp, Value},
};
use serde_json::json;
use thiserror::Error as ThisError;

///
/// Type transform registry
///
/// Bidirectional codecs between logical values and native storage, one pair
/// per extended column type. Native types pass through with storage-class
/// checks. `decode(encode(x)) == x` for every valid `x`, with two documented
/// exceptions:
///
/// - Timestamp: only the epoch-millisecond field is authoritative; the
///   RFC 3339 mirror inside the stored document is informational.
/// - TextSet: a member containing the unit separator is not representable
///   and is rejected at encode time.
///

/// Unit separator bounding every TextSet member in storage.
pub const SET_SEPARATOR: char = '\u{1f}';

/// Timestamp storage document field holding the authoritative millisecond
/// count.
pub const TS_EPOCH_FIELD: &str = "epoch";

/// Timestamp storage document field holding the human-readable mirror.
pub const TS_ISO_FIELD: &str = "iso";

/// Encode a logical value for storage in a column of type `ty`.
///
/// Null always encodes to SQL NULL regardless of column type.
pub fn encode(ty: ColumnType, value: &Value) -> Result<SqlValue, CodecError> {
    if value.is_null() {
        return Ok(SqlValue::Null);
    }

    match (ty, value) {
        (ColumnType::Blob, Value::Blob(b)) => Ok(SqlValue::Blob(b.clone())),
        (ColumnType::Bool, Value::Bool(b)) => Ok(SqlValue::Integer(i64::from(*b))),
        (ColumnType::Integer, Value::Int(i)) => Ok(SqlValue::Integer(*i)),
        (ColumnType::Real, Value::Float(f)) => Ok(SqlValue::Real(*f)),
        (ColumnType::Real, Value::Int(i)) => Ok(SqlValue::Real(*i as f64)),
        (ColumnType::Text, Value::Text(s)) => Ok(SqlValue::Text(s.clone())),
        (ColumnType::Json, Value::Json(doc)) => Ok(SqlValue::Text(doc.to_string())),
        (ColumnType::TextSet, Value::TextSet(members)) => encode_text_set(members),
        (ColumnType::Timestamp, Value::Timestamp(ts)) => Ok(encode_timestamp(*ts)),
        // epoch milliseconds are accepted wherever a timestamp is expected
        (ColumnType::Timestamp, Value::Int(ms)) => Ok(encode_timestamp(Timestamp::from_millis(*ms))),
        (_, other) => Err(CodecError::ValueMismatch {
            ty,
            found: other.kind(),
        }),
    }
}

/// Decode one stored native value back into the logical value space.
///
/// SQL NULL decodes to `Value::Null` for every column type. A malformed
/// persisted representation is corruption, not a caller error.
pub fn decode(ty: ColumnType, value: &SqlValue) -> Result<Value, CodecError> {
    match (ty, value) {
        (_, SqlValue::Null) => Ok(Value::Null),
        (ColumnType::Blob, SqlValue::Blob(b)) => Ok(Value::Blob(b.clone())),
        (ColumnType::Bool, SqlValue::Integer(n)) => Ok(Value::Bool(*n != 0)),
        (ColumnType::Integer, SqlValue::Integer(i)) => Ok(Value::Int(*i)),
        (ColumnType::Real, SqlValue::Real(f)) => Ok(Value::Float(*f)),
        (ColumnType::Real, SqlValue::Integer(i)) => Ok(Value::Float(*i as f64)),
        (ColumnType::Text, SqlValue::Text(s)) => Ok(Value::Text(s.clone())),
        (ColumnType::Json, SqlValue::Text(s)) => serde_json::from_str(s)
            .map(Value::Json)
            .map_err(|err| CodecError::Corrupt {
                ty,
                message: err.to_string(),
            }),
        (ColumnType::TextSet, SqlValue::Text(s)) => Ok(Value::TextSet(
            s.split(SET_SEPARATOR)
                .filter(|m| !m.is_empty())
                .map(ToString::to_string)
                .collect(),
        )),
        (ColumnType::Timestamp, SqlValue::Text(s)) => decode_timestamp(s),
        (_, other) => Err(CodecError::StorageMismatch {
            ty,
            found: other.class(),
        }),
    }
}

/// Total logical → native mapping for values with no declared column.
///
/// Used when binding filter operands against unknown/computed fields and
/// when passing unrecognized entry fields through to the engine.
#[must_use]
pub fn encode_raw(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Blob(b) => SqlValue::Blob(b.clone()),
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Float(f) => SqlValue::Real(*f),
        Value::Int(i) => SqlValue::Integer(*i),
        Value::Json(doc) => SqlValue::Text(doc.to_string()),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::TextSet(members) => SqlValue::Text(join_text_set(members)),
        // operands compare against the extracted epoch field, so the bound
        // form is the bare millisecond count
        Value::Timestamp(ts) => SqlValue::Integer(ts.millis()),
    }
}

/// Total native → logical mapping for result fields with no declared
/// column (computed and aliased output columns pass through undecoded).
#[must_use]
pub fn decode_raw(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Blob(b) => Value::Blob(b.clone()),
        SqlValue::Integer(i) => Value::Int(*i),
        SqlValue::Real(f) => Value::Float(*f),
        SqlValue::Text(s) => Value::Text(s.clone()),
    }
}

fn encode_timestamp(ts: Timestamp) -> SqlValue {
    let doc = json!({
        TS_ISO_FIELD: ts.to_rfc3339(),
        TS_EPOCH_FIELD: ts.millis(),
    });

    SqlValue::Text(doc.to_string())
}

// Reconstruct from the millisecond field only; the mirror string is never
// consulted.
fn decode_timestamp(stored: &str) -> Result<Value, CodecError> {
    let doc: serde_json::Value =
        serde_json::from_str(stored).map_err(|err| CodecError::Corrupt {
            ty: ColumnType::Timestamp,
            message: err.to_string(),
        })?;

    let millis = doc
        .get(TS_EPOCH_FIELD)
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| CodecError::Corrupt {
            ty: ColumnType::Timestamp,
            message: format!("missing numeric '{TS_EPOCH_FIELD}' field"),
        })?;

    Ok(Value::Timestamp(Timestamp::from_millis(millis)))
}

fn encode_text_set(members: &[String]) -> Result<SqlValue, CodecError> {
    for member in members {
        if member.contains(SET_SEPARATOR) {
            return Err(CodecError::SeparatorInMember {
                member: member.clone(),
            });
        }
    }

    Ok(SqlValue::Text(join_text_set(members)))
}

fn join_text_set(members: &[String]) -> String {
    let mut out = String::new();
    out.push(SET_SEPARATOR);
    for member in members {
        out.push_str(member);
        out.push(SET_SEPARATOR);
    }

    out
}

///
/// CodecError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum CodecError {
    #[error("corrupt stored {ty:?} representation: {message}")]
    Corrupt { ty: ColumnType, message: String },

    #[error("text-set member contains the reserved separator: {member:?}")]
    SeparatorInMember { member: String },

    #[error("stored class '{found}' does not match column type {ty:?}")]
    StorageMismatch { ty: ColumnType, found: &'static str },

    #[error("value kind '{found}' does not match column type {ty:?}")]
    ValueMismatch { ty: ColumnType, found: &'static str },
}
