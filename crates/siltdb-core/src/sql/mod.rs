mod ident;


use crate::engine::{Params, SqlValue};

pub use ident::{is_reserved, quote_ident, sanitize_param};

///
/// SQL text helpers
///
/// Everything here deals in identifiers, fixed keywords, and DDL literals.
/// Query values never pass through this module as statement text; they are
/// always bound as named parameters.
///

/// Render a possibly table-qualified column reference.
///
/// `a.b` quotes both sides (`"a"."b"`); a bare name quotes once.
#[must_use]
pub fn column_ref(field: &str) -> String {
    match field.split_once('.') {
        Some((table, column)) => format!("{}.{}", quote_ident(table), quote_ident(column)),
        None => quote_ident(field).into_owned(),
    }
}

/// Render a native value as a DDL literal.
///
/// Used only for schema-declared column defaults, where the engine offers
/// no parameter binding.
#[must_use]
pub fn literal(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Real(r) => {
            // keep a decimal point so the engine types the default as REAL
            if r.fract() == 0.0 && r.is_finite() {
                format!("{r:.1}")
            } else {
                r.to_string()
            }
        }
        SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        SqlValue::Blob(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2);
            for b in bytes {
                hex.push_str(&format!("{b:02X}"));
            }
            format!("X'{hex}'")
        }
    }
}

///
/// ParamPool
///
/// Predicate-side parameter name generator: `p1`, `p2`, … scoped to one
/// compile invocation. Fresh pool per call means sibling branches can never
/// collide, and concurrent compilations share no state.
///

#[derive(Debug, Default)]
pub struct ParamPool {
    next: u32,
}

impl ParamPool {
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Bind `value` under a fresh name and return the name.
    pub fn bind(&mut self, params: &mut Params, value: SqlValue) -> String {
        self.next += 1;
        let name = format!("p{}", self.next);
        params.insert(name.clone(), value);

        name
    }
}

///
/// AssignPool
///
/// Assignment-side parameter names: `s_<column>`, sanitized to the engine's
/// identifier charset and collision-checked within one statement. The `s_`
/// prefix keeps the pool disjoint from predicate names by construction.
///

#[derive(Debug, Default)]
pub struct AssignPool {
    used: std::collections::BTreeSet<String>,
}

impl AssignPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a unique assignment parameter name for `column`.
    pub fn name_for(&mut self, column: &str) -> String {
        let base = format!("s_{}", sanitize_param(column));
        let mut name = base.clone();
        let mut n = 1u32;
        while !self.used.insert(name.clone()) {
            n += 1;
            name = format!("{base}_{n}");
        }

        name
    }
}
