use serde::{Deserialize, Serialize};
use std::cell::RefCell;

///
/// Metrics
/// Ephemeral, in-memory counters for statements issued and rows decoded.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StatementCounters {
    pub ddl: u64,
    pub selects: u64,
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
    pub rows_decoded: u64,
}

///
/// StatementKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum StatementKind {
    Ddl,
    Select,
    Insert,
    Update,
    Delete,
}

thread_local! {
    static STATE: RefCell<StatementCounters> = RefCell::new(StatementCounters::default());
}

fn with_state_mut<R>(f: impl FnOnce(&mut StatementCounters) -> R) -> R {
    STATE.with(|m| f(&mut m.borrow_mut()))
}

pub(crate) fn record_statement(kind: StatementKind) {
    with_state_mut(|m| {
        let counter = match kind {
            StatementKind::Ddl => &mut m.ddl,
            StatementKind::Select => &mut m.selects,
            StatementKind::Insert => &mut m.inserts,
            StatementKind::Update => &mut m.updates,
            StatementKind::Delete => &mut m.deletes,
        };
        *counter += 1;
    });
}

pub(crate) fn record_rows_decoded(rows: u64) {
    with_state_mut(|m| m.rows_decoded += rows);
}

/// Point-in-time snapshot of the counters.
#[must_use]
pub fn report() -> StatementCounters {
    STATE.with(|m| *m.borrow())
}

/// Reset all counters (useful in tests).
pub fn reset() {
    with_state_mut(|m| *m = StatementCounters::default());
}
