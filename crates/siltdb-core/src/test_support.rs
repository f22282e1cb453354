use crate::engine::{Engine, EngineError, ExecOutcome, Params, RawRow};
use std::{cell::RefCell, collections::VecDeque};

///
/// RecordingEngine
///
/// Test double for the engine seam: records every statement and parameter
/// map, replays canned result sets, and fails on demand. Statement text is
/// asserted against directly — the SQL is the contract under test.
///

#[derive(Debug, Default)]
pub(crate) struct RecordingEngine {
    pub calls: RefCell<Vec<(String, Params)>>,
    pub canned_rows: RefCell<VecDeque<Vec<RawRow>>>,
    pub next_outcome: RefCell<ExecOutcome>,
    pub fail_next: RefCell<Option<EngineError>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one result set for the next `query` call.
    pub fn push_rows(&self, rows: Vec<RawRow>) {
        self.canned_rows.borrow_mut().push_back(rows);
    }

    /// Configure the outcome returned by subsequent `execute` calls.
    pub fn set_outcome(&self, outcome: ExecOutcome) {
        *self.next_outcome.borrow_mut() = outcome;
    }

    /// Fail the next call with `err`.
    pub fn fail_with(&self, err: EngineError) {
        *self.fail_next.borrow_mut() = Some(err);
    }

    pub fn statements(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn last_call(&self) -> (String, Params) {
        self.calls
            .borrow()
            .last()
            .cloned()
            .expect("an engine call was expected")
    }
}

impl Engine for RecordingEngine {
    fn execute(&self, sql: &str, params: &Params) -> Result<ExecOutcome, EngineError> {
        self.calls
            .borrow_mut()
            .push((sql.to_string(), params.clone()));

        if let Some(err) = self.fail_next.borrow_mut().take() {
            return Err(err);
        }

        Ok(*self.next_outcome.borrow())
    }

    fn query(&self, sql: &str, params: &Params) -> Result<Vec<RawRow>, EngineError> {
        self.calls
            .borrow_mut()
            .push((sql.to_string(), params.clone()));

        if let Some(err) = self.fail_next.borrow_mut().take() {
            return Err(err);
        }

        Ok(self.canned_rows.borrow_mut().pop_front().unwrap_or_default())
    }
}
