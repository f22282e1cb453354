use crate::{
    codec,
    collection::{Collection, Entry},
    engine::{Engine, Params, SqlValue},
    error::DbError,
    filter::{Filter, compile},
    obs::metrics::{StatementKind, record_statement},
    sql::{self, AssignPool},
};

///
/// Write path
///
/// Mutation hooks run first, then every field encodes through its column
/// codec, then exactly one parameterized statement goes to the engine.
/// Assignment parameters (`s_*`) and predicate parameters (`p<n>`) come
/// from disjoint pools, so UPDATE can merge both maps safely.
///

impl<E: Engine> Collection<E> {
    /// Insert one entry and return the engine-assigned row id.
    ///
    /// With `ignore_conflicts`, a uniqueness conflict becomes a no-op via
    /// the conflict clause; every other constraint class still surfaces as
    /// an engine error.
    pub fn create(&self, entry: Entry, ignore_conflicts: bool) -> Result<i64, DbError> {
        let mut entry = entry;
        self.pipeline().run_before_create(&mut entry)?;

        let (columns, placeholders, params) = self.encode_assignments(&entry)?;
        let statement = if columns.is_empty() {
            format!(
                "INSERT INTO {} DEFAULT VALUES",
                sql::quote_ident(self.name())
            )
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({}){}",
                sql::quote_ident(self.name()),
                columns.join(", "),
                placeholders.join(", "),
                if ignore_conflicts {
                    " ON CONFLICT DO NOTHING"
                } else {
                    ""
                },
            )
        };

        let outcome = self.engine().execute(&statement, &params)?;
        record_statement(StatementKind::Insert);

        Ok(outcome.last_insert_id)
    }

    /// Update all rows matching `filter` and return the affected count.
    pub fn update(&self, filter: &Filter, set: Entry) -> Result<u64, DbError> {
        let mut set = set;
        self.pipeline().run_before_update(&mut set)?;

        let (columns, placeholders, mut params) = self.encode_assignments(&set)?;
        if columns.is_empty() {
            // nothing to assign; issuing SET with no assignments is invalid
            return Ok(0);
        }

        let assignments = columns
            .iter()
            .zip(&placeholders)
            .map(|(column, placeholder)| format!("{column} = {placeholder}"))
            .collect::<Vec<_>>()
            .join(", ");

        let predicate = compile(filter, self.columns())?;
        params.merge(predicate.params);

        let statement = format!(
            "UPDATE {} SET {} WHERE {}",
            sql::quote_ident(self.name()),
            assignments,
            predicate.statement,
        );

        let outcome = self.engine().execute(&statement, &params)?;
        record_statement(StatementKind::Update);

        Ok(outcome.rows_affected)
    }

    /// Delete all rows matching `filter` and return the affected count.
    pub fn delete(&self, filter: &Filter) -> Result<u64, DbError> {
        let predicate = compile(filter, self.columns())?;
        let statement = format!(
            "DELETE FROM {} WHERE {}",
            sql::quote_ident(self.name()),
            predicate.statement,
        );

        let outcome = self.engine().execute(&statement, &predicate.params)?;
        record_statement(StatementKind::Delete);

        Ok(outcome.rows_affected)
    }

    // Encode every entry field through its column codec; fields with no
    // declared column pass through raw for the engine to accept or reject.
    fn encode_assignments(
        &self,
        entry: &Entry,
    ) -> Result<(Vec<String>, Vec<String>, Params), DbError> {
        let mut pool = AssignPool::new();
        let mut params = Params::new();
        let mut columns = Vec::with_capacity(entry.len());
        let mut placeholders = Vec::with_capacity(entry.len());

        for (field, value) in entry.iter() {
            let native: SqlValue = match self.schema().column_def(field) {
                Some(column) => codec::encode(column.ty, value)?,
                None => codec::encode_raw(value),
            };

            let name = pool.name_for(field);
            columns.push(sql::quote_ident(field).into_owned());
            placeholders.push(format!(":{name}"));
            params.insert(name, native);
        }

        Ok((columns, placeholders, params))
    }
}
