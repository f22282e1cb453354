use crate::{
    codec,
    collection::{Collection, Entry, FindOptions, Projection},
    engine::{Engine, RawRow, SqlValue},
    error::DbError,
    filter::{Filter, compile},
    obs::metrics::{StatementKind, record_rows_decoded, record_statement},
    sql,
};

///
/// Read path
///
/// Every read compiles the filter against this table's column map, issues
/// exactly one SELECT, and decodes each returned field through its column
/// codec. Fields with no declared column pass through undecoded.
///

impl<E: Engine> Collection<E> {
    /// Find all rows matching `filter`.
    pub fn find(
        &self,
        filter: &Filter,
        projection: &Projection,
        options: &FindOptions,
    ) -> Result<Vec<Entry>, DbError> {
        let predicate = compile(filter, self.columns())?;
        let statement = format!(
            "SELECT {} FROM {} WHERE {}{}",
            self.select_list(projection),
            sql::quote_ident(self.name()),
            predicate.statement,
            options.suffix(),
        );

        let rows = self.engine().query(&statement, &predicate.params)?;
        record_statement(StatementKind::Select);

        rows.into_iter()
            .map(|row| self.decode_row(row).map_err(DbError::from))
            .collect()
    }

    /// Find at most one row matching `filter`.
    pub fn get(&self, filter: &Filter, projection: &Projection) -> Result<Option<Entry>, DbError> {
        let options = FindOptions::new().limit(1);

        Ok(self.find(filter, projection, &options)?.into_iter().next())
    }

    /// Count rows matching `filter`.
    pub fn count(&self, filter: &Filter) -> Result<u64, DbError> {
        let predicate = compile(filter, self.columns())?;
        let statement = format!(
            "SELECT COUNT(*) AS cnt FROM {} WHERE {}",
            sql::quote_ident(self.name()),
            predicate.statement,
        );

        let rows = self.engine().query(&statement, &predicate.params)?;
        record_statement(StatementKind::Select);

        let count = rows
            .first()
            .and_then(|row| row.get("cnt"))
            .and_then(|value| match value {
                SqlValue::Integer(n) => u64::try_from(*n).ok(),
                _ => None,
            })
            .unwrap_or(0);

        Ok(count)
    }

    /// Whether any row matches `filter`.
    pub fn exists(&self, filter: &Filter) -> Result<bool, DbError> {
        let predicate = compile(filter, self.columns())?;
        let statement = format!(
            "SELECT 1 AS present FROM {} WHERE {} LIMIT 1",
            sql::quote_ident(self.name()),
            predicate.statement,
        );

        let rows = self.engine().query(&statement, &predicate.params)?;
        record_statement(StatementKind::Select);

        Ok(!rows.is_empty())
    }

    fn select_list(&self, projection: &Projection) -> String {
        match projection {
            Projection::All => self
                .schema()
                .columns
                .iter()
                .map(|column| sql::quote_ident(&column.name).into_owned())
                .collect::<Vec<_>>()
                .join(", "),
            Projection::Fields(fields) => fields
                .iter()
                .map(|field| sql::column_ref(field))
                .collect::<Vec<_>>()
                .join(", "),
            Projection::Aliased(pairs) => pairs
                .iter()
                .map(|(source, alias)| {
                    format!("{} AS {}", sql::column_ref(source), sql::quote_ident(alias))
                })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Decode one raw result row. Unrecognized fields (computed or aliased
    /// output columns) pass through unmodified rather than failing.
    pub(crate) fn decode_row(&self, raw: RawRow) -> Result<Entry, codec::CodecError> {
        let decoded = raw
            .into_iter()
            .map(|(field, native)| {
                let value = match self.schema().column_def(&field) {
                    Some(column) => codec::decode(column.ty, &native)?,
                    None => codec::decode_raw(&native),
                };

                Ok((field, value))
            })
            .collect::<Result<Entry, codec::CodecError>>()?;

        record_rows_decoded(1);

        Ok(decoded)
    }
}
