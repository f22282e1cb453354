use crate::{
    codec,
    collection::Collection,
    engine::{Engine, Params},
    error::DbError,
    obs::metrics::{StatementKind, record_statement},
    schema::{Column, ColumnDefault},
    sql,
};

///
/// DDL synthesis
///
/// `CREATE TABLE IF NOT EXISTS` plus one `CREATE INDEX IF NOT EXISTS` per
/// indexed column. Idempotent; safe to call repeatedly. Computed defaults
/// never reach DDL — they live in the mutation pipeline.
///

impl<E: Engine> Collection<E> {
    /// Issue the table and index DDL for this collection's schema.
    pub fn build(&self) -> Result<(), DbError> {
        let params = Params::new();

        self.engine().execute(&self.create_table_sql()?, &params)?;
        record_statement(StatementKind::Ddl);

        for statement in self.create_index_sql() {
            self.engine().execute(&statement, &params)?;
            record_statement(StatementKind::Ddl);
        }

        Ok(())
    }

    fn create_table_sql(&self) -> Result<String, DbError> {
        let schema = self.schema();
        let mut items = Vec::with_capacity(schema.columns.len() + 1);

        for column in &schema.columns {
            items.push(column_def(column)?);
        }

        if !schema.primary_key.is_empty() {
            items.push(format!("PRIMARY KEY ({})", quoted_list(&schema.primary_key)));
        }
        for set in &schema.unique_sets {
            items.push(format!("UNIQUE ({})", quoted_list(set)));
        }

        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            sql::quote_ident(&schema.name),
            items.join(", ")
        ))
    }

    fn create_index_sql(&self) -> Vec<String> {
        let schema = self.schema();

        schema
            .columns
            .iter()
            .filter(|column| column.indexed)
            .map(|column| {
                let index_name = format!("idx_{}_{}", schema.name, column.name);

                format!(
                    "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                    sql::quote_ident(&index_name),
                    sql::quote_ident(&schema.name),
                    sql::quote_ident(&column.name),
                )
            })
            .collect()
    }
}

fn column_def(column: &Column) -> Result<String, DbError> {
    let mut def = format!(
        "{} {}",
        sql::quote_ident(&column.name),
        column.ty.storage().sql_type()
    );

    if !column.nullable {
        def.push_str(" NOT NULL");
    }
    if column.unique {
        def.push_str(" UNIQUE");
    }
    if let Some(ColumnDefault::Literal(value)) = &column.default {
        let native = codec::encode(column.ty, value)?;
        def.push_str(&format!(" DEFAULT {}", sql::literal(&native)));
    }
    if let Some(fk) = &column.references {
        def.push_str(&format!(
            " REFERENCES {} ({})",
            sql::quote_ident(&fk.table),
            sql::quote_ident(&fk.column),
        ));
    }

    Ok(def)
}

fn quoted_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| sql::quote_ident(c).into_owned())
        .collect::<Vec<_>>()
        .join(", ")
}
