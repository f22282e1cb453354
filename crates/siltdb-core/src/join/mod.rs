
use crate::{
    codec,
    collection::{Collection, Entry, FindOptions, Projection},
    engine::{Engine, RawRow},
    error::DbError,
    filter::{Filter, compile},
    obs::metrics::{StatementKind, record_rows_decoded, record_statement},
    schema::{ColumnMap, SchemaError},
    sql,
};
use std::collections::BTreeMap;

///
/// Join chain
///
/// Composes collections into one multi-table SELECT: FROM/JOIN fragments in
/// join order, a shared projection map with `table__column` output aliases,
/// and result un-flattening back into per-table structured rows. Built
/// incrementally, consumed by `data()`.
///
/// All participating collections must share the root's engine handle.
///

/// Separator between table and column in generated output aliases.
pub const ALIAS_SEPARATOR: &str = "__";

/// Separator between the parts of a composite join key.
pub const COMPOSITE_SEPARATOR: char = '+';

///
/// JoinKind
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum JoinKind {
    Inner,
    #[default]
    Left,
}

impl JoinKind {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
        }
    }
}

///
/// JoinRow
///
/// One un-flattened result row: table name → that table's decoded fields.
///

pub type JoinRow = BTreeMap<String, Entry>;

///
/// JoinChain
///

pub struct JoinChain<'a, E: Engine> {
    tables: Vec<&'a Collection<E>>,
    from: String,
    projection: Vec<(String, String)>,
    columns: ColumnMap,
}

impl<E: Engine> std::fmt::Debug for JoinChain<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinChain")
            .field("tables", &self.tables.len())
            .field("from", &self.from)
            .field("projection", &self.projection)
            .field("columns", &self.columns)
            .finish()
    }
}

impl<'a, E: Engine> JoinChain<'a, E> {
    /// Seed the chain with its first table.
    ///
    /// An empty projection map at materialization time means "select
    /// everything from every participating table".
    #[must_use]
    pub fn new(root: &'a Collection<E>, projection: &Projection) -> Self {
        let mut chain = Self {
            tables: Vec::new(),
            from: sql::quote_ident(root.name()).into_owned(),
            projection: Vec::new(),
            columns: ColumnMap::new(),
        };
        chain.absorb(root, projection);

        chain
    }

    /// Append `[LEFT|INNER] JOIN target ON foreign = target.local`.
    ///
    /// `foreign_field` may be table-qualified (unqualified parts bind to
    /// the root table) and either side may be a composite key whose parts
    /// are joined by `+`; part counts must agree.
    pub fn join(
        mut self,
        target: &'a Collection<E>,
        foreign_field: &str,
        local_field: &str,
        projection: &Projection,
        kind: JoinKind,
    ) -> Result<Self, SchemaError> {
        let foreign_parts: Vec<&str> = foreign_field.split(COMPOSITE_SEPARATOR).collect();
        let local_parts: Vec<&str> = local_field.split(COMPOSITE_SEPARATOR).collect();
        if foreign_parts.len() != local_parts.len() {
            return Err(SchemaError::CompositeKeyArity {
                foreign: foreign_parts.len(),
                local: local_parts.len(),
            });
        }

        let root = self.tables[0].name().to_string();
        let on = foreign_parts
            .iter()
            .zip(&local_parts)
            .map(|(foreign, local)| {
                let lhs = if foreign.contains('.') {
                    sql::column_ref(foreign)
                } else {
                    format!("{}.{}", sql::quote_ident(&root), sql::quote_ident(foreign))
                };

                format!(
                    "{lhs} = {}.{}",
                    sql::quote_ident(target.name()),
                    sql::quote_ident(local),
                )
            })
            .collect::<Vec<_>>()
            .join(" AND ");

        self.from.push_str(&format!(
            " {} {} ON {on}",
            kind.keyword(),
            sql::quote_ident(target.name()),
        ));
        self.absorb(target, projection);

        Ok(self)
    }

    /// Materialize and execute the joined query.
    pub fn data(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<JoinRow>, DbError> {
        let predicate = compile(filter, &self.columns)?;
        let statement = format!(
            "SELECT {} FROM {} WHERE {}{}",
            self.select_list(),
            self.from,
            predicate.statement,
            options.suffix(),
        );

        let engine = self.tables[0].engine();
        let rows = engine.query(&statement, &predicate.params)?;
        record_statement(StatementKind::Select);

        rows.into_iter()
            .map(|row| self.unflatten(row).map_err(DbError::from))
            .collect()
    }

    // Merge a table's columns (qualified always, bare first-table-wins)
    // and its requested projection into the shared state.
    fn absorb(&mut self, table: &'a Collection<E>, projection: &Projection) {
        for (column, ty) in table.schema().column_map() {
            self.columns
                .insert(format!("{}.{column}", table.name()), ty);
            self.columns.entry(column).or_insert(ty);
        }

        match projection {
            Projection::All => {}
            Projection::Fields(fields) => {
                for field in fields {
                    self.projection.push((
                        format!("{}.{field}", table.name()),
                        format!("{}{ALIAS_SEPARATOR}{field}", table.name()),
                    ));
                }
            }
            Projection::Aliased(pairs) => {
                for (source, alias) in pairs {
                    self.projection
                        .push((format!("{}.{source}", table.name()), alias.clone()));
                }
            }
        }

        self.tables.push(table);
    }

    fn select_list(&self) -> String {
        fn render(source: &str, alias: &str) -> String {
            format!(
                "{} AS {}",
                sql::column_ref(source),
                sql::quote_ident(alias)
            )
        }

        if self.projection.is_empty() {
            // no explicit projection anywhere: select everything
            return self
                .tables
                .iter()
                .flat_map(|table| {
                    table.schema().columns.iter().map(|column| {
                        render(
                            &format!("{}.{}", table.name(), column.name),
                            &format!("{}{ALIAS_SEPARATOR}{}", table.name(), column.name),
                        )
                    })
                })
                .collect::<Vec<_>>()
                .join(", ");
        }

        self.projection
            .iter()
            .map(|(source, alias)| render(source, alias))
            .collect::<Vec<_>>()
            .join(", ")
    }

    // Split each output alias on the table separator, decode through the
    // owning table's codec, and nest under {table: {column: value}}.
    // Aliases owned by no participating table still appear, keyed by their
    // first path segment, with the raw value attached.
    fn unflatten(&self, raw: RawRow) -> Result<JoinRow, codec::CodecError> {
        let mut row = JoinRow::new();

        for (alias, native) in raw {
            let (bucket, field, value) = match self.owner_of(&alias) {
                Some((table, column)) => {
                    let value = match table.schema().column_def(&column) {
                        Some(def) => codec::decode(def.ty, &native)?,
                        None => codec::decode_raw(&native),
                    };

                    (table.name().to_string(), column, value)
                }
                None => {
                    let (bucket, field) = alias
                        .split_once(ALIAS_SEPARATOR)
                        .map_or_else(
                            || (alias.clone(), alias.clone()),
                            |(b, f)| (b.to_string(), f.to_string()),
                        );

                    (bucket, field, codec::decode_raw(&native))
                }
            };

            row.entry(bucket).or_default().insert(field, value);
        }

        record_rows_decoded(1);

        Ok(row)
    }

    // The participating table whose `table__` prefix matches the alias.
    fn owner_of(&self, alias: &str) -> Option<(&'a Collection<E>, String)> {
        self.tables.iter().copied().find_map(|table| {
            let prefix = format!("{}{ALIAS_SEPARATOR}", table.name());

            alias
                .strip_prefix(&prefix)
                .map(|column| (table, column.to_string()))
        })
    }
}
