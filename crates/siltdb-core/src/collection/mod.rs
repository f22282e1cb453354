mod ddl;
mod entry;
mod hooks;
mod options;
mod read;
mod write;

#[cfg(test)]
mod tests;

use crate::{
    engine::Engine,
    schema::{ColumnDefault, ColumnMap, SchemaError, TableSchema},
    value::{Timestamp, Value},
};
use std::sync::Arc;

// re-exports
pub use entry::Entry;
pub use hooks::{Hook, HookError, MutationPipeline};
pub use options::{FindOptions, OrderDirection, Projection};

///
/// Collection
///
/// One table's schema runtime: DDL synthesis and typed CRUD. Owns the
/// table's column map, codec routing, and mutation pipeline. A collection
/// is usable before `build()` has been issued ("connect now, migrate
/// later"); operations against a table the engine has never seen simply
/// surface the engine's own error.
///

pub struct Collection<E: Engine> {
    engine: Arc<E>,
    schema: TableSchema,
    columns: ColumnMap,
    pipeline: MutationPipeline,
}

impl<E: Engine> Collection<E> {
    /// Validate the schema and seed the mutation pipeline.
    ///
    /// Computed column defaults and auto-managed timestamp columns are
    /// registered as pipeline hooks here, not at `build()` time, so CRUD
    /// works in the unbuilt state.
    pub fn new(engine: Arc<E>, schema: TableSchema) -> Result<Self, SchemaError> {
        schema.validate()?;

        let columns = schema.column_map();
        let mut pipeline = MutationPipeline::new();
        seed_pipeline(&mut pipeline, &schema);

        Ok(Self {
            engine,
            schema,
            columns,
            pipeline,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    #[must_use]
    pub const fn schema(&self) -> &TableSchema {
        &self.schema
    }

    #[must_use]
    pub const fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Register caller-supplied hooks after the seeded ones.
    pub const fn pipeline_mut(&mut self) -> &mut MutationPipeline {
        &mut self.pipeline
    }

    pub(crate) const fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    pub(crate) const fn pipeline(&self) -> &MutationPipeline {
        &self.pipeline
    }
}

// Computed defaults fill absent fields at create time. The creation
// timestamp fills if absent (backfill stays possible); the update timestamp
// is stamped on create and overwritten on every update regardless of caller
// input.
fn seed_pipeline(pipeline: &mut MutationPipeline, schema: &TableSchema) {
    for column in &schema.columns {
        if let Some(ColumnDefault::Computed(compute)) = &column.default {
            let compute = *compute;
            let field = column.name.clone();
            pipeline.before_create(move |entry: &mut Entry| {
                if !entry.contains_key(&field) {
                    entry.insert(field.clone(), compute());
                }
                Ok(())
            });
        }
    }

    if let Some(created) = schema.created_at.clone() {
        pipeline.before_create(move |entry: &mut Entry| {
            if !entry.contains_key(&created) {
                entry.insert(created.clone(), Value::Timestamp(Timestamp::now()));
            }
            Ok(())
        });
    }

    if let Some(updated) = schema.updated_at.clone() {
        let on_create = updated.clone();
        pipeline.before_create(move |entry: &mut Entry| {
            if !entry.contains_key(&on_create) {
                entry.insert(on_create.clone(), Value::Timestamp(Timestamp::now()));
            }
            Ok(())
        });
        pipeline.before_update(move |entry: &mut Entry| {
            entry.insert(updated.clone(), Value::Timestamp(Timestamp::now()));
            Ok(())
        });
    }
}
