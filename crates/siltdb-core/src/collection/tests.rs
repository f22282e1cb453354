use super::*;
use crate::{
    engine::{EngineError, EngineErrorKind, ExecOutcome, RawRow, SqlValue},
    error::DbError,
    filter::Filter,
    schema::{Column, ColumnType},
    test_support::RecordingEngine,
    value::Timestamp,
};
use std::sync::Arc;

fn people_schema() -> TableSchema {
    TableSchema::new("people")
        .column(Column::new("id", ColumnType::Integer).not_null())
        .column(Column::new("name", ColumnType::Text).unique())
        .column(Column::new("age", ColumnType::Integer).indexed())
        .column(Column::new("tags", ColumnType::TextSet))
        .column(Column::new("joined", ColumnType::Timestamp))
        .primary_key(["id"])
}

fn collection(schema: TableSchema) -> (Arc<RecordingEngine>, Collection<RecordingEngine>) {
    let engine = Arc::new(RecordingEngine::new());
    let coll = Collection::new(Arc::clone(&engine), schema).expect("schema must validate");

    (engine, coll)
}

// --- build ---

#[test]
fn build_synthesizes_table_and_index_ddl() {
    let (engine, coll) = collection(people_schema());
    coll.build().expect("build");

    let statements = engine.statements();
    assert_eq!(
        statements[0],
        "CREATE TABLE IF NOT EXISTS people (id INTEGER NOT NULL, name TEXT UNIQUE, \
         age INTEGER, tags TEXT, joined TEXT, PRIMARY KEY (id))"
    );
    assert_eq!(
        statements[1],
        "CREATE INDEX IF NOT EXISTS idx_people_age ON people (age)"
    );
}

#[test]
fn build_is_idempotent() {
    let (engine, coll) = collection(people_schema());
    coll.build().expect("first build");
    coll.build().expect("second build");

    // IF NOT EXISTS both times; no schema object is created twice
    let statements = engine.statements();
    assert_eq!(statements.len(), 4);
    assert_eq!(statements[0], statements[2]);
    assert_eq!(statements[1], statements[3]);
}

#[test]
fn build_emits_composite_keys_and_constraint_clauses() {
    let schema = TableSchema::new("events")
        .column(Column::new("kind", ColumnType::Text).not_null())
        .column(Column::new("day", ColumnType::Integer).not_null())
        .column(Column::new("active", ColumnType::Bool).default_literal(true))
        .column(Column::new("owner", ColumnType::Integer).references("people", "id"))
        .primary_key(["kind", "day"])
        .unique_together(["kind", "owner"]);
    let (engine, coll) = collection(schema);
    coll.build().expect("build");

    assert_eq!(
        engine.statements()[0],
        "CREATE TABLE IF NOT EXISTS events (kind TEXT NOT NULL, day INTEGER NOT NULL, \
         active INTEGER DEFAULT 1, owner INTEGER REFERENCES people (id), \
         PRIMARY KEY (kind, day), UNIQUE (kind, owner))"
    );
}

#[test]
fn build_quotes_reserved_table_and_column_names() {
    let schema = TableSchema::new("order").column(Column::new("group", ColumnType::Text));
    let (engine, coll) = collection(schema);
    coll.build().expect("build");

    assert_eq!(
        engine.statements()[0],
        "CREATE TABLE IF NOT EXISTS \"order\" (\"group\" TEXT)"
    );
}

// --- create ---

#[test]
fn create_encodes_fields_and_returns_the_assigned_id() {
    let (engine, coll) = collection(people_schema());
    engine.set_outcome(ExecOutcome {
        rows_affected: 1,
        last_insert_id: 41,
    });

    let entry = Entry::new()
        .with("id", 1)
        .with("name", "ada")
        .with("tags", vec!["x".to_string(), "y".to_string()]);
    let id = coll.create(entry, false).expect("create");
    assert_eq!(id, 41);

    let (statement, params) = engine.last_call();
    assert_eq!(
        statement,
        "INSERT INTO people (id, name, tags) VALUES (:s_id, :s_name, :s_tags)"
    );
    assert_eq!(params.get("s_id"), Some(&SqlValue::Integer(1)));
    assert_eq!(params.get("s_name"), Some(&SqlValue::Text("ada".to_string())));
    assert_eq!(
        params.get("s_tags"),
        Some(&SqlValue::Text("\u{1f}x\u{1f}y\u{1f}".to_string()))
    );
}

#[test]
fn create_with_ignore_conflicts_appends_the_conflict_clause() {
    let (engine, coll) = collection(people_schema());
    coll.create(Entry::new().with("id", 1), true).expect("create");

    let (statement, _) = engine.last_call();
    assert!(statement.ends_with("ON CONFLICT DO NOTHING"), "{statement}");
}

#[test]
fn create_fills_computed_defaults_when_absent() {
    fn default_age() -> Value {
        Value::Int(18)
    }

    let schema = TableSchema::new("people")
        .column(Column::new("id", ColumnType::Integer))
        .column(Column::new("age", ColumnType::Integer).default_computed(default_age));
    let (engine, coll) = collection(schema);

    coll.create(Entry::new().with("id", 1), false).expect("create");
    let (_, params) = engine.last_call();
    assert_eq!(params.get("s_age"), Some(&SqlValue::Integer(18)));

    // caller-supplied value wins
    coll.create(Entry::new().with("id", 2).with("age", 30), false)
        .expect("create");
    let (_, params) = engine.last_call();
    assert_eq!(params.get("s_age"), Some(&SqlValue::Integer(30)));
}

#[test]
fn create_injects_the_creation_timestamp() {
    let schema = TableSchema::new("people")
        .column(Column::new("id", ColumnType::Integer))
        .column(Column::new("created", ColumnType::Timestamp))
        .created_at("created");
    let (engine, coll) = collection(schema);

    coll.create(Entry::new().with("id", 1), false).expect("create");
    let (statement, params) = engine.last_call();
    assert!(statement.contains(":s_created"), "{statement}");
    assert!(params.contains_key("s_created"));
}

#[test]
fn create_of_an_empty_entry_uses_default_values() {
    let schema = TableSchema::new("counters").column(Column::new("n", ColumnType::Integer));
    let (engine, coll) = collection(schema);

    coll.create(Entry::new(), false).expect("create");
    assert_eq!(engine.last_call().0, "INSERT INTO counters DEFAULT VALUES");
}

#[test]
fn hook_failure_aborts_before_any_statement() {
    let (engine, mut coll) = collection(people_schema());
    coll.pipeline_mut()
        .before_create(|_| Err(HookError::new("guard", "rejected")));

    let err = coll
        .create(Entry::new().with("id", 1), false)
        .expect_err("hook must abort");
    assert!(matches!(err, DbError::Hook(_)));
    assert!(engine.statements().is_empty());
}

// --- update ---

#[test]
fn update_always_sets_the_update_timestamp() {
    let schema = TableSchema::new("people")
        .column(Column::new("id", ColumnType::Integer))
        .column(Column::new("name", ColumnType::Text))
        .column(Column::new("modified", ColumnType::Timestamp))
        .updated_at("modified");
    let (engine, coll) = collection(schema);
    engine.set_outcome(ExecOutcome {
        rows_affected: 3,
        last_insert_id: 0,
    });

    let affected = coll
        .update(&Filter::eq("id", 1), Entry::new().with("name", "z"))
        .expect("update");
    assert_eq!(affected, 3);

    let (statement, params) = engine.last_call();
    assert_eq!(
        statement,
        "UPDATE people SET modified = :s_modified, name = :s_name WHERE id = :p1"
    );
    assert!(params.contains_key("s_modified"));
    assert_eq!(params.get("s_name"), Some(&SqlValue::Text("z".to_string())));
    assert_eq!(params.get("p1"), Some(&SqlValue::Integer(1)));
}

#[test]
fn update_parameter_pools_stay_disjoint() {
    let (engine, coll) = collection(people_schema());
    coll.update(
        &(Filter::eq("name", "a") & Filter::gt("age", 2)),
        Entry::new().with("name", "b").with("age", 9),
    )
    .expect("update");

    let (_, params) = engine.last_call();
    let names: Vec<_> = params.keys().cloned().collect();
    assert_eq!(names, ["p1", "p2", "s_age", "s_name"]);
}

#[test]
fn update_with_nothing_to_assign_issues_no_statement() {
    let (engine, coll) = collection(people_schema());
    let affected = coll.update(&Filter::eq("id", 1), Entry::new()).expect("update");

    assert_eq!(affected, 0);
    assert!(engine.statements().is_empty());
}

// --- delete ---

#[test]
fn delete_compiles_the_predicate_into_one_statement() {
    let (engine, coll) = collection(people_schema());
    coll.delete(&Filter::in_iter("id", [1, 2])).expect("delete");

    let (statement, params) = engine.last_call();
    assert_eq!(statement, "DELETE FROM people WHERE id IN (:p1, :p2)");
    assert_eq!(params.len(), 2);
}

// --- find / get / count / exists ---

#[test]
fn find_projects_all_columns_and_applies_options() {
    let (engine, coll) = collection(people_schema());
    let options = FindOptions::new()
        .order_by("age", OrderDirection::Desc)
        .limit(10)
        .offset(5);

    coll.find(&Filter::gt("age", 21), &Projection::All, &options)
        .expect("find");

    let (statement, _) = engine.last_call();
    assert_eq!(
        statement,
        "SELECT id, name, age, tags, joined FROM people WHERE age > :p1 \
         ORDER BY age DESC LIMIT 10 OFFSET 5"
    );
}

#[test]
fn find_decodes_extended_columns_and_passes_unknown_fields_through() {
    let (engine, coll) = collection(people_schema());
    let mut raw = RawRow::new();
    raw.insert("name".to_string(), SqlValue::Text("ada".to_string()));
    raw.insert(
        "tags".to_string(),
        SqlValue::Text("\u{1f}x\u{1f}".to_string()),
    );
    raw.insert(
        "joined".to_string(),
        SqlValue::Text("{\"epoch\":5000,\"iso\":null}".to_string()),
    );
    raw.insert("computed_total".to_string(), SqlValue::Integer(7));
    engine.push_rows(vec![raw]);

    let rows = coll
        .find(&Filter::True, &Projection::All, &FindOptions::new())
        .expect("find");
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.field("name"), Some(&Value::Text("ada".to_string())));
    assert_eq!(row.field("tags"), Some(&Value::TextSet(vec!["x".to_string()])));
    assert_eq!(
        row.field("joined"),
        Some(&Value::Timestamp(Timestamp::from_millis(5000)))
    );
    assert_eq!(row.field("computed_total"), Some(&Value::Int(7)));
}

#[test]
fn find_with_alias_projection_renders_as_clauses() {
    let (engine, coll) = collection(people_schema());
    let projection = Projection::aliased([("name", "label")]);

    coll.find(&Filter::True, &projection, &FindOptions::new())
        .expect("find");

    let (statement, _) = engine.last_call();
    assert_eq!(statement, "SELECT name AS label FROM people WHERE 1=1");
}

#[test]
fn get_constrains_to_one_row() {
    let (engine, coll) = collection(people_schema());
    let row = coll.get(&Filter::eq("id", 1), &Projection::All).expect("get");

    assert!(row.is_none());
    let (statement, _) = engine.last_call();
    assert!(statement.ends_with("WHERE id = :p1 LIMIT 1"), "{statement}");
}

#[test]
fn count_reads_the_aggregate_column() {
    let (engine, coll) = collection(people_schema());
    let mut raw = RawRow::new();
    raw.insert("cnt".to_string(), SqlValue::Integer(12));
    engine.push_rows(vec![raw]);

    let count = coll.count(&Filter::True).expect("count");
    assert_eq!(count, 12);
    assert_eq!(
        engine.last_call().0,
        "SELECT COUNT(*) AS cnt FROM people WHERE 1=1"
    );
}

#[test]
fn exists_is_a_limited_probe() {
    let (engine, coll) = collection(people_schema());
    assert!(!coll.exists(&Filter::eq("id", 1)).expect("exists"));

    let mut raw = RawRow::new();
    raw.insert("present".to_string(), SqlValue::Integer(1));
    engine.push_rows(vec![raw]);
    assert!(coll.exists(&Filter::eq("id", 1)).expect("exists"));

    let (statement, _) = engine.last_call();
    assert_eq!(statement, "SELECT 1 AS present FROM people WHERE id = :p1 LIMIT 1");
}

// --- error propagation ---

#[test]
fn engine_errors_surface_unchanged() {
    let (engine, coll) = collection(people_schema());
    engine.fail_with(EngineError::new(
        EngineErrorKind::Constraint,
        "UNIQUE constraint failed: people.name",
    ));

    let err = coll
        .create(Entry::new().with("name", "dup"), false)
        .expect_err("engine failure must propagate");

    match err {
        DbError::Engine(inner) => {
            assert_eq!(inner.kind, EngineErrorKind::Constraint);
            assert!(inner.message.contains("people.name"));
        }
        other => panic!("expected engine error, got {other:?}"),
    }
}

#[test]
fn codec_errors_fail_the_write_before_the_engine_sees_it() {
    let (engine, coll) = collection(people_schema());
    let entry = Entry::new().with("tags", vec![format!("a{}b", '\u{1f}')]);

    let err = coll.create(entry, false).expect_err("separator member must fail");
    assert!(matches!(err, DbError::Codec(_)));
    assert!(engine.statements().is_empty());
}
