//! Property-based tests for editing and persisting tables.

use std::collections::HashSet;

use proptest::prelude::*;

use sheetbase::prelude::*;

/// Strategy for cell values the workbook format can hold exactly.
fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Empty),
        any::<bool>().prop_map(Value::Boolean),
        (-1_000_000i64..1_000_000).prop_map(Value::from),
        prop::num::f64::NORMAL.prop_map(Value::Number),
        "[a-zA-Z0-9 _<>&\"'\t\n\r-]{0,12}".prop_map(Value::from),
        "\\PC{0,8}".prop_map(Value::from),
    ]
}

/// Strategy for one non-empty column name.
///
/// Covers names the reader also generates for blank or repeated headers,
/// numeric-looking names and surrounding whitespace.
fn column_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z][A-Za-z0-9 ]{0,8}",
        "[A-Za-z]{1,2}(\\.[0-9]){0,2}",
        "Unnamed: [0-9]",
        "[0-9]{1,3}|TRUE|FALSE",
        " {0,2}[a-z]{1,3} {0,2}",
        "\\PC{1,6}",
    ]
}

/// Strategy for 1..6 distinct column names.
fn column_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(column_name(), 1..6).prop_map(|names| {
        let mut seen = HashSet::new();
        names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect()
    })
}

/// Strategy for a table with up to 8 rows.
fn table() -> impl Strategy<Value = Table> {
    (column_names(), 0..8usize).prop_flat_map(|(names, rows)| {
        let width = names.len();
        prop::collection::vec(prop::collection::vec(value(), width), rows)
            .prop_map(move |rows| Table::from_rows(names.clone(), rows).unwrap())
    })
}

/// Strategy for a table plus one record matching its columns.
fn table_and_record() -> impl Strategy<Value = (Table, Row)> {
    table().prop_flat_map(|table| {
        let names: Vec<String> = table.column_names().map(str::to_string).collect();
        prop::collection::vec(value(), names.len()).prop_map(move |values| {
            let record: Row = names.iter().cloned().zip(values).collect();
            (table.clone(), record)
        })
    })
}

fn database(table: Table) -> Database {
    let mut db = Database::new();
    db.insert_table("Main", table).unwrap();
    db
}

proptest! {
    /// An appended record is the last row of the table.
    #[test]
    fn add_row_then_find_last((table, record) in table_and_record()) {
        let mut db = database(table);
        let mut editor = db.editor("Main").unwrap();

        editor.add_row(record.clone()).unwrap();
        let last = editor.table().unwrap().row_count() - 1;
        let found = editor.find_by_row(last).unwrap();

        prop_assert_eq!(found.row_count(), 1);
        prop_assert_eq!(found.row(0), Some(record));
    }

    /// Adding a column grows the column count by one and fills every row.
    #[test]
    fn add_column_fills_default(table in table(), default in value()) {
        let before = table.column_count();
        let mut db = database(table);

        let outcome = db.editor("Main").unwrap().add_column("Added_", default.clone()).unwrap();
        prop_assert!(outcome.is_applied());

        let shape = db.reader().describe("Main").unwrap();
        prop_assert_eq!(shape.column_count, before + 1);
        let added = db.table("Main").unwrap().column("Added_").unwrap();
        prop_assert!(added.values().iter().all(|v| *v == default));
    }

    /// Dropping row i shifts every later row down by one.
    #[test]
    fn drop_row_shifts(table in table(), pick in any::<prop::sample::Index>()) {
        prop_assume!(table.row_count() > 0);
        let i = pick.index(table.row_count());
        let original = table.clone();
        let mut db = database(table);

        let dropped = db.editor("Main").unwrap().drop_row(i).unwrap();
        let after = db.table("Main").unwrap();

        prop_assert_eq!(Some(dropped), original.row(i));
        prop_assert_eq!(after.row_count(), original.row_count() - 1);
        for j in 0..after.row_count() {
            let source = if j < i { j } else { j + 1 };
            prop_assert_eq!(after.row(j), original.row(source));
        }
    }

    /// A record missing one column is rejected and changes nothing.
    #[test]
    fn add_row_missing_column((table, record) in table_and_record(), pick in any::<prop::sample::Index>()) {
        let names: Vec<String> = record.keys().map(str::to_string).collect();
        let missing = names[pick.index(names.len())].clone();
        let mut partial = record;
        partial.remove(&missing);

        let rows = table.row_count();
        let mut db = database(table);
        let err = db.editor("Main").unwrap().add_row(partial).unwrap_err();

        match err {
            Error::ColumnMismatch { missing: m, extra } => {
                prop_assert_eq!(m, vec![missing]);
                prop_assert!(extra.is_empty());
            }
            other => prop_assert!(false, "unexpected error: {:?}", other),
        }
        prop_assert_eq!(db.table("Main").unwrap().row_count(), rows);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Saving then loading yields the same tables.
    #[test]
    fn save_load_roundtrip(first in table(), second in table()) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::new(dir.path());

        let mut db = Database::new();
        db.insert_table("First", first).unwrap();
        db.insert_table("Second", second).unwrap();

        Persister::new(config.clone()).save(&db, Some("book.xlsx")).unwrap();
        let loaded = Loader::new(config).load("book.xlsx").unwrap();

        prop_assert_eq!(loaded.list_tables(), vec!["First", "Second"]);
        prop_assert_eq!(loaded.tables(), db.tables());
    }
}
