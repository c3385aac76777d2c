//! End-to-end tests for appending and scanning tables in a real log file.

use rover_db::{Row, RoverDb, Value};
use std::path::Path;
use tempfile::TempDir;

fn open_db(path: &Path) -> RoverDb {
    let mut db = RoverDb::new(path);
    db.open().unwrap();
    db
}

fn sample_row() -> Row {
    Row::new()
        .with("a", 5i64)
        .with("b", 2.5)
        .with("c", "x")
        .with("d", true)
}

fn seq_row(table: &str, seq: i64) -> Row {
    Row::new().with("table", table).with("seq", seq)
}

#[test]
fn test_row_roundtrip_with_interleaved_tables() {
    let temp_dir = TempDir::new().unwrap();
    let mut db = open_db(&temp_dir.path().join("db.rdb"));

    db.create_table("noise").unwrap();
    for i in 0..5 {
        db.insert_row("noise", &seq_row("noise", i)).unwrap();
    }
    db.create_table("t").unwrap();
    db.insert_row("t", &sample_row()).unwrap();
    for i in 0..5 {
        db.insert_row("other", &seq_row("other", i)).unwrap();
    }

    let rows = db.scan_table("t").unwrap();
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.len(), 4);
    assert_eq!(row.get_int("a").unwrap(), 5);
    assert_eq!(row.get_float("b").unwrap(), 2.5);
    assert_eq!(row.get_string("c").unwrap(), "x");
    assert!(row.get_bool("d").unwrap());
    assert_eq!(row, &sample_row());
}

#[test]
fn test_table_isolation() {
    let temp_dir = TempDir::new().unwrap();
    let mut db = open_db(&temp_dir.path().join("db.rdb"));

    let (n, m) = (7, 4);
    let (mut t1, mut t2) = (0, 0);
    for i in 0..(n + m) {
        if (i % 3 == 0 && t2 < m) || t1 == n {
            db.insert_row("t2", &seq_row("t2", t2)).unwrap();
            t2 += 1;
        } else {
            db.insert_row("t1", &seq_row("t1", t1)).unwrap();
            t1 += 1;
        }
    }

    let rows1 = db.scan_table("t1").unwrap();
    let rows2 = db.scan_table("t2").unwrap();
    assert_eq!(rows1.len(), n as usize);
    assert_eq!(rows2.len(), m as usize);
    assert!(rows1.iter().all(|r| r.get_string("table").unwrap() == "t1"));
    assert!(rows2.iter().all(|r| r.get_string("table").unwrap() == "t2"));
}

#[test]
fn test_append_order_preserved() {
    let temp_dir = TempDir::new().unwrap();
    let mut db = open_db(&temp_dir.path().join("db.rdb"));

    let inserted: Vec<Row> = (1..=3).map(|i| seq_row("t", i)).collect();
    for (i, row) in inserted.iter().enumerate() {
        db.insert_row("t", row).unwrap();
        db.insert_row("u", &seq_row("u", i as i64)).unwrap();
    }

    let rows = db.scan_table("t").unwrap();
    let seqs: Vec<i64> = rows.iter().map(|r| r.get_int("seq").unwrap()).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
    assert_eq!(rows, inserted);
}

#[test]
fn test_rescan_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let mut db = open_db(&temp_dir.path().join("db.rdb"));

    for i in 0..20 {
        db.insert_row("t", &seq_row("t", i)).unwrap();
    }

    let first = db.scan_table("t").unwrap();
    let second = db.scan_table("t").unwrap();
    assert_eq!(first.len(), 20);
    assert_eq!(first, second);
}

#[test]
fn test_insert_after_scan_appends_at_end() {
    let temp_dir = TempDir::new().unwrap();
    let mut db = open_db(&temp_dir.path().join("db.rdb"));

    db.insert_row("t", &seq_row("t", 1)).unwrap();
    assert_eq!(db.scan_table("t").unwrap().len(), 1);

    db.insert_row("t", &seq_row("t", 2)).unwrap();
    let rows = db.scan_table("t").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get_int("seq").unwrap(), 2);
}

#[test]
fn test_unknown_table_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let mut db = open_db(&temp_dir.path().join("db.rdb"));

    db.create_table("t").unwrap();
    db.insert_row("t", &sample_row()).unwrap();

    assert!(db.scan_table("missing").unwrap().is_empty());
}

#[test]
fn test_rows_without_create_table() {
    let temp_dir = TempDir::new().unwrap();
    let mut db = open_db(&temp_dir.path().join("db.rdb"));

    db.insert_row("implicit", &sample_row()).unwrap();
    assert_eq!(db.scan_table("implicit").unwrap().len(), 1);
}

#[test]
fn test_schemaless_rows() {
    let temp_dir = TempDir::new().unwrap();
    let mut db = open_db(&temp_dir.path().join("db.rdb"));

    db.insert_row("t", &Row::new().with("id", 1i64)).unwrap();
    db.insert_row("t", &Row::new().with("name", "two").with("ok", false))
        .unwrap();
    db.insert_row("t", &Row::new()).unwrap();

    let rows = db.scan_table("t").unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("id"), Some(&Value::Integer(1)));
    assert!(!rows[1].contains("id"));
    assert!(!rows[1].get_bool("ok").unwrap());
    assert!(rows[2].is_empty());
}

#[test]
fn test_retrieved_rows_are_independent() {
    let temp_dir = TempDir::new().unwrap();
    let mut db = open_db(&temp_dir.path().join("db.rdb"));

    let mut row = seq_row("t", 1);
    db.insert_row("t", &row).unwrap();
    row.set("seq", 99i64);

    let mut rows = db.scan_table("t").unwrap();
    assert_eq!(rows[0].get_int("seq").unwrap(), 1);

    rows[0].set("seq", 42i64);
    assert_eq!(db.scan_table("t").unwrap()[0].get_int("seq").unwrap(), 1);
}

#[test]
fn test_users_scenario_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db.rdb");

    {
        let mut db = open_db(&path);
        db.create_table("users").unwrap();
        db.insert_row(
            "users",
            &Row::new()
                .with("id", 1i64)
                .with("name", "Ann")
                .with("active", true),
        )
        .unwrap();
        db.insert_row(
            "users",
            &Row::new()
                .with("id", 2i64)
                .with("name", "Bo")
                .with("active", false),
        )
        .unwrap();
        db.close();
    }

    let mut db = open_db(&path);
    let rows = db.scan_table("users").unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].get_int("id").unwrap(), 1);
    assert_eq!(rows[0].get_string("name").unwrap(), "Ann");
    assert!(rows[0].get_bool("active").unwrap());

    assert_eq!(rows[1].get_int("id").unwrap(), 2);
    assert_eq!(rows[1].get_string("name").unwrap(), "Bo");
    assert!(!rows[1].get_bool("active").unwrap());
}

#[test]
fn test_reopen_after_close_resumes_appends() {
    let temp_dir = TempDir::new().unwrap();
    let mut db = open_db(&temp_dir.path().join("db.rdb"));

    db.insert_row("t", &seq_row("t", 1)).unwrap();
    db.close();
    db.open().unwrap();
    db.insert_row("t", &seq_row("t", 2)).unwrap();

    let seqs: Vec<i64> = db
        .scan_table("t")
        .unwrap()
        .iter()
        .map(|r| r.get_int("seq").unwrap())
        .collect();
    assert_eq!(seqs, vec![1, 2]);
}

#[test]
fn test_bulk_insert() {
    let temp_dir = TempDir::new().unwrap();
    let mut db = open_db(&temp_dir.path().join("db.rdb"));

    let rows: Vec<Row> = (0..100).map(|i| seq_row("bulk", i)).collect();
    db.bulk_insert("bulk", &rows).unwrap();
    db.bulk_insert("bulk", &[]).unwrap();

    assert_eq!(db.scan_table("bulk").unwrap(), rows);
}
