#![cfg(feature = "rusqlite")]

mod common;

use common::{seed_names, setup_db};
use quarry::{Engine, Model, Pager, Value, params};

#[test]
fn test_second_page_slices_ten_through_nineteen() {
    let conn = setup_db();
    seed_names(&conn, 25, &["A"]);
    let engine = Engine::new(&conn, conn.records());
    let mut query = engine.lookup(Model::Name, params! { "by" => "id" }).unwrap();

    let mut pager = Pager::new(2, 10);
    let ids = query.paginate_ids(&mut pager).unwrap();
    assert_eq!(ids, (11..=20).collect::<Vec<i64>>());
    assert_eq!(pager.num_total, 25);
    assert_eq!(pager.num_pages(), 3);

    let records = query.paginate(&mut pager).unwrap();
    assert_eq!(records.len(), 10);
    assert_eq!(records[0].id, 11);
    assert_eq!(records[0].get("text_name"), Some(&Value::from("Aname 11")));
}

#[test]
fn test_reverse_order() {
    let conn = setup_db();
    seed_names(&conn, 5, &["A"]);
    let engine = Engine::new(&conn, conn.records());
    let mut query = engine
        .lookup(Model::Name, params! { "by" => "reverse_id" })
        .unwrap();

    assert_eq!(query.result_ids().unwrap(), &[5, 4, 3, 2, 1]);
    assert_eq!(query.first_id().unwrap(), Some(5));
}

#[test]
fn test_first_and_last_without_filling() {
    let conn = setup_db();
    seed_names(&conn, 7, &["A"]);
    let engine = Engine::new(&conn, conn.records());
    let mut query = engine.lookup(Model::Name, params! { "by" => "id" }).unwrap();

    assert_eq!(query.first_id().unwrap(), Some(1));
    assert_eq!(query.last_id().unwrap(), Some(7));
}

#[test]
fn test_letter_pagination_filters_before_counting() {
    let conn = setup_db();
    seed_names(&conn, 12, &["A", "B", "c"]);
    let engine = Engine::new(&conn, conn.records());
    let mut query = engine.lookup(Model::Name, params! {}).unwrap();
    query.set_need_letters(true);

    assert_eq!(query.used_letters().unwrap(), vec!['A', 'B', 'C']);

    let mut pager = Pager::new(1, 3).with_letter('c');
    let ids = query.paginate_ids(&mut pager).unwrap();
    assert_eq!(ids, vec![3, 6, 9]);
    assert_eq!(pager.num_total, 4);
    assert_eq!(pager.used_letters, vec!['A', 'B', 'C']);

    let mut next = Pager::new(2, 3).with_letter('C');
    assert_eq!(query.paginate_ids(&mut next).unwrap(), vec![12]);
}

#[test]
fn test_ids_filter_orders_by_position() {
    let conn = setup_db();
    seed_names(&conn, 10, &["A"]);
    let engine = Engine::new(&conn, conn.records());
    let mut query = engine
        .lookup(Model::Name, params! { "ids" => vec![7, 2, 9] })
        .unwrap();

    assert_eq!(query.result_ids().unwrap(), &[7, 2, 9]);
    assert_eq!(query.index(9).unwrap(), Some(2));
}

#[test]
fn test_deleted_rows_are_left_out_of_hydration() {
    let conn = setup_db();
    seed_names(&conn, 4, &["A"]);
    let engine = Engine::new(&conn, conn.records());
    let mut query = engine.lookup(Model::Name, params! { "by" => "id" }).unwrap();

    assert_eq!(query.num_results().unwrap(), 4);
    conn.execute_batch("DELETE FROM `names` WHERE id = 2").unwrap();

    let records = query.results().unwrap();
    assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3, 4]);
    assert_eq!(query.num_results().unwrap(), 4);

    query.clear_cache();
    assert_eq!(query.num_results().unwrap(), 3);
}

#[test]
fn test_cache_is_a_snapshot() {
    let conn = setup_db();
    seed_names(&conn, 3, &["A"]);
    let engine = Engine::new(&conn, conn.records());
    let mut query = engine.lookup(Model::Name, params! {}).unwrap();

    assert_eq!(query.num_results().unwrap(), 3);
    seed_names_after(&conn, 4);
    assert_eq!(query.num_results().unwrap(), 3);
    query.clear_cache();
    assert_eq!(query.num_results().unwrap(), 4);
}

fn seed_names_after(conn: &quarry::sqlite::SqliteConnection, id: i64) {
    conn.execute_batch(&format!(
        "INSERT INTO `names` (id, text_name, sort_name, deprecated) VALUES ({id}, 'x', 'x', 0)"
    ))
    .unwrap();
}

#[test]
fn test_small_hydrate_batches() {
    let conn = setup_db();
    seed_names(&conn, 9, &["A"]);
    let config = quarry::QuarryConfig::parse("[limits]\nhydrate_batch = 2").unwrap();
    let engine = Engine::from_config(&config, &conn, conn.records());
    let mut query = engine.lookup(Model::Name, params! { "by" => "id" }).unwrap();

    let records = query.results().unwrap();
    assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), (1..=9).collect::<Vec<_>>());
}
