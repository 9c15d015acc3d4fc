#![cfg(feature = "rusqlite")]

mod common;

use common::setup_db;
use quarry::{Engine, Model, params};

fn seed(conn: &quarry::sqlite::SqliteConnection) {
    conn.execute_batch(
        "INSERT INTO `names` (id, text_name, search_name, sort_name) VALUES
             (1, 'Amanita muscaria', 'Amanita muscaria', 'Amanita muscaria'),
             (2, 'Äpfel été', 'ÄPFEL ÉTÉ', 'Apfel ete'),
             (3, 'Apfelbaum', 'Apfelbaum', 'Apfelbaum');
         INSERT INTO `observations` (id, `when`, `where`) VALUES
             (1, '2024-05-01', 'Zürich, Switzerland'),
             (2, '2024-05-02', 'Ithaca, New York');",
    )
    .expect("seed");
}

#[test]
fn test_pattern_ignores_case_and_accents() {
    let conn = setup_db();
    seed(&conn);
    let engine = Engine::new(&conn, conn.records());

    let mut query = engine
        .lookup(Model::Name, params! { "pattern" => "apfel ete" })
        .unwrap();
    assert_eq!(query.result_ids().unwrap(), &[2]);

    let mut query = engine
        .lookup(Model::Name, params! { "pattern" => "APFEL -été" })
        .unwrap();
    assert_eq!(query.result_ids().unwrap(), &[3]);
}

#[test]
fn test_accented_pattern_matches_plain_text() {
    let conn = setup_db();
    seed(&conn);
    let engine = Engine::new(&conn, conn.records());

    let mut query = engine
        .lookup(Model::Name, params! { "pattern" => "MÚSCARIA" })
        .unwrap();
    assert_eq!(query.result_ids().unwrap(), &[1]);
}

#[test]
fn test_location_text_ignores_accents() {
    let conn = setup_db();
    seed(&conn);
    let engine = Engine::new(&conn, conn.records());

    let mut query = engine
        .lookup(Model::Observation, params! { "locations" => vec!["zurich"] })
        .unwrap();
    assert_eq!(query.result_ids().unwrap(), &[1]);
}

#[test]
fn test_records_by_login_and_title() {
    let conn = setup_db();
    seed(&conn);
    conn.execute_batch(
        "INSERT INTO `users` (id, login, name) VALUES (1, 'Rolf', 'Rolf Singer'), (2, 'mary', 'Mary');
         INSERT INTO `projects` (id, title) VALUES (5, 'Bolete Blitz');
         INSERT INTO `project_observations` (project_id, observation_id) VALUES (5, 2);
         UPDATE `observations` SET user_id = 1 WHERE id = 1;
         UPDATE `observations` SET user_id = 2 WHERE id = 2;",
    )
    .expect("seed users");
    let engine = Engine::new(&conn, conn.records());

    let mut query = engine
        .lookup(Model::Observation, params! { "users" => "rolf <Rolf Singer>" })
        .unwrap();
    assert_eq!(query.result_ids().unwrap(), &[1]);

    let mut query = engine
        .lookup(Model::Observation, params! { "users" => vec!["2", "ROLF"] })
        .unwrap();
    assert_eq!(query.result_ids().unwrap(), &[2, 1]);

    let mut query = engine
        .lookup(Model::Observation, params! { "project" => "bolete blitz" })
        .unwrap();
    assert_eq!(query.result_ids().unwrap(), &[2]);

    let mut query = engine
        .lookup(Model::Observation, params! { "users" => "nobody" })
        .unwrap();
    assert!(query.result_ids().unwrap().is_empty());
}
