//! Shared fixtures: an in-memory SQLite database with the fixed schema.

#![allow(dead_code)]

use quarry::sqlite::SqliteConnection;

pub fn setup_db() -> SqliteConnection {
    let conn = SqliteConnection::open_in_memory().expect("in-memory database");
    conn.create_schema().expect("schema");
    conn
}

/// Inserts names `1..=count` with sort names cycling through `letters`.
pub fn seed_names(conn: &SqliteConnection, count: i64, letters: &[&str]) {
    let mut sql = String::new();
    for id in 1..=count {
        let prefix = letters[(id as usize - 1) % letters.len()];
        sql.push_str(&format!(
            "INSERT INTO `names` (id, text_name, sort_name, `rank`, deprecated) \
             VALUES ({id}, '{prefix}name {id}', '{prefix}name {id:03}', 4, 0);\n"
        ));
    }
    conn.execute_batch(&sql).expect("seed names");
}

/// Observations 1..=4 and their images:
///
/// | observation | images   |
/// |-------------|----------|
/// | 1           | 10, 11   |
/// | 2           | (none)   |
/// | 3           | 12       |
/// | 4           | 13       |
pub fn seed_observations(conn: &SqliteConnection) {
    conn.execute_batch(
        "INSERT INTO `observations` (id, `when`, thumb_image_id) VALUES
             (1, '2024-05-01', 10), (2, '2024-05-02', NULL),
             (3, '2024-05-03', 12), (4, '2024-05-04', 13);
         INSERT INTO `images` (id, `when`) VALUES
             (10, '2024-05-01'), (11, '2024-05-01'), (12, '2024-05-03'), (13, '2024-05-04');
         INSERT INTO `observation_images` (observation_id, image_id, `rank`) VALUES
             (1, 10, 1), (1, 11, 2), (3, 12, 1), (4, 13, 1);",
    )
    .expect("seed observations");
}
