//! Reference DDL for the fixed schema.
//!
//! SQLite is dynamically typed, so model tables only declare their primary
//! key; every other column is untyped. Dates are stored as `YYYY-MM-DD`
//! text and times as `YYYY-MM-DD HH:MM:SS`.

use quarry_core::{Model, SchemaRegistry, StaticSchema};

/// Table holding persisted query records
pub const QUERY_RECORDS: &str = "CREATE TABLE IF NOT EXISTS `query_records` (\
    id INTEGER PRIMARY KEY AUTOINCREMENT, \
    description TEXT NOT NULL UNIQUE, \
    access_count INTEGER NOT NULL DEFAULT 0, \
    updated_at TEXT NOT NULL)";

/// Tables that link models without being queryable themselves
pub const LINK_TABLES: &[(&str, &[&str])] = &[
    ("image_votes", &["image_id", "user_id", "value", "anonymous"]),
    ("namings", &["name_id", "observation_id", "user_id", "vote_cache"]),
    ("observation_herbarium_records", &["observation_id", "herbarium_record_id"]),
    ("observation_images", &["observation_id", "image_id", "rank"]),
    ("project_observations", &["project_id", "observation_id"]),
    ("project_species_lists", &["project_id", "species_list_id"]),
    ("species_list_observations", &["species_list_id", "observation_id"]),
];

fn create_table(table: &str, columns: &[&str]) -> String {
    let columns = columns
        .iter()
        .filter(|c| **c != "id")
        .map(|c| format!("`{c}`"))
        .collect::<Vec<_>>();
    if columns.is_empty() {
        format!("CREATE TABLE IF NOT EXISTS `{table}` (id INTEGER PRIMARY KEY)")
    } else {
        format!(
            "CREATE TABLE IF NOT EXISTS `{table}` (id INTEGER PRIMARY KEY, {})",
            columns.join(", ")
        )
    }
}

/// `CREATE TABLE` statements for every model and link table, plus the
/// query record table.
pub fn create_statements(schema: &dyn SchemaRegistry) -> Vec<String> {
    let models = Model::ALL
        .into_iter()
        .map(|model| create_table(schema.table_name(model), schema.columns(model)));
    let links = LINK_TABLES
        .iter()
        .map(|(table, columns)| create_table(table, columns));
    models
        .chain(links)
        .chain(std::iter::once(QUERY_RECORDS.to_string()))
        .collect()
}

/// The statements of [`create_statements`] for the compiled-in catalog, as
/// one batch.
pub fn create_script() -> String {
    let mut script = create_statements(&StaticSchema).join(";\n");
    script.push_str(";\n");
    script
}
