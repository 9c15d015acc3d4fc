use crate::conditions::ConditionBuilder;
use crate::error::ConfigurationError;
use crate::geo::GeoTarget;
use crate::model::Model;
use crate::params::{ParamDeclaration, ParamKind};
use crate::schema::{LetterColumn, ModelDef};
use crate::spec::QuerySpec;

use super::{rank_index, CREATED_AT, NOTES_HAS, PATTERN, UPDATED_AT, USERS};

const COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "user_id",
    "name_id",
    "location_id",
    "when",
    "where",
    "lat",
    "long",
    "alt",
    "gps_hidden",
    "notes",
    "specimen",
    "is_collection_location",
    "thumb_image_id",
    "vote_cache",
    "num_views",
    "last_view",
    "rss_log_id",
    "log_updated_at",
    "text_name",
    "classification",
];

const PARAMS: &[ParamDeclaration] = &[
    ParamDeclaration::new("date", ParamKind::Date).range(),
    CREATED_AT,
    UPDATED_AT,
    USERS,
    ParamDeclaration::new("names", ParamKind::Record(Model::Name)).array(),
    ParamDeclaration::new("location", ParamKind::Record(Model::Location)),
    ParamDeclaration::new("locations", ParamKind::String).array(),
    ParamDeclaration::new("herbaria", ParamKind::Record(Model::Herbarium)).array(),
    ParamDeclaration::new("herbarium_records", ParamKind::Record(Model::HerbariumRecord)).array(),
    ParamDeclaration::new("project", ParamKind::Record(Model::Project)),
    ParamDeclaration::new("projects", ParamKind::Record(Model::Project)).array(),
    ParamDeclaration::new("species_list", ParamKind::Record(Model::SpeciesList)),
    ParamDeclaration::new("species_lists", ParamKind::Record(Model::SpeciesList)).array(),
    PATTERN,
    NOTES_HAS,
    ParamDeclaration::new("comments_has", ParamKind::String),
    ParamDeclaration::new("with_notes_fields", ParamKind::String).array(),
    ParamDeclaration::new("confidence", ParamKind::Float).range(),
    ParamDeclaration::new("north", ParamKind::Float),
    ParamDeclaration::new("south", ParamKind::Float),
    ParamDeclaration::new("east", ParamKind::Float),
    ParamDeclaration::new("west", ParamKind::Float),
    ParamDeclaration::new("has_images", ParamKind::Bool),
    ParamDeclaration::new("has_specimen", ParamKind::Bool),
    ParamDeclaration::new("has_name", ParamKind::Bool),
    ParamDeclaration::new("has_notes", ParamKind::Bool),
    ParamDeclaration::new("has_comments", ParamKind::Bool),
    ParamDeclaration::new("has_sequences", ParamKind::Bool),
    ParamDeclaration::new("has_public_lat_lng", ParamKind::Bool),
    ParamDeclaration::new("is_collection_location", ParamKind::Bool),
    ParamDeclaration::new("name_query", ParamKind::Query(Model::Name)),
    ParamDeclaration::new("location_query", ParamKind::Query(Model::Location)),
    ParamDeclaration::new("image_query", ParamKind::Query(Model::Image)),
    ParamDeclaration::new("sequence_query", ParamKind::Query(Model::Sequence)),
    ParamDeclaration::new(
        "herbarium_record_query",
        ParamKind::Query(Model::HerbariumRecord),
    ),
];

pub(super) static DEFINITION: ModelDef = ModelDef {
    model: Model::Observation,
    columns: COLUMNS,
    params: PARAMS,
    build,
    default_order: "date",
    letter_column: Some(LetterColumn {
        column: "names.sort_name",
        joins: &["names"],
    }),
};

fn build(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) -> Result<(), ConfigurationError> {
    let dialect = b.dialect();
    b.owner_and_time_stamps(spec);
    b.date(spec, "date", "observations.`when`", &[]);

    b.ids(spec, "names", "observations.name_id", &[]);
    b.id(spec, "location", "observations.location_id", &[]);
    b.locations(spec, "locations", "observations", &[]);
    b.ids(
        spec,
        "herbaria",
        "herbarium_records.herbarium_id",
        &["observation_herbarium_records", "herbarium_records"],
    );
    b.ids(
        spec,
        "herbarium_records",
        "observation_herbarium_records.herbarium_record_id",
        &["observation_herbarium_records"],
    );
    b.id(
        spec,
        "project",
        "project_observations.project_id",
        &["project_observations"],
    );
    b.ids(
        spec,
        "projects",
        "project_observations.project_id",
        &["project_observations"],
    );
    b.id(
        spec,
        "species_list",
        "species_list_observations.species_list_id",
        &["species_list_observations"],
    );
    b.ids(
        spec,
        "species_lists",
        "species_list_observations.species_list_id",
        &["species_list_observations"],
    );

    let searchable = dialect.concat(&["names.search_name", "observations.`where`"]);
    b.search(spec, "pattern", &searchable, &["names"]);
    b.search(spec, "notes_has", "observations.notes", &[]);
    let comment_text = dialect.concat(&["comments.summary", "comments.comment"]);
    b.search(spec, "comments_has", &comment_text, &["comments"]);
    add_notes_fields(spec, b);

    b.range(spec, "confidence", "observations.vote_cache", &[]);
    b.bounding_box(
        spec,
        GeoTarget::PointOrRegion {
            point: "observations",
            region: "locations",
        },
        &["locations!"],
    );

    b.boolean(
        spec,
        "has_images",
        "observations.thumb_image_id IS NOT NULL",
        Some("observations.thumb_image_id IS NULL"),
        &[],
    );
    b.boolean(
        spec,
        "has_specimen",
        "observations.specimen = 1",
        Some("observations.specimen = 0"),
        &[],
    );
    b.boolean(
        spec,
        "is_collection_location",
        "observations.is_collection_location = 1",
        Some("observations.is_collection_location = 0"),
        &[],
    );
    b.boolean(
        spec,
        "has_public_lat_lng",
        "observations.lat IS NOT NULL AND observations.gps_hidden = 0",
        Some("observations.lat IS NULL OR observations.gps_hidden = 1"),
        &[],
    );
    b.boolean(
        spec,
        "has_notes",
        "COALESCE(observations.notes, '') != ''",
        Some("COALESCE(observations.notes, '') = ''"),
        &[],
    );
    if let (Some(genus), Some(group)) = (rank_index("Genus"), rank_index("Group")) {
        b.boolean(
            spec,
            "has_name",
            &format!("names.`rank` <= {genus} OR names.`rank` = {group}"),
            Some(&format!("names.`rank` > {genus} AND names.`rank` < {group}")),
            &["names"],
        );
    }
    // only the positive form restricts anything
    if spec.bool("has_comments") == Some(true) {
        b.join(&["comments"]);
    }
    if spec.bool("has_sequences") == Some(true) {
        b.join(&["sequences"]);
    }

    b.subquery(spec, "name_query", "observations.name_id", "names.id", &[])?;
    b.subquery(
        spec,
        "location_query",
        "observations.location_id",
        "locations.id",
        &[],
    )?;
    b.subquery(
        spec,
        "image_query",
        "observations.id",
        "observation_images.observation_id",
        &["observation_images"],
    )?;
    b.subquery(
        spec,
        "sequence_query",
        "observations.id",
        "sequences.observation_id",
        &[],
    )?;
    b.subquery(
        spec,
        "herbarium_record_query",
        "observations.id",
        "observation_herbarium_records.observation_id",
        &["observation_herbarium_records"],
    )?;
    Ok(())
}

/// Notes are stored as a serialized map; each field key appears as `:key:`.
fn add_notes_fields(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) {
    let dialect = b.dialect();
    let ors = spec
        .strings("with_notes_fields")
        .into_iter()
        .map(|field| {
            let pattern = format!("%:{}:%", dialect.escape_like(field));
            format!(
                "observations.notes LIKE {}{}",
                dialect.quote_str(&pattern),
                dialect.like_escape()
            )
        })
        .collect::<Vec<_>>();
    if !ors.is_empty() {
        b.push(ors.join(" OR "), &[]);
    }
}
