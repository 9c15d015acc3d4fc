use crate::conditions::{ConditionBuilder, EnumRender};
use crate::error::ConfigurationError;
use crate::model::Model;
use crate::params::{ParamDeclaration, ParamKind};
use crate::schema::{LetterColumn, ModelDef};
use crate::spec::QuerySpec;

use super::{CREATED_AT, NOTES_HAS, OBSERVATION_QUERY, PATTERN, RANKS, UPDATED_AT, USERS};

const COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "user_id",
    "text_name",
    "search_name",
    "sort_name",
    "display_name",
    "author",
    "citation",
    "classification",
    "notes",
    "rank",
    "deprecated",
    "correct_spelling_id",
    "synonym_id",
    "description_id",
    "rss_log_id",
    "num_views",
    "last_view",
    "ok_for_export",
    "lifeform",
    "locked",
];

const MISSPELLINGS: &[&str] = &["no", "either", "only"];
const DEPRECATED: &[&str] = &["either", "no", "only"];

const PARAMS: &[ParamDeclaration] = &[
    CREATED_AT,
    UPDATED_AT,
    USERS,
    ParamDeclaration::new("misspellings", ParamKind::Enum(MISSPELLINGS)),
    ParamDeclaration::new("deprecated", ParamKind::Enum(DEPRECATED)),
    ParamDeclaration::new("has_synonyms", ParamKind::Bool),
    ParamDeclaration::new("rank", ParamKind::Enum(RANKS)).range(),
    ParamDeclaration::new("locations", ParamKind::String).array(),
    ParamDeclaration::new("species_lists", ParamKind::Record(Model::SpeciesList)).array(),
    ParamDeclaration::new("text_name_has", ParamKind::String),
    ParamDeclaration::new("has_author", ParamKind::Bool),
    ParamDeclaration::new("author_has", ParamKind::String),
    ParamDeclaration::new("has_citation", ParamKind::Bool),
    ParamDeclaration::new("citation_has", ParamKind::String),
    ParamDeclaration::new("has_classification", ParamKind::Bool),
    ParamDeclaration::new("classification_has", ParamKind::String),
    ParamDeclaration::new("has_notes", ParamKind::Bool),
    NOTES_HAS,
    ParamDeclaration::new("has_comments", ParamKind::Bool),
    ParamDeclaration::new("comments_has", ParamKind::String),
    ParamDeclaration::new("has_observations", ParamKind::Bool),
    ParamDeclaration::new("ok_for_export", ParamKind::Bool),
    PATTERN,
    OBSERVATION_QUERY,
];

pub(super) static DEFINITION: ModelDef = ModelDef {
    model: Model::Name,
    columns: COLUMNS,
    params: PARAMS,
    build,
    default_order: "name",
    letter_column: Some(LetterColumn {
        column: "names.sort_name",
        joins: &[],
    }),
};

/// `has_<field>` / `<field>_has` pairs over a free-text column
const TEXT_FIELDS: &[(&str, &str, &str)] = &[
    ("has_author", "author_has", "names.author"),
    ("has_citation", "citation_has", "names.citation"),
    ("has_classification", "classification_has", "names.classification"),
    ("has_notes", "notes_has", "names.notes"),
];

fn build(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) -> Result<(), ConfigurationError> {
    let dialect = b.dialect();
    b.owner_and_time_stamps(spec);

    match spec.str("misspellings") {
        Some("no") => b.push("names.correct_spelling_id IS NULL", &[]),
        Some("only") => b.push("names.correct_spelling_id IS NOT NULL", &[]),
        _ => {}
    }
    match spec.str("deprecated") {
        Some("no") => b.push("names.deprecated = 0", &[]),
        Some("only") => b.push("names.deprecated = 1", &[]),
        _ => {}
    }
    b.boolean(
        spec,
        "has_synonyms",
        "names.synonym_id IS NOT NULL",
        Some("names.synonym_id IS NULL"),
        &[],
    );
    b.enum_range(
        spec,
        "rank",
        "names.`rank`",
        RANKS,
        EnumRender::Indexed { first: 1 },
        &[],
    );

    b.locations(spec, "locations", "observations", &["observations"]);
    b.ids(
        spec,
        "species_lists",
        "species_list_observations.species_list_id",
        &["observations", "species_list_observations"],
    );

    b.search(spec, "text_name_has", "names.text_name", &[]);
    for (has, search, column) in TEXT_FIELDS {
        let present = format!("COALESCE({column}, '') != ''");
        let absent = format!("COALESCE({column}, '') = ''");
        b.boolean(spec, has, &present, Some(&absent), &[]);
        b.search(spec, search, column, &[]);
    }
    b.boolean(
        spec,
        "ok_for_export",
        "names.ok_for_export = 1",
        Some("names.ok_for_export = 0"),
        &[],
    );
    if spec.bool("has_comments") == Some(true) {
        b.join(&["comments"]);
    }
    let comment_text = dialect.concat(&["comments.summary", "comments.comment"]);
    b.search(spec, "comments_has", &comment_text, &["comments"]);
    if spec.bool("has_observations") == Some(true) {
        b.join(&["observations"]);
    }
    b.search(spec, "pattern", "names.search_name", &[]);

    b.subquery(
        spec,
        "observation_query",
        "names.id",
        "observations.name_id",
        &[],
    )?;
    Ok(())
}
