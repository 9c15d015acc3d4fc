//! The compiled-in model catalog.
//!
//! One module per model, each holding its columns, declared parameters and
//! the function that turns a validated [`QuerySpec`](crate::QuerySpec) into
//! conditions.

mod comment;
mod herbarium;
mod herbarium_record;
mod image;
mod location;
mod name;
mod observation;
mod project;
mod rss_log;
mod sequence;
mod species_list;
mod user;

use crate::model::Model;
use crate::params::{ParamDeclaration, ParamKind};
use crate::schema::ModelDef;

/// Taxonomic ranks, lowest first. Stored in `names.rank` as position + 1.
pub const RANKS: &[&str] = &[
    "Form",
    "Variety",
    "Subspecies",
    "Species",
    "Stirps",
    "Subsection",
    "Section",
    "Subgenus",
    "Genus",
    "Family",
    "Order",
    "Class",
    "Phylum",
    "Kingdom",
    "Domain",
    "Group",
];

/// Stored value of a rank in `names.rank`.
pub fn rank_index(rank: &str) -> Option<i64> {
    RANKS
        .iter()
        .position(|r| *r == rank)
        .map(|i| i as i64 + 1)
}

pub(crate) const CREATED_AT: ParamDeclaration =
    ParamDeclaration::new("created_at", ParamKind::Time).range();
pub(crate) const UPDATED_AT: ParamDeclaration =
    ParamDeclaration::new("updated_at", ParamKind::Time).range();
pub(crate) const USERS: ParamDeclaration = ParamDeclaration::new("users", ParamKind::Record(Model::User)).array();
pub(crate) const PATTERN: ParamDeclaration = ParamDeclaration::new("pattern", ParamKind::String);
pub(crate) const NOTES_HAS: ParamDeclaration =
    ParamDeclaration::new("notes_has", ParamKind::String);
/// Observation id for queries nested inside one observation
pub(crate) const OBSERVATION: ParamDeclaration =
    ParamDeclaration::new("observation", ParamKind::Id);
/// Persisted record id of the query this one is nested in
pub(crate) const OUTER: ParamDeclaration = ParamDeclaration::new("outer", ParamKind::Id);
pub(crate) const OBSERVATION_QUERY: ParamDeclaration =
    ParamDeclaration::new("observation_query", ParamKind::Query(Model::Observation));

/// Definition of `model` in the compiled-in catalog.
pub fn definition(model: Model) -> &'static ModelDef {
    match model {
        Model::Observation => &observation::DEFINITION,
        Model::Name => &name::DEFINITION,
        Model::Location => &location::DEFINITION,
        Model::Image => &image::DEFINITION,
        Model::User => &user::DEFINITION,
        Model::Herbarium => &herbarium::DEFINITION,
        Model::HerbariumRecord => &herbarium_record::DEFINITION,
        Model::Sequence => &sequence::DEFINITION,
        Model::SpeciesList => &species_list::DEFINITION,
        Model::Project => &project::DEFINITION,
        Model::Comment => &comment::DEFINITION,
        Model::RssLog => &rss_log::DEFINITION,
    }
}
