use crate::conditions::ConditionBuilder;
use crate::error::ConfigurationError;
use crate::model::Model;
use crate::params::{ParamDeclaration, ParamKind};
use crate::schema::ModelDef;
use crate::spec::QuerySpec;

use super::{
    CREATED_AT, NOTES_HAS, OBSERVATION, OBSERVATION_QUERY, OUTER, PATTERN, UPDATED_AT, USERS,
};

const COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "observation_id",
    "user_id",
    "locus",
    "bases",
    "archive",
    "accession",
    "notes",
];

const PARAMS: &[ParamDeclaration] = &[
    CREATED_AT,
    UPDATED_AT,
    USERS,
    ParamDeclaration::new("locus", ParamKind::String).array(),
    ParamDeclaration::new("locus_has", ParamKind::String),
    ParamDeclaration::new("archive", ParamKind::String).array(),
    ParamDeclaration::new("accession", ParamKind::String).array(),
    ParamDeclaration::new("accession_has", ParamKind::String),
    NOTES_HAS,
    ParamDeclaration::new("observations", ParamKind::Id).array(),
    OBSERVATION,
    OUTER,
    ParamDeclaration::new("obs_date", ParamKind::Date).range(),
    PATTERN,
    OBSERVATION_QUERY,
];

pub(super) static DEFINITION: ModelDef = ModelDef {
    model: Model::Sequence,
    columns: COLUMNS,
    params: PARAMS,
    build,
    default_order: "created_at",
    letter_column: None,
};

fn build(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) -> Result<(), ConfigurationError> {
    b.owner_and_time_stamps(spec);
    b.exact(spec, "locus", "sequences.locus", &[]);
    b.search(spec, "locus_has", "sequences.locus", &[]);
    b.exact(spec, "archive", "sequences.archive", &[]);
    b.exact(spec, "accession", "sequences.accession", &[]);
    b.search(spec, "accession_has", "sequences.accession", &[]);
    b.search(spec, "notes_has", "sequences.notes", &[]);
    b.ids(spec, "observations", "sequences.observation_id", &[]);
    b.id(spec, "observation", "sequences.observation_id", &[]);
    b.date(spec, "obs_date", "observations.`when`", &["observations"]);

    let searchable = b.dialect().concat(&[
        "sequences.locus",
        "sequences.archive",
        "sequences.accession",
        "sequences.notes",
    ]);
    b.search(spec, "pattern", &searchable, &[]);
    b.subquery(
        spec,
        "observation_query",
        "sequences.observation_id",
        "observations.id",
        &[],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{params, Model, Overrides, Planner};

    fn sql_for(raw: crate::Params) -> String {
        let planner = Planner::default();
        let spec = planner.construct(Model::Sequence, raw).unwrap();
        planner.compile(&spec, &Overrides::new()).unwrap().to_sql()
    }

    #[test]
    fn test_observation_date_joins_observations() {
        let sql = sql_for(params! { "obs_date" => "2019" });
        assert_eq!(
            sql,
            "SELECT DISTINCT sequences.id FROM `sequences` \
             JOIN `observations` ON sequences.observation_id = observations.id \
             WHERE observations.`when` >= '2019-01-01' AND observations.`when` <= '2019-12-31' \
             ORDER BY sequences.created_at DESC, sequences.id DESC"
        );
    }

    #[test]
    fn test_archive_and_observation() {
        let sql = sql_for(params! { "archive" => "GenBank", "observation" => 12 });
        assert!(sql.contains(
            "WHERE LOWER(sequences.archive) = 'genbank' AND sequences.observation_id = 12"
        ));
    }
}
