use crate::conditions::ConditionBuilder;
use crate::error::ConfigurationError;
use crate::model::Model;
use crate::params::{ParamDeclaration, ParamKind};
use crate::schema::{LetterColumn, ModelDef};
use crate::spec::QuerySpec;

use super::{CREATED_AT, PATTERN, UPDATED_AT};

const COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "name",
    "code",
    "location_id",
    "email",
    "mailing_address",
    "personal_user_id",
    "description",
];

const PARAMS: &[ParamDeclaration] = &[
    CREATED_AT,
    UPDATED_AT,
    ParamDeclaration::new("code", ParamKind::String).array(),
    ParamDeclaration::new("name_has", ParamKind::String),
    ParamDeclaration::new("description_has", ParamKind::String),
    ParamDeclaration::new("mailing_address_has", ParamKind::String),
    ParamDeclaration::new("nonpersonal", ParamKind::Bool),
    ParamDeclaration::new("has_records", ParamKind::Bool),
    PATTERN,
];

pub(super) static DEFINITION: ModelDef = ModelDef {
    model: Model::Herbarium,
    columns: COLUMNS,
    params: PARAMS,
    build,
    default_order: "name",
    letter_column: Some(LetterColumn {
        column: "herbaria.name",
        joins: &[],
    }),
};

fn build(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) -> Result<(), ConfigurationError> {
    b.time(spec, "created_at", "herbaria.created_at");
    b.time(spec, "updated_at", "herbaria.updated_at");
    b.exact(spec, "code", "herbaria.code", &[]);
    b.search(spec, "name_has", "herbaria.name", &[]);
    b.search(spec, "description_has", "herbaria.description", &[]);
    b.search(spec, "mailing_address_has", "herbaria.mailing_address", &[]);
    b.boolean(
        spec,
        "nonpersonal",
        "herbaria.personal_user_id IS NULL",
        Some("herbaria.personal_user_id IS NOT NULL"),
        &[],
    );
    if spec.bool("has_records") == Some(true) {
        b.join(&["herbarium_records"]);
    }
    let searchable = b
        .dialect()
        .concat(&["herbaria.code", "herbaria.name", "herbaria.description"]);
    b.search(spec, "pattern", &searchable, &[]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{params, Model, Overrides, Planner};

    fn sql_for(raw: crate::Params) -> String {
        let planner = Planner::default();
        let spec = planner.construct(Model::Herbarium, raw).unwrap();
        planner.compile(&spec, &Overrides::new()).unwrap().to_sql()
    }

    #[test]
    fn test_code_is_case_insensitive() {
        let sql = sql_for(params! { "code" => vec!["NY", "MICH"] });
        assert!(sql.contains("WHERE LOWER(herbaria.code) IN ('ny', 'mich')"));
    }

    #[test]
    fn test_records_order() {
        let sql = sql_for(params! { "by" => "records" });
        assert!(sql.ends_with(
            "LEFT OUTER JOIN `herbarium_records` ON herbarium_records.herbarium_id = herbaria.id \
             GROUP BY herbaria.id ORDER BY COUNT(herbarium_records.id) DESC, herbaria.id DESC"
        ));
    }

    #[test]
    fn test_reverse_code_then_name() {
        let sql = sql_for(params! { "by" => "reverse_code_then_name" });
        assert!(sql.ends_with(
            "ORDER BY CASE WHEN herbaria.code = '' THEN '~' ELSE herbaria.code END DESC, \
             herbaria.name DESC, herbaria.id ASC"
        ));
    }
}
