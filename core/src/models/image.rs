use crate::conditions::ConditionBuilder;
use crate::error::ConfigurationError;
use crate::model::Model;
use crate::params::{ParamDeclaration, ParamKind};
use crate::schema::ModelDef;
use crate::spec::QuerySpec;
use crate::value::Value;

use super::{
    CREATED_AT, NOTES_HAS, OBSERVATION, OBSERVATION_QUERY, OUTER, PATTERN, UPDATED_AT, USERS,
};

const COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "user_id",
    "content_type",
    "copyright_holder",
    "license_id",
    "notes",
    "when",
    "vote_cache",
    "num_views",
    "last_view",
    "width",
    "height",
    "original_name",
    "transferred",
    "gps_stripped",
    "ok_for_export",
    "diagnostic",
];

/// Named sizes, smallest first
pub const SIZES: &[&str] = &["thumbnail", "small", "medium", "large", "huge", "full_size"];
/// Longest edge in pixels of each size; `full_size` is unbounded
const SIZE_PIXELS: &[u32] = &[160, 320, 640, 960, 1280];

/// Content types by extension; `raw` means anything else
pub const CONTENT_TYPES: &[&str] = &["jpg", "gif", "png", "tiff", "raw"];
const MIME_TYPES: &[&str] = &["image/jpeg", "image/gif", "image/png", "image/tiff"];

const PARAMS: &[ParamDeclaration] = &[
    CREATED_AT,
    UPDATED_AT,
    USERS,
    ParamDeclaration::new("date", ParamKind::Date).range(),
    ParamDeclaration::new("size", ParamKind::Enum(SIZES)).range(),
    ParamDeclaration::new("content_types", ParamKind::Enum(CONTENT_TYPES)).array(),
    ParamDeclaration::new("has_notes", ParamKind::Bool),
    NOTES_HAS,
    ParamDeclaration::new("copyright_holder_has", ParamKind::String),
    ParamDeclaration::new("license", ParamKind::Id).array(),
    ParamDeclaration::new("has_votes", ParamKind::Bool),
    ParamDeclaration::new("quality", ParamKind::Float).range(),
    ParamDeclaration::new("confidence", ParamKind::Float).range(),
    ParamDeclaration::new("ok_for_export", ParamKind::Bool),
    ParamDeclaration::new("has_observations", ParamKind::Bool),
    ParamDeclaration::new("observations", ParamKind::Id).array(),
    OBSERVATION,
    OUTER,
    PATTERN,
    OBSERVATION_QUERY,
];

pub(super) static DEFINITION: ModelDef = ModelDef {
    model: Model::Image,
    columns: COLUMNS,
    params: PARAMS,
    build,
    default_order: "created_at",
    letter_column: None,
};

fn build(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) -> Result<(), ConfigurationError> {
    let dialect = b.dialect();
    b.owner_and_time_stamps(spec);
    b.date(spec, "date", "images.`when`", &[]);
    add_size(spec, b);
    add_content_types(spec, b);

    b.boolean(
        spec,
        "has_notes",
        "COALESCE(images.notes, '') != ''",
        Some("COALESCE(images.notes, '') = ''"),
        &[],
    );
    b.search(spec, "notes_has", "images.notes", &[]);
    b.search(spec, "copyright_holder_has", "images.copyright_holder", &[]);
    b.ids(spec, "license", "images.license_id", &[]);
    b.boolean(
        spec,
        "has_votes",
        "images.vote_cache IS NOT NULL",
        Some("images.vote_cache IS NULL"),
        &[],
    );
    b.range(spec, "quality", "images.vote_cache", &[]);
    b.range(
        spec,
        "confidence",
        "observations.vote_cache",
        &["observation_images", "observations"],
    );
    b.boolean(
        spec,
        "ok_for_export",
        "images.ok_for_export = 1",
        Some("images.ok_for_export = 0"),
        &[],
    );
    if spec.bool("has_observations") == Some(true) {
        b.join(&["observation_images"]);
    }
    b.ids(
        spec,
        "observations",
        "observation_images.observation_id",
        &["observation_images"],
    );
    b.id(
        spec,
        "observation",
        "observation_images.observation_id",
        &["observation_images"],
    );

    let searchable = dialect.concat(&[
        "images.original_name",
        "images.copyright_holder",
        "images.notes",
    ]);
    b.search(spec, "pattern", &searchable, &[]);

    b.subquery(
        spec,
        "observation_query",
        "images.id",
        "observation_images.image_id",
        &["observation_images"],
    )?;
    Ok(())
}

/// Minimum and maximum named size, compared on the longer edge.
fn add_size(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) {
    let Some((min, max)) = spec.range("size") else {
        return;
    };
    let index = |v: &Value| v.as_str().and_then(|s| SIZES.iter().position(|a| *a == s));
    if let Some(pixels) = index(min).and_then(|i| SIZE_PIXELS.get(i)) {
        b.push(
            format!("images.width >= {pixels} OR images.height >= {pixels}"),
            &[],
        );
    }
    // the next size up is exclusive; nothing above full_size
    if let Some(pixels) = index(max).and_then(|i| SIZE_PIXELS.get(i + 1)) {
        b.push(
            format!("images.width < {pixels} AND images.height < {pixels}"),
            &[],
        );
    }
}

fn add_content_types(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) {
    let requested = spec.strings("content_types");
    if requested.is_empty() {
        return;
    }
    let dialect = b.dialect();
    let quote_all = |mimes: &[&str]| {
        mimes
            .iter()
            .map(|m| dialect.quote_str(m))
            .collect::<Vec<_>>()
            .join(",")
    };

    let other = requested.contains(&"raw");
    let mimes = requested
        .iter()
        .filter_map(|ext| {
            CONTENT_TYPES
                .iter()
                .position(|e| e == ext)
                .and_then(|i| MIME_TYPES.get(i).copied())
        })
        .collect::<Vec<_>>();
    let known = format!("images.content_type IN ({})", quote_all(&mimes));
    let unknown = format!("images.content_type NOT IN ({})", quote_all(MIME_TYPES));
    let fragment = match (mimes.is_empty(), other) {
        (true, _) => unknown,
        (false, true) => format!("{known} OR {unknown}"),
        (false, false) => known,
    };
    b.push(fragment, &[]);
}

#[cfg(test)]
mod tests {
    use crate::{params, Model, Overrides, Planner, Value};

    fn sql_for(raw: crate::Params) -> String {
        let planner = Planner::default();
        let spec = planner.construct(Model::Image, raw).unwrap();
        planner.compile(&spec, &Overrides::new()).unwrap().to_sql()
    }

    #[test]
    fn test_size_range() {
        let sql = sql_for(params! { "size" => vec!["medium", "large"] });
        assert!(sql.contains("(images.width >= 640 OR images.height >= 640)"));
        assert!(sql.contains("images.width < 1280 AND images.height < 1280"));

        let sql = sql_for(params! { "size" => vec![Value::Null, Value::from("full_size")] });
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn test_content_types_with_raw() {
        let sql = sql_for(params! { "content_types" => vec!["png", "raw"] });
        assert!(sql.contains(
            "(images.content_type IN ('image/png') OR images.content_type NOT IN \
             ('image/jpeg','image/gif','image/png','image/tiff'))"
        ));
        let sql = sql_for(params! { "content_types" => vec!["raw"] });
        assert!(sql.contains("WHERE images.content_type NOT IN ("));
    }

    #[test]
    fn test_nested_in_observation() {
        let sql = sql_for(params! { "observation" => 7, "outer" => 3 });
        assert!(sql.contains(
            "JOIN `observation_images` ON observation_images.image_id = images.id"
        ));
        assert!(sql.contains("WHERE observation_images.observation_id = 7"));
    }

    #[test]
    fn test_name_order_groups_by_image() {
        let sql = sql_for(params! { "by" => "name" });
        assert!(sql.contains(
            "GROUP BY images.id ORDER BY MIN(names.sort_name) ASC, images.`when` DESC, images.id DESC"
        ));
    }
}
