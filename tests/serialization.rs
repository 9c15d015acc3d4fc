#![cfg(feature = "rusqlite")]

mod common;

use common::setup_db;
use quarry::{Engine, Model, Params, Value, params};
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};

/// Parameters known to validate, per model.
fn pool(model: Model) -> Vec<(&'static str, Value)> {
    match model {
        Model::Name => vec![
            ("misspellings", Value::from("either")),
            ("has_synonyms", Value::from(true)),
            ("text_name_has", Value::from("Amanita, sect. Caesareae")),
            ("rank", Value::from(vec!["Genus", "Species"])),
            ("by", Value::from("reverse_name")),
            ("ids", Value::from(vec![3, 1, 2])),
        ],
        Model::Observation => vec![
            ("has_images", Value::from(false)),
            ("date", Value::from(vec!["2024-05-01", "2024-06-30"])),
            ("pattern", Value::from("50% off; #1 & more=/?")),
            ("north", Value::from(45.5)),
            ("names", Value::from(vec![7, 8])),
            ("name_query", Value::from(params! { "misspellings" => "no" })),
        ],
        _ => vec![
            ("created_at", Value::from(vec!["2023-01-01 00:00:00", "2023-12-31 23:59:59"])),
            ("by", Value::from("id")),
        ],
    }
}

#[test]
fn test_random_specs_round_trip_through_records() {
    let conn = setup_db();
    let engine = Engine::new(&conn, conn.records());
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..200 {
        let model = *[Model::Name, Model::Observation, Model::Location]
            .choose(&mut rng)
            .unwrap();
        let mut choices = pool(model);
        choices.shuffle(&mut rng);
        let take = rng.random_range(0..=choices.len());
        let params = choices.into_iter().take(take).collect::<Vec<_>>();

        let forward = params
            .iter()
            .map(|(k, v)| ((*k).into(), v.clone()))
            .collect::<Params>();
        let spec = engine.construct(model, forward).unwrap();
        let record = engine.find_or_create_record(&spec).unwrap();

        let loaded = engine.load_record(record.id).unwrap().unwrap();
        assert_eq!(loaded, spec, "{}", record.description);

        let mut reordered = params;
        reordered.reverse();
        let again = engine
            .construct(model, reordered.into_iter().map(|(k, v)| (k.into(), v)).collect())
            .unwrap();
        assert_eq!(engine.find_or_create_record(&again).unwrap().id, record.id);
    }
}
