use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use disassembly_recipe::{
    Coordinates, FixedClock, ImportMode, Recipe, RecipeError, RecipeSerializer,
    SequentialIdGenerator, StepKind, StepList, StepUpdate,
};

fn serializer() -> RecipeSerializer<SequentialIdGenerator, FixedClock> {
    let clock = FixedClock(Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap());
    RecipeSerializer::with_collaborators(SequentialIdGenerator::new("id"), clock)
}

fn battery_recipe(serializer: &RecipeSerializer<SequentialIdGenerator, FixedClock>) -> StepList {
    let mut list = StepList::with_name("Battery removal");
    list.add_step(StepKind::Image, serializer.ids());
    list.add_step(StepKind::Unscrew, serializer.ids());
    list.add_step(StepKind::Image, serializer.ids());
    list.update_step(1, StepUpdate::new().automatic(false)).unwrap();
    list.update_step(
        1,
        StepUpdate::new().coordinates(Coordinates::new(120.0, 45.5).unwrap()),
    )
    .unwrap();
    list.update_step(
        2,
        StepUpdate::new()
            .include_pointcloud(true)
            .full_image(false)
            .coordinates(Coordinates::new(3.25, 0.0).unwrap()),
    )
    .unwrap();
    list
}

#[test]
fn test_import_of_export_is_identity() -> Result<()> {
    let serializer = serializer();
    let list = battery_recipe(&serializer);

    let exported = serializer.export(&list)?;
    let imported = serializer.import(&exported)?;

    assert_eq!(imported, list);
    Ok(())
}

#[test]
fn test_export_preserves_order_and_timestamp() -> Result<()> {
    let serializer = serializer();
    let mut list = StepList::new();
    list.add_step(StepKind::Image, serializer.ids());
    list.add_step(StepKind::Unscrew, serializer.ids());

    let exported = serializer.export(&list)?;
    let document: serde_json::Value = serde_json::from_str(&exported)?;

    assert_eq!(document["name"], "");
    assert_eq!(document["steps"][0]["kind"], "image");
    assert_eq!(document["steps"][1]["kind"], "unscrew");

    let created_at = document["createdAt"].as_str().unwrap();
    let parsed = DateTime::parse_from_rfc3339(created_at)?;
    assert_eq!(
        parsed.with_timezone(&Utc),
        Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap()
    );
    Ok(())
}

#[test]
fn test_coordinates_key_is_omitted_when_not_applicable() -> Result<()> {
    let serializer = serializer();
    let mut list = battery_recipe(&serializer);
    list.update_step(1, StepUpdate::new().automatic(true))?;

    let exported = serializer.export(&list)?;
    let document: serde_json::Value = serde_json::from_str(&exported)?;

    assert!(document["steps"][0].get("coordinates").is_none());
    assert!(document["steps"][1].get("coordinates").is_none());
    assert!(document["steps"][2].get("coordinates").is_some());

    let reimported = serializer.import(&exported)?;
    assert_eq!(reimported.steps()[1].coordinates(), None);
    Ok(())
}

#[test]
fn test_exported_document_parses_as_recipe() -> Result<()> {
    let serializer = serializer();
    let list = battery_recipe(&serializer);

    let recipe: Recipe = serde_json::from_str(&serializer.export(&list)?)?;

    assert_eq!(recipe.name, "Battery removal");
    assert_eq!(recipe.created_at, "2025-03-14T15:09:26.000Z");
    assert_eq!(recipe.steps, list.steps());
    Ok(())
}

#[test]
fn test_import_error_taxonomy() {
    let serializer = serializer();

    assert!(matches!(
        serializer.import("not json"),
        Err(RecipeError::ParseError { .. })
    ));
    assert!(matches!(
        serializer.import("{}"),
        Err(RecipeError::SchemaError { .. })
    ));

    let empty = serializer.import(r#"{"steps":[]}"#).unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.recipe_name(), "");
}

#[test]
fn test_import_generates_id_for_untagged_step() -> Result<()> {
    let list = serializer().import(r#"{"steps":[{"kind":"image","isFullImage":true}]}"#)?;

    assert_eq!(list.len(), 1);
    assert!(!list.steps()[0].id.is_empty());
    Ok(())
}

#[test]
fn test_reimport_does_not_reassign_ids() -> Result<()> {
    let serializer = serializer();
    let first = serializer.import(r#"{"name":"x","steps":[{"kind":"unscrew"},{"kind":"image"}]}"#)?;
    let exported = serializer.export(&first)?;

    let report = serializer.import_with_report(&exported)?;
    assert_eq!(report.generated_ids, 0);
    assert_eq!(report.step_list, first);
    Ok(())
}

#[test]
fn test_strict_mode_accepts_clean_export() -> Result<()> {
    let serializer = serializer().with_mode(ImportMode::Strict);
    let list = battery_recipe(&serializer);

    let report = serializer.import_with_report(&serializer.export(&list)?)?;
    assert!(report.warnings.is_empty());
    assert_eq!(report.step_list, list);
    Ok(())
}

#[test]
fn test_recipe_parse_keeps_extra_step_fields() -> Result<()> {
    let raw = r#"{"name":"x","createdAt":"2025-03-14T15:09:26.000Z","steps":[{"id":"a","kind":"unscrew","isAutomatic":false,"coordinates":{"x":4,"y":9},"torqueNm":2.5}]}"#;
    let recipe: Recipe = serde_json::from_str(raw)?;

    assert_eq!(recipe.steps[0].kind(), StepKind::Unscrew);
    assert_eq!(recipe.steps[0].coordinates(), Some(Coordinates::new(4.0, 9.0)?));
    assert_eq!(recipe.steps[0].extra["torqueNm"], 2.5);

    let rendered = serde_json::to_string(&recipe)?;
    assert!(rendered.contains(r#""coordinates":{"x":4,"y":9},"torqueNm":2.5"#));
    Ok(())
}
