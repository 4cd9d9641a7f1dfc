use anyhow::Result;
use chrono::{TimeZone, Utc};
use disassembly_recipe::{
    EditorSession, FixedClock, LocalStorage, RecipeError, RecipeSerializer,
    SequentialIdGenerator, StepKind, StepUpdate,
};
use tempfile::TempDir;

fn session(dir: &TempDir) -> EditorSession<LocalStorage, SequentialIdGenerator, FixedClock> {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 11, 2, 9, 0, 0).unwrap());
    let serializer =
        RecipeSerializer::with_collaborators(SequentialIdGenerator::new("step"), clock);
    EditorSession::with_serializer(LocalStorage::new(dir.path()), serializer)
}

#[tokio::test]
async fn test_save_then_open_restores_state() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut editor = session(&temp_dir);

    editor.step_list_mut().set_recipe_name("Pack 7");
    editor.add_step(StepKind::Image);
    editor.add_step(StepKind::Unscrew);
    editor
        .step_list_mut()
        .update_step(0, StepUpdate::new().include_pointcloud(true))?;
    let saved = editor.step_list().clone();
    editor.save("pack.json").await?;

    let mut reopened = session(&temp_dir);
    let report = reopened.open("pack.json").await?;

    assert_eq!(reopened.step_list(), &saved);
    assert_eq!(report.created_at.as_deref(), Some("2024-11-02T09:00:00.000Z"));
    Ok(())
}

#[tokio::test]
async fn test_failed_import_keeps_current_state() -> Result<()> {
    let temp_dir = TempDir::new()?;
    tokio::fs::write(temp_dir.path().join("broken.json"), "{\"steps\": 3}").await?;
    tokio::fs::write(temp_dir.path().join("garbage.json"), "<<<").await?;

    let mut editor = session(&temp_dir);
    editor.step_list_mut().set_recipe_name("Keep me");
    editor.add_step(StepKind::Unscrew);
    let before = editor.step_list().clone();

    let err = editor.open("broken.json").await.unwrap_err();
    assert!(matches!(err, RecipeError::SchemaError { .. }));
    let err = editor.open("garbage.json").await.unwrap_err();
    assert!(matches!(err, RecipeError::ParseError { .. }));
    let err = editor.open("missing.json").await.unwrap_err();
    assert!(matches!(err, RecipeError::IoError(_)));

    assert_eq!(editor.step_list(), &before);
    Ok(())
}

#[tokio::test]
async fn test_legacy_file_is_normalized_on_open() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let legacy = r#"{
  "name": "Old",
  "createdAt": "2023-01-01T00:00:00.000Z",
  "steps": [
    { "type": "image", "includePointcloud": true, "isFullImage": true },
    { "id": "kept", "type": "unscrew", "isAutomatic": false, "coordinates": { "x": 5, "y": 6 } }
  ]
}"#;
    tokio::fs::write(temp_dir.path().join("legacy.json"), legacy).await?;

    let mut editor = session(&temp_dir);
    let report = editor.open("legacy.json").await?;

    assert_eq!(report.generated_ids, 1);
    let steps = editor.step_list().steps();
    assert_eq!(steps[0].id, "step-1");
    assert_eq!(steps[0].kind(), StepKind::Image);
    assert_eq!(steps[1].id, "kept");

    editor.save("legacy.json").await?;
    let rewritten = tokio::fs::read_to_string(temp_dir.path().join("legacy.json")).await?;
    assert!(rewritten.contains("\"kind\": \"unscrew\""));
    assert!(!rewritten.contains("\"type\""));
    Ok(())
}

#[tokio::test]
async fn test_export_to_uses_name_or_fallback() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut editor = session(&temp_dir);
    editor.add_step(StepKind::Image);

    let unnamed = editor.export_to("out", "recipe").await?;
    assert!(unnamed.ends_with("recipe.json"));
    assert!(temp_dir.path().join("out").join("recipe.json").exists());

    editor.step_list_mut().set_recipe_name("Cell B");
    let named = editor.export_to("out", "recipe").await?;
    assert!(named.ends_with("Cell B.json"));
    assert!(temp_dir.path().join("out").join("Cell B.json").exists());
    Ok(())
}
