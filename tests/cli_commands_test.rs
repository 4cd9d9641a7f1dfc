#![cfg(feature = "cli")]

use anyhow::Result;
use clap::Parser;
use disassembly_recipe::app::commands::run;
use disassembly_recipe::{CliConfig, EditorConfig, RecipeError};
use tempfile::TempDir;

fn recipe_path(dir: &TempDir) -> String {
    dir.path().join("pack.json").to_string_lossy().into_owned()
}

async fn recipe(file: &str, args: &[&str], config: &EditorConfig) -> disassembly_recipe::Result<String> {
    let argv = ["recipe", "--file", file].into_iter().chain(args.iter().copied());
    run(&CliConfig::parse_from(argv), config).await
}

async fn document(file: &str) -> Result<serde_json::Value> {
    Ok(serde_json::from_str(&tokio::fs::read_to_string(file).await?)?)
}

#[tokio::test]
async fn test_new_refuses_to_overwrite_without_force() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = recipe_path(&temp_dir);
    let config = EditorConfig::default();

    recipe(&file, &["new", "--name", "Pack"], &config).await?;
    recipe(&file, &["add", "image"], &config).await?;

    let err = recipe(&file, &["new", "--name", "Other"], &config)
        .await
        .unwrap_err();
    assert!(matches!(err, RecipeError::ConfigError { .. }));
    let kept = document(&file).await?;
    assert_eq!(kept["name"], "Pack");
    assert_eq!(kept["steps"].as_array().map(Vec::len), Some(1));

    recipe(&file, &["new", "--name", "Other", "--force"], &config).await?;
    let replaced = document(&file).await?;
    assert_eq!(replaced["name"], "Other");
    assert_eq!(replaced["steps"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn test_update_single_axis_keeps_the_other() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = recipe_path(&temp_dir);
    let config = EditorConfig::default();

    recipe(&file, &["new"], &config).await?;
    recipe(&file, &["add", "unscrew"], &config).await?;

    let out = recipe(&file, &["update", "0", "--automatic", "false", "--x", "12"], &config).await?;
    assert!(out.starts_with("Updated step 0: unscrew at (12,0)"), "{}", out);

    let out = recipe(&file, &["update", "0", "--y", "7.5"], &config).await?;
    assert!(out.starts_with("Updated step 0: unscrew at (12,7.5)"), "{}", out);

    let saved = document(&file).await?;
    assert_eq!(saved["steps"][0]["isAutomatic"], false);
    assert_eq!(saved["steps"][0]["coordinates"]["x"], 12);
    assert_eq!(saved["steps"][0]["coordinates"]["y"], 7.5);

    let err = recipe(&file, &["update", "0"], &config).await.unwrap_err();
    assert!(matches!(err, RecipeError::ConfigError { .. }));
    Ok(())
}

#[tokio::test]
async fn test_validate_is_strict_while_show_warns() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = recipe_path(&temp_dir);
    let config = EditorConfig::default();
    tokio::fs::write(
        &file,
        r#"{"name":"Hand edited","steps":[{"id":"a","kind":"image","isFullImage":true,"coordinates":{"x":1,"y":2}}]}"#,
    )
    .await?;

    let shown = recipe(&file, &["show"], &config).await?;
    assert!(shown.starts_with("Recipe: Hand edited"));
    assert!(shown.contains("warning: steps[0]"));

    let err = recipe(&file, &["validate"], &config).await.unwrap_err();
    assert!(matches!(err, RecipeError::SchemaError { .. }));

    recipe(&file, &["update", "0", "--full-image", "true"], &config).await?;
    let out = recipe(&file, &["validate"], &config).await?;
    assert!(out.ends_with("is valid (1 steps, 0 ids generated)"), "{}", out);
    Ok(())
}

#[tokio::test]
async fn test_convert_falls_back_to_configured_vendor() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = recipe_path(&temp_dir);
    let config = EditorConfig::from_toml_str("[robot]\nvendor = \"company_b\"\n")?;

    recipe(&file, &["new", "--name", "Pack"], &config).await?;
    recipe(&file, &["add", "image"], &config).await?;
    recipe(&file, &["add", "unscrew"], &config).await?;

    let plan: serde_json::Value = serde_json::from_str(&recipe(&file, &["convert"], &config).await?)?;
    assert_eq!(plan["recipeName"], "Pack");
    assert_eq!(plan["steps"][0]["actionType"], "captureImage");
    assert_eq!(plan["steps"][1]["actionType"], "removeScrew");

    let plan: serde_json::Value =
        serde_json::from_str(&recipe(&file, &["convert", "--vendor", "company_a"], &config).await?)?;
    assert_eq!(plan["steps"][0]["actionType"], "takeImage");

    let err = recipe(&file, &["convert"], &EditorConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RecipeError::MissingConfigError { .. }));
    Ok(())
}

#[tokio::test]
async fn test_edits_keep_fields_written_by_other_tools() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = recipe_path(&temp_dir);
    let config = EditorConfig::default();
    tokio::fs::write(
        &file,
        r#"{"name":"Shared","steps":[{"id":"a","kind":"image","isFullImage":true,"note":"keep me"}]}"#,
    )
    .await?;

    recipe(&file, &["add", "unscrew"], &config).await?;
    recipe(&file, &["rename", "Shared v2"], &config).await?;

    let saved = document(&file).await?;
    assert_eq!(saved["name"], "Shared v2");
    assert_eq!(saved["steps"][0]["note"], "keep me");
    assert!(saved["steps"][1].get("note").is_none());
    Ok(())
}
