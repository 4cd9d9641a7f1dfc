use crate::adapters::storage::LocalStorage;
use crate::app::session::EditorSession;
use crate::config::cli::{CliConfig, Command};
use crate::config::toml_config::EditorConfig;
use crate::core::robot::robot_adapter_for;
use crate::core::serializer::{ImportMode, RecipeSerializer};
use crate::domain::model::{Axis, Coordinates, StepUpdate};
use crate::utils::error::{RecipeError, Result};
use crate::utils::validation::validate_required_field;

/// Runs one CLI command against the recipe file and returns the text to print.
pub async fn run(cli: &CliConfig, config: &EditorConfig) -> Result<String> {
    let file = cli
        .file
        .clone()
        .unwrap_or_else(|| config.recipe_file().to_string());

    let mode = match (&cli.command, cli.strict) {
        (Command::Validate, _) | (_, true) => ImportMode::Strict,
        _ => config.import_mode(),
    };
    let serializer = RecipeSerializer::new().with_mode(mode);
    let mut session = EditorSession::with_serializer(LocalStorage::new("."), serializer);

    match &cli.command {
        Command::New { name, force } => {
            if !force && session.exists(&file).await? {
                return Err(RecipeError::config(format!(
                    "{} already exists, pass --force to overwrite it",
                    file
                )));
            }
            let name = name
                .clone()
                .unwrap_or_else(|| config.default_name().to_string());
            session.step_list_mut().set_recipe_name(name);
            session.save(&file).await?;
            Ok(format!("Created {}", file))
        }
        Command::Add { kind } => {
            session.open(&file).await?;
            let step = session.add_step(*kind).to_string();
            let index = session.step_list().len() - 1;
            session.save(&file).await?;
            Ok(format!("Added step {}: {}", index, step))
        }
        Command::Remove { index } => {
            session.open(&file).await?;
            let removed = session.step_list_mut().remove_step(*index)?;
            session.save(&file).await?;
            Ok(format!("Removed step {}: {}", index, removed))
        }
        Command::Update {
            index,
            pointcloud,
            full_image,
            automatic,
            x,
            y,
            clear_coordinates,
        } => {
            let mut update = StepUpdate {
                include_pointcloud: *pointcloud,
                is_full_image: *full_image,
                is_automatic: *automatic,
                ..StepUpdate::default()
            };
            if *clear_coordinates {
                update = update.clear_coordinates();
            }
            if let (Some(x), Some(y)) = (x, y) {
                update = update.coordinates(Coordinates::new(*x, *y)?);
            }
            if update.is_empty() && x.is_none() && y.is_none() {
                return Err(RecipeError::config("nothing to update, pass at least one field"));
            }

            session.open(&file).await?;
            let steps = session.step_list_mut();
            if !update.is_empty() {
                steps.update_step(*index, update)?;
            }
            // A single axis keeps the other one, like the editor's coordinate inputs.
            match (x, y) {
                (Some(x), None) => {
                    steps.set_coordinate(*index, Axis::X, *x)?;
                }
                (None, Some(y)) => {
                    steps.set_coordinate(*index, Axis::Y, *y)?;
                }
                _ => {}
            }
            let summary = steps
                .get(*index)
                .map(|step| step.to_string())
                .unwrap_or_default();
            session.save(&file).await?;
            Ok(format!("Updated step {}: {}", index, summary))
        }
        Command::Rename { name } => {
            session.open(&file).await?;
            session.step_list_mut().set_recipe_name(name.clone());
            session.save(&file).await?;
            Ok(format!("Renamed recipe to '{}'", name))
        }
        Command::Show => {
            let report = session.open(&file).await?;
            let list = session.step_list();
            let mut out = format!(
                "Recipe: {}\nCreated: {}\nSteps: {}\n",
                if list.recipe_name().is_empty() {
                    "(unnamed)"
                } else {
                    list.recipe_name()
                },
                report.created_at.as_deref().unwrap_or("-"),
                list.len()
            );
            for (index, step) in list.steps().iter().enumerate() {
                out.push_str(&format!("  {}: {}\n", index, step));
            }
            for warning in &report.warnings {
                out.push_str(&format!("warning: {}\n", warning));
            }
            Ok(out.trim_end().to_string())
        }
        Command::Validate => {
            let report = session.open(&file).await?;
            Ok(format!(
                "{} is valid ({} steps, {} ids generated)",
                file,
                report.step_list.len(),
                report.generated_ids
            ))
        }
        Command::Export { output_path } => {
            session.open(&file).await?;
            let dir = output_path
                .clone()
                .unwrap_or_else(|| config.output_path().to_string());
            let target = session.export_to(&dir, config.fallback_filename()).await?;
            Ok(format!("Exported to {}", target))
        }
        Command::Convert { vendor } => {
            let configured = config.robot_vendor().map(str::to_string);
            let vendor = match vendor {
                Some(vendor) => vendor.clone(),
                None => validate_required_field("robot.vendor", &configured)?.clone(),
            };
            let adapter = robot_adapter_for(&vendor)?;
            session.open(&file).await?;
            let plan = adapter.convert(&session.snapshot());
            tracing::info!(
                "Converted {} steps for {}",
                plan.steps.len(),
                adapter.vendor()
            );
            Ok(serde_json::to_string_pretty(&plan)?)
        }
    }
}
