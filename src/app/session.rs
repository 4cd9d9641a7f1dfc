use crate::adapters::clock::SystemClock;
use crate::adapters::ids::UuidGenerator;
use crate::core::serializer::{export_file_name, render, ImportReport, RecipeSerializer};
use crate::core::step_list::StepList;
use crate::domain::model::{Recipe, Step, StepKind};
use crate::domain::ports::{Clock, IdGenerator, Storage};
use crate::utils::error::{RecipeError, Result};
use std::path::Path;

/// One editing session: the current [`StepList`] plus the file it is read from and written to.
pub struct EditorSession<S: Storage, G = UuidGenerator, C = SystemClock> {
    storage: S,
    serializer: RecipeSerializer<G, C>,
    step_list: StepList,
}

impl<S: Storage> EditorSession<S> {
    pub fn new(storage: S) -> Self {
        Self::with_serializer(storage, RecipeSerializer::new())
    }
}

impl<S: Storage, G: IdGenerator, C: Clock> EditorSession<S, G, C> {
    pub fn with_serializer(storage: S, serializer: RecipeSerializer<G, C>) -> Self {
        Self {
            storage,
            serializer,
            step_list: StepList::new(),
        }
    }

    pub fn step_list(&self) -> &StepList {
        &self.step_list
    }

    pub fn step_list_mut(&mut self) -> &mut StepList {
        &mut self.step_list
    }

    pub fn serializer(&self) -> &RecipeSerializer<G, C> {
        &self.serializer
    }

    pub fn add_step(&mut self, kind: StepKind) -> &Step {
        self.step_list.add_step(kind, self.serializer.ids())
    }

    pub fn snapshot(&self) -> Recipe {
        self.serializer.snapshot(&self.step_list)
    }

    /// Reads and imports `path`. The current state is only replaced when the import succeeds.
    pub async fn open(&mut self, path: &str) -> Result<ImportReport> {
        let bytes = self.storage.read_file(path).await?;
        let raw = String::from_utf8(bytes).map_err(|e| RecipeError::ParseError {
            message: format!("{} is not valid UTF-8: {}", path, e),
        })?;

        let report = self.serializer.import_with_report(&raw)?;
        self.step_list = report.step_list.clone();
        tracing::info!("Opened {} ({} steps)", path, self.step_list.len());
        Ok(report)
    }

    pub async fn exists(&self, path: &str) -> Result<bool> {
        self.storage.exists(path).await
    }

    /// Exports the current state to `path` and returns the written document.
    pub async fn save(&self, path: &str) -> Result<Recipe> {
        let recipe = self.snapshot();
        let text = render(&recipe)?;
        self.storage.write_file(path, text.as_bytes()).await?;
        tracing::info!("Saved {} ({} steps)", path, recipe.steps.len());
        Ok(recipe)
    }

    /// Writes `<name>.json` (or `<fallback>.json` for an unnamed recipe) into `dir`.
    pub async fn export_to(&self, dir: &str, fallback: &str) -> Result<String> {
        let file_name = export_file_name(self.step_list.recipe_name(), fallback);
        let target = Path::new(dir).join(file_name).to_string_lossy().into_owned();
        self.save(&target).await?;
        Ok(target)
    }
}
