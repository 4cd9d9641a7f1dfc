use crate::adapters::clock::SystemClock;
use crate::adapters::ids::UuidGenerator;
use crate::core::step_list::StepList;
use crate::domain::model::{Recipe, Step, StepKind};
use crate::domain::ports::{Clock, IdGenerator};
use crate::utils::error::{RecipeError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// How much an import trusts the document it is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Accept what the editor has always accepted; suspicious content becomes a warning.
    #[default]
    Lenient,
    /// Reject documents with unknown step fields, coordinates on full-image/automatic
    /// steps, negative coordinates, duplicate ids or a non-string name.
    Strict,
}

impl ImportMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lenient" => Some(ImportMode::Lenient),
            "strict" => Some(ImportMode::Strict),
            _ => None,
        }
    }
}

/// Result of a successful import, with what the normalizer had to do to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub step_list: StepList,
    pub created_at: Option<String>,
    pub generated_ids: usize,
    pub warnings: Vec<String>,
}

/// Converts a [`StepList`] to the exported JSON document and back.
pub struct RecipeSerializer<G = UuidGenerator, C = SystemClock> {
    ids: G,
    clock: C,
    mode: ImportMode,
}

impl RecipeSerializer {
    pub fn new() -> Self {
        Self::with_collaborators(UuidGenerator, SystemClock)
    }
}

impl Default for RecipeSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator, C: Clock> RecipeSerializer<G, C> {
    pub fn with_collaborators(ids: G, clock: C) -> Self {
        Self {
            ids,
            clock,
            mode: ImportMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ImportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ImportMode {
        self.mode
    }

    pub fn ids(&self) -> &G {
        &self.ids
    }

    /// Copies the current state into a [`Recipe`] stamped with the current time.
    pub fn snapshot(&self, step_list: &StepList) -> Recipe {
        Recipe {
            name: step_list.recipe_name().to_string(),
            created_at: format_timestamp(self.clock.now()),
            steps: step_list.steps().to_vec(),
        }
    }

    pub fn export(&self, step_list: &StepList) -> Result<String> {
        let recipe = self.snapshot(step_list);
        tracing::debug!(
            "Exporting recipe '{}' with {} steps",
            recipe.name,
            recipe.steps.len()
        );
        render(&recipe)
    }

    pub fn import(&self, raw: &str) -> Result<StepList> {
        self.import_with_report(raw).map(|report| report.step_list)
    }

    pub fn import_with_report(&self, raw: &str) -> Result<ImportReport> {
        let document: Value =
            serde_json::from_str(raw).map_err(|e| RecipeError::ParseError {
                message: e.to_string(),
            })?;

        let mut document = match document {
            Value::Object(document) => document,
            other => {
                return Err(RecipeError::schema(format!(
                    "recipe must be a JSON object, found {}",
                    json_type(&other)
                )))
            }
        };

        let raw_steps = match document.remove("steps") {
            Some(Value::Array(steps)) => steps,
            Some(other) => {
                return Err(RecipeError::schema(format!(
                    "'steps' must be an array, found {}",
                    json_type(&other)
                )))
            }
            None => return Err(RecipeError::schema("missing 'steps' field")),
        };

        let mut warnings = Vec::new();
        let recipe_name = self.read_name(&document, &mut warnings)?;
        let created_at = document
            .get("createdAt")
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut generated_ids = 0;
        let mut seen_ids = HashSet::new();
        let mut steps = Vec::with_capacity(raw_steps.len());
        for (index, value) in raw_steps.into_iter().enumerate() {
            let step = self.normalize_step(index, value, &mut generated_ids, &mut warnings)?;
            if !seen_ids.insert(step.id.clone()) {
                self.flag(
                    &mut warnings,
                    format!("steps[{}]: duplicate id '{}'", index, step.id),
                )?;
            }
            steps.push(step);
        }

        for warning in &warnings {
            tracing::warn!("Import: {}", warning);
        }
        tracing::info!(
            "Imported recipe '{}' with {} steps ({} ids generated)",
            recipe_name,
            steps.len(),
            generated_ids
        );

        Ok(ImportReport {
            step_list: StepList::from_parts(recipe_name, steps),
            created_at,
            generated_ids,
            warnings,
        })
    }

    fn read_name(&self, document: &Map<String, Value>, warnings: &mut Vec<String>) -> Result<String> {
        match document.get("name") {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(name)) => Ok(name.clone()),
            Some(other) => {
                self.flag(
                    warnings,
                    format!("'name' should be a string, found {}; using \"\"", json_type(other)),
                )?;
                Ok(String::new())
            }
        }
    }

    // Lenient on purpose: flags are defaulted when absent and unknown keys are carried
    // through to the next export, so a hand-edited document may still hold coordinates
    // on a full-image/automatic step. Those are kept and reported; `ImportMode::Strict`
    // rejects them instead. Flags of the wrong JSON type cannot be represented and fail
    // in both modes. Ids follow JavaScript truthiness: "", 0 and null get a fresh id.
    fn normalize_step(
        &self,
        index: usize,
        value: Value,
        generated_ids: &mut usize,
        warnings: &mut Vec<String>,
    ) -> Result<Step> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(RecipeError::schema(format!(
                    "steps[{}] must be an object, found {}",
                    index,
                    json_type(&other)
                )))
            }
        };

        // Older files name the discriminant `type`.
        if !fields.contains_key("kind") {
            if let Some(kind) = fields.remove("type") {
                fields.insert("kind".to_string(), kind);
            }
        }

        let id = match fields.remove("id") {
            Some(Value::String(id)) if !id.is_empty() => id,
            Some(Value::Number(id)) if id.as_f64() != Some(0.0) => id.to_string(),
            _ => {
                *generated_ids += 1;
                self.ids.next_id()
            }
        };

        let kind = match fields.get("kind") {
            Some(Value::String(kind)) => kind.parse::<StepKind>().map_err(|_| {
                RecipeError::schema(format!("steps[{}] has unknown kind '{}'", index, kind))
            })?,
            Some(other) => {
                return Err(RecipeError::schema(format!(
                    "steps[{}].kind must be a string, found {}",
                    index,
                    json_type(other)
                )))
            }
            None => {
                return Err(RecipeError::schema(format!(
                    "steps[{}] is missing 'kind'",
                    index
                )))
            }
        };
        fields.insert("kind".to_string(), Value::String(kind.as_str().to_string()));

        let owned = kind.field_names();
        fields.retain(|key, value| !(value.is_null() && owned.contains(&key.as_str())));

        let unknown: Vec<&str> = fields
            .keys()
            .map(String::as_str)
            .filter(|key| *key != "kind" && !owned.contains(key))
            .collect();
        if !unknown.is_empty() {
            let message = format!(
                "steps[{}]: carrying unknown fields {} unchanged",
                index,
                unknown.join(", ")
            );
            self.flag(warnings, message)?;
        }

        let step = Step::from_fields(id, fields)
            .map_err(|e| RecipeError::schema(format!("steps[{}]: {}", index, e)))?;

        if step.action.has_stale_coordinates() {
            self.flag(
                warnings,
                format!(
                    "steps[{}]: coordinates present on a {} step that is not targeted",
                    index, kind
                ),
            )?;
        }
        if let Some(coordinates) = step.coordinates() {
            if !coordinates.is_valid() {
                self.flag(
                    warnings,
                    format!("steps[{}]: invalid coordinates {}", index, coordinates),
                )?;
            }
        }

        Ok(step)
    }

    /// Records a leniency warning, or fails the import in strict mode.
    fn flag(&self, warnings: &mut Vec<String>, message: String) -> Result<()> {
        match self.mode {
            ImportMode::Lenient => {
                warnings.push(message);
                Ok(())
            }
            ImportMode::Strict => Err(RecipeError::SchemaError { message }),
        }
    }
}

/// Pretty JSON with two-space indentation, field order as declared on [`Recipe`].
pub fn render(recipe: &Recipe) -> Result<String> {
    Ok(serde_json::to_string_pretty(recipe)?)
}

/// ISO-8601 with millisecond precision and a `Z` suffix, e.g. `2024-05-01T08:30:00.000Z`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// File name for an exported recipe: `<name>.json`, or `<fallback>.json` for a blank name.
pub fn export_file_name(name: &str, fallback: &str) -> String {
    let base = match name.trim() {
        "" => fallback,
        trimmed => trimmed,
    };
    let sanitized: String = base
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.ends_with(".json") {
        sanitized
    } else {
        format!("{}.json", sanitized)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
