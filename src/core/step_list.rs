use crate::domain::model::{
    Axis, Coordinates, CoordinatesUpdate, ImageStep, Step, StepAction, StepKind, StepUpdate,
    UnscrewStep,
};
use crate::domain::ports::IdGenerator;
use crate::utils::error::{RecipeError, Result};
use crate::utils::validation::validate_coordinate;

/// The live, editable recipe: a display name and an ordered list of steps.
///
/// Order is insertion order and is the execution order of the procedure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepList {
    recipe_name: String,
    steps: Vec<Step>,
}

impl StepList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            recipe_name: name.into(),
            steps: Vec::new(),
        }
    }

    pub(crate) fn from_parts(recipe_name: String, steps: Vec<Step>) -> Self {
        Self { recipe_name, steps }
    }

    pub fn recipe_name(&self) -> &str {
        &self.recipe_name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    /// Appends a fully defaulted step of `kind` with a fresh id.
    pub fn add_step<G: IdGenerator + ?Sized>(&mut self, kind: StepKind, ids: &G) -> &Step {
        let index = self.steps.len();
        let step = Step::new(kind, ids.next_id());
        tracing::debug!("Adding {} step {} at index {}", kind, step.id, index);
        self.steps.push(step);
        &self.steps[index]
    }

    /// Removes the step at `index`; later steps shift left. Out of range leaves the list as is.
    pub fn remove_step(&mut self, index: usize) -> Result<Step> {
        if index >= self.steps.len() {
            return Err(RecipeError::StepIndexOutOfRange {
                index,
                len: self.steps.len(),
            });
        }
        let removed = self.steps.remove(index);
        tracing::debug!("Removed {} step {} from index {}", removed.kind(), removed.id, index);
        Ok(removed)
    }

    pub fn remove_step_by_id(&mut self, id: &str) -> Result<Step> {
        let index = self.position(id).ok_or_else(|| RecipeError::StepNotFound {
            id: id.to_string(),
        })?;
        self.remove_step(index)
    }

    /// Merges `update` into the step at `index`.
    ///
    /// Whatever the update contains, the resulting step carries no coordinates while
    /// its full-image/automatic flag is true. On error the step is left unchanged.
    pub fn update_step(&mut self, index: usize, update: StepUpdate) -> Result<&Step> {
        let len = self.steps.len();
        let step = self
            .steps
            .get_mut(index)
            .ok_or(RecipeError::StepIndexOutOfRange { index, len })?;

        step.action = merge_update(&step.action, &update)?;
        tracing::debug!("Updated step {} at index {}: {:?}", step.id, index, update);
        Ok(&*step)
    }

    /// Sets a single axis, keeping the other axis (or 0 when the step has no coordinates yet).
    pub fn set_coordinate(&mut self, index: usize, axis: Axis, value: f64) -> Result<&Step> {
        validate_coordinate(axis.as_str(), value)?;
        let current = self
            .steps
            .get(index)
            .ok_or(RecipeError::StepIndexOutOfRange {
                index,
                len: self.steps.len(),
            })?
            .coordinates()
            .unwrap_or(Coordinates { x: 0.0, y: 0.0 });

        self.update_step(index, StepUpdate::new().coordinates(current.with(axis, value)))
    }

    pub fn set_recipe_name(&mut self, name: impl Into<String>) {
        self.recipe_name = name.into();
    }
}

fn merge_update(action: &StepAction, update: &StepUpdate) -> Result<StepAction> {
    if let CoordinatesUpdate::Set(coordinates) = update.coordinates {
        validate_coordinate("x", coordinates.x)?;
        validate_coordinate("y", coordinates.y)?;
    }

    match action {
        StepAction::Image(image) => {
            if update.is_automatic.is_some() {
                return Err(not_applicable("isAutomatic", StepKind::Image));
            }
            let mut next: ImageStep = image.clone();
            if let Some(value) = update.include_pointcloud {
                next.include_pointcloud = value;
            }
            if let Some(value) = update.is_full_image {
                next.is_full_image = value;
            }
            next.coordinates =
                merge_coordinates(next.coordinates, update.coordinates, !next.is_full_image);
            Ok(StepAction::Image(next))
        }
        StepAction::Unscrew(unscrew) => {
            if update.include_pointcloud.is_some() {
                return Err(not_applicable("includePointcloud", StepKind::Unscrew));
            }
            if update.is_full_image.is_some() {
                return Err(not_applicable("isFullImage", StepKind::Unscrew));
            }
            let mut next: UnscrewStep = unscrew.clone();
            if let Some(value) = update.is_automatic {
                next.is_automatic = value;
            }
            next.coordinates =
                merge_coordinates(next.coordinates, update.coordinates, !next.is_automatic);
            Ok(StepAction::Unscrew(next))
        }
    }
}

fn merge_coordinates(
    current: Option<Coordinates>,
    update: CoordinatesUpdate,
    targeted: bool,
) -> Option<Coordinates> {
    if !targeted {
        if matches!(update, CoordinatesUpdate::Set(_)) {
            tracing::debug!("Dropping coordinates for a full-image/automatic step");
        }
        return None;
    }
    match update {
        CoordinatesUpdate::Unchanged => current,
        CoordinatesUpdate::Set(coordinates) => Some(coordinates),
        CoordinatesUpdate::Clear => None,
    }
}

fn not_applicable(field: &str, kind: StepKind) -> RecipeError {
    RecipeError::FieldNotApplicable {
        field: field.to_string(),
        kind: kind.to_string(),
    }
}
