use crate::utils::error::{RecipeError, Result};
use crate::utils::validation::validate_coordinate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The two kinds of step a disassembly recipe knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Image,
    Unscrew,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Image => "image",
            StepKind::Unscrew => "unscrew",
        }
    }

    /// JSON fields owned by this kind, besides `id` and `kind`.
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            StepKind::Image => &["includePointcloud", "isFullImage", "coordinates"],
            StepKind::Unscrew => &["isAutomatic", "coordinates"],
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepKind {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(StepKind::Image),
            "unscrew" => Ok(StepKind::Unscrew),
            other => Err(RecipeError::UnknownStepKind {
                kind: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

/// Target point on the battery image, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(serialize_with = "serialize_pixel")]
    pub x: f64,
    #[serde(serialize_with = "serialize_pixel")]
    pub y: f64,
}

// Whole pixel values are written as `10`, not `10.0`.
fn serialize_pixel<S>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

impl Coordinates {
    /// Rejects negative and non-finite values.
    pub fn new(x: f64, y: f64) -> Result<Self> {
        validate_coordinate(Axis::X.as_str(), x)?;
        validate_coordinate(Axis::Y.as_str(), y)?;
        Ok(Self { x, y })
    }

    pub fn with(self, axis: Axis, value: f64) -> Self {
        match axis {
            Axis::X => Self { x: value, ..self },
            Axis::Y => Self { y: value, ..self },
        }
    }

    pub fn is_valid(&self) -> bool {
        validate_coordinate("x", self.x).is_ok() && validate_coordinate("y", self.y).is_ok()
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStep {
    #[serde(default)]
    pub include_pointcloud: bool,
    #[serde(default = "default_true")]
    pub is_full_image: bool,
    /// Only meaningful while `is_full_image` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Default for ImageStep {
    fn default() -> Self {
        Self {
            include_pointcloud: false,
            is_full_image: true,
            coordinates: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnscrewStep {
    #[serde(default = "default_true")]
    pub is_automatic: bool,
    /// Only meaningful while `is_automatic` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Default for UnscrewStep {
    fn default() -> Self {
        Self {
            is_automatic: true,
            coordinates: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StepAction {
    Image(ImageStep),
    Unscrew(UnscrewStep),
}

impl StepAction {
    pub fn defaults_for(kind: StepKind) -> Self {
        match kind {
            StepKind::Image => StepAction::Image(ImageStep::default()),
            StepKind::Unscrew => StepAction::Unscrew(UnscrewStep::default()),
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            StepAction::Image(_) => StepKind::Image,
            StepAction::Unscrew(_) => StepKind::Unscrew,
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            StepAction::Image(image) => image.coordinates,
            StepAction::Unscrew(unscrew) => unscrew.coordinates,
        }
    }

    /// True when the step acts on a specific point rather than the whole battery
    /// (`isFullImage == false` / `isAutomatic == false`).
    pub fn is_targeted(&self) -> bool {
        match self {
            StepAction::Image(image) => !image.is_full_image,
            StepAction::Unscrew(unscrew) => !unscrew.is_automatic,
        }
    }

    /// Coordinates left behind on a full-image or automatic step.
    pub fn has_stale_coordinates(&self) -> bool {
        !self.is_targeted() && self.coordinates().is_some()
    }
}

/// One entry of the recipe. Serializes as `{"id", "kind", ...variant fields, ...extra}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Step {
    pub id: String,
    #[serde(flatten)]
    pub action: StepAction,
    /// Fields this crate does not know about, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Step {
    pub fn new(kind: StepKind, id: impl Into<String>) -> Self {
        Self::with_action(id, StepAction::defaults_for(kind))
    }

    pub fn with_action(id: impl Into<String>, action: StepAction) -> Self {
        Self {
            id: id.into(),
            action,
            extra: Map::new(),
        }
    }

    /// Builds a step from the fields of one JSON entry other than `id`.
    ///
    /// `kind` selects the variant; keys the variant does not own go to `extra`.
    pub fn from_fields(
        id: impl Into<String>,
        fields: Map<String, Value>,
    ) -> serde_json::Result<Self> {
        let owned = fields
            .get("kind")
            .and_then(Value::as_str)
            .and_then(|kind| kind.parse::<StepKind>().ok())
            .map(|kind| kind.field_names())
            .unwrap_or_default();

        let (action_fields, extra): (Map<String, Value>, Map<String, Value>) = fields
            .into_iter()
            .partition(|(key, _)| key == "kind" || owned.contains(&key.as_str()));
        let action = serde_json::from_value(Value::Object(action_fields))?;

        Ok(Self {
            id: id.into(),
            action,
            extra,
        })
    }

    pub fn kind(&self) -> StepKind {
        self.action.kind()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.action.coordinates()
    }
}

impl TryFrom<Map<String, Value>> for Step {
    type Error = RecipeError;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self> {
        let id = match fields.remove("id") {
            Some(Value::String(id)) => id,
            Some(_) => return Err(RecipeError::schema("step 'id' must be a string")),
            None => return Err(RecipeError::schema("step is missing 'id'")),
        };
        Self::from_fields(id, fields).map_err(|e| RecipeError::schema(e.to_string()))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            StepAction::Image(image) => {
                write!(f, "image")?;
                if image.is_full_image {
                    write!(f, " full")?;
                } else {
                    match image.coordinates {
                        Some(c) => write!(f, " at {}", c)?,
                        None => write!(f, " at (unset)")?,
                    }
                }
                if image.include_pointcloud {
                    write!(f, " +pointcloud")?;
                }
            }
            StepAction::Unscrew(unscrew) => {
                write!(f, "unscrew")?;
                if unscrew.is_automatic {
                    write!(f, " automatic")?;
                } else {
                    match unscrew.coordinates {
                        Some(c) => write!(f, " at {}", c)?,
                        None => write!(f, " at (unset)")?,
                    }
                }
            }
        }
        write!(f, " [{}]", self.id)
    }
}

/// What an update does with the `coordinates` field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum CoordinatesUpdate {
    #[default]
    Unchanged,
    Set(Coordinates),
    Clear,
}

/// Partial update merged into an existing step. Unset fields are preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepUpdate {
    pub include_pointcloud: Option<bool>,
    pub is_full_image: Option<bool>,
    pub is_automatic: Option<bool>,
    pub coordinates: CoordinatesUpdate,
}

impl StepUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_pointcloud(mut self, value: bool) -> Self {
        self.include_pointcloud = Some(value);
        self
    }

    pub fn full_image(mut self, value: bool) -> Self {
        self.is_full_image = Some(value);
        self
    }

    pub fn automatic(mut self, value: bool) -> Self {
        self.is_automatic = Some(value);
        self
    }

    pub fn coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = CoordinatesUpdate::Set(coordinates);
        self
    }

    pub fn clear_coordinates(mut self) -> Self {
        self.coordinates = CoordinatesUpdate::Clear;
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// The exported document. Only built at export time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub created_at: String,
    pub steps: Vec<Step>,
}
