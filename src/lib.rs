pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::EditorConfig;

pub use adapters::{FixedClock, LocalStorage, SequentialIdGenerator, SystemClock, UuidGenerator};
pub use app::EditorSession;
pub use crate::core::serializer::{ImportMode, ImportReport, RecipeSerializer};
pub use crate::core::step_list::StepList;
pub use domain::model::{Coordinates, Recipe, Step, StepAction, StepKind, StepUpdate};
pub use utils::error::{RecipeError, Result};
