pub mod robot;
pub mod serializer;
pub mod step_list;

pub use crate::domain::model::{
    Axis, Coordinates, CoordinatesUpdate, ImageStep, Recipe, Step, StepAction, StepKind,
    StepUpdate, UnscrewStep,
};
pub use crate::domain::ports::{Clock, IdGenerator, Storage};
pub use crate::utils::error::Result;
