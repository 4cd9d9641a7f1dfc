//! Translation of a recipe into the action lists that individual robot vendors accept.
//!
//! Each vendor gets an adapter implementing [`RobotAdapter`]; [`robot_adapter_for`]
//! picks one by company name. Only the translation lives here, sending a plan to a
//! robot is left to the caller.

use crate::domain::model::{Coordinates, Recipe, Step, StepAction};
use crate::utils::error::{RecipeError, Result};
use serde::{Deserialize, Serialize};

pub const SUPPORTED_VENDORS: &[&str] = &["company_a", "company_b"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorAction {
    pub action_type: String,
    pub parameters: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorPlan {
    pub recipe_name: String,
    pub steps: Vec<VendorAction>,
}

pub trait RobotAdapter: Send + Sync {
    fn vendor(&self) -> &'static str;

    fn image_action(&self) -> &'static str;

    fn unscrew_action(&self) -> &'static str;

    fn convert(&self, recipe: &Recipe) -> VendorPlan {
        let steps = recipe
            .steps
            .iter()
            .map(|step| VendorAction {
                action_type: match step.action {
                    StepAction::Image(_) => self.image_action(),
                    StepAction::Unscrew(_) => self.unscrew_action(),
                }
                .to_string(),
                parameters: parameters(step),
            })
            .collect();

        VendorPlan {
            recipe_name: recipe.name.clone(),
            steps,
        }
    }
}

/// `(x,y)` for targeted steps, `full` / `auto` otherwise. A targeted step without
/// coordinates is sent as `(0,0)`.
fn parameters(step: &Step) -> String {
    let base = if step.action.is_targeted() {
        let c = step.coordinates().unwrap_or(Coordinates { x: 0.0, y: 0.0 });
        format!("({},{})", c.x, c.y)
    } else {
        match step.action {
            StepAction::Image(_) => "full".to_string(),
            StepAction::Unscrew(_) => "auto".to_string(),
        }
    };

    match &step.action {
        StepAction::Image(image) if image.include_pointcloud => format!("{}+pointcloud", base),
        _ => base,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyARobot;

impl RobotAdapter for CompanyARobot {
    fn vendor(&self) -> &'static str {
        "company_a"
    }

    fn image_action(&self) -> &'static str {
        "takeImage"
    }

    fn unscrew_action(&self) -> &'static str {
        "unscrew"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyBRobot;

impl RobotAdapter for CompanyBRobot {
    fn vendor(&self) -> &'static str {
        "company_b"
    }

    fn image_action(&self) -> &'static str {
        "captureImage"
    }

    fn unscrew_action(&self) -> &'static str {
        "removeScrew"
    }
}

pub fn robot_adapter_for(company: &str) -> Result<Box<dyn RobotAdapter>> {
    match company.trim().to_lowercase().as_str() {
        "company_a" => Ok(Box::new(CompanyARobot)),
        "company_b" => Ok(Box::new(CompanyBRobot)),
        _ => Err(RecipeError::UnsupportedRobotVendor {
            vendor: company.to_string(),
        }),
    }
}
