use crate::config::toml_config::DEFAULT_CONFIG_FILE;
use crate::domain::model::StepKind;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extension, validate_path, Validate};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "recipe")]
#[command(about = "Build disassembly recipes from image-capture and unscrewing steps")]
pub struct CliConfig {
    /// Recipe document to edit (defaults to editor.recipe_file from the config)
    #[arg(short, long, global = true)]
    pub file: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Reject suspicious recipe files instead of warning")]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create an empty recipe file
    New {
        #[arg(long)]
        name: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Append a step (image or unscrew)
    Add {
        #[arg(value_parser = parse_step_kind)]
        kind: StepKind,
    },

    /// Remove the step at INDEX
    Remove { index: usize },

    /// Change fields of the step at INDEX
    Update {
        index: usize,

        #[arg(long)]
        pointcloud: Option<bool>,

        #[arg(long)]
        full_image: Option<bool>,

        #[arg(long)]
        automatic: Option<bool>,

        #[arg(long, allow_hyphen_values = true)]
        x: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        y: Option<f64>,

        #[arg(long, conflicts_with_all = ["x", "y"])]
        clear_coordinates: bool,
    },

    /// Set the recipe name
    Rename { name: String },

    /// Print the recipe steps
    Show,

    /// Check the recipe file with strict import rules
    Validate,

    /// Write <name>.json into the output directory
    Export {
        #[arg(long)]
        output_path: Option<String>,
    },

    /// Print the recipe as a robot vendor action plan
    Convert {
        #[arg(long)]
        vendor: Option<String>,
    },
}

fn parse_step_kind(value: &str) -> std::result::Result<StepKind, String> {
    value.parse::<StepKind>().map_err(|e| e.to_string())
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(file) = &self.file {
            validate_path("--file", file)?;
            validate_file_extension("--file", file, &["json"])?;
        }
        validate_path("--config", &self.config)
    }
}
