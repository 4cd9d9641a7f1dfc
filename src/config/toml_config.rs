use crate::core::serializer::ImportMode;
use crate::core::robot::SUPPORTED_VENDORS;
use crate::utils::error::{RecipeError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_one_of, validate_path, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "recipe.toml";
pub const DEFAULT_RECIPE_FILE: &str = "recipe.json";
pub const DEFAULT_OUTPUT_PATH: &str = "./recipes";
pub const DEFAULT_FALLBACK_FILENAME: &str = "recipe";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    pub editor: Option<EditorSection>,
    pub export: Option<ExportConfig>,
    pub import: Option<ImportConfig>,
    pub robot: Option<RobotConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorSection {
    /// Recipe document the CLI edits when `--file` is not given.
    pub recipe_file: Option<String>,
    /// Name given to recipes created with `recipe new`.
    pub default_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: Option<String>,
    pub fallback_filename: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    /// "lenient" or "strict"
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobotConfig {
    pub vendor: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    /// "compact" or "json"
    pub format: Option<String>,
}

impl EditorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RecipeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` if it exists, otherwise falls back to the built-in defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::from_file(path)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| RecipeError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${RECIPE_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| RecipeError::config(format!("invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn recipe_file(&self) -> &str {
        self.editor
            .as_ref()
            .and_then(|e| e.recipe_file.as_deref())
            .unwrap_or(DEFAULT_RECIPE_FILE)
    }

    pub fn default_name(&self) -> &str {
        self.editor
            .as_ref()
            .and_then(|e| e.default_name.as_deref())
            .unwrap_or("")
    }

    pub fn output_path(&self) -> &str {
        self.export
            .as_ref()
            .and_then(|e| e.output_path.as_deref())
            .unwrap_or(DEFAULT_OUTPUT_PATH)
    }

    pub fn fallback_filename(&self) -> &str {
        self.export
            .as_ref()
            .and_then(|e| e.fallback_filename.as_deref())
            .unwrap_or(DEFAULT_FALLBACK_FILENAME)
    }

    pub fn import_mode(&self) -> ImportMode {
        self.import
            .as_ref()
            .and_then(|i| i.mode.as_deref())
            .and_then(ImportMode::from_name)
            .unwrap_or_default()
    }

    pub fn robot_vendor(&self) -> Option<&str> {
        self.robot.as_ref().and_then(|r| r.vendor.as_deref())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .and_then(LogFormat::from_name)
            .unwrap_or_default()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("editor.recipe_file", self.recipe_file())?;
        validate_file_extension("editor.recipe_file", self.recipe_file(), &["json"])?;
        validate_path("export.output_path", self.output_path())?;
        validate_non_empty_string("export.fallback_filename", self.fallback_filename())?;

        if let Some(mode) = self.import.as_ref().and_then(|i| i.mode.as_deref()) {
            validate_one_of("import.mode", mode, &["lenient", "strict"])?;
        }
        if let Some(vendor) = self.robot_vendor() {
            validate_one_of("robot.vendor", &vendor.to_lowercase(), SUPPORTED_VENDORS)?;
        }
        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            validate_one_of("logging.format", format, &["compact", "json"])?;
        }
        if let Some(level) = self.log_level() {
            validate_one_of(
                "logging.level",
                level,
                &["trace", "debug", "info", "warn", "error"],
            )?;
        }

        Ok(())
    }
}

impl Validate for EditorConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
