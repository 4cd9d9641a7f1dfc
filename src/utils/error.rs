use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecipeError {
    /// The imported text is not syntactically valid JSON.
    #[error("Parse error: {message}")]
    ParseError { message: String },

    /// Valid JSON, but not a recipe document.
    #[error("Schema error: {message}")]
    SchemaError { message: String },

    #[error("Step index {index} is out of range (recipe has {len} steps)")]
    StepIndexOutOfRange { index: usize, len: usize },

    #[error("No step with id '{id}'")]
    StepNotFound { id: String },

    #[error("Field '{field}' does not apply to {kind} steps")]
    FieldNotApplicable { field: String, kind: String },

    #[error("Invalid coordinate {axis}={value}: {reason}")]
    InvalidCoordinate {
        axis: String,
        value: f64,
        reason: String,
    },

    #[error("Unknown step kind '{kind}'. Valid kinds: image, unscrew")]
    UnknownStepKind { kind: String },

    #[error("Unsupported robot vendor: {vendor}")]
    UnsupportedRobotVendor { vendor: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Import,
    Editing,
    Io,
    Configuration,
    Robot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RecipeError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ParseError { .. } | Self::SchemaError { .. } => ErrorCategory::Import,
            Self::StepIndexOutOfRange { .. }
            | Self::StepNotFound { .. }
            | Self::FieldNotApplicable { .. }
            | Self::InvalidCoordinate { .. }
            | Self::UnknownStepKind { .. } => ErrorCategory::Editing,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::Io,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::UnsupportedRobotVendor { .. } => ErrorCategory::Robot,
        }
    }

    /// Import and editing errors are recoverable by the user retrying with other input;
    /// only collaborator I/O is critical.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Import | ErrorCategory::Editing => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Robot => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ParseError { .. } => "Check that the file is a JSON document exported by this tool",
            Self::SchemaError { .. } => "The document needs a 'steps' array of image/unscrew steps",
            Self::StepIndexOutOfRange { .. } | Self::StepNotFound { .. } => {
                "Run 'recipe show' to list the current steps and their indices"
            }
            Self::FieldNotApplicable { .. } => {
                "Image steps take --pointcloud/--full-image, unscrew steps take --automatic"
            }
            Self::InvalidCoordinate { .. } => "Coordinates must be finite, non-negative numbers",
            Self::UnknownStepKind { .. } => "Use 'image' or 'unscrew'",
            Self::UnsupportedRobotVendor { .. } => "Supported vendors: company_a, company_b",
            Self::IoError(_) => "Check the file path and its permissions",
            Self::SerializationError(_) => "The recipe could not be written as JSON",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Review the TOML configuration file",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ParseError { .. } => format!("Error loading file: not valid JSON ({})", self),
            Self::SchemaError { message } => {
                format!("Error loading file: invalid recipe format ({})", message)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecipeError>;
