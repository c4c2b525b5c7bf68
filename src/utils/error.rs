use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Invalid ZIP code '{value}': expected exactly 5 digits")]
    InvalidZip { value: String },

    #[error("Unknown ZIP code: {zip}")]
    UnknownZip { zip: String },

    #[error("No service-area ZIP codes are configured")]
    ConfigEmpty,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Lookup,
    Configuration,
    Storage,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GateError::InvalidZip { .. } | GateError::ValidationError { .. } => {
                ErrorCategory::Input
            }
            GateError::UnknownZip { .. } => ErrorCategory::Lookup,
            GateError::ConfigEmpty
            | GateError::ConfigError { .. }
            | GateError::ConfigValidationError { .. }
            | GateError::InvalidConfigValueError { .. }
            | GateError::MissingConfigError { .. } => ErrorCategory::Configuration,
            GateError::CsvError(_) | GateError::IoError(_) => ErrorCategory::Storage,
            GateError::HttpError(_) => ErrorCategory::Network,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Lookup => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// 呼叫端用來區分拒絕原因的代碼
    pub fn reason_code(&self) -> &'static str {
        match self {
            GateError::InvalidZip { .. } => "invalid_zip",
            GateError::UnknownZip { .. } => "unknown_zip",
            GateError::ConfigEmpty => "config_empty",
            _ => "internal_error",
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GateError::InvalidZip { .. } => "Enter a 5-digit US ZIP code",
            GateError::UnknownZip { .. } => {
                "Check the ZIP code, or extend the coordinate table with this ZIP"
            }
            GateError::ConfigEmpty => "Add at least one service-area ZIP with `zipgate zips add`",
            GateError::HttpError(_) => "Check network access to the resolver endpoint",
            GateError::CsvError(_) => "Check that the CSV file has the expected headers",
            GateError::IoError(_) => "Check that the data directory exists and is writable",
            GateError::ConfigError { .. }
            | GateError::ConfigValidationError { .. }
            | GateError::InvalidConfigValueError { .. }
            | GateError::MissingConfigError { .. } => "Fix the configuration file and retry",
            GateError::ValidationError { .. } => "Correct the submitted fields and retry",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GateError::InvalidZip { .. } => "Enter a valid 5-digit ZIP.".to_string(),
            GateError::UnknownZip { zip } => format!("ZIP {} could not be located.", zip),
            GateError::ConfigEmpty => "No service areas have been configured yet.".to_string(),
            GateError::ValidationError { message } => message.clone(),
            other => format!("Something went wrong: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, GateError>;
