use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Schema mismatch at `{field}`: {reason}")]
    SchemaMismatch { field: String, reason: String },

    #[error("Unsupported report version {found} (this reader supports up to {supported})")]
    UnsupportedVersion { found: u64, supported: u32 },

    #[error("Malformed report payload: {0}")]
    MalformedPayload(serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API request to {url} returned status {status}")]
    HttpStatusError { url: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in `{field}`: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value `{value}` for `{field}`: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration `{field}`")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 報表內容與合約不符
    Contract,
    Network,
    Storage,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn schema_mismatch(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ReportError::SchemaMismatch {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 穩定的錯誤代碼，寫入 rejected.json
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::SchemaMismatch { .. } => "schema_mismatch",
            ReportError::UnsupportedVersion { .. } => "unsupported_version",
            ReportError::MalformedPayload(_) => "malformed_payload",
            ReportError::ZipError(_) => "zip",
            ReportError::ApiError(_) => "api",
            ReportError::HttpStatusError { .. } => "http_status",
            ReportError::CsvError(_) => "csv",
            ReportError::IoError(_) => "io",
            ReportError::SerializationError(_) => "serialization",
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => "config",
            ReportError::ProcessingError { .. } => "processing",
            ReportError::ValidationError { .. } => "validation",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::SchemaMismatch { .. }
            | ReportError::UnsupportedVersion { .. }
            | ReportError::MalformedPayload(_)
            | ReportError::ValidationError { .. } => ErrorCategory::Contract,
            ReportError::ApiError(_) | ReportError::HttpStatusError { .. } => {
                ErrorCategory::Network
            }
            ReportError::ZipError(_) | ReportError::CsvError(_) | ReportError::IoError(_) => {
                ErrorCategory::Storage
            }
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ReportError::SerializationError(_) | ReportError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Contract | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReportError::SchemaMismatch { .. } => {
                "Check that the producer emits every Member Report field with the expected type"
            }
            ReportError::UnsupportedVersion { .. } => {
                "Upgrade this reader or raise --max-version if the newer schema is known to be compatible"
            }
            ReportError::MalformedPayload(_) => "Make sure the source returns a JSON document",
            ReportError::ValidationError { .. } => {
                "The report is structurally valid but its counts disagree; report it to the producer"
            }
            ReportError::ApiError(_) | ReportError::HttpStatusError { .. } => {
                "Check network connectivity and that the report endpoint is reachable"
            }
            ReportError::ZipError(_) | ReportError::CsvError(_) | ReportError::IoError(_) => {
                "Check that the output path exists and is writable"
            }
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => {
                "Review the command line flags or the TOML configuration file"
            }
            ReportError::SerializationError(_) | ReportError::ProcessingError { .. } => {
                "Re-run with --verbose to see which report failed"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Contract => format!("Report rejected: {}", self),
            ErrorCategory::Network => format!("Could not fetch report: {}", self),
            ErrorCategory::Storage => format!("Could not write output: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Processing => format!("Processing failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
