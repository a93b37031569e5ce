use crate::core::ConfigProvider;
use crate::domain::report::MemberReport;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub decode: DecodeConfig,
    pub load: LoadConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoints: Option<Vec<String>>,
    pub timeout_seconds: Option<u64>,
    pub concurrent_requests: Option<usize>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeConfig {
    pub max_supported_version: Option<u32>,
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

/// 載入時不會報錯但需要回報的問題
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// 設定檔中未知的 key
    UnknownKey(String),
    /// `${VAR}` 找不到對應的環境變數，原文保留
    UnresolvedVariable(String),
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::UnknownKey(path) => {
                write!(f, "Unknown configuration key ignored: {}", path)
            }
            ConfigWarning::UnresolvedVariable(name) => write!(
                f,
                "Environment variable {} is not set, `${{{}}}` is used literally",
                name, name
            ),
        }
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<(Self, Vec<ConfigWarning>)> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，並收集未知的 key
    pub fn from_toml_str(content: &str) -> Result<(Self, Vec<ConfigWarning>)> {
        let mut warnings = Vec::new();
        let processed_content = Self::substitute_env_vars(content, &mut warnings);

        let table: toml::Table = toml::from_str(&processed_content).map_err(|e| {
            ReportError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            }
        })?;
        let document = toml::Value::Table(table);

        let config: TomlConfig = serde_ignored::deserialize(document, |path| {
            warnings.push(ConfigWarning::UnknownKey(path.to_string()));
        })
        .map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })?;

        Ok((config, warnings))
    }

    /// 替換環境變數 (例如 ${REPORT_API_TOKEN})，未設定的保持原樣
    fn substitute_env_vars(content: &str, warnings: &mut Vec<ConfigWarning>) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| {
                    let warning = ConfigWarning::UnresolvedVariable(var_name.to_string());
                    if !warnings.contains(&warning) {
                        warnings.push(warning);
                    }
                    format!("${{{}}}", var_name)
                })
            })
            .into_owned()
    }

    pub fn endpoints(&self) -> &[String] {
        self.source.endpoints.as_deref().unwrap_or(&[])
    }

    pub fn concurrent_requests(&self) -> usize {
        self.source.concurrent_requests.unwrap_or(5)
    }

    pub fn max_supported_version(&self) -> u32 {
        self.decode
            .max_supported_version
            .unwrap_or(MemberReport::CURRENT_VERSION)
    }

    pub fn is_strict(&self) -> bool {
        self.decode.strict.unwrap_or(false)
    }

    pub fn json_logging(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .map(|f| f == "json")
            .unwrap_or(false)
    }

    pub fn verbose_logging(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .map(|l| l.eq_ignore_ascii_case("debug") || l.eq_ignore_ascii_case("trace"))
            .unwrap_or(false)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;

        let endpoints =
            validation::validate_required_field("source.endpoints", &self.source.endpoints)?;
        if endpoints.is_empty() {
            return Err(ReportError::MissingConfigError {
                field: "source.endpoints".to_string(),
            });
        }
        for endpoint in endpoints {
            validation::validate_source("source.endpoints", endpoint)?;
        }

        validation::validate_range(
            "source.concurrent_requests",
            self.concurrent_requests(),
            1,
            64,
        )?;

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_positive_number("source.timeout_seconds", timeout as usize, 1)?;
        }

        validation::validate_positive_number(
            "decode.max_supported_version",
            self.max_supported_version() as usize,
            1,
        )?;

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        if let Some(filename) = &self.load.filename {
            validation::validate_non_empty_string("load.filename", filename)?;
            // 只能是 output_path 底下的檔名
            if filename.contains(['/', '\\']) {
                return Err(ReportError::InvalidConfigValueError {
                    field: "load.filename".to_string(),
                    value: filename.clone(),
                    reason: "Archive name must be a plain file name without path separators"
                        .to_string(),
                });
            }
            if !filename.ends_with(".zip") {
                return Err(ReportError::InvalidConfigValueError {
                    field: "load.filename".to_string(),
                    value: filename.clone(),
                    reason: "Archive name must end with .zip".to_string(),
                });
            }
        }

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            if format != "compact" && format != "json" {
                return Err(ReportError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.to_string(),
                    reason: "Valid formats: compact, json".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn report_sources(&self) -> &[String] {
        self.endpoints()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests()
    }

    fn max_supported_version(&self) -> u32 {
        self.max_supported_version()
    }

    fn strict(&self) -> bool {
        self.is_strict()
    }

    fn request_headers(&self) -> Option<&HashMap<String, String>> {
        self.source.headers.as_ref()
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.source.timeout_seconds
    }

    fn archive_name(&self) -> &str {
        self.load.filename.as_deref().unwrap_or("member_reports.zip")
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
