pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::report::MemberReport;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "member-report")]
#[command(about = "Fetch, check and bundle Member Reports")]
pub struct CliConfig {
    /// Report endpoints (http/https) or local JSON files
    #[arg(long = "source", value_delimiter = ',', required = true)]
    pub sources: Vec<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long = "format", value_delimiter = ',', default_values = ["json", "csv", "tsv"])]
    pub output_formats: Vec<String>,

    #[arg(long, default_value = "5")]
    pub concurrent_requests: usize,

    /// Highest report schema version to accept
    #[arg(long = "max-version", default_value_t = MemberReport::CURRENT_VERSION)]
    pub max_supported_version: u32,

    #[arg(long, help = "Abort on the first report that fails to decode or validate")]
    pub strict: bool,

    #[arg(long, help = "Log how long each phase took")]
    pub timing: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn report_sources(&self) -> &[String] {
        &self.sources
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn max_supported_version(&self) -> u32 {
        self.max_supported_version
    }

    fn strict(&self) -> bool {
        self.strict
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        for source in &self.sources {
            validation::validate_source("source", source)?;
        }
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("format", &self.output_formats)?;
        validation::validate_range("concurrent_requests", self.concurrent_requests, 1, 64)?;
        // 可以調高以接受已知相容的新版本，但不能為 0
        validation::validate_positive_number("max_version", self.max_supported_version as usize, 1)?;
        Ok(())
    }
}
