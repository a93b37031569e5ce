pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use core::{codec::ReportCodec, etl::EtlEngine, pipeline::ReportPipeline};
pub use domain::report::{
    MemberReport, MemberReportActivity, MemberReportActivityMode, MemberReportFireteamMember,
    MemberReportStats, MemberResponse, MemberTitle,
};
pub use utils::error::{ReportError, Result};
