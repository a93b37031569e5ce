use crate::domain::report::MemberReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// 報表來源：HTTP 端點或本地檔案
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSource {
    Http(Url),
    File(PathBuf),
}

impl ReportSource {
    /// `http`/`https` 開頭視為端點，其他一律當作檔案路徑
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => ReportSource::Http(url),
            _ => ReportSource::File(PathBuf::from(raw)),
        }
    }
}

impl fmt::Display for ReportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportSource::Http(url) => write!(f, "{}", url),
            ReportSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RawReport {
    pub source: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedReport {
    pub source: String,
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub reports: Vec<MemberReport>,
    pub json_output: String,
    pub csv_output: String,
    pub tsv_output: String,
    pub rejected: Vec<RejectedReport>,
}
