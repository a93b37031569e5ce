use crate::domain::report::MemberReport;
use crate::utils::error::{ReportError, Result};
use chrono::{DateTime, SecondsFormat};
use serde::Serialize;

/// 一份報表攤平後的摘要列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub membership_id: i64,
    pub display_name_global: String,
    pub version: u32,
    pub last_played_at: String,
    pub activity_attempts: u64,
    pub activity_attempts_with_clan: u64,
    pub activity_completions: u64,
    pub completion_rate: String,
    pub total_clan_members: u64,
    pub total_non_clan_members: u64,
    pub top_activity_modes: usize,
    pub top_activities: usize,
    pub titles: usize,
}

impl SummaryRow {
    pub fn from_report(report: &MemberReport) -> Self {
        Self {
            membership_id: report.membership_id,
            display_name_global: report.display_name_global.clone(),
            version: report.version,
            last_played_at: format_timestamp(report.last_played_at),
            activity_attempts: report.activity_attempts,
            activity_attempts_with_clan: report.activity_attempts_with_clan,
            activity_completions: report.activity_completions,
            completion_rate: format!("{:.4}", report.completion_rate()),
            total_clan_members: report.total_clan_members,
            total_non_clan_members: report.total_non_clan_members,
            top_activity_modes: report.top_activity_modes.len(),
            top_activities: report.top_activities.len(),
            titles: report.titles.len(),
        }
    }
}

/// Unix 秒數轉 RFC 3339；0 或超出範圍時輸出空字串
pub fn format_timestamp(unix_seconds: u64) -> String {
    if unix_seconds == 0 {
        return String::new();
    }

    i64::try_from(unix_seconds)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// 以指定分隔符輸出含標題列的摘要
pub fn render(rows: &[SummaryRow], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(SUMMARY_HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::ProcessingError {
            message: format!("Failed to flush summary writer: {}", e),
        })?;

    String::from_utf8(bytes).map_err(|e| ReportError::ProcessingError {
        message: format!("Summary output is not valid UTF-8: {}", e),
    })
}

pub const SUMMARY_HEADERS: [&str; 13] = [
    "membership_id",
    "display_name_global",
    "version",
    "last_played_at",
    "activity_attempts",
    "activity_attempts_with_clan",
    "activity_completions",
    "completion_rate",
    "total_clan_members",
    "total_non_clan_members",
    "top_activity_modes",
    "top_activities",
    "titles",
];
