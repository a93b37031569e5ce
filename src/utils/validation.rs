use crate::domain::report::MemberReport;
use crate::utils::error::{ReportError, Result};
use serde_json::Value;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub const OUTPUT_FORMATS: [&str; 3] = ["json", "csv", "tsv"];

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> ReportError {
    ReportError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(field_name, url_str, format!("Invalid URL format: {}", e))),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

/// 來源可以是 http(s) 端點或檔案路徑
pub fn validate_source(field_name: &str, source: &str) -> Result<()> {
    if source.starts_with("http://") || source.starts_with("https://") {
        validate_url(field_name, source)
    } else {
        validate_path(field_name, source)
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    if formats.is_empty() {
        return Err(invalid(field_name, "", "At least one output format is required"));
    }

    for format in formats {
        if !OUTPUT_FORMATS.contains(&format.as_str()) {
            return Err(invalid(
                field_name,
                format,
                format!(
                    "Unsupported format. Valid formats: {}",
                    OUTPUT_FORMATS.join(", ")
                ),
            ));
        }
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ReportError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// 讀取 member 內的 membership_id，可能是數字也可能是字串
fn member_subject_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

impl Validate for MemberReport {
    fn validate(&self) -> Result<()> {
        if self.activity_attempts_with_clan > self.activity_attempts {
            return Err(ReportError::ValidationError {
                message: format!(
                    "member {}: activity_attempts_with_clan ({}) exceeds activity_attempts ({})",
                    self.membership_id, self.activity_attempts_with_clan, self.activity_attempts
                ),
            });
        }

        if self.activity_completions > self.activity_attempts {
            return Err(ReportError::ValidationError {
                message: format!(
                    "member {}: activity_completions ({}) exceeds activity_attempts ({})",
                    self.membership_id, self.activity_completions, self.activity_attempts
                ),
            });
        }

        if let Some(raw) = self.member.get("membership_id") {
            match member_subject_id(raw) {
                Some(id) if id == self.membership_id => {}
                Some(id) => {
                    return Err(ReportError::ValidationError {
                        message: format!(
                            "member {}: nested member record describes membership {}",
                            self.membership_id, id
                        ),
                    })
                }
                None => {
                    return Err(ReportError::ValidationError {
                        message: format!(
                            "member {}: nested member.membership_id is not an integer: {}",
                            self.membership_id, raw
                        ),
                    })
                }
            }
        }

        Ok(())
    }
}
