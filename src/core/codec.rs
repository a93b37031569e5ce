//! Member Report JSON codec.
//!
//! Encoding is canonical: every field is written, in declaration order, and
//! mapping keys come out sorted. Decoding checks `version` before anything
//! else and then walks the remaining fields one by one, so a failure always
//! names the field that broke the contract.

use crate::domain::report::MemberReport;
use crate::utils::error::{ReportError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportCodec {
    max_supported_version: u32,
}

impl Default for ReportCodec {
    fn default() -> Self {
        Self::new(MemberReport::CURRENT_VERSION)
    }
}

impl ReportCodec {
    pub fn new(max_supported_version: u32) -> Self {
        Self {
            max_supported_version,
        }
    }

    pub fn max_supported_version(&self) -> u32 {
        self.max_supported_version
    }

    pub fn encode(&self, report: &MemberReport) -> Result<String> {
        Ok(serde_json::to_string(report)?)
    }

    pub fn encode_pretty(&self, report: &MemberReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    pub fn encode_to_vec(&self, report: &MemberReport) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(report)?)
    }

    pub fn decode(&self, payload: &str) -> Result<MemberReport> {
        let value: Value = serde_json::from_str(payload).map_err(ReportError::MalformedPayload)?;
        self.decode_value(value)
    }

    pub fn decode_slice(&self, payload: &[u8]) -> Result<MemberReport> {
        let value: Value =
            serde_json::from_slice(payload).map_err(ReportError::MalformedPayload)?;
        self.decode_value(value)
    }

    pub fn decode_value(&self, value: Value) -> Result<MemberReport> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(ReportError::schema_mismatch(
                    "$",
                    format!("expected a JSON object, found {}", json_type(&other)),
                ))
            }
        };

        // 版本必須最先檢查，不支援的版本不解析任何其他欄位
        let version = self.check_version(&fields)?;
        fields.remove("version");

        let report = MemberReport {
            version,
            membership_id: take(&mut fields, "membership_id")?,
            display_name_global: take(&mut fields, "display_name_global")?,
            last_played_at: take(&mut fields, "last_played_at")?,
            activity_timestamps: take(&mut fields, "activity_timestamps")?,
            activity_attempts: take(&mut fields, "activity_attempts")?,
            activity_attempts_with_clan: take(&mut fields, "activity_attempts_with_clan")?,
            activity_completions: take(&mut fields, "activity_completions")?,
            stats_pve: take(&mut fields, "stats_pve")?,
            stats_pvp: take(&mut fields, "stats_pvp")?,
            stats_gambit: take(&mut fields, "stats_gambit")?,
            stats_private_matches: take(&mut fields, "stats_private_matches")?,
            stats_reckoning: take(&mut fields, "stats_reckoning")?,
            top_activity_modes: take(&mut fields, "top_activity_modes")?,
            top_activities: take(&mut fields, "top_activities")?,
            activity_map: take(&mut fields, "activity_map")?,
            frequent_clan_members: take(&mut fields, "frequent_clan_members")?,
            frequent_non_clan_members: take(&mut fields, "frequent_non_clan_members")?,
            total_clan_members: take(&mut fields, "total_clan_members")?,
            total_non_clan_members: take(&mut fields, "total_non_clan_members")?,
            titles: take(&mut fields, "titles")?,
            member: take(&mut fields, "member")?,
        };

        if !fields.is_empty() {
            tracing::debug!(
                "Ignoring {} unknown field(s) in report for member {}: {}",
                fields.len(),
                report.membership_id,
                fields.keys().cloned().collect::<Vec<_>>().join(", ")
            );
        }

        Ok(report)
    }

    fn check_version(&self, fields: &Map<String, Value>) -> Result<u32> {
        let value = fields
            .get("version")
            .ok_or_else(|| ReportError::schema_mismatch("version", "missing field"))?;

        let found = value.as_u64().ok_or_else(|| {
            ReportError::schema_mismatch(
                "version",
                format!("expected an unsigned integer, found {}", json_type(value)),
            )
        })?;

        if found > u64::from(self.max_supported_version) {
            return Err(ReportError::UnsupportedVersion {
                found,
                supported: self.max_supported_version,
            });
        }

        // found <= max_supported_version，必定落在 u32 範圍內
        Ok(found as u32)
    }
}

fn take<T: DeserializeOwned>(fields: &mut Map<String, Value>, name: &str) -> Result<T> {
    let value = fields
        .remove(name)
        .ok_or_else(|| ReportError::schema_mismatch(name, "missing field"))?;

    serde_json::from_value(value).map_err(|e| ReportError::schema_mismatch(name, e.to_string()))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Encode with the default codec.
pub fn encode(report: &MemberReport) -> Result<String> {
    ReportCodec::default().encode(report)
}

/// Decode with the default codec.
pub fn decode(payload: &str) -> Result<MemberReport> {
    ReportCodec::default().decode(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::{
        MemberReportActivity, MemberReportActivityMode, MemberReportFireteamMember,
        MemberReportStats, MemberResponse, MemberTitle,
    };
    use serde_json::json;

    fn sample_report() -> MemberReport {
        let mut report = MemberReport::new(4611686018429000001, "Saint-14#1234");
        report.last_played_at = 1_700_000_000;
        report.activity_attempts = 10;
        report.activity_attempts_with_clan = 3;
        report.activity_completions = 7;
        report.activity_timestamps.insert(2381413764, 1_699_999_000);
        report.activity_timestamps.insert(910380154, 1_700_000_000);
        report.stats_pve = MemberReportStats::new()
            .with("kills", json!(5120))
            .with("efficiency", json!(0.8712345678901234));
        report.stats_pvp = MemberReportStats::new().with("kd", json!(1.1));
        report.top_activity_modes = vec![
            MemberReportActivityMode::new().with("mode", json!("raid")),
            MemberReportActivityMode::new().with("mode", json!("dungeon")),
        ];
        report.top_activities = vec![
            MemberReportActivity::new().with("hash", json!(910380154)),
            MemberReportActivity::new().with("hash", json!(2381413764_u64)),
        ];
        report.activity_map.insert(
            "910380154".to_string(),
            MemberReportActivity::new().with("name", json!("Deep Stone Crypt")),
        );
        report.frequent_clan_members = vec![
            MemberReportFireteamMember::new().with("display_name", json!("Osiris")),
            MemberReportFireteamMember::new().with("display_name", json!("Ikora")),
        ];
        report.total_clan_members = 2;
        report.titles = vec![
            MemberTitle::new().with("title", json!("Rivensbane")),
            MemberTitle::new().with("title", json!("Dredgen")),
        ];
        report.member = MemberResponse::new()
            .with("membership_id", json!(4611686018429000001_i64))
            .with("platform", json!(3));
        report
    }

    fn encoded_object(report: &MemberReport) -> Map<String, Value> {
        match serde_json::from_str(&encode(report).unwrap()).unwrap() {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_round_trip() {
        let report = sample_report();
        let decoded = decode(&encode(&report).unwrap()).unwrap();
        assert_eq!(decoded, report);

        let codec = ReportCodec::default();
        let decoded = codec
            .decode_slice(&codec.encode_to_vec(&report).unwrap())
            .unwrap();
        assert_eq!(decoded, report);

        let decoded = codec.decode(&codec.encode_pretty(&report).unwrap()).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = sample_report();
        let b = sample_report();
        assert_eq!(encode(&a).unwrap(), encode(&b).unwrap());
    }

    #[test]
    fn test_zero_and_empty_fields_are_written_explicitly() {
        let encoded = encode(&MemberReport::new(1, "")).unwrap();
        for field in MemberReport::FIELDS {
            assert!(encoded.contains(&format!("\"{}\":", field)), "{}", field);
        }
        assert!(encoded.contains("\"titles\":[]"));
        assert!(encoded.contains("\"top_activities\":[]"));
        assert!(encoded.contains("\"activity_attempts\":0"));
        assert!(!encoded.contains("null"));
    }

    #[test]
    fn test_missing_any_field_is_schema_mismatch() {
        let report = sample_report();
        for field in MemberReport::FIELDS {
            let mut object = encoded_object(&report);
            object.remove(field);

            match ReportCodec::default().decode_value(Value::Object(object)) {
                Err(ReportError::SchemaMismatch { field: f, .. }) => assert_eq!(f, field),
                other => panic!("removing {} gave {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_wrong_type_is_schema_mismatch() {
        let cases = [
            ("membership_id", json!("4611686018429000001")),
            ("display_name_global", json!(12)),
            ("activity_attempts", json!(-1)),
            ("titles", Value::Null),
            ("top_activities", json!({})),
            ("stats_pve", json!([])),
            ("member", json!("someone")),
            ("activity_timestamps", json!({"not-a-number": 1})),
        ];

        for (field, bad) in cases {
            let mut object = encoded_object(&sample_report());
            object.insert(field.to_string(), bad);

            match ReportCodec::default().decode_value(Value::Object(object)) {
                Err(ReportError::SchemaMismatch { field: f, .. }) => assert_eq!(f, field),
                other => panic!("bad {} gave {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_version_gate() {
        let mut object = encoded_object(&sample_report());
        object.insert("version".to_string(), json!(MemberReport::CURRENT_VERSION + 1));
        // 其他欄位就算壞掉也不該被檢查
        object.remove("titles");

        let err = ReportCodec::default()
            .decode_value(Value::Object(object.clone()))
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::UnsupportedVersion { found: 2, supported: 1 }
        ));

        object.insert("titles".to_string(), json!([]));
        let report = ReportCodec::new(2).decode_value(Value::Object(object)).unwrap();
        assert_eq!(report.version, 2);
    }

    #[test]
    fn test_version_must_be_unsigned_integer() {
        let mut object = encoded_object(&sample_report());
        object.insert("version".to_string(), json!("1"));
        let err = ReportCodec::default()
            .decode_value(Value::Object(object))
            .unwrap_err();
        assert!(matches!(err, ReportError::SchemaMismatch { ref field, .. } if field == "version"));

        let err = ReportCodec::default()
            .decode_value(json!({"version": 1.5}))
            .unwrap_err();
        assert!(matches!(err, ReportError::SchemaMismatch { ref field, .. } if field == "version"));
    }

    #[test]
    fn test_huge_version_is_unsupported_not_truncated() {
        let err = ReportCodec::default()
            .decode_value(json!({"version": u64::MAX}))
            .unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedVersion { found, .. } if found == u64::MAX));
    }

    #[test]
    fn test_non_object_and_malformed_payloads() {
        let err = decode("[1,2,3]").unwrap_err();
        assert!(matches!(err, ReportError::SchemaMismatch { ref field, .. } if field == "$"));

        let err = decode("{\"version\": 1,").unwrap_err();
        assert!(matches!(err, ReportError::MalformedPayload(_)));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let mut object = encoded_object(&sample_report());
        object.insert("added_in_a_later_minor".to_string(), json!(true));
        let report = ReportCodec::default()
            .decode_value(Value::Object(object))
            .unwrap();
        assert_eq!(report, sample_report());
    }

    #[test]
    fn test_example_scenario() {
        let mut report = MemberReport::new(4611686018429000001, "Example#0001");
        report.activity_attempts = 10;
        report.activity_completions = 7;
        report.activity_attempts_with_clan = 3;

        let encoded = encode(&report).unwrap();
        assert!(encoded.contains("\"membership_id\":4611686018429000001"));

        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.membership_id, 4611686018429000001);
        assert_eq!(decoded.activity_attempts, 10);
        assert_eq!(decoded.activity_completions, 7);
        assert_eq!(decoded.activity_attempts_with_clan, 3);
        assert!(decoded.top_activities.is_empty());
        assert!(decoded.titles.is_empty());
    }

    #[test]
    fn test_ranked_sequences_keep_order() {
        let report = sample_report();
        let decoded = decode(&encode(&report).unwrap()).unwrap();

        assert_eq!(
            decoded.top_activity_modes[0].get("mode"),
            Some(&json!("raid"))
        );
        assert_eq!(
            decoded.top_activities[1].get("hash"),
            Some(&json!(2381413764_u64))
        );
        assert_eq!(
            decoded.frequent_clan_members[0].get("display_name"),
            Some(&json!("Osiris"))
        );
        assert_eq!(decoded.titles[0].get("title"), Some(&json!("Rivensbane")));
        assert_eq!(decoded.titles[1].get("title"), Some(&json!("Dredgen")));
    }

    #[test]
    fn test_activity_timestamp_keys_are_strings_on_the_wire() {
        let object = encoded_object(&sample_report());
        let timestamps = object["activity_timestamps"].as_object().unwrap();
        assert_eq!(timestamps["910380154"], json!(1_700_000_000));
        assert_eq!(timestamps["2381413764"], json!(1_699_999_000));

        // 依數值排序輸出，不是字串排序
        let encoded = encode(&sample_report()).unwrap();
        let small = encoded.find("\"910380154\":1700000000").unwrap();
        let large = encoded.find("\"2381413764\":1699999000").unwrap();
        assert!(small < large);
    }
}
