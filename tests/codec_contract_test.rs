use member_report::core::codec::{self, ReportCodec};
use member_report::{
    MemberReport, MemberReportActivity, MemberReportActivityMode, MemberReportFireteamMember,
    MemberReportStats, MemberResponse, MemberTitle, ReportError,
};
use serde_json::{json, Value};

fn full_report() -> MemberReport {
    let mut report = MemberReport::new(4611686018429000001, "Eris Morn#6666");
    report.last_played_at = 1_712_345_678;
    report.activity_attempts = 40;
    report.activity_attempts_with_clan = 25;
    report.activity_completions = 31;
    report.activity_timestamps.insert(1374392663, 1_712_345_678);
    report.activity_timestamps.insert(3458480158, 1_712_000_000);

    report.stats_pve = MemberReportStats::new()
        .with("kills", json!(90210))
        .with("deaths", json!(1234))
        .with("kd", json!(73.103));
    report.stats_pvp = MemberReportStats::new().with("kd", json!(0.97));
    report.stats_gambit = MemberReportStats::new().with("motes", json!(5000));
    report.stats_private_matches = MemberReportStats::new();
    report.stats_reckoning = MemberReportStats::new().with("clears", json!(3));

    report.top_activity_modes = ["raid", "nightfall", "dungeon"]
        .iter()
        .map(|m| MemberReportActivityMode::new().with("mode", json!(m)))
        .collect();
    report.top_activities = [1374392663_u64, 3458480158, 910380154]
        .iter()
        .map(|h| MemberReportActivity::new().with("hash", json!(h)))
        .collect();
    report.activity_map.insert(
        "1374392663".to_string(),
        MemberReportActivity::new().with("name", json!("King's Fall")),
    );
    report.activity_map.insert(
        "3458480158".to_string(),
        MemberReportActivity::new().with("name", json!("Garden of Salvation")),
    );

    report.frequent_clan_members = ["Crow", "Ikora", "Zavala"]
        .iter()
        .map(|n| MemberReportFireteamMember::new().with("display_name", json!(n)))
        .collect();
    report.frequent_non_clan_members = ["Drifter", "Shaxx"]
        .iter()
        .map(|n| MemberReportFireteamMember::new().with("display_name", json!(n)))
        .collect();
    report.total_clan_members = 3;
    report.total_non_clan_members = 2;
    report.titles = ["Kingslayer", "Enlightened", "Reckoner"]
        .iter()
        .map(|t| MemberTitle::new().with("title", json!(t)))
        .collect();
    report.member = MemberResponse::new()
        .with("membership_id", json!("4611686018429000001"))
        .with("clan", json!({"name": "Hidden", "group_id": 881267}));
    report
}

fn names<T>(items: &[T], key: &str, get: impl Fn(&T, &str) -> Option<Value>) -> Vec<Value> {
    items.iter().filter_map(|item| get(item, key)).collect()
}

#[test]
fn test_round_trip_preserves_full_report() {
    let report = full_report();
    let encoded = codec::encode(&report).unwrap();
    let decoded = codec::decode(&encoded).unwrap();
    assert_eq!(decoded, report);

    // 再編碼一次必須得到相同位元組
    assert_eq!(codec::encode(&decoded).unwrap(), encoded);
}

#[test]
fn test_every_field_is_required() {
    let encoded: Value = serde_json::from_str(&codec::encode(&full_report()).unwrap()).unwrap();

    for field in MemberReport::FIELDS {
        let mut payload = encoded.clone();
        payload.as_object_mut().unwrap().remove(field);

        let err = codec::decode(&payload.to_string()).unwrap_err();
        match err {
            ReportError::SchemaMismatch { field: reported, .. } => assert_eq!(reported, field),
            other => panic!("expected SchemaMismatch for {}, got {:?}", field, other),
        }
    }
}

#[test]
fn test_newer_version_is_rejected_without_partial_record() {
    let mut payload: Value = serde_json::from_str(&codec::encode(&full_report()).unwrap()).unwrap();
    payload["version"] = json!(MemberReport::CURRENT_VERSION + 5);

    let result = codec::decode(&payload.to_string());
    assert!(matches!(
        result,
        Err(ReportError::UnsupportedVersion { found, supported })
            if found == u64::from(MemberReport::CURRENT_VERSION + 5)
                && supported == MemberReport::CURRENT_VERSION
    ));

    // 放寬讀取上限後可以解碼
    let relaxed = ReportCodec::new(MemberReport::CURRENT_VERSION + 5);
    let report = relaxed.decode(&payload.to_string()).unwrap();
    assert_eq!(report.version, MemberReport::CURRENT_VERSION + 5);
}

#[test]
fn test_example_member_scenario() {
    let mut report = MemberReport::new(4611686018429000001, "Example");
    report.activity_attempts = 10;
    report.activity_completions = 7;
    report.activity_attempts_with_clan = 3;

    let encoded = codec::encode(&report).unwrap();
    let raw: Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(raw["top_activities"], json!([]));
    assert_eq!(raw["titles"], json!([]));

    let decoded = codec::decode(&encoded).unwrap();
    assert_eq!(decoded.membership_id, 4611686018429000001);
    assert_eq!(decoded.activity_attempts, 10);
    assert_eq!(decoded.activity_completions, 7);
    assert_eq!(decoded.activity_attempts_with_clan, 3);
    assert_eq!(decoded.top_activities, Vec::new());
    assert_eq!(decoded.titles, Vec::new());
}

#[test]
fn test_null_sequence_is_not_an_empty_sequence() {
    let mut payload: Value = serde_json::from_str(&codec::encode(&full_report()).unwrap()).unwrap();
    payload["top_activities"] = Value::Null;

    let err = codec::decode(&payload.to_string()).unwrap_err();
    assert!(matches!(err, ReportError::SchemaMismatch { ref field, .. } if field == "top_activities"));
}

#[test]
fn test_ranked_sequences_preserve_input_order() {
    let report = full_report();
    let decoded = codec::decode(&codec::encode(&report).unwrap()).unwrap();

    assert_eq!(
        names(&decoded.top_activity_modes, "mode", |m, k| m.get(k).cloned()),
        vec![json!("raid"), json!("nightfall"), json!("dungeon")]
    );
    assert_eq!(
        names(&decoded.top_activities, "hash", |a, k| a.get(k).cloned()),
        vec![json!(1374392663_u64), json!(3458480158_u64), json!(910380154_u64)]
    );
    assert_eq!(
        names(&decoded.frequent_clan_members, "display_name", |m, k| m.get(k).cloned()),
        vec![json!("Crow"), json!("Ikora"), json!("Zavala")]
    );
    assert_eq!(
        names(&decoded.frequent_non_clan_members, "display_name", |m, k| m.get(k).cloned()),
        vec![json!("Drifter"), json!("Shaxx")]
    );
    assert_eq!(
        names(&decoded.titles, "title", |t, k| t.get(k).cloned()),
        vec![json!("Kingslayer"), json!("Enlightened"), json!("Reckoner")]
    );
}

#[test]
fn test_decode_accepts_producer_key_order() {
    // 生產端的欄位順序不一定與本地宣告相同
    let report = full_report();
    let object: serde_json::Map<String, Value> =
        serde_json::from_str(&codec::encode(&report).unwrap()).unwrap();
    let mut reversed = String::from("{");
    let entries: Vec<String> = object
        .iter()
        .rev()
        .map(|(k, v)| format!("{}:{}", json!(k), v))
        .collect();
    reversed.push_str(&entries.join(","));
    reversed.push('}');

    assert_eq!(codec::decode(&reversed).unwrap(), report);
}
