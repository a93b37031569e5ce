use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// 定義一個不透明的巢狀記錄型別。
///
/// 這些型別的內部欄位由上游報表服務決定，這裡只要求它們是 JSON object，
/// 並原封不動地保留所有 key/value。
macro_rules! opaque_record {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Map<String, Value>);

        impl $name {
            pub fn new() -> Self {
                Self(Map::new())
            }

            pub fn get(&self, key: &str) -> Option<&Value> {
                self.0.get(key)
            }

            pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
                self.0.insert(key.into(), value)
            }

            pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
                self.0.insert(key.into(), value);
                self
            }

            pub fn fields(&self) -> &Map<String, Value> {
                &self.0
            }

            pub fn into_fields(self) -> Map<String, Value> {
                self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<Map<String, Value>> for $name {
            fn from(fields: Map<String, Value>) -> Self {
                Self(fields)
            }
        }
    };
}

opaque_record!(
    /// Statistics for one game-mode category (PvE, PvP, Gambit, ...).
    MemberReportStats
);
opaque_record!(
    /// One tracked activity.
    MemberReportActivity
);
opaque_record!(
    /// One activity mode in the ranked mode list.
    MemberReportActivityMode
);
opaque_record!(
    /// Another player seen in the subject's fireteams.
    MemberReportFireteamMember
);
opaque_record!(
    /// A title earned by the player.
    MemberTitle
);
opaque_record!(
    /// Base profile information for the subject.
    MemberResponse
);

/// Aggregated report for a single player.
///
/// Field order here is the order of the canonical encoding. Mapping fields use
/// `BTreeMap` so that keys are unique and encode in ascending order; the ranked
/// sequences keep the order the producer gave them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberReport {
    pub version: u32,
    pub membership_id: i64,
    pub display_name_global: String,
    pub last_played_at: u64,
    pub activity_timestamps: BTreeMap<u32, u64>,
    pub activity_attempts: u64,
    pub activity_attempts_with_clan: u64,
    pub activity_completions: u64,
    pub stats_pve: MemberReportStats,
    pub stats_pvp: MemberReportStats,
    pub stats_gambit: MemberReportStats,
    pub stats_private_matches: MemberReportStats,
    pub stats_reckoning: MemberReportStats,
    pub top_activity_modes: Vec<MemberReportActivityMode>,
    pub top_activities: Vec<MemberReportActivity>,
    pub activity_map: BTreeMap<String, MemberReportActivity>,
    pub frequent_clan_members: Vec<MemberReportFireteamMember>,
    pub frequent_non_clan_members: Vec<MemberReportFireteamMember>,
    pub total_clan_members: u64,
    pub total_non_clan_members: u64,
    pub titles: Vec<MemberTitle>,
    pub member: MemberResponse,
}

impl MemberReport {
    /// 目前寫出的 schema 版本，也是預設能讀取的最高版本
    pub const CURRENT_VERSION: u32 = 1;

    /// 所有欄位名稱，依照編碼順序
    pub const FIELDS: [&'static str; 22] = [
        "version",
        "membership_id",
        "display_name_global",
        "last_played_at",
        "activity_timestamps",
        "activity_attempts",
        "activity_attempts_with_clan",
        "activity_completions",
        "stats_pve",
        "stats_pvp",
        "stats_gambit",
        "stats_private_matches",
        "stats_reckoning",
        "top_activity_modes",
        "top_activities",
        "activity_map",
        "frequent_clan_members",
        "frequent_non_clan_members",
        "total_clan_members",
        "total_non_clan_members",
        "titles",
        "member",
    ];

    /// 建立一個空的報表，其餘欄位皆為零值
    pub fn new(membership_id: i64, display_name_global: impl Into<String>) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            membership_id,
            display_name_global: display_name_global.into(),
            last_played_at: 0,
            activity_timestamps: BTreeMap::new(),
            activity_attempts: 0,
            activity_attempts_with_clan: 0,
            activity_completions: 0,
            stats_pve: MemberReportStats::new(),
            stats_pvp: MemberReportStats::new(),
            stats_gambit: MemberReportStats::new(),
            stats_private_matches: MemberReportStats::new(),
            stats_reckoning: MemberReportStats::new(),
            top_activity_modes: Vec::new(),
            top_activities: Vec::new(),
            activity_map: BTreeMap::new(),
            frequent_clan_members: Vec::new(),
            frequent_non_clan_members: Vec::new(),
            total_clan_members: 0,
            total_non_clan_members: 0,
            titles: Vec::new(),
            member: MemberResponse::new(),
        }
    }

    /// Completions over attempts, 0.0 when there are no attempts.
    pub fn completion_rate(&self) -> f64 {
        if self.activity_attempts == 0 {
            0.0
        } else {
            self.activity_completions as f64 / self.activity_attempts as f64
        }
    }

    /// Activities that have a timestamp but no entry in `activity_map`.
    ///
    /// An empty `activity_map` means the producer did not ship the lookup
    /// table, so nothing is reported in that case.
    pub fn unresolved_activity_ids(&self) -> Vec<u32> {
        if self.activity_map.is_empty() {
            return Vec::new();
        }

        self.activity_timestamps
            .keys()
            .filter(|id| !self.activity_map.contains_key(&id.to_string()))
            .copied()
            .collect()
    }

    pub fn cross_reference_warnings(&self) -> Vec<String> {
        self.unresolved_activity_ids()
            .into_iter()
            .map(|id| {
                format!(
                    "member {}: activity {} has a timestamp but is missing from activity_map",
                    self.membership_id, id
                )
            })
            .collect()
    }
}
