use crate::optimistic::Keyed;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

pub(crate) type HabitId = i64;

/// Backend ids are integers, optimistic local rows use `tmp-*` strings.
/// Accept both and keep them as strings on the client.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum HabitCategory {
    General,
    Health,
    Work,
    Learning,
    Productivity,
    Fitness,
    Mindfulness,
    Social,
    #[default]
    #[serde(other)]
    Other,
}

impl HabitCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Health => "Health",
            Self::Work => "Work",
            Self::Learning => "Learning",
            Self::Productivity => "Productivity",
            Self::Fitness => "Fitness",
            Self::Mindfulness => "Mindfulness",
            Self::Social => "Social",
            Self::Other => "Other",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::General => "🌱",
            Self::Health => "🏥",
            Self::Work => "💼",
            Self::Learning => "📚",
            Self::Productivity => "⚡",
            Self::Fitness => "💪",
            Self::Mindfulness => "🧘",
            Self::Social => "👥",
            Self::Other => "📋",
        }
    }
}

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    #[serde(other)]
    Custom,
}

impl Frequency {
    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Custom => "Custom",
        }
    }
}

pub(crate) const DEFAULT_HABIT_COLOR: &str = "#3B82F6";

fn default_color() -> String {
    DEFAULT_HABIT_COLOR.to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Habit {
    pub id: HabitId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: HabitCategory,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default = "default_color")]
    pub color_code: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub is_micro_habit: bool,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub completed_today: bool,
    #[serde(default)]
    pub completion_rate: f64,
}

/// Create/edit form payload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct HabitDraft {
    pub title: String,
    pub description: String,
    pub category: HabitCategory,
    pub frequency: Frequency,
    pub color_code: String,
    pub icon: String,
    pub is_micro_habit: bool,
}

impl Default for HabitDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: HabitCategory::Other,
            frequency: Frequency::Daily,
            color_code: default_color(),
            icon: String::new(),
            is_micro_habit: false,
        }
    }
}

impl From<&Habit> for HabitDraft {
    fn from(h: &Habit) -> Self {
        Self {
            title: h.title.clone(),
            description: h.description.clone(),
            category: h.category,
            frequency: h.frequency,
            color_code: h.color_code.clone(),
            icon: h.icon.clone(),
            is_micro_habit: h.is_micro_habit,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct CompletionResult {
    #[serde(default)]
    pub message: String,
    pub current_streak: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct Statistics {
    #[serde(default)]
    pub total_habits: u32,
    #[serde(default)]
    pub active_habits: u32,
    #[serde(default)]
    pub total_completions: u32,
    #[serde(default)]
    pub average_streak: f64,
    #[serde(default)]
    pub completion_rate: f64,
    #[serde(default)]
    pub this_week_completions: u32,
    #[serde(default)]
    pub this_month_completions: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct AnalyticsPoint {
    pub date: String,
    #[serde(default)]
    pub completions: u32,
    #[serde(default)]
    pub day_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct AnalyticsSeries {
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub data: Vec<AnalyticsPoint>,
}

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum FeedItemKind {
    Completion,
    Badge,
    Challenge,
    #[default]
    #[serde(other)]
    Generic,
}

impl FeedItemKind {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Completion => "✅",
            Self::Badge => "🏅",
            Self::Challenge => "🏁",
            Self::Generic => "📢",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Completion => "Habit Completed",
            Self::Badge => "Badge Earned",
            Self::Challenge => "Challenge Update",
            Self::Generic => "Activity",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Comment {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub user_name: String,
    pub text: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Reaction {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default = "default_emoji")]
    pub emoji: String,
}

pub(crate) const LIKE_EMOJI: &str = "👍";

fn default_emoji() -> String {
    LIKE_EMOJI.to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct FeedItem {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: FeedItemKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Challenge {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub goal: u32,
    #[serde(default)]
    pub participants_count: u32,
    #[serde(default)]
    pub joined: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct ChallengeDraft {
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub goal: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Client-side flag for search results.
    #[serde(default, skip_serializing)]
    pub followed: bool,
}

impl User {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct Profile {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub total_completions: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub total_points: u32,
    #[serde(default)]
    pub level: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub bio: String,
    pub identity: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Badge {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub points: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct UserBadge {
    pub badge: Badge,
    #[serde(default)]
    pub awarded_at: String,
}

impl Keyed for Habit {
    type Key = HabitId;

    fn key(&self) -> HabitId {
        self.id
    }
}

impl Keyed for FeedItem {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Challenge {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for User {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_habit_contract_deserialize_with_defaults() {
        let json = r#"{
            "id": 7,
            "title": "Read",
            "category": "learning",
            "frequency": "weekly",
            "current_streak": 3
        }"#;
        let h: Habit = serde_json::from_str(json).expect("habit should parse");
        assert_eq!(h.id, 7);
        assert_eq!(h.category, HabitCategory::Learning);
        assert_eq!(h.frequency, Frequency::Weekly);
        assert_eq!(h.color_code, DEFAULT_HABIT_COLOR);
        assert!(!h.completed_today);
    }

    #[test]
    fn test_unknown_category_falls_back_to_other() {
        let h: Habit =
            serde_json::from_str(r#"{"id": 1, "title": "x", "category": "gardening"}"#).unwrap();
        assert_eq!(h.category, HabitCategory::Other);
    }

    #[test]
    fn test_category_strum_roundtrip_matches_wire_names() {
        assert_eq!(HabitCategory::Mindfulness.as_ref(), "mindfulness");
        assert_eq!(
            HabitCategory::from_str("health").ok(),
            Some(HabitCategory::Health)
        );
        assert!(HabitCategory::from_str("HEALTH!").is_err());
    }

    #[test]
    fn test_feed_item_type_field_and_mixed_ids() {
        let json = r#"{
            "id": 3,
            "type": "badge",
            "message": "Earned Early Bird",
            "created_at": "2024-05-01T10:00:00Z",
            "comments": [{"id": 12, "user_name": "sam", "text": "nice"}],
            "reactions": [{"id": "tmp-1"}]
        }"#;
        let item: FeedItem = serde_json::from_str(json).expect("feed item should parse");
        assert_eq!(item.kind, FeedItemKind::Badge);
        assert_eq!(item.comments[0].id, "12");
        assert_eq!(item.reactions[0].id, "tmp-1");
        assert_eq!(item.reactions[0].emoji, LIKE_EMOJI);
    }

    #[test]
    fn test_unknown_feed_type_is_generic() {
        let item: FeedItem =
            serde_json::from_str(r#"{"id": 1, "type": "streak"}"#).expect("should parse");
        assert_eq!(item.kind, FeedItemKind::Generic);
        assert_eq!(item.kind.label(), "Activity");
    }

    #[test]
    fn test_user_display_name_falls_back_to_username() {
        let mut u = User {
            id: 1,
            username: "ana".to_string(),
            ..Default::default()
        };
        assert_eq!(u.display_name(), "ana");
        u.first_name = "Ana".to_string();
        assert_eq!(u.display_name(), "Ana");
    }

    #[test]
    fn test_draft_from_habit_keeps_editable_fields() {
        let h: Habit = serde_json::from_str(
            r##"{"id": 2, "title": "Walk", "color_code": "#10B981", "is_micro_habit": true}"##,
        )
        .unwrap();
        let d = HabitDraft::from(&h);
        assert_eq!(d.title, "Walk");
        assert_eq!(d.color_code, "#10B981");
        assert!(d.is_micro_habit);
    }
}
