use crate::quiz::{Genre, GenreScore};
use crate::rerank::{ScoredMovie, Weights};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub fn token(self) -> &'static str {
        match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }

    /// Two-letter code used by `BYDAY` in recurrence rules.
    pub fn rrule_code(self) -> &'static str {
        match self {
            Self::Mon => "MO",
            Self::Tue => "TU",
            Self::Wed => "WE",
            Self::Thu => "TH",
            Self::Fri => "FR",
            Self::Sat => "SA",
            Self::Sun => "SU",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        WEEKDAYS.into_iter().find(|day| day.token() == token)
    }

    pub fn from_chrono(day: chrono::Weekday) -> Self {
        WEEKDAYS[day.num_days_from_monday() as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Mid,
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "mid" => Some(Self::Mid),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub days: Vec<Weekday>,
    pub time: String,
    pub frequency_per_week: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub name: String,
    pub why: String,
    pub schedule: Schedule,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub title: String,
    pub time: String,
    pub rrule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRule {
    #[serde(rename = "if")]
    pub condition: String,
    #[serde(rename = "then")]
    pub action: String,
}

/// A coaching plan as produced by the generative endpoint, after
/// normalization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Plan {
    pub summary: String,
    pub pain_points: Vec<String>,
    pub solutions: Vec<String>,
    pub new_habits: Vec<Habit>,
    pub reminders: Vec<Reminder>,
    pub next_adjustment_rules: Vec<AdjustmentRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    Generated,
    Adjusted,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanHistoryEntry {
    pub created_at: String,
    pub kind: PlanKind,
    pub plan: Plan,
}

/// Survey answers collected before a plan is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub domain: String,
    pub habit_to_improve: String,
    #[serde(default)]
    pub difficulty_pref: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub available_time_windows: Vec<String>,
    #[serde(default)]
    pub sleep_time: String,
    #[serde(default)]
    pub wake_time: String,
    #[serde(default = "mid_scale")]
    pub stress_level: u8,
    #[serde(default)]
    pub schedule_consistency: String,
    #[serde(default = "mid_scale")]
    pub energy_level: u8,
    #[serde(default = "mid_scale")]
    pub commitment: u8,
    #[serde(default)]
    pub obstacles: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

fn mid_scale() -> u8 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInItem {
    pub name: String,
    pub done: bool,
    #[serde(default)]
    pub note: String,
}

/// One day's completion record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub date: String,
    #[serde(default)]
    pub mood: Option<u8>,
    pub items: Vec<CheckInItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Completion {
    pub done: usize,
    pub total: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowDay {
    pub date: String,
    pub done: usize,
    pub total: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardHabit {
    pub name: String,
    pub fail_rate: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum PatternTag {
    NoRecentCheckins,
    LowerDifficulty,
    FineTune,
    MaintainOrRaise,
    LowDays { count: usize },
    FrequentMisses { habits: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInSummary {
    pub days: u32,
    pub count: usize,
    pub avg_completion_rate: f64,
    pub low_days: Vec<LowDay>,
    pub hard_habits: Vec<HardHabit>,
    pub patterns: Vec<PatternTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry {
    pub date: String,
    pub dow: Weekday,
    pub time: String,
    pub title: String,
}

// ---------------------------------------------------------------------------
// API payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdjustRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Overrides the locally derived adjustment note.
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan: Option<Plan>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    #[serde(default)]
    pub mood: Option<u8>,
    pub items: Vec<CheckInItem>,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub checkin: CheckIn,
    pub completion: Completion,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: CheckInSummary,
    pub adjustment_note: String,
}

#[derive(Debug, Serialize)]
pub struct Degraded<T> {
    pub data: Option<T>,
    pub warning: Option<String>,
}

impl<T> Degraded<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            warning: None,
        }
    }

    pub fn warn(warning: impl Into<String>) -> Self {
        Self {
            data: None,
            warning: Some(warning.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExcludeRequest {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub answers: Vec<Genre>,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct Recommendations {
    pub scores: Vec<GenreScore>,
    pub genres: Vec<Genre>,
    pub movies: Vec<ScoredMovie>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: String,
}

/// Loosely-typed JSON payload as received from a generative endpoint.
pub type RawObject = serde_json::Map<String, Value>;
