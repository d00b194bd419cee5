use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Strength,
    Intelligence,
    Charisma,
    Wisdom,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Strength,
        Category::Intelligence,
        Category::Charisma,
        Category::Wisdom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Strength => "strength",
            Category::Intelligence => "intelligence",
            Category::Charisma => "charisma",
            Category::Wisdom => "wisdom",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown category '{}', expected strength, intelligence, charisma or wisdom",
            self.0
        )
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| UnknownCategory(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub level: u32,
    pub xp: u32,
}

impl Default for Stat {
    fn default() -> Self {
        Self { level: 1, xp: 0 }
    }
}

/// The four-stat aggregate, persisted as one document per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatSheet {
    #[serde(default)]
    pub strength: Stat,
    #[serde(default)]
    pub intelligence: Stat,
    #[serde(default)]
    pub charisma: Stat,
    #[serde(default)]
    pub wisdom: Stat,
}

impl StatSheet {
    pub fn get(&self, category: Category) -> &Stat {
        match category {
            Category::Strength => &self.strength,
            Category::Intelligence => &self.intelligence,
            Category::Charisma => &self.charisma,
            Category::Wisdom => &self.wisdom,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Stat {
        match category {
            Category::Strength => &mut self.strength,
            Category::Intelligence => &mut self.intelligence,
            Category::Charisma => &mut self.charisma,
            Category::Wisdom => &mut self.wisdom,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &Stat)> {
        Category::ALL.into_iter().map(move |category| (category, self.get(category)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub category: Category,
    pub xp: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default)]
    pub id: String,
    pub content: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Win {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    pub date: DateTime<Utc>,
}

/// Per-day XP breakdown derived from the task log. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyXpRecord {
    pub date: NaiveDate,
    pub strength: u32,
    pub intelligence: u32,
    pub charisma: u32,
    pub wisdom: u32,
}

impl DailyXpRecord {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            strength: 0,
            intelligence: 0,
            charisma: 0,
            wisdom: 0,
        }
    }

    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Strength => self.strength,
            Category::Intelligence => self.intelligence,
            Category::Charisma => self.charisma,
            Category::Wisdom => self.wisdom,
        }
    }

    pub fn bucket_mut(&mut self, category: Category) -> &mut u32 {
        match category {
            Category::Strength => &mut self.strength,
            Category::Intelligence => &mut self.intelligence,
            Category::Charisma => &mut self.charisma,
            Category::Wisdom => &mut self.wisdom,
        }
    }

    pub fn total(&self) -> u32 {
        Category::ALL
            .into_iter()
            .fold(0u32, |sum, category| sum.saturating_add(self.get(category)))
    }
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub xp: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CompleteTaskResponse {
    pub task: Task,
    pub stats: StatSheet,
}

#[derive(Debug, Deserialize)]
pub struct CreateJournalRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateWinRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    #[serde(default)]
    pub page: i64,
}

#[derive(Debug, Serialize)]
pub struct DailyRow {
    pub day: usize,
    pub date: String,
    pub strength: u32,
    pub intelligence: u32,
    pub charisma: u32,
    pub wisdom: u32,
    pub total: u32,
}

#[derive(Debug, Serialize)]
pub struct ProgressPage {
    pub page: usize,
    pub total_pages: usize,
    pub total_days: usize,
    pub first_day: usize,
    pub last_day: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub rows: Vec<DailyRow>,
}

/// Payload consumed by the chart widget; replaces the previous chart wholesale.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub series: BTreeMap<Category, Vec<u32>>,
}

#[derive(Debug, Deserialize)]
pub struct TimerSettingsRequest {
    pub work_minutes: Option<u32>,
    pub break_minutes: Option<u32>,
}
