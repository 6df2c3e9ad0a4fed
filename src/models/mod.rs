//! Data models for SchemeLand entities.
//!
//! This module defines the core data structures:
//! - `Idea` - Raw or refined project concepts, the seed of a project
//! - `Analysis` - AI-scored feasibility metrics and reasoning for one idea
//! - `Project` - A committed idea plus its full roadmap
//! - `MonthlyGoal` - One roadmap period with a theme and owned weeks
//! - `WeeklyMilestone` - One sub-period of a month with owned tasks
//! - `Task` - An actionable checklist item with workflow status
//!
//! Ownership is by id-reference: a parent holds an ordered list of child ids.
//! All wire formats use camelCase field names to stay compatible with the
//! persisted document schema.

pub mod plan;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Idea status in the brainstorm-to-project lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    #[default]
    Pending,
    /// Committed to a project
    Active,
    Archived,
}

impl fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IdeaStatus::Pending => "pending",
            IdeaStatus::Active => "active",
            IdeaStatus::Archived => "archived",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for IdeaStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(IdeaStatus::Pending),
            "active" => Ok(IdeaStatus::Active),
            "archived" => Ok(IdeaStatus::Archived),
            _ => Err(format!("Unknown idea status: {}", s)),
        }
    }
}

/// A project concept tracked by SchemeLand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    /// Unique identifier (e.g., "sli-a1b2c3")
    pub id: String,

    /// Entity type marker
    #[serde(rename = "type", default = "idea_type")]
    pub entity_type: String,

    /// Idea title
    pub title: String,

    /// Detailed description
    #[serde(default)]
    pub description: String,

    /// Optional display emoji
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,

    /// Current lifecycle status
    #[serde(default)]
    pub status: IdeaStatus,

    /// Id of the latest analysis for this idea, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

fn idea_type() -> String {
    "idea".to_string()
}

impl Idea {
    /// Create a new pending idea with the given id and title.
    pub fn new(id: String, title: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            entity_type: "idea".to_string(),
            title,
            description,
            emoji: None,
            status: IdeaStatus::default(),
            analysis_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// AI-scored feasibility metrics, all integers 0-100.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetrics {
    pub feasibility: u8,
    pub market_potential: u8,
    pub excitement: u8,
    #[serde(rename = "speedToMVP")]
    pub speed_to_mvp: u8,
}

impl AnalysisMetrics {
    /// Clamp every metric into the 0-100 range.
    pub fn clamped(self) -> Self {
        Self {
            feasibility: self.feasibility.min(100),
            market_potential: self.market_potential.min(100),
            excitement: self.excitement.min(100),
            speed_to_mvp: self.speed_to_mvp.min(100),
        }
    }
}

/// Feasibility analysis for one idea. Immutable once created; re-analysis
/// creates a fresh record instead of patching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Unique identifier (e.g., "sla-a1b2c3")
    pub id: String,

    /// Entity type marker
    #[serde(rename = "type", default = "analysis_type")]
    pub entity_type: String,

    /// The analyzed idea
    pub idea_id: String,

    /// Scored metrics
    pub metrics: AnalysisMetrics,

    /// Narrative reasoning behind the scores
    pub reasoning: String,

    /// One-sentence pitch
    pub one_liner: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

fn analysis_type() -> String {
    "analysis".to_string()
}

impl Analysis {
    /// Create a new analysis record for the given idea.
    pub fn new(
        id: String,
        idea_id: String,
        metrics: AnalysisMetrics,
        reasoning: String,
        one_liner: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            entity_type: "analysis".to_string(),
            idea_id,
            metrics: metrics.clamped(),
            reasoning,
            one_liner,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The year-one vision of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyPlan {
    pub vision: String,
    /// Three key results by convention
    #[serde(default)]
    pub key_results: Vec<String>,
}

/// Vision and key results for a single year of the long-range plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearVision {
    pub vision: String,
    #[serde(default)]
    pub key_results: Vec<String>,
}

/// Optional three-year expansion of a project's yearly plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeYearVision {
    pub year1: YearVision,
    pub year2: YearVision,
    pub year3: YearVision,
    pub ultimate_goal: String,
}

/// Per-project settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    /// Compressed, denser roadmap mode
    #[serde(default)]
    pub is_hardcore_mode: bool,
}

/// A committed idea plus its full roadmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier (e.g., "slp-a1b2c3")
    pub id: String,

    /// Entity type marker
    #[serde(rename = "type", default = "project_type")]
    pub entity_type: String,

    /// The idea this project was committed from
    pub idea_id: String,

    /// The analysis the commitment was based on
    pub analysis_id: String,

    /// Year-one vision and key results
    pub yearly_plan: YearlyPlan,

    /// Ordered list of owned month ids
    #[serde(default)]
    pub month_ids: Vec<String>,

    /// Optional long-range expansion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub three_year_vision: Option<ThreeYearVision>,

    /// First day of the roadmap (local calendar date)
    pub start_date: NaiveDate,

    /// Per-project settings
    #[serde(default)]
    pub settings: ProjectSettings,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

fn project_type() -> String {
    "project".to_string()
}

impl Project {
    /// Create a new project shell. Month wiring happens in the store.
    pub fn new(
        id: String,
        idea_id: String,
        analysis_id: String,
        yearly_plan: YearlyPlan,
        start_date: NaiveDate,
        settings: ProjectSettings,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            entity_type: "project".to_string(),
            idea_id,
            analysis_id,
            yearly_plan,
            month_ids: Vec::new(),
            three_year_vision: None,
            start_date,
            settings,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// One roadmap month with a theme, goal list, and owned weeks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyGoal {
    /// Unique identifier (e.g., "slm-a1b2c3")
    pub id: String,

    /// Entity type marker
    #[serde(rename = "type", default = "month_type")]
    pub entity_type: String,

    /// 1-based sequence number within the owning project
    pub month: u32,

    /// Month theme
    pub theme: String,

    /// Ordered goal list
    #[serde(default)]
    pub goals: Vec<String>,

    /// Ordered list of owned week ids
    #[serde(default)]
    pub week_ids: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

fn month_type() -> String {
    "month".to_string()
}

impl MonthlyGoal {
    /// Create a new month with the given sequence number and theme.
    pub fn new(id: String, month: u32, theme: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            entity_type: "month".to_string(),
            month,
            theme,
            goals: Vec::new(),
            week_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// One sub-period of a month with a theme and owned tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyMilestone {
    /// Unique identifier (e.g., "slw-a1b2c3")
    pub id: String,

    /// Entity type marker
    #[serde(rename = "type", default = "week_type")]
    pub entity_type: String,

    /// 1..4 within the owning month by convention, not hard-capped
    pub week_number: u32,

    /// Week theme
    pub theme: String,

    /// Ordered list of owned task ids
    #[serde(default)]
    pub task_ids: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

fn week_type() -> String {
    "week".to_string()
}

impl WeeklyMilestone {
    /// Create a new week with the given number and theme.
    pub fn new(id: String, week_number: u32, theme: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            entity_type: "week".to_string(),
            week_number,
            theme,
            task_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Task status in the workflow. Supersedes the legacy `isCompleted` boolean;
/// legacy payloads are accepted on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" | "pending" => Ok(TaskStatus::Todo),
            "in_progress" | "in-progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "review" => Ok(TaskStatus::Review),
            "done" | "completed" => Ok(TaskStatus::Done),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

/// An actionable checklist item belonging to exactly one week.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TaskWire")]
pub struct Task {
    /// Unique identifier (e.g., "slt-a1b2c3")
    pub id: String,

    /// Entity type marker
    #[serde(rename = "type")]
    pub entity_type: String,

    /// Task text
    pub text: String,

    /// Workflow status
    pub status: TaskStatus,

    /// Optional priority (0-4, lower is higher priority)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Wire shape for `Task` deserialization, accepting both the current
/// `status` field and the legacy `isCompleted` boolean.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskWire {
    id: String,
    #[serde(rename = "type", default = "task_type")]
    entity_type: String,
    text: String,
    #[serde(default)]
    status: Option<TaskStatus>,
    #[serde(default)]
    is_completed: Option<bool>,
    #[serde(default)]
    priority: Option<u8>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn task_type() -> String {
    "task".to_string()
}

impl From<TaskWire> for Task {
    fn from(wire: TaskWire) -> Self {
        let status = wire.status.unwrap_or(if wire.is_completed == Some(true) {
            TaskStatus::Done
        } else {
            TaskStatus::Todo
        });
        Self {
            id: wire.id,
            entity_type: wire.entity_type,
            text: wire.text,
            status,
            priority: wire.priority,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

impl Task {
    /// Create a new task with the given id and text.
    pub fn new(id: String, text: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            entity_type: "task".to_string(),
            text,
            status: TaskStatus::default(),
            priority: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the task has reached the done state.
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Refresh the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
