//! Wire shapes exchanged with the planning oracle.
//!
//! These are id-less plan blobs: the store assigns identifiers and wires
//! ownership lists when a blob is committed. Nothing in this module is ever
//! written to the persisted document directly.

use serde::{Deserialize, Serialize};

use super::{AnalysisMetrics, YearlyPlan};

/// One roadmap month as proposed by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthPlan {
    /// 1-based sequence number proposed by the oracle. The store renumbers
    /// on commit, so gaps or duplicates here are tolerated.
    pub month: u32,
    pub theme: String,
    #[serde(default)]
    pub goals: Vec<String>,
}

/// One week as proposed by the oracle, tasks as plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPlan {
    pub week_number: u32,
    pub theme: String,
    #[serde(default)]
    pub tasks: Vec<String>,
}

/// The full plan blob returned by the oracle on commit: a yearly vision,
/// the month sequence, and a detailed week list for the first month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullPlan {
    pub yearly_plan: YearlyPlan,
    pub monthly_plan: Vec<MonthPlan>,
    pub weekly_plan: Vec<WeekPlan>,
}

/// A refined or suggested idea, before it becomes an `Idea` entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaDraft {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// One scored analysis as returned by the oracle, keyed by idea id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub idea_id: String,
    pub metrics: AnalysisMetrics,
    pub reasoning: String,
    pub one_liner: String,
}

/// A named candidate week-list for the preview-then-commit flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOption {
    pub strategy_name: String,
    pub description: String,
    pub plan: Vec<WeekPlan>,
}

/// Difficulty setting for weekly plan adjustment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!("Unknown difficulty: {}", s)),
        }
    }
}
