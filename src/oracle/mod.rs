//! The planning oracle: the external AI collaborator behind analysis,
//! plan generation, and idea refinement.
//!
//! The trait is synchronous and blocking, matching the rest of the CLI's
//! I/O; implementations wrap whatever transport they need. Every call can
//! fail, and callers must surface the failure without touching the store:
//! oracle results are only applied after a call returns successfully.

pub mod scripted;

pub use scripted::ScriptedOracle;

use crate::models::plan::{
    AnalysisResult, Difficulty, FullPlan, IdeaDraft, MonthPlan, StrategyOption, WeekPlan,
};
use crate::models::{Idea, MonthlyGoal, ThreeYearVision, YearlyPlan};
use crate::Result;

/// Contract for the external planning service.
pub trait PlanningOracle {
    /// Score the given ideas: one result per input idea id.
    fn analyze(&self, ideas: &[Idea]) -> Result<Vec<AnalysisResult>>;

    /// Generate the full roadmap blob for a committed idea.
    fn generate_full_plan(&self, idea: &Idea, analysis_reasoning: &str) -> Result<FullPlan>;

    /// Turn raw brainstorm text into a titled idea draft.
    fn refine_idea(&self, raw_text: &str) -> Result<IdeaDraft>;

    /// Propose fresh idea drafts.
    fn suggest_ideas(&self) -> Result<Vec<IdeaDraft>>;

    /// Re-plan the current month's weeks at the given difficulty.
    fn adjust_weekly_plan(
        &self,
        idea: &Idea,
        month_theme: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<WeekPlan>>;

    /// Expand the yearly vision into a three-year plan.
    fn expand_to_three_years(
        &self,
        idea: &Idea,
        current_vision: &YearlyPlan,
    ) -> Result<ThreeYearVision>;

    /// Refine a drafted three-year vision.
    fn refine_three_year_vision(
        &self,
        idea: &Idea,
        draft: &ThreeYearVision,
    ) -> Result<ThreeYearVision>;

    /// Offer named strategy options for one month, each a full week-list.
    fn generate_month_plan_options(
        &self,
        idea: &Idea,
        month_goal: &MonthlyGoal,
    ) -> Result<Vec<StrategyOption>>;

    /// Continue the roadmap after the given last month number.
    fn extend_roadmap(&self, idea: &Idea, last_month: u32) -> Result<Vec<MonthPlan>>;

    /// Re-plan the whole roadmap into exactly `target_months` months.
    fn compress_roadmap(
        &self,
        idea: &Idea,
        current_plan: &[MonthPlan],
        target_months: u32,
    ) -> Result<Vec<MonthPlan>>;
}
