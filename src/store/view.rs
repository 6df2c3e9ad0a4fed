//! Denormalized, read-only projections of the store.
//!
//! A `ProjectView` is a pure function of current store state: project,
//! months, weeks, and tasks nested in id-list order, with the selected idea
//! and analysis embedded. Views are derived and disposable; nothing here is
//! ever written back into the store. Ids that fail to resolve are skipped so
//! one corrupted record cannot take down the whole dashboard.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{
    Analysis, Idea, MonthlyGoal, ProjectSettings, Task, ThreeYearVision, WeeklyMilestone,
    YearlyPlan,
};

use super::Store;

/// A week with its tasks embedded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
    #[serde(flatten)]
    pub week: WeeklyMilestone,
    pub tasks: Vec<Task>,
}

/// A month with its detailed week plan embedded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthView {
    #[serde(flatten)]
    pub month: MonthlyGoal,
    pub detailed_plan: Vec<WeekView>,
}

/// A fully nested project snapshot for rendering and oracle payloads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: String,
    pub selected_idea: Idea,
    pub analysis: Analysis,
    pub yearly_plan: YearlyPlan,
    pub monthly_plan: Vec<MonthView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub three_year_vision: Option<ThreeYearVision>,
    pub start_date: NaiveDate,
    pub settings: ProjectSettings,
}

/// Progress counters derived from a view, for the dashboard summary.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProgress {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub percentage: f64,
}

impl ProjectView {
    /// Completion stats across every task in the view.
    pub fn progress(&self) -> ProjectProgress {
        let mut total = 0usize;
        let mut completed = 0usize;
        for month in &self.monthly_plan {
            for week in &month.detailed_plan {
                total += week.tasks.len();
                completed += week.tasks.iter().filter(|t| t.is_completed()).count();
            }
        }
        let percentage = if total > 0 {
            (completed as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        ProjectProgress {
            total_tasks: total,
            completed_tasks: completed,
            percentage,
        }
    }
}

impl Store {
    /// Project a fully nested snapshot for the given project id.
    ///
    /// Returns `None` only when the project itself (or its idea/analysis
    /// root references) is missing; unresolved month, week, and task ids
    /// are dropped from the view instead of failing it.
    pub fn project_view(&self, project_id: &str) -> Option<ProjectView> {
        let project = self.projects.get(project_id)?;
        let idea = self.ideas.get(&project.idea_id)?;
        let analysis = self.analyses.get(&project.analysis_id)?;

        let monthly_plan = project
            .month_ids
            .iter()
            .filter_map(|month_id| self.months.get(month_id))
            .map(|month| MonthView {
                month: month.clone(),
                detailed_plan: month
                    .week_ids
                    .iter()
                    .filter_map(|week_id| self.weeks.get(week_id))
                    .map(|week| WeekView {
                        week: week.clone(),
                        tasks: week
                            .task_ids
                            .iter()
                            .filter_map(|task_id| self.tasks.get(task_id))
                            .cloned()
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Some(ProjectView {
            id: project.id.clone(),
            selected_idea: idea.clone(),
            analysis: analysis.clone(),
            yearly_plan: project.yearly_plan.clone(),
            monthly_plan,
            three_year_vision: project.three_year_vision.clone(),
            start_date: project.start_date,
            settings: project.settings.clone(),
        })
    }
}
