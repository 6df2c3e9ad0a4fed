//! Normalized entity store for SchemeLand data.
//!
//! The store holds six dictionaries (ideas, analyses, projects, months,
//! weeks, tasks) keyed by generated ids, plus a small scalar `meta` block.
//! Parents own children by ordered id-lists; every mutation goes through a
//! named operation here so the referential invariants are enforced at a
//! single choke point:
//!
//! - every id in a parent's list resolves to an entity in the matching
//!   dictionary
//! - month numbers are unique and increasing within a project
//! - week numbers are unique within a month
//! - a task belongs to exactly one week; moves are atomic
//! - `updated_at` is refreshed by every mutating operation
//! - deleting a project cascades through months, weeks, and tasks

pub mod repair;
pub mod view;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::plan::{AnalysisResult, FullPlan, MonthPlan, WeekPlan};
use crate::models::{
    Analysis, Idea, IdeaStatus, MonthlyGoal, Project, ProjectSettings, Task, TaskStatus,
    ThreeYearVision, WeeklyMilestone,
};
use crate::persist::Slot;
use crate::{Error, Result};

/// Id prefixes per entity kind.
pub const IDEA_PREFIX: &str = "sli";
pub const ANALYSIS_PREFIX: &str = "sla";
pub const PROJECT_PREFIX: &str = "slp";
pub const MONTH_PREFIX: &str = "slm";
pub const WEEK_PREFIX: &str = "slw";
pub const TASK_PREFIX: &str = "slt";

/// Placeholder theme for lazily initialized weeks.
const PLACEHOLDER_WEEK_THEME: &str = "To be planned";

/// Focus timer state, persisted as a meta scalar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusTimer {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub accumulated_secs: u64,
}

/// Small scalar state persisted alongside the entity dictionaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_timer: Option<FocusTimer>,
}

/// Entity counts, used by `system info` and the doctor summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub ideas: usize,
    pub analyses: usize,
    pub projects: usize,
    pub months: usize,
    pub weeks: usize,
    pub tasks: usize,
}

/// Fields accepted by `add_idea`.
#[derive(Debug, Clone, Default)]
pub struct NewIdea {
    pub title: String,
    pub description: String,
    pub emoji: Option<String>,
}

/// Patch accepted by `update_idea`; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct IdeaPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub emoji: Option<String>,
    pub status: Option<IdeaStatus>,
}

/// The in-memory normalized store.
///
/// Collections use `BTreeMap` so serialized snapshots are byte-stable, which
/// the preview-discard guarantee and the conflict fingerprints rely on.
#[derive(Debug, Default)]
pub struct Store {
    pub(crate) ideas: BTreeMap<String, Idea>,
    pub(crate) analyses: BTreeMap<String, Analysis>,
    pub(crate) projects: BTreeMap<String, Project>,
    pub(crate) months: BTreeMap<String, MonthlyGoal>,
    pub(crate) weeks: BTreeMap<String, WeeklyMilestone>,
    pub(crate) tasks: BTreeMap<String, Task>,
    pub(crate) meta: MetaState,
    /// Slots touched since the last flush.
    dirty: BTreeSet<Slot>,
    /// Edit generations per mutable scope (project or month id). Runtime
    /// state only, never persisted.
    generations: HashMap<String, u64>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the seed idea the UI guarantees to exist.
    pub fn seed() -> Self {
        let mut store = Self::new();
        store.add_idea(NewIdea {
            title: "My first scheme".to_string(),
            description: "Describe the project you keep daydreaming about.".to_string(),
            emoji: Some("\u{1f4a1}".to_string()),
        });
        store
    }

    /// Rebuild a store from deserialized collections (persistence load path).
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        ideas: BTreeMap<String, Idea>,
        analyses: BTreeMap<String, Analysis>,
        projects: BTreeMap<String, Project>,
        months: BTreeMap<String, MonthlyGoal>,
        weeks: BTreeMap<String, WeeklyMilestone>,
        tasks: BTreeMap<String, Task>,
        meta: MetaState,
    ) -> Self {
        Self {
            ideas,
            analyses,
            projects,
            months,
            weeks,
            tasks,
            meta,
            dirty: BTreeSet::new(),
            generations: HashMap::new(),
        }
    }

    // === Dirty tracking ===

    fn mark(&mut self, slot: Slot) {
        self.dirty.insert(slot);
    }

    /// Mark every slot dirty (used for the initial write of a fresh store).
    pub fn mark_all(&mut self) {
        for slot in Slot::all() {
            self.dirty.insert(*slot);
        }
    }

    /// Drain the set of slots touched since the last call.
    pub fn take_dirty(&mut self) -> BTreeSet<Slot> {
        std::mem::take(&mut self.dirty)
    }

    /// Whether any slot is pending a write.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    // === Edit generations ===

    /// Current edit generation for a project or month scope.
    pub fn generation(&self, scope_id: &str) -> u64 {
        self.generations.get(scope_id).copied().unwrap_or(0)
    }

    fn bump_generation(&mut self, scope_id: &str) {
        *self.generations.entry(scope_id.to_string()).or_insert(0) += 1;
    }

    // === Read accessors ===

    pub fn idea(&self, id: &str) -> Option<&Idea> {
        self.ideas.get(id)
    }

    pub fn analysis(&self, id: &str) -> Option<&Analysis> {
        self.analyses.get(id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.get(id)
    }

    pub fn month(&self, id: &str) -> Option<&MonthlyGoal> {
        self.months.get(id)
    }

    pub fn week(&self, id: &str) -> Option<&WeeklyMilestone> {
        self.weeks.get(id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn ideas(&self) -> impl Iterator<Item = &Idea> {
        self.ideas.values()
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn meta(&self) -> &MetaState {
        &self.meta
    }

    pub fn counts(&self) -> StoreCounts {
        StoreCounts {
            ideas: self.ideas.len(),
            analyses: self.analyses.len(),
            projects: self.projects.len(),
            months: self.months.len(),
            weeks: self.weeks.len(),
            tasks: self.tasks.len(),
        }
    }

    /// The project owning the given month, if any.
    pub fn month_owner(&self, month_id: &str) -> Option<&Project> {
        self.projects
            .values()
            .find(|p| p.month_ids.iter().any(|m| m == month_id))
    }

    /// Months of a project in roadmap order, skipping unresolved ids.
    pub fn project_months(&self, project: &Project) -> Vec<&MonthlyGoal> {
        project
            .month_ids
            .iter()
            .filter_map(|id| self.months.get(id))
            .collect()
    }

    /// The project's current month sequence as oracle-shaped plan blobs.
    pub fn month_plans(&self, project_id: &str) -> Vec<MonthPlan> {
        let Some(project) = self.projects.get(project_id) else {
            return Vec::new();
        };
        self.project_months(project)
            .into_iter()
            .map(|m| MonthPlan {
                month: m.month,
                theme: m.theme.clone(),
                goals: m.goals.clone(),
            })
            .collect()
    }

    // === Idea operations ===

    /// Create a new pending idea.
    pub fn add_idea(&mut self, data: NewIdea) -> Idea {
        let id = generate_id(IDEA_PREFIX, &data.title);
        let mut idea = Idea::new(id.clone(), data.title, data.description);
        idea.emoji = data.emoji;
        self.ideas.insert(id, idea.clone());
        self.mark(Slot::Ideas);
        idea
    }

    /// Merge patch fields into an idea. Silently a no-op if the id is
    /// absent; never changes id or creation timestamp.
    pub fn update_idea(&mut self, id: &str, patch: IdeaPatch) {
        let Some(idea) = self.ideas.get_mut(id) else {
            return;
        };
        if let Some(title) = patch.title {
            idea.title = title;
        }
        if let Some(description) = patch.description {
            idea.description = description;
        }
        if let Some(emoji) = patch.emoji {
            idea.emoji = Some(emoji);
        }
        if let Some(status) = patch.status {
            idea.status = status;
        }
        idea.touch();
        self.mark(Slot::Ideas);
    }

    /// Delete an idea. Refuses to delete the last remaining idea and any
    /// idea still referenced by a project; absent ids are a no-op.
    pub fn delete_idea(&mut self, id: &str) -> Result<()> {
        if !self.ideas.contains_key(id) {
            return Ok(());
        }
        if self.ideas.len() <= 1 {
            return Err(Error::LastIdea);
        }
        if let Some(project) = self.projects.values().find(|p| p.idea_id == id) {
            return Err(Error::Referential(format!(
                "idea {} is referenced by project {}",
                id, project.id
            )));
        }
        self.ideas.remove(id);
        self.mark(Slot::Ideas);
        Ok(())
    }

    // === Analysis operations ===

    /// Store a fresh analysis record for an idea and point the idea at it.
    /// Re-analysis always creates a new record; existing ones are immutable.
    pub fn add_analysis(&mut self, result: AnalysisResult) -> Result<Analysis> {
        if !self.ideas.contains_key(&result.idea_id) {
            return Err(Error::Referential(format!(
                "analysis references unknown idea {}",
                result.idea_id
            )));
        }
        let id = generate_id(ANALYSIS_PREFIX, &result.idea_id);
        let analysis = Analysis::new(
            id.clone(),
            result.idea_id.clone(),
            result.metrics,
            result.reasoning,
            result.one_liner,
        );
        self.analyses.insert(id.clone(), analysis.clone());
        if let Some(idea) = self.ideas.get_mut(&result.idea_id) {
            idea.analysis_id = Some(id);
            idea.touch();
        }
        self.mark(Slot::Analyses);
        self.mark(Slot::Ideas);
        Ok(analysis)
    }

    // === Project operations ===

    /// The central constructor: turn an oracle plan blob into a wired
    /// project graph in a single pass.
    ///
    /// Creates months from `plan.monthly_plan` (renumbered positionally so
    /// the sequence is always 1..n), weeks from `plan.weekly_plan` injected
    /// into the first month, and tasks from each week's task list. Marks the
    /// source idea ACTIVE. If any part of the blob fails validation, nothing
    /// is inserted: no partially constructed project is ever visible.
    pub fn create_project(
        &mut self,
        idea_id: &str,
        analysis_id: &str,
        plan: &FullPlan,
        start_date: NaiveDate,
        settings: ProjectSettings,
    ) -> Result<String> {
        if !self.ideas.contains_key(idea_id) {
            return Err(Error::Referential(format!("unknown idea {}", idea_id)));
        }
        let analysis = self
            .analyses
            .get(analysis_id)
            .ok_or_else(|| Error::Referential(format!("unknown analysis {}", analysis_id)))?;
        if analysis.idea_id != idea_id {
            return Err(Error::Referential(format!(
                "analysis {} does not belong to idea {}",
                analysis_id, idea_id
            )));
        }
        if plan.monthly_plan.is_empty() {
            return Err(Error::InvalidInput("plan has no months".to_string()));
        }

        let project_id = generate_id(PROJECT_PREFIX, idea_id);

        // Stage the whole graph before touching any dictionary so a bad
        // blob rolls back to nothing.
        let mut staged_months: Vec<MonthlyGoal> = Vec::new();
        for (index, month_plan) in plan.monthly_plan.iter().enumerate() {
            let id = generate_id(MONTH_PREFIX, &format!("{}-{}", project_id, index));
            let mut month = MonthlyGoal::new(id, (index as u32) + 1, month_plan.theme.clone());
            month.goals = month_plan.goals.clone();
            staged_months.push(month);
        }

        let (mut staged_weeks, staged_tasks) =
            stage_weeks(&staged_months[0].id, &plan.weekly_plan)?;
        let week_ids: Vec<String> = staged_weeks.iter().map(|w| w.id.clone()).collect();
        staged_months[0].week_ids = week_ids;

        // All validation passed; insert the graph.
        let mut project = Project::new(
            project_id.clone(),
            idea_id.to_string(),
            analysis_id.to_string(),
            plan.yearly_plan.clone(),
            start_date,
            settings,
        );
        project.month_ids = staged_months.iter().map(|m| m.id.clone()).collect();
        self.projects.insert(project_id.clone(), project);
        for month in staged_months {
            self.months.insert(month.id.clone(), month);
        }
        for week in staged_weeks.drain(..) {
            self.weeks.insert(week.id.clone(), week);
        }
        for task in staged_tasks {
            self.tasks.insert(task.id.clone(), task);
        }

        if let Some(idea) = self.ideas.get_mut(idea_id) {
            idea.status = IdeaStatus::Active;
            idea.touch();
        }

        self.bump_generation(&project_id);
        self.mark(Slot::Ideas);
        self.mark(Slot::Projects);
        self.mark(Slot::Months);
        self.mark(Slot::Weeks);
        self.mark(Slot::Tasks);
        Ok(project_id)
    }

    /// Delete a project and everything it owns. The source idea reverts to
    /// pending so it can be committed again.
    pub fn delete_project(&mut self, id: &str) -> Result<()> {
        let project = self
            .projects
            .remove(id)
            .ok_or_else(|| Error::NotFound(format!("Project not found: {}", id)))?;

        for month_id in &project.month_ids {
            self.remove_month_cascade(month_id);
        }

        if let Some(idea) = self.ideas.get_mut(&project.idea_id) {
            idea.status = IdeaStatus::Pending;
            idea.touch();
            self.mark(Slot::Ideas);
        }
        if self.meta.active_project_id.as_deref() == Some(id) {
            self.meta.active_project_id = None;
            self.mark(Slot::Meta);
        }

        self.bump_generation(id);
        self.mark(Slot::Projects);
        self.mark(Slot::Months);
        self.mark(Slot::Weeks);
        self.mark(Slot::Tasks);
        Ok(())
    }

    /// Remove a month, its weeks, and their tasks from the dictionaries.
    /// Does not touch any project's month_ids list.
    fn remove_month_cascade(&mut self, month_id: &str) {
        let Some(month) = self.months.remove(month_id) else {
            return;
        };
        for week_id in &month.week_ids {
            if let Some(week) = self.weeks.remove(week_id) {
                for task_id in &week.task_ids {
                    self.tasks.remove(task_id);
                }
            }
        }
    }

    /// Store the project's three-year vision.
    pub fn set_three_year_vision(
        &mut self,
        project_id: &str,
        vision: ThreeYearVision,
    ) -> Result<()> {
        let project = self
            .projects
            .get_mut(project_id)
            .ok_or_else(|| Error::Referential(format!("unknown project {}", project_id)))?;
        project.three_year_vision = Some(vision);
        project.touch();
        self.bump_generation(project_id);
        self.mark(Slot::Projects);
        Ok(())
    }

    /// Append oracle-proposed months after the current last month. Numbers
    /// are assigned positionally so the sequence continues contiguously
    /// from `last + 1` no matter how the blob was numbered.
    pub fn append_months(&mut self, project_id: &str, plans: &[MonthPlan]) -> Result<Vec<String>> {
        let project = self
            .projects
            .get(project_id)
            .ok_or_else(|| Error::Referential(format!("unknown project {}", project_id)))?;
        let last = self
            .project_months(project)
            .last()
            .map(|m| m.month)
            .unwrap_or(0);

        let mut new_ids = Vec::with_capacity(plans.len());
        let mut staged = Vec::with_capacity(plans.len());
        for (index, plan) in plans.iter().enumerate() {
            let id = generate_id(MONTH_PREFIX, &format!("{}-ext-{}", project_id, index));
            let mut month = MonthlyGoal::new(id.clone(), last + (index as u32) + 1, plan.theme.clone());
            month.goals = plan.goals.clone();
            staged.push(month);
            new_ids.push(id);
        }

        for month in staged {
            self.months.insert(month.id.clone(), month);
        }
        if let Some(project) = self.projects.get_mut(project_id) {
            project.month_ids.extend(new_ids.iter().cloned());
            project.touch();
        }

        self.bump_generation(project_id);
        self.mark(Slot::Projects);
        self.mark(Slot::Months);
        Ok(new_ids)
    }

    /// Replace the project's entire month list with a new sequence,
    /// renumbered 1..n. Old months, weeks, and tasks are cascade-deleted.
    pub fn replace_months(&mut self, project_id: &str, plans: &[MonthPlan]) -> Result<Vec<String>> {
        if !self.projects.contains_key(project_id) {
            return Err(Error::Referential(format!("unknown project {}", project_id)));
        }
        if plans.is_empty() {
            return Err(Error::InvalidInput(
                "replacement roadmap has no months".to_string(),
            ));
        }

        let old_month_ids = self
            .projects
            .get(project_id)
            .map(|p| p.month_ids.clone())
            .unwrap_or_default();
        for month_id in &old_month_ids {
            self.remove_month_cascade(month_id);
        }

        let mut new_ids = Vec::with_capacity(plans.len());
        for (index, plan) in plans.iter().enumerate() {
            let id = generate_id(MONTH_PREFIX, &format!("{}-c{}", project_id, index));
            let mut month = MonthlyGoal::new(id.clone(), (index as u32) + 1, plan.theme.clone());
            month.goals = plan.goals.clone();
            self.months.insert(id.clone(), month);
            new_ids.push(id);
        }

        if let Some(project) = self.projects.get_mut(project_id) {
            project.month_ids = new_ids.clone();
            project.touch();
        }

        self.bump_generation(project_id);
        self.mark(Slot::Projects);
        self.mark(Slot::Months);
        self.mark(Slot::Weeks);
        self.mark(Slot::Tasks);
        Ok(new_ids)
    }

    // === Month operations ===

    /// Update a month's theme and/or goals. Silently a no-op if absent.
    pub fn update_month(&mut self, id: &str, theme: Option<String>, goals: Option<Vec<String>>) {
        let Some(month) = self.months.get_mut(id) else {
            return;
        };
        if let Some(theme) = theme {
            month.theme = theme;
        }
        if let Some(goals) = goals {
            month.goals = goals;
        }
        month.touch();
        self.bump_generation(id);
        self.mark(Slot::Months);
    }

    /// Create the month's four placeholder weeks if it has none. Calling
    /// this again is a no-op that returns the existing week ids.
    pub fn initialize_month_weeks(&mut self, month_id: &str) -> Result<Vec<String>> {
        let month = self
            .months
            .get(month_id)
            .ok_or_else(|| Error::Referential(format!("unknown month {}", month_id)))?;
        if !month.week_ids.is_empty() {
            return Ok(month.week_ids.clone());
        }

        let mut week_ids = Vec::with_capacity(4);
        for number in 1..=4u32 {
            let id = generate_id(WEEK_PREFIX, &format!("{}-{}", month_id, number));
            let week = WeeklyMilestone::new(id.clone(), number, PLACEHOLDER_WEEK_THEME.to_string());
            self.weeks.insert(id.clone(), week);
            week_ids.push(id);
        }

        if let Some(month) = self.months.get_mut(month_id) {
            month.week_ids = week_ids.clone();
            month.touch();
        }

        self.bump_generation(month_id);
        self.mark(Slot::Months);
        self.mark(Slot::Weeks);
        Ok(week_ids)
    }

    /// Replace a month's week list wholesale (adjust / strategy commit).
    /// Old weeks and their tasks are cascade-deleted; the new weeks carry
    /// the blob's numbering, which must be unique within the month.
    pub fn replace_month_weeks(&mut self, month_id: &str, plans: &[WeekPlan]) -> Result<Vec<String>> {
        if !self.months.contains_key(month_id) {
            return Err(Error::Referential(format!("unknown month {}", month_id)));
        }

        // Stage first so validation failures leave the store untouched.
        let (staged_weeks, staged_tasks) = stage_weeks(month_id, plans)?;

        let old_week_ids = self
            .months
            .get(month_id)
            .map(|m| m.week_ids.clone())
            .unwrap_or_default();
        for week_id in &old_week_ids {
            if let Some(week) = self.weeks.remove(week_id) {
                for task_id in &week.task_ids {
                    self.tasks.remove(task_id);
                }
            }
        }

        let week_ids: Vec<String> = staged_weeks.iter().map(|w| w.id.clone()).collect();
        for week in staged_weeks {
            self.weeks.insert(week.id.clone(), week);
        }
        for task in staged_tasks {
            self.tasks.insert(task.id.clone(), task);
        }

        if let Some(month) = self.months.get_mut(month_id) {
            month.week_ids = week_ids.clone();
            month.touch();
        }

        self.bump_generation(month_id);
        self.mark(Slot::Months);
        self.mark(Slot::Weeks);
        self.mark(Slot::Tasks);
        Ok(week_ids)
    }

    // === Week operations ===

    /// Update a week's theme. Silently a no-op if absent.
    pub fn update_week_theme(&mut self, id: &str, theme: String) {
        let Some(week) = self.weeks.get_mut(id) else {
            return;
        };
        week.theme = theme;
        week.touch();
        self.mark(Slot::Weeks);
    }

    // === Task operations ===

    /// Create a task in the given week.
    pub fn add_task(&mut self, week_id: &str, text: String, priority: Option<u8>) -> Result<Task> {
        if !self.weeks.contains_key(week_id) {
            return Err(Error::Referential(format!("unknown week {}", week_id)));
        }
        let id = generate_id(TASK_PREFIX, &format!("{}-{}", week_id, text));
        let mut task = Task::new(id.clone(), text);
        task.priority = priority;
        self.tasks.insert(id.clone(), task.clone());
        if let Some(week) = self.weeks.get_mut(week_id) {
            week.task_ids.push(id);
            week.touch();
        }
        self.mark(Slot::Weeks);
        self.mark(Slot::Tasks);
        Ok(task)
    }

    /// Update a task's text. Silently a no-op if absent.
    pub fn update_task_text(&mut self, id: &str, text: String) {
        let Some(task) = self.tasks.get_mut(id) else {
            return;
        };
        task.text = text;
        task.touch();
        self.mark(Slot::Tasks);
    }

    /// Set a task's workflow status. Silently a no-op if absent.
    pub fn set_task_status(&mut self, id: &str, status: TaskStatus) {
        let Some(task) = self.tasks.get_mut(id) else {
            return;
        };
        task.status = status;
        task.touch();
        self.mark(Slot::Tasks);
    }

    /// Delete a task and unlink it from its owning week.
    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        if self.tasks.remove(id).is_none() {
            return Err(Error::NotFound(format!("Task not found: {}", id)));
        }
        for week in self.weeks.values_mut() {
            if let Some(pos) = week.task_ids.iter().position(|t| t == id) {
                week.task_ids.remove(pos);
                week.touch();
                break;
            }
        }
        self.mark(Slot::Weeks);
        self.mark(Slot::Tasks);
        Ok(())
    }

    /// Transfer a task from one week to another as one logical change.
    ///
    /// Fails with a referential error if either week is unknown or the task
    /// is not actually present in the source week's list, which guards
    /// against double-moves from stale drag state. The task entity itself
    /// is unchanged except for its update timestamp.
    pub fn move_task(&mut self, task_id: &str, source_week_id: &str, target_week_id: &str) -> Result<()> {
        if !self.weeks.contains_key(target_week_id) {
            return Err(Error::Referential(format!(
                "unknown target week {}",
                target_week_id
            )));
        }
        let source = self
            .weeks
            .get(source_week_id)
            .ok_or_else(|| Error::Referential(format!("unknown source week {}", source_week_id)))?;
        let Some(pos) = source.task_ids.iter().position(|t| t == task_id) else {
            return Err(Error::Referential(format!(
                "task {} is not in week {}",
                task_id, source_week_id
            )));
        };
        if !self.tasks.contains_key(task_id) {
            return Err(Error::Referential(format!("unknown task {}", task_id)));
        }

        if let Some(source) = self.weeks.get_mut(source_week_id) {
            source.task_ids.remove(pos);
            source.touch();
        }
        if let Some(target) = self.weeks.get_mut(target_week_id) {
            target.task_ids.push(task_id.to_string());
            target.touch();
        }
        if let Some(task) = self.tasks.get_mut(task_id) {
            task.touch();
        }

        self.mark(Slot::Weeks);
        self.mark(Slot::Tasks);
        Ok(())
    }

    // === Meta operations ===

    /// Point the dashboard at a project (or clear the pointer).
    pub fn set_active_project(&mut self, project_id: Option<String>) {
        self.meta.active_project_id = project_id;
        self.mark(Slot::Meta);
    }

    pub fn set_current_view(&mut self, view: Option<String>) {
        self.meta.current_view = view;
        self.mark(Slot::Meta);
    }

    pub fn set_focus_timer(&mut self, timer: Option<FocusTimer>) {
        self.meta.focus_timer = timer;
        self.mark(Slot::Meta);
    }

    // === Integrity ===

    /// Scan all ownership lists and report violations as human-readable
    /// strings. An empty result means the reference graph is sound.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for project in self.projects.values() {
            if !self.ideas.contains_key(&project.idea_id) {
                violations.push(format!(
                    "project {} references missing idea {}",
                    project.id, project.idea_id
                ));
            }
            if !self.analyses.contains_key(&project.analysis_id) {
                violations.push(format!(
                    "project {} references missing analysis {}",
                    project.id, project.analysis_id
                ));
            }
            let mut last_month = 0u32;
            for month_id in &project.month_ids {
                match self.months.get(month_id) {
                    None => violations.push(format!(
                        "project {} references missing month {}",
                        project.id, month_id
                    )),
                    Some(month) => {
                        if month.month <= last_month {
                            violations.push(format!(
                                "project {} month numbers not increasing at {}",
                                project.id, month_id
                            ));
                        }
                        last_month = month.month;
                    }
                }
            }
        }

        for month in self.months.values() {
            let mut seen = BTreeSet::new();
            for week_id in &month.week_ids {
                match self.weeks.get(week_id) {
                    None => violations.push(format!(
                        "month {} references missing week {}",
                        month.id, week_id
                    )),
                    Some(week) => {
                        if !seen.insert(week.week_number) {
                            violations.push(format!(
                                "month {} has duplicate week number {}",
                                month.id, week.week_number
                            ));
                        }
                    }
                }
            }
        }

        let mut owners: HashMap<&str, &str> = HashMap::new();
        for week in self.weeks.values() {
            for task_id in &week.task_ids {
                if !self.tasks.contains_key(task_id) {
                    violations.push(format!(
                        "week {} references missing task {}",
                        week.id, task_id
                    ));
                }
                if let Some(other) = owners.insert(task_id.as_str(), week.id.as_str()) {
                    violations.push(format!(
                        "task {} is owned by both week {} and week {}",
                        task_id, other, week.id
                    ));
                }
            }
        }

        violations
    }
}

/// Stage week and task entities for a month from an oracle blob, validating
/// week-number uniqueness before anything is inserted.
fn stage_weeks(month_id: &str, plans: &[WeekPlan]) -> Result<(Vec<WeeklyMilestone>, Vec<Task>)> {
    let mut seen = BTreeSet::new();
    for plan in plans {
        if !seen.insert(plan.week_number) {
            return Err(Error::Referential(format!(
                "duplicate week number {} in plan for month {}",
                plan.week_number, month_id
            )));
        }
    }

    let mut weeks = Vec::with_capacity(plans.len());
    let mut tasks = Vec::new();
    for plan in plans {
        let week_id = generate_id(WEEK_PREFIX, &format!("{}-{}", month_id, plan.week_number));
        let mut week = WeeklyMilestone::new(week_id.clone(), plan.week_number, plan.theme.clone());
        for (index, text) in plan.tasks.iter().enumerate() {
            let task_id = generate_id(TASK_PREFIX, &format!("{}-{}", week_id, index));
            week.task_ids.push(task_id.clone());
            tasks.push(Task::new(task_id, text.clone()));
        }
        weeks.push(week);
    }
    Ok((weeks, tasks))
}

/// Generate a unique ID for an entity.
///
/// Format: `<prefix>-<6 hex chars>`, hashed from the seed, a fresh UUID,
/// and the current time so ids stay unique within a bulk creation pass.
pub fn generate_id(prefix: &str, seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(uuid::Uuid::new_v4().as_bytes());
    hasher.update(
        Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or(0)
            .to_le_bytes(),
    );
    let hash = hasher.finalize();
    let hash_hex = format!("{:x}", hash);
    format!("{}-{}", prefix, &hash_hex[..6])
}

/// Validate that an ID matches the expected format.
pub fn validate_id(id: &str, prefix: &str) -> Result<()> {
    if !id.starts_with(&format!("{}-", prefix)) {
        return Err(Error::InvalidId(format!(
            "ID must start with '{}-', got: {}",
            prefix, id
        )));
    }

    let suffix = &id[prefix.len() + 1..];
    if suffix.len() != 6 || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidId(format!(
            "ID suffix must be 6 hex characters, got: {}",
            suffix
        )));
    }

    Ok(())
}

/// Entity kind inferred from an id prefix, for the generic `show` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Idea,
    Analysis,
    Project,
    Month,
    Week,
    Task,
}

/// Infer the entity kind from an id's prefix.
pub fn entity_kind(id: &str) -> Option<EntityKind> {
    let prefix = id.split('-').next()?;
    match prefix {
        IDEA_PREFIX => Some(EntityKind::Idea),
        ANALYSIS_PREFIX => Some(EntityKind::Analysis),
        PROJECT_PREFIX => Some(EntityKind::Project),
        MONTH_PREFIX => Some(EntityKind::Month),
        WEEK_PREFIX => Some(EntityKind::Week),
        TASK_PREFIX => Some(EntityKind::Task),
        _ => None,
    }
}
