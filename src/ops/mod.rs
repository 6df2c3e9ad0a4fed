//! Business operations: the mutation API composing store primitives with
//! planning-oracle calls.
//!
//! Every operation validates its inputs first, calls the oracle second, and
//! mutates the store last, so an oracle failure leaves the store exactly as
//! it was. Operations that re-plan an existing scope capture the scope's
//! edit generation before the oracle call and discard the response if the
//! scope changed underneath it.

use chrono::{Local, NaiveDate};

use crate::models::plan::{Difficulty, StrategyOption};
use crate::models::{Analysis, Idea, MonthlyGoal, ProjectSettings, ThreeYearVision};
use crate::oracle::PlanningOracle;
use crate::store::{IdeaPatch, NewIdea, Store};
use crate::{Error, Result};

/// Minimum title length for an idea to be analyzable.
pub const MIN_TITLE_LEN: usize = 2;

/// Minimum description length for an idea to be analyzable.
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// A generated set of month-plan strategy options, held by the caller until
/// one is explicitly committed. Discarding the preview (dropping this value)
/// leaves the store completely unchanged.
#[derive(Debug, Clone)]
pub struct PlanPreview {
    pub month_id: String,
    /// Edit generation of the month when the options were generated.
    generation: u64,
    pub options: Vec<StrategyOption>,
}

/// The operation layer: a store handle plus the planning oracle.
pub struct Planner<'a> {
    store: &'a mut Store,
    oracle: &'a dyn PlanningOracle,
}

/// Whether an idea has enough substance to be worth analyzing.
pub fn idea_is_analyzable(idea: &Idea) -> bool {
    idea.title.chars().count() >= MIN_TITLE_LEN
        && idea.description.chars().count() >= MIN_DESCRIPTION_LEN
}

impl<'a> Planner<'a> {
    pub fn new(store: &'a mut Store, oracle: &'a dyn PlanningOracle) -> Self {
        Self { store, oracle }
    }

    /// Analyze every idea with a usable title and description.
    ///
    /// Rejects before calling the oracle when no idea qualifies; stores one
    /// fresh analysis per analyzed idea only after the whole batch arrived.
    pub fn analyze_ideas(&mut self) -> Result<Vec<Analysis>> {
        let eligible: Vec<Idea> = self
            .store
            .ideas()
            .filter(|i| idea_is_analyzable(i))
            .cloned()
            .collect();
        if eligible.is_empty() {
            return Err(Error::InvalidInput(format!(
                "no idea has a title of at least {} characters and a description of at least {}",
                MIN_TITLE_LEN, MIN_DESCRIPTION_LEN
            )));
        }

        let results = self.oracle.analyze(&eligible)?;

        let mut analyses = Vec::with_capacity(results.len());
        for result in results {
            analyses.push(self.store.add_analysis(result)?);
        }
        Ok(analyses)
    }

    /// Commit an analyzed idea to a project starting on `start_date`.
    ///
    /// The date is compared as a local calendar day: today is allowed, the
    /// past is not. On success the new project becomes the active one.
    pub fn commit_idea(
        &mut self,
        idea_id: &str,
        start_date: NaiveDate,
        settings: ProjectSettings,
    ) -> Result<String> {
        let idea = self
            .store
            .idea(idea_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Idea not found: {}", idea_id)))?;
        let analysis_id = idea.analysis_id.clone().ok_or_else(|| {
            Error::InvalidInput(format!("idea {} has not been analyzed yet", idea_id))
        })?;
        let analysis = self
            .store
            .analysis(&analysis_id)
            .cloned()
            .ok_or_else(|| Error::Referential(format!("unknown analysis {}", analysis_id)))?;
        if let Some(project) = self.store.projects().find(|p| p.idea_id == idea_id) {
            return Err(Error::InvalidInput(format!(
                "idea {} is already committed to project {}",
                idea_id, project.id
            )));
        }
        if start_date < Local::now().date_naive() {
            return Err(Error::InvalidInput(
                "start date must not be in the past".to_string(),
            ));
        }

        let plan = self.oracle.generate_full_plan(&idea, &analysis.reasoning)?;
        let project_id =
            self.store
                .create_project(idea_id, &analysis_id, &plan, start_date, settings)?;
        self.store.set_active_project(Some(project_id.clone()));
        Ok(project_id)
    }

    /// Append oracle-generated months after the current last month.
    pub fn extend_roadmap(&mut self, project_id: &str) -> Result<Vec<String>> {
        let (idea, last_month) = {
            let project = self
                .store
                .project(project_id)
                .ok_or_else(|| Error::NotFound(format!("Project not found: {}", project_id)))?;
            let idea = self
                .store
                .idea(&project.idea_id)
                .cloned()
                .ok_or_else(|| Error::Referential(format!("unknown idea {}", project.idea_id)))?;
            let last = self
                .store
                .project_months(project)
                .last()
                .map(|m| m.month)
                .unwrap_or(0);
            (idea, last)
        };

        let generation = self.store.generation(project_id);
        let plans = self.oracle.extend_roadmap(&idea, last_month)?;
        if self.store.generation(project_id) != generation {
            return Err(Error::Stale(format!(
                "roadmap of {} changed while the oracle was planning",
                project_id
            )));
        }
        self.store.append_months(project_id, &plans)
    }

    /// Replace the whole roadmap with exactly `target_months` re-planned
    /// months, renumbered 1..target ("hardcore mode").
    pub fn compress_roadmap(&mut self, project_id: &str, target_months: u32) -> Result<Vec<String>> {
        if target_months == 0 {
            return Err(Error::InvalidInput(
                "target month count must be at least 1".to_string(),
            ));
        }
        let idea = {
            let project = self
                .store
                .project(project_id)
                .ok_or_else(|| Error::NotFound(format!("Project not found: {}", project_id)))?;
            self.store
                .idea(&project.idea_id)
                .cloned()
                .ok_or_else(|| Error::Referential(format!("unknown idea {}", project.idea_id)))?
        };
        let current_plan = self.store.month_plans(project_id);

        let generation = self.store.generation(project_id);
        let plans = self
            .oracle
            .compress_roadmap(&idea, &current_plan, target_months)?;
        if plans.len() != target_months as usize {
            return Err(Error::Oracle(format!(
                "compressed roadmap has {} months, expected exactly {}",
                plans.len(),
                target_months
            )));
        }
        if self.store.generation(project_id) != generation {
            return Err(Error::Stale(format!(
                "roadmap of {} changed while the oracle was planning",
                project_id
            )));
        }
        self.store.replace_months(project_id, &plans)
    }

    /// Replace the month's weeks with an oracle re-plan at the given
    /// difficulty.
    pub fn adjust_weekly_plan(
        &mut self,
        project_id: &str,
        month_id: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<String>> {
        let (idea, month) = self.month_context(project_id, month_id)?;

        let generation = self.store.generation(month_id);
        let weeks = self
            .oracle
            .adjust_weekly_plan(&idea, &month.theme, difficulty)?;
        if self.store.generation(month_id) != generation {
            return Err(Error::Stale(format!(
                "month {} changed while the oracle was planning",
                month_id
            )));
        }
        self.store.replace_month_weeks(month_id, &weeks)
    }

    /// Generate named strategy options for a month. The store is not
    /// touched; the returned preview is committed explicitly or dropped.
    pub fn month_plan_options(&mut self, project_id: &str, month_id: &str) -> Result<PlanPreview> {
        let (idea, month) = self.month_context(project_id, month_id)?;

        let options = self.oracle.generate_month_plan_options(&idea, &month)?;
        if options.is_empty() {
            return Err(Error::Oracle(
                "oracle returned no strategy options".to_string(),
            ));
        }
        Ok(PlanPreview {
            month_id: month_id.to_string(),
            generation: self.store.generation(month_id),
            options,
        })
    }

    /// Commit exactly one candidate from a preview, overwriting the month's
    /// week plan. Fails if the month changed since the preview was taken.
    pub fn commit_plan_option(&mut self, preview: &PlanPreview, index: usize) -> Result<Vec<String>> {
        let option = preview.options.get(index).ok_or_else(|| {
            Error::InvalidInput(format!(
                "option {} out of range ({} available)",
                index,
                preview.options.len()
            ))
        })?;
        if self.store.generation(&preview.month_id) != preview.generation {
            return Err(Error::Stale(format!(
                "month {} changed since the options were generated",
                preview.month_id
            )));
        }
        self.store.replace_month_weeks(&preview.month_id, &option.plan)
    }

    /// Rewrite an idea's title/description/emoji via the oracle.
    pub fn refine_idea(&mut self, idea_id: &str) -> Result<Idea> {
        let idea = self
            .store
            .idea(idea_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Idea not found: {}", idea_id)))?;
        let raw = format!("{}\n{}", idea.title, idea.description);

        let draft = self.oracle.refine_idea(&raw)?;
        self.store.update_idea(
            idea_id,
            IdeaPatch {
                title: Some(draft.title),
                description: Some(draft.description),
                emoji: draft.emoji,
                status: None,
            },
        );
        self.store
            .idea(idea_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Idea not found: {}", idea_id)))
    }

    /// Add oracle-suggested ideas to the brainstorm list.
    pub fn suggest_ideas(&mut self) -> Result<Vec<Idea>> {
        let drafts = self.oracle.suggest_ideas()?;
        Ok(drafts
            .into_iter()
            .map(|draft| {
                self.store.add_idea(NewIdea {
                    title: draft.title,
                    description: draft.description,
                    emoji: draft.emoji,
                })
            })
            .collect())
    }

    /// Expand the project's yearly plan into a three-year vision.
    pub fn expand_three_years(&mut self, project_id: &str) -> Result<ThreeYearVision> {
        let (idea, yearly_plan) = {
            let project = self
                .store
                .project(project_id)
                .ok_or_else(|| Error::NotFound(format!("Project not found: {}", project_id)))?;
            let idea = self
                .store
                .idea(&project.idea_id)
                .cloned()
                .ok_or_else(|| Error::Referential(format!("unknown idea {}", project.idea_id)))?;
            (idea, project.yearly_plan.clone())
        };

        let vision = self.oracle.expand_to_three_years(&idea, &yearly_plan)?;
        self.store.set_three_year_vision(project_id, vision.clone())?;
        Ok(vision)
    }

    /// Refine the stored three-year vision draft.
    pub fn refine_three_year_vision(&mut self, project_id: &str) -> Result<ThreeYearVision> {
        let (idea, draft) = {
            let project = self
                .store
                .project(project_id)
                .ok_or_else(|| Error::NotFound(format!("Project not found: {}", project_id)))?;
            let idea = self
                .store
                .idea(&project.idea_id)
                .cloned()
                .ok_or_else(|| Error::Referential(format!("unknown idea {}", project.idea_id)))?;
            let draft = project.three_year_vision.clone().ok_or_else(|| {
                Error::InvalidInput("project has no vision draft to refine".to_string())
            })?;
            (idea, draft)
        };

        let refined = self.oracle.refine_three_year_vision(&idea, &draft)?;
        self.store.set_three_year_vision(project_id, refined.clone())?;
        Ok(refined)
    }

    fn month_context(&self, project_id: &str, month_id: &str) -> Result<(Idea, MonthlyGoal)> {
        let project = self
            .store
            .project(project_id)
            .ok_or_else(|| Error::NotFound(format!("Project not found: {}", project_id)))?;
        if !project.month_ids.iter().any(|m| m == month_id) {
            return Err(Error::Referential(format!(
                "month {} does not belong to project {}",
                month_id, project_id
            )));
        }
        let idea = self
            .store
            .idea(&project.idea_id)
            .cloned()
            .ok_or_else(|| Error::Referential(format!("unknown idea {}", project.idea_id)))?;
        let month = self
            .store
            .month(month_id)
            .cloned()
            .ok_or_else(|| Error::Referential(format!("unknown month {}", month_id)))?;
        Ok((idea, month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::{
        AnalysisResult, FullPlan, IdeaDraft, MonthPlan, StrategyOption, WeekPlan,
    };
    use crate::models::{AnalysisMetrics, MonthlyGoal, YearlyPlan};
    use crate::persist::Document;
    use crate::store::test_fixtures::{committed_project, sample_plan};
    use crate::store::NewIdea;
    use std::cell::Cell;

    /// Oracle returning fixed data and counting calls; any entry can be
    /// flipped to fail.
    struct CannedOracle {
        calls: Cell<usize>,
        fail: bool,
    }

    impl CannedOracle {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: Cell::new(0),
                fail: true,
            }
        }

        fn tick(&self) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(Error::Oracle("canned failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl PlanningOracle for CannedOracle {
        fn analyze(&self, ideas: &[Idea]) -> Result<Vec<AnalysisResult>> {
            self.tick()?;
            Ok(ideas
                .iter()
                .map(|idea| AnalysisResult {
                    idea_id: idea.id.clone(),
                    metrics: AnalysisMetrics {
                        feasibility: 80,
                        market_potential: 60,
                        excitement: 70,
                        speed_to_mvp: 90,
                    },
                    reasoning: "canned".to_string(),
                    one_liner: "canned".to_string(),
                })
                .collect())
        }

        fn generate_full_plan(&self, _idea: &Idea, _reasoning: &str) -> Result<FullPlan> {
            self.tick()?;
            Ok(sample_plan())
        }

        fn refine_idea(&self, _raw: &str) -> Result<IdeaDraft> {
            self.tick()?;
            Ok(IdeaDraft {
                title: "Refined title".to_string(),
                description: "A much better description".to_string(),
                emoji: Some("\u{2728}".to_string()),
            })
        }

        fn suggest_ideas(&self) -> Result<Vec<IdeaDraft>> {
            self.tick()?;
            Ok(vec![IdeaDraft {
                title: "Suggested".to_string(),
                description: "A suggested concept".to_string(),
                emoji: None,
            }])
        }

        fn adjust_weekly_plan(
            &self,
            _idea: &Idea,
            _theme: &str,
            _difficulty: Difficulty,
        ) -> Result<Vec<WeekPlan>> {
            self.tick()?;
            Ok(vec![WeekPlan {
                week_number: 1,
                theme: "Adjusted".to_string(),
                tasks: vec!["Adjusted task".to_string()],
            }])
        }

        fn expand_to_three_years(
            &self,
            _idea: &Idea,
            _vision: &YearlyPlan,
        ) -> Result<ThreeYearVision> {
            self.tick()?;
            Ok(ThreeYearVision {
                ultimate_goal: "Expanded".to_string(),
                ..Default::default()
            })
        }

        fn refine_three_year_vision(
            &self,
            _idea: &Idea,
            draft: &ThreeYearVision,
        ) -> Result<ThreeYearVision> {
            self.tick()?;
            Ok(ThreeYearVision {
                ultimate_goal: format!("{} (refined)", draft.ultimate_goal),
                ..draft.clone()
            })
        }

        fn generate_month_plan_options(
            &self,
            _idea: &Idea,
            _month: &MonthlyGoal,
        ) -> Result<Vec<StrategyOption>> {
            self.tick()?;
            Ok(vec![
                StrategyOption {
                    strategy_name: "Depth first".to_string(),
                    description: "One feature end to end".to_string(),
                    plan: vec![WeekPlan {
                        week_number: 1,
                        theme: "Deep dive".to_string(),
                        tasks: vec!["Pick the feature".to_string()],
                    }],
                },
                StrategyOption {
                    strategy_name: "Breadth first".to_string(),
                    description: "Touch everything shallowly".to_string(),
                    plan: vec![WeekPlan {
                        week_number: 1,
                        theme: "Survey".to_string(),
                        tasks: vec!["List the surface".to_string()],
                    }],
                },
            ])
        }

        fn extend_roadmap(&self, _idea: &Idea, last_month: u32) -> Result<Vec<MonthPlan>> {
            self.tick()?;
            Ok(vec![MonthPlan {
                month: last_month + 1,
                theme: "Extension".to_string(),
                goals: vec![],
            }])
        }

        fn compress_roadmap(
            &self,
            _idea: &Idea,
            _current: &[MonthPlan],
            target_months: u32,
        ) -> Result<Vec<MonthPlan>> {
            self.tick()?;
            Ok((1..=target_months)
                .map(|n| MonthPlan {
                    month: n,
                    theme: format!("Compressed {}", n),
                    goals: vec![],
                })
                .collect())
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    #[test]
    fn test_analyze_rejects_without_calling_oracle() {
        let mut store = Store::new();
        store.add_idea(NewIdea {
            title: "x".to_string(), // too short
            description: "way too short".to_string(),
            emoji: None,
        });
        store.add_idea(NewIdea {
            title: "Valid title".to_string(),
            description: "short".to_string(), // too short
            emoji: None,
        });

        let oracle = CannedOracle::new();
        let mut planner = Planner::new(&mut store, &oracle);
        let err = planner.analyze_ideas().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(oracle.calls.get(), 0, "oracle must not be called");
    }

    #[test]
    fn test_analyze_stores_one_analysis_per_eligible_idea() {
        let mut store = Store::new();
        let a = store.add_idea(NewIdea {
            title: "Habit Tracker".to_string(),
            description: "A tool that tracks daily habits".to_string(),
            emoji: None,
        });
        store.add_idea(NewIdea {
            title: "x".to_string(),
            description: "nope".to_string(),
            emoji: None,
        });

        let oracle = CannedOracle::new();
        let mut planner = Planner::new(&mut store, &oracle);
        let analyses = planner.analyze_ideas().unwrap();
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].idea_id, a.id);
        assert_eq!(store.idea(&a.id).unwrap().analysis_id, Some(analyses[0].id.clone()));
    }

    #[test]
    fn test_analyze_failure_leaves_store_untouched() {
        let mut store = Store::new();
        store.add_idea(NewIdea {
            title: "Habit Tracker".to_string(),
            description: "A tool that tracks daily habits".to_string(),
            emoji: None,
        });
        store.take_dirty();

        let oracle = CannedOracle::failing();
        let mut planner = Planner::new(&mut store, &oracle);
        assert!(matches!(planner.analyze_ideas(), Err(Error::Oracle(_))));
        assert_eq!(store.counts().analyses, 0);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_commit_flow() {
        let mut store = Store::new();
        store.add_idea(NewIdea {
            title: "Habit Tracker".to_string(),
            description: "A tool that tracks daily habits for busy professionals".to_string(),
            emoji: None,
        });
        let oracle = CannedOracle::new();
        let mut planner = Planner::new(&mut store, &oracle);
        let idea_id = planner.analyze_ideas().unwrap()[0].idea_id.clone();

        let project_id = planner
            .commit_idea(&idea_id, today(), ProjectSettings::default())
            .unwrap();

        let view = store.project_view(&project_id).unwrap();
        assert_eq!(view.selected_idea.status, crate::models::IdeaStatus::Active);
        // Month one's detailed plan equals the oracle's weekly plan.
        let weekly = sample_plan().weekly_plan;
        let detailed = &view.monthly_plan[0].detailed_plan;
        assert_eq!(detailed.len(), weekly.len());
        for (week_view, plan) in detailed.iter().zip(&weekly) {
            assert_eq!(week_view.week.week_number, plan.week_number);
            assert_eq!(week_view.week.theme, plan.theme);
            let texts: Vec<&str> = week_view.tasks.iter().map(|t| t.text.as_str()).collect();
            assert_eq!(texts, plan.tasks.iter().map(|t| t.as_str()).collect::<Vec<_>>());
        }
        assert_eq!(store.meta().active_project_id, Some(project_id));
    }

    #[test]
    fn test_commit_rejects_past_start_date() {
        let mut store = Store::new();
        store.add_idea(NewIdea {
            title: "Habit Tracker".to_string(),
            description: "A tool that tracks daily habits".to_string(),
            emoji: None,
        });
        let oracle = CannedOracle::new();
        let mut planner = Planner::new(&mut store, &oracle);
        let idea_id = planner.analyze_ideas().unwrap()[0].idea_id.clone();

        let yesterday = today().pred_opt().unwrap();
        let err = planner
            .commit_idea(&idea_id, yesterday, ProjectSettings::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(store.counts().projects, 0);
    }

    #[test]
    fn test_commit_rejects_unanalyzed_idea() {
        let mut store = Store::new();
        let idea = store.add_idea(NewIdea {
            title: "Habit Tracker".to_string(),
            description: "A tool that tracks daily habits".to_string(),
            emoji: None,
        });
        let oracle = CannedOracle::new();
        let mut planner = Planner::new(&mut store, &oracle);
        let err = planner
            .commit_idea(&idea.id, today(), ProjectSettings::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(oracle.calls.get(), 0);
    }

    #[test]
    fn test_extend_roadmap_appends_contiguously() {
        let mut store = Store::seed();
        let project_id = committed_project(&mut store);
        let oracle = CannedOracle::new();
        let mut planner = Planner::new(&mut store, &oracle);
        let new_ids = planner.extend_roadmap(&project_id).unwrap();
        assert_eq!(new_ids.len(), 1);
        assert_eq!(store.month(&new_ids[0]).unwrap().month, 3);
    }

    #[test]
    fn test_compress_roadmap_renumbers() {
        let mut store = Store::seed();
        let project_id = committed_project(&mut store);
        let oracle = CannedOracle::new();
        let mut planner = Planner::new(&mut store, &oracle);
        let new_ids = planner.compress_roadmap(&project_id, 3).unwrap();
        assert_eq!(new_ids.len(), 3);
        let numbers: Vec<u32> = new_ids
            .iter()
            .map(|id| store.month(id).unwrap().month)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_preview_discard_is_byte_identical() {
        let mut store = Store::seed();
        let project_id = committed_project(&mut store);
        let month_id = store.project(&project_id).unwrap().month_ids[0].clone();

        let before = serde_json::to_string(&Document::from_store(&store, 0)).unwrap();
        {
            let oracle = CannedOracle::new();
            let mut planner = Planner::new(&mut store, &oracle);
            let preview = planner.month_plan_options(&project_id, &month_id).unwrap();
            assert_eq!(preview.options.len(), 2);
            // Dropped without committing.
        }
        let after = serde_json::to_string(&Document::from_store(&store, 0)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_preview_commit_applies_exactly_one_option() {
        let mut store = Store::seed();
        let project_id = committed_project(&mut store);
        let month_id = store.project(&project_id).unwrap().month_ids[0].clone();

        let oracle = CannedOracle::new();
        let mut planner = Planner::new(&mut store, &oracle);
        let preview = planner.month_plan_options(&project_id, &month_id).unwrap();
        let week_ids = planner.commit_plan_option(&preview, 1).unwrap();
        assert_eq!(week_ids.len(), 1);
        assert_eq!(store.week(&week_ids[0]).unwrap().theme, "Survey");
    }

    #[test]
    fn test_preview_commit_discarded_when_month_changed() {
        let mut store = Store::seed();
        let project_id = committed_project(&mut store);
        let month_id = store.project(&project_id).unwrap().month_ids[0].clone();

        let oracle = CannedOracle::new();
        let mut planner = Planner::new(&mut store, &oracle);
        let preview = planner.month_plan_options(&project_id, &month_id).unwrap();

        // The month is edited while the preview is open.
        planner
            .store
            .update_month(&month_id, Some("Edited".to_string()), None);

        let err = planner.commit_plan_option(&preview, 0).unwrap_err();
        assert!(matches!(err, Error::Stale(_)));
        // The edited theme survived; the preview did not overwrite it.
        assert_eq!(store.month(&month_id).unwrap().theme, "Edited");
    }

    #[test]
    fn test_adjust_weekly_plan_replaces_weeks() {
        let mut store = Store::seed();
        let project_id = committed_project(&mut store);
        let month_id = store.project(&project_id).unwrap().month_ids[0].clone();

        let oracle = CannedOracle::new();
        let mut planner = Planner::new(&mut store, &oracle);
        let week_ids = planner
            .adjust_weekly_plan(&project_id, &month_id, Difficulty::Hard)
            .unwrap();
        assert_eq!(week_ids.len(), 1);
        assert_eq!(store.week(&week_ids[0]).unwrap().theme, "Adjusted");
    }

    #[test]
    fn test_refine_three_year_vision_requires_draft() {
        let mut store = Store::seed();
        let project_id = committed_project(&mut store);
        let oracle = CannedOracle::new();
        let mut planner = Planner::new(&mut store, &oracle);

        let err = planner.refine_three_year_vision(&project_id).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        planner.expand_three_years(&project_id).unwrap();
        let refined = planner.refine_three_year_vision(&project_id).unwrap();
        assert_eq!(refined.ultimate_goal, "Expanded (refined)");
    }

    #[test]
    fn test_suggest_ideas_adds_entities() {
        let mut store = Store::seed();
        let oracle = CannedOracle::new();
        let mut planner = Planner::new(&mut store, &oracle);
        let ideas = planner.suggest_ideas().unwrap();
        assert_eq!(ideas.len(), 1);
        assert_eq!(store.counts().ideas, 2);
    }

    #[test]
    fn test_refine_idea_patches_fields() {
        let mut store = Store::seed();
        let idea_id = store.ideas().next().unwrap().id.clone();
        let oracle = CannedOracle::new();
        let mut planner = Planner::new(&mut store, &oracle);
        let refined = planner.refine_idea(&idea_id).unwrap();
        assert_eq!(refined.title, "Refined title");
        assert_eq!(refined.emoji.as_deref(), Some("\u{2728}"));
    }
}
