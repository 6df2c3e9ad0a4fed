//! A planning oracle that replays canned responses from a JSON script.
//!
//! This is the dev and test oracle: deterministic, offline, and cheap. The
//! script is a single JSON document with one optional entry per operation;
//! calling an operation whose entry is missing fails the same way a network
//! oracle failure would, which keeps the error path honest.

use serde::Deserialize;
use std::path::Path;

use crate::models::plan::{
    AnalysisResult, Difficulty, FullPlan, IdeaDraft, MonthPlan, StrategyOption, WeekPlan,
};
use crate::models::{AnalysisMetrics, Idea, MonthlyGoal, ThreeYearVision, YearlyPlan};
use crate::{Error, Result};

use super::PlanningOracle;

/// One canned analysis, paired positionally with the input ideas.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptedAnalysis {
    pub metrics: AnalysisMetrics,
    pub reasoning: String,
    pub one_liner: String,
}

/// The parsed script document. Every entry is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptDoc {
    analyze: Option<Vec<ScriptedAnalysis>>,
    full_plan: Option<FullPlan>,
    refine_idea: Option<IdeaDraft>,
    suggest_ideas: Option<Vec<IdeaDraft>>,
    adjust_weekly_plan: Option<Vec<WeekPlan>>,
    three_year_vision: Option<ThreeYearVision>,
    month_plan_options: Option<Vec<StrategyOption>>,
    extend_roadmap: Option<Vec<MonthPlan>>,
    compress_roadmap: Option<Vec<MonthPlan>>,
}

/// Oracle backed by a JSON script file.
pub struct ScriptedOracle {
    doc: ScriptDoc,
    location: String,
}

impl ScriptedOracle {
    /// Load a script from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Oracle(format!("cannot read oracle script {}: {}", path.display(), e))
        })?;
        let doc: ScriptDoc = serde_json::from_str(&raw).map_err(|e| {
            Error::Oracle(format!("invalid oracle script {}: {}", path.display(), e))
        })?;
        Ok(Self {
            doc,
            location: path.display().to_string(),
        })
    }

    fn missing(&self, entry: &str) -> Error {
        Error::Oracle(format!(
            "script {} has no '{}' entry",
            self.location, entry
        ))
    }
}

impl PlanningOracle for ScriptedOracle {
    fn analyze(&self, ideas: &[Idea]) -> Result<Vec<AnalysisResult>> {
        let entries = self
            .doc
            .analyze
            .as_ref()
            .ok_or_else(|| self.missing("analyze"))?;
        if entries.is_empty() {
            return Err(Error::Oracle(format!(
                "script {} 'analyze' entry is empty",
                self.location
            )));
        }
        // Pair positionally; a short script repeats its last entry.
        Ok(ideas
            .iter()
            .enumerate()
            .map(|(i, idea)| {
                let entry = &entries[i.min(entries.len() - 1)];
                AnalysisResult {
                    idea_id: idea.id.clone(),
                    metrics: entry.metrics.clone(),
                    reasoning: entry.reasoning.clone(),
                    one_liner: entry.one_liner.clone(),
                }
            })
            .collect())
    }

    fn generate_full_plan(&self, _idea: &Idea, _analysis_reasoning: &str) -> Result<FullPlan> {
        self.doc
            .full_plan
            .clone()
            .ok_or_else(|| self.missing("fullPlan"))
    }

    fn refine_idea(&self, _raw_text: &str) -> Result<IdeaDraft> {
        self.doc
            .refine_idea
            .clone()
            .ok_or_else(|| self.missing("refineIdea"))
    }

    fn suggest_ideas(&self) -> Result<Vec<IdeaDraft>> {
        self.doc
            .suggest_ideas
            .clone()
            .ok_or_else(|| self.missing("suggestIdeas"))
    }

    fn adjust_weekly_plan(
        &self,
        _idea: &Idea,
        _month_theme: &str,
        _difficulty: Difficulty,
    ) -> Result<Vec<WeekPlan>> {
        self.doc
            .adjust_weekly_plan
            .clone()
            .ok_or_else(|| self.missing("adjustWeeklyPlan"))
    }

    fn expand_to_three_years(
        &self,
        _idea: &Idea,
        _current_vision: &YearlyPlan,
    ) -> Result<ThreeYearVision> {
        self.doc
            .three_year_vision
            .clone()
            .ok_or_else(|| self.missing("threeYearVision"))
    }

    fn refine_three_year_vision(
        &self,
        _idea: &Idea,
        _draft: &ThreeYearVision,
    ) -> Result<ThreeYearVision> {
        self.doc
            .three_year_vision
            .clone()
            .ok_or_else(|| self.missing("threeYearVision"))
    }

    fn generate_month_plan_options(
        &self,
        _idea: &Idea,
        _month_goal: &MonthlyGoal,
    ) -> Result<Vec<StrategyOption>> {
        self.doc
            .month_plan_options
            .clone()
            .ok_or_else(|| self.missing("monthPlanOptions"))
    }

    fn extend_roadmap(&self, _idea: &Idea, _last_month: u32) -> Result<Vec<MonthPlan>> {
        self.doc
            .extend_roadmap
            .clone()
            .ok_or_else(|| self.missing("extendRoadmap"))
    }

    fn compress_roadmap(
        &self,
        _idea: &Idea,
        _current_plan: &[MonthPlan],
        target_months: u32,
    ) -> Result<Vec<MonthPlan>> {
        let plans = self
            .doc
            .compress_roadmap
            .clone()
            .ok_or_else(|| self.missing("compressRoadmap"))?;
        if plans.len() != target_months as usize {
            return Err(Error::Oracle(format!(
                "script {} 'compressRoadmap' has {} months, expected {}",
                self.location,
                plans.len(),
                target_months
            )));
        }
        Ok(plans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_script(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_entry_is_oracle_error() {
        let file = write_script("{}");
        let oracle = ScriptedOracle::from_path(file.path()).unwrap();
        let err = oracle.suggest_ideas().unwrap_err();
        assert!(matches!(err, Error::Oracle(_)));
    }

    #[test]
    fn test_invalid_script_is_oracle_error() {
        let file = write_script("not json");
        assert!(matches!(
            ScriptedOracle::from_path(file.path()),
            Err(Error::Oracle(_))
        ));
    }

    #[test]
    fn test_analyze_pairs_positionally_and_repeats_last() {
        let file = write_script(
            r#"{"analyze": [
                {"metrics": {"feasibility": 80, "marketPotential": 60, "excitement": 70, "speedToMVP": 90},
                 "reasoning": "first", "oneLiner": "one"},
                {"metrics": {"feasibility": 40, "marketPotential": 50, "excitement": 30, "speedToMVP": 20},
                 "reasoning": "second", "oneLiner": "two"}
            ]}"#,
        );
        let oracle = ScriptedOracle::from_path(file.path()).unwrap();
        let ideas = vec![
            Idea::new("sli-000001".into(), "A".into(), "Alpha idea".into()),
            Idea::new("sli-000002".into(), "B".into(), "Beta idea".into()),
            Idea::new("sli-000003".into(), "C".into(), "Gamma idea".into()),
        ];
        let results = oracle.analyze(&ideas).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].idea_id, "sli-000001");
        assert_eq!(results[0].reasoning, "first");
        assert_eq!(results[1].reasoning, "second");
        // Third idea reuses the last canned entry.
        assert_eq!(results[2].reasoning, "second");
    }

    #[test]
    fn test_compress_length_mismatch_rejected() {
        let file = write_script(
            r#"{"compressRoadmap": [{"month": 1, "theme": "Only one", "goals": []}]}"#,
        );
        let oracle = ScriptedOracle::from_path(file.path()).unwrap();
        let idea = Idea::new("sli-000001".into(), "A".into(), "Alpha idea".into());
        assert!(oracle.compress_roadmap(&idea, &[], 2).is_err());
        assert!(oracle.compress_roadmap(&idea, &[], 1).is_ok());
    }
}
