//! Scan-and-repair pass for corrupted store state.
//!
//! Corruption here means dangling id references (a parent list entry whose
//! entity is missing), orphaned child entities (present in a dictionary but
//! referenced by no parent), or pathological repeated-character text fields.
//! Repair is a recovery path, not an error path: damaged references are
//! dropped, orphans are removed, and corrupted text is replaced with a safe
//! placeholder. Problems that cannot be fixed mechanically are reported as
//! warnings and left alone.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::persist::Slot;

use super::Store;

/// Replacement for text fields that failed the corruption scan.
const RECOVERED_PLACEHOLDER: &str = "[recovered]";

/// A text run of this many identical characters marks the field corrupted.
const REPEAT_RUN_LIMIT: usize = 10;

/// Outcome of a repair pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    /// Dangling ids removed from parent lists
    pub removed_references: usize,
    /// Orphaned months/weeks/tasks removed from their dictionaries
    pub removed_orphans: usize,
    /// Text fields replaced with the placeholder
    pub repaired_fields: usize,
    /// Problems found but not mechanically fixable
    pub warnings: Vec<String>,
}

impl RepairReport {
    /// Whether the scan found nothing to do.
    pub fn is_clean(&self) -> bool {
        self.removed_references == 0
            && self.removed_orphans == 0
            && self.repaired_fields == 0
            && self.warnings.is_empty()
    }
}

/// Returns true for pathological repeated-character strings.
fn looks_corrupted(text: &str) -> bool {
    let mut run = 0usize;
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if c.is_whitespace() {
            prev = None;
            run = 0;
            continue;
        }
        if Some(c) == prev {
            run += 1;
            if run >= REPEAT_RUN_LIMIT {
                return true;
            }
        } else {
            prev = Some(c);
            run = 1;
        }
    }
    false
}

/// Repair a text field in place, counting the fix.
fn repair_text(text: &mut String, field: &str, report: &mut RepairReport, dry_run: bool) {
    if looks_corrupted(text) {
        report.repaired_fields += 1;
        report
            .warnings
            .push(format!("repaired corrupted text in {}", field));
        if !dry_run {
            *text = RECOVERED_PLACEHOLDER.to_string();
        }
    }
}

impl Store {
    /// Scan the whole store and repair what can be repaired.
    ///
    /// With `dry_run` the report describes what would change but the store
    /// is left untouched.
    pub fn repair(&mut self, dry_run: bool) -> RepairReport {
        let mut report = RepairReport::default();

        // Pass 1: drop dangling ids from ownership lists.
        let month_ids: BTreeSet<String> = self.months.keys().cloned().collect();
        let week_ids: BTreeSet<String> = self.weeks.keys().cloned().collect();
        let task_ids: BTreeSet<String> = self.tasks.keys().cloned().collect();

        for project in self.projects.values_mut() {
            let before = project.month_ids.len();
            if dry_run {
                report.removed_references += project
                    .month_ids
                    .iter()
                    .filter(|id| !month_ids.contains(*id))
                    .count();
            } else {
                project.month_ids.retain(|id| month_ids.contains(id));
                if project.month_ids.len() != before {
                    report.removed_references += before - project.month_ids.len();
                    project.touch();
                    self.dirty.insert(Slot::Projects);
                }
            }
        }

        for month in self.months.values_mut() {
            let before = month.week_ids.len();
            if dry_run {
                report.removed_references += month
                    .week_ids
                    .iter()
                    .filter(|id| !week_ids.contains(*id))
                    .count();
            } else {
                month.week_ids.retain(|id| week_ids.contains(id));
                if month.week_ids.len() != before {
                    report.removed_references += before - month.week_ids.len();
                    month.touch();
                    self.dirty.insert(Slot::Months);
                }
            }
        }

        for week in self.weeks.values_mut() {
            let before = week.task_ids.len();
            if dry_run {
                report.removed_references += week
                    .task_ids
                    .iter()
                    .filter(|id| !task_ids.contains(*id))
                    .count();
            } else {
                week.task_ids.retain(|id| task_ids.contains(id));
                if week.task_ids.len() != before {
                    report.removed_references += before - week.task_ids.len();
                    week.touch();
                    self.dirty.insert(Slot::Weeks);
                }
            }
        }

        // Pass 2: remove orphaned children no parent list points at.
        let owned_months: BTreeSet<&String> = self
            .projects
            .values()
            .flat_map(|p| p.month_ids.iter())
            .collect();
        let orphan_months: Vec<String> = self
            .months
            .keys()
            .filter(|id| !owned_months.contains(id))
            .cloned()
            .collect();

        let owned_weeks: BTreeSet<&String> = self
            .months
            .values()
            .filter(|m| !orphan_months.contains(&m.id))
            .flat_map(|m| m.week_ids.iter())
            .collect();
        let orphan_weeks: Vec<String> = self
            .weeks
            .keys()
            .filter(|id| !owned_weeks.contains(id))
            .cloned()
            .collect();

        let owned_tasks: BTreeSet<&String> = self
            .weeks
            .values()
            .filter(|w| !orphan_weeks.contains(&w.id))
            .flat_map(|w| w.task_ids.iter())
            .collect();
        let orphan_tasks: Vec<String> = self
            .tasks
            .keys()
            .filter(|id| !owned_tasks.contains(id))
            .cloned()
            .collect();

        report.removed_orphans = orphan_months.len() + orphan_weeks.len() + orphan_tasks.len();
        if !dry_run {
            for id in &orphan_months {
                self.months.remove(id);
                self.dirty.insert(Slot::Months);
            }
            for id in &orphan_weeks {
                self.weeks.remove(id);
                self.dirty.insert(Slot::Weeks);
            }
            for id in &orphan_tasks {
                self.tasks.remove(id);
                self.dirty.insert(Slot::Tasks);
            }
        }

        // Pass 3: replace pathological text fields.
        for idea in self.ideas.values_mut() {
            let before = report.repaired_fields;
            repair_text(
                &mut idea.title,
                &format!("idea {} title", idea.id),
                &mut report,
                dry_run,
            );
            repair_text(
                &mut idea.description,
                &format!("idea {} description", idea.id),
                &mut report,
                dry_run,
            );
            if report.repaired_fields != before && !dry_run {
                idea.touch();
                self.dirty.insert(Slot::Ideas);
            }
        }
        for month in self.months.values_mut() {
            let before = report.repaired_fields;
            repair_text(
                &mut month.theme,
                &format!("month {} theme", month.id),
                &mut report,
                dry_run,
            );
            for goal in month.goals.iter_mut() {
                repair_text(goal, &format!("month {} goal", month.id), &mut report, dry_run);
            }
            if report.repaired_fields != before && !dry_run {
                month.touch();
                self.dirty.insert(Slot::Months);
            }
        }
        for week in self.weeks.values_mut() {
            let before = report.repaired_fields;
            repair_text(
                &mut week.theme,
                &format!("week {} theme", week.id),
                &mut report,
                dry_run,
            );
            if report.repaired_fields != before && !dry_run {
                week.touch();
                self.dirty.insert(Slot::Weeks);
            }
        }
        for task in self.tasks.values_mut() {
            let before = report.repaired_fields;
            repair_text(
                &mut task.text,
                &format!("task {} text", task.id),
                &mut report,
                dry_run,
            );
            if report.repaired_fields != before && !dry_run {
                task.touch();
                self.dirty.insert(Slot::Tasks);
            }
        }

        // Root references that cannot be mended mechanically.
        for project in self.projects.values() {
            if !self.ideas.contains_key(&project.idea_id) {
                report.warnings.push(format!(
                    "project {} references missing idea {} (not repairable)",
                    project.id, project.idea_id
                ));
            }
            if !self.analyses.contains_key(&project.analysis_id) {
                report.warnings.push(format!(
                    "project {} references missing analysis {} (not repairable)",
                    project.id, project.analysis_id
                ));
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_fixtures::committed_project;
    use crate::store::Store;

    #[test]
    fn test_looks_corrupted() {
        assert!(looks_corrupted("aaaaaaaaaaaaaa"));
        assert!(looks_corrupted("prefix zzzzzzzzzzzz suffix"));
        assert!(!looks_corrupted("A normal week theme"));
        assert!(!looks_corrupted(""));
        // Whitespace breaks runs.
        assert!(!looks_corrupted("a a a a a a a a a a a a"));
    }

    #[test]
    fn test_repair_clean_store_is_noop() {
        let mut store = Store::seed();
        committed_project(&mut store);
        let report = store.repair(false);
        assert!(report.is_clean(), "unexpected findings: {:?}", report);
    }

    #[test]
    fn test_repair_drops_dangling_week_reference() {
        let mut store = Store::seed();
        let project_id = committed_project(&mut store);
        let month_id = store.project(&project_id).unwrap().month_ids[0].clone();
        let week_id = store.month(&month_id).unwrap().week_ids[0].clone();
        // Remove the entity but leave the reference: dangling.
        let task_count = store.week(&week_id).unwrap().task_ids.len();
        store.weeks.remove(&week_id);

        let report = store.repair(false);
        assert_eq!(report.removed_references, 1);
        // The dropped week's tasks became orphans and were removed too.
        assert_eq!(report.removed_orphans, task_count);
        assert!(!store.month(&month_id).unwrap().week_ids.contains(&week_id));
        assert!(store.verify_integrity().is_empty());
    }

    #[test]
    fn test_repair_dry_run_leaves_store_unchanged() {
        let mut store = Store::seed();
        let project_id = committed_project(&mut store);
        let month_id = store.project(&project_id).unwrap().month_ids[0].clone();
        let week_id = store.month(&month_id).unwrap().week_ids[0].clone();
        store.weeks.remove(&week_id);

        let report = store.repair(true);
        assert!(report.removed_references > 0);
        // Reference still dangling: dry run fixed nothing.
        assert!(store.month(&month_id).unwrap().week_ids.contains(&week_id));
    }

    #[test]
    fn test_repair_replaces_corrupted_text() {
        let mut store = Store::seed();
        let project_id = committed_project(&mut store);
        let month_id = store.project(&project_id).unwrap().month_ids[0].clone();
        store
            .months
            .get_mut(&month_id)
            .unwrap()
            .theme = "QQQQQQQQQQQQQQQQQQQQ".to_string();

        let report = store.repair(false);
        assert_eq!(report.repaired_fields, 1);
        assert_eq!(store.month(&month_id).unwrap().theme, RECOVERED_PLACEHOLDER);
    }

    #[test]
    fn test_repair_reports_unfixable_root_reference() {
        let mut store = Store::seed();
        let project_id = committed_project(&mut store);
        let idea_id = store.project(&project_id).unwrap().idea_id.clone();
        store.ideas.remove(&idea_id);
        // Keep the invariant that at least one idea exists.
        store.add_idea(crate::store::NewIdea {
            title: "Replacement".to_string(),
            description: "Stand-in idea".to_string(),
            emoji: None,
        });

        let report = store.repair(false);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("missing idea")));
    }
}
