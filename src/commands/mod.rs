//! Command implementations for the SchemeLand CLI.
//!
//! Each command opens a `Workspace` (load document, register session,
//! rebuild the store), runs one operation, and saves. The save path is
//! where the conflict detector runs: externally-added projects are merged
//! additively, colliding changes warn, and lost ownership blocks the write.

use chrono::{Local, NaiveDate, Utc};
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::models::plan::Difficulty;
use crate::models::{IdeaStatus, ProjectSettings, TaskStatus};
use crate::ops::Planner;
use crate::oracle::ScriptedOracle;
use crate::persist::{Document, FileBackend, HttpBackend, PersistBackend};
use crate::session::{
    ConflictDetector, HttpSessionTransport, NullTransport, SaveDecision, SessionEvent,
    SessionTracker,
};
use crate::store::{EntityKind, IdeaPatch, NewIdea, Store};
use crate::{Error, Result};

/// A command result, renderable as JSON or for humans.
pub struct Output {
    pub json: serde_json::Value,
    pub human: String,
}

impl Output {
    fn new(json: serde_json::Value, human: impl Into<String>) -> Self {
        Self {
            json,
            human: human.into(),
        }
    }
}

/// What happened during a save.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Project ids merged in from another session
    pub merged_projects: Vec<String>,
    /// Advisory conflict warning, if any
    pub warning: Option<String>,
}

/// An open profile: store, backend, conflict detector, session tracker.
pub struct Workspace {
    pub profile: String,
    pub data_dir: PathBuf,
    pub config: Config,
    pub store: Store,
    backend: Box<dyn PersistBackend>,
    detector: ConflictDetector,
    tracker: SessionTracker,
}

impl Workspace {
    /// Open a profile: load config, read the sink, rebuild the store
    /// (seeding if the sink is empty), and register the session.
    pub fn open(profile: &str) -> Result<Self> {
        let data_dir = config::data_dir(profile)?;
        let config = Config::load(&data_dir)?;

        let (mut backend, mut tracker): (Box<dyn PersistBackend>, SessionTracker) =
            match &config.remote_url {
                Some(url) => (
                    Box::new(HttpBackend::new(url.clone())),
                    SessionTracker::new(Box::new(HttpSessionTransport::new(url.clone()))),
                ),
                None => (
                    Box::new(FileBackend::new(data_dir.join("store"))),
                    SessionTracker::new(Box::new(NullTransport)),
                ),
            };
        tracker.set_event_handler(Box::new(banner));

        let doc = backend.load()?;
        let mut detector = ConflictDetector::new();
        detector.note_loaded(&doc);

        let store = if doc.is_empty() {
            let mut store = Store::seed();
            store.mark_all();
            store
        } else {
            doc.into_store()
        };

        tracker.register();

        let mut ws = Self {
            profile: profile.to_string(),
            data_dir,
            config,
            store,
            backend,
            detector,
            tracker,
        };
        // A freshly seeded store is persisted right away so entity ids are
        // stable across invocations.
        if ws.store.is_dirty() {
            ws.save()?;
        }
        Ok(ws)
    }

    /// Persist pending changes, consulting the conflict detector first.
    /// A clean store is a no-op.
    pub fn save(&mut self) -> Result<SaveReport> {
        if !self.store.is_dirty() {
            return Ok(SaveReport::default());
        }

        let mut dirty = self.store.take_dirty();
        let remote = self.backend.load()?;
        let mut doc = Document::from_store(&self.store, 0);

        let mut report = SaveReport::default();
        match self.detector.assess(&remote, &doc, self.tracker.is_owner()) {
            SaveDecision::Clean => {}
            SaveDecision::Merge { project_ids } => {
                let merged =
                    ConflictDetector::merge_external_projects(&remote, &mut doc, &project_ids);
                self.tracker.notify(SessionEvent::MergedExternalProjects {
                    project_ids: merged.clone(),
                });
                // Merged entities may touch any slot; write them all.
                for slot in crate::persist::Slot::all() {
                    dirty.insert(*slot);
                }
                report.merged_projects = merged;
            }
            SaveDecision::Warn { reason } => {
                self.tracker.notify(SessionEvent::ConflictWarning {
                    reason: reason.clone(),
                });
                report.warning = Some(reason);
            }
            SaveDecision::Block => {
                self.tracker.notify_save_blocked();
                // The changes stay pending so a later save can retry.
                self.store.mark_all();
                return Err(Error::SaveBlocked);
            }
        }

        doc.revision = self.detector.next_revision(&remote);
        if let Err(e) = self.backend.save(&doc, &dirty) {
            self.store.mark_all();
            return Err(e);
        }
        self.detector.note_loaded(&doc);

        // Keep the in-memory store consistent with what was written.
        if !report.merged_projects.is_empty() {
            self.store = doc.into_store();
        }
        Ok(report)
    }

    /// Resolve the planning oracle: `SL_ORACLE` env var, then config.
    fn oracle(&self) -> Result<ScriptedOracle> {
        let path = match std::env::var("SL_ORACLE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => self.config.oracle_script.clone().ok_or_else(|| {
                Error::Config(
                    "no planning oracle configured; set SL_ORACLE or oracle_script in config.toml"
                        .to_string(),
                )
            })?,
        };
        ScriptedOracle::from_path(&path)
    }

    fn backend_location(&self) -> String {
        self.backend.location()
    }

    fn backend_type(&self) -> &'static str {
        self.backend.backend_type()
    }
}

/// Print a session event as a stderr banner.
fn banner(event: &SessionEvent) {
    match event {
        SessionEvent::OwnershipLost { owner_id } => {
            eprintln!(
                "Notice: another session owns storage ({})",
                owner_id.as_deref().unwrap_or("unknown")
            );
        }
        SessionEvent::SaveBlocked => {
            eprintln!("Warning: save blocked - another session owns storage");
        }
        SessionEvent::ConflictWarning { reason } => {
            eprintln!("Warning: {}; reload to pick up external changes", reason);
        }
        SessionEvent::MergedExternalProjects { project_ids } => {
            eprintln!(
                "Notice: merged {} project(s) added by another session",
                project_ids.len()
            );
        }
    }
}

// === System commands ===

pub fn system_init(profile: &str) -> Result<Output> {
    let data_dir = config::data_dir(profile)?;
    std::fs::create_dir_all(&data_dir)?;
    Config::write_default(&data_dir)?;

    let mut ws = Workspace::open(profile)?;
    ws.save()?;

    Ok(Output::new(
        serde_json::json!({
            "initialized": true,
            "profile": profile,
            "location": ws.backend_location(),
        }),
        format!(
            "Initialized profile '{}' at {}",
            profile,
            ws.backend_location()
        ),
    ))
}

pub fn system_info(profile: &str) -> Result<Output> {
    let ws = Workspace::open(profile)?;
    let counts = ws.store.counts();
    Ok(Output::new(
        serde_json::json!({
            "profile": profile,
            "backend": ws.backend_type(),
            "location": ws.backend_location(),
            "counts": counts,
            "active_project": ws.store.meta().active_project_id,
            "build": {
                "timestamp": env!("SL_BUILD_TIMESTAMP"),
                "commit": env!("SL_GIT_COMMIT"),
            },
        }),
        format!(
            "Profile '{}' on {} backend at {}\n  {} idea(s), {} project(s), {} month(s), {} week(s), {} task(s)",
            profile,
            ws.backend_type(),
            ws.backend_location(),
            counts.ideas,
            counts.projects,
            counts.months,
            counts.weeks,
            counts.tasks
        ),
    ))
}

// === Idea commands ===

pub fn idea_create(
    profile: &str,
    title: String,
    description: String,
    emoji: Option<String>,
) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    let idea = ws.store.add_idea(NewIdea {
        title,
        description,
        emoji,
    });
    ws.save()?;
    Ok(Output::new(
        serde_json::to_value(&idea)?,
        format!("Created idea {}: \"{}\"", idea.id, idea.title),
    ))
}

pub fn idea_list(profile: &str, status: Option<String>) -> Result<Output> {
    let ws = Workspace::open(profile)?;
    let filter: Option<IdeaStatus> = match status {
        Some(s) => Some(s.parse().map_err(Error::InvalidInput)?),
        None => None,
    };
    let ideas: Vec<_> = ws
        .store
        .ideas()
        .filter(|i| filter.map(|f| i.status == f).unwrap_or(true))
        .collect();

    let human = if ideas.is_empty() {
        "No ideas found.".to_string()
    } else {
        let mut lines = vec![format!("{} idea(s):", ideas.len())];
        for idea in &ideas {
            lines.push(format!("  [{}] {} {}", idea.status, idea.id, idea.title));
        }
        lines.join("\n")
    };
    Ok(Output::new(serde_json::json!({ "ideas": ideas }), human))
}

pub fn idea_show(profile: &str, id: &str) -> Result<Output> {
    let ws = Workspace::open(profile)?;
    let idea = ws
        .store
        .idea(id)
        .ok_or_else(|| Error::NotFound(format!("Idea not found: {}", id)))?;
    let analysis = idea
        .analysis_id
        .as_deref()
        .and_then(|aid| ws.store.analysis(aid));

    let mut human = format!("[{}] {} {}", idea.status, idea.id, idea.title);
    if !idea.description.is_empty() {
        human.push_str(&format!("\n  Description: {}", idea.description));
    }
    if let Some(analysis) = analysis {
        human.push_str(&format!(
            "\n  Analysis: feasibility {}, market {}, excitement {}, speed {}\n  {}",
            analysis.metrics.feasibility,
            analysis.metrics.market_potential,
            analysis.metrics.excitement,
            analysis.metrics.speed_to_mvp,
            analysis.one_liner
        ));
    }
    Ok(Output::new(
        serde_json::json!({ "idea": idea, "analysis": analysis }),
        human,
    ))
}

pub fn idea_update(
    profile: &str,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    emoji: Option<String>,
    status: Option<String>,
) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    if ws.store.idea(id).is_none() {
        return Err(Error::NotFound(format!("Idea not found: {}", id)));
    }
    let status = match status {
        Some(s) => Some(s.parse::<IdeaStatus>().map_err(Error::InvalidInput)?),
        None => None,
    };

    let mut updated_fields = Vec::new();
    if title.is_some() {
        updated_fields.push("title");
    }
    if description.is_some() {
        updated_fields.push("description");
    }
    if emoji.is_some() {
        updated_fields.push("emoji");
    }
    if status.is_some() {
        updated_fields.push("status");
    }

    ws.store.update_idea(
        id,
        IdeaPatch {
            title,
            description,
            emoji,
            status,
        },
    );
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": id, "updated_fields": updated_fields }),
        format!("Updated idea {} ({})", id, updated_fields.join(", ")),
    ))
}

pub fn idea_delete(profile: &str, id: &str) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    if ws.store.idea(id).is_none() {
        return Err(Error::NotFound(format!("Idea not found: {}", id)));
    }
    ws.store.delete_idea(id)?;
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": id, "deleted": true }),
        format!("Deleted idea {}", id),
    ))
}

pub fn idea_refine(profile: &str, id: &str) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    let oracle = ws.oracle()?;
    let refined = Planner::new(&mut ws.store, &oracle).refine_idea(id)?;
    ws.save()?;
    Ok(Output::new(
        serde_json::to_value(&refined)?,
        format!("Refined idea {}: \"{}\"", refined.id, refined.title),
    ))
}

pub fn idea_suggest(profile: &str) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    let oracle = ws.oracle()?;
    let ideas = Planner::new(&mut ws.store, &oracle).suggest_ideas()?;
    ws.save()?;
    let human = {
        let mut lines = vec![format!("Added {} suggested idea(s):", ideas.len())];
        for idea in &ideas {
            lines.push(format!("  {} {}", idea.id, idea.title));
        }
        lines.join("\n")
    };
    Ok(Output::new(serde_json::json!({ "ideas": ideas }), human))
}

// === Analysis ===

pub fn analyze(profile: &str) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    let oracle = ws.oracle()?;
    let analyses = Planner::new(&mut ws.store, &oracle).analyze_ideas()?;
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "analyses": analyses }),
        format!("Analyzed {} idea(s)", analyses.len()),
    ))
}

// === Project commands ===

pub fn project_commit(
    profile: &str,
    idea_id: &str,
    start: Option<String>,
    hardcore: bool,
) -> Result<Output> {
    let start_date = match start {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map_err(|_| Error::InvalidInput(format!("invalid start date: {}", raw)))?,
        None => Local::now().date_naive(),
    };

    let mut ws = Workspace::open(profile)?;
    let oracle = ws.oracle()?;
    let project_id = Planner::new(&mut ws.store, &oracle).commit_idea(
        idea_id,
        start_date,
        ProjectSettings {
            is_hardcore_mode: hardcore,
        },
    )?;
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": project_id, "idea_id": idea_id, "start_date": start_date }),
        format!("Committed idea {} to project {}", idea_id, project_id),
    ))
}

pub fn project_list(profile: &str) -> Result<Output> {
    let ws = Workspace::open(profile)?;
    let projects: Vec<_> = ws.store.projects().collect();
    let human = if projects.is_empty() {
        "No projects found.".to_string()
    } else {
        let mut lines = vec![format!("{} project(s):", projects.len())];
        for project in &projects {
            let active = ws.store.meta().active_project_id.as_deref() == Some(project.id.as_str());
            lines.push(format!(
                "  {}{} {} month(s), starts {}",
                project.id,
                if active { " (active)" } else { "" },
                project.month_ids.len(),
                project.start_date
            ));
        }
        lines.join("\n")
    };
    Ok(Output::new(serde_json::json!({ "projects": projects }), human))
}

pub fn project_show(profile: &str, id: Option<String>) -> Result<Output> {
    let ws = Workspace::open(profile)?;
    let id = match id.or_else(|| ws.store.meta().active_project_id.clone()) {
        Some(id) => id,
        None => {
            return Err(Error::InvalidInput(
                "no project id given and no active project".to_string(),
            ))
        }
    };
    let view = ws
        .store
        .project_view(&id)
        .ok_or_else(|| Error::NotFound(format!("Project not found: {}", id)))?;

    let progress = view.progress();
    let mut lines = vec![format!(
        "{} \"{}\" ({}/{} tasks done)",
        view.id, view.selected_idea.title, progress.completed_tasks, progress.total_tasks
    )];
    for month in &view.monthly_plan {
        lines.push(format!(
            "  Month {}: {} ({} week(s))",
            month.month.month,
            month.month.theme,
            month.detailed_plan.len()
        ));
        for week in &month.detailed_plan {
            lines.push(format!(
                "    Week {}: {} ({} task(s))",
                week.week.week_number,
                week.week.theme,
                week.tasks.len()
            ));
        }
    }
    Ok(Output::new(serde_json::to_value(&view)?, lines.join("\n")))
}

pub fn project_abandon(profile: &str, id: &str) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    ws.store.delete_project(id)?;
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": id, "abandoned": true }),
        format!("Abandoned project {}", id),
    ))
}

pub fn project_extend(profile: &str, id: &str) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    let oracle = ws.oracle()?;
    let month_ids = Planner::new(&mut ws.store, &oracle).extend_roadmap(id)?;
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": id, "new_month_ids": month_ids }),
        format!("Extended project {} by {} month(s)", id, month_ids.len()),
    ))
}

pub fn project_compress(profile: &str, id: &str, months: u32) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    let oracle = ws.oracle()?;
    let month_ids = Planner::new(&mut ws.store, &oracle).compress_roadmap(id, months)?;
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": id, "month_ids": month_ids }),
        format!("Compressed project {} to {} month(s)", id, months),
    ))
}

pub fn project_vision(profile: &str, id: &str, refine: bool) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    let oracle = ws.oracle()?;
    let mut planner = Planner::new(&mut ws.store, &oracle);
    let vision = if refine {
        planner.refine_three_year_vision(id)?
    } else {
        planner.expand_three_years(id)?
    };
    ws.save()?;
    Ok(Output::new(
        serde_json::to_value(&vision)?,
        format!(
            "{} three-year vision for {}: {}",
            if refine { "Refined" } else { "Expanded" },
            id,
            vision.ultimate_goal
        ),
    ))
}

// === Month commands ===

pub fn month_update(
    profile: &str,
    id: &str,
    theme: Option<String>,
    goals: Vec<String>,
) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    if ws.store.month(id).is_none() {
        return Err(Error::NotFound(format!("Month not found: {}", id)));
    }
    let goals = if goals.is_empty() { None } else { Some(goals) };
    ws.store.update_month(id, theme, goals);
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": id, "updated": true }),
        format!("Updated month {}", id),
    ))
}

pub fn month_init_weeks(profile: &str, id: &str) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    let week_ids = ws.store.initialize_month_weeks(id)?;
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": id, "week_ids": week_ids }),
        format!("Month {} has {} week(s)", id, week_ids.len()),
    ))
}

pub fn month_adjust(profile: &str, id: &str, difficulty: &str) -> Result<Output> {
    let difficulty: Difficulty = difficulty.parse().map_err(Error::InvalidInput)?;
    let mut ws = Workspace::open(profile)?;
    let project_id = ws
        .store
        .month_owner(id)
        .map(|p| p.id.clone())
        .ok_or_else(|| Error::NotFound(format!("Month not found in any project: {}", id)))?;
    let oracle = ws.oracle()?;
    let week_ids =
        Planner::new(&mut ws.store, &oracle).adjust_weekly_plan(&project_id, id, difficulty)?;
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": id, "week_ids": week_ids, "difficulty": difficulty }),
        format!("Re-planned month {} with {} week(s)", id, week_ids.len()),
    ))
}

pub fn month_options(profile: &str, id: &str, apply: Option<usize>) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    let project_id = ws
        .store
        .month_owner(id)
        .map(|p| p.id.clone())
        .ok_or_else(|| Error::NotFound(format!("Month not found in any project: {}", id)))?;
    let oracle = ws.oracle()?;
    let mut planner = Planner::new(&mut ws.store, &oracle);
    let preview = planner.month_plan_options(&project_id, id)?;

    match apply {
        Some(index) => {
            let week_ids = planner.commit_plan_option(&preview, index)?;
            let strategy = preview.options[index].strategy_name.clone();
            ws.save()?;
            Ok(Output::new(
                serde_json::json!({
                    "id": id,
                    "applied": strategy,
                    "week_ids": week_ids,
                }),
                format!("Applied strategy \"{}\" to month {}", strategy, id),
            ))
        }
        None => {
            // Preview only: the store stays untouched and nothing is saved.
            let mut lines = vec![format!("{} option(s) for month {}:", preview.options.len(), id)];
            for (i, option) in preview.options.iter().enumerate() {
                lines.push(format!(
                    "  [{}] {}: {} ({} week(s))",
                    i,
                    option.strategy_name,
                    option.description,
                    option.plan.len()
                ));
            }
            lines.push("Re-run with --apply <index> to commit one.".to_string());
            Ok(Output::new(
                serde_json::json!({ "id": id, "options": preview.options }),
                lines.join("\n"),
            ))
        }
    }
}

// === Week commands ===

pub fn week_update(profile: &str, id: &str, theme: String) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    if ws.store.week(id).is_none() {
        return Err(Error::NotFound(format!("Week not found: {}", id)));
    }
    ws.store.update_week_theme(id, theme);
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": id, "updated": true }),
        format!("Updated week {}", id),
    ))
}

// === Task commands ===

pub fn task_add(
    profile: &str,
    week_id: &str,
    text: String,
    priority: Option<u8>,
) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    let task = ws.store.add_task(week_id, text, priority)?;
    ws.save()?;
    Ok(Output::new(
        serde_json::to_value(&task)?,
        format!("Created task {} in week {}", task.id, week_id),
    ))
}

pub fn task_update(profile: &str, id: &str, text: String) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    if ws.store.task(id).is_none() {
        return Err(Error::NotFound(format!("Task not found: {}", id)));
    }
    ws.store.update_task_text(id, text);
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": id, "updated_fields": ["text"] }),
        format!("Updated task {}", id),
    ))
}

pub fn task_status(profile: &str, id: &str, status: &str) -> Result<Output> {
    let status: TaskStatus = status.parse().map_err(Error::InvalidInput)?;
    let mut ws = Workspace::open(profile)?;
    if ws.store.task(id).is_none() {
        return Err(Error::NotFound(format!("Task not found: {}", id)));
    }
    ws.store.set_task_status(id, status);
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": id, "status": status }),
        format!("Task {} is now {}", id, status),
    ))
}

pub fn task_move(profile: &str, id: &str, from: &str, to: &str) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    ws.store.move_task(id, from, to)?;
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": id, "from": from, "to": to }),
        format!("Moved task {} from {} to {}", id, from, to),
    ))
}

pub fn task_delete(profile: &str, id: &str) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    ws.store.delete_task(id)?;
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "id": id, "deleted": true }),
        format!("Deleted task {}", id),
    ))
}

// === Generic show ===

pub fn show(profile: &str, id: &str) -> Result<Output> {
    let kind = crate::store::entity_kind(id)
        .ok_or_else(|| Error::InvalidId(format!("unrecognized id prefix: {}", id)))?;
    let prefix = id.split('-').next().unwrap_or_default();
    crate::store::validate_id(id, prefix)?;
    let ws = Workspace::open(profile)?;

    let json = match kind {
        EntityKind::Idea => ws.store.idea(id).map(|e| serde_json::to_value(e)),
        EntityKind::Analysis => ws.store.analysis(id).map(|e| serde_json::to_value(e)),
        EntityKind::Project => ws.store.project(id).map(|e| serde_json::to_value(e)),
        EntityKind::Month => ws.store.month(id).map(|e| serde_json::to_value(e)),
        EntityKind::Week => ws.store.week(id).map(|e| serde_json::to_value(e)),
        EntityKind::Task => ws.store.task(id).map(|e| serde_json::to_value(e)),
    };
    let json = json
        .transpose()?
        .ok_or_else(|| Error::NotFound(format!("Entity not found: {}", id)))?;
    let human = serde_json::to_string_pretty(&json)?;
    Ok(Output::new(json, human))
}

// === Doctor ===

pub fn doctor(profile: &str, dry_run: bool) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    let report = ws.store.repair(dry_run);
    if !dry_run {
        ws.save()?;
    }

    let human = if report.is_clean() {
        "No problems found.".to_string()
    } else {
        let mut lines = vec![format!(
            "{}{} dangling reference(s), {} orphan(s), {} corrupted field(s)",
            if dry_run { "[dry run] " } else { "" },
            report.removed_references,
            report.removed_orphans,
            report.repaired_fields
        )];
        for warning in &report.warnings {
            lines.push(format!("  warning: {}", warning));
        }
        lines.join("\n")
    };
    Ok(Output::new(
        serde_json::json!({ "dry_run": dry_run, "report": report }),
        human,
    ))
}

// === Timer ===

pub fn timer_start(profile: &str) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    let mut timer = ws.store.meta().focus_timer.clone().unwrap_or_default();
    if !timer.running {
        timer.running = true;
        timer.started_at = Some(Utc::now());
    }
    ws.store.set_focus_timer(Some(timer));
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "running": true }),
        "Focus timer running".to_string(),
    ))
}

pub fn timer_pause(profile: &str) -> Result<Output> {
    let mut ws = Workspace::open(profile)?;
    let mut timer = ws.store.meta().focus_timer.clone().unwrap_or_default();
    if timer.running {
        if let Some(started) = timer.started_at {
            let elapsed = (Utc::now() - started).num_seconds().max(0) as u64;
            timer.accumulated_secs += elapsed;
        }
        timer.running = false;
        timer.started_at = None;
    }
    let banked = timer.accumulated_secs;
    ws.store.set_focus_timer(Some(timer));
    ws.save()?;
    Ok(Output::new(
        serde_json::json!({ "running": false, "accumulated_secs": banked }),
        format!("Focus timer paused ({}s banked)", banked),
    ))
}

pub fn timer_status(profile: &str) -> Result<Output> {
    let ws = Workspace::open(profile)?;
    let timer = ws.store.meta().focus_timer.clone().unwrap_or_default();
    let mut total = timer.accumulated_secs;
    if timer.running {
        if let Some(started) = timer.started_at {
            total += (Utc::now() - started).num_seconds().max(0) as u64;
        }
    }
    Ok(Output::new(
        serde_json::json!({ "running": timer.running, "total_secs": total }),
        format!(
            "Focus timer {} ({}s total)",
            if timer.running { "running" } else { "paused" },
            total
        ),
    ))
}

// === Session ===

pub fn session_status(profile: &str) -> Result<Output> {
    let ws = Workspace::open(profile)?;
    let state = format!("{:?}", ws.tracker.state()).to_lowercase();
    Ok(Output::new(
        serde_json::json!({
            "session_id": ws.tracker.session_id(),
            "state": state,
            "backend": ws.backend_type(),
        }),
        format!(
            "Session {} is {} on {} backend",
            ws.tracker.session_id(),
            state,
            ws.backend_type()
        ),
    ))
}

// === Serve ===

#[cfg(feature = "server")]
pub fn serve(profile: &str, port: Option<u16>, host: &str) -> Result<Output> {
    let data_dir = config::data_dir(profile)?;
    let config = Config::load(&data_dir)?;
    let port = port.unwrap_or(config.server_port);
    let heartbeat_secs = config.heartbeat_secs;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime
        .block_on(crate::server::start_server(
            &data_dir,
            port,
            host,
            heartbeat_secs,
        ))
        .map_err(|e| Error::Other(format!("server error: {}", e)))?;

    Ok(Output::new(
        serde_json::json!({ "stopped": true }),
        "Server stopped".to_string(),
    ))
}
