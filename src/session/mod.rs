//! Multi-session conflict detection and advisory write ownership.
//!
//! The durable sink is shared between sessions with no transactional
//! guarantee; this module is the entirety of the concurrency discipline
//! applied to it. Two cooperating pieces:
//!
//! - `SessionTracker`: a per-process state machine (`Checking -> Owner` or
//!   `Checking -> NonOwner`) driven by register/heartbeat calls against a
//!   session endpoint. Transport failures are benign: the session assumes
//!   ownership on error, preferring availability over strict exclusivity.
//! - `ConflictDetector`: compares the sink's revision and entity timestamps
//!   against what this session last loaded and classifies the next save as
//!   clean, additively mergeable, advisory-warn, or blocked.
//!
//! Outcomes are advisory except for ownership loss: a save issued after the
//! heartbeat reveals another owner is flagged blocked and surfaced through
//! the event callback. Concurrent writers can still lose data at the slot
//! level; that is a documented product decision, not a bug.

pub mod http;

pub use http::HttpSessionTransport;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::persist::Document;
use crate::Result;

/// Session endpoint actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    Register,
    Heartbeat,
}

/// Request body for `POST /api/session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub session_id: String,
    pub action: SessionAction,
}

/// Reply body from the session endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReply {
    pub is_owner: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_connected_at: Option<DateTime<Utc>>,
}

/// Request body for `DELETE /api/session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRelease {
    pub session_id: String,
}

/// Transport for the session-ownership endpoint.
pub trait SessionTransport {
    fn register(&self, session_id: &str) -> Result<SessionReply>;
    fn heartbeat(&self, session_id: &str) -> Result<SessionReply>;
    fn release(&self, session_id: &str) -> Result<()>;
}

/// Transport for purely local sinks: ownership is always granted.
#[derive(Debug, Default)]
pub struct NullTransport;

impl SessionTransport for NullTransport {
    fn register(&self, session_id: &str) -> Result<SessionReply> {
        Ok(SessionReply {
            is_owner: true,
            owner_id: Some(session_id.to_string()),
            owner_connected_at: None,
        })
    }

    fn heartbeat(&self, session_id: &str) -> Result<SessionReply> {
        self.register(session_id)
    }

    fn release(&self, _session_id: &str) -> Result<()> {
        Ok(())
    }
}

/// Per-session ownership state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Registration in flight or not yet attempted
    Checking,
    /// This session is authoritative for writes
    Owner,
    /// Another session answered first
    NonOwner,
}

/// Events surfaced to the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Heartbeat revealed another owner took over
    OwnershipLost { owner_id: Option<String> },
    /// A save was refused because ownership was lost
    SaveBlocked,
    /// The sink changed externally in a way that may collide
    ConflictWarning { reason: String },
    /// Externally-added projects were merged into the local copy
    MergedExternalProjects { project_ids: Vec<String> },
}

type EventHandler = Box<dyn Fn(&SessionEvent)>;

/// The per-process session state machine.
pub struct SessionTracker {
    session_id: String,
    state: SessionState,
    transport: Box<dyn SessionTransport>,
    on_event: Option<EventHandler>,
}

impl SessionTracker {
    /// Create a tracker with a fresh session id.
    pub fn new(transport: Box<dyn SessionTransport>) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            state: SessionState::Checking,
            transport,
            on_event: None,
        }
    }

    /// Create a tracker with an explicit session id.
    pub fn with_session_id(session_id: String, transport: Box<dyn SessionTransport>) -> Self {
        Self {
            session_id,
            state: SessionState::Checking,
            transport,
            on_event: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_owner(&self) -> bool {
        self.state == SessionState::Owner
    }

    /// Install the event callback used for banners and save-blocked notices.
    pub fn set_event_handler(&mut self, handler: EventHandler) {
        self.on_event = Some(handler);
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(handler) = &self.on_event {
            handler(&event);
        }
    }

    /// Register with the session endpoint. On transport failure the session
    /// optimistically assumes ownership.
    pub fn register(&mut self) {
        match self.transport.register(&self.session_id) {
            Ok(reply) if reply.is_owner => self.state = SessionState::Owner,
            Ok(reply) => {
                self.state = SessionState::NonOwner;
                self.emit(SessionEvent::OwnershipLost {
                    owner_id: reply.owner_id,
                });
            }
            Err(_) => self.state = SessionState::Owner,
        }
    }

    /// Send a heartbeat. An owner that learns another session took over
    /// drops to non-owner and emits `OwnershipLost`.
    pub fn heartbeat(&mut self) {
        match self.transport.heartbeat(&self.session_id) {
            Ok(reply) if reply.is_owner => self.state = SessionState::Owner,
            Ok(reply) => {
                let was_owner = self.state == SessionState::Owner;
                self.state = SessionState::NonOwner;
                if was_owner {
                    self.emit(SessionEvent::OwnershipLost {
                        owner_id: reply.owner_id,
                    });
                }
            }
            Err(_) => {
                // Benign: keep whatever we believed before, defaulting to
                // ownership if we never established anything.
                if self.state == SessionState::Checking {
                    self.state = SessionState::Owner;
                }
            }
        }
    }

    /// Manual retry for a non-owner that believes the prior owner is gone.
    /// Never polls automatically, to avoid takeover oscillation.
    pub fn request_promotion(&mut self) -> bool {
        self.register();
        self.is_owner()
    }

    /// Release ownership, best-effort.
    pub fn release(&mut self) {
        let _ = self.transport.release(&self.session_id);
        self.state = SessionState::Checking;
    }

    /// Notify the UI that a save was blocked.
    pub fn notify_save_blocked(&self) {
        self.emit(SessionEvent::SaveBlocked);
    }

    /// Notify the UI of a conflict outcome.
    pub fn notify(&self, event: SessionEvent) {
        self.emit(event);
    }
}

impl Drop for SessionTracker {
    fn drop(&mut self) {
        // Best-effort release, the endpoint equivalent of beforeunload.
        if self.state == SessionState::Owner {
            let _ = self.transport.release(&self.session_id);
        }
    }
}

/// Decision for the next save against the shared sink.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveDecision {
    /// The sink is exactly as this session last saw it
    Clean,
    /// Externally-added projects can be merged additively before the write
    Merge { project_ids: Vec<String> },
    /// The external change may collide; warn, but let the write proceed
    Warn { reason: String },
    /// Ownership was lost; the save is flagged blocked
    Block,
}

/// Detects external mutation of the sink between this session's last read
/// and its next write.
#[derive(Debug, Default)]
pub struct ConflictDetector {
    last_revision: u64,
    /// Every entity id this session has seen, with its update timestamp.
    seen: HashMap<String, DateTime<Utc>>,
}

impl ConflictDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the document this session just loaded.
    pub fn note_loaded(&mut self, doc: &Document) {
        self.last_revision = doc.revision;
        self.seen.clear();
        for (id, e) in &doc.ideas {
            self.seen.insert(id.clone(), e.updated_at);
        }
        for (id, e) in &doc.analyses {
            self.seen.insert(id.clone(), e.updated_at);
        }
        for (id, e) in &doc.projects {
            self.seen.insert(id.clone(), e.updated_at);
        }
        for (id, e) in &doc.months {
            self.seen.insert(id.clone(), e.updated_at);
        }
        for (id, e) in &doc.weeks {
            self.seen.insert(id.clone(), e.updated_at);
        }
        for (id, e) in &doc.tasks {
            self.seen.insert(id.clone(), e.updated_at);
        }
    }

    /// The revision the next save should carry.
    pub fn next_revision(&self, remote: &Document) -> u64 {
        remote.revision.max(self.last_revision) + 1
    }

    /// Classify the next save given the sink's current contents and the
    /// local document about to be written.
    pub fn assess(&self, remote: &Document, local: &Document, session_is_owner: bool) -> SaveDecision {
        if !session_is_owner {
            return SaveDecision::Block;
        }
        if remote.revision == self.last_revision {
            return SaveDecision::Clean;
        }

        // Something else wrote since we loaded. Externally-added projects
        // that collide with nothing locally are merged additively; anything
        // touching entities we know about is only worth a warning.
        let mut remote_ids: HashSet<&String> = HashSet::new();
        let mut touched_known = false;

        let visit = |id: &String, updated_at: DateTime<Utc>, touched: &mut bool| {
            if let Some(seen_at) = self.seen.get(id) {
                if *seen_at != updated_at {
                    *touched = true;
                }
            }
        };
        for (id, e) in &remote.ideas {
            remote_ids.insert(id);
            visit(id, e.updated_at, &mut touched_known);
        }
        for (id, e) in &remote.analyses {
            remote_ids.insert(id);
            visit(id, e.updated_at, &mut touched_known);
        }
        for (id, e) in &remote.projects {
            remote_ids.insert(id);
            visit(id, e.updated_at, &mut touched_known);
        }
        for (id, e) in &remote.months {
            remote_ids.insert(id);
            visit(id, e.updated_at, &mut touched_known);
        }
        for (id, e) in &remote.weeks {
            remote_ids.insert(id);
            visit(id, e.updated_at, &mut touched_known);
        }
        for (id, e) in &remote.tasks {
            remote_ids.insert(id);
            visit(id, e.updated_at, &mut touched_known);
        }

        let removed_known = self.seen.keys().any(|id| !remote_ids.contains(id));

        let added_projects: Vec<String> = remote
            .projects
            .keys()
            .filter(|id| !self.seen.contains_key(*id) && !local.projects.contains_key(*id))
            .cloned()
            .collect();

        if !added_projects.is_empty() && !touched_known && !removed_known {
            return SaveDecision::Merge {
                project_ids: added_projects,
            };
        }

        SaveDecision::Warn {
            reason: format!(
                "storage was changed by another session (revision {} -> {})",
                self.last_revision, remote.revision
            ),
        }
    }

    /// Additively merge externally-added projects (and the subtree and
    /// idea/analysis they reference) from the remote document into the
    /// local one. Returns the merged project ids.
    pub fn merge_external_projects(
        remote: &Document,
        local: &mut Document,
        project_ids: &[String],
    ) -> Vec<String> {
        let mut merged = Vec::new();
        for project_id in project_ids {
            let Some(project) = remote.projects.get(project_id) else {
                continue;
            };
            if local.projects.contains_key(project_id) {
                continue;
            }

            for month_id in &project.month_ids {
                if let Some(month) = remote.months.get(month_id) {
                    for week_id in &month.week_ids {
                        if let Some(week) = remote.weeks.get(week_id) {
                            for task_id in &week.task_ids {
                                if let Some(task) = remote.tasks.get(task_id) {
                                    local.tasks.insert(task_id.clone(), task.clone());
                                }
                            }
                            local.weeks.insert(week_id.clone(), week.clone());
                        }
                    }
                    local.months.insert(month_id.clone(), month.clone());
                }
            }
            if let Some(idea) = remote.ideas.get(&project.idea_id) {
                local
                    .ideas
                    .entry(project.idea_id.clone())
                    .or_insert_with(|| idea.clone());
            }
            if let Some(analysis) = remote.analyses.get(&project.analysis_id) {
                local
                    .analyses
                    .entry(project.analysis_id.clone())
                    .or_insert_with(|| analysis.clone());
            }
            local.projects.insert(project_id.clone(), project.clone());
            merged.push(project_id.clone());
        }
        merged
    }
}
