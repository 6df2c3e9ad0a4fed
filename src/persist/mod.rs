//! Persistence adapter for the normalized store.
//!
//! The durable unit is a `Document`: the six entity collections, the meta
//! scalars, and a monotonically increasing revision counter. Backends
//! serialize it to their sink at slot granularity where the sink allows
//! (one JSON file per collection) or wholesale (the remote HTTP document).
//! Writes are last-write-wins per slot; anything smarter happens in the
//! conflict detector before the write is issued.

pub mod http;

pub use http::HttpBackend;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::models::{Analysis, Idea, MonthlyGoal, Project, Task, WeeklyMilestone};
use crate::store::{MetaState, Store};
use crate::{Error, Result};

/// One durable slot of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Ideas,
    Analyses,
    Projects,
    Months,
    Weeks,
    Tasks,
    Meta,
}

impl Slot {
    /// All slots, in serialization order.
    pub fn all() -> &'static [Slot] {
        &[
            Slot::Ideas,
            Slot::Analyses,
            Slot::Projects,
            Slot::Months,
            Slot::Weeks,
            Slot::Tasks,
            Slot::Meta,
        ]
    }

    /// Stable slot name, used for file names and log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Ideas => "ideas",
            Slot::Analyses => "analyses",
            Slot::Projects => "projects",
            Slot::Months => "months",
            Slot::Weeks => "weeks",
            Slot::Tasks => "tasks",
            Slot::Meta => "meta",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The whole persisted state as one serializable value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub ideas: BTreeMap<String, Idea>,
    pub analyses: BTreeMap<String, Analysis>,
    pub projects: BTreeMap<String, Project>,
    pub months: BTreeMap<String, MonthlyGoal>,
    pub weeks: BTreeMap<String, WeeklyMilestone>,
    pub tasks: BTreeMap<String, Task>,
    pub meta: MetaState,
    /// Bumped by every successful save; the conflict detector's change
    /// fingerprint.
    pub revision: u64,
}

impl Document {
    /// Snapshot the in-memory store into a document.
    pub fn from_store(store: &Store, revision: u64) -> Self {
        Self {
            ideas: store.ideas.clone(),
            analyses: store.analyses.clone(),
            projects: store.projects.clone(),
            months: store.months.clone(),
            weeks: store.weeks.clone(),
            tasks: store.tasks.clone(),
            meta: store.meta.clone(),
            revision,
        }
    }

    /// Rehydrate a store from this document.
    pub fn into_store(self) -> Store {
        Store::from_parts(
            self.ideas,
            self.analyses,
            self.projects,
            self.months,
            self.weeks,
            self.tasks,
            self.meta,
        )
    }

    /// True when no entities have ever been written.
    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
            && self.analyses.is_empty()
            && self.projects.is_empty()
            && self.months.is_empty()
            && self.weeks.is_empty()
            && self.tasks.is_empty()
    }
}

/// Trait for persistence backends that durably hold the document.
pub trait PersistBackend {
    /// Read the current document. Absent or unparsable sinks yield the
    /// default (empty) document; only transport failures are errors.
    fn load(&mut self) -> Result<Document>;

    /// Write the document. `dirty` names the slots that changed since the
    /// last save; backends with slot-level sinks may skip the rest.
    fn save(&mut self, doc: &Document, dirty: &BTreeSet<Slot>) -> Result<()>;

    /// Storage location description (for display purposes).
    fn location(&self) -> String;

    /// Backend type name.
    fn backend_type(&self) -> &'static str;
}

/// File backend: one JSON file per slot under a data directory, plus a
/// small revision file. Writes are whole-file atomic replaces.
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn slot_path(&self, slot: Slot) -> PathBuf {
        self.root.join(format!("{}.json", slot.as_str()))
    }

    fn revision_path(&self) -> PathBuf {
        self.root.join("revision.json")
    }

    /// Atomically replace a file: write a temp file in the same directory,
    /// then rename over the target.
    fn write_atomic(&self, path: &PathBuf, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.persist(path)
            .map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    fn read_slot_or_default<T: Default + for<'de> Deserialize<'de>>(&self, slot: Slot) -> T {
        let path = self.slot_path(slot);
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    eprintln!(
                        "Warning: slot {} is unparsable ({}), starting from empty",
                        slot, e
                    );
                    T::default()
                }
            },
            Err(_) => T::default(),
        }
    }
}

impl PersistBackend for FileBackend {
    fn load(&mut self) -> Result<Document> {
        let revision = match fs::read_to_string(self.revision_path()) {
            Ok(raw) => raw.trim().parse::<u64>().unwrap_or(0),
            Err(_) => 0,
        };
        Ok(Document {
            ideas: self.read_slot_or_default(Slot::Ideas),
            analyses: self.read_slot_or_default(Slot::Analyses),
            projects: self.read_slot_or_default(Slot::Projects),
            months: self.read_slot_or_default(Slot::Months),
            weeks: self.read_slot_or_default(Slot::Weeks),
            tasks: self.read_slot_or_default(Slot::Tasks),
            meta: self.read_slot_or_default(Slot::Meta),
            revision,
        })
    }

    fn save(&mut self, doc: &Document, dirty: &BTreeSet<Slot>) -> Result<()> {
        for slot in dirty {
            let json = match slot {
                Slot::Ideas => serde_json::to_string_pretty(&doc.ideas)?,
                Slot::Analyses => serde_json::to_string_pretty(&doc.analyses)?,
                Slot::Projects => serde_json::to_string_pretty(&doc.projects)?,
                Slot::Months => serde_json::to_string_pretty(&doc.months)?,
                Slot::Weeks => serde_json::to_string_pretty(&doc.weeks)?,
                Slot::Tasks => serde_json::to_string_pretty(&doc.tasks)?,
                Slot::Meta => serde_json::to_string_pretty(&doc.meta)?,
            };
            self.write_atomic(&self.slot_path(*slot), &json)?;
        }
        self.write_atomic(&self.revision_path(), &doc.revision.to_string())?;
        Ok(())
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn backend_type(&self) -> &'static str {
        "file"
    }
}

/// In-memory backend for tests and ephemeral runs. Keeps the document as
/// serialized JSON so load/save behave byte-for-byte like a real sink.
#[derive(Default)]
pub struct MemoryBackend {
    raw: Option<String>,
    pub save_count: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the sink contents directly, as another session would.
    pub fn inject(&mut self, doc: &Document) {
        self.raw = Some(serde_json::to_string(doc).expect("document serializes"));
    }
}

impl PersistBackend for MemoryBackend {
    fn load(&mut self) -> Result<Document> {
        match &self.raw {
            None => Ok(Document::default()),
            Some(raw) => Ok(serde_json::from_str(raw).unwrap_or_default()),
        }
    }

    fn save(&mut self, doc: &Document, _dirty: &BTreeSet<Slot>) -> Result<()> {
        self.raw = Some(serde_json::to_string(doc)?);
        self.save_count += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
