//! Common test utilities for SchemeLand integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's data directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A full-featured oracle script used by oracle-backed commands in tests.
pub const ORACLE_SCRIPT: &str = r#"{
  "analyze": [
    {
      "metrics": {"feasibility": 85, "marketPotential": 60, "excitement": 75, "speedToMVP": 90},
      "reasoning": "Small scope, clear audience",
      "oneLiner": "Habits that stick"
    }
  ],
  "fullPlan": {
    "yearlyPlan": {
      "vision": "Ship a habit tracker people actually open",
      "keyResults": ["100 weekly active users", "Mobile and web parity", "Sustainable routine"]
    },
    "monthlyPlan": [
      {"month": 1, "theme": "Foundations", "goals": ["Working prototype"]},
      {"month": 2, "theme": "Polish", "goals": ["Beta feedback"]}
    ],
    "weeklyPlan": [
      {"weekNumber": 1, "theme": "Scaffold", "tasks": ["Set up the repo", "Sketch the data model"]},
      {"weekNumber": 2, "theme": "Core loop", "tasks": ["Implement habit check-ins"]}
    ]
  },
  "refineIdea": {
    "title": "Habit Tracker Pro",
    "description": "Daily habit tracking with streaks and focus sessions",
    "emoji": "✅"
  },
  "suggestIdeas": [
    {"title": "Recipe box", "description": "Family recipes, searchable and shareable"},
    {"title": "Plant journal", "description": "Watering schedules and growth photos"}
  ],
  "adjustWeeklyPlan": [
    {"weekNumber": 1, "theme": "Hard reset", "tasks": ["Rebuild the core loop"]},
    {"weekNumber": 2, "theme": "Push", "tasks": ["Ship to three users"]}
  ],
  "threeYearVision": {
    "year1": {"vision": "Launch", "keyResults": ["MVP live"]},
    "year2": {"vision": "Grow", "keyResults": ["1k users"]},
    "year3": {"vision": "Sustain", "keyResults": ["Profitable"]},
    "ultimateGoal": "A calm, profitable product"
  },
  "monthPlanOptions": [
    {
      "strategyName": "Depth first",
      "description": "One feature end to end",
      "plan": [{"weekNumber": 1, "theme": "Deep dive", "tasks": ["Pick the feature"]}]
    },
    {
      "strategyName": "Breadth first",
      "description": "Touch everything shallowly",
      "plan": [{"weekNumber": 1, "theme": "Survey", "tasks": ["List the surface"]}]
    }
  ],
  "extendRoadmap": [
    {"month": 3, "theme": "Scale", "goals": ["Handle growth"]},
    {"month": 4, "theme": "Harden", "goals": ["Fix the rough edges"]}
  ],
  "compressRoadmap": [
    {"month": 1, "theme": "Sprint", "goals": ["Everything at once"]},
    {"month": 2, "theme": "Land", "goals": ["Ship it"]}
  ]
}"#;

/// A test environment with isolated data storage.
///
/// Each `TestEnv` creates a temporary data directory wired in via the
/// `SL_DATA_DIR` env var, set per-invocation for parallel safety.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an isolated directory.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a new test environment and initialize the default profile.
    pub fn init() -> Self {
        let env = Self::new();
        env.sl().args(["system", "init"]).assert().success();
        env
    }

    /// Get a Command for the sland binary with isolated data directory.
    pub fn sl(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sland"));
        cmd.env("SL_DATA_DIR", self.data_dir.path());
        cmd
    }

    /// Get a Command with the shared oracle script wired in.
    pub fn sl_with_oracle(&self) -> Command {
        let mut cmd = self.sl();
        cmd.env("SL_ORACLE", self.oracle_path());
        cmd
    }

    /// Write the shared oracle script and return its path.
    pub fn oracle_path(&self) -> PathBuf {
        let path = self.data_dir.path().join("oracle.json");
        if !path.exists() {
            std::fs::write(&path, ORACLE_SCRIPT).unwrap();
        }
        path
    }

    /// Write a custom oracle script and return its path.
    pub fn write_oracle(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.data_dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Path to the default profile's slot directory.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.path().join("default").join("store")
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a command's stdout as JSON.
pub fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}): {}",
            e,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}
