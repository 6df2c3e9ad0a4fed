//! CLI argument definitions for SchemeLand.

use clap::{Parser, Subcommand};

/// SchemeLand - AI-assisted project planning and roadmap tracking.
///
/// Brainstorm ideas, analyze them, commit one to a project, and track the
/// roadmap month by month. Start with `sland system init`.
#[derive(Parser, Debug)]
#[command(name = "sland")]
#[command(author, version, about = "Plan projects with an AI planning oracle", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Profile name: each profile is an isolated data set.
    /// Can also be set via the SL_PROFILE environment variable.
    #[arg(
        short = 'P',
        long = "profile",
        global = true,
        env = "SL_PROFILE",
        default_value = "default"
    )]
    pub profile: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Idea management commands (brainstorm seeds for projects)
    Idea {
        #[command(subcommand)]
        command: IdeaCommands,
    },

    /// Analyze every idea with a usable title and description
    Analyze,

    /// Project management commands
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Roadmap month commands
    Month {
        #[command(subcommand)]
        command: MonthCommands,
    },

    /// Week commands
    Week {
        #[command(subcommand)]
        command: WeekCommands,
    },

    /// Task management commands
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Show any entity by ID (auto-detects type)
    Show {
        /// Entity ID (e.g., sli-a1b2c3, slt-0d9e8f)
        id: String,
    },

    /// Scan for corruption and repair what can be repaired
    Doctor {
        /// Preview changes without making them
        #[arg(long)]
        dry_run: bool,
    },

    /// Focus timer commands
    Timer {
        #[command(subcommand)]
        command: TimerCommands,
    },

    /// Session ownership status (remote storage only)
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// System administration commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },

    /// Start the shared storage/session dev server (requires 'server' feature)
    #[cfg(feature = "server")]
    Serve {
        /// Port to listen on (default: 8787, or config server_port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

/// Idea subcommands
#[derive(Subcommand, Debug)]
pub enum IdeaCommands {
    /// Create a new idea
    Create {
        /// Idea title
        title: String,

        /// Detailed description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Display emoji
        #[arg(long)]
        emoji: Option<String>,
    },

    /// List ideas
    List {
        /// Filter by status (pending, active, archived)
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one idea with its analysis
    Show {
        /// Idea ID
        id: String,
    },

    /// Update idea fields
    Update {
        /// Idea ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New emoji
        #[arg(long)]
        emoji: Option<String>,

        /// New status (pending, active, archived)
        #[arg(long)]
        status: Option<String>,
    },

    /// Delete an idea (at least one idea always remains)
    Delete {
        /// Idea ID
        id: String,
    },

    /// Let the oracle rewrite an idea's title and description
    Refine {
        /// Idea ID
        id: String,
    },

    /// Add oracle-suggested ideas to the list
    Suggest,
}

/// Project subcommands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Commit an analyzed idea to a new project
    Commit {
        /// Idea ID
        idea_id: String,

        /// Start date (YYYY-MM-DD, local; defaults to today)
        #[arg(long)]
        start: Option<String>,

        /// Enable hardcore mode
        #[arg(long)]
        hardcore: bool,
    },

    /// List projects
    List,

    /// Show the full nested roadmap (defaults to the active project)
    Show {
        /// Project ID
        id: Option<String>,
    },

    /// Abandon a project, deleting its whole roadmap
    Abandon {
        /// Project ID
        id: String,
    },

    /// Extend the roadmap with oracle-generated months
    Extend {
        /// Project ID
        id: String,
    },

    /// Compress the roadmap to exactly N months (hardcore re-plan)
    Compress {
        /// Project ID
        id: String,

        /// Target month count
        #[arg(long)]
        months: u32,
    },

    /// Expand (or refine) the project's three-year vision
    Vision {
        /// Project ID
        id: String,

        /// Refine the existing draft instead of expanding anew
        #[arg(long)]
        refine: bool,
    },
}

/// Month subcommands
#[derive(Subcommand, Debug)]
pub enum MonthCommands {
    /// Update a month's theme or goals
    Update {
        /// Month ID
        id: String,

        /// New theme
        #[arg(long)]
        theme: Option<String>,

        /// Replacement goal list (repeatable)
        #[arg(long = "goal")]
        goals: Vec<String>,
    },

    /// Create the month's four placeholder weeks (idempotent)
    InitWeeks {
        /// Month ID
        id: String,
    },

    /// Re-plan the month's weeks at a difficulty (easy, normal, hard)
    Adjust {
        /// Month ID
        id: String,

        /// Difficulty level
        #[arg(long, default_value = "normal")]
        difficulty: String,
    },

    /// Generate strategy options for the month; apply one or discard all
    Options {
        /// Month ID
        id: String,

        /// Apply the option at this index (0-based); omit to preview only
        #[arg(long)]
        apply: Option<usize>,
    },
}

/// Week subcommands
#[derive(Subcommand, Debug)]
pub enum WeekCommands {
    /// Update a week's theme
    Update {
        /// Week ID
        id: String,

        /// New theme
        #[arg(long)]
        theme: String,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task to a week
    Add {
        /// Week ID
        week_id: String,

        /// Task text
        text: String,

        /// Priority (0-4, lower is higher priority)
        #[arg(long)]
        priority: Option<u8>,
    },

    /// Update a task's text
    Update {
        /// Task ID
        id: String,

        /// New text
        #[arg(long)]
        text: String,
    },

    /// Set a task's workflow status (todo, in_progress, review, done)
    Status {
        /// Task ID
        id: String,

        /// New status
        status: String,
    },

    /// Mark a task done
    Done {
        /// Task ID
        id: String,
    },

    /// Move a task between weeks
    Move {
        /// Task ID
        id: String,

        /// Source week ID
        #[arg(long = "from")]
        from: String,

        /// Target week ID
        #[arg(long = "to")]
        to: String,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

/// Focus timer subcommands
#[derive(Subcommand, Debug)]
pub enum TimerCommands {
    /// Start (or resume) the focus timer
    Start,

    /// Pause the focus timer, banking elapsed time
    Pause,

    /// Show timer state
    Status,
}

/// Session subcommands
#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Register against the session endpoint and report ownership
    Status,
}

/// System subcommands
#[derive(Subcommand, Debug)]
pub enum SystemCommands {
    /// Initialize the profile's data directory and seed state
    Init,

    /// Show storage location, backend, and entity counts
    Info,
}
