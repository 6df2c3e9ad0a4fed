//! SchemeLand CLI - AI-assisted project planning and roadmap tracking.

use clap::Parser;
use schemeland::cli::{
    Cli, Commands, IdeaCommands, MonthCommands, ProjectCommands, SessionCommands, SystemCommands,
    TaskCommands, TimerCommands, WeekCommands,
};
use schemeland::commands::{self, Output};
use schemeland::{action_log, config};
use std::process;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;
    let profile = cli.profile.clone();

    // Serialize command for logging
    let (cmd_name, args_json) = serialize_command(&cli.command);

    // Start timing
    let start = Instant::now();

    // Execute command
    let result = run_command(cli.command, &profile, human);

    // Calculate duration
    let duration = start.elapsed().as_millis() as u64;

    // Determine success/error
    let (success, error) = match &result {
        Ok(_) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };

    // Log the action (silently degrades if the data dir is unavailable)
    if let Ok(data_dir) = config::data_dir(&profile) {
        action_log::log_action(
            &data_dir, &profile, &cmd_name, args_json, success, error, duration,
        );
    }

    // Handle result
    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!(
                "{}",
                serde_json::json!({ "error": e.to_string() })
            );
        }
        process::exit(1);
    }
}

fn run_command(command: Commands, profile: &str, human: bool) -> schemeland::Result<()> {
    let out = match command {
        Commands::Idea { command } => match command {
            IdeaCommands::Create {
                title,
                description,
                emoji,
            } => commands::idea_create(profile, title, description, emoji)?,
            IdeaCommands::List { status } => commands::idea_list(profile, status)?,
            IdeaCommands::Show { id } => commands::idea_show(profile, &id)?,
            IdeaCommands::Update {
                id,
                title,
                description,
                emoji,
                status,
            } => commands::idea_update(profile, &id, title, description, emoji, status)?,
            IdeaCommands::Delete { id } => commands::idea_delete(profile, &id)?,
            IdeaCommands::Refine { id } => commands::idea_refine(profile, &id)?,
            IdeaCommands::Suggest => commands::idea_suggest(profile)?,
        },
        Commands::Analyze => commands::analyze(profile)?,
        Commands::Project { command } => match command {
            ProjectCommands::Commit {
                idea_id,
                start,
                hardcore,
            } => commands::project_commit(profile, &idea_id, start, hardcore)?,
            ProjectCommands::List => commands::project_list(profile)?,
            ProjectCommands::Show { id } => commands::project_show(profile, id)?,
            ProjectCommands::Abandon { id } => commands::project_abandon(profile, &id)?,
            ProjectCommands::Extend { id } => commands::project_extend(profile, &id)?,
            ProjectCommands::Compress { id, months } => {
                commands::project_compress(profile, &id, months)?
            }
            ProjectCommands::Vision { id, refine } => {
                commands::project_vision(profile, &id, refine)?
            }
        },
        Commands::Month { command } => match command {
            MonthCommands::Update { id, theme, goals } => {
                commands::month_update(profile, &id, theme, goals)?
            }
            MonthCommands::InitWeeks { id } => commands::month_init_weeks(profile, &id)?,
            MonthCommands::Adjust { id, difficulty } => {
                commands::month_adjust(profile, &id, &difficulty)?
            }
            MonthCommands::Options { id, apply } => commands::month_options(profile, &id, apply)?,
        },
        Commands::Week { command } => match command {
            WeekCommands::Update { id, theme } => commands::week_update(profile, &id, theme)?,
        },
        Commands::Task { command } => match command {
            TaskCommands::Add {
                week_id,
                text,
                priority,
            } => commands::task_add(profile, &week_id, text, priority)?,
            TaskCommands::Update { id, text } => commands::task_update(profile, &id, text)?,
            TaskCommands::Status { id, status } => commands::task_status(profile, &id, &status)?,
            TaskCommands::Done { id } => commands::task_status(profile, &id, "done")?,
            TaskCommands::Move { id, from, to } => commands::task_move(profile, &id, &from, &to)?,
            TaskCommands::Delete { id } => commands::task_delete(profile, &id)?,
        },
        Commands::Show { id } => commands::show(profile, &id)?,
        Commands::Doctor { dry_run } => commands::doctor(profile, dry_run)?,
        Commands::Timer { command } => match command {
            TimerCommands::Start => commands::timer_start(profile)?,
            TimerCommands::Pause => commands::timer_pause(profile)?,
            TimerCommands::Status => commands::timer_status(profile)?,
        },
        Commands::Session { command } => match command {
            SessionCommands::Status => commands::session_status(profile)?,
        },
        Commands::System { command } => match command {
            SystemCommands::Init => commands::system_init(profile)?,
            SystemCommands::Info => commands::system_info(profile)?,
        },
        #[cfg(feature = "server")]
        Commands::Serve { port, host } => commands::serve(profile, port, &host)?,
    };

    print_output(&out, human);
    Ok(())
}

fn print_output(out: &Output, human: bool) {
    if human {
        println!("{}", out.human);
    } else {
        println!("{}", out.json);
    }
}

/// Command name and loggable argument summary for the action log.
fn serialize_command(command: &Commands) -> (String, serde_json::Value) {
    let name = match command {
        Commands::Idea { command } => match command {
            IdeaCommands::Create { .. } => "idea create",
            IdeaCommands::List { .. } => "idea list",
            IdeaCommands::Show { .. } => "idea show",
            IdeaCommands::Update { .. } => "idea update",
            IdeaCommands::Delete { .. } => "idea delete",
            IdeaCommands::Refine { .. } => "idea refine",
            IdeaCommands::Suggest => "idea suggest",
        },
        Commands::Analyze => "analyze",
        Commands::Project { command } => match command {
            ProjectCommands::Commit { .. } => "project commit",
            ProjectCommands::List => "project list",
            ProjectCommands::Show { .. } => "project show",
            ProjectCommands::Abandon { .. } => "project abandon",
            ProjectCommands::Extend { .. } => "project extend",
            ProjectCommands::Compress { .. } => "project compress",
            ProjectCommands::Vision { .. } => "project vision",
        },
        Commands::Month { command } => match command {
            MonthCommands::Update { .. } => "month update",
            MonthCommands::InitWeeks { .. } => "month init-weeks",
            MonthCommands::Adjust { .. } => "month adjust",
            MonthCommands::Options { .. } => "month options",
        },
        Commands::Week { command } => match command {
            WeekCommands::Update { .. } => "week update",
        },
        Commands::Task { command } => match command {
            TaskCommands::Add { .. } => "task add",
            TaskCommands::Update { .. } => "task update",
            TaskCommands::Status { .. } => "task status",
            TaskCommands::Done { .. } => "task done",
            TaskCommands::Move { .. } => "task move",
            TaskCommands::Delete { .. } => "task delete",
        },
        Commands::Show { .. } => "show",
        Commands::Doctor { .. } => "doctor",
        Commands::Timer { command } => match command {
            TimerCommands::Start => "timer start",
            TimerCommands::Pause => "timer pause",
            TimerCommands::Status => "timer status",
        },
        Commands::Session { command } => match command {
            SessionCommands::Status => "session status",
        },
        Commands::System { command } => match command {
            SystemCommands::Init => "system init",
            SystemCommands::Info => "system info",
        },
        #[cfg(feature = "server")]
        Commands::Serve { .. } => "serve",
    };

    let args = match command {
        Commands::Idea {
            command: IdeaCommands::Create { title, .. },
        } => serde_json::json!({ "title": title }),
        Commands::Idea {
            command: IdeaCommands::Show { id } | IdeaCommands::Delete { id },
        } => serde_json::json!({ "id": id }),
        Commands::Project {
            command: ProjectCommands::Commit { idea_id, .. },
        } => serde_json::json!({ "idea_id": idea_id }),
        Commands::Project {
            command:
                ProjectCommands::Abandon { id }
                | ProjectCommands::Extend { id }
                | ProjectCommands::Compress { id, .. },
        } => serde_json::json!({ "id": id }),
        Commands::Task {
            command: TaskCommands::Move { id, from, to },
        } => serde_json::json!({ "id": id, "from": from, "to": to }),
        Commands::Show { id } => serde_json::json!({ "id": id }),
        _ => serde_json::json!({}),
    };

    (name.to_string(), args)
}
