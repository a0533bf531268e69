//! `saruru` command-line goal board.
//!
//! # Responsibility
//! - Resolve configuration and open the selected goal store.
//! - Map one subcommand to one dashboard action and print the outcome.
//! - Print queued notifications to stderr and exit non-zero when any exist.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use saruru_core::db::open_db;
use saruru_core::{
    init_logging, AppConfig, BackendKind, ConfigOverrides, Dashboard, FileKeyValueStore, Goal,
    GoalId, GoalStore, LocalGoalStore, SqliteGoalStore,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "saruru")]
#[command(about = "Saruru goal board - track goals and their edit history", long_about = None)]
struct Cli {
    /// Config file (defaults to <config_dir>/saruru/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Persistence backend, overriding the config file
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendArg>,

    /// Data directory, overriding the config file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Local,
    Table,
}

impl From<BackendArg> for BackendKind {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Local => BackendKind::Local,
            BackendArg::Table => BackendKind::Table,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List goals, newest first
    List,
    /// Add a goal
    Add { text: String },
    /// Replace a goal's text, keeping the old text in its history
    Edit { id: GoalId, text: String },
    /// Delete a goal and its history
    Delete { id: GoalId },
    /// Show a goal's edit history, oldest first
    History { id: GoalId },
    /// Print version and resolved configuration
    Info,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        backend: cli.backend.map(BackendKind::from),
        data_dir: cli.data_dir,
        log_level: None,
    };
    let config = AppConfig::load(cli.config.as_deref(), overrides)
        .context("Failed to load configuration")?;

    if let Err(err) = init_logging(&config.log_level, &config.log_dir()) {
        eprintln!("warning: file logging disabled: {err}");
    }

    if let Commands::Info = cli.command {
        print_info(&config);
        return Ok(ExitCode::SUCCESS);
    }

    let ok = match config.backend {
        BackendKind::Local => {
            let kv = FileKeyValueStore::new(config.blob_dir());
            let store = LocalGoalStore::open(kv).with_context(|| {
                format!("Failed to open local goals in {}", config.blob_dir().display())
            })?;
            execute(Dashboard::new(store), &cli.command)
        }
        BackendKind::Table => {
            std::fs::create_dir_all(&config.data_dir).with_context(|| {
                format!("Failed to create {}", config.data_dir.display())
            })?;
            let db_path = config.db_path();
            let conn = open_db(&db_path)
                .with_context(|| format!("Failed to open {}", db_path.display()))?;
            let store = SqliteGoalStore::try_new(&conn).context("Goal table is not usable")?;
            execute(Dashboard::new(store), &cli.command)
        }
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Runs one command against the dashboard; `false` means it failed.
fn execute<S: GoalStore>(mut board: Dashboard<S>, command: &Commands) -> bool {
    let mut ok = board.load();

    if ok {
        ok = match command {
            Commands::List => {
                print_goals(board.goals());
                true
            }
            Commands::Add { text } => match board.add_goal(text) {
                Some(id) => {
                    println!("added goal {id}");
                    true
                }
                None if board.notifications().is_empty() => {
                    println!("nothing to add: goal text is empty");
                    true
                }
                None => false,
            },
            Commands::Edit { id, text } => {
                if board.start_edit(*id) {
                    board.set_draft(text.as_str());
                    match board.save_edit() {
                        Some(goal) => {
                            println!("updated goal {} ({} edits)", goal.id, goal.edit_count());
                            true
                        }
                        None if board.notifications().is_empty() => {
                            eprintln!("goal {id} was deleted before the edit was saved");
                            false
                        }
                        None => false,
                    }
                } else {
                    eprintln!("no goal with id {id}");
                    false
                }
            }
            Commands::Delete { id } => {
                let existed = board.goal(*id).is_some();
                if board.delete_goal(*id) {
                    if existed {
                        println!("deleted goal {id}");
                    } else {
                        println!("goal {id} was already gone");
                    }
                    true
                } else {
                    false
                }
            }
            Commands::History { id } => {
                if !board.toggle_history(*id) {
                    eprintln!("no goal with id {id}");
                    false
                } else {
                    match board.expanded_history() {
                        Some([]) => {
                            println!("goal {id} has never been edited");
                            true
                        }
                        Some(entries) => {
                            for (index, entry) in entries.iter().enumerate() {
                                println!(
                                    "{:>3}. {}  {}",
                                    index + 1,
                                    entry.edited_at.to_rfc3339(),
                                    entry.previous_text
                                );
                            }
                            true
                        }
                        None => {
                            eprintln!("no goal with id {id}");
                            false
                        }
                    }
                }
            }
            Commands::Info => true,
        };
    }

    for notification in board.take_notifications() {
        eprintln!("error: {notification}");
        ok = false;
    }
    ok
}

fn print_goals(goals: &[Goal]) {
    if goals.is_empty() {
        println!("no goals yet - add the first one with `saruru add <text>`");
        return;
    }
    for goal in goals {
        println!(
            "{}  {}  {}  (edits: {})",
            goal.id,
            goal.created_at.to_rfc3339(),
            goal.text,
            goal.edit_count()
        );
    }
}

fn print_info(config: &AppConfig) {
    println!("saruru_core ping={}", saruru_core::ping());
    println!("saruru_core version={}", saruru_core::core_version());
    println!("backend={}", config.backend.as_str());
    println!("data_dir={}", config.data_dir.display());
    println!("log_level={}", config.log_level);
}
