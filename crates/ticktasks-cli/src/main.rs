use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// ticktasks - a small to-do list with automatic cleanup of finished tasks
#[derive(Parser)]
#[command(name = "ticktasks")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Add a new task
    Add {
        /// Title of the task
        #[arg(required = true)]
        title: Vec<String>,

        /// Longer description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List tasks, newest first (default when no command given)
    List {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single task
    Show {
        /// Task ID
        id: String,
    },

    /// Mark a task as checked
    Check {
        /// Task ID
        id: String,
    },

    /// Mark a task as not checked
    Uncheck {
        /// Task ID
        id: String,
    },

    /// Delete a task (can be undone with `undo`)
    Delete {
        /// Task ID
        id: String,
    },

    /// Delete several tasks at once (one combined undo)
    BulkDelete {
        /// Task IDs; unknown IDs are skipped
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Restore the tasks removed by the last delete as new tasks
    Undo,

    /// Remove checked tasks older than the retention period now
    Cleanup {
        /// Override the configured number of days to keep
        #[arg(long)]
        days: Option<u32>,

        /// Only report what would be removed
        #[arg(long)]
        dry_run: bool,
    },

    /// Show or change settings
    Config {
        /// Days to keep checked tasks before automatic deletion
        #[arg(long)]
        days: Option<u32>,

        /// Color theme (light or dark)
        #[arg(long)]
        theme: Option<String>,
    },

    /// Show the automatic cleanup schedule
    Schedule,

    /// Manage the background cleanup daemon
    Daemon {
        #[command(subcommand)]
        command: DaemonCommand,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
enum DaemonCommand {
    /// Start the daemon in the background
    Start,
    /// Stop the running daemon
    Stop,
    /// Check whether the daemon is running
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return commands::list(false).await;
    };

    match command {
        Commands::Add { title, description } => {
            commands::add(title, description).await?;
        }
        Commands::List { json } => {
            commands::list(json).await?;
        }
        Commands::Show { id } => {
            commands::show(&id).await?;
        }
        Commands::Check { id } => {
            commands::check(&id, true).await?;
        }
        Commands::Uncheck { id } => {
            commands::check(&id, false).await?;
        }
        Commands::Delete { id } => {
            commands::delete(&id).await?;
        }
        Commands::BulkDelete { ids } => {
            commands::bulk_delete(&ids).await?;
        }
        Commands::Undo => {
            commands::undo().await?;
        }
        Commands::Cleanup { days, dry_run } => {
            commands::cleanup(days, dry_run).await?;
        }
        Commands::Config { days, theme } => {
            commands::config(days, theme).await?;
        }
        Commands::Schedule => {
            commands::schedule().await?;
        }
        Commands::Daemon { command } => match command {
            DaemonCommand::Start => commands::daemon::run_start().await?,
            DaemonCommand::Stop => commands::daemon::run_stop().await?,
            DaemonCommand::Status => commands::daemon::run_status().await?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["ticktasks"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_add_joins_words_and_takes_description() {
        let cli = Cli::try_parse_from(["ticktasks", "add", "buy", "milk", "-d", "2 litres"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Add {
                title: vec!["buy".to_string(), "milk".to_string()],
                description: "2 litres".to_string(),
            })
        );
    }

    #[test]
    fn test_add_requires_title() {
        assert!(Cli::try_parse_from(["ticktasks", "add"]).is_err());
    }

    #[test]
    fn test_bulk_delete_collects_ids() {
        let cli = Cli::try_parse_from(["ticktasks", "bulk-delete", "1", "2", "7"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::BulkDelete {
                ids: vec!["1".to_string(), "2".to_string(), "7".to_string()],
            })
        );
    }

    #[test]
    fn test_cleanup_flags() {
        let cli = Cli::try_parse_from(["ticktasks", "cleanup", "--days", "0", "--dry-run"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Cleanup {
                days: Some(0),
                dry_run: true,
            })
        );
    }

    #[test]
    fn test_config_rejects_negative_days() {
        assert!(Cli::try_parse_from(["ticktasks", "config", "--days", "-1"]).is_err());
    }

    #[test]
    fn test_daemon_subcommands() {
        let cli = Cli::try_parse_from(["ticktasks", "daemon", "status"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Daemon {
                command: DaemonCommand::Status,
            })
        );
    }
}
