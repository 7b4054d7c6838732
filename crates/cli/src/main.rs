// crates/cli/src/main.rs
//! morphbox binary.
//!
//! Thin command glue over `morphbox-client`: parse arguments, run one
//! flow, print a success line or exactly one error.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use morphbox_client::{Client, ClientConfig};
use morphbox_types::JobStatus;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "morphbox",
    version,
    about = "Submit files to a remote conversion service and track the jobs"
)]
struct Cli {
    /// API base URL (overrides MORPHBOX_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session.
    Login {
        email: String,
        /// Read from the terminal when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account (logs you in).
    Register {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the persisted session.
    Logout,
    /// Show the identity the server sees.
    Whoami,
    /// Show storage usage for the account.
    Storage,
    /// List supported conversion formats.
    Formats {
        /// Show a single category instead of all of them.
        category: Option<String>,
    },
    /// Upload a file for conversion.
    Convert {
        file: PathBuf,
        /// Output format code, e.g. `wav`.
        #[arg(long = "to")]
        output_format: String,
        /// Input format code; inferred from the file extension when omitted.
        #[arg(long = "from")]
        input_format: Option<String>,
        /// Category used for the advisory format check.
        #[arg(long)]
        category: Option<String>,
        /// Keep watching the new job until it settles.
        #[arg(long)]
        watch: bool,
    },
    /// List conversion jobs.
    Jobs {
        /// Filter by status (pending/processing/completed/failed/cancelled).
        #[arg(long)]
        status: Option<JobStatus>,
        /// Poll until every listed job has settled.
        #[arg(long)]
        watch: bool,
    },
    /// Show one job in detail.
    Job { id: Uuid },
    /// Cancel a job that has not finished.
    Cancel {
        id: Uuid,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Download the result of a completed job.
    Download {
        id: Uuid,
        /// File or directory to save into (default: current directory,
        /// server-suggested filename).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = match &cli.api_url {
        Some(url) => ClientConfig::with_base_url(url.clone()),
        None => ClientConfig::default(),
    };
    let client = Client::new(config)?;

    match cli.command {
        Command::Login { email, password } => commands::login(&client, &email, password).await,
        Command::Register { email, password } => {
            commands::register(&client, &email, password).await
        }
        Command::Logout => commands::logout(&client),
        Command::Whoami => commands::whoami(&client).await,
        Command::Storage => commands::storage(&client).await,
        Command::Formats { category } => commands::formats(&client, category.as_deref()).await,
        Command::Convert {
            file,
            output_format,
            input_format,
            category,
            watch,
        } => {
            commands::convert(
                &client,
                file,
                &output_format,
                input_format.as_deref(),
                category.as_deref(),
                watch,
            )
            .await
        }
        Command::Jobs { status, watch } => commands::jobs(&client, status, watch).await,
        Command::Job { id } => commands::show_job(&client, id).await,
        Command::Cancel { id, yes } => commands::cancel(&client, id, yes).await,
        Command::Download { id, output } => {
            commands::download(&client, id, output.as_deref()).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_args_parse() {
        let cli = Cli::try_parse_from([
            "morphbox", "convert", "song.mp3", "--to", "wav", "--category", "audio",
        ])
        .unwrap();
        match cli.command {
            Command::Convert {
                file,
                output_format,
                input_format,
                category,
                watch,
            } => {
                assert_eq!(file, PathBuf::from("song.mp3"));
                assert_eq!(output_format, "wav");
                assert_eq!(input_format, None);
                assert_eq!(category.as_deref(), Some("audio"));
                assert!(!watch);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_jobs_status_filter_parses_case_insensitively() {
        let cli =
            Cli::try_parse_from(["morphbox", "jobs", "--status", "Completed"]).unwrap();
        match cli.command {
            Command::Jobs { status, .. } => assert_eq!(status, Some(JobStatus::Completed)),
            _ => panic!("wrong command"),
        }
        assert!(Cli::try_parse_from(["morphbox", "jobs", "--status", "running"]).is_err());
    }

    #[test]
    fn test_global_api_url_flag() {
        let cli = Cli::try_parse_from([
            "morphbox",
            "jobs",
            "--api-url",
            "http://other:9000/api",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://other:9000/api"));
    }
}
