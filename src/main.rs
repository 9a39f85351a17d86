use std::path::PathBuf;

use anyhow::Result;
use buildsift_types::BuildStatus;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

mod commands;
mod config;

use config::Config;

/// Buildsift - Scan build logs for known failure signatures
#[derive(Parser, Debug)]
#[command(name = "buildsift")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ~/.buildsift/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan one log and print the signatures it contains
    Scan {
        #[arg(value_name = "LOG")]
        log: PathBuf,

        /// Bytes of log tail to keep (overrides the config file)
        #[arg(long)]
        trim_size: Option<usize>,
    },

    /// Categorize a finished build from its logs
    Categorize {
        /// Terminal status reported for the build
        #[arg(long)]
        status: BuildStatus,

        #[arg(long, value_name = "PATH")]
        build_log: Option<PathBuf>,

        #[arg(long, value_name = "PATH")]
        alignment_log: Option<PathBuf>,

        #[arg(long, default_value = "0")]
        id: String,

        /// The build is temporary
        #[arg(long)]
        temporary: bool,

        #[arg(long, default_value = "MVN")]
        build_type: String,

        /// Submit time, RFC 3339
        #[arg(long)]
        submit_time: Option<DateTime<Utc>>,

        /// Bytes of log tail to keep (overrides the config file)
        #[arg(long)]
        trim_size: Option<usize>,
    },

    /// Print the categorization rules in priority order
    Rules,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

/// Pick the tracing directives: `--verbose` wins, then a non-empty
/// `RUST_LOG`, then the config file
fn log_directives<'a>(verbose: bool, env: Option<&'a str>, configured: &'a str) -> &'a str {
    if verbose {
        return "debug";
    }
    match env {
        Some(env) if !env.trim().is_empty() => env,
        _ => configured,
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;

    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::try_new(log_directives(
        args.verbose,
        env.as_deref(),
        &config.log_level,
    ))?;

    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Scan { log, trim_size } => {
            let limit = trim_size.unwrap_or(config.trimmed_log_max_size);
            commands::scan(&log, limit).await
        }
        Command::Categorize {
            status,
            build_log,
            alignment_log,
            id,
            temporary,
            build_type,
            submit_time,
            trim_size,
        } => {
            let request = commands::CategorizeRequest {
                status,
                build_log,
                alignment_log,
                id,
                temporary,
                build_type,
                submit_time,
                max_trim: trim_size.unwrap_or(config.trimmed_log_max_size),
            };
            commands::categorize(request).await
        }
        Command::Rules => {
            commands::rules();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directives_precedence() {
        assert_eq!(log_directives(false, None, "warn"), "warn");
        assert_eq!(log_directives(false, Some("buildsift_logs=trace"), "warn"), "buildsift_logs=trace");
        assert_eq!(log_directives(false, Some("  "), "warn"), "warn");
        assert_eq!(log_directives(true, Some("error"), "warn"), "debug");
    }
}
