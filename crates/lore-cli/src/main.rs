//! `lore` command-line front end.
//!
//! - `lore ask <question>`: route, retrieve, rerank and synthesize an answer
//! - `lore schema relationships --table <t>`: keys and relationships of one table
//! - `lore schema optimize-sql --sql <statement>`: optimization advice for one statement
//! - `lore feedback process`: turn pending corrections into training examples
//! - `lore feedback validate|reject-example|reject|weight`: reviewer operations
//! - `lore feedback submit|complete|fail`: improvement lifecycle
//!
//! Exit codes: 0 success, 1 operation failed, 2 bad configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::CliExitCode;

#[derive(Parser)]
#[command(name = "lore")]
#[command(version)]
#[command(about = "Domain-routed knowledge-base question answering with a feedback loop")]
#[command(propagate_version = true)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, global = true, env = "LORE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity (-v info, -vv debug, -vvv trace). `LORE_LOG` wins when set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question from the configured knowledge bases
    Ask(commands::ask::AskArgs),
    /// Analyze tables and SQL against the database knowledge base
    Schema(commands::schema::SchemaArgs),
    /// Feedback processing and review
    Feedback {
        #[command(subcommand)]
        action: commands::feedback::FeedbackCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match commands::load_config(cli.config.as_deref(), cli.verbose) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(CliExitCode::Config as i32);
        }
    };
    lore_observability::tracing_setup::init_tracing(&config.observability);

    let exit_code = match cli.command {
        Commands::Ask(args) => commands::ask::handle_ask(args, config).await,
        Commands::Schema(args) => commands::schema::handle_schema(args, config).await,
        Commands::Feedback { action } => {
            commands::feedback::handle_feedback_command(action, config).await
        }
    };
    std::process::exit(exit_code as i32);
}
