use std::path::PathBuf;
use std::sync::Arc;

use clap::Subcommand;

use lore_core::models::{ErrorDetails, FeedbackScope, ImprovementMetrics};
use lore_core::LoreConfig;
use lore_learning::FeedbackGeneralizer;
use lore_providers::HttpPassageStore;
use lore_storage::SqliteFeedbackStore;

use super::{finish, print_json, CliExitCode};

#[derive(Subcommand, Debug)]
pub enum FeedbackCommands {
    /// Generalize pending corrections into training examples and submit them
    Process {
        #[arg(long)]
        tenant: String,
        /// Knowledge-base (collection) id the corrections belong to
        #[arg(long)]
        domain: String,
        /// Report what would be created without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Leave the improvement planned instead of submitting it for ingestion
        #[arg(long)]
        no_submit: bool,
    },
    /// Mark a training example validated
    Validate { example_id: String },
    /// Mark a training example rejected
    RejectExample { example_id: String },
    /// Reject a pending correction
    Reject {
        correction_id: String,
        #[arg(long, default_value = "rejected by reviewer")]
        reason: String,
    },
    /// Set a training example's weight
    Weight { example_id: String, weight: f64 },
    /// Submit a planned improvement for ingestion
    Submit { improvement_id: String },
    /// Mark an in-progress improvement completed
    Complete {
        improvement_id: String,
        #[arg(long, default_value_t = 0)]
        submitted: usize,
        #[arg(long, default_value_t = 0)]
        indexed: usize,
    },
    /// Mark an improvement failed
    Fail {
        improvement_id: String,
        #[arg(long, default_value = "ingestion")]
        stage: String,
        #[arg(long)]
        message: String,
    },
}

pub async fn handle_feedback_command(action: FeedbackCommands, config: LoreConfig) -> CliExitCode {
    finish(run(action, config).await)
}

async fn run(action: FeedbackCommands, config: LoreConfig) -> anyhow::Result<()> {
    let store = Arc::new(SqliteFeedbackStore::open(&PathBuf::from(&config.learning.db_path))?);
    let mut generalizer = FeedbackGeneralizer::new(store, &config.learning);
    let submits = !matches!(action, FeedbackCommands::Process { no_submit: true, .. });
    if submits {
        generalizer =
            generalizer.with_ingestor(Arc::new(HttpPassageStore::from_config(&config.passage_store)));
    }

    match action {
        FeedbackCommands::Process {
            tenant,
            domain,
            dry_run,
            ..
        } => {
            let report = generalizer
                .process(&FeedbackScope::new(tenant, domain), dry_run)
                .await?;
            print_json(&report)
        }
        FeedbackCommands::Validate { example_id } => {
            print_json(&generalizer.validate_example(&example_id).await?)
        }
        FeedbackCommands::RejectExample { example_id } => {
            print_json(&generalizer.reject_example(&example_id).await?)
        }
        FeedbackCommands::Reject {
            correction_id,
            reason,
        } => print_json(&generalizer.reject_correction(&correction_id, &reason).await?),
        FeedbackCommands::Weight { example_id, weight } => {
            print_json(&generalizer.set_weight(&example_id, weight).await?)
        }
        FeedbackCommands::Submit { improvement_id } => {
            print_json(&generalizer.submit_planned(&improvement_id).await?)
        }
        FeedbackCommands::Complete {
            improvement_id,
            submitted,
            indexed,
        } => {
            let metrics = ImprovementMetrics {
                documents_submitted: submitted,
                documents_indexed: indexed,
                ..Default::default()
            };
            print_json(&generalizer.complete(&improvement_id, metrics).await?)
        }
        FeedbackCommands::Fail {
            improvement_id,
            stage,
            message,
        } => {
            let details = ErrorDetails::new(stage, message);
            print_json(&generalizer.fail(&improvement_id, details).await?)
        }
    }
}
