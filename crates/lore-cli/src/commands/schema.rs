use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Subcommand};
use tokio_util::sync::CancellationToken;

use lore_core::traits::{IEmbeddingProvider, IPassageStore};
use lore_core::LoreConfig;
use lore_providers::{HttpPassageStore, OpenAiCompatibleOracle, OpenAiEmbeddingProvider};
use lore_retrieval::QueryRouter;

use super::ask::print_answer;
use super::{finish, CliExitCode};

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Application whose database collection is searched
    #[arg(long, global = true)]
    pub application: Option<String>,

    /// Print the raw response object as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub action: SchemaCommands,
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Describe the keys and relationships of one table
    Relationships {
        #[arg(long)]
        table: String,
    },
    /// Suggest an optimized form of one SQL statement
    OptimizeSql {
        #[arg(long)]
        sql: String,
    },
}

pub async fn handle_schema(args: SchemaArgs, config: LoreConfig) -> CliExitCode {
    finish(run(args, config).await)
}

async fn run(args: SchemaArgs, config: LoreConfig) -> anyhow::Result<()> {
    let store: Arc<dyn IPassageStore> = Arc::new(HttpPassageStore::from_config(&config.passage_store));
    let oracle = Arc::new(
        OpenAiCompatibleOracle::from_config(&config.oracle).context("configuring the oracle")?,
    );
    let mut builder = QueryRouter::builder(config.clone(), oracle, store);
    if let Some(embedder) = OpenAiEmbeddingProvider::from_config(&config.oracle)? {
        let embedder: Arc<dyn IEmbeddingProvider> = Arc::new(embedder);
        builder = builder.embedder(embedder);
    }
    let router = builder.build()?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let application = args.application.as_deref();
    let answer = match &args.action {
        SchemaCommands::Relationships { table } => {
            router.relationships(table, application, &cancel).await?
        }
        SchemaCommands::OptimizeSql { sql } => router.optimize_sql(sql, application, &cancel).await?,
    };
    print_answer(&answer, args.json)
}
