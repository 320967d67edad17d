use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lore_core::models::{Answer, SynthesisOptions};
use lore_core::traits::{IEmbeddingProvider, IPassageStore};
use lore_core::{LoreConfig, Query, QueryMode};
use lore_learning::CorrectionHintProvider;
use lore_observability::ObservabilityEngine;
use lore_providers::{HttpPassageStore, OpenAiCompatibleOracle, OpenAiEmbeddingProvider};
use lore_retrieval::QueryRouter;
use lore_session::{spawn_session_writer, JsonlSessionSink};
use lore_storage::SqliteFeedbackStore;

use super::{finish, print_json, CliExitCode};

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to answer
    pub question: String,

    /// `smart`, or a domain (`database`, `support`, `documentation`) to skip classification
    #[arg(short, long, default_value = "smart")]
    pub mode: QueryMode,

    /// Tenant id; enables correction hints from the feedback database
    #[arg(long)]
    pub tenant: Option<String>,

    /// Session id; answered turns are appended to `--session-log`
    #[arg(long)]
    pub session: Option<String>,

    /// Application whose domain catalog applies
    #[arg(long)]
    pub application: Option<String>,

    /// JSON-lines file receiving session events
    #[arg(long, requires = "session")]
    pub session_log: Option<PathBuf>,

    /// Answer each resolved domain separately instead of composing one answer
    #[arg(long)]
    pub per_domain: bool,

    /// Include the ranked contexts in the response
    #[arg(long)]
    pub contexts: bool,

    /// Include the model's reasoning in the response
    #[arg(long)]
    pub thinking: bool,

    /// Disable the extended thinking budget
    #[arg(long)]
    pub no_extended_thinking: bool,

    /// Print the raw response object as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the diagnostics report after answering
    #[arg(long)]
    pub diagnostics: bool,
}

impl AskArgs {
    fn to_query(&self) -> Query {
        let mut query = Query::new(self.question.as_str())
            .with_mode(self.mode)
            .with_options(SynthesisOptions {
                extended_thinking: !self.no_extended_thinking,
                include_contexts: self.contexts,
                include_thinking: self.thinking,
            });
        if let Some(tenant) = &self.tenant {
            query = query.with_tenant(tenant.as_str());
        }
        if let Some(session) = &self.session {
            query = query.with_session(session.as_str());
        }
        if let Some(application) = &self.application {
            query = query.with_application(application.as_str());
        }
        query
    }
}

pub async fn handle_ask(args: AskArgs, config: LoreConfig) -> CliExitCode {
    finish(run(args, config).await)
}

async fn run(args: AskArgs, config: LoreConfig) -> anyhow::Result<()> {
    let store: Arc<dyn IPassageStore> = Arc::new(HttpPassageStore::from_config(&config.passage_store));
    let oracle = Arc::new(
        OpenAiCompatibleOracle::from_config(&config.oracle).context("configuring the oracle")?,
    );
    let observability = Arc::new(ObservabilityEngine::new());

    let mut builder = QueryRouter::builder(config.clone(), oracle, store)
        .observability(observability.clone());
    if let Some(embedder) = OpenAiEmbeddingProvider::from_config(&config.oracle)? {
        let embedder: Arc<dyn IEmbeddingProvider> = Arc::new(embedder);
        builder = builder.embedder(embedder);
    }
    if let Some(tenant) = &args.tenant {
        let db_path = PathBuf::from(&config.learning.db_path);
        if db_path.exists() {
            let feedback = Arc::new(SqliteFeedbackStore::open(&db_path)?);
            let catalog = config.domains.catalog_for(args.application.as_deref()).clone();
            builder = builder.hints(Arc::new(CorrectionHintProvider::new(
                feedback,
                tenant.as_str(),
                catalog,
            )));
        } else {
            warn!(path = %db_path.display(), "feedback database missing, no correction hints");
        }
    }

    let writer = match &args.session_log {
        Some(path) if config.session.enabled => {
            let (emitter, writer) =
                spawn_session_writer(Arc::new(JsonlSessionSink::new(path)), &config.session);
            builder = builder.sessions(emitter);
            Some(writer)
        }
        Some(_) => {
            warn!("session persistence disabled in config, --session-log ignored");
            None
        }
        None => None,
    };
    let router = builder.build()?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let query = args.to_query();
    let answers = if args.per_domain {
        router.answer_per_domain(&query, &cancel).await?
    } else {
        vec![router.answer(&query, &cancel).await?]
    };
    for answer in &answers {
        print_answer(answer, args.json)?;
    }

    // the router owns the last emitter; dropping it lets the writer drain and stop
    drop(router);
    if let Some(writer) = writer {
        let written = writer.finish().await;
        info!(written, "session events persisted");
    }

    if args.diagnostics {
        print_json(&observability.report())?;
    }
    Ok(())
}

pub(crate) fn print_answer(answer: &Answer, json: bool) -> anyhow::Result<()> {
    let response = answer.to_response();
    if json {
        return print_json(&response);
    }
    if let Some(thinking) = &response.thinking {
        println!("[thinking]\n{thinking}\n");
    }
    println!("{}", response.answer);
    if let Some(contexts) = &response.contexts {
        for (i, context) in contexts.iter().enumerate() {
            println!("\n[context {}]\n{context}", i + 1);
        }
    }
    println!("\nsources: {}", response.source_domains.join(", "));
    for degradation in &answer.degradations {
        eprintln!(
            "degraded: {} ({}; fell back to {})",
            degradation.component, degradation.failure, degradation.fallback_used
        );
    }
    Ok(())
}
