//! CLI entrypoint for consilium
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod case_file;

use anyhow::{Context, Result, bail};
use case_file::CaseFile;
use clap::Parser;
use consilium_application::{
    ConsultError, ConsultationEngine, DiscussionObserver, IngestRequest, KnowledgeBase, NoProgress,
    RetrievalQuery,
};
use consilium_domain::{Agent, EmbeddingConfig, Provider};
use consilium_infrastructure::{
    ConfigLoader, FileConfig, HttpAgentGateway, JsonFileStore, JsonlConversationLogger,
    ModelScopeEmbedder,
};
use consilium_presentation::{
    Cli, Command, ConfigCommand, ConsoleFormatter, ConsultArgs, ConsultationReport, KbCommand,
    ModelsArgs, OutputFormat, ProgressReporter, RunControl, SimpleProgress,
};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type Knowledge = KnowledgeBase<ModelScopeEmbedder, JsonFileStore>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    let log_dir = cli.log_dir.clone().or_else(|| config.logging.log_dir_path());
    let _guard = init_tracing(cli.verbose, log_dir.as_deref())?;

    info!("Starting consilium");

    for issue in config.validate() {
        eprintln!("{}", ConsoleFormatter::format_issue(&issue));
    }

    match &cli.command {
        Command::Consult(args) => run_consult(&cli, args, &config).await,
        Command::Kb(command) => run_kb(command, &config).await,
        Command::Config(command) => run_config(&cli, command, &config),
        Command::Models(args) => run_models(args).await,
    }
}

/// Initialize logging based on verbosity level, optionally to daily files
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "consilium.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(console)
        .with(file)
        .init();

    Ok(guard)
}

fn open_knowledge_base(config: &FileConfig) -> Result<Knowledge> {
    let data_dir = config.storage.resolve_data_dir();
    let store = JsonFileStore::open(&data_dir)
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
    let embedder = ModelScopeEmbedder::new()?;
    let timeout = config.consultation.to_execution_params().call_timeout;
    Ok(KnowledgeBase::load(Arc::new(embedder), Arc::new(store)).with_embed_timeout(timeout))
}

async fn run_consult(cli: &Cli, args: &ConsultArgs, config: &FileConfig) -> Result<()> {
    let mut case_file = CaseFile::load(&args.case)?;

    let agents: Vec<Agent> = if case_file.agents.is_empty() {
        config.build_agents()
    } else {
        let (panel, issues) = case_file.panel();
        for issue in issues {
            eprintln!("{}", ConsoleFormatter::format_issue(&issue));
        }
        panel
    };
    if agents.is_empty() {
        bail!("No agents configured. Add [[agents]] to consilium.toml or to the case file.");
    }

    let (settings, _) = config.consultation.to_settings();
    let params = config.consultation.to_execution_params();

    let observer: Arc<dyn DiscussionObserver> = if cli.quiet {
        Arc::new(NoProgress)
    } else if args.stream && args.output != OutputFormat::Json {
        Arc::new(SimpleProgress)
    } else {
        Arc::new(ProgressReporter::new())
    };

    let token = CancellationToken::new();
    let gateway = Arc::new(HttpAgentGateway::new()?);
    let knowledge = open_knowledge_base(config)?;

    let mut engine = ConsultationEngine::new(gateway, params)
        .with_knowledge(Arc::new(knowledge))
        .with_observer(observer)
        .with_cancellation(token.clone());

    if let Some(path) = config.logging.conversation_log_path()
        && let Some(logger) = JsonlConversationLogger::try_open(&path)
    {
        info!("Writing conversation log to {}", logger.path().display());
        engine = engine.with_conversation_logger(Arc::new(logger));
    }

    engine.set_settings(settings);
    engine.set_agents(agents);
    engine.set_consultation_name(&case_file.consultation_name);

    let findings = std::mem::take(&mut case_file.case.image_findings);
    engine.set_case(case_file.case);
    if !findings.is_empty() {
        engine.set_image_findings(findings);
    }
    engine.set_linked_cases(case_file.linked_cases, case_file.sync_patient_info);

    let mut selected = case_file.knowledge;
    selected.extend(args.knowledge.iter().cloned());
    engine.set_selected_knowledge(selected);

    for message in &case_file.patient_messages {
        engine.add_patient_message(message);
    }

    let ctrl_c = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        })
    };
    if args.interactive {
        eprintln!("Type 'pause', 'resume' or 'quit' and press Enter to control the run.");
        RunControl::new(engine.pause_handle(), token.clone()).spawn_stdin();
    }

    let result = engine.start().await;
    ctrl_c.abort();

    let reason = match result {
        Ok(outcome) => {
            info!("Consultation finished after {} rounds", outcome.rounds);
            Some(outcome.reason)
        }
        Err(ConsultError::Cancelled) => {
            warn!("Consultation cancelled");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let report = ConsultationReport::capture(&engine, reason);
    let output = match args.output {
        OutputFormat::Full => ConsoleFormatter::format(&report),
        OutputFormat::Summary => ConsoleFormatter::format_summary_only(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };
    println!("{}", output);

    Ok(())
}

async fn run_kb(command: &KbCommand, config: &FileConfig) -> Result<()> {
    let mut kb = open_knowledge_base(config)?;

    match command {
        KbCommand::Add {
            title,
            file,
            tags,
            collection,
            no_embed,
        } => {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let mut request = IngestRequest::new(title.clone(), content).with_tags(tags.clone());
            if let Some(collection) = collection {
                request = request.with_collection(collection.clone());
            }
            if *no_embed {
                request = request.without_vectorize();
            }
            let id = kb.ingest(request).await?;
            let chunks = kb.chunks().iter().filter(|c| c.doc_id == id).count();
            println!("Added {} ({} chunks)", id, chunks);
        }
        KbCommand::List { query, tag } => {
            let docs = kb.search(query.as_deref().unwrap_or(""), tag);
            print!("{}", ConsoleFormatter::format_documents(&docs));
        }
        KbCommand::Remove { id } => {
            kb.remove_doc(id)?;
            println!("Removed {}", id);
        }
        KbCommand::Reembed { id } => {
            let chunks = kb.reembed(id).await?;
            println!("Re-embedded {} ({} chunks)", id, chunks);
        }
        KbCommand::Search {
            query,
            doc,
            top_k,
            keyword_weight,
        } => {
            let mut request = RetrievalQuery::new(query.clone()).with_selected(doc.clone());
            if let Some(top_k) = top_k {
                request = request.with_top_k(*top_k);
            }
            if let Some(weight) = keyword_weight {
                request = request.with_keyword_weight(*weight);
            }
            let entries = kb.retrieve(request).await;
            print!("{}", ConsoleFormatter::format_retrieved(&entries));
        }
        KbCommand::Import { file } => {
            let raw = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let summary = kb.import_data(&raw)?;
            println!(
                "Imported {} documents ({} in knowledge base)",
                summary.imported, summary.merged
            );
        }
        KbCommand::Export => {
            println!("{}", kb.export_data()?);
        }
    }

    Ok(())
}

fn run_config(cli: &Cli, command: &ConfigCommand, config: &FileConfig) -> Result<()> {
    let mut kb = open_knowledge_base(config)?;

    match command {
        ConfigCommand::Show => {
            println!("Configuration sources (highest priority first):");
            for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
                println!("  {}", line);
            }
            println!();

            println!("Panel:");
            let agents = config.build_agents();
            if agents.is_empty() {
                println!("  (none)");
            }
            for agent in &agents {
                let mode = if agent.has_credentials() { "live" } else { "simulated" };
                println!(
                    "  {} {} [{} / {}] {}",
                    agent.id, agent.name, agent.provider.provider, agent.provider.model, mode
                );
            }
            println!();

            let (settings, _) = config.consultation.to_settings();
            println!("Turn order: {:?}", settings.turn_order);
            println!("Rounds without elimination: {}", settings.max_rounds_without_elimination);
            println!("Data directory: {}", config.storage.resolve_data_dir().display());

            let embedding = kb.embedding_config();
            println!(
                "Embedding: model={} key={} base_url={}",
                embedding.model,
                if embedding.has_credentials() { "set" } else { "unset" },
                if embedding.base_url.is_empty() { "(default)" } else { embedding.base_url.as_str() }
            );
            let retrieval = kb.retrieval_config();
            println!(
                "Retrieval: top_k={} keyword_weight={}",
                retrieval.top_k, retrieval.keyword_weight
            );
        }
        ConfigCommand::SetRetrieval { top_k, keyword_weight } => {
            kb.set_retrieval_config(*top_k, *keyword_weight)?;
            let retrieval = kb.retrieval_config();
            println!(
                "Retrieval set: top_k={} keyword_weight={}",
                retrieval.top_k, retrieval.keyword_weight
            );
        }
        ConfigCommand::SetEmbedding {
            model,
            api_key,
            base_url,
        } => {
            let current = kb.embedding_config().clone();
            let updated = EmbeddingConfig {
                model: model.clone().unwrap_or(current.model),
                api_key: api_key.clone().unwrap_or(current.api_key),
                base_url: base_url.clone().unwrap_or(current.base_url),
            };
            kb.set_embedding_config(updated)?;
            println!("Embedding model: {}", kb.embedding_config().model);
        }
    }

    Ok(())
}

async fn run_models(args: &ModelsArgs) -> Result<()> {
    let provider: Provider = args.provider.parse().map_err(anyhow::Error::msg)?;
    let api_key = match &args.api_key {
        Some(key) => key.clone(),
        None => std::env::var(api_key_env(provider)).unwrap_or_default(),
    };

    let gateway = HttpAgentGateway::new()?;
    let models = gateway
        .list_models(provider, &api_key, args.base_url.as_deref())
        .await?;
    let labels: Vec<String> = models.iter().map(|m| m.label()).collect();
    print!("{}", ConsoleFormatter::format_models(provider.as_str(), &labels));

    Ok(())
}

/// Conventional environment variable holding a provider's key
fn api_key_env(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAi => "OPENAI_API_KEY",
        Provider::Anthropic => "ANTHROPIC_API_KEY",
        Provider::Gemini => "GEMINI_API_KEY",
        Provider::SiliconFlow => "SILICONFLOW_API_KEY",
        Provider::ModelScope => "DASHSCOPE_API_KEY",
    }
}
