use anyhow::Result;
use clap::Parser;
use colored::*;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use haven_cli::{
    display_banner, emergency_guide, format_ranked, format_report, format_stats, print_help,
    read_input, Command, CommandDetector, EmergencyResponder,
};
use haven_core::{GeoPoint, Kind, LLMProvider, LocationRecord, RAGEngine, VectorStore};
use haven_geo::{aggregate_city, nearest_single, threats_within, RecordStore, StoreConfig, NEAREST_SHELTER_KINDS};
use haven_ollama::{OllamaClient, OllamaConfig};
use haven_rag::{LocalVectorStore, SafetyRAGEngine};

type Responder = EmergencyResponder<OllamaClient, SafetyRAGEngine<LocalVectorStore>>;

#[derive(Parser)]
#[command(name = "haven")]
#[command(about = "Emergency safety assistant: shelters, threat zones and answers", long_about = None)]
struct Cli {
    /// Ask one question and exit
    #[arg(short, long)]
    question: Option<String>,

    /// Source CSV file to load; repeat for several (overrides HAVEN_SOURCES)
    #[arg(short, long = "source")]
    sources: Vec<String>,

    /// Generation model (overrides OLLAMA_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Retrieve by word overlap instead of embeddings
    #[arg(long)]
    no_embeddings: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "haven=info,haven_geo=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut store_config = StoreConfig::from_env();
    if !cli.sources.is_empty() {
        store_config = store_config.with_sources(cli.sources.clone());
    }

    let store = Arc::new(RecordStore::with_csv(store_config));
    let loaded = store.load_configured()?;
    info!(records = loaded, "location data ready");

    let ollama_config = OllamaConfig::from_env()?;
    let mut llm = OllamaClient::new(ollama_config.clone())?;
    if let Some(model) = cli.model {
        llm = llm.with_model(model);
    }
    if let Err(e) = llm.connect().await {
        warn!(error = %e, "Ollama unavailable, answers will fall back to emergency numbers");
    }

    let mut vector_store = LocalVectorStore::new();
    vector_store.connect().await?;

    let mut rag_engine = SafetyRAGEngine::new(Arc::new(vector_store));
    if !cli.no_embeddings {
        rag_engine = rag_engine.with_embeddings(Arc::new(OllamaClient::new(ollama_config)?));
    }

    let responder: Responder = match rag_engine.initialize().await {
        Ok(()) => {
            if let Err(e) = rag_engine.index(store.snapshot().records()).await {
                warn!(error = %e, "indexing failed");
            }
            EmergencyResponder::with_rag(llm, rag_engine, store.clone())
        }
        Err(e) => {
            warn!(error = %e, "RAG initialization failed, continuing without retrieval");
            EmergencyResponder::new(llm, store.clone())
        }
    };

    if let Some(question) = cli.question {
        println!("{}", responder.answer(&question).await);
        return Ok(());
    }

    display_banner(responder.llm().model_id(), store.snapshot().len());

    let detector = CommandDetector::new();

    while let Some(input) = read_input("haven>")? {
        if input.is_empty() {
            continue;
        }

        match detector.detect(&input) {
            Command::Exit => {
                println!("{}", "Stay safe.".green());
                break;
            }
            Command::Help => print_help(),
            Command::Emergency => println!("{}\n", emergency_guide().red()),
            Command::Stats => {
                println!("{}", format_stats(&store.stats()));
                if let Some(rag) = responder.rag() {
                    if let Ok(stats) = rag.stats().await {
                        println!("Retrieval: {}\n", stats);
                    }
                }
            }
            Command::Nearest { origin, kind } => {
                let kinds = match kind {
                    Some(kind) => vec![kind],
                    None => NEAREST_SHELTER_KINDS.to_vec(),
                };
                match nearest_single(&store.snapshot(), origin, &kinds) {
                    Some(nearest) => println!("{}\n", format_ranked(&[nearest]).green()),
                    None => println!("{}\n", "No matching facility loaded. Call 104 (Home Front).".yellow()),
                }
            }
            Command::Location { city } => {
                let report = aggregate_city(&store.snapshot(), &city);
                println!("{}", format_report(&report));
            }
            Command::Danger { origin, radius_km } => {
                let threats = threats_within(&store.snapshot(), origin, radius_km);
                println!("{} within {} km of {}:", "Threat zones".red().bold(), radius_km, origin);
                println!("{}\n", format_ranked(&threats));
            }
            Command::Report { kind, origin, name } => {
                report_location(&responder, &store, kind, origin, name).await;
            }
            Command::Invalid { usage } => println!("{} {}\n", "Usage:".yellow(), usage),
            Command::Question(question) => {
                println!("{}", "Processing emergency query...".dimmed());
                println!("\n{}\n", responder.answer(&question).await);
            }
        }
    }

    Ok(())
}

async fn report_location(
    responder: &Responder,
    store: &RecordStore,
    kind: Kind,
    origin: GeoPoint,
    name: Option<String>,
) {
    let city = name.clone().unwrap_or_else(|| format!("Reported at {}", origin));
    let mut record = LocationRecord::new(kind, city, origin.lat, origin.lon);
    if let Some(name) = name {
        record = record.with_name(name);
    }

    match store.append(record) {
        Ok(stored) => {
            println!(
                "{} {} saved to {}\n",
                "Reported".green(),
                stored.kind.display_name(),
                stored.source.as_deref().unwrap_or("?")
            );
            if let Some(rag) = responder.rag() {
                if let Err(e) = rag.index(store.snapshot().records()).await {
                    warn!(error = %e, "re-indexing after report failed");
                }
            }
        }
        Err(e) => println!("{} {}\n", "Report rejected:".red(), e),
    }
}
