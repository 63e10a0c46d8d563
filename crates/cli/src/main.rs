use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use ragchat_core::{Credentials, Settings};
use ragchat_embeddings::EmbeddingService;
use ragchat_llm::LlmClient;
use ragchat_service::{ChatService, RagService};
use ragchat_storage::VectorStore;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ragchat")]
#[command(about = "Chat assistant with answers grounded in your CSV files", long_about = None)]
struct Cli {
    /// Secrets file holding `[api] PREDICTIONGUARD_API_KEY`
    #[arg(long, global = true, default_value = "secrets.toml")]
    secrets: PathBuf,
    /// Directory for the vector database and the embedding model cache
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the chat and RAG pages over HTTP
    Serve {
        #[arg(short, long, default_value = "8501")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Chat with the assistant in the terminal
    Chat,
    /// Answer one question from a CSV file
    Ask {
        #[arg(long)]
        csv: PathBuf,
        question: String,
    },
    /// Drop every vector collection left by earlier runs
    Reset,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("ragchat")
}

pub(crate) fn vector_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("vectors.db")
}

/// Everything the orchestrators need, built once at startup.
pub(crate) struct Components {
    pub settings: Settings,
    pub llm: Arc<LlmClient>,
    data_dir: PathBuf,
}

impl Components {
    /// Fails fast when no API key is configured.
    fn load(secrets: &Path, data_dir: PathBuf) -> Result<Self> {
        let credentials = Credentials::load(secrets)
            .with_context(|| format!("loading credentials (secrets file {})", secrets.display()))?;
        let llm = Arc::new(LlmClient::from_credentials(&credentials)?);
        let settings = Settings::from_env();
        tracing::info!(model = %settings.model, base_url = %llm.base_url(), "completion client ready");
        Ok(Self { settings, llm, data_dir })
    }

    pub(crate) fn chat_service(&self) -> ChatService {
        ChatService::new(self.llm.clone(), &self.settings)
    }

    /// Loads the embedding model and opens (and resets) the vector store.
    pub(crate) fn rag_service(&self) -> Result<RagService> {
        let embedder = Arc::new(EmbeddingService::new(Some(self.data_dir.join("models")))?);
        let store = Arc::new(VectorStore::open(&vector_db_path(&self.data_dir))?);
        Ok(RagService::new(self.llm.clone(), embedder, store, &self.settings))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);

    match cli.command {
        Commands::Serve { port, host } => {
            let components = Components::load(&cli.secrets, data_dir)?;
            commands::serve::run(&components, &host, port).await?;
        },
        Commands::Chat => {
            let components = Components::load(&cli.secrets, data_dir)?;
            commands::chat::run(&components).await?;
        },
        Commands::Ask { csv, question } => {
            let components = Components::load(&cli.secrets, data_dir)?;
            commands::ask::run(&components, &csv, &question).await?;
        },
        Commands::Reset => commands::reset::run(&data_dir)?,
    }

    Ok(())
}
