//! nlsql - answer natural-language questions over SQLite databases
//!
//! Questions are turned into SQL by an OpenAI model (or, offline, by a small
//! set of heuristic rules), validated against the configured schema and run
//! read-only against the schema's SQLite file.

use anyhow::Context;
use clap::{Parser, Subcommand};
use nlsql_pipeline::{CandidateGenerator, NullGenerator, Pipeline};
use nlsql_schema::SchemaCollection;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod http;
mod llm;
mod logging;
mod render;

use config::{Config, ModelConfig, ModelProvider, SchemaConfig};

#[derive(Parser)]
#[command(name = "nlsql", version, about = "Natural-language questions over SQLite databases")]
struct Cli {
    /// Configuration file (defaults apply when it does not exist)
    #[arg(long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer one question and print the SQL and its result
    Ask {
        question: String,

        /// Schema name; the first loaded schema when omitted
        #[arg(long)]
        schema: Option<String>,

        /// Skip the model and rely on heuristic translation only
        #[arg(long)]
        offline: bool,
    },
    /// List loaded schemas
    Schemas,
    /// Start the HTTP API
    Serve,
    /// Create the demo company database
    Bootstrap {
        #[arg(long, default_value = "data/sample.db")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Secrets (OPENAI_API_KEY) live in .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    logging::init(&config.logging)?;

    match cli.command {
        Command::Ask {
            question,
            schema,
            offline,
        } => {
            let pipeline = build_pipeline(&config, offline)?;
            let output = pipeline.run(&question, schema.as_deref()).await?;
            print!("{}", render::render_output(&output));
        }
        Command::Schemas => {
            let schemas = load_schemas(&config.schema)?;
            for db in schemas.databases() {
                println!("{}\t{} tables", db.name(), db.tables().len());
            }
        }
        Command::Serve => {
            let pipeline = Arc::new(build_pipeline(&config, false)?);
            http::serve(&config.server.address(), pipeline).await?;
        }
        Command::Bootstrap { output } => {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            nlsql_sqlite::bootstrap_demo(&output)?;
            println!("SQLite demo database ready at {}", output.display());
        }
    }

    Ok(())
}

fn load_schemas(config: &SchemaConfig) -> anyhow::Result<SchemaCollection> {
    let schemas = match &config.database_dir {
        Some(dir) => nlsql_sqlite::discover(dir)
            .with_context(|| format!("failed to introspect databases in {}", dir.display()))?,
        None => SchemaCollection::from_path(&config.path)
            .with_context(|| format!("failed to load schema document {}", config.path.display()))?,
    };

    if schemas.is_empty() {
        tracing::warn!("No schemas loaded");
    } else {
        tracing::info!(schemas = schemas.len(), "Loaded schemas");
    }
    Ok(schemas)
}

fn build_generator(
    config: &ModelConfig,
    offline: bool,
) -> anyhow::Result<Box<dyn CandidateGenerator>> {
    if offline || config.provider == ModelProvider::None {
        tracing::info!("No model configured, answering with heuristic translation only");
        return Ok(Box::new(NullGenerator));
    }

    let api_key = Config::openai_api_key()?;
    tracing::info!(model = %config.name, "Using OpenAI model");
    Ok(Box::new(llm::OpenAiGenerator::from_api_key(api_key, config)))
}

fn build_pipeline(config: &Config, offline: bool) -> anyhow::Result<Pipeline> {
    let schemas = load_schemas(&config.schema)?;
    let generator = build_generator(&config.model, offline)?;
    Ok(Pipeline::new(schemas, generator, config.pipeline.clone()))
}
