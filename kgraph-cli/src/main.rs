// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Kgraph CLI
//!
//! Generate knowledge graph diagrams from text with one or more LLM providers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kgraph_cli::app;
use kgraph_cli::Session;
use kgraph_core::ProviderName;
use kgraph_gateway::ProviderGateway;
use kgraph_render::GraphRenderer;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kgraph")]
#[command(about = "Kgraph - text to knowledge graph diagrams", long_about = None)]
struct Cli {
    /// Verbose mode
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Gateway configuration file
    #[arg(long, env = "KGRAPH_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Secrets file with provider API keys
    #[arg(long, env = "KGRAPH_SECRETS", global = true)]
    secrets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask providers for a knowledge graph of some text
    Generate {
        /// Text to analyze
        #[arg(long, conflicts_with = "input")]
        text: Option<String>,

        /// Read the text from a file instead (stdin when neither is given)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Providers to query, comma separated (default: all with a key)
        #[arg(long, value_delimiter = ',')]
        providers: Vec<String>,

        /// Directory to write diagrams into
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Export formats, comma separated
        #[arg(long, default_value = "png")]
        format: Vec<String>,
    },

    /// Render an existing graph JSON file
    Render {
        /// Graph file with `nodes` and `edges`
        #[arg(long)]
        graph: PathBuf,

        /// File name stem for the exports
        #[arg(long, default_value = "knowledge_graph")]
        name: String,

        /// Directory to write diagrams into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Export formats, comma separated
        #[arg(long, default_value = "png,svg")]
        format: Vec<String>,
    },

    /// Show which providers have keys configured
    Providers,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "kgraph=debug,kgraph_cli=debug,kgraph_gateway=debug,kgraph_render=debug,kgraph_core=debug"
    } else {
        "kgraph=info,kgraph_cli=info,kgraph_gateway=info,kgraph_render=info,kgraph_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            text,
            input,
            providers,
            out_dir,
            format,
        } => {
            let config = app::load_config(cli.config)?;
            let credentials = app::load_credentials(cli.secrets.as_deref())?;
            let formats = app::parse_formats(&format)?;
            let text = app::read_source_text(text, input.as_deref(), std::io::stdin())?;

            let mut session = Session::new(credentials);
            let selected = app::parse_providers(&providers)?;
            if !selected.is_empty() {
                session.select(&selected)?;
            }

            let gateway = ProviderGateway::new(&config).context("Failed to build HTTP clients")?;
            let renderer = GraphRenderer::new();
            let order = session.run(&gateway, &renderer, &text).await?;

            let written = match &out_dir {
                Some(dir) => session.export_to_dir(dir, &formats)?,
                None => Vec::new(),
            };
            let reports = app::build_reports(&session, &order, &written);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                app::print_reports(&reports);
            }
        }

        Commands::Render {
            graph,
            name,
            out_dir,
            format,
        } => {
            let formats = app::parse_formats(&format)?;
            let written =
                app::render_graph_file(&GraphRenderer::new(), &graph, &name, &out_dir, &formats)?;

            if cli.json {
                println!("{}", serde_json::json!({ "files": written }));
            } else {
                for path in &written {
                    println!("✓ Wrote {}", path.display());
                }
            }
        }

        Commands::Providers => {
            let config = app::load_config(cli.config)?;
            let credentials = app::load_credentials(cli.secrets.as_deref())?;
            info!(
                available = credentials.available_providers().len(),
                "Loaded credentials"
            );

            let rows: Vec<_> = ProviderName::ALL
                .iter()
                .map(|&provider| {
                    let settings = config.settings(provider);
                    serde_json::json!({
                        "provider": provider,
                        "available": credentials.is_available(provider),
                        "keys": credentials.get(provider).len(),
                        "model": settings.model,
                        "base_url": settings.base_url,
                    })
                })
                .collect();

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for provider in ProviderName::ALL {
                    let mark = if credentials.is_available(provider) { "✓" } else { "✗" };
                    let settings = config.settings(provider);
                    let keys = credentials.get(provider).len();
                    if provider.supports_key_pool() && keys > 1 {
                        println!("{} {:<9} {} ({} keys)", mark, provider.title(), settings.model, keys);
                    } else {
                        println!("{} {:<9} {}", mark, provider.title(), settings.model);
                    }
                }
            }
        }
    }

    Ok(())
}
