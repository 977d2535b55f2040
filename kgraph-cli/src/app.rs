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

//! Command plumbing shared by the binary and its tests.

use crate::session::Session;
use anyhow::{bail, Context, Result};
use kgraph_core::{CredentialSet, DiagnosticKind, KnowledgeGraph, ProviderName};
use kgraph_gateway::GatewayConfig;
use kgraph_render::{ExportFormat, GraphRenderer};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// Secrets file first, then environment variables on top.
pub fn load_credentials(secrets: Option<&Path>) -> Result<CredentialSet> {
    let from_file = match secrets {
        Some(path) => CredentialSet::from_file(path)
            .with_context(|| format!("Failed to read secrets from {:?}", path))?,
        None => CredentialSet::new(),
    };
    Ok(from_file.merge(CredentialSet::from_env()))
}

pub fn load_config(path: Option<PathBuf>) -> Result<GatewayConfig> {
    GatewayConfig::load(path).context("Failed to load configuration")
}

/// `--text`, then `--input`, then standard input.
pub fn read_source_text<R: Read>(
    text: Option<String>,
    input: Option<&Path>,
    mut stdin: R,
) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = input {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {:?}", path));
    }
    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .context("Failed to read text from stdin")?;
    Ok(buffer)
}

/// Comma-separated names; an empty list means "every available provider".
pub fn parse_providers(names: &[String]) -> Result<Vec<ProviderName>> {
    let mut providers = Vec::new();
    for name in names.iter().flat_map(|n| n.split(',')) {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let provider: ProviderName = name.parse()?;
        if !providers.contains(&provider) {
            providers.push(provider);
        }
    }
    Ok(providers)
}

pub fn parse_formats(names: &[String]) -> Result<Vec<ExportFormat>> {
    let mut formats = Vec::new();
    for name in names.iter().flat_map(|n| n.split(',')) {
        if name.trim().is_empty() {
            continue;
        }
        let format: ExportFormat = name.parse().map_err(anyhow::Error::msg)?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        bail!("No export format given");
    }
    Ok(formats)
}

/// One provider's line in the `generate` output.
#[derive(Debug, Serialize)]
pub struct ProviderReport {
    pub provider: ProviderName,
    pub title: &'static str,
    pub nodes: usize,
    pub edges: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<DiagnosticKind>,
    pub elapsed_ms: u64,
    pub files: Vec<PathBuf>,
    pub graph: KnowledgeGraph,
}

/// Reports in arrival order, each with the files written for it.
pub fn build_reports(
    session: &Session,
    order: &[ProviderName],
    written: &[PathBuf],
) -> Vec<ProviderReport> {
    order
        .iter()
        .filter_map(|&provider| {
            let result = session.result(provider)?;
            let prefix = format!("knowledge_graph_{}.", provider.as_str());
            let files = written
                .iter()
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&prefix))
                })
                .cloned()
                .collect();
            Some(ProviderReport {
                provider,
                title: provider.title(),
                nodes: result.graph.nodes.len(),
                edges: result.graph.edges.len(),
                diagnostic: result.graph.diagnostic,
                elapsed_ms: result.elapsed.as_millis() as u64,
                files,
                graph: result.graph.clone(),
            })
        })
        .collect()
}

pub fn print_reports(reports: &[ProviderReport]) {
    for report in reports {
        let status = match report.diagnostic {
            Some(kind) => format!("✗ {} (diagnostic: {:?})", report.title, kind),
            None => format!("✓ {}", report.title),
        };
        println!(
            "{}  {} nodes, {} edges in {} ms",
            status, report.nodes, report.edges, report.elapsed_ms
        );
        for edge in &report.graph.edges {
            println!("    {} --{}--> {}", edge.from, edge.label, edge.to);
        }
        for file in &report.files {
            println!("    wrote {}", file.display());
        }
    }
}

/// Render a graph JSON file and write it in each format.
pub fn render_graph_file(
    renderer: &GraphRenderer,
    graph_path: &Path,
    name: &str,
    out_dir: &Path,
    formats: &[ExportFormat],
) -> Result<Vec<PathBuf>> {
    let content = std::fs::read_to_string(graph_path)
        .with_context(|| format!("Failed to read graph file {:?}", graph_path))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{:?} is not valid JSON", graph_path))?;

    let artifact = renderer.render_value(&value);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {:?}", out_dir))?;

    let mut written = Vec::new();
    for format in formats {
        let path = out_dir.join(format.file_name_for(name));
        let bytes = artifact.export(*format)?;
        std::fs::write(&path, bytes).with_context(|| format!("Failed to write {:?}", path))?;
        info!(path = %path.display(), "Wrote diagram");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_providers_dedupes_and_splits() {
        let names = vec!["openai,Gemini".to_string(), "anthropic".to_string(), "gemini".to_string()];
        assert_eq!(
            parse_providers(&names).unwrap(),
            vec![ProviderName::OpenAi, ProviderName::Gemini, ProviderName::Claude]
        );
        assert!(parse_providers(&["mistral".to_string()]).is_err());
        assert!(parse_providers(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(
            parse_formats(&["png,svg".to_string()]).unwrap(),
            vec![ExportFormat::Png, ExportFormat::Svg]
        );
        assert!(parse_formats(&["".to_string()]).is_err());
        assert!(parse_formats(&["bmp".to_string()]).is_err());
    }

    #[test]
    fn test_text_sources_in_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("input.txt");
        std::fs::write(&file, "from file").unwrap();

        let text = read_source_text(Some("inline".to_string()), Some(&file), "stdin".as_bytes());
        assert_eq!(text.unwrap(), "inline");

        let text = read_source_text(None, Some(&file), "stdin".as_bytes());
        assert_eq!(text.unwrap(), "from file");

        let text = read_source_text(None, None, "from stdin".as_bytes());
        assert_eq!(text.unwrap(), "from stdin");
    }

    #[test]
    fn test_secrets_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "gemini = [\"g1\", \"g2\"]\n").unwrap();

        let credentials = load_credentials(Some(&path)).unwrap();
        assert!(credentials.key_pool(ProviderName::Gemini).len() >= 1);
        assert!(load_credentials(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
