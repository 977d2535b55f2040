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

//! Turning a model's text reply into a graph.

use kgraph_core::{extract_json_object, GatewayError, GatewayResult, KnowledgeGraph, ProviderName};
use serde_json::Value;
use tracing::{debug, info};

/// How forgiving to be with text around the JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    /// The whole reply must be the object (OpenAI)
    Strict,
    /// Fall back to the first `{` .. last `}` slice
    Repair,
}

pub fn graph_from_reply(
    provider: ProviderName,
    text: &str,
    mode: ReplyMode,
) -> GatewayResult<KnowledgeGraph> {
    let value = match (serde_json::from_str::<Value>(text.trim()), mode) {
        (Ok(value), _) => value,
        (Err(e), ReplyMode::Strict) => {
            return Err(GatewayError::ResponseFormat {
                provider,
                message: format!("reply is not JSON: {}", e),
            })
        }
        (Err(_), ReplyMode::Repair) => {
            let candidate = extract_json_object(text).ok_or_else(|| GatewayError::ResponseFormat {
                provider,
                message: "no JSON object found in reply".to_string(),
            })?;
            debug!(provider = %provider, "Recovered JSON object from surrounding text");
            serde_json::from_str(candidate).map_err(|e| GatewayError::ResponseFormat {
                provider,
                message: format!("extracted text is not JSON: {}", e),
            })?
        }
    };

    let decoded = KnowledgeGraph::decode(&value).map_err(|e| GatewayError::ResponseFormat {
        provider,
        message: e.to_string(),
    })?;

    info!(
        provider = %provider,
        nodes = decoded.graph.nodes.len(),
        edges = decoded.graph.edges.len(),
        skipped = decoded.skipped_nodes + decoded.skipped_edges,
        "Graph decoded"
    );
    Ok(decoded.graph)
}

/// Walk a JSON path of object keys and array indices down to a string.
pub fn text_at<'a>(value: &'a Value, path: &[PathStep<'_>]) -> Option<&'a str> {
    let mut current = value;
    for step in path {
        current = match step {
            PathStep::Key(key) => current.get(*key)?,
            PathStep::Index(index) => current.get(*index)?,
        };
    }
    current.as_str()
}

#[derive(Debug, Clone, Copy)]
pub enum PathStep<'k> {
    Key(&'k str),
    Index(usize),
}

/// Required text at `path`, or a `ResponseFormat` error naming what was missing.
pub fn require_text<'a>(
    provider: ProviderName,
    value: &'a Value,
    path: &[PathStep<'_>],
    what: &str,
) -> GatewayResult<&'a str> {
    text_at(value, path).ok_or_else(|| GatewayError::ResponseFormat {
        provider,
        message: format!("missing {} in response", what),
    })
}

pub(crate) fn log_usage(provider: ProviderName, value: &Value) {
    if let Some(usage) = value.get("usage").or_else(|| value.get("usageMetadata")) {
        debug!(provider = %provider, usage = %usage, "Token usage");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GRAPH: &str = r#"{"nodes":[{"id":"a","label":"A"},{"id":"b","label":"B"}],"edges":[{"from":"a","to":"b","label":"r"}]}"#;

    #[test]
    fn test_strict_accepts_exact_json() {
        let graph = graph_from_reply(ProviderName::OpenAi, GRAPH, ReplyMode::Strict).unwrap();
        assert_eq!(graph.nodes.len(), 2);
    }

    #[test]
    fn test_strict_rejects_prose() {
        let reply = format!("Sure! {}", GRAPH);
        let err = graph_from_reply(ProviderName::OpenAi, &reply, ReplyMode::Strict).unwrap_err();
        assert!(matches!(err, GatewayError::ResponseFormat { .. }));
    }

    #[test]
    fn test_repair_recovers_fenced_json() {
        let reply = format!("Here you go:\n```json\n{}\n```", GRAPH);
        let graph = graph_from_reply(ProviderName::DeepSeek, &reply, ReplyMode::Repair).unwrap();
        assert_eq!(graph.edges[0].label, "r");
    }

    #[test]
    fn test_repair_without_braces_fails() {
        let err = graph_from_reply(ProviderName::Claude, "I cannot help", ReplyMode::Repair).unwrap_err();
        assert!(err.to_string().contains("no JSON object"));
    }

    #[test]
    fn test_empty_graph_is_format_error() {
        let err = graph_from_reply(
            ProviderName::Gemini,
            r#"{"nodes":[],"edges":[]}"#,
            ReplyMode::Repair,
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::ResponseFormat { .. }));
    }

    #[test]
    fn test_text_at_walks_mixed_path() {
        let value = json!({"choices": [{"message": {"content": "hi"}}]});
        let path = [
            PathStep::Key("choices"),
            PathStep::Index(0),
            PathStep::Key("message"),
            PathStep::Key("content"),
        ];
        assert_eq!(text_at(&value, &path), Some("hi"));
        assert_eq!(text_at(&value, &[PathStep::Key("missing")]), None);
    }
}
