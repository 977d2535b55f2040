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

//! OpenAI and Claude request shapes and reply handling

use kgraph_core::DiagnosticKind;
use kgraph_gateway::{CredentialSet, GatewayConfig, ProviderGateway, ProviderName};
use mockito::Matcher;
use serde_json::json;

const GRAPH: &str = r#"{"nodes":[{"id":"sun","label":"Sun"},{"id":"earth","label":"Earth"}],"edges":[{"from":"earth","to":"sun","label":"orbits"}]}"#;

fn gateway_for(server: &mockito::ServerGuard) -> ProviderGateway {
    let mut config = GatewayConfig::default();
    config.openai.base_url = server.url();
    config.claude.base_url = server.url();
    ProviderGateway::new(&config).unwrap()
}

fn openai_reply(content: &str) -> String {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
        "usage": {"total_tokens": 150}
    })
    .to_string()
}

#[tokio::test]
async fn test_openai_exact_json_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-openai")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 1000
        })))
        .with_status(200)
        .with_body(openai_reply(GRAPH))
        .expect(1)
        .create_async()
        .await;

    let credentials = CredentialSet::new().with_single(ProviderName::OpenAi, "sk-openai");
    let graph = gateway_for(&server)
        .generate_graph(ProviderName::OpenAi, &credentials, "The Earth orbits the Sun")
        .await
        .unwrap();

    assert!(!graph.is_diagnostic());
    assert_eq!(graph.edges[0].from, "earth");
    assert_eq!(graph.edges[0].to, "sun");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_openai_prose_reply_is_parse_diagnostic() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(openai_reply(&format!("Here is your graph: {}", GRAPH)))
        .create_async()
        .await;

    let credentials = CredentialSet::new().with_single(ProviderName::OpenAi, "sk-openai");
    let graph = gateway_for(&server)
        .generate_graph(ProviderName::OpenAi, &credentials, "The Earth orbits the Sun")
        .await
        .unwrap();

    assert_eq!(graph.diagnostic, Some(DiagnosticKind::ResponseFormat));
    assert_eq!(graph.nodes[0].label, "Response parsing error");
}

#[tokio::test]
async fn test_openai_missing_choices_is_parse_diagnostic() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let credentials = CredentialSet::new().with_single(ProviderName::OpenAi, "sk-openai");
    let graph = gateway_for(&server)
        .generate_graph(ProviderName::OpenAi, &credentials, "Text")
        .await
        .unwrap();

    assert_eq!(graph.diagnostic, Some(DiagnosticKind::ResponseFormat));
}

#[tokio::test]
async fn test_claude_headers_and_first_block() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "sk-ant")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJson(json!({
            "model": "claude-3-5-haiku-20241022",
            "max_tokens": 1000
        })))
        .with_status(200)
        .with_body(
            json!({
                "content": [{"type": "text", "text": GRAPH}],
                "usage": {"input_tokens": 90, "output_tokens": 40}
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let credentials = CredentialSet::new().with_single(ProviderName::Claude, "sk-ant");
    let graph = gateway_for(&server)
        .generate_graph(ProviderName::Claude, &credentials, "The Earth orbits the Sun")
        .await
        .unwrap();

    assert_eq!(graph.nodes.len(), 2);
    assert!(!graph.is_diagnostic());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_claude_falls_back_to_all_text_blocks() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_body(
            json!({
                "content": [
                    {"type": "text", "text": "Let me think about the relationships first."},
                    {"type": "text", "text": GRAPH}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let credentials = CredentialSet::new().with_single(ProviderName::Claude, "sk-ant");
    let graph = gateway_for(&server)
        .generate_graph(ProviderName::Claude, &credentials, "The Earth orbits the Sun")
        .await
        .unwrap();

    assert!(!graph.is_diagnostic());
    assert_eq!(graph.edges[0].label, "orbits");
}

#[tokio::test]
async fn test_claude_empty_content_is_parse_diagnostic() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_body(r#"{"content": []}"#)
        .create_async()
        .await;

    let credentials = CredentialSet::new().with_single(ProviderName::Claude, "sk-ant");
    let graph = gateway_for(&server)
        .generate_graph(ProviderName::Claude, &credentials, "Text")
        .await
        .unwrap();

    assert_eq!(graph.diagnostic, Some(DiagnosticKind::ResponseFormat));
}
