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

//! Kgraph Core
//!
//! Provider-agnostic building blocks shared by the gateway, the renderer and
//! the command-line front end:
//! - **Graph model**: [`KnowledgeGraph`] with lenient per-entry decoding
//! - **Providers**: the closed set of supported LLM services
//! - **Credentials**: single keys and key pools, loaded from env or TOML
//! - **Prompt**: the one instruction template every provider receives
//! - **JSON repair**: bracket extraction for chatty model output
//! - **Diagnostics**: synthetic graphs that explain a failed provider call
//!
//! ```text
//! GraphRequest ──► prompt ──► provider reply ──► extract_json_object
//!                                                      │
//!                                                      ▼
//!                        KnowledgeGraph ◄── decode (skip malformed entries)
//!                              ▲
//!                GatewayError ─┘ (to_diagnostic_graph)
//! ```

pub mod credentials;
pub mod diagnostic;
pub mod error;
pub mod graph;
pub mod json_repair;
pub mod prompt;
pub mod provider;

pub use credentials::{Credential, CredentialSet};
pub use diagnostic::{truncate_detail, DiagnosticKind, DETAIL_MAX_CHARS};
pub use error::{GatewayError, GatewayResult};
pub use graph::{DecodeError, GraphDecode, GraphEdge, GraphNode, GraphRequest, KnowledgeGraph};
pub use json_repair::extract_json_object;
pub use prompt::{build_graph_prompt, GRAPH_PROMPT_TEMPLATE, MAX_NODES};
pub use provider::ProviderName;
