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

//! Multi-provider LLM gateway
//!
//! Sends one extraction prompt to OpenAI, Gemini, Claude or DeepSeek and
//! normalizes whatever comes back into a [`KnowledgeGraph`]. Provider
//! failures never escape as errors; they become small diagnostic graphs so
//! every panel has something to draw.
//!
//! ```no_run
//! use kgraph_core::{CredentialSet, ProviderName};
//! use kgraph_gateway::{GatewayConfig, ProviderGateway};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let gateway = ProviderGateway::new(&GatewayConfig::default())?;
//! let credentials = CredentialSet::from_env();
//! let graph = gateway
//!     .generate_graph(ProviderName::Claude, &credentials, "Water boils at 100 degrees")
//!     .await?;
//! println!("{} nodes", graph.nodes.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod gateway;
pub mod providers;
pub mod reply;
pub mod transport;

pub use config::{GatewayConfig, ProviderSettings};
pub use gateway::{ProviderGateway, ProviderOutcome};
pub use providers::{
    ClaudeProvider, DeepSeekProvider, GeminiProvider, GraphProvider, KeyPool, OpenAiProvider,
};
pub use transport::RetryPolicy;

pub use kgraph_core::{CredentialSet, GatewayError, GatewayResult, KnowledgeGraph, ProviderName};
