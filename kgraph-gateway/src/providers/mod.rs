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

//! Provider adapters
//!
//! Each adapter owns one vendor's request shape, auth header and reply
//! parsing. They all return a [`KnowledgeGraph`] or a [`GatewayError`]; the
//! gateway turns errors into diagnostic graphs.

use async_trait::async_trait;
use kgraph_core::{CredentialSet, GatewayResult, GraphRequest, KnowledgeGraph, ProviderName};

mod claude;
mod deepseek;
mod gemini;
mod openai;

pub use claude::ClaudeProvider;
pub use deepseek::DeepSeekProvider;
pub use gemini::{GeminiProvider, KeyPool};
pub use openai::OpenAiProvider;

#[async_trait]
pub trait GraphProvider: Send + Sync {
    fn name(&self) -> ProviderName;

    /// Ask the vendor for a graph of `request`'s text.
    async fn generate(
        &self,
        request: &GraphRequest,
        credentials: &CredentialSet,
    ) -> GatewayResult<KnowledgeGraph>;
}
