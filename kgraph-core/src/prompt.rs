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

//! Graph extraction prompt shared by every provider

/// Upper bound on nodes requested from the model.
pub const MAX_NODES: usize = 10;

const TEXT_PLACEHOLDER: &str = "{text}";

/// Instruction template; `{text}` is replaced with the user's input.
pub const GRAPH_PROMPT_TEMPLATE: &str = r#"Analyze the following text and express it as a knowledge graph.

Rules:
1. Respond ONLY with JSON in the format shown below.
2. Do not include any explanation or additional text.
3. Keep every node label short and clear, at most 5 words.
4. Express each relationship (edge) in 1-2 words.
5. Use at most 10 nodes in total.
6. The JSON must look like this:
{
    "nodes": [
        {"id": "concept1", "label": "Key concept (up to 3 words)"},
        {"id": "concept2", "label": "Short description"}
    ],
    "edges": [
        {"from": "concept1", "to": "concept2", "label": "relation"}
    ]
}

Text to analyze:
{text}

Analyze the text above and respond with JSON only."#;

/// Fill the shared template with the source text.
pub fn build_graph_prompt(text: &str) -> String {
    GRAPH_PROMPT_TEMPLATE.replacen(TEXT_PLACEHOLDER, text, 1)
}
