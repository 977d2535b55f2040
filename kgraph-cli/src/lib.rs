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
//! The interactive front end: a [`Session`] that tracks credentials, the
//! selected providers and the latest diagram per provider, plus the
//! plumbing behind the `kgraph` binary.

pub mod app;
pub mod session;

pub use session::{ExportPayload, RenderedResult, Session, SessionError};
