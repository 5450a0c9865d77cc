// Copyright 2026 the Vitra authors
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

//! The public, backend-agnostic graphics contracts.
//!
//! This module defines the 'what' of drawing: handles, descriptors, the
//! [`GraphicsBackend`](traits::GraphicsBackend) trait, and the helpers that
//! operate purely through that trait (mesh adapter, shader manager, FBO
//! bridge, runtime context). The 'how' is provided by a concrete backend in
//! `vitra-infra`.

pub mod api;
pub mod context;
pub mod error;
pub mod fbo_bridge;
pub mod mesh_adapter;
pub mod shader_manager;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::*;
pub use error::{PipelineError, RenderError, ResourceError, ShaderError};
pub use traits::GraphicsBackend;
