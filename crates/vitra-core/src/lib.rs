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

//! Backend-agnostic contracts for the Vitra graphics runtime.
//!
//! This crate defines the "common language" spoken between application code
//! and a concrete GPU backend: opaque resource handles, plain-data
//! descriptors, the [`GraphicsBackend`](gfx::traits::GraphicsBackend) trait,
//! the canonical uniform block layouts shared by every default shader, the
//! framework mesh type and its GPU adapter, and the error hierarchy.
//!
//! It deliberately has no dependency on any GPU API. The concrete backends
//! (WebGPU and GL ES 3.0) live in `vitra-infra` and implement the traits
//! declared here.

pub mod gfx;
pub mod math;
pub mod utils;

pub use gfx::api::*;
pub use gfx::context::RuntimeContext;
pub use math::{Extent3D, LinearRgba, Origin3D};
pub use gfx::error::{PipelineError, RenderError, ResourceError, ShaderError};
pub use gfx::fbo_bridge::FboBridge;
pub use gfx::mesh_adapter::MeshGpuCache;
pub use gfx::shader_manager::ShaderManager;
pub use gfx::traits::GraphicsBackend;
