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

//! Concrete implementations of the Vitra graphics contracts.
//!
//! Two backends implement [`vitra_core::GraphicsBackend`]:
//!
//! - [`graphics::webgpu::WebGpuBackend`] over `wgpu` (WebGPU semantics:
//!   explicit submission, immutable pipelines, bind groups, a uniform ring
//!   with dynamic offsets).
//! - [`graphics::gles::GlesBackend`] over `glow` (GL ES 3.0 semantics:
//!   global state, integer object names, lazily cached uniform locations).
//!
//! The embedded default shader sources for both shading languages live in
//! [`graphics::shaders`].

pub mod graphics;

pub use graphics::gles::GlesBackend;
pub use graphics::webgpu::{HeadlessHost, HostEnvironment, WebGpuBackend};
