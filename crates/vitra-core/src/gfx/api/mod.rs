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

//! Plain-data types of the backend API surface.
//!
//! - **[`handle`]**: opaque resource identifiers.
//! - **[`buffer`]** / **[`texture`]** / **[`shader`]**: resource descriptors.
//! - **[`draw_state`]**: clear, blend, cull, depth, scissor configuration.
//! - **[`vertex`]**: vertex attribute layouts and the standard 48-byte
//!   interleaved vertex.
//! - **[`uniforms`]**: the canonical uniform block layouts shared by both
//!   backends.
//! - **[`mesh`]**: the framework-native mesh with separate attribute
//!   streams.

pub mod buffer;
pub mod draw_state;
pub mod handle;
pub mod mesh;
pub mod shader;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use buffer::{BufferDescriptor, BufferType, BufferUsageHint, IndexFormat};
pub use draw_state::{
    BlendMode, ClearPlanes, ClearState, ColorMask, CullFace, DepthFunc, DrawState, ScissorRect,
};
pub use handle::{
    BufferHandle, ComputePipelineHandle, RenderTargetHandle, ShaderHandle, TextureHandle,
};
pub use mesh::{Mesh, MeshId};
pub use shader::{BackendKind, ComputePipelineDescriptor, ShaderDescriptor, ShaderKind};
pub use texture::{FilterMode, PixelFormat, TextureDescriptor, WrapMode};
pub use uniforms::{
    BasicUniforms, BlockLayout, ColorUniforms, Light, LightingBlock, LightingMaterial,
    LightingTransform, PbrMaterial, PbrParams, PbrTransform, ReflectParams, SkyboxUniforms,
};
pub use vertex::{
    PrimitiveTopology, StandardVertex, VertexAttribute, VertexAttributeFormat, VertexLayout,
};

/// Per-frame statistics reported by a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Monotonic frame counter, incremented by `end_frame`.
    pub frame_number: u64,
    /// Draw calls recorded in the last completed frame.
    pub draw_calls: u32,
    /// Triangles submitted in the last completed frame.
    pub triangles: u32,
    /// Bytes of GPU memory currently attributed to live buffers/textures.
    pub vram_bytes: u64,
    /// High-water mark of `vram_bytes` over the backend's lifetime.
    pub vram_peak_bytes: u64,
}
