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

//! The backend interface: one uniform contract over the legacy
//! immediate-mode API and the modern explicit-submission API.

use crate::gfx::api::{
    BackendKind, BufferDescriptor, BufferHandle, ClearState, ComputePipelineDescriptor,
    ComputePipelineHandle, DrawState, FrameStats, IndexFormat, PrimitiveTopology,
    RenderTargetHandle, ShaderDescriptor, ShaderHandle, ShaderKind, TextureDescriptor,
    TextureHandle, VertexLayout,
};
use crate::gfx::error::ResourceError;
use crate::math::{Extent3D, Origin3D};
use std::future::Future;
use std::pin::Pin;

/// The future returned by [`GraphicsBackend::read_buffer_async`].
///
/// Buffer readback on the modern API is inherently asynchronous; the
/// backend never awaits it inside a synchronous entry point. The legacy
/// backend resolves the future immediately.
pub type ReadbackFuture = Pin<Box<dyn Future<Output = Result<Vec<u8>, ResourceError>> + 'static>>;

/// The contract every backend satisfies.
///
/// Error discipline: the surface never unwinds. Resource creation reports
/// failure by returning an invalid handle, `init` by returning `false`,
/// and operations on unknown or destroyed handles are silent no-ops
/// (modulo logging). All operations run on one thread; the backend owns
/// its resources exclusively.
pub trait GraphicsBackend {
    // --- Lifecycle ---

    /// Initializes the backend for a `width` x `height` drawing surface.
    /// Returns `false` on failure, leaving the backend unusable.
    fn init(&mut self, width: u32, height: u32) -> bool;

    /// Releases every live resource in reverse dependency order.
    fn shutdown(&mut self);

    /// Adjusts the recorded surface size.
    fn resize(&mut self, width: u32, height: u32);

    /// Starts a frame: acquires the swapchain texture, resets per-frame
    /// state. If acquisition fails the frame is skipped (draws become
    /// no-ops and `end_frame` submits nothing).
    fn begin_frame(&mut self);

    /// Ends the frame: closes any open pass and submits recorded work.
    fn end_frame(&mut self);

    // --- State ---

    /// Records clear values for the selected planes. On the modern backend
    /// the clear is coalesced into the next render pass's load ops.
    fn clear(&mut self, state: &ClearState);

    /// Sets the viewport rectangle.
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Applies the fixed-function draw state.
    fn set_draw_state(&mut self, state: &DrawState);

    // --- Buffers ---

    /// Creates a buffer, optionally with initial contents. Returns an
    /// invalid handle on failure.
    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        initial_data: Option<&[u8]>,
    ) -> BufferHandle;

    /// Writes `data` into the buffer at `offset`.
    fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]);

    /// Synchronously reads buffer contents into `out`. Returns `false`
    /// where synchronous readback is unsupported (the modern backend);
    /// use [`read_buffer_async`](Self::read_buffer_async) there.
    fn read_buffer(&mut self, buffer: BufferHandle, offset: u64, out: &mut [u8]) -> bool;

    /// Reads `size` bytes starting at `offset`, completing asynchronously.
    fn read_buffer_async(&mut self, buffer: BufferHandle, offset: u64, size: u64)
        -> ReadbackFuture;

    /// Copies `size` bytes between buffers.
    fn copy_buffer(
        &mut self,
        src: BufferHandle,
        src_offset: u64,
        dst: BufferHandle,
        dst_offset: u64,
        size: u64,
    );

    /// Destroys a buffer. Unknown handles are ignored.
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    // --- Textures ---

    /// Creates a texture, optionally uploading base-level pixels. Returns
    /// an invalid handle on failure.
    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        pixels: Option<&[u8]>,
    ) -> TextureHandle;

    /// Uploads a region of the base mip level.
    fn update_texture(
        &mut self,
        texture: TextureHandle,
        origin: Origin3D,
        size: Extent3D,
        pixels: &[u8],
    );

    /// Regenerates the mip chain from the base level.
    fn generate_mipmaps(&mut self, texture: TextureHandle);

    /// Destroys a texture. Unknown handles are ignored.
    fn destroy_texture(&mut self, texture: TextureHandle);

    // --- Render targets ---

    /// Pairs a color texture with an optional depth texture. Returns an
    /// invalid handle if the color texture is unknown.
    fn create_render_target(
        &mut self,
        color: TextureHandle,
        depth: Option<TextureHandle>,
    ) -> RenderTargetHandle;

    /// Binds a render target, or the default surface for `None`. On the
    /// modern backend this ends any open render pass.
    fn bind_render_target(&mut self, target: Option<RenderTargetHandle>);

    /// Destroys a render target (not its textures).
    fn destroy_render_target(&mut self, target: RenderTargetHandle);

    // --- Shaders ---

    /// Compiles and links a shader program. Compile or link failure logs
    /// the info log and returns an invalid handle.
    fn create_shader(&mut self, descriptor: &ShaderDescriptor) -> ShaderHandle;

    /// Creates one of the backend's embedded default shaders. Returns an
    /// invalid handle for kinds this backend has no source for.
    fn create_default_shader(&mut self, kind: ShaderKind) -> ShaderHandle;

    /// Makes a shader current for subsequent uniforms and draws. An
    /// invalid handle restores automatic shader selection.
    fn use_shader(&mut self, shader: ShaderHandle);

    /// Destroys a shader and its cached pipelines.
    fn destroy_shader(&mut self, shader: ShaderHandle);

    // --- Uniforms ---

    /// Sets a scalar uniform on the current shader by name.
    fn set_uniform_f32(&mut self, name: &str, value: f32);
    /// Sets a vec2 uniform by name.
    fn set_uniform_vec2(&mut self, name: &str, value: [f32; 2]);
    /// Sets a vec3 uniform by name.
    fn set_uniform_vec3(&mut self, name: &str, value: [f32; 3]);
    /// Sets a vec4 uniform by name.
    fn set_uniform_vec4(&mut self, name: &str, value: [f32; 4]);
    /// Sets a column-major 3x3 matrix uniform by name.
    fn set_uniform_mat3(&mut self, name: &str, value: [f32; 9]);
    /// Sets a column-major 4x4 matrix uniform by name.
    fn set_uniform_mat4(&mut self, name: &str, value: [f32; 16]);

    /// Binds a texture to the sampler uniform `name` at `unit`.
    fn set_texture(&mut self, name: &str, texture: TextureHandle, unit: u32);

    /// Binds a buffer to a uniform-block binding point.
    fn set_uniform_block(&mut self, binding: u32, buffer: BufferHandle);

    // --- Drawing ---

    /// Binds the vertex buffer with its attribute layout. Invalid handles
    /// are no-ops.
    fn set_vertex_buffer(&mut self, buffer: BufferHandle, layout: &VertexLayout);

    /// Binds the index buffer with its element format.
    fn set_index_buffer(&mut self, buffer: BufferHandle, format: IndexFormat);

    /// Draws `vertex_count` vertices starting at `first_vertex`.
    fn draw(&mut self, topology: PrimitiveTopology, first_vertex: u32, vertex_count: u32);

    /// Draws `index_count` indices starting at `first_index`, offset by
    /// `base_vertex`.
    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        index_count: u32,
        base_vertex: i32,
    );

    /// Instanced non-indexed draw.
    fn draw_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first_vertex: u32,
        vertex_count: u32,
        first_instance: u32,
        instance_count: u32,
    );

    /// Instanced indexed draw.
    #[allow(clippy::too_many_arguments)]
    fn draw_indexed_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        index_count: u32,
        base_vertex: i32,
        first_instance: u32,
        instance_count: u32,
    );

    // --- Compute (optional) ---

    /// Whether this backend supports compute dispatch. Callers must check
    /// before using any compute operation.
    fn supports_compute(&self) -> bool {
        false
    }

    /// Creates a compute pipeline. The default implementation fails.
    fn create_compute_pipeline(
        &mut self,
        _descriptor: &ComputePipelineDescriptor,
    ) -> ComputePipelineHandle {
        log::warn!(
            "{}: compute pipelines are not supported on this backend",
            self.backend_name()
        );
        ComputePipelineHandle::INVALID
    }

    /// Destroys a compute pipeline.
    fn destroy_compute_pipeline(&mut self, _pipeline: ComputePipelineHandle) {}

    /// Binds a storage buffer for compute.
    fn bind_storage_buffer(&mut self, _binding: u32, _buffer: BufferHandle) {}

    /// Binds a storage texture for compute.
    fn bind_storage_texture(&mut self, _binding: u32, _texture: TextureHandle) {}

    /// Dispatches compute work. Ends any open render pass first.
    fn dispatch_compute(&mut self, _pipeline: ComputePipelineHandle, _x: u32, _y: u32, _z: u32) {}

    /// Inserts a memory barrier between compute and subsequent reads.
    fn memory_barrier(&mut self) {}

    // --- Queries ---

    /// Which API family this backend speaks.
    fn backend_kind(&self) -> BackendKind;

    /// A human-readable backend name.
    fn backend_name(&self) -> &'static str;

    /// Current surface width in pixels.
    fn width(&self) -> u32;

    /// Current surface height in pixels.
    fn height(&self) -> u32;

    /// Statistics for the last completed frame.
    fn frame_stats(&self) -> FrameStats {
        FrameStats::default()
    }
}
