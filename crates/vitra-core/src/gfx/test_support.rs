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

//! A mock backend for exercising the trait-driven helpers without a GPU.

use crate::gfx::api::{
    BackendKind, BufferDescriptor, BufferHandle, ClearState, DrawState, FrameStats, IndexFormat,
    PrimitiveTopology, RenderTargetHandle, ShaderDescriptor, ShaderHandle, ShaderKind,
    TextureDescriptor, TextureHandle, VertexLayout,
};
use crate::gfx::traits::{GraphicsBackend, ReadbackFuture};
use crate::gfx::ResourceError;
use crate::math::{Extent3D, Origin3D};
use std::collections::{HashMap, HashSet};

/// One recorded draw call.
#[derive(Debug, Clone, Copy)]
pub struct MockDraw {
    pub topology: PrimitiveTopology,
    pub first: u32,
    pub count: u32,
    pub base_vertex: i32,
    pub instances: u32,
    pub indexed: bool,
}

/// An in-memory [`GraphicsBackend`] that records operations and stores
/// buffer contents, so cache, readback, and draw logic can be asserted.
#[derive(Debug, Default)]
pub struct MockBackend {
    next_id: u64,
    width: u32,
    height: u32,
    buffers: HashMap<BufferHandle, Vec<u8>>,
    destroyed_buffers: HashSet<BufferHandle>,
    buffers_created: usize,
    shaders: HashMap<ShaderHandle, String>,
    shaders_created: usize,
    textures: HashSet<TextureHandle>,
    render_targets: HashSet<RenderTargetHandle>,
    pub draws: Vec<MockDraw>,
    pub bound_vertex_buffer: Option<BufferHandle>,
    pub bound_index_buffer: Option<(BufferHandle, IndexFormat)>,
    pub current_shader: ShaderHandle,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            width: 640,
            height: 480,
            ..Default::default()
        }
    }

    fn next(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn buffers_created(&self) -> usize {
        self.buffers_created
    }

    pub fn shaders_created(&self) -> usize {
        self.shaders_created
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffer_is_destroyed(&self, handle: BufferHandle) -> bool {
        self.destroyed_buffers.contains(&handle)
    }

    pub fn buffer_contents(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&handle).map(Vec::as_slice)
    }

    pub fn last_draw(&self) -> Option<MockDraw> {
        self.draws.last().copied()
    }
}

impl GraphicsBackend for MockBackend {
    fn init(&mut self, width: u32, height: u32) -> bool {
        self.width = width;
        self.height = height;
        true
    }

    fn shutdown(&mut self) {
        self.buffers.clear();
        self.shaders.clear();
        self.textures.clear();
        self.render_targets.clear();
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn begin_frame(&mut self) {}
    fn end_frame(&mut self) {}
    fn clear(&mut self, _state: &ClearState) {}
    fn set_viewport(&mut self, _x: i32, _y: i32, _width: u32, _height: u32) {}
    fn set_draw_state(&mut self, _state: &DrawState) {}

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        initial_data: Option<&[u8]>,
    ) -> BufferHandle {
        let handle = BufferHandle(self.next());
        let mut contents = vec![0u8; descriptor.size as usize];
        if let Some(data) = initial_data {
            contents[..data.len()].copy_from_slice(data);
        }
        self.buffers.insert(handle, contents);
        self.buffers_created += 1;
        handle
    }

    fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        if let Some(contents) = self.buffers.get_mut(&buffer) {
            let offset = offset as usize;
            if offset + data.len() <= contents.len() {
                contents[offset..offset + data.len()].copy_from_slice(data);
            }
        }
    }

    fn read_buffer(&mut self, buffer: BufferHandle, offset: u64, out: &mut [u8]) -> bool {
        match self.buffers.get(&buffer) {
            Some(contents) => {
                let offset = offset as usize;
                if offset + out.len() > contents.len() {
                    return false;
                }
                out.copy_from_slice(&contents[offset..offset + out.len()]);
                true
            }
            None => false,
        }
    }

    fn read_buffer_async(
        &mut self,
        buffer: BufferHandle,
        offset: u64,
        size: u64,
    ) -> ReadbackFuture {
        let result = match self.buffers.get(&buffer) {
            Some(contents) => {
                let offset = offset as usize;
                let end = offset + size as usize;
                if end <= contents.len() {
                    Ok(contents[offset..end].to_vec())
                } else {
                    Err(ResourceError::OutOfBounds)
                }
            }
            None => Err(ResourceError::NotFound),
        };
        Box::pin(async move { result })
    }

    fn copy_buffer(
        &mut self,
        src: BufferHandle,
        src_offset: u64,
        dst: BufferHandle,
        dst_offset: u64,
        size: u64,
    ) {
        let Some(data) = self.buffers.get(&src).map(|c| {
            c[src_offset as usize..(src_offset + size) as usize].to_vec()
        }) else {
            return;
        };
        if let Some(contents) = self.buffers.get_mut(&dst) {
            contents[dst_offset as usize..(dst_offset + size) as usize].copy_from_slice(&data);
        }
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer).is_some() {
            self.destroyed_buffers.insert(buffer);
        }
    }

    fn create_texture(
        &mut self,
        _descriptor: &TextureDescriptor,
        _pixels: Option<&[u8]>,
    ) -> TextureHandle {
        let handle = TextureHandle(self.next());
        self.textures.insert(handle);
        handle
    }

    fn update_texture(
        &mut self,
        _texture: TextureHandle,
        _origin: Origin3D,
        _size: Extent3D,
        _pixels: &[u8],
    ) {
    }

    fn generate_mipmaps(&mut self, _texture: TextureHandle) {}

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
    }

    fn create_render_target(
        &mut self,
        color: TextureHandle,
        _depth: Option<TextureHandle>,
    ) -> RenderTargetHandle {
        if !self.textures.contains(&color) {
            return RenderTargetHandle::INVALID;
        }
        let handle = RenderTargetHandle(self.next());
        self.render_targets.insert(handle);
        handle
    }

    fn bind_render_target(&mut self, _target: Option<RenderTargetHandle>) {}

    fn destroy_render_target(&mut self, target: RenderTargetHandle) {
        self.render_targets.remove(&target);
    }

    fn create_shader(&mut self, descriptor: &ShaderDescriptor) -> ShaderHandle {
        let handle = ShaderHandle(self.next());
        self.shaders.insert(handle, descriptor.name.to_string());
        self.shaders_created += 1;
        handle
    }

    fn create_default_shader(&mut self, kind: ShaderKind) -> ShaderHandle {
        let handle = ShaderHandle(self.next());
        self.shaders.insert(handle, kind.name().to_string());
        self.shaders_created += 1;
        handle
    }

    fn use_shader(&mut self, shader: ShaderHandle) {
        self.current_shader = shader;
    }

    fn destroy_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
    }

    fn set_uniform_f32(&mut self, _name: &str, _value: f32) {}
    fn set_uniform_vec2(&mut self, _name: &str, _value: [f32; 2]) {}
    fn set_uniform_vec3(&mut self, _name: &str, _value: [f32; 3]) {}
    fn set_uniform_vec4(&mut self, _name: &str, _value: [f32; 4]) {}
    fn set_uniform_mat3(&mut self, _name: &str, _value: [f32; 9]) {}
    fn set_uniform_mat4(&mut self, _name: &str, _value: [f32; 16]) {}
    fn set_texture(&mut self, _name: &str, _texture: TextureHandle, _unit: u32) {}
    fn set_uniform_block(&mut self, _binding: u32, _buffer: BufferHandle) {}

    fn set_vertex_buffer(&mut self, buffer: BufferHandle, _layout: &VertexLayout) {
        if self.buffers.contains_key(&buffer) {
            self.bound_vertex_buffer = Some(buffer);
        }
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle, format: IndexFormat) {
        if self.buffers.contains_key(&buffer) {
            self.bound_index_buffer = Some((buffer, format));
        }
    }

    fn draw(&mut self, topology: PrimitiveTopology, first_vertex: u32, vertex_count: u32) {
        self.draws.push(MockDraw {
            topology,
            first: first_vertex,
            count: vertex_count,
            base_vertex: 0,
            instances: 1,
            indexed: false,
        });
    }

    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        index_count: u32,
        base_vertex: i32,
    ) {
        self.draws.push(MockDraw {
            topology,
            first: first_index,
            count: index_count,
            base_vertex,
            instances: 1,
            indexed: true,
        });
    }

    fn draw_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first_vertex: u32,
        vertex_count: u32,
        _first_instance: u32,
        instance_count: u32,
    ) {
        self.draws.push(MockDraw {
            topology,
            first: first_vertex,
            count: vertex_count,
            base_vertex: 0,
            instances: instance_count,
            indexed: false,
        });
    }

    fn draw_indexed_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        index_count: u32,
        base_vertex: i32,
        _first_instance: u32,
        instance_count: u32,
    ) {
        self.draws.push(MockDraw {
            topology,
            first: first_index,
            count: index_count,
            base_vertex,
            instances: instance_count,
            indexed: true,
        });
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Unknown
    }

    fn backend_name(&self) -> &'static str {
        "MockBackend"
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn frame_stats(&self) -> FrameStats {
        FrameStats {
            draw_calls: self.draws.len() as u32,
            ..FrameStats::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::api::{BufferType, BufferUsageHint};
    use std::borrow::Cow;

    fn descriptor(size: u64) -> BufferDescriptor<'static> {
        BufferDescriptor {
            label: Some(Cow::Borrowed("test")),
            buffer_type: BufferType::Vertex,
            usage: BufferUsageHint::Static,
            size,
        }
    }

    #[test]
    fn handles_are_distinct_and_valid() {
        let mut backend = MockBackend::new();
        let a = backend.create_buffer(&descriptor(16), None);
        let b = backend.create_buffer(&descriptor(16), None);
        assert!(a.is_valid() && b.is_valid());
        assert_ne!(a, b);
    }

    #[test]
    fn write_then_read_roundtrip() {
        let mut backend = MockBackend::new();
        let buffer = backend.create_buffer(&descriptor(8), None);
        backend.update_buffer(buffer, 2, &[1, 2, 3, 4]);
        let mut out = [0u8; 4];
        assert!(backend.read_buffer(buffer, 2, &mut out));
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[test]
    fn destroyed_handle_operations_are_noops() {
        let mut backend = MockBackend::new();
        let buffer = backend.create_buffer(&descriptor(8), None);
        backend.destroy_buffer(buffer);
        backend.update_buffer(buffer, 0, &[9; 4]);
        let mut out = [0u8; 4];
        assert!(!backend.read_buffer(buffer, 0, &mut out));
        backend.set_vertex_buffer(buffer, &crate::gfx::api::StandardVertex::layout());
        assert_eq!(backend.bound_vertex_buffer, None);
    }

    #[test]
    fn async_readback_resolves() {
        let mut backend = MockBackend::new();
        let buffer = backend.create_buffer(&descriptor(4), Some(&[5, 6, 7, 8]));
        let future = backend.read_buffer_async(buffer, 1, 2);
        let bytes = futures_block_on(future).unwrap();
        assert_eq!(bytes, vec![6, 7]);
    }

    /// A tiny executor; the mock's futures are always immediately ready.
    fn futures_block_on<F: std::future::Future + ?Sized>(
        mut future: std::pin::Pin<Box<F>>,
    ) -> F::Output {
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
        fn noop(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            RawWaker::new(std::ptr::null(), &VTABLE)
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
        let waker = unsafe { Waker::from_raw(RawWaker::new(std::ptr::null(), &VTABLE)) };
        let mut cx = Context::from_waker(&waker);
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(output) => output,
            Poll::Pending => panic!("mock future should be immediately ready"),
        }
    }
}
