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

//! The legacy backend: a thin mapping of the backend contract onto an
//! immediate-mode API where state is global and objects are integer
//! names.
//!
//! Four keyed tables map handles to object names plus the metadata each
//! operation needs. One vertex array object is bound for the backend's
//! whole lifetime; the attribute layout is re-applied on every
//! `set_vertex_buffer`. Uniform values flow through a per-shader location
//! cache populated lazily on first use of each name.

use super::conversions as gl;
use glow::HasContext;
use std::collections::HashMap;
use vitra_core::gfx::traits::ReadbackFuture;
use vitra_core::math::{Extent3D, Origin3D};
use vitra_core::{
    BackendKind, BlendMode, BufferDescriptor, BufferHandle, ClearPlanes, ClearState, ColorMask,
    CullFace, DrawState, FrameStats, GraphicsBackend, IndexFormat, PixelFormat, PrimitiveTopology,
    RenderTargetHandle, ResourceError, ShaderDescriptor, ShaderError, ShaderHandle, ShaderKind,
    TextureDescriptor, TextureHandle, VertexLayout,
};

#[derive(Debug)]
struct GlBufferEntry {
    name: glow::Buffer,
    target: u32,
    usage: u32,
    size: u64,
}

#[derive(Debug)]
struct GlTextureEntry {
    name: glow::Texture,
    format: PixelFormat,
    width: u32,
    height: u32,
    mipmaps: bool,
}

#[derive(Debug)]
struct GlShaderEntry {
    program: glow::Program,
    /// name -> location, populated on first `set_uniform` per name.
    uniform_locations: HashMap<String, Option<glow::UniformLocation>>,
}

#[derive(Debug)]
struct GlRenderTargetEntry {
    framebuffer: glow::Framebuffer,
    width: u32,
    height: u32,
}

/// The legacy backend over a GL ES 3.0 context.
pub struct GlesBackend {
    gl: glow::Context,
    width: u32,
    height: u32,
    initialized: bool,

    next_handle: u64,
    buffers: HashMap<BufferHandle, GlBufferEntry>,
    textures: HashMap<TextureHandle, GlTextureEntry>,
    shaders: HashMap<ShaderHandle, GlShaderEntry>,
    render_targets: HashMap<RenderTargetHandle, GlRenderTargetEntry>,

    vao: Option<glow::VertexArray>,
    current_shader: ShaderHandle,
    default_shaders: [ShaderHandle; ShaderKind::ALL.len()],
    bound_index: Option<(BufferHandle, IndexFormat)>,
    bound_target_dimensions: Option<(u32, u32)>,

    frame_number: u64,
    draw_calls: u32,
    triangles: u32,
    last_stats: FrameStats,
}

impl GlesBackend {
    /// Wraps a context created by the host environment (a WebGL2 canvas
    /// context or a native GL ES / compatibility context).
    pub fn new(gl: glow::Context) -> Self {
        Self {
            gl,
            width: 0,
            height: 0,
            initialized: false,
            next_handle: 1,
            buffers: HashMap::new(),
            textures: HashMap::new(),
            shaders: HashMap::new(),
            render_targets: HashMap::new(),
            vao: None,
            current_shader: ShaderHandle::INVALID,
            default_shaders: [ShaderHandle::INVALID; ShaderKind::ALL.len()],
            bound_index: None,
            bound_target_dimensions: None,
            frame_number: 0,
            draw_calls: 0,
            triangles: 0,
            last_stats: FrameStats::default(),
        }
    }

    fn next(&mut self) -> u64 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    /// Looks up (and caches) a uniform location on the current program.
    fn uniform_location(&mut self, name: &str) -> Option<glow::UniformLocation> {
        let entry = self.shaders.get_mut(&self.current_shader)?;
        if !entry.uniform_locations.contains_key(name) {
            let location = unsafe { self.gl.get_uniform_location(entry.program, name) };
            if location.is_none() {
                log::debug!("GlesBackend: uniform '{name}' not found in the current program");
            }
            entry.uniform_locations.insert(name.to_string(), location);
        }
        entry.uniform_locations.get(name).cloned().flatten()
    }

    fn compile_stage(&self, stage: u32, source: &str, label: &str) -> Result<glow::Shader, ShaderError> {
        unsafe {
            let shader = self.gl.create_shader(stage).map_err(|e| {
                ShaderError::CompilationFailed {
                    label: label.to_string(),
                    details: e,
                }
            })?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let details = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(ShaderError::CompilationFailed {
                    label: label.to_string(),
                    details,
                });
            }
            Ok(shader)
        }
    }

    fn link_program(
        &self,
        descriptor: &ShaderDescriptor,
    ) -> Result<glow::Program, ShaderError> {
        let vs = self.compile_stage(glow::VERTEX_SHADER, &descriptor.vertex_source, &descriptor.name)?;
        let fs = match self.compile_stage(glow::FRAGMENT_SHADER, &descriptor.fragment_source, &descriptor.name)
        {
            Ok(fs) => fs,
            Err(e) => {
                unsafe { self.gl.delete_shader(vs) };
                return Err(e);
            }
        };

        unsafe {
            let program = match self.gl.create_program() {
                Ok(p) => p,
                Err(e) => {
                    self.gl.delete_shader(vs);
                    self.gl.delete_shader(fs);
                    return Err(ShaderError::LinkFailed {
                        label: descriptor.name.to_string(),
                        details: e,
                    });
                }
            };
            self.gl.attach_shader(program, vs);
            self.gl.attach_shader(program, fs);
            self.gl.link_program(program);
            // Stages can go as soon as the program holds them.
            self.gl.detach_shader(program, vs);
            self.gl.detach_shader(program, fs);
            self.gl.delete_shader(vs);
            self.gl.delete_shader(fs);

            if !self.gl.get_program_link_status(program) {
                let details = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(ShaderError::LinkFailed {
                    label: descriptor.name.to_string(),
                    details,
                });
            }

            // Route the lighting interface block to binding point 1.
            if let Some(index) = self.gl.get_uniform_block_index(program, "LightingBlock") {
                self.gl.uniform_block_binding(program, index, 1);
            }

            Ok(program)
        }
    }

    fn apply_blend(&self, blend: BlendMode) {
        unsafe {
            match blend {
                BlendMode::Opaque => self.gl.disable(glow::BLEND),
                BlendMode::Alpha => {
                    self.gl.enable(glow::BLEND);
                    self.gl.blend_func_separate(
                        glow::SRC_ALPHA,
                        glow::ONE_MINUS_SRC_ALPHA,
                        glow::ONE,
                        glow::ONE,
                    );
                }
                BlendMode::Additive => {
                    self.gl.enable(glow::BLEND);
                    self.gl.blend_func(glow::ONE, glow::ONE);
                }
                BlendMode::Multiply => {
                    self.gl.enable(glow::BLEND);
                    self.gl.blend_func(glow::DST_COLOR, glow::ZERO);
                }
            }
        }
    }

    fn count_triangles(&mut self, topology: PrimitiveTopology, vertices: u32) {
        match topology {
            PrimitiveTopology::TriangleList => self.triangles += vertices / 3,
            PrimitiveTopology::TriangleStrip | PrimitiveTopology::TriangleFan => {
                self.triangles += vertices.saturating_sub(2)
            }
            _ => {}
        }
    }
}

impl GraphicsBackend for GlesBackend {
    fn init(&mut self, width: u32, height: u32) -> bool {
        if self.initialized {
            log::warn!("GlesBackend: init called twice");
            return true;
        }
        self.width = width.max(1);
        self.height = height.max(1);

        unsafe {
            // One VAO for the backend's lifetime; layouts are re-applied
            // per vertex-buffer bind.
            let vao = match self.gl.create_vertex_array() {
                Ok(vao) => vao,
                Err(e) => {
                    log::error!("GlesBackend: failed to create the vertex array object: {e}");
                    return false;
                }
            };
            self.gl.bind_vertex_array(Some(vao));
            self.vao = Some(vao);

            self.gl.viewport(0, 0, self.width as i32, self.height as i32);
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.depth_func(glow::LEQUAL);
            self.gl.depth_mask(true);
        }
        self.apply_blend(BlendMode::Alpha);

        self.initialized = true;
        log::info!("GlesBackend: initialized at {}x{}", self.width, self.height);
        true
    }

    fn shutdown(&mut self) {
        unsafe {
            for (_, entry) in self.render_targets.drain() {
                self.gl.delete_framebuffer(entry.framebuffer);
            }
            for (_, entry) in self.shaders.drain() {
                self.gl.delete_program(entry.program);
            }
            for (_, entry) in self.textures.drain() {
                self.gl.delete_texture(entry.name);
            }
            for (_, entry) in self.buffers.drain() {
                self.gl.delete_buffer(entry.name);
            }
            if let Some(vao) = self.vao.take() {
                self.gl.bind_vertex_array(None);
                self.gl.delete_vertex_array(vao);
            }
        }
        self.default_shaders = [ShaderHandle::INVALID; ShaderKind::ALL.len()];
        self.current_shader = ShaderHandle::INVALID;
        self.initialized = false;
        log::info!("GlesBackend: shut down");
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        if self.bound_target_dimensions.is_none() {
            unsafe { self.gl.viewport(0, 0, width as i32, height as i32) };
        }
    }

    fn begin_frame(&mut self) {
        self.draw_calls = 0;
        self.triangles = 0;
    }

    fn end_frame(&mut self) {
        unsafe { self.gl.flush() };
        self.frame_number += 1;
        self.last_stats = FrameStats {
            frame_number: self.frame_number,
            draw_calls: self.draw_calls,
            triangles: self.triangles,
            vram_bytes: 0,
            vram_peak_bytes: 0,
        };
    }

    fn clear(&mut self, state: &ClearState) {
        let mut mask = 0;
        unsafe {
            if state.planes.contains(ClearPlanes::COLOR) {
                self.gl
                    .clear_color(state.color.r, state.color.g, state.color.b, state.color.a);
                mask |= glow::COLOR_BUFFER_BIT;
            }
            if state.planes.contains(ClearPlanes::DEPTH) {
                self.gl.clear_depth_f32(state.depth);
                mask |= glow::DEPTH_BUFFER_BIT;
            }
            if state.planes.contains(ClearPlanes::STENCIL) {
                self.gl.clear_stencil(state.stencil as i32);
                mask |= glow::STENCIL_BUFFER_BIT;
            }
            if mask != 0 {
                self.gl.clear(mask);
            }
        }
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        unsafe { self.gl.viewport(x, y, width as i32, height as i32) };
    }

    fn set_draw_state(&mut self, state: &DrawState) {
        self.apply_blend(state.blend);
        unsafe {
            match state.cull {
                CullFace::None => self.gl.disable(glow::CULL_FACE),
                CullFace::Front => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(glow::FRONT);
                }
                CullFace::Back => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(glow::BACK);
                }
            }
            match state.depth_func {
                Some(func) => {
                    self.gl.enable(glow::DEPTH_TEST);
                    self.gl.depth_func(gl::depth_func(func));
                }
                None => self.gl.disable(glow::DEPTH_TEST),
            }
            self.gl.depth_mask(state.depth_write);
            match state.scissor {
                Some(rect) => {
                    self.gl.enable(glow::SCISSOR_TEST);
                    self.gl
                        .scissor(rect.x, rect.y, rect.width as i32, rect.height as i32);
                }
                None => self.gl.disable(glow::SCISSOR_TEST),
            }
            self.gl.line_width(state.line_width.max(0.1));
            self.gl.color_mask(
                state.color_mask.contains(ColorMask::R),
                state.color_mask.contains(ColorMask::G),
                state.color_mask.contains(ColorMask::B),
                state.color_mask.contains(ColorMask::A),
            );
        }
    }

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        initial_data: Option<&[u8]>,
    ) -> BufferHandle {
        let target = gl::buffer_target(descriptor.buffer_type);
        let usage = gl::buffer_usage(descriptor.usage);
        let name = unsafe {
            match self.gl.create_buffer() {
                Ok(name) => name,
                Err(e) => {
                    log::error!("GlesBackend: buffer creation failed: {e}");
                    return BufferHandle::INVALID;
                }
            }
        };
        unsafe {
            self.gl.bind_buffer(target, Some(name));
            match initial_data {
                Some(data) => self.gl.buffer_data_u8_slice(target, data, usage),
                None => self.gl.buffer_data_size(target, descriptor.size as i32, usage),
            }
            self.gl.bind_buffer(target, None);
        }
        let handle = BufferHandle(self.next());
        self.buffers.insert(
            handle,
            GlBufferEntry {
                name,
                target,
                usage,
                size: descriptor.size,
            },
        );
        log::debug!(
            "GlesBackend: created {:?} buffer {handle:?} ({} bytes)",
            descriptor.buffer_type,
            descriptor.size
        );
        handle
    }

    fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        let Some(entry) = self.buffers.get(&buffer) else {
            return;
        };
        if offset + data.len() as u64 > entry.size {
            log::warn!("GlesBackend: update_buffer out of bounds on {buffer:?}");
            return;
        }
        unsafe {
            self.gl.bind_buffer(entry.target, Some(entry.name));
            self.gl
                .buffer_sub_data_u8_slice(entry.target, offset as i32, data);
            self.gl.bind_buffer(entry.target, None);
        }
    }

    fn read_buffer(&mut self, buffer: BufferHandle, offset: u64, out: &mut [u8]) -> bool {
        let Some(entry) = self.buffers.get(&buffer) else {
            return false;
        };
        if offset + out.len() as u64 > entry.size {
            return false;
        }
        unsafe {
            // Map with read access and copy synchronously.
            self.gl.bind_buffer(glow::COPY_READ_BUFFER, Some(entry.name));
            let ptr = self.gl.map_buffer_range(
                glow::COPY_READ_BUFFER,
                offset as i32,
                out.len() as i32,
                glow::MAP_READ_BIT,
            );
            if ptr.is_null() {
                self.gl.bind_buffer(glow::COPY_READ_BUFFER, None);
                return false;
            }
            std::ptr::copy_nonoverlapping(ptr, out.as_mut_ptr(), out.len());
            self.gl.unmap_buffer(glow::COPY_READ_BUFFER);
            self.gl.bind_buffer(glow::COPY_READ_BUFFER, None);
        }
        true
    }

    fn read_buffer_async(
        &mut self,
        buffer: BufferHandle,
        offset: u64,
        size: u64,
    ) -> ReadbackFuture {
        // The legacy API reads synchronously; the future is ready at once.
        let mut out = vec![0u8; size as usize];
        let result = if self.read_buffer(buffer, offset, &mut out) {
            Ok(out)
        } else {
            Err(ResourceError::NotFound)
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
        let (Some(src_entry), Some(dst_entry)) = (self.buffers.get(&src), self.buffers.get(&dst))
        else {
            return;
        };
        if src_offset + size > src_entry.size || dst_offset + size > dst_entry.size {
            log::warn!("GlesBackend: copy_buffer out of bounds");
            return;
        }
        unsafe {
            self.gl
                .bind_buffer(glow::COPY_READ_BUFFER, Some(src_entry.name));
            self.gl
                .bind_buffer(glow::COPY_WRITE_BUFFER, Some(dst_entry.name));
            self.gl.copy_buffer_sub_data(
                glow::COPY_READ_BUFFER,
                glow::COPY_WRITE_BUFFER,
                src_offset as i32,
                dst_offset as i32,
                size as i32,
            );
            self.gl.bind_buffer(glow::COPY_READ_BUFFER, None);
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, None);
        }
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if let Some(entry) = self.buffers.remove(&buffer) {
            unsafe { self.gl.delete_buffer(entry.name) };
            log::debug!("GlesBackend: destroyed buffer {buffer:?}");
        }
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        pixels: Option<&[u8]>,
    ) -> TextureHandle {
        let name = unsafe {
            match self.gl.create_texture() {
                Ok(name) => name,
                Err(e) => {
                    log::error!("GlesBackend: texture creation failed: {e}");
                    return TextureHandle::INVALID;
                }
            }
        };
        let (internal, format, ty) = gl::pixel_format(descriptor.format);
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(name));
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal,
                descriptor.width as i32,
                descriptor.height as i32,
                0,
                format,
                ty,
                glow::PixelUnpackData::Slice(pixels),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                gl::min_filter(descriptor.min_filter, descriptor.mipmaps),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                gl::mag_filter(descriptor.mag_filter),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                gl::wrap_mode(descriptor.wrap_u),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                gl::wrap_mode(descriptor.wrap_v),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_R,
                gl::wrap_mode(descriptor.wrap_w),
            );
            if descriptor.mipmaps && pixels.is_some() {
                self.gl.generate_mipmap(glow::TEXTURE_2D);
            }
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
        let handle = TextureHandle(self.next());
        self.textures.insert(
            handle,
            GlTextureEntry {
                name,
                format: descriptor.format,
                width: descriptor.width,
                height: descriptor.height,
                mipmaps: descriptor.mipmaps,
            },
        );
        log::debug!(
            "GlesBackend: created texture {handle:?} {}x{} {:?}",
            descriptor.width,
            descriptor.height,
            descriptor.format
        );
        handle
    }

    fn update_texture(
        &mut self,
        texture: TextureHandle,
        origin: Origin3D,
        size: Extent3D,
        pixels: &[u8],
    ) {
        let Some(entry) = self.textures.get(&texture) else {
            return;
        };
        let (_, format, ty) = gl::pixel_format(entry.format);
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(entry.name));
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                origin.x as i32,
                origin.y as i32,
                size.width as i32,
                size.height as i32,
                format,
                ty,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    fn generate_mipmaps(&mut self, texture: TextureHandle) {
        let Some(entry) = self.textures.get(&texture) else {
            return;
        };
        if !entry.mipmaps {
            log::debug!("GlesBackend: generating mipmaps for a texture created without them");
        }
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(entry.name));
            self.gl.generate_mipmap(glow::TEXTURE_2D);
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if let Some(entry) = self.textures.remove(&texture) {
            unsafe { self.gl.delete_texture(entry.name) };
            log::debug!("GlesBackend: destroyed texture {texture:?}");
        }
    }

    fn create_render_target(
        &mut self,
        color: TextureHandle,
        depth: Option<TextureHandle>,
    ) -> RenderTargetHandle {
        let Some(color_entry) = self.textures.get(&color) else {
            log::warn!("GlesBackend: create_render_target with unknown color texture");
            return RenderTargetHandle::INVALID;
        };
        let (width, height) = (color_entry.width, color_entry.height);
        let color_name = color_entry.name;
        let depth_entry = depth
            .filter(|h| h.is_valid())
            .and_then(|h| self.textures.get(&h));

        let framebuffer = unsafe {
            let framebuffer = match self.gl.create_framebuffer() {
                Ok(fb) => fb,
                Err(e) => {
                    log::error!("GlesBackend: framebuffer creation failed: {e}");
                    return RenderTargetHandle::INVALID;
                }
            };
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(color_name),
                0,
            );
            if let Some(depth_tex) = depth_entry {
                let attachment = if depth_tex.format == PixelFormat::Depth24Stencil8 {
                    glow::DEPTH_STENCIL_ATTACHMENT
                } else {
                    glow::DEPTH_ATTACHMENT
                };
                self.gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    attachment,
                    glow::TEXTURE_2D,
                    Some(depth_tex.name),
                    0,
                );
            }
            let status = self.gl.check_framebuffer_status(glow::FRAMEBUFFER);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            if status != glow::FRAMEBUFFER_COMPLETE {
                log::error!("GlesBackend: framebuffer incomplete (status {status:#x})");
                self.gl.delete_framebuffer(framebuffer);
                return RenderTargetHandle::INVALID;
            }
            framebuffer
        };

        let handle = RenderTargetHandle(self.next());
        self.render_targets.insert(
            handle,
            GlRenderTargetEntry {
                framebuffer,
                width,
                height,
            },
        );
        log::debug!("GlesBackend: created render target {handle:?} ({width}x{height})");
        handle
    }

    fn bind_render_target(&mut self, target: Option<RenderTargetHandle>) {
        match target {
            Some(handle) => {
                let Some(entry) = self.render_targets.get(&handle) else {
                    log::warn!("GlesBackend: bind_render_target with unknown {handle:?}");
                    return;
                };
                unsafe {
                    self.gl
                        .bind_framebuffer(glow::FRAMEBUFFER, Some(entry.framebuffer));
                    self.gl
                        .viewport(0, 0, entry.width as i32, entry.height as i32);
                }
                self.bound_target_dimensions = Some((entry.width, entry.height));
            }
            None => {
                unsafe {
                    self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                    self.gl.viewport(0, 0, self.width as i32, self.height as i32);
                }
                self.bound_target_dimensions = None;
            }
        }
    }

    fn destroy_render_target(&mut self, target: RenderTargetHandle) {
        if let Some(entry) = self.render_targets.remove(&target) {
            unsafe { self.gl.delete_framebuffer(entry.framebuffer) };
        }
    }

    fn create_shader(&mut self, descriptor: &ShaderDescriptor) -> ShaderHandle {
        if descriptor.compute_source.is_some() {
            log::warn!(
                "GlesBackend: compute stages are not supported; ignoring for '{}'",
                descriptor.name
            );
        }
        match self.link_program(descriptor) {
            Ok(program) => {
                let handle = ShaderHandle(self.next());
                self.shaders.insert(
                    handle,
                    GlShaderEntry {
                        program,
                        uniform_locations: HashMap::new(),
                    },
                );
                log::info!("GlesBackend: created shader '{}' {handle:?}", descriptor.name);
                handle
            }
            Err(e) => {
                log::error!("GlesBackend: {e}");
                ShaderHandle::INVALID
            }
        }
    }

    fn create_default_shader(&mut self, kind: ShaderKind) -> ShaderHandle {
        let cached = self.default_shaders[kind.index()];
        if cached.is_valid() {
            return cached;
        }
        let Some(descriptor) = crate::graphics::shaders::source(kind, BackendKind::GlEs) else {
            log::debug!(
                "GlesBackend: no embedded source for default shader '{}'",
                kind.name()
            );
            return ShaderHandle::INVALID;
        };
        let handle = self.create_shader(&descriptor);
        self.default_shaders[kind.index()] = handle;
        handle
    }

    fn use_shader(&mut self, shader: ShaderHandle) {
        if let Some(entry) = self.shaders.get(&shader) {
            unsafe { self.gl.use_program(Some(entry.program)) };
            self.current_shader = shader;
        } else if !shader.is_valid() {
            unsafe { self.gl.use_program(None) };
            self.current_shader = ShaderHandle::INVALID;
        }
    }

    fn destroy_shader(&mut self, shader: ShaderHandle) {
        if let Some(entry) = self.shaders.remove(&shader) {
            unsafe { self.gl.delete_program(entry.program) };
            if self.current_shader == shader {
                self.current_shader = ShaderHandle::INVALID;
            }
            for slot in &mut self.default_shaders {
                if *slot == shader {
                    *slot = ShaderHandle::INVALID;
                }
            }
            log::debug!("GlesBackend: destroyed shader {shader:?}");
        }
    }

    fn set_uniform_f32(&mut self, name: &str, value: f32) {
        if let Some(location) = self.uniform_location(name) {
            unsafe { self.gl.uniform_1_f32(Some(&location), value) };
        }
    }

    fn set_uniform_vec2(&mut self, name: &str, value: [f32; 2]) {
        if let Some(location) = self.uniform_location(name) {
            unsafe { self.gl.uniform_2_f32(Some(&location), value[0], value[1]) };
        }
    }

    fn set_uniform_vec3(&mut self, name: &str, value: [f32; 3]) {
        if let Some(location) = self.uniform_location(name) {
            unsafe {
                self.gl
                    .uniform_3_f32(Some(&location), value[0], value[1], value[2])
            };
        }
    }

    fn set_uniform_vec4(&mut self, name: &str, value: [f32; 4]) {
        if let Some(location) = self.uniform_location(name) {
            unsafe {
                self.gl
                    .uniform_4_f32(Some(&location), value[0], value[1], value[2], value[3])
            };
        }
    }

    fn set_uniform_mat3(&mut self, name: &str, value: [f32; 9]) {
        if let Some(location) = self.uniform_location(name) {
            unsafe {
                self.gl
                    .uniform_matrix_3_f32_slice(Some(&location), false, &value)
            };
        }
    }

    fn set_uniform_mat4(&mut self, name: &str, value: [f32; 16]) {
        if let Some(location) = self.uniform_location(name) {
            unsafe {
                self.gl
                    .uniform_matrix_4_f32_slice(Some(&location), false, &value)
            };
        }
    }

    fn set_texture(&mut self, name: &str, texture: TextureHandle, unit: u32) {
        let Some(entry) = self.textures.get(&texture) else {
            return;
        };
        let texture_name = entry.name;
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture_name));
        }
        if let Some(location) = self.uniform_location(name) {
            unsafe { self.gl.uniform_1_i32(Some(&location), unit as i32) };
        }
    }

    fn set_uniform_block(&mut self, binding: u32, buffer: BufferHandle) {
        let Some(entry) = self.buffers.get(&buffer) else {
            return;
        };
        unsafe {
            self.gl
                .bind_buffer_base(glow::UNIFORM_BUFFER, binding, Some(entry.name));
        }
    }

    fn set_vertex_buffer(&mut self, buffer: BufferHandle, layout: &VertexLayout) {
        let Some(entry) = self.buffers.get(&buffer) else {
            return;
        };
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(entry.name));
            // The single VAO is already bound; re-apply the layout.
            for attribute in &layout.attributes {
                self.gl.enable_vertex_attrib_array(attribute.location);
                self.gl.vertex_attrib_pointer_f32(
                    attribute.location,
                    attribute.format.component_count() as i32,
                    glow::FLOAT,
                    false,
                    layout.stride as i32,
                    attribute.offset as i32,
                );
            }
        }
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle, format: IndexFormat) {
        let Some(entry) = self.buffers.get(&buffer) else {
            return;
        };
        unsafe {
            self.gl
                .bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(entry.name));
        }
        self.bound_index = Some((buffer, format));
    }

    fn draw(&mut self, topology: PrimitiveTopology, first_vertex: u32, vertex_count: u32) {
        unsafe {
            self.gl
                .draw_arrays(gl::topology(topology), first_vertex as i32, vertex_count as i32);
        }
        self.draw_calls += 1;
        self.count_triangles(topology, vertex_count);
    }

    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        index_count: u32,
        base_vertex: i32,
    ) {
        let Some((_, format)) = self.bound_index else {
            return;
        };
        let element_type = gl::index_type(format);
        let offset = (first_index as u64 * format.byte_size()) as i32;
        unsafe {
            if base_vertex != 0 {
                self.gl.draw_elements_base_vertex(
                    gl::topology(topology),
                    index_count as i32,
                    element_type,
                    offset,
                    base_vertex,
                );
            } else {
                self.gl.draw_elements(
                    gl::topology(topology),
                    index_count as i32,
                    element_type,
                    offset,
                );
            }
        }
        self.draw_calls += 1;
        self.count_triangles(topology, index_count);
    }

    fn draw_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first_vertex: u32,
        vertex_count: u32,
        _first_instance: u32,
        instance_count: u32,
    ) {
        unsafe {
            self.gl.draw_arrays_instanced(
                gl::topology(topology),
                first_vertex as i32,
                vertex_count as i32,
                instance_count as i32,
            );
        }
        self.draw_calls += 1;
        self.count_triangles(topology, vertex_count * instance_count);
    }

    fn draw_indexed_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        index_count: u32,
        _base_vertex: i32,
        _first_instance: u32,
        instance_count: u32,
    ) {
        let Some((_, format)) = self.bound_index else {
            return;
        };
        let element_type = gl::index_type(format);
        let offset = (first_index as u64 * format.byte_size()) as i32;
        unsafe {
            self.gl.draw_elements_instanced(
                gl::topology(topology),
                index_count as i32,
                element_type,
                offset,
                instance_count as i32,
            );
        }
        self.draw_calls += 1;
        self.count_triangles(topology, index_count * instance_count);
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::GlEs
    }

    fn backend_name(&self) -> &'static str {
        "GL ES 3.0"
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn frame_stats(&self) -> FrameStats {
        self.last_stats
    }
}
