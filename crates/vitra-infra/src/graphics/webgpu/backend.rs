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

//! The modern backend over the explicit-submission API.
//!
//! Draws must be recorded inside a render pass inside a command encoder;
//! pipelines are immutable and cached per (shader, topology); per-draw
//! uniforms ride a 256-byte-aligned ring buffer bound with dynamic
//! offsets. The render pass is deferred: it begins on the first draw
//! after frame start and ends at any pass boundary (clear, render-target
//! bind, buffer copy, compute dispatch, end-of-frame).

use super::conversions::{topology_to_wgpu, IntoWgpu};
use super::host::HostEnvironment;
use super::mipgen::MipGenerator;
use super::pbr::{placeholder_texture, PbrResources};
use super::pipeline::{
    create_default_bind_group_layout, PipelineSet, UNIFORM_BINDING_SIZE,
};
use super::readback::start_readback;
use super::reflect::ReflectResources;
use super::ring::{RingSlot, UniformRing};
use super::skybox::SkyboxResources;
use std::collections::HashMap;
use std::num::NonZeroU64;
use vitra_core::gfx::traits::ReadbackFuture;
use vitra_core::uniforms::BlockLayout;
use vitra_core::{
    BackendKind, BasicUniforms, BufferDescriptor, BufferHandle, ClearPlanes, ClearState,
    ColorUniforms, ComputePipelineDescriptor, ComputePipelineHandle, DrawState, FrameStats,
    GraphicsBackend, IndexFormat, LightingBlock, LightingTransform, PbrMaterial, PbrParams,
    PbrTransform, PixelFormat, PrimitiveTopology, ReflectParams, RenderTargetHandle, ResourceError,
    ShaderDescriptor, ShaderHandle, ShaderKind, SkyboxUniforms, StandardVertex, TextureDescriptor,
    TextureHandle, VertexLayout,
};
use vitra_core::math::{Extent3D, Origin3D};

/// Size of the uniform scratch; one ring slot.
const SCRATCH_BYTES: usize = 256;

/// Fixed number of texture binding slots.
const TEXTURE_SLOTS: usize = 8;

#[derive(Debug)]
struct BufferEntry {
    buffer: wgpu::Buffer,
    size: u64,
}

#[derive(Debug)]
struct TextureEntry {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    format: PixelFormat,
    width: u32,
    height: u32,
    mip_level_count: u32,
    size: u64,
}

#[derive(Debug)]
struct RenderTargetEntry {
    color_view: wgpu::TextureView,
    depth_view: Option<wgpu::TextureView>,
    width: u32,
    height: u32,
}

#[derive(Debug)]
struct ShaderEntry {
    set: PipelineSet,
    block_layout: BlockLayout,
    uses_texture: bool,
    uses_lighting: bool,
    /// The shader's own uniform buffer, used when the ring is exhausted.
    fallback_buffer: wgpu::Buffer,
    ring_bind_group: Option<wgpu::BindGroup>,
    fallback_bind_group: Option<wgpu::BindGroup>,
    ring_generation: u64,
    texture_generation: u64,
}

#[derive(Debug)]
struct ComputeEntry {
    pipeline: wgpu::ComputePipeline,
}

#[derive(Debug, Clone, Copy)]
enum StorageBinding {
    Buffer(BufferHandle),
    Texture(TextureHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialMode {
    None,
    Pbr { image_based: bool },
    Reflection,
}

#[derive(Debug, Clone, Copy)]
enum DrawCommand {
    Arrays {
        first: u32,
        count: u32,
        first_instance: u32,
        instances: u32,
    },
    Indexed {
        first: u32,
        count: u32,
        base_vertex: i32,
        first_instance: u32,
        instances: u32,
    },
}

/// The modern backend.
pub struct WebGpuBackend {
    host: Box<dyn HostEnvironment>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    surface_format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    initialized: bool,

    next_handle: u64,
    buffers: HashMap<BufferHandle, BufferEntry>,
    textures: HashMap<TextureHandle, TextureEntry>,
    shaders: HashMap<ShaderHandle, ShaderEntry>,
    render_targets: HashMap<RenderTargetHandle, RenderTargetEntry>,
    compute_pipelines: HashMap<ComputePipelineHandle, ComputeEntry>,

    // Frame state
    frame_active: bool,
    swapchain_view: Option<wgpu::TextureView>,
    encoder: Option<wgpu::CommandEncoder>,
    pass: Option<wgpu::RenderPass<'static>>,
    pending_clear: Option<ClearState>,
    last_clear: ClearState,
    bound_target: Option<RenderTargetHandle>,
    depth_texture: Option<wgpu::Texture>,
    depth_view: Option<wgpu::TextureView>,

    // Uniform routing
    ring: Option<UniformRing>,
    scratch: [u8; SCRATCH_BYTES],
    scratch_layout: BlockLayout,

    // Shader selection state
    current_shader: ShaderHandle,
    default_shaders: [ShaderHandle; ShaderKind::ALL.len()],
    lighting_enabled: bool,
    lighting_buffer: Option<wgpu::Buffer>,
    screen_space: bool,
    texture_slots: [TextureHandle; TEXTURE_SLOTS],
    texture_generation: u64,
    placeholder_view: Option<wgpu::TextureView>,
    placeholder_sampler: Option<wgpu::Sampler>,
    user_uniform_block: Option<BufferHandle>,

    // Draw submission state
    bound_vertex_buffer: Option<BufferHandle>,
    bound_index: Option<(BufferHandle, IndexFormat)>,
    viewport: Option<(i32, i32, u32, u32)>,
    draw_state: DrawState,
    draw_state_noted: bool,

    // Specialized subsystems
    special: SpecialMode,
    pbr: Option<PbrResources>,
    skybox: Option<SkyboxResources>,
    reflect: Option<ReflectResources>,
    env_map: TextureHandle,
    irradiance_map: TextureHandle,
    brdf_lut: TextureHandle,
    mipgen: MipGenerator,

    // Compute state
    storage_bindings: Vec<(u32, StorageBinding)>,

    // Statistics
    frame_number: u64,
    draw_calls: u32,
    triangles: u32,
    last_stats: FrameStats,
    vram_bytes: u64,
    vram_peak_bytes: u64,
}

impl WebGpuBackend {
    /// Wraps a host environment. The backend is unusable until
    /// [`GraphicsBackend::init`] succeeds.
    pub fn new(host: Box<dyn HostEnvironment>) -> Self {
        Self {
            host,
            device: None,
            queue: None,
            surface_format: wgpu::TextureFormat::Bgra8Unorm,
            width: 0,
            height: 0,
            initialized: false,
            next_handle: 1,
            buffers: HashMap::new(),
            textures: HashMap::new(),
            shaders: HashMap::new(),
            render_targets: HashMap::new(),
            compute_pipelines: HashMap::new(),
            frame_active: false,
            swapchain_view: None,
            encoder: None,
            pass: None,
            pending_clear: None,
            last_clear: ClearState::default(),
            bound_target: None,
            depth_texture: None,
            depth_view: None,
            ring: None,
            scratch: [0; SCRATCH_BYTES],
            scratch_layout: BlockLayout::Basic,
            current_shader: ShaderHandle::INVALID,
            default_shaders: [ShaderHandle::INVALID; ShaderKind::ALL.len()],
            lighting_enabled: false,
            lighting_buffer: None,
            screen_space: false,
            texture_slots: [TextureHandle::INVALID; TEXTURE_SLOTS],
            texture_generation: 0,
            placeholder_view: None,
            placeholder_sampler: None,
            user_uniform_block: None,
            bound_vertex_buffer: None,
            bound_index: None,
            viewport: None,
            draw_state: DrawState::default(),
            draw_state_noted: false,
            special: SpecialMode::None,
            pbr: None,
            skybox: None,
            reflect: None,
            env_map: TextureHandle::INVALID,
            irradiance_map: TextureHandle::INVALID,
            brdf_lut: TextureHandle::INVALID,
            mipgen: MipGenerator::default(),
            storage_bindings: Vec::new(),
            frame_number: 0,
            draw_calls: 0,
            triangles: 0,
            last_stats: FrameStats::default(),
            vram_bytes: 0,
            vram_peak_bytes: 0,
        }
    }

    fn next(&mut self) -> u64 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    fn track_vram(&mut self, delta: i64) {
        self.vram_bytes = self.vram_bytes.saturating_add_signed(delta);
        self.vram_peak_bytes = self.vram_peak_bytes.max(self.vram_bytes);
    }

    /// Pumps device callbacks without blocking (`map_async` completions).
    pub fn poll_device_non_blocking(&self) {
        if let Some(device) = &self.device {
            if let Err(e) = device.poll(wgpu::PollType::Poll) {
                log::warn!("WebGpuBackend: non-blocking device poll failed: {e:?}");
            }
        }
    }

    /// Blocks until all submitted work and callbacks complete. Used at
    /// shutdown and by tests awaiting readback.
    pub fn poll_device_blocking(&self) {
        if let Some(device) = &self.device {
            if let Err(e) = device.poll(wgpu::PollType::wait_indefinitely()) {
                log::warn!("WebGpuBackend: blocking device poll failed: {e:?}");
            }
        }
    }

    /// The current uniform-ring write offset (test and diagnostic hook).
    pub fn uniform_ring_offset(&self) -> u64 {
        self.ring.as_ref().map(UniformRing::offset).unwrap_or(0)
    }

    /// Number of pipelines cached for a shader (diagnostic hook).
    pub fn pipeline_count(&self, shader: ShaderHandle) -> usize {
        self.shaders
            .get(&shader)
            .map(|e| e.set.pipeline_count())
            .unwrap_or(0)
    }

    /// Enables or disables the lighting shading path.
    pub fn set_lighting_enabled(&mut self, enabled: bool) {
        self.lighting_enabled = enabled;
        self.refresh_scratch_layout();
    }

    /// Switches between 3D and screen-space (2D) shader selection.
    pub fn set_screen_space(&mut self, enabled: bool) {
        self.screen_space = enabled;
    }

    /// Uploads the full lighting block.
    pub fn set_lighting(&mut self, block: &LightingBlock) {
        if let (Some(queue), Some(buffer)) = (&self.queue, &self.lighting_buffer) {
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(block));
        }
    }

    /// Binds the equirectangular environment map used by the PBR,
    /// skybox, and reflection pipelines.
    pub fn set_environment_map(&mut self, texture: TextureHandle) {
        self.env_map = texture;
        self.invalidate_special_bind_groups();
    }

    /// Binds the diffuse irradiance map for PBR.
    pub fn set_irradiance_map(&mut self, texture: TextureHandle) {
        self.irradiance_map = texture;
        self.invalidate_special_bind_groups();
    }

    /// Binds the split-sum BRDF lookup table for PBR.
    pub fn set_brdf_lut(&mut self, texture: TextureHandle) {
        self.brdf_lut = texture;
        self.invalidate_special_bind_groups();
    }

    fn invalidate_special_bind_groups(&mut self) {
        if let Some(pbr) = &mut self.pbr {
            pbr.invalidate_bind_group();
        }
        if let Some(skybox) = &mut self.skybox {
            skybox.invalidate_bind_group();
        }
        if let Some(reflect) = &mut self.reflect {
            reflect.invalidate_bind_group();
        }
    }

    /// Starts a physically-based draw scope. When the environment map is
    /// bound the image-based pipeline is used; otherwise the analytical
    /// fallback. Draws until [`end_pbr`](Self::end_pbr) go through it.
    pub fn begin_pbr(
        &mut self,
        transform: &PbrTransform,
        material: &PbrMaterial,
        params: &PbrParams,
    ) {
        let image_based = self.env_map.is_valid() && self.textures.contains_key(&self.env_map);
        let mut params = *params;
        params.has_env_map = u32::from(image_based);
        params.has_irradiance =
            u32::from(self.irradiance_map.is_valid() && self.textures.contains_key(&self.irradiance_map));
        params.has_brdf_lut =
            u32::from(self.brdf_lut.is_valid() && self.textures.contains_key(&self.brdf_lut));

        if let (Some(queue), Some(pbr)) = (&self.queue, &self.pbr) {
            pbr.write_transform(queue, transform);
            pbr.write_material(queue, material);
            pbr.write_params(queue, &params);
        }
        self.special = SpecialMode::Pbr { image_based };
    }

    /// Ends the physically-based draw scope.
    pub fn end_pbr(&mut self) {
        self.special = SpecialMode::None;
    }

    /// Starts an environment-reflection draw scope.
    pub fn begin_reflection(&mut self, transform: &PbrTransform, params: &ReflectParams) {
        if let (Some(queue), Some(reflect)) = (&self.queue, &self.reflect) {
            reflect.write_transform(queue, transform);
            reflect.write_params(queue, params);
        }
        self.special = SpecialMode::Reflection;
    }

    /// Ends the reflection draw scope.
    pub fn end_reflection(&mut self) {
        self.special = SpecialMode::None;
    }

    /// Draws the skybox with the bound environment map.
    pub fn draw_skybox(&mut self, uniforms: &SkyboxUniforms) {
        if !self.frame_active || !self.ensure_pass() {
            return;
        }
        let (Some(device), Some(queue)) = (self.device.clone(), self.queue.clone()) else {
            return;
        };
        let env_view = self.resolve_view(self.env_map);
        let format = self.surface_format;
        let Some(skybox) = self.skybox.as_mut() else {
            return;
        };
        let Some(pass) = self.pass.as_mut() else {
            return;
        };
        if skybox.draw(&device, &queue, pass, format, uniforms, env_view.as_ref()) {
            self.draw_calls += 1;
            self.triangles += 12;
        }
    }

    fn resolve_view(&self, handle: TextureHandle) -> Option<wgpu::TextureView> {
        if !handle.is_valid() {
            return None;
        }
        self.textures.get(&handle).map(|t| t.view.clone())
    }

    /// The shader a draw would use right now, per the selection policy.
    fn resolve_draw_shader(&self) -> ShaderHandle {
        if self.current_shader.is_valid() && self.shaders.contains_key(&self.current_shader) {
            return self.current_shader;
        }
        let texture_bound =
            self.texture_slots[0].is_valid() && self.textures.contains_key(&self.texture_slots[0]);
        let kind = if self.lighting_enabled {
            ShaderKind::Lighting
        } else if texture_bound && self.screen_space {
            ShaderKind::ScreenSpace
        } else if texture_bound {
            ShaderKind::Textured
        } else {
            ShaderKind::Mesh
        };
        let handle = self.default_shaders[kind.index()];
        if handle.is_valid() {
            handle
        } else {
            self.default_shaders[ShaderKind::Mesh.index()]
        }
    }

    fn refresh_scratch_layout(&mut self) {
        let layout = self
            .shaders
            .get(&self.resolve_draw_shader())
            .map(|e| e.block_layout)
            .unwrap_or(BlockLayout::Basic);
        if layout != self.scratch_layout {
            self.scratch_layout = layout;
            self.seed_scratch();
        }
    }

    /// Re-seeds the scratch with the active layout's defaults, keeping
    /// the shared matrix prefix (offsets 0..128 agree across layouts).
    fn seed_scratch(&mut self) {
        let mut prefix = [0u8; 128];
        prefix.copy_from_slice(&self.scratch[..128]);
        match self.scratch_layout {
            BlockLayout::Basic => {
                let defaults = BasicUniforms::default();
                self.scratch[..160].copy_from_slice(bytemuck::bytes_of(&defaults));
            }
            BlockLayout::Color => {
                let defaults = ColorUniforms::default();
                self.scratch[..176].copy_from_slice(bytemuck::bytes_of(&defaults));
            }
            BlockLayout::Lighting => {
                let defaults = LightingTransform::default();
                self.scratch[..224].copy_from_slice(bytemuck::bytes_of(&defaults));
            }
        }
        self.scratch[..128].copy_from_slice(&prefix);
    }

    fn write_scratch(&mut self, name: &str, data: &[u8]) {
        self.refresh_scratch_layout();
        match self.scratch_layout.offset_of(name) {
            Some((offset, size)) => {
                let n = size.min(data.len());
                self.scratch[offset..offset + n].copy_from_slice(&data[..n]);
            }
            None => {
                log::debug!("WebGpuBackend: uniform '{name}' not present in the active block");
            }
        }
    }

    /// Writes the scratch block for the next draw and returns where it
    /// landed: a ring offset, or the shader's fallback buffer.
    fn flush_uniforms(&mut self, shader: ShaderHandle) -> RingSlot {
        let (Some(device), Some(queue)) = (self.device.clone(), self.queue.clone()) else {
            return RingSlot::Fallback;
        };
        let size = self
            .shaders
            .get(&shader)
            .map(|e| e.block_layout.byte_size())
            .unwrap_or(BlockLayout::Basic.byte_size());
        let Some(ring) = self.ring.as_mut() else {
            return RingSlot::Fallback;
        };
        let slot = ring.allocate(&device);
        match slot {
            RingSlot::Offset(offset) => ring.write(&queue, offset, &self.scratch[..size]),
            RingSlot::Fallback => {
                if let Some(entry) = self.shaders.get(&shader) {
                    queue.write_buffer(&entry.fallback_buffer, 0, &self.scratch[..size]);
                }
            }
        }
        slot
    }

    /// Begins the deferred render pass if none is open. Returns `false`
    /// when no frame target is available.
    fn ensure_pass(&mut self) -> bool {
        if self.pass.is_some() {
            return true;
        }

        let (color_view, depth_view) = match self.bound_target {
            Some(target) => match self.render_targets.get(&target) {
                Some(rt) => (rt.color_view.clone(), rt.depth_view.clone()),
                None => return false,
            },
            None => match (&self.swapchain_view, &self.depth_view) {
                (Some(color), depth) => (color.clone(), depth.clone()),
                _ => return false,
            },
        };
        let Some(encoder) = self.encoder.as_mut() else {
            return false;
        };

        let clear = self.pending_clear.take();
        let color_load = match &clear {
            Some(c) if c.planes.contains(ClearPlanes::COLOR) => {
                wgpu::LoadOp::Clear(wgpu::Color {
                    r: c.color.r as f64,
                    g: c.color.g as f64,
                    b: c.color.b as f64,
                    a: c.color.a as f64,
                })
            }
            _ => wgpu::LoadOp::Load,
        };
        let depth_load = match &clear {
            Some(c) if c.planes.contains(ClearPlanes::DEPTH) => wgpu::LoadOp::Clear(c.depth),
            _ => wgpu::LoadOp::Load,
        };

        let depth_stencil_attachment =
            depth_view
                .as_ref()
                .map(|view| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    // Depth24Plus carries no stencil; the ops must stay
                    // undefined to match the format.
                    stencil_ops: None,
                });

        let mut pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Vitra Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    // Undefined for 2-D color attachments.
                    depth_slice: None,
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            })
            .forget_lifetime();

        if let Some((x, y, w, h)) = self.viewport {
            pass.set_viewport(x as f32, y as f32, w as f32, h as f32, 0.0, 1.0);
        }
        if let Some(scissor) = self.draw_state.scissor {
            pass.set_scissor_rect(
                scissor.x.max(0) as u32,
                scissor.y.max(0) as u32,
                scissor.width,
                scissor.height,
            );
        }

        self.pass = Some(pass);
        true
    }

    fn end_pass(&mut self) {
        self.pass = None;
    }

    /// Rebuilds a shader's bind groups when the ring was replaced or the
    /// bound textures changed.
    fn ensure_bind_groups(&mut self, shader: ShaderHandle) {
        let Some(device) = self.device.clone() else {
            return;
        };
        let (ring_buffer, ring_generation) = match &self.ring {
            Some(ring) => (ring.buffer().clone(), ring.generation()),
            None => return,
        };

        let slot0 = self.texture_slots[0];
        let bound_texture = if slot0.is_valid() {
            self.textures
                .get(&slot0)
                .map(|t| (t.view.clone(), t.sampler.clone()))
        } else {
            None
        };
        let placeholder = match (&self.placeholder_view, &self.placeholder_sampler) {
            (Some(view), Some(sampler)) => Some((view.clone(), sampler.clone())),
            _ => None,
        };
        let block_buffer = self
            .user_uniform_block
            .and_then(|h| self.buffers.get(&h))
            .map(|b| b.buffer.clone())
            .or_else(|| self.lighting_buffer.clone());
        let texture_generation = self.texture_generation;

        let Some(entry) = self.shaders.get(&shader) else {
            return;
        };
        let stale = entry.ring_bind_group.is_none()
            || entry.ring_generation != ring_generation
            || (entry.uses_texture && entry.texture_generation != texture_generation);
        if !stale {
            return;
        }

        let uses_texture = entry.uses_texture;
        let uses_lighting = entry.uses_lighting;
        let layout = entry.set.bind_group_layout().clone();
        let fallback_buffer = entry.fallback_buffer.clone();

        let texture_binding = if uses_texture {
            match bound_texture.or(placeholder) {
                Some(pair) => Some(pair),
                None => return,
            }
        } else {
            None
        };

        let build = |uniform: &wgpu::Buffer, label: &str| {
            let mut entries = vec![wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: uniform,
                    offset: 0,
                    size: NonZeroU64::new(UNIFORM_BINDING_SIZE),
                }),
            }];
            if uses_lighting {
                if let Some(block) = &block_buffer {
                    entries.push(wgpu::BindGroupEntry {
                        binding: 1,
                        resource: block.as_entire_binding(),
                    });
                }
            }
            if let Some((view, sampler)) = &texture_binding {
                entries.push(wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                });
                entries.push(wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                });
            }
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &layout,
                entries: &entries,
            })
        };

        let ring_bind_group = build(&ring_buffer, "Shader Ring Bind Group");
        let fallback_bind_group = build(&fallback_buffer, "Shader Fallback Bind Group");

        if let Some(entry) = self.shaders.get_mut(&shader) {
            entry.ring_bind_group = Some(ring_bind_group);
            entry.fallback_bind_group = Some(fallback_bind_group);
            entry.ring_generation = ring_generation;
            entry.texture_generation = texture_generation;
        }
    }

    fn create_shader_entry(
        &mut self,
        name: &str,
        wgsl: &str,
        block_layout: BlockLayout,
        uses_texture: bool,
        uses_lighting: bool,
    ) -> ShaderHandle {
        let Some(device) = self.device.clone() else {
            return ShaderHandle::INVALID;
        };

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(wgsl.into()),
        });

        let layout = create_default_bind_group_layout(&device, name, uses_texture, uses_lighting);
        let set = PipelineSet::new(
            &device,
            name,
            module.clone(),
            module,
            layout,
            StandardVertex::layout(),
            self.surface_format,
            None,
            true,
        );

        let fallback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{name} Fallback Uniforms")),
            size: UNIFORM_BINDING_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let handle = ShaderHandle(self.next());
        self.shaders.insert(
            handle,
            ShaderEntry {
                set,
                block_layout,
                uses_texture,
                uses_lighting,
                fallback_buffer,
                ring_bind_group: None,
                fallback_bind_group: None,
                ring_generation: u64::MAX,
                texture_generation: 0,
            },
        );
        log::info!("WebGpuBackend: created shader '{name}' with handle {handle:?}");
        handle
    }

    fn recreate_depth_texture(&mut self) {
        let Some(device) = &self.device else {
            return;
        };
        if self.width == 0 || self.height == 0 {
            return;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Vitra Depth Texture"),
            size: wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: super::pipeline::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        self.depth_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.depth_texture = Some(texture);
        log::debug!(
            "WebGpuBackend: depth texture recreated at {}x{}",
            self.width,
            self.height
        );
    }

    fn submit_draw(&mut self, topology: PrimitiveTopology, command: DrawCommand) {
        if !self.frame_active {
            return;
        }
        if topology_to_wgpu(topology).is_none() {
            log::warn!(
                "WebGpuBackend: topology {topology:?} requires mesh-adapter conversion; draw dropped"
            );
            return;
        }
        match self.special {
            SpecialMode::None => self.submit_standard_draw(topology, command),
            SpecialMode::Pbr { image_based } => {
                self.submit_pbr_draw(topology, command, image_based)
            }
            SpecialMode::Reflection => self.submit_reflect_draw(topology, command),
        }
    }

    fn submit_standard_draw(&mut self, topology: PrimitiveTopology, command: DrawCommand) {
        let shader = self.resolve_draw_shader();
        if !shader.is_valid() {
            return;
        }
        self.refresh_scratch_layout();
        let slot = self.flush_uniforms(shader);
        if !self.ensure_pass() {
            return;
        }
        self.ensure_bind_groups(shader);

        let Some(device) = self.device.clone() else {
            return;
        };
        let format = self.surface_format;
        let Some(entry) = self.shaders.get_mut(&shader) else {
            return;
        };
        let Some(pipeline) = entry.set.pipeline(&device, topology, format).cloned() else {
            return;
        };
        let bind_group = match slot {
            RingSlot::Offset(_) => entry.ring_bind_group.clone(),
            RingSlot::Fallback => entry.fallback_bind_group.clone(),
        };
        let Some(bind_group) = bind_group else {
            return;
        };
        let dynamic_offset = match slot {
            RingSlot::Offset(offset) => offset as u32,
            RingSlot::Fallback => 0,
        };

        self.record_draw(topology, command, &pipeline, &bind_group, &[dynamic_offset]);
    }

    fn submit_pbr_draw(
        &mut self,
        topology: PrimitiveTopology,
        command: DrawCommand,
        image_based: bool,
    ) {
        if !self.ensure_pass() {
            return;
        }
        let Some(device) = self.device.clone() else {
            return;
        };
        let format = self.surface_format;
        let env = self.resolve_view(self.env_map);
        let irradiance = self.resolve_view(self.irradiance_map);
        let lut = self.resolve_view(self.brdf_lut);
        let Some(pbr) = self.pbr.as_mut() else {
            return;
        };
        let Some(pipeline) = pbr.pipeline(&device, topology, format, image_based).cloned() else {
            return;
        };
        let bind_group = if image_based {
            pbr.ibl_bind_group(&device, env.as_ref(), irradiance.as_ref(), lut.as_ref())
                .clone()
        } else {
            pbr.fallback_bind_group(&device).clone()
        };
        self.record_draw(topology, command, &pipeline, &bind_group, &[]);
    }

    fn submit_reflect_draw(&mut self, topology: PrimitiveTopology, command: DrawCommand) {
        if !self.ensure_pass() {
            return;
        }
        let Some(device) = self.device.clone() else {
            return;
        };
        let format = self.surface_format;
        let env = self.resolve_view(self.env_map);
        let Some(reflect) = self.reflect.as_mut() else {
            return;
        };
        let Some(pipeline) = reflect.pipeline(&device, topology, format).cloned() else {
            return;
        };
        let Some(bind_group) = reflect.bind_group(&device, env.as_ref()).cloned() else {
            return;
        };
        self.record_draw(topology, command, &pipeline, &bind_group, &[]);
    }

    fn record_draw(
        &mut self,
        topology: PrimitiveTopology,
        command: DrawCommand,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
        dynamic_offsets: &[u32],
    ) {
        let Some(vertex_buffer) = self
            .bound_vertex_buffer
            .and_then(|h| self.buffers.get(&h))
            .map(|b| b.buffer.clone())
        else {
            return;
        };
        let index_binding = self
            .bound_index
            .and_then(|(h, f)| self.buffers.get(&h).map(|b| (b.buffer.clone(), f)));

        let Some(pass) = self.pass.as_mut() else {
            return;
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, dynamic_offsets);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));

        let vertex_count = match command {
            DrawCommand::Arrays {
                first,
                count,
                first_instance,
                instances,
            } => {
                pass.draw(first..first + count, first_instance..first_instance + instances);
                count
            }
            DrawCommand::Indexed {
                first,
                count,
                base_vertex,
                first_instance,
                instances,
            } => {
                let Some((index_buffer, format)) = index_binding else {
                    return;
                };
                pass.set_index_buffer(index_buffer.slice(..), format.into_wgpu());
                pass.draw_indexed(
                    first..first + count,
                    base_vertex,
                    first_instance..first_instance + instances,
                );
                count
            }
        };

        self.draw_calls += 1;
        match topology {
            PrimitiveTopology::TriangleList => self.triangles += vertex_count / 3,
            PrimitiveTopology::TriangleStrip => {
                self.triangles += vertex_count.saturating_sub(2)
            }
            _ => {}
        }
    }
}

impl GraphicsBackend for WebGpuBackend {
    fn init(&mut self, width: u32, height: u32) -> bool {
        if self.initialized {
            log::warn!("WebGpuBackend: init called twice");
            return true;
        }
        let Some(device) = self.host.device() else {
            log::error!("WebGpuBackend: host environment has no device; init failed");
            return false;
        };
        let Some(queue) = self.host.queue() else {
            log::error!("WebGpuBackend: host environment has no queue; init failed");
            return false;
        };
        self.surface_format = self.host.surface_format();
        self.device = Some(device.clone());
        self.queue = Some(queue.clone());
        self.width = width.max(1);
        self.height = height.max(1);

        self.recreate_depth_texture();
        self.ring = Some(UniformRing::new(&device));

        let lighting_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lighting Block"),
            size: std::mem::size_of::<LightingBlock>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&lighting_buffer, 0, bytemuck::bytes_of(&LightingBlock::default()));
        self.lighting_buffer = Some(lighting_buffer);

        self.placeholder_view = Some(placeholder_texture(
            &device,
            &queue,
            "White Placeholder",
            [255, 255, 255, 255],
        ));
        self.placeholder_sampler = Some(device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Placeholder Sampler"),
            ..Default::default()
        }));

        // Pre-create the default shader set and the specialized
        // subsystems (including the skybox cube mesh).
        for kind in [ShaderKind::Mesh, ShaderKind::Textured, ShaderKind::Lighting] {
            let handle = self.create_default_shader(kind);
            if !handle.is_valid() {
                log::error!("WebGpuBackend: failed to create default '{}' shader", kind.name());
                return false;
            }
        }
        self.pbr = Some(PbrResources::new(&device, &queue, self.surface_format));
        self.skybox = Some(SkyboxResources::new(&device, &queue, self.surface_format));
        self.reflect = Some(ReflectResources::new(&device, &queue, self.surface_format));

        self.seed_scratch();
        self.initialized = true;
        log::info!(
            "WebGpuBackend: initialized at {}x{} ({:?})",
            self.width,
            self.height,
            self.surface_format
        );
        true
    }

    fn shutdown(&mut self) {
        // Reverse dependency order: pass, encoder, specialized
        // resources, handle tables, depth, ring. The device is owned by
        // the host environment and is not released here.
        self.pass = None;
        self.encoder = None;
        self.swapchain_view = None;
        self.pbr = None;
        self.skybox = None;
        self.reflect = None;
        self.mipgen = MipGenerator::default();
        self.shaders.clear();
        self.compute_pipelines.clear();
        self.render_targets.clear();
        self.textures.clear();
        self.buffers.clear();
        self.depth_view = None;
        self.depth_texture = None;
        self.ring = None;
        self.lighting_buffer = None;
        self.placeholder_view = None;
        self.placeholder_sampler = None;
        self.vram_bytes = 0;
        self.initialized = false;
        self.frame_active = false;
        if let Some(device) = &self.device {
            let _ = device.poll(wgpu::PollType::wait_indefinitely());
        }
        self.device = None;
        self.queue = None;
        log::info!("WebGpuBackend: shut down");
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("WebGpuBackend: ignoring resize to zero dimensions");
            return;
        }
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.recreate_depth_texture();
        }
    }

    fn begin_frame(&mut self) {
        if !self.initialized {
            return;
        }
        let Some(device) = self.device.clone() else {
            return;
        };

        let Some(texture) = self.host.acquire_swapchain_texture() else {
            // Transient acquisition failure: skip the frame entirely.
            log::warn!("WebGpuBackend: swapchain texture unavailable; skipping frame");
            self.frame_active = false;
            self.encoder = None;
            self.swapchain_view = None;
            return;
        };

        let (tex_width, tex_height) = (texture.width(), texture.height());
        if (tex_width, tex_height) != (self.width, self.height) {
            self.width = tex_width;
            self.height = tex_height;
            self.recreate_depth_texture();
        }
        self.swapchain_view =
            Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));

        self.encoder = Some(device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Vitra Frame Encoder"),
        }));
        self.pending_clear = Some(self.last_clear);
        if let Some(ring) = self.ring.as_mut() {
            ring.reset();
        }
        self.bound_target = None;
        self.frame_active = true;
        self.draw_calls = 0;
        self.triangles = 0;

        self.poll_device_non_blocking();
    }

    fn end_frame(&mut self) {
        if !self.frame_active {
            return;
        }
        // A clear with no subsequent draw still needs its pass so the
        // load ops execute.
        if self.pending_clear.is_some() {
            self.ensure_pass();
        }
        self.end_pass();
        if let (Some(encoder), Some(queue)) = (self.encoder.take(), &self.queue) {
            queue.submit(std::iter::once(encoder.finish()));
        }
        // Clear the swapchain view without releasing the texture; the
        // host retains it until the next frame starts.
        self.swapchain_view = None;
        self.host.present();

        self.frame_number += 1;
        self.last_stats = FrameStats {
            frame_number: self.frame_number,
            draw_calls: self.draw_calls,
            triangles: self.triangles,
            vram_bytes: self.vram_bytes,
            vram_peak_bytes: self.vram_peak_bytes,
        };
        self.frame_active = false;
    }

    fn clear(&mut self, state: &ClearState) {
        self.last_clear = *state;
        if self.frame_active {
            // A clear is a pass boundary; the next draw begins a pass
            // whose load ops perform it.
            self.end_pass();
            self.pending_clear = Some(*state);
        }
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewport = Some((x, y, width, height));
        if let Some(pass) = self.pass.as_mut() {
            pass.set_viewport(x as f32, y as f32, width as f32, height as f32, 0.0, 1.0);
        }
    }

    fn set_draw_state(&mut self, state: &DrawState) {
        // Pipelines share the default blend/cull/depth state; only the
        // scissor (and viewport) apply dynamically here.
        if !self.draw_state_noted
            && (state.blend != DrawState::default().blend
                || state.cull != DrawState::default().cull)
        {
            log::debug!(
                "WebGpuBackend: blend/cull draw-state changes are baked into pipelines and are not applied per draw"
            );
            self.draw_state_noted = true;
        }
        self.draw_state = *state;
        if let Some(pass) = self.pass.as_mut() {
            if let Some(scissor) = state.scissor {
                pass.set_scissor_rect(
                    scissor.x.max(0) as u32,
                    scissor.y.max(0) as u32,
                    scissor.width,
                    scissor.height,
                );
            }
        }
    }

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        initial_data: Option<&[u8]>,
    ) -> BufferHandle {
        let Some(device) = self.device.clone() else {
            return BufferHandle::INVALID;
        };
        if descriptor.size == 0 {
            log::warn!("WebGpuBackend: refusing to create an empty buffer");
            return BufferHandle::INVALID;
        }
        // wgpu requires COPY sizes aligned to 4; padding the allocation
        // keeps partial updates simple.
        let size = descriptor.size.next_multiple_of(4);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: descriptor.label.as_deref(),
            size,
            usage: descriptor.buffer_type.into_wgpu(),
            mapped_at_creation: false,
        });
        if let (Some(data), Some(queue)) = (initial_data, &self.queue) {
            let mut padded = data.to_vec();
            padded.resize(data.len().next_multiple_of(4), 0);
            queue.write_buffer(&buffer, 0, &padded);
        }
        let handle = BufferHandle(self.next());
        self.buffers.insert(handle, BufferEntry { buffer, size });
        self.track_vram(size as i64);
        log::debug!(
            "WebGpuBackend: created {:?} buffer {handle:?} ({size} bytes)",
            descriptor.buffer_type
        );
        handle
    }

    fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        let Some(entry) = self.buffers.get(&buffer) else {
            return;
        };
        if offset + data.len() as u64 > entry.size {
            log::warn!("WebGpuBackend: update_buffer out of bounds on {buffer:?}");
            return;
        }
        if offset % 4 != 0 || data.len() % 4 != 0 {
            // The explicit API requires 4-byte aligned copies.
            log::warn!("WebGpuBackend: update_buffer requires 4-byte aligned offset and length");
            return;
        }
        if let Some(queue) = &self.queue {
            queue.write_buffer(&entry.buffer, offset, data);
        }
    }

    fn read_buffer(&mut self, _buffer: BufferHandle, _offset: u64, _out: &mut [u8]) -> bool {
        // Synchronous readback would stall the explicit API's pipeline;
        // callers use read_buffer_async here.
        log::warn!("WebGpuBackend: synchronous read_buffer is unsupported; use read_buffer_async");
        false
    }

    fn read_buffer_async(
        &mut self,
        buffer: BufferHandle,
        offset: u64,
        size: u64,
    ) -> ReadbackFuture {
        let (Some(device), Some(queue)) = (self.device.clone(), self.queue.clone()) else {
            return Box::pin(async { Err(ResourceError::Backend("not initialized".into())) });
        };
        let Some(gpu_buffer) = self.buffers.get(&buffer).map(|e| e.buffer.clone()) else {
            return Box::pin(async { Err(ResourceError::NotFound) });
        };
        // Copies cannot be recorded while a pass is open.
        self.end_pass();
        let operation = start_readback(&device, &queue, &gpu_buffer, offset, size);
        Box::pin(operation)
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
            log::warn!("WebGpuBackend: copy_buffer out of bounds");
            return;
        }
        let src_buffer = src_entry.buffer.clone();
        let dst_buffer = dst_entry.buffer.clone();
        self.end_pass();
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.copy_buffer_to_buffer(&src_buffer, src_offset, &dst_buffer, dst_offset, size);
        } else if let (Some(device), Some(queue)) = (&self.device, &self.queue) {
            // Outside a frame: run the copy on a one-shot encoder.
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Vitra Buffer Copy"),
            });
            encoder.copy_buffer_to_buffer(&src_buffer, src_offset, &dst_buffer, dst_offset, size);
            queue.submit(std::iter::once(encoder.finish()));
        }
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if let Some(entry) = self.buffers.remove(&buffer) {
            self.track_vram(-(entry.size as i64));
            log::debug!("WebGpuBackend: destroyed buffer {buffer:?}");
        }
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        pixels: Option<&[u8]>,
    ) -> TextureHandle {
        let Some(device) = self.device.clone() else {
            return TextureHandle::INVALID;
        };
        if descriptor.width == 0 || descriptor.height == 0 {
            log::warn!("WebGpuBackend: refusing to create a zero-sized texture");
            return TextureHandle::INVALID;
        }

        let format: wgpu::TextureFormat = descriptor.format.into_wgpu();
        let mut usage = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
        if descriptor.render_target || descriptor.format.is_depth() || descriptor.mipmaps {
            usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        if descriptor.storage {
            usage |= wgpu::TextureUsages::STORAGE_BINDING;
        }

        let mip_level_count = descriptor.mip_level_count();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: descriptor.label.as_deref(),
            size: wgpu::Extent3d {
                width: descriptor.width,
                height: descriptor.height,
                depth_or_array_layers: descriptor.depth.max(1),
            },
            mip_level_count,
            sample_count: descriptor.sample_count.max(1),
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });

        if let (Some(data), Some(queue)) = (pixels, &self.queue) {
            if descriptor.format.is_depth() {
                log::warn!("WebGpuBackend: depth textures cannot take CPU pixel uploads");
            } else {
                queue.write_texture(
                    wgpu::TexelCopyTextureInfo {
                        texture: &texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    data,
                    wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(descriptor.width * descriptor.format.bytes_per_pixel()),
                        rows_per_image: None,
                    },
                    wgpu::Extent3d {
                        width: descriptor.width,
                        height: descriptor.height,
                        depth_or_array_layers: descriptor.depth.max(1),
                    },
                );
            }
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: descriptor.label.as_deref(),
            address_mode_u: descriptor.wrap_u.into_wgpu(),
            address_mode_v: descriptor.wrap_v.into_wgpu(),
            address_mode_w: descriptor.wrap_w.into_wgpu(),
            mag_filter: descriptor.mag_filter.into_wgpu(),
            min_filter: descriptor.min_filter.into_wgpu(),
            mipmap_filter: if descriptor.mipmaps {
                wgpu::MipmapFilterMode::Linear
            } else {
                wgpu::MipmapFilterMode::Nearest
            },
            ..Default::default()
        });

        let size = descriptor.base_level_bytes();
        let handle = TextureHandle(self.next());
        self.textures.insert(
            handle,
            TextureEntry {
                texture,
                view,
                sampler,
                format: descriptor.format,
                width: descriptor.width,
                height: descriptor.height,
                mip_level_count,
                size,
            },
        );
        self.track_vram(size as i64);
        log::debug!(
            "WebGpuBackend: created texture {handle:?} {}x{} {:?}",
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
        if let Some(queue) = &self.queue {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &entry.texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: origin.x,
                        y: origin.y,
                        z: origin.z,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(size.width * entry.format.bytes_per_pixel()),
                    rows_per_image: None,
                },
                wgpu::Extent3d {
                    width: size.width,
                    height: size.height,
                    depth_or_array_layers: size.depth.max(1),
                },
            );
        }
    }

    fn generate_mipmaps(&mut self, texture: TextureHandle) {
        let (Some(device), Some(queue)) = (self.device.clone(), self.queue.clone()) else {
            return;
        };
        let Some((gpu_texture, format, mip_level_count)) = self
            .textures
            .get(&texture)
            .map(|e| (e.texture.clone(), e.format, e.mip_level_count))
        else {
            return;
        };
        if mip_level_count < 2 {
            return;
        }
        self.end_pass();
        self.mipgen
            .generate(&device, &queue, &gpu_texture, format.into_wgpu(), mip_level_count);
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if let Some(entry) = self.textures.remove(&texture) {
            self.track_vram(-(entry.size as i64));
            log::debug!("WebGpuBackend: destroyed texture {texture:?}");
        }
    }

    fn create_render_target(
        &mut self,
        color: TextureHandle,
        depth: Option<TextureHandle>,
    ) -> RenderTargetHandle {
        let Some(color_entry) = self.textures.get(&color) else {
            log::warn!("WebGpuBackend: create_render_target with unknown color texture");
            return RenderTargetHandle::INVALID;
        };
        let color_view = color_entry.view.clone();
        let (width, height) = (color_entry.width, color_entry.height);
        let depth_view = depth
            .filter(|h| h.is_valid())
            .and_then(|h| self.textures.get(&h))
            .map(|t| t.view.clone())
            .or_else(|| {
                // Every pipeline carries depth state, so a target without
                // a caller-provided depth texture gets its own.
                self.device.as_ref().map(|device| {
                    device
                        .create_texture(&wgpu::TextureDescriptor {
                            label: Some("Render Target Depth"),
                            size: wgpu::Extent3d {
                                width,
                                height,
                                depth_or_array_layers: 1,
                            },
                            mip_level_count: 1,
                            sample_count: 1,
                            dimension: wgpu::TextureDimension::D2,
                            format: super::pipeline::DEPTH_FORMAT,
                            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                            view_formats: &[],
                        })
                        .create_view(&wgpu::TextureViewDescriptor::default())
                })
            });

        let handle = RenderTargetHandle(self.next());
        self.render_targets.insert(
            handle,
            RenderTargetEntry {
                color_view,
                depth_view,
                width,
                height,
            },
        );
        log::debug!("WebGpuBackend: created render target {handle:?} ({width}x{height})");
        handle
    }

    fn bind_render_target(&mut self, target: Option<RenderTargetHandle>) {
        // A target switch is a pass boundary.
        self.end_pass();
        match target {
            Some(handle) => match self.render_targets.get(&handle) {
                Some(rt) => {
                    self.viewport = Some((0, 0, rt.width, rt.height));
                    self.bound_target = Some(handle);
                }
                None => log::warn!("WebGpuBackend: bind_render_target with unknown {handle:?}"),
            },
            None => {
                self.bound_target = None;
                self.viewport = Some((0, 0, self.width, self.height));
            }
        }
    }

    fn destroy_render_target(&mut self, target: RenderTargetHandle) {
        if self.bound_target == Some(target) {
            self.bind_render_target(None);
        }
        self.render_targets.remove(&target);
    }

    fn create_shader(&mut self, descriptor: &ShaderDescriptor) -> ShaderHandle {
        // Both stages live in one WGSL module; custom shaders use the
        // default bind-group layout and the basic uniform block.
        if descriptor.vertex_source != descriptor.fragment_source {
            log::warn!(
                "WebGpuBackend: shader '{}' has distinct stage sources; compiling the vertex module for both stages",
                descriptor.name
            );
        }
        self.create_shader_entry(
            &descriptor.name,
            &descriptor.vertex_source,
            BlockLayout::Basic,
            false,
            false,
        )
    }

    fn create_default_shader(&mut self, kind: ShaderKind) -> ShaderHandle {
        let cached = self.default_shaders[kind.index()];
        if cached.is_valid() {
            return cached;
        }
        let (layout, uses_texture, uses_lighting) = match kind {
            ShaderKind::Mesh => (BlockLayout::Basic, false, false),
            ShaderKind::Color => (BlockLayout::Color, false, false),
            ShaderKind::Textured | ShaderKind::ScreenSpace => (BlockLayout::Basic, true, false),
            ShaderKind::Lighting => (BlockLayout::Lighting, false, true),
            // The specialized pipelines are owned by their subsystems and
            // driven through begin_pbr / draw_skybox / begin_reflection.
            ShaderKind::Pbr
            | ShaderKind::PbrFallback
            | ShaderKind::Skybox
            | ShaderKind::Reflection => {
                log::debug!(
                    "WebGpuBackend: '{}' is provisioned by its subsystem, not as a plain shader",
                    kind.name()
                );
                return ShaderHandle::INVALID;
            }
        };
        let Some(descriptor) = crate::graphics::shaders::source(kind, BackendKind::WebGpu) else {
            return ShaderHandle::INVALID;
        };
        let handle = self.create_shader_entry(
            kind.name(),
            &descriptor.vertex_source,
            layout,
            uses_texture,
            uses_lighting,
        );
        self.default_shaders[kind.index()] = handle;
        handle
    }

    fn use_shader(&mut self, shader: ShaderHandle) {
        self.current_shader = shader;
        self.refresh_scratch_layout();
    }

    fn destroy_shader(&mut self, shader: ShaderHandle) {
        if self.shaders.remove(&shader).is_some() {
            if self.current_shader == shader {
                self.current_shader = ShaderHandle::INVALID;
            }
            for slot in &mut self.default_shaders {
                if *slot == shader {
                    *slot = ShaderHandle::INVALID;
                }
            }
            log::debug!("WebGpuBackend: destroyed shader {shader:?}");
        }
    }

    fn set_uniform_f32(&mut self, name: &str, value: f32) {
        self.write_scratch(name, bytemuck::bytes_of(&value));
    }

    fn set_uniform_vec2(&mut self, name: &str, value: [f32; 2]) {
        self.write_scratch(name, bytemuck::cast_slice(&value));
    }

    fn set_uniform_vec3(&mut self, name: &str, value: [f32; 3]) {
        self.write_scratch(name, bytemuck::cast_slice(&value));
    }

    fn set_uniform_vec4(&mut self, name: &str, value: [f32; 4]) {
        self.write_scratch(name, bytemuck::cast_slice(&value));
    }

    fn set_uniform_mat3(&mut self, name: &str, value: [f32; 9]) {
        // Uniform blocks store mat3 columns padded to vec4.
        let padded = vitra_core::math::pad_mat3(value);
        self.write_scratch(name, bytemuck::cast_slice(&padded));
    }

    fn set_uniform_mat4(&mut self, name: &str, value: [f32; 16]) {
        self.write_scratch(name, bytemuck::cast_slice(&value));
    }

    fn set_texture(&mut self, name: &str, texture: TextureHandle, unit: u32) {
        let slot = unit as usize;
        if slot >= TEXTURE_SLOTS {
            log::warn!("WebGpuBackend: texture unit {unit} out of range (max {TEXTURE_SLOTS})");
            return;
        }
        let _ = name; // slot index drives the binding on this backend
        if self.texture_slots[slot] != texture {
            self.texture_slots[slot] = texture;
            if slot == 0 {
                // Slot-zero changes feed the default bind groups.
                self.texture_generation += 1;
            }
        }
    }

    fn set_uniform_block(&mut self, binding: u32, buffer: BufferHandle) {
        if binding != 1 {
            log::debug!("WebGpuBackend: only uniform-block binding 1 is routable (got {binding})");
            return;
        }
        self.user_uniform_block = buffer.is_valid().then_some(buffer);
        self.texture_generation += 1; // force bind-group rebuild
    }

    fn set_vertex_buffer(&mut self, buffer: BufferHandle, layout: &VertexLayout) {
        if !self.buffers.contains_key(&buffer) {
            return;
        }
        if layout.stride != StandardVertex::STRIDE {
            log::debug!(
                "WebGpuBackend: vertex stride {} differs from the default layout; default pipelines assume {}",
                layout.stride,
                StandardVertex::STRIDE
            );
        }
        self.bound_vertex_buffer = Some(buffer);
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle, format: IndexFormat) {
        if !self.buffers.contains_key(&buffer) {
            return;
        }
        self.bound_index = Some((buffer, format));
    }

    fn draw(&mut self, topology: PrimitiveTopology, first_vertex: u32, vertex_count: u32) {
        self.submit_draw(
            topology,
            DrawCommand::Arrays {
                first: first_vertex,
                count: vertex_count,
                first_instance: 0,
                instances: 1,
            },
        );
    }

    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        index_count: u32,
        base_vertex: i32,
    ) {
        self.submit_draw(
            topology,
            DrawCommand::Indexed {
                first: first_index,
                count: index_count,
                base_vertex,
                first_instance: 0,
                instances: 1,
            },
        );
    }

    fn draw_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first_vertex: u32,
        vertex_count: u32,
        first_instance: u32,
        instance_count: u32,
    ) {
        self.submit_draw(
            topology,
            DrawCommand::Arrays {
                first: first_vertex,
                count: vertex_count,
                first_instance,
                instances: instance_count,
            },
        );
    }

    fn draw_indexed_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        index_count: u32,
        base_vertex: i32,
        first_instance: u32,
        instance_count: u32,
    ) {
        self.submit_draw(
            topology,
            DrawCommand::Indexed {
                first: first_index,
                count: index_count,
                base_vertex,
                first_instance,
                instances: instance_count,
            },
        );
    }

    fn supports_compute(&self) -> bool {
        true
    }

    fn create_compute_pipeline(
        &mut self,
        descriptor: &ComputePipelineDescriptor,
    ) -> ComputePipelineHandle {
        let Some(device) = self.device.clone() else {
            return ComputePipelineHandle::INVALID;
        };
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&descriptor.name),
            source: wgpu::ShaderSource::Wgsl(descriptor.source.clone().into_owned().into()),
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(&descriptor.name),
            layout: None,
            module: &module,
            entry_point: Some(&descriptor.entry_point),
            compilation_options: Default::default(),
            cache: None,
        });
        let handle = ComputePipelineHandle(self.next());
        self.compute_pipelines.insert(handle, ComputeEntry { pipeline });
        log::info!(
            "WebGpuBackend: created compute pipeline '{}' {handle:?}",
            descriptor.name
        );
        handle
    }

    fn destroy_compute_pipeline(&mut self, pipeline: ComputePipelineHandle) {
        self.compute_pipelines.remove(&pipeline);
    }

    fn bind_storage_buffer(&mut self, binding: u32, buffer: BufferHandle) {
        self.storage_bindings.retain(|(b, _)| *b != binding);
        if buffer.is_valid() {
            self.storage_bindings.push((binding, StorageBinding::Buffer(buffer)));
        }
    }

    fn bind_storage_texture(&mut self, binding: u32, texture: TextureHandle) {
        self.storage_bindings.retain(|(b, _)| *b != binding);
        if texture.is_valid() {
            self.storage_bindings.push((binding, StorageBinding::Texture(texture)));
        }
    }

    fn dispatch_compute(&mut self, pipeline: ComputePipelineHandle, x: u32, y: u32, z: u32) {
        let Some(device) = self.device.clone() else {
            return;
        };
        let Some(entry) = self.compute_pipelines.get(&pipeline) else {
            return;
        };
        let compute_pipeline = entry.pipeline.clone();

        let mut entries = Vec::new();
        for (binding, resource) in &self.storage_bindings {
            match resource {
                StorageBinding::Buffer(handle) => {
                    if let Some(buffer) = self.buffers.get(handle) {
                        entries.push(wgpu::BindGroupEntry {
                            binding: *binding,
                            resource: buffer.buffer.as_entire_binding(),
                        });
                    }
                }
                StorageBinding::Texture(handle) => {
                    if let Some(texture) = self.textures.get(handle) {
                        entries.push(wgpu::BindGroupEntry {
                            binding: *binding,
                            resource: wgpu::BindingResource::TextureView(&texture.view),
                        });
                    }
                }
            }
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Compute Bind Group"),
            layout: &compute_pipeline.get_bind_group_layout(0),
            entries: &entries,
        });

        // Compute dispatch is a render-pass boundary.
        self.end_pass();
        let Some(encoder) = self.encoder.as_mut() else {
            return;
        };
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Vitra Compute Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&compute_pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(x.max(1), y.max(1), z.max(1));
    }

    fn memory_barrier(&mut self) {
        // Ordering between passes within one command buffer is implicit
        // on this API; pass boundaries are the barrier.
        self.end_pass();
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::WebGpu
    }

    fn backend_name(&self) -> &'static str {
        "WebGPU"
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

impl Drop for WebGpuBackend {
    fn drop(&mut self) {
        if self.initialized {
            self.shutdown();
        }
    }
}

// Tests that need a real adapter skip themselves when none is present.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::webgpu::host::HeadlessHost;
    use vitra_core::{LinearRgba, Mesh, MeshGpuCache};

    fn backend() -> Option<WebGpuBackend> {
        let host = match HeadlessHost::new(320, 240) {
            Ok(host) => host,
            Err(e) => {
                eprintln!("skipping WebGPU test (no adapter): {e}");
                return None;
            }
        };
        let mut backend = WebGpuBackend::new(Box::new(host));
        assert!(backend.init(320, 240));
        Some(backend)
    }

    #[test]
    fn clear_only_frame_submits_once() {
        let Some(mut backend) = backend() else { return };
        backend.begin_frame();
        backend.clear(&ClearState {
            color: LinearRgba::new(0.2, 0.4, 0.8, 1.0),
            ..ClearState::default()
        });
        backend.end_frame();
        assert_eq!(backend.frame_stats().draw_calls, 0);
        assert_eq!(backend.frame_stats().frame_number, 1);
        backend.shutdown();
    }

    #[test]
    fn triangle_draw_populates_pipeline_cache() {
        let Some(mut backend) = backend() else { return };
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList);
        mesh.vertex(-1.0, -1.0, 0.0)
            .vertex(1.0, -1.0, 0.0)
            .vertex(0.0, 1.0, 0.0);

        let mut cache = MeshGpuCache::new();
        backend.begin_frame();
        cache.draw(&mut backend, &mesh, None);
        backend.end_frame();

        let mesh_shader = backend.default_shaders[ShaderKind::Mesh.index()];
        assert_eq!(backend.pipeline_count(mesh_shader), 1);
        assert_eq!(backend.frame_stats().draw_calls, 1);
        assert_eq!(backend.frame_stats().triangles, 1);
        cache.clear(&mut backend);
        backend.shutdown();
    }

    #[test]
    fn ring_offset_advances_per_draw() {
        let Some(mut backend) = backend() else { return };
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList);
        mesh.vertex(-1.0, -1.0, 0.0)
            .vertex(1.0, -1.0, 0.0)
            .vertex(0.0, 1.0, 0.0);

        let mut cache = MeshGpuCache::new();
        backend.begin_frame();
        for _ in 0..5 {
            cache.draw(&mut backend, &mesh, None);
        }
        assert_eq!(backend.uniform_ring_offset(), 5 * 256);
        backend.end_frame();

        backend.begin_frame();
        assert_eq!(backend.uniform_ring_offset(), 0);
        backend.end_frame();
        cache.clear(&mut backend);
        backend.shutdown();
    }

    #[test]
    fn buffer_roundtrip_via_async_readback() {
        let Some(mut backend) = backend() else { return };
        let data: Vec<u8> = (0..64u8).collect();
        let buffer = backend.create_buffer(
            &BufferDescriptor::new(
                "roundtrip",
                vitra_core::BufferType::Storage,
                vitra_core::BufferUsageHint::Dynamic,
                64,
            ),
            Some(&data),
        );
        assert!(buffer.is_valid());

        let future = backend.read_buffer_async(buffer, 0, 64);
        backend.poll_device_blocking();
        let bytes = pollster::block_on(future).unwrap();
        assert_eq!(bytes, data);
        backend.shutdown();
    }

    #[test]
    fn pbr_without_ibl_uses_fallback() {
        let Some(mut backend) = backend() else { return };
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList);
        mesh.vertex(-1.0, -1.0, 0.0)
            .vertex(1.0, -1.0, 0.0)
            .vertex(0.0, 1.0, 0.0);

        backend.begin_frame();
        backend.begin_pbr(
            &PbrTransform::default(),
            &PbrMaterial::default(),
            &PbrParams::default(),
        );
        assert_eq!(
            backend.special,
            SpecialMode::Pbr { image_based: false }
        );
        let mut cache = MeshGpuCache::new();
        cache.draw(&mut backend, &mesh, None);
        backend.end_pbr();
        backend.end_frame();
        assert_eq!(backend.frame_stats().draw_calls, 1);
        cache.clear(&mut backend);
        backend.shutdown();
    }
}
