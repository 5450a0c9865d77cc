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

//! Render pipeline assembly for the modern backend.
//!
//! Every pipeline of one shader shares its modules, layouts, and
//! depth/blend/multisample state; only the primitive topology (and, for
//! strips, the mandatory 32-bit strip index format) differs between the
//! entries of a shader's pipeline cache.

use super::conversions::{topology_to_wgpu, IntoWgpu};
use std::collections::HashMap;
use std::num::NonZeroU64;
use vitra_core::{PrimitiveTopology, VertexLayout};

/// The depth format every pipeline and the backend's depth texture use.
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Minimum binding size every default layout declares for the dynamic
/// uniform binding (the smallest default block).
pub(crate) const MIN_UNIFORM_BINDING: u64 = 160;

/// One 256-byte ring slot; also the bound size of the dynamic binding.
pub(crate) const UNIFORM_BINDING_SIZE: u64 = 256;

/// Everything needed to assemble one pipeline.
pub(crate) struct PipelineConfig<'a> {
    pub label: &'a str,
    pub layout: &'a wgpu::PipelineLayout,
    pub vs_module: &'a wgpu::ShaderModule,
    pub fs_module: &'a wgpu::ShaderModule,
    pub vertex_layout: &'a VertexLayout,
    pub topology: PrimitiveTopology,
    pub color_format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
    pub cull: Option<wgpu::Face>,
    pub depth_write: bool,
    pub depth_compare: wgpu::CompareFunction,
}

/// Builds one pipeline. Returns `None` for topologies the API cannot
/// draw (fan, loop); the mesh adapter rewrites those before they get
/// here.
pub(crate) fn build_render_pipeline(
    device: &wgpu::Device,
    config: &PipelineConfig,
) -> Option<wgpu::RenderPipeline> {
    let Some(topology) = topology_to_wgpu(config.topology) else {
        log::error!(
            "Pipeline '{}': topology {:?} requires mesh-adapter conversion",
            config.label,
            config.topology
        );
        return None;
    };

    let attributes: Vec<wgpu::VertexAttribute> = config
        .vertex_layout
        .attributes
        .iter()
        .map(|a| wgpu::VertexAttribute {
            format: a.format.into_wgpu(),
            offset: a.offset,
            shader_location: a.location,
        })
        .collect();

    let vertex_buffers = [wgpu::VertexBufferLayout {
        array_stride: config.vertex_layout.stride,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &attributes,
    }];

    // Strip topologies must fix their index format up front; the mesh
    // adapter always emits 32-bit indices.
    let strip_index_format = config
        .topology
        .is_strip()
        .then_some(wgpu::IndexFormat::Uint32);

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(config.label),
        layout: Some(config.layout),
        vertex: wgpu::VertexState {
            module: config.vs_module,
            entry_point: Some("vs_main"),
            buffers: &vertex_buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: config.fs_module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: config.color_format,
                blend: config.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: config.cull,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: Some(config.depth_write),
            depth_compare: Some(config.depth_compare),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
        cache: None,
    });

    Some(pipeline)
}

/// A shader's compiled modules, layouts, and its per-topology pipeline
/// cache. The `TriangleList` pipeline is created eagerly at construction;
/// other topologies are filled in on first use. Each topology maps to at
/// most one pipeline, stored exactly once.
#[derive(Debug)]
pub(crate) struct PipelineSet {
    label: String,
    vs_module: wgpu::ShaderModule,
    fs_module: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PrimitiveTopology, wgpu::RenderPipeline>,
    vertex_layout: VertexLayout,
    cull: Option<wgpu::Face>,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
}

impl PipelineSet {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        device: &wgpu::Device,
        label: &str,
        vs_module: wgpu::ShaderModule,
        fs_module: wgpu::ShaderModule,
        bind_group_layout: wgpu::BindGroupLayout,
        vertex_layout: VertexLayout,
        color_format: wgpu::TextureFormat,
        cull: Option<wgpu::Face>,
        depth_write: bool,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} Layout")),
            bind_group_layouts: &[Some(&bind_group_layout)],
            immediate_size: 0,
        });

        let mut set = Self {
            label: label.to_string(),
            vs_module,
            fs_module,
            bind_group_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            vertex_layout,
            cull,
            depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
        };
        set.pipeline(device, PrimitiveTopology::TriangleList, color_format);
        set
    }

    pub(crate) fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// The pipeline for `topology`, created on first request.
    pub(crate) fn pipeline(
        &mut self,
        device: &wgpu::Device,
        topology: PrimitiveTopology,
        color_format: wgpu::TextureFormat,
    ) -> Option<&wgpu::RenderPipeline> {
        if !self.pipelines.contains_key(&topology) {
            let config = PipelineConfig {
                label: &self.label,
                layout: &self.pipeline_layout,
                vs_module: &self.vs_module,
                fs_module: &self.fs_module,
                vertex_layout: &self.vertex_layout,
                topology,
                color_format,
                blend: vitra_core::BlendMode::Alpha.into_wgpu(),
                cull: self.cull,
                depth_write: self.depth_write,
                depth_compare: self.depth_compare,
            };
            if let Some(pipeline) = build_render_pipeline(device, &config) {
                self.pipelines.insert(topology, pipeline);
            }
        }
        self.pipelines.get(&topology)
    }

    /// Number of cached pipelines (diagnostics and tests).
    pub(crate) fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }
}

/// The bind group layout shared by a default shader's pipelines: one
/// dynamic-offset uniform binding, optionally a lighting block, or a
/// texture + sampler pair.
pub(crate) fn create_default_bind_group_layout(
    device: &wgpu::Device,
    label: &str,
    uses_texture: bool,
    uses_lighting: bool,
) -> wgpu::BindGroupLayout {
    let mut entries = vec![wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: NonZeroU64::new(MIN_UNIFORM_BINDING),
        },
        count: None,
    }];

    if uses_lighting {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
    }

    if uses_texture {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 2,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
    }

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}
