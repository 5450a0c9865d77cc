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

//! The environment-reflection subsystem: mirrors the view direction off
//! the surface, samples the environment map, and blends with the base
//! color by the reflectivity factor.

use super::pbr::placeholder_texture;
use super::pipeline::PipelineSet;
use crate::graphics::shaders;
use bytemuck::bytes_of;
use vitra_core::{PbrTransform, PrimitiveTopology, ReflectParams, StandardVertex};

/// GPU state for the reflection pipeline.
#[derive(Debug)]
pub(crate) struct ReflectResources {
    transform_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    placeholder_env: wgpu::TextureView,
    set: PipelineSet,
    bind_group: Option<wgpu::BindGroup>,
}

impl ReflectResources {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Reflection Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("reflection"),
            source: wgpu::ShaderSource::Wgsl(shaders::REFLECT_WGSL.into()),
        });

        let set = PipelineSet::new(
            device,
            "Reflection",
            module.clone(),
            module,
            layout,
            StandardVertex::layout(),
            color_format,
            None,
            true,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Reflection Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            transform_buffer: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Reflection Transform"),
                size: std::mem::size_of::<PbrTransform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            params_buffer: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Reflection Params"),
                size: std::mem::size_of::<ReflectParams>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            sampler,
            placeholder_env: placeholder_texture(
                device,
                queue,
                "Reflection Env Placeholder",
                [0, 0, 0, 255],
            ),
            set,
            bind_group: None,
        }
    }

    pub(crate) fn write_transform(&self, queue: &wgpu::Queue, transform: &PbrTransform) {
        queue.write_buffer(&self.transform_buffer, 0, bytes_of(transform));
    }

    pub(crate) fn write_params(&self, queue: &wgpu::Queue, params: &ReflectParams) {
        queue.write_buffer(&self.params_buffer, 0, bytes_of(params));
    }

    pub(crate) fn invalidate_bind_group(&mut self) {
        self.bind_group = None;
    }

    /// The reflection bind group, rebuilt after the environment map
    /// changes.
    pub(crate) fn bind_group(
        &mut self,
        device: &wgpu::Device,
        environment: Option<&wgpu::TextureView>,
    ) -> Option<&wgpu::BindGroup> {
        if self.bind_group.is_none() {
            self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Reflection Bind Group"),
                layout: self.set.bind_group_layout(),
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.transform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: self.params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(
                            environment.unwrap_or(&self.placeholder_env),
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            }));
        }
        self.bind_group.as_ref()
    }

    pub(crate) fn pipeline(
        &mut self,
        device: &wgpu::Device,
        topology: PrimitiveTopology,
        color_format: wgpu::TextureFormat,
    ) -> Option<&wgpu::RenderPipeline> {
        self.set.pipeline(device, topology, color_format)
    }
}
