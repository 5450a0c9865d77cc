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

//! The physically-based rendering subsystem of the modern backend.
//!
//! Two pipelines share three uniform buffers: the image-based variant
//! adds the environment / irradiance / BRDF-LUT textures and one
//! filtering sampler. Absent textures are replaced by 1x1 placeholders;
//! the parameter block's availability flags steer the shader's
//! `select`-based fallbacks.

use super::pipeline::PipelineSet;
use crate::graphics::shaders;
use bytemuck::bytes_of;
use vitra_core::{PbrMaterial, PbrParams, PbrTransform, PrimitiveTopology, StandardVertex};

/// Creates a 1x1 texture with a single RGBA8 texel and returns its view.
pub(crate) fn placeholder_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    texel: [u8; 4],
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &texel,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4),
            rows_per_image: None,
        },
        wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn uniform_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// GPU state for the PBR pipelines.
#[derive(Debug)]
pub(crate) struct PbrResources {
    transform_buffer: wgpu::Buffer,
    material_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    placeholder_env: wgpu::TextureView,
    placeholder_irradiance: wgpu::TextureView,
    placeholder_lut: wgpu::TextureView,
    ibl: PipelineSet,
    fallback: PipelineSet,
    ibl_bind_group: Option<wgpu::BindGroup>,
    fallback_bind_group: Option<wgpu::BindGroup>,
}

impl PbrResources {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let ibl_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("PBR Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
                texture_entry(3),
                texture_entry(4),
                texture_entry(5),
                wgpu::BindGroupLayoutEntry {
                    binding: 6,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let fallback_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("PBR Fallback Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let ibl_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pbr"),
            source: wgpu::ShaderSource::Wgsl(shaders::PBR_WGSL.into()),
        });
        let fallback_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pbr_fallback"),
            source: wgpu::ShaderSource::Wgsl(shaders::PBR_FALLBACK_WGSL.into()),
        });

        let ibl = PipelineSet::new(
            device,
            "PBR",
            ibl_module.clone(),
            ibl_module,
            ibl_layout,
            StandardVertex::layout(),
            color_format,
            None,
            true,
        );
        let fallback = PipelineSet::new(
            device,
            "PBR Fallback",
            fallback_module.clone(),
            fallback_module,
            fallback_layout,
            StandardVertex::layout(),
            color_format,
            None,
            true,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("PBR Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        Self {
            transform_buffer: uniform_buffer(
                device,
                "PBR Transform",
                std::mem::size_of::<PbrTransform>() as u64,
            ),
            material_buffer: uniform_buffer(
                device,
                "PBR Material",
                std::mem::size_of::<PbrMaterial>() as u64,
            ),
            params_buffer: uniform_buffer(
                device,
                "PBR Params",
                std::mem::size_of::<PbrParams>() as u64,
            ),
            sampler,
            placeholder_env: placeholder_texture(device, queue, "PBR Env Placeholder", [0, 0, 0, 255]),
            placeholder_irradiance: placeholder_texture(
                device,
                queue,
                "PBR Irradiance Placeholder",
                [0, 0, 0, 255],
            ),
            placeholder_lut: placeholder_texture(device, queue, "PBR LUT Placeholder", [255, 0, 0, 255]),
            ibl,
            fallback,
            ibl_bind_group: None,
            fallback_bind_group: None,
        }
    }

    pub(crate) fn write_transform(&self, queue: &wgpu::Queue, transform: &PbrTransform) {
        queue.write_buffer(&self.transform_buffer, 0, bytes_of(transform));
    }

    pub(crate) fn write_material(&self, queue: &wgpu::Queue, material: &PbrMaterial) {
        queue.write_buffer(&self.material_buffer, 0, bytes_of(material));
    }

    pub(crate) fn write_params(&self, queue: &wgpu::Queue, params: &PbrParams) {
        queue.write_buffer(&self.params_buffer, 0, bytes_of(params));
    }

    /// Drops the IBL bind group so the next draw rebuilds it with the
    /// currently bound environment textures.
    pub(crate) fn invalidate_bind_group(&mut self) {
        self.ibl_bind_group = None;
    }

    /// The bind group of the image-based pipeline; placeholders stand in
    /// for any unbound texture.
    pub(crate) fn ibl_bind_group(
        &mut self,
        device: &wgpu::Device,
        env: Option<&wgpu::TextureView>,
        irradiance: Option<&wgpu::TextureView>,
        lut: Option<&wgpu::TextureView>,
    ) -> &wgpu::BindGroup {
        let Self {
            ibl_bind_group,
            ibl,
            transform_buffer,
            material_buffer,
            params_buffer,
            sampler,
            placeholder_env,
            placeholder_irradiance,
            placeholder_lut,
            ..
        } = self;
        ibl_bind_group.get_or_insert_with(|| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("PBR Bind Group"),
                layout: ibl.bind_group_layout(),
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: transform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: material_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(env.unwrap_or(placeholder_env)),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: wgpu::BindingResource::TextureView(
                            irradiance.unwrap_or(placeholder_irradiance),
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 5,
                        resource: wgpu::BindingResource::TextureView(lut.unwrap_or(placeholder_lut)),
                    },
                    wgpu::BindGroupEntry {
                        binding: 6,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            })
        })
    }

    /// The bind group of the analytical fallback pipeline.
    pub(crate) fn fallback_bind_group(&mut self, device: &wgpu::Device) -> &wgpu::BindGroup {
        let Self {
            fallback_bind_group,
            fallback,
            transform_buffer,
            material_buffer,
            params_buffer,
            ..
        } = self;
        fallback_bind_group.get_or_insert_with(|| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("PBR Fallback Bind Group"),
                layout: fallback.bind_group_layout(),
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: transform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: material_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: params_buffer.as_entire_binding(),
                    },
                ],
            })
        })
    }

    /// The pipeline for a topology, from the image-based or fallback set.
    pub(crate) fn pipeline(
        &mut self,
        device: &wgpu::Device,
        topology: PrimitiveTopology,
        color_format: wgpu::TextureFormat,
        image_based: bool,
    ) -> Option<&wgpu::RenderPipeline> {
        if image_based {
            self.ibl.pipeline(device, topology, color_format)
        } else {
            self.fallback.pipeline(device, topology, color_format)
        }
    }
}
