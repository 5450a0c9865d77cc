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

//! The skybox subsystem: an inside-out unit cube sampling an
//! equirectangular environment map. Depth writes are disabled and face
//! culling stays off (the cube's faces point inward); the vertex shader
//! lands every fragment on the far plane.

use super::pbr::placeholder_texture;
use super::pipeline::PipelineSet;
use crate::graphics::shaders;
use bytemuck::bytes_of;
use vitra_core::{
    PrimitiveTopology, SkyboxUniforms, VertexAttribute, VertexAttributeFormat, VertexLayout,
};

/// 36 positions of a unit cube, one triangle list, faces inward.
const CUBE_POSITIONS: [[f32; 3]; 36] = [
    // -z
    [-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0],
    // +z
    [-1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0],
    // -x
    [-1.0, 1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0],
    [-1.0, -1.0, -1.0], [-1.0, 1.0, 1.0], [-1.0, -1.0, 1.0],
    // +x
    [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0],
    // -y
    [-1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0],
    // +y
    [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0],
];

fn skybox_vertex_layout() -> VertexLayout {
    VertexLayout {
        stride: 12,
        attributes: vec![VertexAttribute {
            location: 0,
            format: VertexAttributeFormat::Float32x3,
            offset: 0,
        }],
    }
}

/// GPU state for the skybox.
#[derive(Debug)]
pub(crate) struct SkyboxResources {
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    placeholder_env: wgpu::TextureView,
    set: PipelineSet,
    bind_group: Option<wgpu::BindGroup>,
}

impl SkyboxResources {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Skybox Bind Group Layout"),
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
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skybox"),
            source: wgpu::ShaderSource::Wgsl(shaders::SKYBOX_WGSL.into()),
        });

        // Depth write off; compare stays LessEqual so the far-plane box
        // never occludes geometry.
        let set = PipelineSet::new(
            device,
            "Skybox",
            module.clone(),
            module,
            layout,
            skybox_vertex_layout(),
            color_format,
            None,
            false,
        );

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Skybox Cube"),
            size: std::mem::size_of_val(&CUBE_POSITIONS) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&vertex_buffer, 0, bytemuck::cast_slice(&CUBE_POSITIONS));

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Skybox Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            uniform_buffer: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Skybox Uniforms"),
                size: std::mem::size_of::<SkyboxUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            vertex_buffer,
            sampler,
            placeholder_env: placeholder_texture(device, queue, "Skybox Env Placeholder", [0, 0, 0, 255]),
            set,
            bind_group: None,
        }
    }

    pub(crate) fn invalidate_bind_group(&mut self) {
        self.bind_group = None;
    }

    /// Writes the uniforms and records the 36-vertex draw on `pass`.
    pub(crate) fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'static>,
        color_format: wgpu::TextureFormat,
        uniforms: &SkyboxUniforms,
        environment: Option<&wgpu::TextureView>,
    ) -> bool {
        queue.write_buffer(&self.uniform_buffer, 0, bytes_of(uniforms));

        if self.bind_group.is_none() {
            self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Skybox Bind Group"),
                layout: self.set.bind_group_layout(),
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(
                            environment.unwrap_or(&self.placeholder_env),
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            }));
        }

        let Some(pipeline) = self
            .set
            .pipeline(device, PrimitiveTopology::TriangleList, color_format)
        else {
            return false;
        };
        let Some(bind_group) = self.bind_group.as_ref() else {
            return false;
        };

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..CUBE_POSITIONS.len() as u32, 0..1);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_36_vertices_on_the_unit_box() {
        assert_eq!(CUBE_POSITIONS.len(), 36);
        for p in CUBE_POSITIONS {
            assert!(p.iter().all(|c| c.abs() == 1.0));
        }
    }
}
