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

//! Conversions from the shared API enums to their `wgpu` counterparts.

use vitra_core::{
    BlendMode, BufferType, CullFace, DepthFunc, FilterMode, IndexFormat, PixelFormat,
    PrimitiveTopology, VertexAttributeFormat, WrapMode,
};

/// Conversion into the corresponding `wgpu` type.
pub(crate) trait IntoWgpu<T> {
    fn into_wgpu(self) -> T;
}

impl IntoWgpu<wgpu::BufferUsages> for BufferType {
    fn into_wgpu(self) -> wgpu::BufferUsages {
        match self {
            BufferType::Vertex => {
                wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC
            }
            BufferType::Index => {
                wgpu::BufferUsages::INDEX
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC
            }
            BufferType::Uniform => wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            BufferType::Storage => {
                wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC
            }
        }
    }
}

impl IntoWgpu<wgpu::TextureFormat> for PixelFormat {
    fn into_wgpu(self) -> wgpu::TextureFormat {
        match self {
            PixelFormat::R8 => wgpu::TextureFormat::R8Unorm,
            PixelFormat::Rg8 => wgpu::TextureFormat::Rg8Unorm,
            PixelFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
            PixelFormat::Srgba8 => wgpu::TextureFormat::Rgba8UnormSrgb,
            PixelFormat::R16F => wgpu::TextureFormat::R16Float,
            PixelFormat::Rg16F => wgpu::TextureFormat::Rg16Float,
            PixelFormat::Rgba16F => wgpu::TextureFormat::Rgba16Float,
            PixelFormat::R32F => wgpu::TextureFormat::R32Float,
            PixelFormat::Rg32F => wgpu::TextureFormat::Rg32Float,
            PixelFormat::Rgba32F => wgpu::TextureFormat::Rgba32Float,
            // This backend's depth format is fixed at Depth24Plus; every
            // pipeline and attachment must agree on it.
            PixelFormat::Depth16
            | PixelFormat::Depth24
            | PixelFormat::Depth32F
            | PixelFormat::Depth24Stencil8 => wgpu::TextureFormat::Depth24Plus,
        }
    }
}

impl IntoWgpu<wgpu::FilterMode> for FilterMode {
    fn into_wgpu(self) -> wgpu::FilterMode {
        match self {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

impl IntoWgpu<wgpu::AddressMode> for WrapMode {
    fn into_wgpu(self) -> wgpu::AddressMode {
        match self {
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

impl IntoWgpu<wgpu::IndexFormat> for IndexFormat {
    fn into_wgpu(self) -> wgpu::IndexFormat {
        match self {
            IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
            IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
        }
    }
}

impl IntoWgpu<wgpu::VertexFormat> for VertexAttributeFormat {
    fn into_wgpu(self) -> wgpu::VertexFormat {
        match self {
            VertexAttributeFormat::Float32 => wgpu::VertexFormat::Float32,
            VertexAttributeFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
            VertexAttributeFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
            VertexAttributeFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
        }
    }
}

impl IntoWgpu<wgpu::CompareFunction> for DepthFunc {
    fn into_wgpu(self) -> wgpu::CompareFunction {
        match self {
            DepthFunc::Never => wgpu::CompareFunction::Never,
            DepthFunc::Less => wgpu::CompareFunction::Less,
            DepthFunc::Equal => wgpu::CompareFunction::Equal,
            DepthFunc::LessEqual => wgpu::CompareFunction::LessEqual,
            DepthFunc::Greater => wgpu::CompareFunction::Greater,
            DepthFunc::NotEqual => wgpu::CompareFunction::NotEqual,
            DepthFunc::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
            DepthFunc::Always => wgpu::CompareFunction::Always,
        }
    }
}

impl IntoWgpu<Option<wgpu::Face>> for CullFace {
    fn into_wgpu(self) -> Option<wgpu::Face> {
        match self {
            CullFace::None => None,
            CullFace::Front => Some(wgpu::Face::Front),
            CullFace::Back => Some(wgpu::Face::Back),
        }
    }
}

impl IntoWgpu<Option<wgpu::BlendState>> for BlendMode {
    fn into_wgpu(self) -> Option<wgpu::BlendState> {
        match self {
            BlendMode::Opaque => None,
            // Standard source-alpha blend with additive alpha.
            BlendMode::Alpha => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            }),
            BlendMode::Additive => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            }),
            BlendMode::Multiply => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::Dst,
                    dst_factor: wgpu::BlendFactor::Zero,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            }),
        }
    }
}

/// Topologies the modern API draws directly; fan and loop must have been
/// rewritten by the mesh adapter first.
pub(crate) fn topology_to_wgpu(topology: PrimitiveTopology) -> Option<wgpu::PrimitiveTopology> {
    match topology {
        PrimitiveTopology::PointList => Some(wgpu::PrimitiveTopology::PointList),
        PrimitiveTopology::LineList => Some(wgpu::PrimitiveTopology::LineList),
        PrimitiveTopology::LineStrip => Some(wgpu::PrimitiveTopology::LineStrip),
        PrimitiveTopology::TriangleList => Some(wgpu::PrimitiveTopology::TriangleList),
        PrimitiveTopology::TriangleStrip => Some(wgpu::PrimitiveTopology::TriangleStrip),
        PrimitiveTopology::LineLoop | PrimitiveTopology::TriangleFan => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_and_loop_have_no_direct_mapping() {
        assert!(topology_to_wgpu(PrimitiveTopology::TriangleFan).is_none());
        assert!(topology_to_wgpu(PrimitiveTopology::LineLoop).is_none());
        assert_eq!(
            topology_to_wgpu(PrimitiveTopology::TriangleStrip),
            Some(wgpu::PrimitiveTopology::TriangleStrip)
        );
    }

    #[test]
    fn depth_formats_collapse_to_depth24plus() {
        for format in [
            PixelFormat::Depth16,
            PixelFormat::Depth24,
            PixelFormat::Depth32F,
            PixelFormat::Depth24Stencil8,
        ] {
            assert_eq!(format.into_wgpu(), wgpu::TextureFormat::Depth24Plus);
        }
    }
}
