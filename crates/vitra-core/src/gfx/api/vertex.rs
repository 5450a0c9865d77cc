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

//! Vertex layouts, primitive topologies, and the standard interleaved
//! vertex every default shader consumes.

use bytemuck::{Pod, Zeroable};

/// How vertices are assembled into primitives.
///
/// `LineLoop` and `TriangleFan` exist for framework meshes; the modern
/// backend cannot draw them directly and relies on the mesh adapter to
/// rewrite them into `LineList` / `TriangleList`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Isolated points.
    PointList,
    /// Isolated lines, two vertices each.
    LineList,
    /// A connected line strip.
    LineStrip,
    /// A connected line strip closed back to the first vertex.
    LineLoop,
    /// Isolated triangles, three vertices each.
    #[default]
    TriangleList,
    /// A connected triangle strip.
    TriangleStrip,
    /// A fan of triangles sharing the first vertex.
    TriangleFan,
}

impl PrimitiveTopology {
    /// Whether the modern backend can draw this topology without
    /// conversion by the mesh adapter.
    pub const fn is_directly_drawable(&self) -> bool {
        !matches!(self, PrimitiveTopology::LineLoop | PrimitiveTopology::TriangleFan)
    }

    /// Whether this is a strip topology (which requires a strip index
    /// format under indexed draws on the modern backend).
    pub const fn is_strip(&self) -> bool {
        matches!(self, PrimitiveTopology::LineStrip | PrimitiveTopology::TriangleStrip)
    }
}

/// The data format of a single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// One 32-bit float.
    Float32,
    /// Two 32-bit floats.
    Float32x2,
    /// Three 32-bit floats.
    Float32x3,
    /// Four 32-bit floats.
    Float32x4,
}

impl VertexAttributeFormat {
    /// Number of float components.
    pub const fn component_count(&self) -> u32 {
        match self {
            VertexAttributeFormat::Float32 => 1,
            VertexAttributeFormat::Float32x2 => 2,
            VertexAttributeFormat::Float32x3 => 3,
            VertexAttributeFormat::Float32x4 => 4,
        }
    }

    /// Size in bytes.
    pub const fn byte_size(&self) -> u64 {
        self.component_count() as u64 * 4
    }
}

/// One attribute within a vertex buffer layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Data format.
    pub format: VertexAttributeFormat,
    /// Byte offset from the start of the vertex.
    pub offset: u64,
}

/// The memory layout of one vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    /// Byte distance between consecutive vertices.
    pub stride: u64,
    /// The attributes within each vertex.
    pub attributes: Vec<VertexAttribute>,
}

/// The interleaved vertex produced by the mesh adapter and consumed by
/// every default shader: 48 bytes, four attributes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct StandardVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Vertex color.
    pub color: [f32; 4],
    /// Texture coordinate.
    pub texcoord: [f32; 2],
    /// Object-space normal.
    pub normal: [f32; 3],
}

const _: () = assert!(std::mem::size_of::<StandardVertex>() == 48);

impl StandardVertex {
    /// Stride of the standard vertex layout in bytes.
    pub const STRIDE: u64 = 48;

    /// The standard attribute set: position @0, color @12, texcoord @28,
    /// normal @36.
    pub fn layout() -> VertexLayout {
        VertexLayout {
            stride: Self::STRIDE,
            attributes: vec![
                VertexAttribute {
                    location: 0,
                    format: VertexAttributeFormat::Float32x3,
                    offset: 0,
                },
                VertexAttribute {
                    location: 1,
                    format: VertexAttributeFormat::Float32x4,
                    offset: 12,
                },
                VertexAttribute {
                    location: 2,
                    format: VertexAttributeFormat::Float32x2,
                    offset: 28,
                },
                VertexAttribute {
                    location: 3,
                    format: VertexAttributeFormat::Float32x3,
                    offset: 36,
                },
            ],
        }
    }
}

impl Default for StandardVertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            color: [1.0, 1.0, 1.0, 1.0],
            texcoord: [0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout_offsets() {
        let layout = StandardVertex::layout();
        assert_eq!(layout.stride, 48);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 28, 36]);
    }

    #[test]
    fn fan_and_loop_need_conversion() {
        assert!(!PrimitiveTopology::TriangleFan.is_directly_drawable());
        assert!(!PrimitiveTopology::LineLoop.is_directly_drawable());
        assert!(PrimitiveTopology::TriangleStrip.is_directly_drawable());
        assert!(PrimitiveTopology::TriangleStrip.is_strip());
        assert!(!PrimitiveTopology::TriangleList.is_strip());
    }
}
