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

//! The framework-native mesh: separate attribute streams, an optional
//! index array, and an arbitrary primitive topology.

use crate::gfx::api::PrimitiveTopology;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// A stable identity for a mesh, used as the GPU cache key.
///
/// Identities are allocated monotonically and never reused, unlike memory
/// addresses, so a cache entry can never alias a different mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

/// A mesh with separate position / color / texcoord / normal streams.
///
/// Any attribute stream other than positions may be empty or shorter than
/// the position stream; the mesh adapter extends short streams with
/// defaults when interleaving.
#[derive(Debug, Clone)]
pub struct Mesh {
    id: MeshId,
    /// Vertex positions; its length is the vertex count.
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex colors (default white).
    pub colors: Vec<[f32; 4]>,
    /// Per-vertex texture coordinates (default `(0, 0)`).
    pub texcoords: Vec<[f32; 2]>,
    /// Per-vertex normals (default `+z`).
    pub normals: Vec<[f32; 3]>,
    /// Optional index array.
    pub indices: Vec<u32>,
    /// How the vertices are assembled.
    pub primitive: PrimitiveTopology,
}

impl Mesh {
    /// Creates an empty mesh with the given topology.
    pub fn new(primitive: PrimitiveTopology) -> Self {
        Self {
            id: MeshId(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed)),
            positions: Vec::new(),
            colors: Vec::new(),
            texcoords: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            primitive,
        }
    }

    /// The stable identity of this mesh.
    pub fn id(&self) -> MeshId {
        self.id
    }

    /// Number of vertices (positions).
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether an index array is present.
    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// A cheap content version used by the GPU cache: changes whenever the
    /// vertex or index count changes.
    pub fn version(&self) -> u64 {
        ((self.positions.len() as u64) << 32) | self.indices.len() as u64
    }

    /// Appends a position.
    pub fn vertex(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.positions.push([x, y, z]);
        self
    }

    /// Appends a color.
    pub fn color(&mut self, r: f32, g: f32, b: f32, a: f32) -> &mut Self {
        self.colors.push([r, g, b, a]);
        self
    }

    /// Appends a texture coordinate.
    pub fn texcoord(&mut self, u: f32, v: f32) -> &mut Self {
        self.texcoords.push([u, v]);
        self
    }

    /// Appends a normal.
    pub fn normal(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.normals.push([x, y, z]);
        self
    }

    /// Appends an index.
    pub fn index(&mut self, i: u32) -> &mut Self {
        self.indices.push(i);
        self
    }

    /// Clears all streams, keeping the identity and topology.
    pub fn reset(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.texcoords.clear();
        self.normals.clear();
        self.indices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = Mesh::new(PrimitiveTopology::TriangleList);
        let b = Mesh::new(PrimitiveTopology::TriangleList);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn version_tracks_counts() {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList);
        let v0 = mesh.version();
        mesh.vertex(0.0, 0.0, 0.0);
        let v1 = mesh.version();
        assert_ne!(v0, v1);
        mesh.index(0);
        assert_ne!(v1, mesh.version());
    }
}
