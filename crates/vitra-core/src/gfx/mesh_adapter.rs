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

//! The mesh adapter: converts framework meshes into cached GPU buffers in
//! the standard interleaved vertex format, rewriting fan and loop
//! topologies into the list topologies the modern backend accepts.

use crate::gfx::api::{
    BufferDescriptor, BufferHandle, BufferType, BufferUsageHint, IndexFormat, Mesh, MeshId,
    PrimitiveTopology, StandardVertex,
};
use crate::gfx::traits::GraphicsBackend;
use std::borrow::Cow;
use std::collections::HashMap;

/// A cached vertex/index buffer pair for one mesh.
#[derive(Debug, Clone, Copy)]
pub struct GpuMeshEntry {
    /// The interleaved vertex buffer.
    pub vertex_buffer: BufferHandle,
    /// The 32-bit index buffer, or invalid when the geometry is
    /// non-indexed.
    pub index_buffer: BufferHandle,
    /// Vertices in the vertex buffer (after any topology expansion).
    pub vertex_count: u32,
    /// Indices in the index buffer (after any topology rewrite).
    pub index_count: u32,
    /// The effective topology to draw with.
    pub topology: PrimitiveTopology,
    source_topology: PrimitiveTopology,
    version: u64,
}

/// Interleaves and caches framework meshes as GPU buffers.
///
/// Entries are keyed by the mesh's stable identity and versioned by a
/// cheap function of its vertex and index counts; a prepare call with an
/// unchanged mesh is a cache hit and touches no GPU state.
#[derive(Debug, Default)]
pub struct MeshGpuCache {
    entries: HashMap<MeshId, GpuMeshEntry>,
}

impl MeshGpuCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached meshes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ensures GPU buffers exist and are current for `mesh`, returning the
    /// cache entry. Returns `None` for empty meshes or on buffer-creation
    /// failure.
    pub fn prepare(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        mesh: &Mesh,
    ) -> Option<GpuMeshEntry> {
        if mesh.positions.is_empty() {
            return None;
        }

        let fresh = self
            .entries
            .get(&mesh.id())
            .is_some_and(|e| e.version == mesh.version() && e.source_topology == mesh.primitive);
        if fresh {
            return self.entries.get(&mesh.id()).copied();
        }

        if let Some(stale) = self.entries.remove(&mesh.id()) {
            backend.destroy_buffer(stale.vertex_buffer);
            if stale.index_buffer.is_valid() {
                backend.destroy_buffer(stale.index_buffer);
            }
        }

        let (vertices, indices, topology) = build_geometry(mesh);

        let vertex_bytes: &[u8] = bytemuck::cast_slice(&vertices);
        let vertex_buffer = backend.create_buffer(
            &BufferDescriptor {
                label: Some(Cow::Borrowed("mesh vertices")),
                buffer_type: BufferType::Vertex,
                usage: BufferUsageHint::Dynamic,
                size: vertex_bytes.len() as u64,
            },
            Some(vertex_bytes),
        );
        if !vertex_buffer.is_valid() {
            log::warn!("MeshGpuCache: vertex buffer creation failed for {:?}", mesh.id());
            return None;
        }

        let (index_buffer, index_count) = match &indices {
            Some(idx) => {
                let index_bytes: &[u8] = bytemuck::cast_slice(idx);
                let buffer = backend.create_buffer(
                    &BufferDescriptor {
                        label: Some(Cow::Borrowed("mesh indices")),
                        buffer_type: BufferType::Index,
                        usage: BufferUsageHint::Dynamic,
                        size: index_bytes.len() as u64,
                    },
                    Some(index_bytes),
                );
                if !buffer.is_valid() {
                    log::warn!(
                        "MeshGpuCache: index buffer creation failed for {:?}",
                        mesh.id()
                    );
                    backend.destroy_buffer(vertex_buffer);
                    return None;
                }
                (buffer, idx.len() as u32)
            }
            None => (BufferHandle::INVALID, 0),
        };

        let entry = GpuMeshEntry {
            vertex_buffer,
            index_buffer,
            vertex_count: vertices.len() as u32,
            index_count,
            topology,
            source_topology: mesh.primitive,
            version: mesh.version(),
        };
        self.entries.insert(mesh.id(), entry);
        Some(entry)
    }

    /// Prepares (if needed) and draws the mesh. `count` restricts the
    /// number of indices (indexed) or vertices (non-indexed) drawn.
    pub fn draw(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        mesh: &Mesh,
        count: Option<u32>,
    ) {
        let Some(entry) = self.prepare(backend, mesh) else {
            return;
        };

        backend.set_vertex_buffer(entry.vertex_buffer, &StandardVertex::layout());
        if entry.index_buffer.is_valid() {
            backend.set_index_buffer(entry.index_buffer, IndexFormat::Uint32);
            let n = count.unwrap_or(entry.index_count).min(entry.index_count);
            backend.draw_indexed(entry.topology, 0, n, 0);
        } else {
            let n = count.unwrap_or(entry.vertex_count).min(entry.vertex_count);
            backend.draw(entry.topology, 0, n);
        }
    }

    /// Drops one mesh's buffers from the cache.
    pub fn remove(&mut self, backend: &mut dyn GraphicsBackend, id: MeshId) {
        if let Some(entry) = self.entries.remove(&id) {
            backend.destroy_buffer(entry.vertex_buffer);
            if entry.index_buffer.is_valid() {
                backend.destroy_buffer(entry.index_buffer);
            }
        }
    }

    /// Destroys every cached buffer.
    pub fn clear(&mut self, backend: &mut dyn GraphicsBackend) {
        for (_, entry) in self.entries.drain() {
            backend.destroy_buffer(entry.vertex_buffer);
            if entry.index_buffer.is_valid() {
                backend.destroy_buffer(entry.index_buffer);
            }
        }
    }
}

/// Interleaves the mesh's attribute streams and rewrites fan/loop
/// topologies, returning the vertex array, the rewritten index array (if
/// the mesh is indexed), and the effective topology.
fn build_geometry(mesh: &Mesh) -> (Vec<StandardVertex>, Option<Vec<u32>>, PrimitiveTopology) {
    let interleaved = interleave(mesh);

    match mesh.primitive {
        PrimitiveTopology::TriangleFan => {
            if mesh.is_indexed() {
                let idx = fan_to_list_indices(&mesh.indices);
                (interleaved, Some(idx), PrimitiveTopology::TriangleList)
            } else {
                let expanded = fan_to_list_vertices(&interleaved);
                (expanded, None, PrimitiveTopology::TriangleList)
            }
        }
        PrimitiveTopology::LineLoop => {
            if mesh.is_indexed() {
                let idx = loop_to_list_indices(&mesh.indices);
                (interleaved, Some(idx), PrimitiveTopology::LineList)
            } else {
                let expanded = loop_to_list_vertices(&interleaved);
                (expanded, None, PrimitiveTopology::LineList)
            }
        }
        topology => {
            let indices = mesh.is_indexed().then(|| mesh.indices.clone());
            (interleaved, indices, topology)
        }
    }
}

fn interleave(mesh: &Mesh) -> Vec<StandardVertex> {
    let defaults = StandardVertex::default();
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, &position)| StandardVertex {
            position,
            color: mesh.colors.get(i).copied().unwrap_or(defaults.color),
            texcoord: mesh.texcoords.get(i).copied().unwrap_or(defaults.texcoord),
            normal: mesh.normals.get(i).copied().unwrap_or(defaults.normal),
        })
        .collect()
}

fn fan_to_list_vertices(vertices: &[StandardVertex]) -> Vec<StandardVertex> {
    if vertices.len() < 3 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity((vertices.len() - 2) * 3);
    for i in 0..vertices.len() - 2 {
        out.push(vertices[0]);
        out.push(vertices[i + 1]);
        out.push(vertices[i + 2]);
    }
    out
}

fn fan_to_list_indices(indices: &[u32]) -> Vec<u32> {
    if indices.len() < 3 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity((indices.len() - 2) * 3);
    for i in 0..indices.len() - 2 {
        out.push(indices[0]);
        out.push(indices[i + 1]);
        out.push(indices[i + 2]);
    }
    out
}

fn loop_to_list_vertices(vertices: &[StandardVertex]) -> Vec<StandardVertex> {
    if vertices.len() < 2 {
        return Vec::new();
    }
    let n = vertices.len();
    let mut out = Vec::with_capacity(n * 2);
    for i in 0..n {
        out.push(vertices[i]);
        out.push(vertices[(i + 1) % n]);
    }
    out
}

fn loop_to_list_indices(indices: &[u32]) -> Vec<u32> {
    if indices.len() < 2 {
        return Vec::new();
    }
    let n = indices.len();
    let mut out = Vec::with_capacity(n * 2);
    for i in 0..n {
        out.push(indices[i]);
        out.push(indices[(i + 1) % n]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::test_support::MockBackend;

    fn fan_mesh(n: usize) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleFan);
        for i in 0..n {
            mesh.vertex(i as f32, 0.0, 0.0);
        }
        mesh
    }

    #[test]
    fn fan_conversion_counts_and_center() {
        let mesh = fan_mesh(5);
        let (vertices, indices, topology) = build_geometry(&mesh);
        assert_eq!(topology, PrimitiveTopology::TriangleList);
        assert!(indices.is_none());
        // 3 * (5 - 2) vertices, every triangle led by the fan center.
        assert_eq!(vertices.len(), 9);
        for tri in vertices.chunks(3) {
            assert_eq!(tri[0].position, [0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn indexed_fan_conversion() {
        let mut mesh = fan_mesh(4);
        mesh.indices = vec![3, 0, 1, 2];
        let (vertices, indices, topology) = build_geometry(&mesh);
        assert_eq!(topology, PrimitiveTopology::TriangleList);
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.unwrap(), vec![3, 0, 1, 3, 1, 2]);
    }

    #[test]
    fn line_loop_closes() {
        let mut mesh = Mesh::new(PrimitiveTopology::LineLoop);
        for i in 0..4 {
            mesh.vertex(i as f32, 0.0, 0.0);
        }
        let (vertices, _, topology) = build_geometry(&mesh);
        assert_eq!(topology, PrimitiveTopology::LineList);
        // n segments, the last returning to vertex 0.
        assert_eq!(vertices.len(), 8);
        assert_eq!(vertices[6].position, [3.0, 0.0, 0.0]);
        assert_eq!(vertices[7].position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn short_streams_get_defaults() {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList);
        mesh.vertex(0.0, 0.0, 0.0).vertex(1.0, 0.0, 0.0).vertex(0.0, 1.0, 0.0);
        mesh.color(1.0, 0.0, 0.0, 1.0); // only the first vertex is colored
        let vertices = interleave(&mesh);
        assert_eq!(vertices[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(vertices[1].color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(vertices[2].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[2].texcoord, [0.0, 0.0]);
    }

    #[test]
    fn second_prepare_is_a_cache_hit() {
        let mut backend = MockBackend::new();
        let mut cache = MeshGpuCache::new();
        let mesh = fan_mesh(5);

        cache.prepare(&mut backend, &mesh).unwrap();
        let created = backend.buffers_created();
        cache.prepare(&mut backend, &mesh).unwrap();
        assert_eq!(backend.buffers_created(), created);
    }

    #[test]
    fn count_change_invalidates() {
        let mut backend = MockBackend::new();
        let mut cache = MeshGpuCache::new();
        let mut mesh = fan_mesh(5);

        let first = cache.prepare(&mut backend, &mesh).unwrap();
        mesh.vertex(9.0, 9.0, 0.0);
        let second = cache.prepare(&mut backend, &mesh).unwrap();
        assert_ne!(first.vertex_buffer, second.vertex_buffer);
        assert!(backend.buffer_is_destroyed(first.vertex_buffer));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn draw_binds_and_submits() {
        let mut backend = MockBackend::new();
        let mut cache = MeshGpuCache::new();
        let mesh = fan_mesh(5);

        cache.draw(&mut backend, &mesh, None);
        let draw = backend.last_draw().expect("a draw was recorded");
        assert_eq!(draw.topology, PrimitiveTopology::TriangleList);
        assert_eq!(draw.count, 9);
        assert!(!draw.indexed);
    }

    #[test]
    fn clear_destroys_everything() {
        let mut backend = MockBackend::new();
        let mut cache = MeshGpuCache::new();
        let a = fan_mesh(5);
        let mut b = Mesh::new(PrimitiveTopology::TriangleList);
        b.vertex(0.0, 0.0, 0.0).vertex(1.0, 0.0, 0.0).vertex(0.0, 1.0, 0.0);
        b.indices = vec![0, 1, 2];

        cache.prepare(&mut backend, &a).unwrap();
        cache.prepare(&mut backend, &b).unwrap();
        cache.clear(&mut backend);
        assert!(cache.is_empty());
        assert_eq!(backend.live_buffers(), 0);
    }
}
