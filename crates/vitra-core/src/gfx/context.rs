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

//! The runtime context: the one object that owns the active backend and
//! the state that was process-global in earlier designs (the FBO bridge
//! and the caches). Façade operations receive it explicitly; there is no
//! singleton.

use crate::gfx::api::{Mesh, ShaderHandle, ShaderKind};
use crate::gfx::fbo_bridge::FboBridge;
use crate::gfx::mesh_adapter::MeshGpuCache;
use crate::gfx::shader_manager::ShaderManager;
use crate::gfx::traits::GraphicsBackend;

/// Owns the active backend together with the mesh cache, shader manager,
/// and FBO bridge.
pub struct RuntimeContext {
    backend: Box<dyn GraphicsBackend>,
    /// The legacy-FBO-name bridge.
    pub fbo_bridge: FboBridge,
    /// The mesh adapter's buffer cache.
    pub mesh_cache: MeshGpuCache,
    /// The default-shader cache.
    pub shaders: ShaderManager,
}

impl RuntimeContext {
    /// Wraps an already-constructed backend. Call
    /// [`init`](GraphicsBackend::init) through [`backend_mut`](Self::backend_mut)
    /// before the first frame.
    pub fn new(backend: Box<dyn GraphicsBackend>) -> Self {
        Self {
            backend,
            fbo_bridge: FboBridge::new(),
            mesh_cache: MeshGpuCache::new(),
            shaders: ShaderManager::new(),
        }
    }

    /// The active backend.
    pub fn backend(&self) -> &dyn GraphicsBackend {
        self.backend.as_ref()
    }

    /// The active backend, mutably.
    pub fn backend_mut(&mut self) -> &mut dyn GraphicsBackend {
        self.backend.as_mut()
    }

    /// Ensures the default shader of `kind` exists and returns its handle.
    pub fn default_shader(&mut self, kind: ShaderKind) -> ShaderHandle {
        self.shaders.get(self.backend.as_mut(), kind)
    }

    /// Prepares (if needed) and draws a framework mesh through the mesh
    /// adapter.
    pub fn draw_mesh(&mut self, mesh: &Mesh) {
        self.mesh_cache.draw(self.backend.as_mut(), mesh, None);
    }

    /// Drops all cached GPU state, then shuts the backend down.
    pub fn shutdown(&mut self) {
        self.mesh_cache.clear(self.backend.as_mut());
        self.shaders.destroy_all(self.backend.as_mut());
        self.fbo_bridge.clear_all();
        self.backend.shutdown();
    }
}

impl std::fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("backend", &self.backend.backend_name())
            .field("fbo_bridge", &self.fbo_bridge)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::api::PrimitiveTopology;
    use crate::gfx::test_support::MockBackend;

    #[test]
    fn draw_mesh_routes_through_cache() {
        let mut ctx = RuntimeContext::new(Box::new(MockBackend::new()));
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList);
        mesh.vertex(0.0, 0.0, 0.0).vertex(1.0, 0.0, 0.0).vertex(0.0, 1.0, 0.0);

        ctx.draw_mesh(&mesh);
        ctx.draw_mesh(&mesh);
        assert_eq!(ctx.backend().frame_stats().draw_calls, 2);
        assert_eq!(ctx.mesh_cache.len(), 1);
    }

    #[test]
    fn shutdown_clears_caches() {
        let mut ctx = RuntimeContext::new(Box::new(MockBackend::new()));
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList);
        mesh.vertex(0.0, 0.0, 0.0).vertex(1.0, 0.0, 0.0).vertex(0.0, 1.0, 0.0);
        ctx.draw_mesh(&mesh);
        ctx.default_shader(ShaderKind::Mesh);
        ctx.fbo_bridge.register(5, crate::gfx::api::RenderTargetHandle(9), 32, 32);

        ctx.shutdown();
        assert!(ctx.mesh_cache.is_empty());
        assert!(ctx.fbo_bridge.is_empty());
        assert!(!ctx.shaders.peek(ShaderKind::Mesh).is_valid());
    }
}
