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

//! Caches one handle per default shader kind, creating each program from
//! the backend's embedded source on first use.

use crate::gfx::api::{ShaderHandle, ShaderKind};
use crate::gfx::traits::GraphicsBackend;

/// The per-kind default shader cache.
#[derive(Debug, Default)]
pub struct ShaderManager {
    shaders: [ShaderHandle; ShaderKind::ALL.len()],
}

impl ShaderManager {
    /// Creates an empty manager; no shader is compiled until requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached handle for `kind`, creating the program on
    /// first call. Creation failure returns an invalid handle and is
    /// retried on the next request.
    pub fn get(&mut self, backend: &mut dyn GraphicsBackend, kind: ShaderKind) -> ShaderHandle {
        let slot = &mut self.shaders[kind.index()];
        if !slot.is_valid() {
            *slot = backend.create_default_shader(kind);
            if slot.is_valid() {
                log::debug!("ShaderManager: created default shader '{}'", kind.name());
            }
        }
        *slot
    }

    /// Returns the cached handle without creating anything.
    pub fn peek(&self, kind: ShaderKind) -> ShaderHandle {
        self.shaders[kind.index()]
    }

    /// Releases every cached shader through the backend.
    pub fn destroy_all(&mut self, backend: &mut dyn GraphicsBackend) {
        for slot in &mut self.shaders {
            if slot.is_valid() {
                backend.destroy_shader(*slot);
                *slot = ShaderHandle::INVALID;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::test_support::MockBackend;

    #[test]
    fn creates_each_kind_once() {
        let mut backend = MockBackend::new();
        let mut manager = ShaderManager::new();

        let first = manager.get(&mut backend, ShaderKind::Pbr);
        let second = manager.get(&mut backend, ShaderKind::Pbr);
        assert!(first.is_valid());
        assert_eq!(first, second);
        assert_eq!(backend.shaders_created(), 1);

        let other = manager.get(&mut backend, ShaderKind::Skybox);
        assert_ne!(first, other);
        assert_eq!(backend.shaders_created(), 2);
    }

    #[test]
    fn destroy_all_resets_cache() {
        let mut backend = MockBackend::new();
        let mut manager = ShaderManager::new();
        manager.get(&mut backend, ShaderKind::Mesh);
        manager.destroy_all(&mut backend);
        assert!(!manager.peek(ShaderKind::Mesh).is_valid());
    }
}
