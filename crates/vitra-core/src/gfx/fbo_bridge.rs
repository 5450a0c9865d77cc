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

//! The render-target bridge: maps legacy framebuffer-object names to
//! modern render-target handles, so code written against the legacy API
//! can route through the modern backend.

use crate::gfx::api::RenderTargetHandle;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct BridgeEntry {
    target: RenderTargetHandle,
    width: u32,
    height: u32,
}

/// The FBO name → render target side table.
///
/// Name zero always denotes the default framebuffer and is never
/// registered; lookups on it report an invalid handle.
#[derive(Debug, Default)]
pub struct FboBridge {
    entries: HashMap<u32, BridgeEntry>,
}

impl FboBridge {
    /// Creates an empty bridge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates a legacy FBO name with a modern render target and its
    /// dimensions. Name zero is reserved and is ignored with a warning.
    pub fn register(&mut self, name: u32, target: RenderTargetHandle, width: u32, height: u32) {
        if name == 0 {
            log::warn!("FboBridge: name 0 denotes the default framebuffer and cannot be registered");
            return;
        }
        self.entries.insert(
            name,
            BridgeEntry {
                target,
                width,
                height,
            },
        );
    }

    /// The render target registered under `name`, or an invalid handle.
    pub fn lookup_handle(&self, name: u32) -> RenderTargetHandle {
        self.entries
            .get(&name)
            .map(|e| e.target)
            .unwrap_or(RenderTargetHandle::INVALID)
    }

    /// The dimensions registered under `name`; the flag reports whether
    /// the name was found.
    pub fn lookup_dimensions(&self, name: u32) -> (u32, u32, bool) {
        match self.entries.get(&name) {
            Some(e) => (e.width, e.height, true),
            None => (0, 0, false),
        }
    }

    /// Removes a registration.
    pub fn unregister(&mut self, name: u32) {
        self.entries.remove(&name);
    }

    /// Removes every registration.
    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no names are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut bridge = FboBridge::new();
        let target = RenderTargetHandle(7);
        bridge.register(42, target, 512, 512);

        assert_eq!(bridge.lookup_handle(42), target);
        assert_eq!(bridge.lookup_dimensions(42), (512, 512, true));

        bridge.unregister(42);
        assert_eq!(bridge.lookup_handle(42), RenderTargetHandle::INVALID);
        assert_eq!(bridge.lookup_dimensions(42), (0, 0, false));
    }

    #[test]
    fn name_zero_is_reserved() {
        let mut bridge = FboBridge::new();
        bridge.register(0, RenderTargetHandle(3), 64, 64);
        assert!(bridge.is_empty());
        assert_eq!(bridge.lookup_handle(0), RenderTargetHandle::INVALID);
    }

    #[test]
    fn clear_all_empties_the_table() {
        let mut bridge = FboBridge::new();
        bridge.register(1, RenderTargetHandle(1), 1, 1);
        bridge.register(2, RenderTargetHandle(2), 2, 2);
        assert_eq!(bridge.len(), 2);
        bridge.clear_all();
        assert!(bridge.is_empty());
    }
}
