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

//! Opaque resource handles.
//!
//! Every GPU resource is identified by a 64-bit opaque integer with zero
//! reserved as the invalid value. Handles are allocated monotonically per
//! backend instance and carry no lifetime by themselves: the owning backend
//! releases the underlying object on explicit destroy or at shutdown, and
//! silently ignores operations on stale handles.

macro_rules! define_handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            /// The reserved invalid handle.
            pub const INVALID: Self = Self(0);

            /// Returns `true` if this handle was returned by a successful
            /// create call (it may still refer to a destroyed resource).
            pub const fn is_valid(&self) -> bool {
                self.0 != 0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

define_handle!(
    /// An opaque handle to a GPU buffer.
    BufferHandle
);
define_handle!(
    /// An opaque handle to a GPU texture (with its view and sampler).
    TextureHandle
);
define_handle!(
    /// An opaque handle to a compiled shader program and its pipelines.
    ShaderHandle
);
define_handle!(
    /// An opaque handle to a color (+ optional depth) render target.
    RenderTargetHandle
);
define_handle!(
    /// An opaque handle to a compute pipeline.
    ComputePipelineHandle
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_invalid() {
        assert!(!BufferHandle::INVALID.is_valid());
        assert!(!TextureHandle::default().is_valid());
        assert!(BufferHandle(1).is_valid());
    }
}
