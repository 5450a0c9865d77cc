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

//! GPU buffer descriptors.

use std::borrow::Cow;

/// The role a buffer is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferType {
    /// Vertex attribute data.
    Vertex,
    /// Index data.
    Index,
    /// Uniform block data.
    Uniform,
    /// Shader storage data (compute-capable backends only).
    Storage,
}

/// A hint describing how often the buffer contents change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsageHint {
    /// Written once, drawn many times.
    #[default]
    Static,
    /// Rewritten occasionally.
    Dynamic,
    /// Rewritten every frame.
    Stream,
}

/// The data type of indices in an index buffer, selected at bind time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// 16-bit unsigned indices.
    Uint16,
    /// 32-bit unsigned indices.
    Uint32,
}

impl IndexFormat {
    /// Size of one index in bytes.
    pub const fn byte_size(&self) -> u64 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// A descriptor used to create a buffer.
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The role of the buffer.
    pub buffer_type: BufferType,
    /// Update-frequency hint.
    pub usage: BufferUsageHint,
    /// The total size in bytes.
    pub size: u64,
}

impl<'a> BufferDescriptor<'a> {
    /// Shorthand for a labeled descriptor.
    pub fn new(label: &'a str, buffer_type: BufferType, usage: BufferUsageHint, size: u64) -> Self {
        Self {
            label: Some(Cow::Borrowed(label)),
            buffer_type,
            usage,
            size,
        }
    }
}
