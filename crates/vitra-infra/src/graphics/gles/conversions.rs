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

//! Translation from the shared API enums to GL enumerants.

use vitra_core::{
    BufferType, BufferUsageHint, DepthFunc, FilterMode, IndexFormat, PixelFormat,
    PrimitiveTopology, WrapMode,
};

pub(crate) fn topology(t: PrimitiveTopology) -> u32 {
    match t {
        PrimitiveTopology::PointList => glow::POINTS,
        PrimitiveTopology::LineList => glow::LINES,
        PrimitiveTopology::LineStrip => glow::LINE_STRIP,
        PrimitiveTopology::LineLoop => glow::LINE_LOOP,
        PrimitiveTopology::TriangleList => glow::TRIANGLES,
        PrimitiveTopology::TriangleStrip => glow::TRIANGLE_STRIP,
        PrimitiveTopology::TriangleFan => glow::TRIANGLE_FAN,
    }
}

/// The bind target a buffer type maps to. GL ES 3.0 has no storage
/// buffers; storage requests land on the uniform target.
pub(crate) fn buffer_target(t: BufferType) -> u32 {
    match t {
        BufferType::Vertex => glow::ARRAY_BUFFER,
        BufferType::Index => glow::ELEMENT_ARRAY_BUFFER,
        BufferType::Uniform | BufferType::Storage => glow::UNIFORM_BUFFER,
    }
}

pub(crate) fn buffer_usage(hint: BufferUsageHint) -> u32 {
    match hint {
        BufferUsageHint::Static => glow::STATIC_DRAW,
        BufferUsageHint::Dynamic => glow::DYNAMIC_DRAW,
        BufferUsageHint::Stream => glow::STREAM_DRAW,
    }
}

pub(crate) fn index_type(format: IndexFormat) -> u32 {
    match format {
        IndexFormat::Uint16 => glow::UNSIGNED_SHORT,
        IndexFormat::Uint32 => glow::UNSIGNED_INT,
    }
}

pub(crate) fn min_filter(filter: FilterMode, mipmaps: bool) -> i32 {
    (match (filter, mipmaps) {
        (FilterMode::Nearest, false) => glow::NEAREST,
        (FilterMode::Nearest, true) => glow::NEAREST_MIPMAP_NEAREST,
        (FilterMode::Linear, false) => glow::LINEAR,
        (FilterMode::Linear, true) => glow::LINEAR_MIPMAP_LINEAR,
    }) as i32
}

pub(crate) fn mag_filter(filter: FilterMode) -> i32 {
    (match filter {
        FilterMode::Nearest => glow::NEAREST,
        FilterMode::Linear => glow::LINEAR,
    }) as i32
}

pub(crate) fn wrap_mode(mode: WrapMode) -> i32 {
    (match mode {
        WrapMode::Repeat => glow::REPEAT,
        WrapMode::ClampToEdge => glow::CLAMP_TO_EDGE,
        WrapMode::MirrorRepeat => glow::MIRRORED_REPEAT,
    }) as i32
}

/// `(internal format, upload format, upload type)` for a pixel format.
pub(crate) fn pixel_format(format: PixelFormat) -> (i32, u32, u32) {
    match format {
        PixelFormat::R8 => (glow::R8 as i32, glow::RED, glow::UNSIGNED_BYTE),
        PixelFormat::Rg8 => (glow::RG8 as i32, glow::RG, glow::UNSIGNED_BYTE),
        PixelFormat::Rgba8 => (glow::RGBA8 as i32, glow::RGBA, glow::UNSIGNED_BYTE),
        PixelFormat::Srgba8 => (glow::SRGB8_ALPHA8 as i32, glow::RGBA, glow::UNSIGNED_BYTE),
        PixelFormat::R16F => (glow::R16F as i32, glow::RED, glow::HALF_FLOAT),
        PixelFormat::Rg16F => (glow::RG16F as i32, glow::RG, glow::HALF_FLOAT),
        PixelFormat::Rgba16F => (glow::RGBA16F as i32, glow::RGBA, glow::HALF_FLOAT),
        PixelFormat::R32F => (glow::R32F as i32, glow::RED, glow::FLOAT),
        PixelFormat::Rg32F => (glow::RG32F as i32, glow::RG, glow::FLOAT),
        PixelFormat::Rgba32F => (glow::RGBA32F as i32, glow::RGBA, glow::FLOAT),
        PixelFormat::Depth16 => (
            glow::DEPTH_COMPONENT16 as i32,
            glow::DEPTH_COMPONENT,
            glow::UNSIGNED_SHORT,
        ),
        PixelFormat::Depth24 => (
            glow::DEPTH_COMPONENT24 as i32,
            glow::DEPTH_COMPONENT,
            glow::UNSIGNED_INT,
        ),
        PixelFormat::Depth32F => (
            glow::DEPTH_COMPONENT32F as i32,
            glow::DEPTH_COMPONENT,
            glow::FLOAT,
        ),
        PixelFormat::Depth24Stencil8 => (
            glow::DEPTH24_STENCIL8 as i32,
            glow::DEPTH_STENCIL,
            glow::UNSIGNED_INT_24_8,
        ),
    }
}

pub(crate) fn depth_func(func: DepthFunc) -> u32 {
    match func {
        DepthFunc::Never => glow::NEVER,
        DepthFunc::Less => glow::LESS,
        DepthFunc::Equal => glow::EQUAL,
        DepthFunc::LessEqual => glow::LEQUAL,
        DepthFunc::Greater => glow::GREATER,
        DepthFunc::NotEqual => glow::NOTEQUAL,
        DepthFunc::GreaterEqual => glow::GEQUAL,
        DepthFunc::Always => glow::ALWAYS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_and_loop_are_native_here() {
        assert_eq!(topology(PrimitiveTopology::TriangleFan), glow::TRIANGLE_FAN);
        assert_eq!(topology(PrimitiveTopology::LineLoop), glow::LINE_LOOP);
    }

    #[test]
    fn mipmapped_min_filter() {
        assert_eq!(
            min_filter(FilterMode::Linear, true),
            glow::LINEAR_MIPMAP_LINEAR as i32
        );
        assert_eq!(min_filter(FilterMode::Linear, false), glow::LINEAR as i32);
    }
}
