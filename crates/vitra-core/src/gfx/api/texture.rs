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

//! GPU texture descriptors.

use std::borrow::Cow;

/// The memory format of the texels in a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One 8-bit unsigned normalized channel.
    R8,
    /// Two 8-bit unsigned normalized channels.
    Rg8,
    /// Four 8-bit unsigned normalized channels.
    Rgba8,
    /// Four 8-bit unsigned normalized channels, sRGB-encoded.
    Srgba8,
    /// One 16-bit half-float channel.
    R16F,
    /// Two 16-bit half-float channels.
    Rg16F,
    /// Four 16-bit half-float channels.
    Rgba16F,
    /// One 32-bit float channel.
    R32F,
    /// Two 32-bit float channels.
    Rg32F,
    /// Four 32-bit float channels.
    Rgba32F,
    /// 16-bit depth.
    Depth16,
    /// 24-bit depth.
    Depth24,
    /// 32-bit float depth.
    Depth32F,
    /// 24-bit depth with an 8-bit stencil.
    Depth24Stencil8,
}

impl PixelFormat {
    /// Bytes per texel for color formats, per depth sample for depth formats.
    pub const fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::R8 => 1,
            PixelFormat::Rg8 | PixelFormat::R16F | PixelFormat::Depth16 => 2,
            PixelFormat::Depth24 => 3,
            PixelFormat::Rgba8
            | PixelFormat::Srgba8
            | PixelFormat::Rg16F
            | PixelFormat::R32F
            | PixelFormat::Depth32F
            | PixelFormat::Depth24Stencil8 => 4,
            PixelFormat::Rgba16F | PixelFormat::Rg32F => 8,
            PixelFormat::Rgba32F => 16,
        }
    }

    /// Returns `true` for the depth (and depth-stencil) formats.
    pub const fn is_depth(&self) -> bool {
        matches!(
            self,
            PixelFormat::Depth16
                | PixelFormat::Depth24
                | PixelFormat::Depth32F
                | PixelFormat::Depth24Stencil8
        )
    }
}

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest-texel point sampling.
    Nearest,
    /// Bilinear interpolation.
    #[default]
    Linear,
}

/// How texture coordinates outside `[0, 1]` are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    /// Coordinates wrap around.
    Repeat,
    /// Coordinates clamp to the edge texel.
    #[default]
    ClampToEdge,
    /// Coordinates wrap, mirroring at integer boundaries.
    MirrorRepeat,
}

/// A descriptor used to create a texture.
///
/// The texture owns its sampler state; the backend derives a view and
/// sampler (modern) or object name and parameters (legacy) from this
/// descriptor at creation.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth in texels (1 for 2D textures).
    pub depth: u32,
    /// Texel format.
    pub format: PixelFormat,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Wrap mode on the u (s) axis.
    pub wrap_u: WrapMode,
    /// Wrap mode on the v (t) axis.
    pub wrap_v: WrapMode,
    /// Wrap mode on the w (r) axis.
    pub wrap_w: WrapMode,
    /// Whether a full mip chain is allocated.
    pub mipmaps: bool,
    /// Whether the texture may be attached to a render target.
    pub render_target: bool,
    /// Whether the texture may be bound as a storage image.
    pub storage: bool,
    /// Samples per texel (1 = no multisampling).
    pub sample_count: u32,
}

impl<'a> TextureDescriptor<'a> {
    /// A 2D RGBA8 texture with default sampling state.
    pub fn new_2d(width: u32, height: u32) -> Self {
        Self {
            label: None,
            width,
            height,
            depth: 1,
            format: PixelFormat::Rgba8,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            wrap_u: WrapMode::ClampToEdge,
            wrap_v: WrapMode::ClampToEdge,
            wrap_w: WrapMode::ClampToEdge,
            mipmaps: false,
            render_target: false,
            storage: false,
            sample_count: 1,
        }
    }

    /// Number of mip levels implied by the descriptor.
    pub fn mip_level_count(&self) -> u32 {
        if self.mipmaps {
            32 - self.width.max(self.height).max(1).leading_zeros()
        } else {
            1
        }
    }

    /// Byte size of the base mip level.
    pub fn base_level_bytes(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.depth as u64
            * self.format.bytes_per_pixel() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_level_count() {
        let mut desc = TextureDescriptor::new_2d(256, 64);
        assert_eq!(desc.mip_level_count(), 1);
        desc.mipmaps = true;
        assert_eq!(desc.mip_level_count(), 9);
    }

    #[test]
    fn depth_formats() {
        assert!(PixelFormat::Depth24Stencil8.is_depth());
        assert!(!PixelFormat::Rgba16F.is_depth());
        assert_eq!(PixelFormat::Rgba32F.bytes_per_pixel(), 16);
    }
}
