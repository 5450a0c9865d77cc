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

//! Canonical uniform block layouts.
//!
//! These `#[repr(C)]` structs define the exact byte layout of every default
//! shader's uniform blocks. The layouts are numerically identical across
//! both backends, so application code writing uniforms by name sees the
//! same offsets everywhere. Sizes are asserted at compile time; the WGSL
//! and GLSL sources mirror these structs field for field.

use crate::math::{MAT3_IDENTITY_PADDED, MAT4_IDENTITY};
use bytemuck::{Pod, Zeroable};

/// Well-known uniform names routed by the modern backend's scratch writer
/// and resolved through the legacy backend's location cache.
pub mod names {
    /// Model-view matrix (mat4).
    pub const MODEL_VIEW: &str = "u_model_view";
    /// Projection matrix (mat4).
    pub const PROJECTION: &str = "u_projection";
    /// Tint color (vec4).
    pub const TINT: &str = "u_tint";
    /// Base color of the color shader (vec4).
    pub const COLOR: &str = "u_color";
    /// Rasterized point size (f32).
    pub const POINT_SIZE: &str = "u_point_size";
    /// Stereo eye separation (f32).
    pub const EYE_SEP: &str = "u_eye_sep";
    /// Focal length (f32).
    pub const FOCAL_LENGTH: &str = "u_focal_length";
    /// Normal matrix (mat3, lighting/PBR layouts).
    pub const NORMAL_MATRIX: &str = "u_normal_matrix";
    /// World-space camera position (vec3).
    pub const CAMERA_POS: &str = "u_camera_pos";
}

/// The 160-byte uniform block of the default mesh, textured, and
/// screen-space shaders.
///
/// | Offset | Size | Field |
/// |--------|------|-------|
/// | 0   | 64 | model-view matrix (column-major) |
/// | 64  | 64 | projection matrix |
/// | 128 | 16 | tint |
/// | 144 | 4  | point size |
/// | 148 | 4  | stereo eye separation |
/// | 152 | 4  | focal length |
/// | 156 | 4  | padding |
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BasicUniforms {
    /// Model-view matrix, column-major.
    pub model_view: [f32; 16],
    /// Projection matrix, column-major.
    pub projection: [f32; 16],
    /// Tint applied to the shaded color.
    pub tint: [f32; 4],
    /// Rasterized point size.
    pub point_size: f32,
    /// Stereo eye separation.
    pub eye_sep: f32,
    /// Focal length.
    pub focal_length: f32,
    pub _pad: f32,
}

/// The 176-byte uniform block of the color shader: [`BasicUniforms`] with
/// the base color at offset 128 and an additional tint at offset 160.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColorUniforms {
    /// The shared leading 160 bytes (`tint` field holds the base color).
    pub base: BasicUniforms,
    /// The color shader's tint, applied on top of the base color.
    pub tint: [f32; 4],
}

/// The 224-byte transform block of the lighting shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightingTransform {
    /// Model-view matrix, column-major.
    pub model_view: [f32; 16],
    /// Projection matrix, column-major.
    pub projection: [f32; 16],
    /// Normal matrix, three vec4-padded rows.
    pub normal_matrix: [[f32; 4]; 3],
    /// Tint applied to the lit color.
    pub tint: [f32; 4],
    /// Rasterized point size.
    pub point_size: f32,
    /// Stereo eye separation.
    pub eye_sep: f32,
    /// Focal length.
    pub focal_length: f32,
    pub _pad: f32,
    /// Eye-space camera position.
    pub camera_pos: [f32; 4],
}

/// One light source within [`LightingBlock`], 80 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Light {
    /// Eye-space position; `w == 0` marks a directional light.
    pub position: [f32; 4],
    /// Diffuse color.
    pub diffuse: [f32; 4],
    /// Specular color.
    pub specular: [f32; 4],
    /// Constant, linear, and quadratic attenuation (w unused).
    pub attenuation: [f32; 4],
    /// Spot direction (xyz) and cosine cutoff (w, <= -1 disables).
    pub direction: [f32; 4],
}

/// Material terms within [`LightingBlock`], 64 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightingMaterial {
    /// Ambient reflectance.
    pub ambient: [f32; 4],
    /// Diffuse reflectance.
    pub diffuse: [f32; 4],
    /// Specular reflectance.
    pub specular: [f32; 4],
    /// Specular exponent.
    pub shininess: f32,
    pub _pad: [f32; 3],
}

/// The maximum number of simultaneous lights in the lighting shader.
pub const MAX_LIGHTS: usize = 8;

/// The 752-byte lighting block: eight lights, the material, and globals.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightingBlock {
    /// The light array; only the first `light_count` entries contribute.
    pub lights: [Light; MAX_LIGHTS],
    /// Material terms.
    pub material: LightingMaterial,
    /// Scene-wide ambient term.
    pub global_ambient: [f32; 4],
    /// Eye position (eye space, so the origin in practice).
    pub eye_position: [f32; 4],
    /// Number of active lights.
    pub light_count: u32,
    pub _pad: [u32; 3],
}

/// The 144-byte skybox uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SkyboxUniforms {
    /// View matrix; the shader strips its translation.
    pub view: [f32; 16],
    /// Projection matrix.
    pub projection: [f32; 16],
    /// Exposure applied before tone mapping.
    pub exposure: f32,
    /// Gamma for output encoding.
    pub gamma: f32,
    pub _pad: [f32; 2],
}

/// The 192-byte PBR (and reflection) transform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PbrTransform {
    /// Model-view matrix, column-major.
    pub model_view: [f32; 16],
    /// Projection matrix, column-major.
    pub projection: [f32; 16],
    /// Normal matrix, three vec4-padded rows.
    pub normal_matrix: [[f32; 4]; 3],
    /// World-space camera position.
    pub camera_pos: [f32; 4],
}

/// The 48-byte PBR material block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PbrMaterial {
    /// Base color.
    pub albedo: [f32; 4],
    /// Metallic factor in `[0, 1]`.
    pub metallic: f32,
    /// Roughness factor in `[0, 1]`.
    pub roughness: f32,
    /// Ambient occlusion factor.
    pub ambient_occlusion: f32,
    pub _pad: f32,
    /// Emissive color.
    pub emissive: [f32; 4],
}

/// The 80-byte PBR parameter block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PbrParams {
    /// World-space camera position.
    pub camera_pos: [f32; 4],
    /// Exposure applied before tone mapping.
    pub exposure: f32,
    /// Gamma for output encoding.
    pub gamma: f32,
    /// Scale on the environment contribution.
    pub env_intensity: f32,
    /// Rotation of the environment about the y axis, radians.
    pub env_rotation: f32,
    /// Nonzero when the equirectangular environment map is bound.
    pub has_env_map: u32,
    /// Nonzero when the irradiance map is populated.
    pub has_irradiance: u32,
    /// Nonzero when the split-sum BRDF lookup table is bound.
    pub has_brdf_lut: u32,
    pub _pad0: u32,
    /// Reinhard white point.
    pub tonemap_white: f32,
    pub _pad1: [f32; 3],
    pub _reserved: [f32; 4],
}

/// The 48-byte environment-reflection parameter block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ReflectParams {
    /// World-space camera position.
    pub camera_pos: [f32; 4],
    /// Base surface color mixed with the reflection.
    pub base_color: [f32; 4],
    /// Exposure applied before tone mapping.
    pub exposure: f32,
    /// Gamma for output encoding.
    pub gamma: f32,
    /// Mix factor between base color and reflection.
    pub reflectivity: f32,
    /// Rotation of the environment about the y axis, radians.
    pub env_rotation: f32,
}

const _: () = assert!(std::mem::size_of::<BasicUniforms>() == 160);
const _: () = assert!(std::mem::size_of::<ColorUniforms>() == 176);
const _: () = assert!(std::mem::size_of::<LightingTransform>() == 224);
const _: () = assert!(std::mem::size_of::<Light>() == 80);
const _: () = assert!(std::mem::size_of::<LightingMaterial>() == 64);
const _: () = assert!(std::mem::size_of::<LightingBlock>() == 752);
const _: () = assert!(std::mem::size_of::<SkyboxUniforms>() == 144);
const _: () = assert!(std::mem::size_of::<PbrTransform>() == 192);
const _: () = assert!(std::mem::size_of::<PbrMaterial>() == 48);
const _: () = assert!(std::mem::size_of::<PbrParams>() == 80);
const _: () = assert!(std::mem::size_of::<ReflectParams>() == 48);

impl Default for BasicUniforms {
    fn default() -> Self {
        Self {
            model_view: MAT4_IDENTITY,
            projection: MAT4_IDENTITY,
            tint: [1.0, 1.0, 1.0, 1.0],
            point_size: 1.0,
            eye_sep: 0.0,
            focal_length: 6.0,
            _pad: 0.0,
        }
    }
}

impl Default for ColorUniforms {
    fn default() -> Self {
        Self {
            base: BasicUniforms::default(),
            tint: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl Default for LightingTransform {
    fn default() -> Self {
        Self {
            model_view: MAT4_IDENTITY,
            projection: MAT4_IDENTITY,
            normal_matrix: MAT3_IDENTITY_PADDED,
            tint: [1.0, 1.0, 1.0, 1.0],
            point_size: 1.0,
            eye_sep: 0.0,
            focal_length: 6.0,
            _pad: 0.0,
            camera_pos: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 4.0, 1.0],
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [1.0, 1.0, 1.0, 1.0],
            attenuation: [1.0, 0.0, 0.0, 0.0],
            direction: [0.0, 0.0, -1.0, -2.0],
        }
    }
}

impl Default for LightingMaterial {
    fn default() -> Self {
        Self {
            ambient: [0.2, 0.2, 0.2, 1.0],
            diffuse: [0.8, 0.8, 0.8, 1.0],
            specular: [0.5, 0.5, 0.5, 1.0],
            shininess: 32.0,
            _pad: [0.0; 3],
        }
    }
}

impl Default for LightingBlock {
    fn default() -> Self {
        Self {
            lights: [Light::default(); MAX_LIGHTS],
            material: LightingMaterial::default(),
            global_ambient: [0.1, 0.1, 0.1, 1.0],
            eye_position: [0.0, 0.0, 0.0, 1.0],
            light_count: 1,
            _pad: [0; 3],
        }
    }
}

impl Default for SkyboxUniforms {
    fn default() -> Self {
        Self {
            view: MAT4_IDENTITY,
            projection: MAT4_IDENTITY,
            exposure: 1.0,
            gamma: 2.2,
            _pad: [0.0; 2],
        }
    }
}

impl Default for PbrTransform {
    fn default() -> Self {
        Self {
            model_view: MAT4_IDENTITY,
            projection: MAT4_IDENTITY,
            normal_matrix: MAT3_IDENTITY_PADDED,
            camera_pos: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Default for PbrMaterial {
    fn default() -> Self {
        Self {
            albedo: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            ambient_occlusion: 1.0,
            _pad: 0.0,
            emissive: [0.0, 0.0, 0.0, 0.0],
        }
    }
}

impl Default for PbrParams {
    fn default() -> Self {
        Self {
            camera_pos: [0.0, 0.0, 0.0, 1.0],
            exposure: 1.0,
            gamma: 2.2,
            env_intensity: 1.0,
            env_rotation: 0.0,
            has_env_map: 0,
            has_irradiance: 0,
            has_brdf_lut: 0,
            _pad0: 0,
            tonemap_white: 1.0,
            _pad1: [0.0; 3],
            _reserved: [0.0; 4],
        }
    }
}

impl Default for ReflectParams {
    fn default() -> Self {
        Self {
            camera_pos: [0.0, 0.0, 0.0, 1.0],
            base_color: [0.5, 0.5, 0.5, 1.0],
            exposure: 1.0,
            gamma: 2.2,
            reflectivity: 0.8,
            env_rotation: 0.0,
        }
    }
}

/// The scratch layout the modern backend routes named uniforms through.
///
/// Setting a uniform by name writes into the active layout's block at the
/// name's offset; `flush_uniforms` then copies the block into the uniform
/// ring for the next draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockLayout {
    /// [`BasicUniforms`] (mesh, textured, screen-space shaders).
    Basic,
    /// [`ColorUniforms`].
    Color,
    /// [`LightingTransform`].
    Lighting,
}

impl BlockLayout {
    /// Total block size in bytes.
    pub const fn byte_size(&self) -> usize {
        match self {
            BlockLayout::Basic => std::mem::size_of::<BasicUniforms>(),
            BlockLayout::Color => std::mem::size_of::<ColorUniforms>(),
            BlockLayout::Lighting => std::mem::size_of::<LightingTransform>(),
        }
    }

    /// Resolves a uniform name to its `(offset, size)` within this layout,
    /// or `None` if the name does not exist in the layout.
    pub fn offset_of(&self, name: &str) -> Option<(usize, usize)> {
        match self {
            BlockLayout::Basic => match name {
                names::MODEL_VIEW => Some((0, 64)),
                names::PROJECTION => Some((64, 64)),
                names::TINT | names::COLOR => Some((128, 16)),
                names::POINT_SIZE => Some((144, 4)),
                names::EYE_SEP => Some((148, 4)),
                names::FOCAL_LENGTH => Some((152, 4)),
                _ => None,
            },
            BlockLayout::Color => match name {
                names::MODEL_VIEW => Some((0, 64)),
                names::PROJECTION => Some((64, 64)),
                names::COLOR => Some((128, 16)),
                names::POINT_SIZE => Some((144, 4)),
                names::EYE_SEP => Some((148, 4)),
                names::FOCAL_LENGTH => Some((152, 4)),
                names::TINT => Some((160, 16)),
                _ => None,
            },
            BlockLayout::Lighting => match name {
                names::MODEL_VIEW => Some((0, 64)),
                names::PROJECTION => Some((64, 64)),
                names::NORMAL_MATRIX => Some((128, 48)),
                names::TINT => Some((176, 16)),
                names::POINT_SIZE => Some((192, 4)),
                names::EYE_SEP => Some((196, 4)),
                names::FOCAL_LENGTH => Some((200, 4)),
                names::CAMERA_POS => Some((208, 12)),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_offsets_match_layout_table() {
        let layout = BlockLayout::Basic;
        assert_eq!(layout.offset_of(names::MODEL_VIEW), Some((0, 64)));
        assert_eq!(layout.offset_of(names::PROJECTION), Some((64, 64)));
        assert_eq!(layout.offset_of(names::TINT), Some((128, 16)));
        assert_eq!(layout.offset_of(names::POINT_SIZE), Some((144, 4)));
        assert_eq!(layout.offset_of(names::FOCAL_LENGTH), Some((152, 4)));
        assert_eq!(layout.offset_of("u_unknown"), None);
    }

    #[test]
    fn color_layout_extends_basic() {
        let layout = BlockLayout::Color;
        assert_eq!(layout.byte_size(), 176);
        assert_eq!(layout.offset_of(names::COLOR), Some((128, 16)));
        assert_eq!(layout.offset_of(names::TINT), Some((160, 16)));
    }

    #[test]
    fn lighting_transform_offsets() {
        let layout = BlockLayout::Lighting;
        assert_eq!(layout.byte_size(), 224);
        assert_eq!(layout.offset_of(names::NORMAL_MATRIX), Some((128, 48)));
        assert_eq!(layout.offset_of(names::CAMERA_POS), Some((208, 12)));
    }

    #[test]
    fn struct_field_offsets() {
        // Spot-check the byte positions the named-offset table promises.
        let mut block = BasicUniforms::default();
        block.tint = [0.25, 0.5, 0.75, 1.0];
        block.point_size = 3.0;
        let bytes = bytemuck::bytes_of(&block);
        let tint: &[f32] = bytemuck::cast_slice(&bytes[128..144]);
        assert_eq!(tint, &[0.25, 0.5, 0.75, 1.0]);
        let ps: &[f32] = bytemuck::cast_slice(&bytes[144..148]);
        assert_eq!(ps, &[3.0]);
    }

    #[test]
    fn default_pbr_material_is_grey_dielectric() {
        let mat = PbrMaterial::default();
        assert_eq!(mat.albedo, [0.8, 0.8, 0.8, 1.0]);
        assert_eq!(mat.metallic, 0.0);
        assert_eq!(mat.roughness, 0.5);
    }
}
