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

//! The shader catalog: embedded default shader sources, keyed by
//! (shader kind, backend kind).
//!
//! The same default program exists in two source forms. WGSL sources carry
//! both stages in one file (the modern backend splits by entry point);
//! GLSL ES 3.00 sources come as separate vertex/fragment strings. Kinds
//! with no legacy-backend source (PBR, skybox, reflection, screen-space)
//! return `None` there.
//!
//! The uniform block layouts in each source are numerically identical to
//! the `#[repr(C)]` structs in `vitra_core::gfx::api::uniforms`.

use std::borrow::Cow;
use vitra_core::{BackendKind, ShaderDescriptor, ShaderKind};

/// Default mesh shader (WGSL, both stages).
pub const MESH_WGSL: &str = include_str!("wgsl/mesh.wgsl");
/// Color shader (WGSL, both stages).
pub const COLOR_WGSL: &str = include_str!("wgsl/color.wgsl");
/// Textured shader (WGSL, both stages).
pub const TEXTURED_WGSL: &str = include_str!("wgsl/textured.wgsl");
/// Screen-space textured shader (WGSL, both stages).
pub const SCREEN_SPACE_WGSL: &str = include_str!("wgsl/screen_space.wgsl");
/// Multi-light Blinn-Phong shader (WGSL, both stages).
pub const LIGHTING_WGSL: &str = include_str!("wgsl/lighting.wgsl");

/// PBR shader with split-sum image-based lighting (WGSL, both stages).
pub const PBR_WGSL: &str = include_str!("wgsl/pbr.wgsl");
/// PBR fallback shader with three analytical lights (WGSL, both stages).
pub const PBR_FALLBACK_WGSL: &str = include_str!("wgsl/pbr_fallback.wgsl");
/// Equirectangular skybox shader (WGSL, both stages).
pub const SKYBOX_WGSL: &str = include_str!("wgsl/skybox.wgsl");
/// Environment reflection shader (WGSL, both stages).
pub const REFLECT_WGSL: &str = include_str!("wgsl/reflect.wgsl");

/// Default mesh shader, GLSL ES 3.00 vertex stage.
pub const MESH_VERT_GLSL: &str = include_str!("glsl/mesh.vert");
/// Default mesh shader, GLSL ES 3.00 fragment stage.
pub const MESH_FRAG_GLSL: &str = include_str!("glsl/mesh.frag");
/// Color shader, GLSL ES 3.00 stages.
pub const COLOR_VERT_GLSL: &str = include_str!("glsl/color.vert");
pub const COLOR_FRAG_GLSL: &str = include_str!("glsl/color.frag");
/// Textured shader, GLSL ES 3.00 stages.
pub const TEXTURED_VERT_GLSL: &str = include_str!("glsl/textured.vert");
pub const TEXTURED_FRAG_GLSL: &str = include_str!("glsl/textured.frag");
/// Lighting shader, GLSL ES 3.00 stages.
pub const LIGHTING_VERT_GLSL: &str = include_str!("glsl/lighting.vert");
pub const LIGHTING_FRAG_GLSL: &str = include_str!("glsl/lighting.frag");

/// Resolves the embedded source for a default shader on a backend.
///
/// WGSL descriptors carry the same string in both stages; the backend
/// compiles one module and selects entry points `vs_main` / `fs_main`.
pub fn source(kind: ShaderKind, backend: BackendKind) -> Option<ShaderDescriptor<'static>> {
    match backend {
        BackendKind::WebGpu => {
            let wgsl = match kind {
                ShaderKind::Mesh => MESH_WGSL,
                ShaderKind::Color => COLOR_WGSL,
                ShaderKind::Textured => TEXTURED_WGSL,
                ShaderKind::ScreenSpace => SCREEN_SPACE_WGSL,
                ShaderKind::Lighting => LIGHTING_WGSL,
                ShaderKind::Pbr => PBR_WGSL,
                ShaderKind::PbrFallback => PBR_FALLBACK_WGSL,
                ShaderKind::Skybox => SKYBOX_WGSL,
                ShaderKind::Reflection => REFLECT_WGSL,
            };
            Some(ShaderDescriptor {
                name: Cow::Borrowed(kind.name()),
                vertex_source: Cow::Borrowed(wgsl),
                fragment_source: Cow::Borrowed(wgsl),
                compute_source: None,
            })
        }
        BackendKind::GlEs => {
            let (vert, frag) = match kind {
                ShaderKind::Mesh => (MESH_VERT_GLSL, MESH_FRAG_GLSL),
                ShaderKind::Color => (COLOR_VERT_GLSL, COLOR_FRAG_GLSL),
                ShaderKind::Textured => (TEXTURED_VERT_GLSL, TEXTURED_FRAG_GLSL),
                ShaderKind::Lighting => (LIGHTING_VERT_GLSL, LIGHTING_FRAG_GLSL),
                _ => return None,
            };
            Some(ShaderDescriptor {
                name: Cow::Borrowed(kind.name()),
                vertex_source: Cow::Borrowed(vert),
                fragment_source: Cow::Borrowed(frag),
                compute_source: None,
            })
        }
        BackendKind::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wgsl_sources_have_both_entry_points() {
        for kind in ShaderKind::ALL {
            let desc = source(kind, BackendKind::WebGpu).unwrap();
            assert!(
                desc.vertex_source.contains("@vertex"),
                "{} lacks a vertex stage",
                kind.name()
            );
            assert!(
                desc.vertex_source.contains("@fragment"),
                "{} lacks a fragment stage",
                kind.name()
            );
        }
    }

    #[test]
    fn every_wgsl_vertex_shader_converts_clip_z() {
        // Skybox forces the far plane instead of remapping.
        for kind in ShaderKind::ALL {
            let desc = source(kind, BackendKind::WebGpu).unwrap();
            if kind == ShaderKind::Skybox {
                assert!(desc.vertex_source.contains("clip.z = clip.w"));
            } else {
                assert!(
                    desc.vertex_source.contains("p.z * 0.5 + p.w * 0.5"),
                    "{} lacks the z-clip conversion",
                    kind.name()
                );
            }
        }
    }

    #[test]
    fn glsl_sources_declare_es_300() {
        for kind in [
            ShaderKind::Mesh,
            ShaderKind::Color,
            ShaderKind::Textured,
            ShaderKind::Lighting,
        ] {
            let desc = source(kind, BackendKind::GlEs).unwrap();
            assert!(desc.vertex_source.starts_with("#version 300 es"));
            assert!(desc.fragment_source.starts_with("#version 300 es"));
        }
    }

    #[test]
    fn specialized_kinds_are_modern_only() {
        for kind in [
            ShaderKind::ScreenSpace,
            ShaderKind::Pbr,
            ShaderKind::PbrFallback,
            ShaderKind::Skybox,
            ShaderKind::Reflection,
        ] {
            assert!(source(kind, BackendKind::GlEs).is_none());
        }
    }
}
