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

//! Shader and compute pipeline descriptors.

use std::borrow::Cow;

/// Identifies a concrete backend implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendKind {
    /// The legacy immediate-mode backend (GL ES 3.0 semantics).
    GlEs,
    /// The modern explicit-submission backend (WebGPU semantics).
    WebGpu,
    /// An unknown or test backend.
    #[default]
    Unknown,
}

/// The default shader programs both backends know how to provision.
///
/// Each kind maps to one embedded vertex + fragment source pair per backend
/// shading language; kinds without a legacy-backend source are provisioned
/// on the modern backend only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Flat vertex-colored mesh shading (160-byte uniform block).
    Mesh,
    /// Uniform-colored shading with a separate tint (176-byte block).
    Color,
    /// Textured shading.
    Textured,
    /// Screen-space textured shading (2D mode).
    ScreenSpace,
    /// Multi-light per-fragment lighting.
    Lighting,
    /// Physically-based shading with image-based lighting.
    Pbr,
    /// Physically-based shading with three analytical lights, no textures.
    PbrFallback,
    /// Equirectangular skybox.
    Skybox,
    /// Environment reflection.
    Reflection,
}

impl ShaderKind {
    /// Every default shader kind, in a stable order.
    pub const ALL: [ShaderKind; 9] = [
        ShaderKind::Mesh,
        ShaderKind::Color,
        ShaderKind::Textured,
        ShaderKind::ScreenSpace,
        ShaderKind::Lighting,
        ShaderKind::Pbr,
        ShaderKind::PbrFallback,
        ShaderKind::Skybox,
        ShaderKind::Reflection,
    ];

    /// Stable index of this kind within [`ShaderKind::ALL`].
    pub const fn index(&self) -> usize {
        match self {
            ShaderKind::Mesh => 0,
            ShaderKind::Color => 1,
            ShaderKind::Textured => 2,
            ShaderKind::ScreenSpace => 3,
            ShaderKind::Lighting => 4,
            ShaderKind::Pbr => 5,
            ShaderKind::PbrFallback => 6,
            ShaderKind::Skybox => 7,
            ShaderKind::Reflection => 8,
        }
    }

    /// A debug name for labels and logs.
    pub const fn name(&self) -> &'static str {
        match self {
            ShaderKind::Mesh => "mesh",
            ShaderKind::Color => "color",
            ShaderKind::Textured => "textured",
            ShaderKind::ScreenSpace => "screen_space",
            ShaderKind::Lighting => "lighting",
            ShaderKind::Pbr => "pbr",
            ShaderKind::PbrFallback => "pbr_fallback",
            ShaderKind::Skybox => "skybox",
            ShaderKind::Reflection => "reflection",
        }
    }
}

/// A descriptor used to create a shader program.
///
/// Sources are strings in the backend's shading language: WGSL on the
/// modern backend, GLSL ES 3.00 (`#version 300 es`) on the legacy backend.
#[derive(Debug, Clone)]
pub struct ShaderDescriptor<'a> {
    /// A debug name for diagnostics.
    pub name: Cow<'a, str>,
    /// Vertex stage source.
    pub vertex_source: Cow<'a, str>,
    /// Fragment stage source.
    pub fragment_source: Cow<'a, str>,
    /// Optional compute stage source (compute-capable backends only).
    pub compute_source: Option<Cow<'a, str>>,
}

impl<'a> ShaderDescriptor<'a> {
    /// A vertex + fragment program.
    pub fn new(name: &'a str, vertex_source: &'a str, fragment_source: &'a str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            vertex_source: Cow::Borrowed(vertex_source),
            fragment_source: Cow::Borrowed(fragment_source),
            compute_source: None,
        }
    }
}

/// A descriptor used to create a compute pipeline.
#[derive(Debug, Clone)]
pub struct ComputePipelineDescriptor<'a> {
    /// A debug name for diagnostics.
    pub name: Cow<'a, str>,
    /// Compute stage source.
    pub source: Cow<'a, str>,
    /// Entry point function name.
    pub entry_point: Cow<'a, str>,
}
