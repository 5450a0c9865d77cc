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

//! The hierarchy of error types for the graphics subsystem.
//!
//! The backend surface itself never unwinds: creation failures are reported
//! by invalid handles and `init` by a boolean. These types carry the
//! diagnostics behind those signals (logging, the async readback path, and
//! internal helper results).

use std::fmt;

/// An error related to the compilation or linking of a shader program.
#[derive(Debug)]
pub enum ShaderError {
    /// The shader source failed to compile.
    CompilationFailed {
        /// A descriptive label for the shader.
        label: String,
        /// The compiler's info log.
        details: String,
    },
    /// The compiled stages failed to link into a program.
    LinkFailed {
        /// A descriptive label for the shader.
        label: String,
        /// The linker's info log.
        details: String,
    },
    /// The referenced shader does not exist (destroyed or never created).
    NotFound,
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::CompilationFailed { label, details } => {
                write!(f, "Shader compilation failed for '{label}': {details}")
            }
            ShaderError::LinkFailed { label, details } => {
                write!(f, "Shader link failed for '{label}': {details}")
            }
            ShaderError::NotFound => write!(f, "Shader not found"),
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation of a render or compute pipeline.
#[derive(Debug)]
pub enum PipelineError {
    /// The backend failed to build the pipeline state object.
    CreationFailed {
        /// A descriptive label for the pipeline, if available.
        label: Option<String>,
        /// Detailed error messages from the backend.
        details: String,
    },
    /// The requested primitive topology is not drawable on this backend
    /// without conversion by the mesh adapter.
    UnsupportedTopology(crate::gfx::api::PrimitiveTopology),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::CreationFailed { label, details } => {
                write!(
                    f,
                    "Pipeline creation failed for '{}': {}",
                    label.as_deref().unwrap_or("unnamed"),
                    details
                )
            }
            PipelineError::UnsupportedTopology(t) => {
                write!(f, "Primitive topology {t:?} is not drawable on this backend")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// A pipeline-specific error occurred.
    Pipeline(PipelineError),
    /// The referenced resource does not exist (destroyed or never created).
    NotFound,
    /// An access went past the end of the resource.
    OutOfBounds,
    /// Readback is not supported through this entry point on this backend.
    ReadbackUnsupported,
    /// An error originating from the underlying graphics API.
    Backend(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::Pipeline(err) => write!(f, "Pipeline resource error: {err}"),
            ResourceError::NotFound => write!(f, "Resource not found"),
            ResourceError::OutOfBounds => write!(f, "Resource access out of bounds"),
            ResourceError::ReadbackUnsupported => {
                write!(f, "Synchronous readback is not supported on this backend")
            }
            ResourceError::Backend(msg) => write!(f, "Backend resource error: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            ResourceError::Pipeline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

impl From<PipelineError> for ResourceError {
    fn from(err: PipelineError) -> Self {
        ResourceError::Pipeline(err)
    }
}

/// A high-level error covering backend lifecycle failures.
#[derive(Debug)]
pub enum RenderError {
    /// An operation was attempted before `init` succeeded.
    NotInitialized,
    /// Backend initialization failed (missing device, missing canvas,
    /// unsupported API).
    InitializationFailed(String),
    /// The swapchain texture could not be acquired this frame.
    SurfaceAcquisitionFailed(String),
    /// An error occurred while managing a GPU resource.
    Resource(ResourceError),
    /// The graphics device was lost.
    DeviceLost,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized => write!(f, "The backend is not initialized"),
            RenderError::InitializationFailed(msg) => {
                write!(f, "Backend initialization failed: {msg}")
            }
            RenderError::SurfaceAcquisitionFailed(msg) => {
                write!(f, "Failed to acquire the swapchain texture: {msg}")
            }
            RenderError::Resource(err) => write!(f, "Graphics resource operation failed: {err}"),
            RenderError::DeviceLost => write!(f, "The graphics device was lost"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Resource(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::Resource(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn shader_error_display() {
        let err = ShaderError::CompilationFailed {
            label: "mesh".to_string(),
            details: "syntax error at line 5".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Shader compilation failed for 'mesh': syntax error at line 5"
        );
    }

    #[test]
    fn resource_error_wraps_shader_error() {
        let res_err: ResourceError = ShaderError::NotFound.into();
        assert_eq!(format!("{res_err}"), "Shader resource error: Shader not found");
        assert!(res_err.source().is_some());
    }

    #[test]
    fn render_error_wraps_resource_error() {
        let render_err: RenderError = ResourceError::OutOfBounds.into();
        assert!(render_err.source().is_some());
        assert_eq!(
            format!("{render_err}"),
            "Graphics resource operation failed: Resource access out of bounds"
        );
    }
}
