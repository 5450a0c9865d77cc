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

//! The modern backend: the graphics contract over an explicit-submission
//! API (WebGPU via `wgpu`).

mod backend;
mod conversions;
mod host;
mod mipgen;
mod pbr;
mod pipeline;
mod readback;
mod reflect;
mod ring;
mod skybox;

pub use backend::WebGpuBackend;
pub use host::{HeadlessHost, HostEnvironment};
