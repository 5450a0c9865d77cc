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

//! The host-environment contract of the modern backend.
//!
//! The backend never creates the device: the host environment pre-creates
//! it (a browser shim configures the canvas context; the headless host
//! requests an adapter itself) and hands out the swapchain texture once
//! per frame. The texture is a frame-scoped borrow: the host keeps the
//! underlying presentation resource alive until the next frame begins.

use vitra_core::RenderError;

/// What the modern backend requires from its surroundings.
pub trait HostEnvironment {
    /// The pre-created device, or `None` when the host never installed
    /// one (backend `init` then fails). The returned clone shares the
    /// host's reference-counted device; the backend never drops the
    /// final reference.
    fn device(&self) -> Option<wgpu::Device>;

    /// The device's queue.
    fn queue(&self) -> Option<wgpu::Queue>;

    /// The color format every render pipeline targets and the swapchain
    /// is configured with.
    fn surface_format(&self) -> wgpu::TextureFormat;

    /// The swapchain texture for the coming frame, or `None` when the
    /// surface is unavailable (the backend skips the frame).
    fn acquire_swapchain_texture(&mut self) -> Option<wgpu::Texture>;

    /// Called after end-of-frame submission so the host can present.
    fn present(&mut self) {}
}

/// A host environment without a window: renders into an offscreen color
/// texture. Used by tests and offscreen tooling.
pub struct HeadlessHost {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    target: Option<wgpu::Texture>,
}

impl HeadlessHost {
    /// Requests an adapter and device and prepares an offscreen target of
    /// the given size.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let instance =
            wgpu::Instance::new(wgpu::InstanceDescriptor::new_without_display_handle());
        let adapter = pollster::block_on(
            instance.request_adapter(&wgpu::RequestAdapterOptions::default()),
        )
        .map_err(|e| RenderError::InitializationFailed(format!("no adapter: {e}")))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Vitra Headless Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::default(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            trace: wgpu::Trace::default(),
        }))
        .map_err(|e| RenderError::InitializationFailed(format!("no device: {e}")))?;

        device.on_uncaptured_error(std::sync::Arc::new(|e| {
            log::error!("WGPU uncaptured error: {e:?}");
        }));

        Ok(Self {
            device,
            queue,
            format: wgpu::TextureFormat::Bgra8Unorm,
            width: width.max(1),
            height: height.max(1),
            target: None,
        })
    }

    /// Changes the offscreen target size; the texture is recreated on the
    /// next acquisition.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 && (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.target = None;
        }
    }

    fn ensure_target(&mut self) -> wgpu::Texture {
        if let Some(target) = &self.target {
            return target.clone();
        }
        let target = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Headless Color Target"),
            size: wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        self.target = Some(target.clone());
        target
    }
}

impl HostEnvironment for HeadlessHost {
    fn device(&self) -> Option<wgpu::Device> {
        Some(self.device.clone())
    }

    fn queue(&self) -> Option<wgpu::Queue> {
        Some(self.queue.clone())
    }

    fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    fn acquire_swapchain_texture(&mut self) -> Option<wgpu::Texture> {
        Some(self.ensure_target())
    }
}
