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

//! Asynchronous buffer readback.
//!
//! `map_async` completes from the device's callback pump, so the future
//! resolves once the device has been polled past the copy's submission.
//! Frame loops poll every frame; tests use
//! [`WebGpuBackend::poll_device_blocking`](super::WebGpuBackend::poll_device_blocking)
//! before awaiting.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};
use vitra_core::ResourceError;

struct ReadbackState {
    result: Mutex<Option<Result<Vec<u8>, ResourceError>>>,
    waker: Mutex<Option<Waker>>,
}

/// A waker-based future over a `map_async` completion.
pub(crate) struct ReadbackOperation {
    state: Arc<ReadbackState>,
}

impl Future for ReadbackOperation {
    type Output = Result<Vec<u8>, ResourceError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut result = match self.state.result.lock() {
            Ok(guard) => guard,
            Err(_) => return Poll::Ready(Err(ResourceError::Backend("poisoned readback state".into()))),
        };
        if let Some(res) = result.take() {
            Poll::Ready(res)
        } else if let Ok(mut waker) = self.state.waker.lock() {
            *waker = Some(cx.waker().clone());
            Poll::Pending
        } else {
            Poll::Ready(Err(ResourceError::Backend("poisoned readback state".into())))
        }
    }
}

/// Copies `size` bytes of `buffer` into a staging buffer, submits the
/// copy, and returns a future that resolves with the bytes once the
/// mapping callback fires.
pub(crate) fn start_readback(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    buffer: &wgpu::Buffer,
    offset: u64,
    size: u64,
) -> ReadbackOperation {
    let state = Arc::new(ReadbackState {
        result: Mutex::new(None),
        waker: Mutex::new(None),
    });

    if offset + size > buffer.size() {
        if let Ok(mut result) = state.result.lock() {
            *result = Some(Err(ResourceError::OutOfBounds));
        }
        return ReadbackOperation { state };
    }

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Staging"),
        size,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Readback Copy"),
    });
    encoder.copy_buffer_to_buffer(buffer, offset, &staging, 0, size);
    queue.submit(std::iter::once(encoder.finish()));

    let callback_state = Arc::clone(&state);
    let callback_staging = staging.clone();
    staging.slice(..).map_async(wgpu::MapMode::Read, move |map_result| {
        let outcome = match map_result {
            Ok(()) => {
                let bytes = callback_staging.slice(..).get_mapped_range().to_vec();
                callback_staging.unmap();
                Ok(bytes)
            }
            Err(e) => Err(ResourceError::Backend(format!("map_async failed: {e:?}"))),
        };
        if let Ok(mut result) = callback_state.result.lock() {
            *result = Some(outcome);
        }
        if let Ok(mut waker) = callback_state.waker.lock() {
            if let Some(waker) = waker.take() {
                waker.wake();
            }
        }
    });

    ReadbackOperation { state }
}
