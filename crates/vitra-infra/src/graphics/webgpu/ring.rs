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

//! The uniform ring: one buffer backing many draws through dynamic
//! offsets.
//!
//! Each draw's uniform block is written at the current offset, the offset
//! is recorded as that draw's dynamic offset, and the cursor advances by
//! one 256-byte slot. The cursor resets at frame start. When a frame
//! outgrows the ring, a larger buffer replaces it (the generation bump
//! tells shaders to rebuild their bind groups lazily; draws already
//! recorded keep the old buffer alive through their bind groups). Past
//! the hard cap the draw falls back to its shader's own uniform buffer.

/// Bytes per ring slot; also the dynamic-offset alignment.
pub(crate) const RING_SLOT_BYTES: u64 = 256;

/// Initial ring capacity: 256 slots.
pub(crate) const RING_INITIAL_BYTES: u64 = 256 * RING_SLOT_BYTES;

/// Growth stops here; later draws in the frame use the fallback buffer.
pub(crate) const RING_MAX_BYTES: u64 = 4 * 1024 * 1024;

/// Where one draw's uniforms live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RingSlot {
    /// A dynamic offset into the ring buffer.
    Offset(u64),
    /// The shader's dedicated uniform buffer at offset zero.
    Fallback,
}

/// The CPU-side cursor, separated from the GPU buffer so the offset
/// arithmetic is testable on its own.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RingAllocator {
    offset: u64,
    capacity: u64,
}

impl RingAllocator {
    pub(crate) fn new(capacity: u64) -> Self {
        Self {
            offset: 0,
            capacity,
        }
    }

    /// Takes the next slot, or `None` when the ring is exhausted.
    pub(crate) fn allocate(&mut self) -> Option<u64> {
        if self.offset + RING_SLOT_BYTES <= self.capacity {
            let slot = self.offset;
            self.offset += RING_SLOT_BYTES;
            Some(slot)
        } else {
            None
        }
    }

    /// Rewinds the cursor at frame start.
    pub(crate) fn reset(&mut self) {
        self.offset = 0;
    }

    /// Switches to a larger capacity with a fresh cursor.
    pub(crate) fn grow(&mut self, capacity: u64) {
        self.capacity = capacity;
        self.offset = 0;
    }

    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    pub(crate) fn capacity(&self) -> u64 {
        self.capacity
    }
}

/// The ring buffer itself.
#[derive(Debug)]
pub(crate) struct UniformRing {
    buffer: wgpu::Buffer,
    allocator: RingAllocator,
    generation: u64,
    overflow_warned: bool,
}

impl UniformRing {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        Self {
            buffer: create_ring_buffer(device, RING_INITIAL_BYTES),
            allocator: RingAllocator::new(RING_INITIAL_BYTES),
            generation: 0,
            overflow_warned: false,
        }
    }

    pub(crate) fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Bumps whenever the underlying buffer is replaced; bind groups
    /// referencing the ring compare against it.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// The current frame cursor.
    pub(crate) fn offset(&self) -> u64 {
        self.allocator.offset()
    }

    /// Frame-start reset.
    pub(crate) fn reset(&mut self) {
        self.allocator.reset();
        self.overflow_warned = false;
    }

    /// Reserves the next slot, growing the ring if the frame outran it.
    pub(crate) fn allocate(&mut self, device: &wgpu::Device) -> RingSlot {
        if let Some(offset) = self.allocator.allocate() {
            return RingSlot::Offset(offset);
        }

        let grown = self.allocator.capacity() * 2;
        if grown <= RING_MAX_BYTES {
            log::debug!(
                "UniformRing: frame outgrew {} bytes, growing to {grown}",
                self.allocator.capacity()
            );
            self.buffer = create_ring_buffer(device, grown);
            self.allocator.grow(grown);
            self.generation += 1;
            if let Some(offset) = self.allocator.allocate() {
                return RingSlot::Offset(offset);
            }
        }

        if !self.overflow_warned {
            log::warn!(
                "UniformRing: capacity cap reached; remaining draws this frame use per-shader fallback buffers"
            );
            self.overflow_warned = true;
        }
        RingSlot::Fallback
    }

    /// Writes one draw's uniform block at `offset`.
    pub(crate) fn write(&self, queue: &wgpu::Queue, offset: u64, data: &[u8]) {
        queue.write_buffer(&self.buffer, offset, data);
    }
}

fn create_ring_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Uniform Ring"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_advances_one_slot_per_draw() {
        let mut allocator = RingAllocator::new(RING_INITIAL_BYTES);
        for n in 0..300u64 {
            let slot = allocator.allocate();
            if n < 256 {
                assert_eq!(slot, Some(n * RING_SLOT_BYTES));
            } else {
                assert_eq!(slot, None);
            }
            // After N draws the cursor sits at min(N, 256) * 256.
            assert_eq!(allocator.offset(), (n + 1).min(256) * RING_SLOT_BYTES);
        }
    }

    #[test]
    fn reset_rewinds_to_zero() {
        let mut allocator = RingAllocator::new(RING_INITIAL_BYTES);
        allocator.allocate();
        allocator.allocate();
        assert_eq!(allocator.offset(), 2 * RING_SLOT_BYTES);
        allocator.reset();
        assert_eq!(allocator.offset(), 0);
        assert_eq!(allocator.allocate(), Some(0));
    }

    #[test]
    fn grow_restarts_the_cursor() {
        let mut allocator = RingAllocator::new(2 * RING_SLOT_BYTES);
        assert!(allocator.allocate().is_some());
        assert!(allocator.allocate().is_some());
        assert_eq!(allocator.allocate(), None);
        allocator.grow(4 * RING_SLOT_BYTES);
        assert_eq!(allocator.allocate(), Some(0));
        assert_eq!(allocator.capacity(), 4 * RING_SLOT_BYTES);
    }
}
