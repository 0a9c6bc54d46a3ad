//! Growable GPU buffers.
//!
//! Buffers double when data exceeds capacity and never shrink, since wgpu
//! buffers cannot be resized in place.

use std::marker::PhantomData;

/// Smallest allocation in bytes.
const MIN_CAPACITY: usize = 64;

/// Capacity to allocate so `needed` bytes fit, or `None` if `current`
/// already suffices.
fn grown_capacity(current: usize, needed: usize) -> Option<usize> {
    (needed > current).then(|| (needed * 2).max(current + 1024))
}

/// A GPU buffer of `T` items that grows on demand.
pub struct TypedBuffer<T> {
    buffer: wgpu::Buffer,
    capacity: usize,
    count: usize,
    usage: wgpu::BufferUsages,
    label: String,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> TypedBuffer<T> {
    /// Empty buffer with room for `capacity` items.
    #[must_use]
    pub fn with_capacity(
        device: &wgpu::Device,
        label: &str,
        capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let bytes = (capacity * size_of::<T>()).max(MIN_CAPACITY);
        Self {
            buffer: allocate(device, label, bytes, usage),
            capacity: bytes,
            count: 0,
            usage,
            label: label.to_owned(),
            _marker: PhantomData,
        }
    }

    /// Upload `data`, reallocating if it does not fit.
    ///
    /// Returns `true` if the buffer was reallocated (bind groups referring
    /// to it must be recreated).
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[T],
    ) -> bool {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let grown = grown_capacity(self.capacity, bytes.len());
        if let Some(capacity) = grown {
            log::debug!(
                "growing buffer '{}' from {} to {} bytes",
                self.label,
                self.capacity,
                capacity
            );
            self.buffer = allocate(device, &self.label, capacity, self.usage);
            self.capacity = capacity;
        }

        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
        self.count = data.len();
        grown.is_some()
    }

    /// The underlying buffer.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Items written by the last [`Self::write`].
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the last write was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Allocated capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn allocate(
    device: &wgpu::Device,
    label: &str,
    bytes: usize,
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: bytes as u64,
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_without_growth() {
        assert_eq!(grown_capacity(1024, 1024), None);
        assert_eq!(grown_capacity(1024, 0), None);
    }

    #[test]
    fn grows_to_double_or_one_kib_more() {
        assert_eq!(grown_capacity(64, 100), Some(1088));
        assert_eq!(grown_capacity(1024, 4000), Some(8000));
    }
}
