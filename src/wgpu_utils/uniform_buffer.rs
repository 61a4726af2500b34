//! Typed uniform buffers
//!
//! Every scene node, material and the frame globals own one of these. Most
//! of them hold the same bytes frame after frame, so uploads are skipped
//! unless the content actually changed.

use std::marker::PhantomData;

use wgpu::util::DeviceExt;

/// Last bytes written to a buffer
#[derive(Debug, Default, Clone)]
struct UploadCache {
    bytes: Vec<u8>,
}

impl UploadCache {
    /// Records `bytes`; returns false when they match the previous upload
    fn replace(&mut self, bytes: &[u8]) -> bool {
        if self.bytes == bytes {
            return false;
        }
        self.bytes.clear();
        self.bytes.extend_from_slice(bytes);
        true
    }
}

pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    cache: UploadCache,
    content: PhantomData<Content>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    /// Short type name used in buffer labels, e.g. `GlobalUniform`
    fn label() -> String {
        let full = std::any::type_name::<Content>();
        let short = full.rsplit("::").next().unwrap_or(full);
        format!("Uniform {}", short)
    }

    /// Zero-initialised buffer
    pub fn new(device: &wgpu::Device) -> Self {
        Self::with_content(device, &bytemuck::Zeroable::zeroed())
    }

    /// Buffer holding `content` from the start
    pub fn with_content(device: &wgpu::Device, content: &Content) -> Self {
        let bytes = bytemuck::bytes_of(content);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&Self::label()),
            contents: bytes,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let mut cache = UploadCache::default();
        cache.replace(bytes);

        Self {
            buffer,
            cache,
            content: PhantomData,
        }
    }

    /// Writes `content` if it differs from the last upload
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) {
        let bytes = bytemuck::bytes_of(&content);
        if self.cache.replace(bytes) {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }

    /// Frees the GPU memory now rather than when the buffer is dropped
    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_content_is_not_uploaded() {
        let mut cache = UploadCache::default();
        assert!(cache.replace(&[1, 2, 3, 4]));
        assert!(!cache.replace(&[1, 2, 3, 4]));
        assert!(cache.replace(&[1, 2, 3, 5]));
        assert!(!cache.replace(&[1, 2, 3, 5]));
    }

    #[test]
    fn test_label_uses_short_type_name() {
        assert_eq!(UniformBuffer::<[f32; 4]>::label(), "Uniform [f32; 4]");
        assert_eq!(
            UniformBuffer::<crate::gfx::resources::GlobalUniform>::label(),
            "Uniform GlobalUniform"
        );
    }
}
