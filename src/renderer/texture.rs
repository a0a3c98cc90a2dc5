//! Obstacle textures
//!
//! Textures arrive asynchronously after the game has started. Obstacles only
//! hold a `TextureSlot`; the renderer looks the slot up every frame and falls
//! back to a plain white texture while it is still empty.

use anyhow::Context;
use image::RgbaImage;

use crate::sim::TextureSlot;

/// Fixed-size table of lazily filled slots
#[derive(Debug)]
pub struct SlotTable<T> {
    slots: Vec<Option<T>>,
}

impl<T> SlotTable<T> {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| None).collect(),
        }
    }

    /// Fill a slot; out-of-range slots are ignored
    pub fn install(&mut self, slot: TextureSlot, value: T) {
        if let Some(entry) = self.slots.get_mut(slot.0) {
            *entry = Some(value);
        } else {
            log::warn!("Ignoring texture for unknown slot {:?}", slot);
        }
    }

    pub fn get(&self, slot: TextureSlot) -> Option<&T> {
        self.slots.get(slot.0).and_then(Option::as_ref)
    }

    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Decode an image file into RGBA8 pixels
pub fn decode(bytes: &[u8], label: &str) -> anyhow::Result<RgbaImage> {
    let img = image::load_from_memory(bytes).with_context(|| format!("decoding {}", label))?;
    Ok(img.to_rgba8())
}

/// Layout shared by every material texture bind group
pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("texture_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

pub fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("texture_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

/// Upload pixels and wrap them in a bind group for `layout`
pub fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    img: &RgbaImage,
    label: &str,
) -> wgpu::BindGroup {
    let (width, height) = img.dimensions();
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        img.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

/// 1x1 white image used until a slot is loaded (and for the player)
pub fn white_pixel() -> RgbaImage {
    RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_png(img: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn test_slots_start_empty_and_fill() {
        let mut table: SlotTable<&str> = SlotTable::new(5);
        assert_eq!(table.loaded_count(), 0);
        assert!(table.get(TextureSlot(2)).is_none());

        table.install(TextureSlot(2), "crate");
        assert_eq!(table.get(TextureSlot(2)), Some(&"crate"));
        assert_eq!(table.loaded_count(), 1);
    }

    #[test]
    fn test_out_of_range_slot() {
        let mut table: SlotTable<u32> = SlotTable::new(5);
        table.install(TextureSlot(9), 1);
        assert_eq!(table.loaded_count(), 0);
        assert!(table.get(TextureSlot(9)).is_none());
    }

    #[test]
    fn test_decode_png() {
        let mut img = RgbaImage::new(2, 3);
        img.put_pixel(1, 2, image::Rgba([10, 20, 30, 255]));
        let decoded = decode(&encode_png(&img), "test.png").expect("decodes");
        assert_eq!(decoded.dimensions(), (2, 3));
        assert_eq!(decoded.get_pixel(1, 2).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_garbage_names_asset() {
        let err = decode(b"not a png", "obstacle3.png").expect_err("garbage");
        assert!(err.to_string().contains("obstacle3.png"));
    }

    #[test]
    fn test_white_pixel() {
        let img = white_pixel();
        assert_eq!(img.dimensions(), (1, 1));
        assert_eq!(img.get_pixel(0, 0).0, [255; 4]);
    }
}
