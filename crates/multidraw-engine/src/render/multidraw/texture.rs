use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

/// Format of the layer texture; one RGBA8 texel per layer.
pub const LAYER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Solid color for each layer of the array texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerColors {
    texels: Vec<[u8; 4]>,
}

impl LayerColors {
    /// Random opaque colors, each RGB channel drawn from `0..255`.
    pub fn random<R: Rng + ?Sized>(layers: u32, rng: &mut R) -> Self {
        let texels = (0..layers)
            .map(|_| {
                [
                    rng.random_range(0..255),
                    rng.random_range(0..255),
                    rng.random_range(0..255),
                    u8::MAX,
                ]
            })
            .collect();
        Self { texels }
    }

    /// Deterministic colors for a given seed.
    pub fn seeded(layers: u32, seed: u64) -> Self {
        Self::random(layers, &mut StdRng::seed_from_u64(seed))
    }

    pub fn from_texels(texels: Vec<[u8; 4]>) -> Self {
        Self { texels }
    }

    pub fn layer_count(&self) -> u32 {
        self.texels.len() as u32
    }

    pub fn texels(&self) -> &[[u8; 4]] {
        &self.texels
    }

    fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }
}

/// A 1x1 texel array texture with one layer per color.
pub struct LayerTexture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl LayerTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, colors: &LayerColors) -> Result<Self> {
        let layers = colors.layer_count();
        anyhow::ensure!(layers > 0, "array texture needs at least one layer");
        let max_layers = device.limits().max_texture_array_layers;
        anyhow::ensure!(
            layers <= max_layers,
            "{layers} layers exceed the device limit of {max_layers}"
        );

        let size = wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: layers,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("multidraw layer texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LAYER_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            colors.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            size,
        );

        // A single-layer texture would default to a plain D2 view.
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("multidraw layer view"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("multidraw layer sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        log::debug!("uploaded {layers} texture layers");
        Ok(Self {
            _texture: texture,
            view,
            sampler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_texel_per_layer() {
        assert_eq!(LayerColors::seeded(100, 1).layer_count(), 100);
        assert_eq!(LayerColors::seeded(100, 1).as_bytes().len(), 400);
    }

    #[test]
    fn channels_stay_below_255_and_alpha_is_opaque() {
        let colors = LayerColors::seeded(1000, 7);
        for t in colors.texels() {
            assert!(t[0] < 255 && t[1] < 255 && t[2] < 255, "{t:?}");
            assert_eq!(t[3], 255);
        }
    }

    #[test]
    fn same_seed_same_colors() {
        assert_eq!(LayerColors::seeded(100, 42), LayerColors::seeded(100, 42));
    }

    #[test]
    fn different_seeds_differ() {
        assert_ne!(LayerColors::seeded(100, 1), LayerColors::seeded(100, 2));
    }

    #[test]
    fn zero_layers_is_empty() {
        assert_eq!(LayerColors::seeded(0, 1).layer_count(), 0);
    }

    #[test]
    fn texels_are_laid_out_layer_major() {
        let colors = LayerColors::from_texels(vec![[1, 2, 3, 255], [4, 5, 6, 255]]);
        assert_eq!(colors.as_bytes(), &[1, 2, 3, 255, 4, 5, 6, 255]);
    }
}
