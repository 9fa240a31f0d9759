use std::path::{Path, PathBuf};

use crate::error::{RenderError, Result};

/// Decoded RGBA8 image.
pub struct ImageData {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub fn load_rgba(path: &Path) -> Result<ImageData> {
    let img = image::open(path)
        .map_err(|source| RenderError::TextureLoad {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(ImageData {
        path: path.to_path_buf(),
        width,
        height,
        pixels: img.into_raw(),
    })
}

/// Checks that every layer shares the first layer's size.
pub fn check_uniform_size(layers: &[ImageData]) -> Result<(u32, u32)> {
    let Some(first) = layers.first() else {
        return Err(RenderError::Initialization("texture with no layers".into()));
    };
    for layer in layers {
        if layer.width != first.width || layer.height != first.height {
            return Err(RenderError::TextureShape {
                path: layer.path.clone(),
                reason: format!(
                    "{}x{} does not match {}x{} of {}",
                    layer.width,
                    layer.height,
                    first.width,
                    first.height,
                    first.path.display()
                ),
            });
        }
    }
    Ok((first.width, first.height))
}

/// A sampled texture and its view.
pub struct Texture {
    pub view: wgpu::TextureView,
    pub texture: wgpu::Texture,
}

impl Texture {
    fn from_layers(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        format: wgpu::TextureFormat,
        dimension: wgpu::TextureViewDimension,
        layers: &[ImageData],
    ) -> Result<Self> {
        let (width, height) = check_uniform_size(layers)?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: layers.len() as u32,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, data) in layers.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                &data.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(dimension),
            ..Default::default()
        });

        Ok(Self { view, texture })
    }

    /// Diffuse array; layer index = instance texture index.
    pub fn diffuse_array(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        paths: &[PathBuf],
    ) -> Result<Self> {
        let layers = paths.iter().map(|p| load_rgba(p)).collect::<Result<Vec<_>>>()?;
        Self::from_layers(
            device,
            queue,
            "orrery diffuse array",
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureViewDimension::D2Array,
            &layers,
        )
    }

    /// Tangent-space normal map (linear data).
    pub fn normal_map(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Result<Self> {
        let layer = load_rgba(path)?;
        Self::from_layers(
            device,
            queue,
            "orrery normal map",
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureViewDimension::D2,
            std::slice::from_ref(&layer),
        )
    }

    /// Cube map from six faces in +x, -x, +y, -y, +z, -z order.
    pub fn cube_map(device: &wgpu::Device, queue: &wgpu::Queue, faces: &[PathBuf; 6]) -> Result<Self> {
        let layers = faces.iter().map(|p| load_rgba(p)).collect::<Result<Vec<_>>>()?;
        let (width, height) = check_uniform_size(&layers)?;
        if width != height {
            return Err(RenderError::TextureShape {
                path: layers[0].path.clone(),
                reason: format!("cube face must be square, got {width}x{height}"),
            });
        }
        Self::from_layers(
            device,
            queue,
            "orrery skybox",
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureViewDimension::Cube,
            &layers,
        )
    }
}

/// Asset file names under `<assets>/textures`.
pub struct TextureSet {
    pub diffuse: [PathBuf; 2],
    pub normal: PathBuf,
    pub skybox: [PathBuf; 6],
}

impl TextureSet {
    pub fn in_dir(dir: &Path) -> Self {
        let face = |n: &str| dir.join(format!("skybox_{n}.png"));
        Self {
            diffuse: [dir.join("cat.png"), dir.join("textile.png")],
            normal: dir.join("cube_normal.png"),
            skybox: [face("px"), face("nx"), face("py"), face("ny"), face("pz"), face("nz")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture_dir() -> PathBuf {
        PathBuf::from(crate::DEFAULT_ASSET_DIR).join("textures")
    }

    fn image(name: &str, width: u32, height: u32) -> ImageData {
        ImageData {
            path: PathBuf::from(name),
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    #[test]
    fn mismatched_layers_are_rejected() {
        let err = check_uniform_size(&[image("a.png", 8, 8), image("b.png", 8, 4)]).unwrap_err();
        assert!(err.to_string().contains("b.png"));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_rgba(Path::new("/nonexistent/nothing.png")).err().unwrap();
        assert!(matches!(err, RenderError::TextureLoad { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn bundled_textures_decode_with_consistent_sizes() {
        let set = TextureSet::in_dir(&texture_dir());
        let diffuse: Vec<_> = set.diffuse.iter().map(|p| load_rgba(p).unwrap()).collect();
        check_uniform_size(&diffuse).unwrap();
        load_rgba(&set.normal).unwrap();

        let faces: Vec<_> = set.skybox.iter().map(|p| load_rgba(p).unwrap()).collect();
        let (w, h) = check_uniform_size(&faces).unwrap();
        assert_eq!(w, h);
    }
}
