use winit::dpi::PhysicalSize;

use super::{GpuInit, SurfaceErrorAction};

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }

    Some(caps.formats[0])
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Render-attachment usage, plus copy-destination when the surface allows
/// the composition texture to be copied straight into it.
pub(crate) fn choose_usage(caps: &wgpu::SurfaceCapabilities) -> wgpu::TextureUsages {
    let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
    if caps.usages.contains(wgpu::TextureUsages::COPY_DST) {
        usage |= wgpu::TextureUsages::COPY_DST;
    }
    usage
}

pub(crate) fn build_config(
    caps: &wgpu::SurfaceCapabilities,
    init: &GpuInit,
    format: wgpu::TextureFormat,
    size: PhysicalSize<u32>,
) -> wgpu::SurfaceConfiguration {
    wgpu::SurfaceConfiguration {
        usage: choose_usage(caps),
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: init.present_mode,
        alpha_mode: choose_alpha_mode(caps, init.alpha_mode),
        view_formats: vec![],
        desired_maximum_frame_latency: init.desired_maximum_frame_latency,
    }
}

pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;

    // wgpu rejects a 0x0 configuration; keep the old one until a real size arrives.
    if new_size.width == 0 || new_size.height == 0 {
        log::debug!("surface resize to zero area deferred");
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;

    surface.configure(device, config);
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.width > 0 && size.height > 0 {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: Vec<wgpu::TextureFormat>, usages: wgpu::TextureUsages) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            present_modes: vec![wgpu::PresentMode::Fifo],
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            usages,
        }
    }

    #[test]
    fn srgb_format_preferred() {
        let c = caps(
            vec![wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Bgra8UnormSrgb],
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        assert_eq!(choose_surface_format(&c, true), Some(wgpu::TextureFormat::Bgra8UnormSrgb));
        assert_eq!(choose_surface_format(&c, false), Some(wgpu::TextureFormat::Bgra8Unorm));
        assert_eq!(choose_surface_format(&caps(vec![], wgpu::TextureUsages::empty()), true), None);
    }

    #[test]
    fn copy_dst_only_when_offered() {
        let with = caps(
            vec![wgpu::TextureFormat::Bgra8UnormSrgb],
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
        );
        let without = caps(
            vec![wgpu::TextureFormat::Bgra8UnormSrgb],
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        assert!(choose_usage(&with).contains(wgpu::TextureUsages::COPY_DST));
        assert!(!choose_usage(&without).contains(wgpu::TextureUsages::COPY_DST));
    }

    #[test]
    fn config_is_fifo_double_buffered() {
        let c = caps(
            vec![wgpu::TextureFormat::Bgra8UnormSrgb],
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let config = build_config(
            &c,
            &GpuInit::default(),
            wgpu::TextureFormat::Bgra8UnormSrgb,
            PhysicalSize::new(0, 720),
        );
        assert_eq!(config.present_mode, wgpu::PresentMode::Fifo);
        assert_eq!(config.desired_maximum_frame_latency, 2);
        assert_eq!(config.width, 1);
        assert_eq!(config.alpha_mode, wgpu::CompositeAlphaMode::Opaque);
    }
}
