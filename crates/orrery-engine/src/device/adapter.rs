use crate::error::{RenderError, Result};

use super::GpuInit;

/// Lowercase name fragments of known software rasterizers.
const SOFTWARE_RASTERIZERS: [&str; 3] = ["microsoft basic render driver", "llvmpipe", "swiftshader"];

/// True for CPU adapters and known software rasterizers.
pub fn is_software_adapter(info: &wgpu::AdapterInfo) -> bool {
    is_software(&info.name, info.device_type)
}

fn is_software(name: &str, device_type: wgpu::DeviceType) -> bool {
    if device_type == wgpu::DeviceType::Cpu {
        return true;
    }
    let name = name.to_ascii_lowercase();
    SOFTWARE_RASTERIZERS.iter().any(|s| name.contains(s))
}

/// Picks an adapter, preferring hardware over software.
///
/// `preference` is tried first, then low power. A software adapter is kept
/// as a last resort.
pub async fn select_adapter(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
    preference: wgpu::PowerPreference,
) -> Result<wgpu::Adapter> {
    let mut software = None;

    for power_preference in [preference, wgpu::PowerPreference::LowPower] {
        let options = wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: surface,
            force_fallback_adapter: false,
        };
        match instance.request_adapter(&options).await {
            Ok(adapter) if !is_software_adapter(&adapter.get_info()) => return Ok(adapter),
            Ok(adapter) => {
                log::debug!("skipping software adapter {}", adapter.get_info().name);
                software.get_or_insert(adapter);
            }
            Err(e) => log::debug!("adapter request ({power_preference:?}) failed: {e}"),
        }
    }

    match software {
        Some(adapter) => {
            log::warn!(
                "no hardware adapter found; using software adapter {}",
                adapter.get_info().name
            );
            Ok(adapter)
        }
        None => Err(RenderError::NoAdapter(
            "no adapter compatible with the surface".into(),
        )),
    }
}

/// Creates the logical device with the configured features and limits.
pub async fn request_device(
    adapter: &wgpu::Adapter,
    init: &GpuInit,
) -> Result<(wgpu::Device, wgpu::Queue)> {
    let required_limits = init
        .required_limits
        .clone()
        .unwrap_or_else(|| default_limits(adapter));

    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("orrery device"),
            required_features: init.required_features,
            required_limits,
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .map_err(|e| RenderError::Initialization(format!("failed to create device: {e}")))
}

fn default_limits(adapter: &wgpu::Adapter) -> wgpu::Limits {
    let base = if adapter.get_downlevel_capabilities().is_webgpu_compliant() {
        wgpu::Limits::default()
    } else {
        wgpu::Limits::downlevel_defaults()
    };
    base.using_resolution(adapter.limits())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn software_adapters_detected() {
        use wgpu::DeviceType::{Cpu, DiscreteGpu, Other};
        assert!(is_software("llvmpipe (LLVM 17.0.6, 256 bits)", Other));
        assert!(is_software("Microsoft Basic Render Driver", Other));
        assert!(is_software("Google SwiftShader", Other));
        assert!(is_software("anything", Cpu));
        assert!(!is_software("NVIDIA GeForce RTX 3060", DiscreteGpu));
    }
}
