use anyhow::{Context, Result};

/// Headless device and queue for offscreen bar rendering.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    pub fn new() -> Result<Self> {
        pollster::block_on(Self::init_async())
    }

    async fn init_async() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        // Hardware first, then a software adapter.
        let adapter = match request_adapter(&instance, false).await {
            Some(adapter) => adapter,
            None => {
                log::warn!("No hardware GPU adapter found, trying a fallback adapter");
                request_adapter(&instance, true)
                    .await
                    .context("No GPU or fallback adapter available for headless rendering")?
            }
        };

        let info = adapter.get_info();
        if info.device_type == wgpu::DeviceType::Cpu {
            log::warn!("Rendering on a CPU adapter: {}", describe_adapter(&info));
        } else {
            log::info!("Rendering on {}", describe_adapter(&info));
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("bandviz_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    ..Default::default()
                },
                None,
            )
            .await
            .with_context(|| format!("Failed to open device on {}", info.name))?;

        Ok(Self { device, queue })
    }
}

async fn request_adapter(instance: &wgpu::Instance, fallback: bool) -> Option<wgpu::Adapter> {
    instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: fallback,
        })
        .await
}

fn describe_adapter(info: &wgpu::AdapterInfo) -> String {
    let name = if info.name.is_empty() { "unnamed adapter" } else { info.name.as_str() };
    format!("{} ({:?}, {:?})", name, info.device_type, info.backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter_info(name: &str, device_type: wgpu::DeviceType) -> wgpu::AdapterInfo {
        wgpu::AdapterInfo {
            name: name.to_string(),
            vendor: 0,
            device: 0,
            device_type,
            driver: String::new(),
            driver_info: String::new(),
            backend: wgpu::Backend::Vulkan,
        }
    }

    #[test]
    fn describes_named_adapter() {
        let info = adapter_info("llvmpipe", wgpu::DeviceType::Cpu);
        assert_eq!(describe_adapter(&info), "llvmpipe (Cpu, Vulkan)");
    }

    #[test]
    fn describes_unnamed_adapter() {
        let info = adapter_info("", wgpu::DeviceType::DiscreteGpu);
        assert_eq!(describe_adapter(&info), "unnamed adapter (DiscreteGpu, Vulkan)");
    }
}
