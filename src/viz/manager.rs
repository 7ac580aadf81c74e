use std::sync::Arc;

use vulkano::{
    device::{
        physical::{PhysicalDevice, PhysicalDeviceType},
        Device, DeviceCreateInfo, DeviceExtensions, Features, Queue, QueueCreateInfo, QueueFlags,
    },
    instance::{Instance, InstanceCreateInfo},
    memory::allocator::StandardMemoryAllocator,
    VulkanLibrary,
};

use crate::error::CloudError;

/// Vulkan objects shared by windows and GPU resources.
pub struct Manager {
    pub library: Arc<VulkanLibrary>,
    pub instance: Arc<Instance>,
    pub physical_device: Arc<PhysicalDevice>,
    pub device: Arc<Device>,
    pub queues: Box<dyn ExactSizeIterator<Item = Arc<Queue>>>,
    pub memory_allocator: Arc<StandardMemoryAllocator>,
}

impl Manager {
    /// Picks a device with a graphics queue, swapchain support and geometry shaders,
    /// preferring discrete GPUs.
    pub fn new() -> Result<Self, CloudError> {
        let library = VulkanLibrary::new()
            .map_err(|err| CloudError::render(format!("Vulkan is not supported: {}", err)))?;
        let required_extensions = vulkano_win::required_extensions(&library);

        let instance = Instance::new(
            library.clone(),
            InstanceCreateInfo {
                application_name: Some("randcloud".to_string()),
                enabled_extensions: required_extensions,
                ..Default::default()
            },
        )
        .map_err(|err| CloudError::render(format!("Failed to create Vulkan instance: {}", err)))?;

        let physical_device_extensions = DeviceExtensions {
            khr_swapchain: true,
            ..DeviceExtensions::empty()
        };
        let (physical_device, queue_family_index) = instance
            .enumerate_physical_devices()
            .map_err(|err| {
                CloudError::render(format!("Unable to enumerate physical devices: {}", err))
            })?
            .filter(|p| {
                p.supported_extensions()
                    .contains(&physical_device_extensions)
                    && p.supported_features().geometry_shader
            })
            .filter_map(|p| {
                p.queue_family_properties()
                    .iter()
                    .position(|q| q.queue_flags.intersects(QueueFlags::GRAPHICS))
                    .map(|q| (p, q as u32))
            })
            .min_by_key(|(p, _)| match p.properties().device_type {
                PhysicalDeviceType::DiscreteGpu => 0,
                PhysicalDeviceType::IntegratedGpu => 1,
                PhysicalDeviceType::VirtualGpu => 2,
                PhysicalDeviceType::Cpu => 3,
                _ => 4,
            })
            .ok_or_else(|| CloudError::render("no suitable Vulkan device available"))?;

        log::info!(
            "Using device {} ({:?})",
            physical_device.properties().device_name,
            physical_device.properties().device_type
        );

        let (device, queues) = Device::new(
            physical_device.clone(),
            DeviceCreateInfo {
                queue_create_infos: vec![QueueCreateInfo {
                    queue_family_index,
                    ..Default::default()
                }],
                enabled_extensions: physical_device_extensions,
                enabled_features: Features {
                    geometry_shader: true,
                    ..Features::empty()
                },
                ..Default::default()
            },
        )
        .map_err(|err| CloudError::render(format!("Failed to create device: {}", err)))?;
        let memory_allocator = Arc::new(StandardMemoryAllocator::new_default(device.clone()));

        Ok(Self {
            library,
            instance,
            physical_device,
            device,
            queues: Box::new(queues),
            memory_allocator,
        })
    }

    pub fn device_name(&self) -> String {
        self.physical_device.properties().device_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[ignore]
    #[test]
    pub fn test_can_initialize() {
        let manager = Manager::new().unwrap();
        println!("Using device {}", manager.device_name());
        assert!(manager.queues.len() > 0);
    }
}
