use std::{collections::HashMap, sync::Arc, time::Instant};

use vulkano::{
    buffer::{
        allocator::{SubbufferAllocator, SubbufferAllocatorCreateInfo},
        BufferUsage,
    },
    command_buffer::{
        allocator::StandardCommandBufferAllocator, AutoCommandBufferBuilder, CommandBufferUsage,
        PrimaryAutoCommandBuffer, RenderPassBeginInfo, SubpassContents,
    },
    descriptor_set::allocator::StandardDescriptorSetAllocator,
    device::{Device, Queue},
    format::Format,
    image::{view::ImageView, AttachmentImage, ImageUsage, SwapchainImage},
    memory::allocator::StandardMemoryAllocator,
    pipeline::{graphics::viewport::Viewport, GraphicsPipeline},
    render_pass::{Framebuffer, FramebufferCreateInfo, RenderPass},
    swapchain::{
        acquire_next_image, AcquireError, Surface, Swapchain, SwapchainCreateInfo,
        SwapchainCreationError, SwapchainPresentInfo,
    },
    sync::{self, FlushError, GpuFuture},
};
use vulkano_win::VkSurfaceBuild;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    platform::run_return::EventLoopExtRunReturn,
    window::{Window as WWindow, WindowBuilder},
};

use crate::{error::CloudError, settings::ViewerSettings};

use super::{
    controllers::{FrameStepInfo, SceneState, VirtualCameraControl, WASDVirtualCameraControl},
    manager::Manager,
    node::{CommandBuffersContext, Node, NodeRef},
    virtual_camera::VirtualCameraSphericalBuilder,
    virtual_projection::PerspectiveVirtualProjectionBuilder,
};

pub type KeyCallback = Box<dyn FnMut(VirtualKeyCode, &FrameStepInfo)>;

const DEPTH_FORMAT: Format = Format::D16_UNORM;

/// Sphere radii per second.
const CAMERA_VELOCITY: f32 = 1.0;

/// Native window showing a scene. Created with [`Window::create`] and displayed until closed
/// with [`Window::show`].
pub struct Window {
    surface: Arc<Surface>,
    event_loop: Option<EventLoop<()>>,
    device: Arc<Device>,
    queue: Arc<Queue>,
    memory_allocator: Arc<StandardMemoryAllocator>,
    scene: NodeRef<dyn Node>,
    command_buffer_allocator: StandardCommandBufferAllocator,
    descriptor_set_allocator: StandardDescriptorSetAllocator,
    uniform_allocator: SubbufferAllocator,
    background: [f32; 3],
    /// Called on every key press other than Escape.
    pub on_key: Option<KeyCallback>,
    frame_counter: usize,
}

/// Swapchain dependent state, rebuilt when the window is resized.
struct FrameResources {
    swapchain: Arc<Swapchain>,
    render_pass: Arc<RenderPass>,
    framebuffers: Vec<Arc<Framebuffer>>,
    viewport: Viewport,
    pipelines: HashMap<String, Arc<GraphicsPipeline>>,
    previous_frame_end: Option<Box<dyn GpuFuture>>,
    recreate_swapchain: bool,
}

fn window_size(surface: &Surface) -> Result<PhysicalSize<u32>, CloudError> {
    surface
        .object()
        .and_then(|object| object.downcast_ref::<WWindow>())
        .map(|window| window.inner_size())
        .ok_or_else(|| CloudError::render("surface is not backed by a window"))
}

fn window_size_dependent_setup(
    memory_allocator: &StandardMemoryAllocator,
    images: &[Arc<SwapchainImage>],
    render_pass: Arc<RenderPass>,
    viewport: &mut Viewport,
) -> Result<Vec<Arc<Framebuffer>>, CloudError> {
    let dimensions = images
        .first()
        .ok_or_else(|| CloudError::render("swapchain has no images"))?
        .swapchain()
        .image_extent();
    viewport.dimensions = [dimensions[0] as f32, dimensions[1] as f32];

    let depth_buffer = ImageView::new_default(
        AttachmentImage::transient(memory_allocator, dimensions, DEPTH_FORMAT)
            .map_err(CloudError::render)?,
    )
    .map_err(CloudError::render)?;

    images
        .iter()
        .map(|image| {
            let view = ImageView::new_default(image.clone()).map_err(CloudError::render)?;
            Framebuffer::new(
                render_pass.clone(),
                FramebufferCreateInfo {
                    attachments: vec![view, depth_buffer.clone()],
                    ..Default::default()
                },
            )
            .map_err(CloudError::render)
        })
        .collect()
}

impl Window {
    /// Opens the native window. Fails with [`CloudError::Render`] when no display is
    /// available or the device cannot present to it.
    pub fn create(
        manager: &mut Manager,
        scene: NodeRef<dyn Node>,
        settings: &ViewerSettings,
    ) -> Result<Self, CloudError> {
        settings.validate()?;

        // winit panics instead of returning an error when there is no display server.
        let event_loop = std::panic::catch_unwind(EventLoop::<()>::new)
            .map_err(|_| CloudError::render("unable to open a window, no display available"))?;

        let [width, height] = settings.window_size;
        let surface = WindowBuilder::new()
            .with_title(settings.window_title.clone())
            .with_inner_size(PhysicalSize::new(width, height))
            .build_vk_surface(&event_loop, manager.instance.clone())
            .map_err(|err| CloudError::render(format!("Failed to create window: {err}")))?;

        let queue = manager
            .queues
            .next()
            .ok_or_else(|| CloudError::render("no Vulkan queue left for a new window"))?;
        let presentable = manager
            .physical_device
            .surface_support(queue.queue_family_index(), &surface)
            .map_err(CloudError::render)?;
        if !presentable {
            return Err(CloudError::render(
                "the selected device cannot present to this window",
            ));
        }

        let device = manager.device.clone();
        let memory_allocator = manager.memory_allocator.clone();

        Ok(Self {
            surface,
            event_loop: Some(event_loop),
            queue,
            scene,
            command_buffer_allocator: StandardCommandBufferAllocator::new(
                device.clone(),
                Default::default(),
            ),
            descriptor_set_allocator: StandardDescriptorSetAllocator::new(device.clone()),
            uniform_allocator: SubbufferAllocator::new(
                memory_allocator.clone(),
                SubbufferAllocatorCreateInfo {
                    buffer_usage: BufferUsage::UNIFORM_BUFFER,
                    ..Default::default()
                },
            ),
            device,
            memory_allocator,
            background: settings.background,
            on_key: None,
            frame_counter: 0,
        })
    }

    fn create_frame_resources(&self) -> Result<FrameResources, CloudError> {
        let dimensions = window_size(&self.surface)?;
        let physical_device = self.device.physical_device();

        let (swapchain, images) = {
            let surface_capabilities = physical_device
                .surface_capabilities(&self.surface, Default::default())
                .map_err(CloudError::render)?;
            let image_format = physical_device
                .surface_formats(&self.surface, Default::default())
                .map_err(CloudError::render)?
                .first()
                .map(|(format, _)| *format)
                .ok_or_else(|| CloudError::render("surface reports no image format"))?;
            let composite_alpha = surface_capabilities
                .supported_composite_alpha
                .into_iter()
                .next()
                .ok_or_else(|| CloudError::render("surface reports no composite alpha mode"))?;

            Swapchain::new(
                self.device.clone(),
                self.surface.clone(),
                SwapchainCreateInfo {
                    min_image_count: surface_capabilities.min_image_count,
                    image_format: Some(image_format),
                    image_extent: dimensions.into(),
                    image_usage: ImageUsage::COLOR_ATTACHMENT,
                    composite_alpha,
                    ..Default::default()
                },
            )
            .map_err(|err| CloudError::render(format!("Failed to create swapchain: {err}")))?
        };

        let render_pass = vulkano::single_pass_renderpass!(
            self.device.clone(),
            attachments: {
                color: {
                    load: Clear,
                    store: Store,
                    format: swapchain.image_format(),
                    samples: 1,
                },
                depth: {
                    load: Clear,
                    store: DontCare,
                    format: DEPTH_FORMAT,
                    samples: 1,
                }
            },
            pass: {
                color: [color],
                depth_stencil: {depth}
            }
        )
        .map_err(CloudError::render)?;

        let mut viewport = Viewport {
            origin: [0.0, 0.0],
            dimensions: [dimensions.width as f32, dimensions.height as f32],
            depth_range: 0.0..1.0,
        };
        let framebuffers = window_size_dependent_setup(
            &self.memory_allocator,
            &images,
            render_pass.clone(),
            &mut viewport,
        )?;

        Ok(FrameResources {
            swapchain,
            render_pass,
            framebuffers,
            viewport,
            pipelines: HashMap::new(),
            previous_frame_end: Some(sync::now(self.device.clone()).boxed()),
            recreate_swapchain: false,
        })
    }

    fn record_command_buffer(
        &self,
        framebuffer: Arc<Framebuffer>,
        frame: &mut FrameResources,
        camera_control: &WASDVirtualCameraControl,
        frame_info: &FrameStepInfo,
    ) -> Result<PrimaryAutoCommandBuffer, CloudError> {
        let mut builder = AutoCommandBufferBuilder::primary(
            &self.command_buffer_allocator,
            self.queue.queue_family_index(),
            CommandBufferUsage::OneTimeSubmit,
        )
        .map_err(CloudError::render)?;

        let [red, green, blue] = self.background;
        builder
            .begin_render_pass(
                RenderPassBeginInfo {
                    clear_values: vec![Some([red, green, blue, 1.0].into()), Some(1f32.into())],
                    ..RenderPassBeginInfo::framebuffer(framebuffer)
                },
                SubpassContents::Inline,
            )
            .map_err(CloudError::render)?
            .set_viewport(0, [frame.viewport.clone()]);

        self.scene.borrow().collect_command_buffers(
            &mut CommandBuffersContext {
                device: self.device.clone(),
                builder: &mut builder,
                pipelines: &mut frame.pipelines,
                render_pass: frame.render_pass.clone(),
                uniform_allocator: &self.uniform_allocator,
                descriptor_set_allocator: &self.descriptor_set_allocator,
                view_matrix: camera_control.view_matrix(),
                projection_matrix: camera_control.projection_matrix(),
            },
            frame_info,
        )?;

        builder.end_render_pass().map_err(CloudError::render)?;
        builder.build().map_err(CloudError::render)
    }

    fn draw_frame(
        &mut self,
        frame: &mut FrameResources,
        camera_control: &mut WASDVirtualCameraControl,
        projection_builder: &mut PerspectiveVirtualProjectionBuilder,
        frame_info: &mut FrameStepInfo,
    ) -> Result<(), CloudError> {
        // Minimized windows have no area to draw into.
        let dimensions = window_size(&self.surface)?;
        if dimensions.width == 0 || dimensions.height == 0 {
            return Ok(());
        }
        frame_info.viewport_size = [dimensions.width as f32, dimensions.height as f32];

        if let Some(previous_frame_end) = frame.previous_frame_end.as_mut() {
            previous_frame_end.cleanup_finished();
        }

        if frame.recreate_swapchain {
            let (new_swapchain, new_images) = match frame.swapchain.recreate(SwapchainCreateInfo {
                image_extent: dimensions.into(),
                ..frame.swapchain.create_info()
            }) {
                Ok(r) => r,
                // Happens while the user is resizing, retried on the next frame.
                Err(SwapchainCreationError::ImageExtentNotSupported { .. }) => return Ok(()),
                Err(err) => {
                    return Err(CloudError::render(format!(
                        "Failed to recreate swapchain: {err}"
                    )))
                }
            };
            log::debug!(
                "Recreated swapchain with {}x{} images",
                dimensions.width,
                dimensions.height
            );

            frame.swapchain = new_swapchain;
            frame.framebuffers = window_size_dependent_setup(
                &self.memory_allocator,
                &new_images,
                frame.render_pass.clone(),
                &mut frame.viewport,
            )?;
            camera_control.camera.projection = projection_builder
                .aspect_ratio(dimensions.width as f32 / dimensions.height as f32)
                .build();
            frame.recreate_swapchain = false;
        }

        let (image_index, suboptimal, acquire_future) =
            match acquire_next_image(frame.swapchain.clone(), None) {
                Ok(r) => r,
                Err(AcquireError::OutOfDate) => {
                    frame.recreate_swapchain = true;
                    return Ok(());
                }
                Err(err) => {
                    return Err(CloudError::render(format!(
                        "Failed to acquire next image: {err}"
                    )))
                }
            };
        if suboptimal {
            frame.recreate_swapchain = true;
        }

        let framebuffer = frame
            .framebuffers
            .get(image_index as usize)
            .cloned()
            .ok_or_else(|| CloudError::render("no framebuffer for the acquired image"))?;
        let command_buffer =
            self.record_command_buffer(framebuffer, frame, camera_control, frame_info)?;

        let future = frame
            .previous_frame_end
            .take()
            .unwrap_or_else(|| sync::now(self.device.clone()).boxed())
            .join(acquire_future)
            .then_execute(self.queue.clone(), command_buffer)
            .map_err(CloudError::render)?
            .then_swapchain_present(
                self.queue.clone(),
                SwapchainPresentInfo::swapchain_image_index(frame.swapchain.clone(), image_index),
            )
            .then_signal_fence_and_flush();

        match future {
            Ok(future) => {
                frame.previous_frame_end = Some(future.boxed());
            }
            Err(FlushError::OutOfDate) => {
                frame.recreate_swapchain = true;
                frame.previous_frame_end = Some(sync::now(self.device.clone()).boxed());
            }
            Err(err) => {
                return Err(CloudError::render(format!("Failed to flush future: {err}")));
            }
        }

        self.frame_counter += 1;
        Ok(())
    }

    /// Runs the event loop until the window is closed or Escape is pressed.
    pub fn show(&mut self) -> Result<(), CloudError> {
        let mut event_loop = self
            .event_loop
            .take()
            .ok_or_else(|| CloudError::render("window was already shown"))?;
        let mut frame = self.create_frame_resources()?;

        let scene_sphere = *self.scene.borrow().properties().bounding_sphere();
        let [width, height] = frame.viewport.dimensions;
        let camera_builder =
            VirtualCameraSphericalBuilder::fit(&scene_sphere, std::f32::consts::FRAC_PI_3)
                .aspect_ratio(width / height.max(1.0));
        let mut projection_builder = camera_builder.projection_builder();
        let mut camera_control =
            WASDVirtualCameraControl::fit_sphere_in_frustum(camera_builder, CAMERA_VELOCITY);

        let mut frame_info = FrameStepInfo::new([width, height]);
        let scene_state = SceneState {
            world_bounds: scene_sphere,
        };

        let mut loop_error = None;
        let mut last_frame = Instant::now();
        event_loop.run_return(|event, _, control_flow| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                *control_flow = ControlFlow::Exit;
            }
            Event::WindowEvent {
                event: WindowEvent::Resized(_),
                ..
            } => {
                frame.recreate_swapchain = true;
            }
            Event::WindowEvent {
                event: WindowEvent::MouseInput { state, button, .. },
                ..
            } => {
                frame_info.mouse_state.insert(button, state);
            }
            Event::WindowEvent {
                event: WindowEvent::CursorMoved { position, .. },
                ..
            } => {
                camera_control.cursor_moved(position.x, position.y, &frame_info, &scene_state);
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { input, .. },
                ..
            } => {
                if let Some(vkeycode) = input.virtual_keycode {
                    frame_info.keyboard_state.insert(vkeycode, input.state);

                    if input.state == ElementState::Pressed {
                        if vkeycode == VirtualKeyCode::Escape {
                            *control_flow = ControlFlow::Exit;
                        } else if let Some(on_key) = self.on_key.as_mut() {
                            on_key(vkeycode, &frame_info);
                        }
                    }
                }
            }
            Event::RedrawEventsCleared => {
                frame_info.elapsed_time = last_frame.elapsed();
                last_frame = Instant::now();
                camera_control.key_event(&frame_info, &scene_state);

                if let Err(err) = self.draw_frame(
                    &mut frame,
                    &mut camera_control,
                    &mut projection_builder,
                    &mut frame_info,
                ) {
                    loop_error = Some(err);
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => (),
        });

        log::debug!("Window closed after {} frames", self.frame_counter);
        match loop_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
