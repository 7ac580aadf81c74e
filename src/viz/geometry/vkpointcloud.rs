use std::sync::Arc;

use vulkano::{
    buffer::{Buffer, BufferCreateInfo, BufferUsage, Subbuffer},
    descriptor_set::{PersistentDescriptorSet, WriteDescriptorSet},
    device::Device,
    memory::allocator::{AllocationCreateInfo, MemoryAllocator, MemoryUsage},
    pipeline::{
        graphics::{
            depth_stencil::DepthStencilState,
            input_assembly::{InputAssemblyState, PrimitiveTopology},
            vertex_input::Vertex,
            viewport::ViewportState,
        },
        GraphicsPipeline, Pipeline, PipelineBindPoint,
    },
    render_pass::{RenderPass, Subpass},
};

use crate::{
    bounds::Sphere3Df,
    error::CloudError,
    pointcloud::PointCloud,
    settings::{PointColorMode, ViewerSettings},
    viz::{
        controllers::FrameStepInfo,
        node::{node_ref, CommandBuffersContext, MakeNode, Node, NodeProperties, NodeRef},
        Manager,
    },
};

use super::datatypes::{ColorU8, PositionF32};

const PIPELINE_NAME: &str = "VkPointCloud";

const COLOR_FIXED: u32 = 0;
const COLOR_Z_GRADIENT: u32 = 1;
const COLOR_PER_POINT: u32 = 2;

/// Point cloud uploaded into GPU vertex buffers.
pub struct VkPointCloud {
    /// `None` when the cloud is empty, Vulkan has no zero sized buffers.
    pub points: Option<Subbuffer<[PositionF32]>>,
    pub colors: Option<Subbuffer<[ColorU8]>>,
    has_colors: bool,
    z_range: [f32; 2],
    bounding_sphere: Sphere3Df,
    number_of_points: usize,
}

impl VkPointCloud {
    /// Uploads the points and colors. Clouds without colors get a zeroed color
    /// buffer, since the pipeline always binds one.
    pub fn from_pointcloud(
        memory_allocator: &(impl MemoryAllocator + ?Sized),
        pointcloud: &PointCloud,
    ) -> Result<Arc<Self>, CloudError> {
        let number_of_points = pointcloud.len();
        let bounding_box = pointcloud.bounding_box();
        let z_range = if pointcloud.is_empty() {
            [0.0, 1.0]
        } else {
            [bounding_box.min[2], bounding_box.max[2]]
        };

        let mut vk_pointcloud = Self {
            points: None,
            colors: None,
            has_colors: pointcloud.colors.is_some(),
            z_range,
            bounding_sphere: pointcloud.bounding_sphere(),
            number_of_points,
        };

        if number_of_points == 0 {
            log::warn!("Point cloud is empty, nothing will be drawn for it");
            return Ok(Arc::new(vk_pointcloud));
        }

        let create_info = BufferCreateInfo {
            usage: BufferUsage::VERTEX_BUFFER,
            ..Default::default()
        };
        let alloc_info = AllocationCreateInfo {
            usage: MemoryUsage::Upload,
            ..Default::default()
        };

        vk_pointcloud.points = Some(
            Buffer::from_iter(
                memory_allocator,
                create_info.clone(),
                alloc_info.clone(),
                pointcloud
                    .points
                    .outer_iter()
                    .map(|v| PositionF32::new(v[0], v[1], v[2])),
            )
            .map_err(CloudError::render)?,
        );

        let colors = match pointcloud.colors.as_ref() {
            Some(colors) => Buffer::from_iter(
                memory_allocator,
                create_info,
                alloc_info,
                colors.outer_iter().map(|v| ColorU8::new(v[0], v[1], v[2])),
            ),
            None => Buffer::from_iter(
                memory_allocator,
                create_info,
                alloc_info,
                (0..number_of_points).map(|_| ColorU8::default()),
            ),
        };
        vk_pointcloud.colors = Some(colors.map_err(CloudError::render)?);

        log::debug!("Uploaded {number_of_points} points to the GPU");
        Ok(Arc::new(vk_pointcloud))
    }

    pub fn len(&self) -> usize {
        self.number_of_points
    }

    pub fn is_empty(&self) -> bool {
        self.number_of_points == 0
    }

    pub fn has_colors(&self) -> bool {
        self.has_colors
    }

    /// Minimum and maximum z, used by the gradient coloring.
    pub fn z_range(&self) -> [f32; 2] {
        self.z_range
    }
}

/// Shader color mode code and fixed color for a cloud.
fn shader_color_mode(mode: PointColorMode, has_colors: bool) -> (u32, [f32; 4]) {
    match mode {
        PointColorMode::Fixed([r, g, b]) => (COLOR_FIXED, [r, g, b, 1.0]),
        PointColorMode::PerPoint if has_colors => (COLOR_PER_POINT, [0.0, 0.0, 0.0, 1.0]),
        PointColorMode::PerPoint | PointColorMode::ZGradient => {
            (COLOR_Z_GRADIENT, [0.0, 0.0, 0.0, 1.0])
        }
    }
}

pub struct VkPointCloudNode {
    pub properties: NodeProperties,
    pub color_mode: PointColorMode,
    /// Side of the square splat in pixels.
    pub point_size: f32,
    point_cloud: Arc<VkPointCloud>,
}

impl VkPointCloudNode {
    pub fn new(point_cloud: Arc<VkPointCloud>) -> NodeRef<Self> {
        let defaults = ViewerSettings::default();
        node_ref(Self {
            properties: NodeProperties {
                bounding_sphere: point_cloud.bounding_sphere,
                ..Default::default()
            },
            color_mode: defaults.color_mode,
            point_size: defaults.point_size,
            point_cloud,
        })
    }

    pub fn apply_settings(&mut self, settings: &ViewerSettings) {
        self.color_mode = settings.color_mode;
        self.point_size = settings.point_size;
    }

    pub fn point_cloud(&self) -> &VkPointCloud {
        &self.point_cloud
    }
}

mod vs {
    vulkano_shaders::shader! {
        ty: "vertex",
        path: "resources/shaders/pointcloud/pointcloud.vert",
    }
}

mod gs {
    vulkano_shaders::shader! {
        ty: "geometry",
        path: "resources/shaders/pointcloud/pointcloud.geom",
    }
}

mod fs {
    vulkano_shaders::shader! {
        ty: "fragment",
        path: "resources/shaders/pointcloud/pointcloud.frag"
    }
}

fn create_pipeline(
    device: Arc<Device>,
    render_pass: Arc<RenderPass>,
) -> Result<Arc<GraphicsPipeline>, CloudError> {
    let vs = vs::load(device.clone()).map_err(CloudError::render)?;
    let gs = gs::load(device.clone()).map_err(CloudError::render)?;
    let fs = fs::load(device.clone()).map_err(CloudError::render)?;
    let missing_entry = || CloudError::render("shader has no main entry point");
    let subpass =
        Subpass::from(render_pass, 0).ok_or_else(|| CloudError::render("missing subpass 0"))?;

    GraphicsPipeline::start()
        .vertex_input_state([PositionF32::per_vertex(), ColorU8::per_vertex()])
        .vertex_shader(vs.entry_point("main").ok_or_else(missing_entry)?, ())
        .input_assembly_state(InputAssemblyState::new().topology(PrimitiveTopology::PointList))
        .viewport_state(ViewportState::viewport_dynamic_scissor_irrelevant())
        .geometry_shader(gs.entry_point("main").ok_or_else(missing_entry)?, ())
        .fragment_shader(fs.entry_point("main").ok_or_else(missing_entry)?, ())
        .depth_stencil_state(DepthStencilState::simple_depth_test())
        .render_pass(subpass)
        .build(device)
        .map_err(CloudError::render)
}

impl Node for VkPointCloudNode {
    fn properties(&self) -> &NodeProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut NodeProperties {
        &mut self.properties
    }

    fn collect_command_buffers(
        &self,
        context: &mut CommandBuffersContext,
        frame_info: &FrameStepInfo,
    ) -> Result<(), CloudError> {
        if !self.properties.visible {
            return Ok(());
        }

        let (points, colors) = match (&self.point_cloud.points, &self.point_cloud.colors) {
            (Some(points), Some(colors)) => (points.clone(), colors.clone()),
            _ => return Ok(()),
        };

        let pipeline = match context.pipelines.get(PIPELINE_NAME) {
            Some(pipeline) => pipeline.clone(),
            None => {
                let pipeline =
                    create_pipeline(context.device.clone(), context.render_pass.clone())?;
                context
                    .pipelines
                    .insert(PIPELINE_NAME.to_string(), pipeline.clone());
                pipeline
            }
        };

        let uniform_buffer_subbuffer = {
            let view_matrix = context.view_matrix * self.properties.transformation;
            let projection_worldview = context.projection_matrix * view_matrix;
            let (color_mode, fixed_color) =
                shader_color_mode(self.color_mode, self.point_cloud.has_colors);
            let [width, height] = frame_info.viewport_size;

            let uniform_data = vs::Data {
                projection_worldview: projection_worldview.into(),
                fixed_color,
                z_range: self.point_cloud.z_range,
                point_extent: [
                    self.point_size / width.max(1.0),
                    self.point_size / height.max(1.0),
                ],
                color_mode,
            };

            let subbuffer = context
                .uniform_allocator
                .allocate_sized()
                .map_err(CloudError::render)?;
            *subbuffer.write().map_err(CloudError::render)? = uniform_data;

            subbuffer
        };

        let layout = pipeline
            .layout()
            .set_layouts()
            .get(0)
            .ok_or_else(|| CloudError::render("pipeline has no descriptor set layout"))?;
        let descriptor_set = PersistentDescriptorSet::new(
            context.descriptor_set_allocator,
            layout.clone(),
            [WriteDescriptorSet::buffer(0, uniform_buffer_subbuffer)],
        )
        .map_err(CloudError::render)?;

        context
            .builder
            .bind_pipeline_graphics(pipeline.clone())
            .bind_vertex_buffers(0, (points, colors))
            .bind_descriptor_sets(
                PipelineBindPoint::Graphics,
                pipeline.layout().clone(),
                0,
                descriptor_set,
            )
            .draw(self.point_cloud.len() as u32, 1, 0, 0)
            .map_err(CloudError::render)?;

        Ok(())
    }
}

impl MakeNode for PointCloud {
    type Node = VkPointCloudNode;

    fn make_node(&self, manager: &Manager) -> Result<NodeRef<Self::Node>, CloudError> {
        Ok(VkPointCloudNode::new(VkPointCloud::from_pointcloud(
            manager.memory_allocator.as_ref(),
            self,
        )?))
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use crate::{
        pointcloud::PointCloud,
        sampling::random_point_cloud,
        settings::PointColorMode,
        viz::{node::MakeNode, unit_test::vk_manager, Manager},
    };

    use super::{shader_color_mode, COLOR_FIXED, COLOR_PER_POINT, COLOR_Z_GRADIENT};

    #[test]
    fn test_color_mode_falls_back_without_colors() {
        assert_eq!(
            shader_color_mode(PointColorMode::PerPoint, false).0,
            COLOR_Z_GRADIENT
        );
        assert_eq!(
            shader_color_mode(PointColorMode::PerPoint, true).0,
            COLOR_PER_POINT
        );
        assert_eq!(
            shader_color_mode(PointColorMode::Fixed([0.1, 0.2, 0.3]), true),
            (COLOR_FIXED, [0.1, 0.2, 0.3, 1.0])
        );
    }

    #[ignore]
    #[rstest]
    fn test_upload(vk_manager: Manager) {
        let cloud = random_point_cloud(1000).unwrap();
        let node = cloud.make_node(&vk_manager).unwrap();
        let node = node.borrow();
        assert_eq!(node.point_cloud().len(), 1000);
        assert!(!node.point_cloud().has_colors());
        let [z_min, z_max] = node.point_cloud().z_range();
        assert!(0.0 <= z_min && z_max < 1.0);
    }

    #[ignore]
    #[rstest]
    fn test_empty_cloud_has_no_buffers(vk_manager: Manager) {
        let node = PointCloud::zeros(0).make_node(&vk_manager).unwrap();
        let node = node.borrow();
        assert!(node.point_cloud().is_empty());
        assert!(node.point_cloud().points.is_none());
    }
}
